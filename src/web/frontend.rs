//! Embedded HTML/CSS/JS frontend for the callscope web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>callscope</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }

/* Layout */
.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }

/* Navigation */
nav {
  display: flex;
  gap: 4px;
  margin-bottom: 24px;
  background: var(--surface);
  border-radius: var(--radius);
  padding: 4px;
  border: 1px solid var(--border);
}
nav a {
  flex: 1;
  text-align: center;
  padding: 8px 16px;
  border-radius: 6px;
  color: var(--text-muted);
  font-size: 13px;
  font-weight: 500;
}
nav a:hover { color: var(--text); background: rgba(255,255,255,0.04); text-decoration: none; }
nav a.active { background: var(--accent); color: #fff; }

button, select, input {
  font: inherit;
  color: var(--text);
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 12px;
}
button { cursor: pointer; background: var(--surface); }
button:hover { border-color: var(--accent); }
button:disabled { opacity: 0.5; cursor: default; }
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.card h3 { font-size: 14px; font-weight: 600; margin-bottom: 12px; color: var(--text-muted); }

.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 16px;
  margin-bottom: 24px;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
}
.stat-card .value {
  font-size: 30px;
  font-weight: 700;
  font-family: var(--mono);
  color: var(--accent);
  line-height: 1.1;
}
.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  margin-top: 6px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}

/* Horizontal bars */
.hbar { display: flex; align-items: center; gap: 12px; margin-bottom: 8px; }
.hbar .name { width: 160px; color: var(--text-muted); font-size: 13px; }
.hbar .track { flex: 1; height: 14px; background: var(--bg); border-radius: 4px; overflow: hidden; }
.hbar .fill { height: 100%; border-radius: 4px; transition: width 0.4s; }
.hbar .num { width: 90px; text-align: right; font-family: var(--mono); font-size: 12px; }

/* Trend chart */
.chart {
  display: flex;
  align-items: flex-end;
  gap: 4px;
  height: 160px;
  padding-top: 20px;
}
.chart .bar-group {
  flex: 1;
  display: flex;
  gap: 2px;
  align-items: flex-end;
  justify-content: center;
  height: 100%;
}
.chart .bar { width: 45%; max-width: 14px; border-radius: 3px 3px 0 0; min-height: 2px; }
.chart .bar.compliance { background: var(--green); }
.chart .bar.risk { background: var(--red); }
.legend { display: flex; gap: 16px; font-size: 12px; color: var(--text-muted); margin-top: 8px; }

/* Tables */
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 8px 12px; border-bottom: 1px solid var(--border); }
th {
  color: var(--text-muted);
  font-weight: 500;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.5px;
}
td.num, th.num { text-align: right; font-family: var(--mono); }
tr.link { cursor: pointer; }
tr.link:hover { background: rgba(255,255,255,0.03); }

.pill {
  display: inline-block;
  padding: 2px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 600;
  border: 1px solid currentColor;
}

.toolbar { display: flex; gap: 8px; margin-bottom: 16px; flex-wrap: wrap; }
.toolbar input { flex: 1; min-width: 200px; }

.empty, .loading { color: var(--text-muted); text-align: center; padding: 32px; }
.error-panel {
  border: 1px solid var(--red);
  color: var(--red);
  border-radius: var(--radius);
  padding: 24px;
  text-align: center;
}
.error-panel p { margin-bottom: 12px; }

/* Transcript */
.line { display: flex; gap: 12px; padding: 6px 0; border-bottom: 1px solid var(--border); }
.line .clock { font-family: var(--mono); color: var(--text-muted); width: 48px; }
.line .who { width: 80px; font-weight: 600; }
.line.agent .who { color: var(--accent); }
.line.customer .who { color: var(--yellow); }

/* Chat */
.chat-log { min-height: 240px; max-height: 60vh; overflow-y: auto; margin-bottom: 16px; }
.msg { padding: 10px 14px; border-radius: var(--radius); margin-bottom: 10px; max-width: 80%; white-space: pre-wrap; }
.msg.user { background: var(--accent); color: #fff; margin-left: auto; }
.msg.assistant { background: var(--bg); border: 1px solid var(--border); }
.msg.error { border-color: var(--red); }
.msg .ctx { font-size: 11px; color: var(--text-muted); margin-top: 6px; }
.chat-form { display: flex; gap: 8px; }
.chat-form input { flex: 1; }
.chips { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 12px; }
.chips button { font-size: 12px; border-radius: 12px; }

/* Toast */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 12px 20px;
  border-radius: var(--radius);
  background: var(--surface);
  border: 1px solid var(--green);
  color: var(--green);
  opacity: 0;
  transform: translateY(12px);
  transition: all 0.2s;
  pointer-events: none;
}
.toast.show { opacity: 1; transform: translateY(0); }
.toast.error { border-color: var(--red); color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span class="logo">callscope</span> call analysis</h1>
    <button class="primary" id="export-btn">Export CSV</button>
  </header>

  <nav id="nav">
    <a href="#/" data-route="home">Dashboard</a>
    <a href="#/analytics" data-route="analytics">Analytics</a>
    <a href="#/reports" data-route="reports">Reports</a>
    <a href="#/chat" data-route="chat">Ask AI</a>
  </nav>

  <main id="view"></main>
</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let chatSession = null;
let chatSuggestions = null;
const APOLOGY = "Sorry, I couldn't process that question right now. Please try again in a moment.";
let noticeGeneration = 0;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function view() { return document.getElementById('view'); }

// Renders a ViewState. Returns the data when ready, otherwise null.
function settle(state, backHref, backLabel) {
  switch (state.state) {
    case 'ready': return state.data;
    case 'not_found':
      view().innerHTML = errorPanel('Not found.', backHref, backLabel);
      return null;
    case 'error':
      view().innerHTML = errorPanel(state.data, backHref, backLabel);
      return null;
    default:
      view().innerHTML = '<div class="loading">Loading…</div>';
      return null;
  }
}

function errorPanel(message, href, label) {
  return `<div class="error-panel"><p>${esc(message)}</p>` +
    (href ? `<a href="${href}">${esc(label)}</a>` : '') + '</div>';
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------
async function route() {
  const hash = location.hash.replace(/^#/, '') || '/';
  const parts = hash.split('?')[0].split('/').filter(Boolean);
  const section = parts[0] || 'home';

  document.querySelectorAll('#nav a').forEach(a =>
    a.classList.toggle('active', a.dataset.route === section));
  view().innerHTML = '<div class="loading">Loading…</div>';

  try {
    if (section === 'analytics') return await loadAnalytics();
    if (section === 'reports' && parts[1]) return await loadReport(decodeURIComponent(parts[1]));
    if (section === 'reports') return await loadReports();
    if (section === 'chat') return await loadChat();
    return await loadHome();
  } catch (e) {
    view().innerHTML = errorPanel('Failed to load. Please try again.', '#/', 'Back to dashboard');
  }
}

window.addEventListener('hashchange', route);

// ---------------------------------------------------------------------------
// Shared renderers
// ---------------------------------------------------------------------------
function cards(list) {
  return '<div class="stats-grid">' + list.map(c => `
    <div class="stat-card">
      <div class="value" ${c.color ? `style="color:${c.color}"` : ''}>${esc(c.value)}</div>
      <div class="label">${esc(c.label)}</div>
    </div>`).join('') + '</div>';
}

function series(title, points) {
  if (!points.length) {
    return `<div class="card"><h2>${esc(title)}</h2><div class="empty">No data</div></div>`;
  }
  return `<div class="card"><h2>${esc(title)}</h2>` + points.map(p => `
    <div class="hbar">
      <div class="name">${esc(p.label)}</div>
      <div class="track"><div class="fill" style="width:${p.pct}%;background:${p.color}"></div></div>
      <div class="num">${p.count} (${p.pct}%)</div>
    </div>`).join('') + '</div>';
}

function riskPill(row) {
  return `<span class="pill" style="color:${row.risk_color}">${esc(row.risk_level)} ${Math.round(row.risk_score)}</span>`;
}

function reportTable(rows, emptyText) {
  if (!rows.length) return `<div class="empty">${esc(emptyText)}</div>`;
  return `<table>
    <thead><tr><th>Call</th><th>Date</th><th>Risk</th><th class="num">Compliance</th>
    <th class="num">Violations</th><th class="num">Duration</th></tr></thead>
    <tbody>` + rows.map(r => `
      <tr class="link" data-report="${esc(r.id)}">
        <td><a href="#/reports/${esc(encodeURIComponent(r.id))}">${esc(r.title)}</a></td>
        <td>${esc(r.date)}</td>
        <td>${riskPill(r)}</td>
        <td class="num">${esc(r.compliance)}</td>
        <td class="num">${r.violations}</td>
        <td class="num">${esc(r.duration)}</td>
      </tr>`).join('') + '</tbody></table>';
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------
async function loadHome() {
  const home = settle(await api('GET', '/api/view/home'), '#/', 'Retry');
  if (!home) return;
  view().innerHTML = cards(home.cards) +
    series('Risk Breakdown', home.risk_breakdown) +
    `<div class="card"><h2>Recent Calls</h2>${reportTable(home.recent, 'No calls analyzed yet.')}
     <p style="margin-top:12px"><a href="#/reports">View all reports</a></p></div>`;
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------
async function loadAnalytics() {
  const a = settle(await api('GET', '/api/view/analytics'), '#/', 'Back to dashboard');
  if (!a) return;

  let trend = '<div class="empty">No trend data</div>';
  if (a.trend.length) {
    trend = '<div class="chart">' + a.trend.map(t => `
      <div class="bar-group" title="${esc(t.label)}: compliance ${t.compliance.toFixed(1)}, risk ${t.risk.toFixed(1)}">
        <div class="bar compliance" style="height:${clamp(t.compliance)}%"></div>
        <div class="bar risk" style="height:${clamp(t.risk)}%"></div>
      </div>`).join('') + '</div>' +
      '<div class="legend"><span style="color:var(--green)">■ Compliance</span><span style="color:var(--red)">■ Risk</span></div>';
  }

  view().innerHTML = cards(a.cards) +
    `<div class="card"><h2>Trend</h2>${trend}</div>` +
    series('Risk Distribution', a.risk) +
    series('Call Intents', a.intent) +
    series('Compliance', a.compliance) +
    `<div class="card"><h2>Statistics</h2><table><tbody>` +
    a.stats.map(s => `<tr><td>${esc(s.label)}</td><td class="num">${esc(s.value)}</td></tr>`).join('') +
    '</tbody></table></div>';
}

function clamp(v) { return Math.max(0, Math.min(100, v || 0)); }

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------
async function loadReports() {
  const params = new URLSearchParams(location.hash.split('?')[1] || '');
  const r = settle(await api('GET', '/api/view/reports?' + params.toString()), '#/', 'Back to dashboard');
  if (!r) return;

  const risk = params.get('risk') || 'all';
  const sort = params.get('sort') || 'newest';
  const opt = (value, label, current) =>
    `<option value="${value}" ${value === current ? 'selected' : ''}>${label}</option>`;

  view().innerHTML = `<div class="card">
    <h2>Reports <span style="color:var(--text-muted);font-weight:400">${r.rows.length} of ${r.total}</span></h2>
    <form class="toolbar" id="filter-form">
      <input name="search" placeholder="Search calls" value="${esc(params.get('search') || '')}">
      <select name="risk">${opt('all', 'All risk', risk)}${opt('high', 'High', risk)}${opt('medium', 'Medium', risk)}${opt('low', 'Low', risk)}</select>
      <select name="sort">${opt('newest', 'Newest', sort)}${opt('oldest', 'Oldest', sort)}${opt('risk_desc', 'Highest risk', sort)}${opt('risk_asc', 'Lowest risk', sort)}</select>
      <button type="submit">Apply</button>
    </form>
    ${reportTable(r.rows, 'No reports match these filters.')}
  </div>`;

  document.getElementById('filter-form').addEventListener('submit', e => {
    e.preventDefault();
    const q = new URLSearchParams(new FormData(e.target));
    location.hash = '#/reports?' + q.toString();
  });
}

// ---------------------------------------------------------------------------
// Report detail
// ---------------------------------------------------------------------------
async function loadReport(id) {
  const page = await api('GET', '/api/view/reports/' + encodeURIComponent(id));
  const d = settle(page.detail, '#/reports', 'Back to reports');
  if (!d) return;

  const facts = [
    ['Date', d.date], ['Duration', d.duration], ['Compliance', d.compliance],
    ['Intent', d.intent], ['Language', d.language], ['PII found', d.pii_count],
  ].filter(f => f[1] !== null && f[1] !== undefined);

  const violations = d.violations.length ? '<table><thead><tr><th>Severity</th><th>Rule</th><th>Details</th><th>At</th></tr></thead><tbody>' +
    d.violations.map(v => `<tr><td>${esc(v.severity)}</td><td>${esc(v.rule)}</td>
      <td>${esc(v.description)}${v.quote ? `<br><em style="color:var(--text-muted)">“${esc(v.quote)}”</em>` : ''}</td>
      <td class="num">${esc(v.at || '')}</td></tr>`).join('') + '</tbody></table>'
    : '<div class="empty">No violations.</div>';

  const obligations = d.obligations.length ? '<ul style="padding-left:18px">' +
    d.obligations.map(o => `<li>${esc(o.sentence)} <span style="color:var(--text-muted)">${esc(o.keywords.join(', '))}</span></li>`).join('') + '</ul>'
    : '<div class="empty">No obligations.</div>';

  const transcript = d.transcript.length ? d.transcript.map(l => `
    <div class="line ${l.speaker}"><span class="clock">${esc(l.clock)}</span>
    <span class="who">${l.speaker === 'agent' ? 'Agent' : 'Customer'}</span><span>${esc(l.text)}</span></div>`).join('')
    : '<div class="empty">No transcript.</div>';

  const stress = d.stress ? `<div class="card"><h2>Stress</h2>
    Peak ${d.stress.peak.toFixed(2)} at ${esc(d.stress.peak_time)} · average ${d.stress.average.toFixed(2)} over ${d.stress.samples} samples</div>` : '';

  view().innerHTML = `<p style="margin-bottom:12px"><a href="#/reports">← Back to reports</a></p>
    <div class="card">
      <h2>${esc(d.title)} ${riskPill(d)}</h2>
      <table><tbody>${facts.map(f => `<tr><td style="color:var(--text-muted)">${f[0]}</td><td>${esc(String(f[1]))}</td></tr>`).join('')}</tbody></table>
      ${d.summary ? `<p style="margin-top:12px">${esc(d.summary)}</p>` : ''}
    </div>
    <div class="card"><h2>Violations</h2>${violations}</div>
    <div class="card"><h2>Obligations</h2>${obligations}</div>
    ${stress}
    <div class="card"><h2>Transcript</h2>${transcript}</div>
    <div class="card"><h2>Caller History <button id="history-btn" style="margin-left:8px"></button></h2>
      <div id="history"></div></div>`;

  renderHistory(page.history);
  document.getElementById('history-btn').addEventListener('click', async () => {
    const el = document.getElementById('history');
    el.innerHTML = '<div class="loading">Loading…</div>';
    try {
      const panel = await api('POST', '/api/view/reports/' + encodeURIComponent(id) + '/history');
      if (!panel || !panel.state) throw new Error((panel && panel.error) || 'no history panel');
      renderHistory(panel);
    } catch (e) {
      el.innerHTML = errorPanel('Failed to load caller history. Please try again.');
    }
  });
}

function renderHistory(panel) {
  document.getElementById('history-btn').textContent = panel.visible ? 'Hide' : 'Show';
  const el = document.getElementById('history');
  if (!panel.visible) { el.innerHTML = ''; return; }
  const s = panel.state;
  if (s.state === 'ready') el.innerHTML = reportTable(s.data, 'No other calls from this caller.');
  else if (s.state === 'error') el.innerHTML = errorPanel(s.data);
  else if (s.state === 'not_found') el.innerHTML = errorPanel('Not found.');
  else el.innerHTML = '<div class="loading">Loading…</div>';
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------
async function loadChat() {
  if (!chatSession || !chatSession.session_id) {
    chatSession = await api('POST', '/api/chat/sessions');
    chatSuggestions = null;
  }
  if (chatSuggestions === null) {
    chatSuggestions = await api('GET', '/api/chat/sessions/' + chatSession.session_id + '/suggestions');
    if (!Array.isArray(chatSuggestions)) chatSuggestions = [];
  }

  view().innerHTML = `<div class="card"><h2>Ask about your calls</h2>
    <div class="chat-log" id="chat-log"></div>
    <div class="chips" id="chips"></div>
    <form class="chat-form" id="chat-form">
      <input id="chat-input" placeholder="e.g. Which calls had the most violations?" autocomplete="off">
      <button class="primary" id="chat-send" type="submit">Send</button>
    </form></div>`;

  renderChat(false);
  document.getElementById('chat-form').addEventListener('submit', e => {
    e.preventDefault();
    sendChat(document.getElementById('chat-input').value);
  });
}

function renderChat(pending) {
  const log = document.getElementById('chat-log');
  if (!log) return;
  const messages = chatSession.messages;
  log.innerHTML = messages.length ? messages.map(m => `
    <div class="msg ${m.role}${m.error ? ' error' : ''}">${esc(m.content)}
    ${m.data_context ? `<div class="ctx">based on: ${esc(m.data_context)}</div>` : ''}</div>`).join('')
    : '<div class="empty">Ask a question to get started.</div>';
  if (pending) log.innerHTML += '<div class="msg assistant"><em>Thinking…</em></div>';
  log.scrollTop = log.scrollHeight;

  document.getElementById('chat-send').disabled = pending;
  const chips = document.getElementById('chips');
  chips.innerHTML = messages.length ? '' : (chatSuggestions || []).map((s, i) =>
    `<button type="button" data-i="${i}">${esc(s.text)}</button>`).join('');
  chips.querySelectorAll('button').forEach(b =>
    b.addEventListener('click', () => sendChat(chatSuggestions[b.dataset.i].text)));
}

async function sendChat(text) {
  if (!text.trim() || document.getElementById('chat-send').disabled) return;
  document.getElementById('chat-input').value = '';
  chatSession.messages.push({ role: 'user', content: text.trim() });
  renderChat(true);
  try {
    // The server forgot this session; start a fresh one.
    if (!chatSession.session_id) chatSession = await api('POST', '/api/chat/sessions');
    const res = await api('POST', '/api/chat/sessions/' + chatSession.session_id + '/messages', { query: text });
    if (!res || !res.session) {
      chatSession.session_id = null;
      throw new Error((res && res.error) || 'no session in reply');
    }
    chatSession = res.session;
  } catch (e) {
    chatSession.messages.push({ role: 'assistant', content: APOLOGY, error: true });
  }
  renderChat(false);
}

// ---------------------------------------------------------------------------
// Export notice
// ---------------------------------------------------------------------------
document.getElementById('export-btn').addEventListener('click', async () => {
  const btn = document.getElementById('export-btn');
  btn.disabled = true;
  try {
    const res = await api('POST', '/api/export');
    if (res.notice) showNotice(res.notice);
  } finally {
    btn.disabled = false;
  }
});

function showNotice(notice) {
  const el = document.getElementById('toast');
  el.textContent = notice.message;
  el.className = 'toast show' + (notice.kind === 'error' ? ' error' : '');
  noticeGeneration = notice.generation;
  setTimeout(() => {
    // A newer notice owns the toast now.
    if (noticeGeneration !== notice.generation) return;
    el.className = 'toast';
    api('POST', '/api/notice/' + notice.generation + '/dismiss');
  }, notice.expires_in_ms);
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (s === null || s === undefined) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;')
    .replace(/"/g,'&quot;').replace(/'/g,'&#39;');
}

// Whole report rows are clickable; the title link covers keyboard use.
document.addEventListener('click', e => {
  const row = e.target.closest('tr[data-report]');
  if (!row || e.target.closest('a')) return;
  location.hash = '#/reports/' + encodeURIComponent(row.dataset.report);
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
api('GET', '/api/notice').then(n => { if (n) showNotice(n); });
route();
</script>
</body>
</html>"##;
