//! Minimal markdown rendering for assistant replies.
//!
//! Handles the subset the assistant actually produces: headings, bullet and
//! numbered lists, fenced code, `**bold**`, `*italic*` and `` `code` ``.
//! Anything else passes through unchanged.

use std::sync::LazyLock;

use colored::Colorize;
use regex::{Captures, Regex};

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex must compile"));

static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^*\w])\*([^*\s][^*]*)\*").expect("italic regex must compile")
});

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code regex must compile"));

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").expect("numbered regex must compile"));

/// Render markdown for the terminal, one output line per input line.
pub fn render(text: &str) -> String {
    let mut out = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            out.push(format!("    {}", line.yellow()));
            continue;
        }

        let rendered = if let Some(heading) = heading_text(trimmed) {
            inline(heading).bold().cyan().to_string()
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            format!("  • {}", inline(item))
        } else if let Some(caps) = NUMBERED_RE.captures(trimmed) {
            format!("  {}. {}", &caps[1], inline(&caps[2]))
        } else {
            inline(line)
        };
        out.push(rendered);
    }

    out.join("\n")
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    line[hashes..].strip_prefix(' ').map(str::trim)
}

fn inline(text: &str) -> String {
    let text = CODE_RE.replace_all(text, |c: &Captures| c[1].yellow().to_string());
    let text = BOLD_RE.replace_all(&text, |c: &Captures| c[1].bold().to_string());
    ITALIC_RE
        .replace_all(&text, |c: &Captures| format!("{}{}", &c[1], c[2].italic()))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> String {
        colored::control::set_override(false);
        render(text)
    }

    #[test]
    fn strips_markers() {
        assert_eq!(plain("**Total** calls: `42`"), "Total calls: 42");
        assert_eq!(plain("an *important* note"), "an important note");
    }

    #[test]
    fn lists_and_headings() {
        let out = plain("## Summary\n- first\n* second\n1. one\n2) two");
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, ["Summary", "  • first", "  • second", "  1. one", "  2. two"]);
    }

    #[test]
    fn fenced_code_is_indented() {
        let out = plain("before\n```\nlet x = 1;\n```\nafter");
        assert_eq!(out, "before\n    let x = 1;\nafter");
    }

    #[test]
    fn hashtag_without_space_is_not_heading() {
        assert_eq!(plain("#tag"), "#tag");
    }

    #[test]
    fn multiplication_is_left_alone() {
        assert_eq!(plain("2 * 3 * 4"), "2 * 3 * 4");
    }
}
