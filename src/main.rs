use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use callscope::activity::logger;
use callscope::api::ApiClient;
use callscope::cli::{self, OutputFormat};
use callscope::config;
use callscope::view::format::RiskLevel;
use callscope::view::{ReportFilter, SortOrder};
use callscope::web;

#[derive(Debug, Parser)]
#[command(name = "callscope")]
#[command(about = "Browse call-analysis reports, analytics and chat from the terminal")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Headline numbers, risk breakdown and the most recent calls
    Home {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Distributions, trend and scalar statistics across all calls
    Analytics {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List reports with optional filtering and sorting
    Reports {
        /// Only show one risk level: low, medium, high
        #[arg(long)]
        risk: Option<String>,
        /// Case-insensitive match on title, filename or id
        #[arg(long, default_value = "")]
        search: String,
        /// newest (default), oldest, risk_desc, risk_asc
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one report in full
    Report {
        id: String,
        /// Also list other calls from the same caller
        #[arg(long)]
        history: bool,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Download all reports as CSV
    Export {
        /// Directory to write into (default: [export] dir, else Downloads)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Ask a single question about your calls
    Ask {
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Interactive chat about your calls
    Chat,
    /// List suggested chat questions
    Suggestions {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check a transcript file locally for PII, prohibited language and obligations
    Scan {
        file: PathBuf,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show statistics from the local request log
    Activity {
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Launch the web dashboard
    Web {
        /// Address to listen on (default: [web] addr)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Check connectivity and local configuration
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a single key, e.g. `api.base_url http://host:8000`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logger::init(&cfg.logging);
    let client = ApiClient::from_config(&cfg.api);

    let fmt = |s: &str| OutputFormat::from_str_opt(Some(s));

    match app.command {
        Commands::Home { format } => cli::pages::run_home(&client, &cfg, fmt(&format)),
        Commands::Analytics { format } => cli::pages::run_analytics(&client, &cfg, fmt(&format)),
        Commands::Reports {
            risk,
            search,
            sort,
            format,
        } => {
            let risk = match risk.as_deref() {
                None | Some("all") => None,
                Some(raw) => match RiskLevel::parse(raw) {
                    Some(level) => Some(level),
                    None => bail!("unknown risk level '{raw}' (expected low, medium or high)"),
                },
            };
            let Some(sort) = SortOrder::parse(&sort) else {
                bail!("unknown sort order '{sort}' (expected newest, oldest, risk_desc or risk_asc)");
            };
            let filter = ReportFilter { risk, search, sort };
            cli::pages::run_reports(&client, &filter, fmt(&format))
        }
        Commands::Report {
            id,
            history,
            format,
        } => cli::pages::run_report(&client, &id, history, fmt(&format)),
        Commands::Export { out } => cli::pages::run_export(&client, &cfg, out),
        Commands::Ask { question, format } => {
            cli::chat::run_ask(&client, &question.join(" "), fmt(&format))
        }
        Commands::Chat => cli::chat::run_chat(&client, &cfg),
        Commands::Suggestions { format } => cli::chat::run_suggestions(&client, fmt(&format)),
        Commands::Scan { file, format } => cli::scan::run_scan(&file, fmt(&format)),
        Commands::Activity { days, format } => cli::run_activity(fmt(&format), days),
        Commands::Web { addr } => {
            let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
            web::serve(client, cfg, &addr)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
