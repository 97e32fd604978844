//! `callscope ask`, `callscope chat` and `callscope suggestions`.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use super::{OutputFormat, csv_field, markdown};
use crate::api::{Backend, QuerySuggestion};
use crate::chat::{ChatMessage, ChatSession, SuggestionCache};
use crate::config::schema::CallscopeConfig;

/// Ask a single question in a fresh session.
pub fn run_ask<B: Backend + ?Sized>(backend: &B, question: &str, format: OutputFormat) -> Result<()> {
    let mut session = ChatSession::new();
    let Some(reply) = session.submit(backend, question).cloned() else {
        eprintln!("{}", "Nothing to ask — the question is empty.".yellow());
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "session_id": session.session_id(),
                "messages": session.messages(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => print_reply(&reply),
    }
    Ok(())
}

/// Interactive chat. Reads questions from stdin until EOF or `/quit`.
pub fn run_chat<B: Backend + ?Sized>(backend: &B, cfg: &CallscopeConfig) -> Result<()> {
    let mut session = ChatSession::new();
    let mut suggestions = SuggestionCache::new();

    println!("{}", "Ask about your calls".bold().cyan());
    println!(
        "  {}",
        "Type a question, a suggestion number, /suggestions or /quit.".dimmed()
    );
    if cfg.chat.show_suggestions {
        print_numbered(suggestions.get(backend));
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "you ›".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "/quit" | "/exit" => break,
            "/suggestions" => {
                print_numbered(suggestions.get(backend));
                continue;
            }
            _ => {}
        }

        // A bare number picks a suggestion.
        let question = match input.parse::<usize>() {
            Ok(n) if n >= 1 => match suggestions.get(backend).get(n - 1) {
                Some(s) => {
                    println!("  {}", s.text.dimmed());
                    s.text.clone()
                }
                None => input.to_string(),
            },
            _ => input.to_string(),
        };

        let Some(query) = session.begin(&question) else {
            continue;
        };
        eprint!("{}", "  thinking…\r".dimmed());
        let result = backend.chat(&query, session.session_id());
        eprint!("{}\r", " ".repeat(12));
        if let Some(reply) = session.resolve(result) {
            print_reply(reply);
        }
        println!();
    }

    Ok(())
}

/// List the suggested questions.
pub fn run_suggestions<B: Backend + ?Sized>(backend: &B, format: OutputFormat) -> Result<()> {
    let mut cache = SuggestionCache::new();
    let items = cache.get(backend);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => {
            println!("category,text");
            for s in items {
                println!("{},{}", csv_field(&s.category), csv_field(&s.text));
            }
        }
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No suggestions available.".yellow());
            } else {
                println!("{}", "Suggested Questions".bold().cyan());
                print_numbered(items);
            }
        }
    }
    Ok(())
}

fn print_numbered(items: &[QuerySuggestion]) {
    for (i, s) in items.iter().enumerate() {
        let category = if s.category.is_empty() {
            String::new()
        } else {
            format!("[{}] ", s.category)
        };
        println!("  {:>2}. {}{}", i + 1, category.dimmed(), s.text);
    }
}

fn print_reply(reply: &ChatMessage) {
    let label = if reply.error {
        "assistant ›".red().bold()
    } else {
        "assistant ›".cyan().bold()
    };
    println!("{label}");
    println!("{}", markdown::render(&reply.content));
    if let Some(context) = &reply.data_context {
        println!("  {}", format!("based on: {context}").dimmed());
    }
}
