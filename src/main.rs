use anyhow::Result;
use clap::Parser;
use std::io::BufRead;

/// Parse filter-query expressions and dump the clause tree as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expression to parse; reads lines from stdin when omitted
    expression: Option<String>,

    /// Print the clause tree on a single line
    #[arg(long)]
    compact: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.expression {
        Some(expression) => {
            if !report(&expression, cli.compact)? {
                std::process::exit(1);
            }
        }
        None => {
            for line in std::io::stdin().lock().lines() {
                let line = line?;
                // Nothing to report for empty input
                if line.is_empty() {
                    continue;
                }
                report(&line, cli.compact)?;
            }
        }
    }

    Ok(())
}

/// Parse one expression and print either the JSON dump of the tree or the
/// caret-style diagnostic. Returns whether the parse succeeded.
fn report(input: &str, compact: bool) -> Result<bool> {
    match clausify::parse(input) {
        Ok(clause) => {
            tracing::debug!("parsed {} bytes of input", input.len());
            let dump = if compact {
                serde_json::to_string(&clause)?
            } else {
                serde_json::to_string_pretty(&clause)?
            };
            println!("{dump}");
            Ok(true)
        }
        Err(error) => {
            tracing::debug!("{error}");
            eprintln!("{}", error.render(input));
            Ok(false)
        }
    }
}
