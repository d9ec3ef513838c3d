use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verify_event::report;

/// Cross-checks an event URL against the ticketing API and the event page
#[derive(Parser, Debug)]
#[command(name = "verify-event")]
#[command(version)]
struct Args {
    /// Event page URL
    url: Option<String>,

    /// Expected event date, YYYY-MM-DD
    target_date: Option<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verify_event=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let Some(url) = args.url else {
        eprintln!("{}", Args::command().render_usage());
        return Ok(ExitCode::from(1));
    };

    let verdict = verify_event::verify_event(&url, args.target_date.as_deref())?;
    print!("{}", report::render(&verdict));
    Ok(ExitCode::SUCCESS)
}
