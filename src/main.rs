//! Binary entry point for `reviewbot`.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use reviewbot::{
    app::App,
    cli::{Args, Command, TokensAction},
    client::api::redact_token,
    config::{default_config_path, load_config},
    logging::{LoggingConfig, init_logging},
    reporter::Reporter,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(&config_path)?;
    config.validate()?;

    let logging = LoggingConfig::from_env()
        .with_verbosity(args.verbose)
        .with_file_level(config.log_level.as_deref());
    let _log_guard = init_logging(logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), config = %config_path.display(), "reviewbot starting");

    let (sender, reporter) = Reporter::from_config(&config)?.spawn()?;
    let mut app =
        App::new(config_path, config, sender).with_debug_responses(args.debug_responses);

    let result = run(&mut app, args.command).await;

    // the reporter drains its queue once the last sender is gone
    drop(app);
    if reporter.join().is_err() {
        error!("Reporter thread panicked");
    }

    result
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Token { token } => {
            app.set_token(&token)?;
            println!("Token saved.");
        },
        Command::Certs { update } => {
            for cert in app.certs(update).await? {
                println!("Project Name: {}, Project ID: {}", cert.name, cert.id);
            }
        },
        Command::Assigned { open } => {
            let assigned = app.assigned().await?;
            if open {
                for submission in &assigned {
                    let url = app.config().submission_url(submission.id);
                    if let Err(e) = open::that(&url) {
                        warn!(error = %e, url = %url, "Failed to open browser");
                    }
                }
            }
        },
        Command::Review => {
            let summary = app.review().await?;
            info!(?summary, "Review round finished");
        },
        Command::ReqWithCert { seconds } => {
            let poller = app.claim_poller(seconds).await?;
            let shutdown = poller.shutdown_sender();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown.send(());
                }
            });

            println!(
                "Claiming every {seconds}s with {} token(s) for {} project(s). Press Ctrl-C to stop.",
                app.config().credentials().len(),
                app.config().certified.len()
            );
            let rounds = poller.start().await;
            println!("Stopped after {rounds} round(s).");
        },
        Command::Unassign { submission_id } => {
            app.unassign(submission_id)
                .await
                .wrap_err_with(|| format!("failed to unassign submission {submission_id}"))?;
            println!("Submission {submission_id} unassigned.");
        },
        Command::Submissions => {
            let submissions = app.submissions().await?;
            if submissions.is_empty() {
                println!("No submissions.");
            }
            for submission in submissions {
                println!(
                    "ID: {}, Project: {}, Price: {}, Status: {}",
                    submission.id,
                    submission.project_name().unwrap_or("unknown project"),
                    submission.price_or_unknown(),
                    submission.status.as_deref().unwrap_or("-")
                );
            }
        },
        Command::Completed => {
            let completed = app.completed().await?;
            if completed.is_empty() {
                println!("No completed reviews.");
            }
            for submission in completed {
                println!(
                    "ID: {}, Project: {}, Price: {}, Completed: {}",
                    submission.id,
                    submission.project_name().unwrap_or("unknown project"),
                    submission.price_or_unknown(),
                    submission
                        .completed_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".into())
                );
            }
        },
        Command::Feedbacks => {
            let feedbacks = app.feedbacks().await?;
            println!("{}", serde_json::to_string_pretty(&feedbacks)?);
        },
        Command::Stats => {
            let stats = app.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        },
        Command::Tokens { action } => match action {
            TokensAction::List => {
                let primary = app.config().token.clone();
                for token in app.config().credentials() {
                    let marker = if token == primary { " (primary)" } else { "" };
                    println!("{}{marker}", redact_token(&token));
                }
            },
            TokensAction::Add { token } => {
                if app.add_token(&token)? {
                    println!("Token added.");
                } else {
                    println!("Token already configured.");
                }
            },
            TokensAction::Remove { token } => {
                if app.remove_token(&token)? {
                    println!("Token removed.");
                } else {
                    println!("Token not found.");
                }
            },
        },
    }

    Ok(())
}
