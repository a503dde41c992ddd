use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use bookshelf_app::modules::books::seed;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalog service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Print the effective settings as JSON
    Settings,
    /// Validate a seed file without starting the service
    CheckSeed {
        /// JSON array of books in the create-request shape
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf serve");
            bookshelf_app::run(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckSeed { path } => {
            let entries = seed::read_seed(&path).await?;
            let issues = seed::check_entries(&entries);

            if issues.is_empty() {
                println!("{}: {} entries ok", path.display(), entries.len());
                return Ok(ExitCode::SUCCESS);
            }

            for issue in &issues {
                eprintln!("entry {}: {}", issue.index, issue.problems.join("; "));
            }
            eprintln!(
                "{}: {} of {} entries rejected",
                path.display(),
                issues.len(),
                entries.len()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
