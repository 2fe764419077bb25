use clap::{Parser, Subcommand};
use document_verifier_lib::commands;
use document_verifier_lib::config::{self, Config};
use document_verifier_lib::{CancelToken, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "document-verifier", version, about = "Verify and correct extracted document data")]
struct Cli {
    /// Explicit .env file (defaults to ./.env)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether the backend is configured
    Status,
    /// Wait for extraction and list the fields
    Fetch {
        document_id: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Also write the decoded source document here
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Render a page with a field highlighted to PNG
    Render {
        document_id: String,
        #[arg(long, short)]
        out: PathBuf,
        #[arg(long)]
        page: Option<u32>,
        /// Field whose bounding box is highlighted
        #[arg(long)]
        focus: Option<String>,
        /// Preview column width in pixels
        #[arg(long)]
        width: Option<f64>,
    },
    /// Apply corrections and submit the verified data
    Verify {
        document_id: String,
        /// key=value, repeatable; "\n" in the value becomes a line break
        #[arg(long = "set", value_name = "KEY=VALUE")]
        edits: Vec<String>,
        /// Write the server's verified data here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(env_file: Option<&PathBuf>) -> Result<Config> {
    match env_file {
        Some(path) => Config::from_path(path),
        None => Config::from_env(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let cancel = CancelToken::new();
    match cli.command {
        Command::Status => {
            if let Some(path) = &cli.env_file {
                let _ = dotenvy::from_path(path);
            }
            println!("{}", config::status());
        }
        Command::Fetch {
            document_id,
            json,
            save,
        } => {
            let config = load_config(cli.env_file.as_ref())?;
            let session = commands::open_session(&config, &document_id, &cancel)?;
            let summary = commands::summarize(&session)?;
            if json {
                let out = serde_json::to_string_pretty(&summary)
                    .map_err(|e| document_verifier_lib::VerifyError::Decode(e.to_string()))?;
                println!("{}", out);
            } else {
                println!("{} ({})", summary.file_name, summary.document_id);
                for row in &summary.fields {
                    let value = if row.multiline {
                        row.value.replace('\n', "\n    ")
                    } else {
                        row.value.clone()
                    };
                    println!("  {} {}: {}", row.key, row.confidence, value);
                }
            }
            if let Some(path) = save {
                commands::save_document(&session, &path)?;
                log::info!("Saved document to {}", path.display());
            }
        }
        Command::Render {
            document_id,
            out,
            page,
            focus,
            width,
        } => {
            let config = load_config(cli.env_file.as_ref())?;
            let mut session = commands::open_session(&config, &document_id, &cancel)?;
            let summary = commands::render_preview(
                &mut session,
                page,
                focus.as_deref(),
                width.unwrap_or(config.container_width),
                &out,
            )?;
            println!(
                "Page {} of {} -> {} ({}x{})",
                summary.page, summary.total_pages, summary.output, summary.width, summary.height
            );
            if !summary.page_rendered {
                log::info!("Page content not drawn; the PNG holds the highlight overlay only");
            }
        }
        Command::Verify {
            document_id,
            edits,
            out,
        } => {
            let config = load_config(cli.env_file.as_ref())?;
            let edits = edits
                .iter()
                .map(|raw| commands::parse_edit(raw))
                .collect::<Result<Vec<_>>>()?;
            let mut session = commands::open_session(&config, &document_id, &cancel)?;
            let verified = commands::verify_document(&config, &mut session, &edits)?;
            let rendered = serde_json::to_string_pretty(&verified)
                .map_err(|e| document_verifier_lib::VerifyError::Decode(e.to_string()))?;
            match out {
                Some(path) => std::fs::write(&path, rendered)?,
                None => println!("{}", rendered),
            }
            log::info!("Data saved successfully!");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
