//! Surveyup CLI - convert survey documents into web-upload spreadsheets.

use anyhow::Context;
use clap::Parser;
use surveyup_cli::{build_converter, commands, init_tracing, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Chunks(args) => {
            commands::execute_chunks(args, &config.extractor, &config.convert, &formatter)?;
        }
        cmd => {
            // Commands that call the oracle
            let converter = build_converter(&config, cli.api_key.as_deref())?;

            match cmd {
                Command::Convert(args) => {
                    commands::execute_convert(args, &converter, &formatter).await?;
                }
                Command::Analyze(args) => {
                    commands::execute_analyze(args, &converter, &formatter).await?;
                }
                Command::Chunks(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
