//! Surveyup Server
//!
//! Starts the HTTP conversion service.

use std::env;
use std::process;
use surveyup_server::{config::ServerConfig, start_server, ServerError};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Note: no config file specified, using defaults");
        eprintln!("Usage: surveyup-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Surveyup Server - survey to web-upload spreadsheet converter");
    println!();
    println!("USAGE:");
    println!("    surveyup-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /convert      multipart field 'file' -> <name>_webup.xlsx");
    println!("    POST /analyze      multipart field 'file' -> JSON");
    println!("    GET  /health       service status");
    println!();
    println!("ENVIRONMENT:");
    println!("    ANTHROPIC_API_KEY  API key for the analysis model (required)");
    println!("    RUST_LOG           log filter (default: info)");
    println!();
}
