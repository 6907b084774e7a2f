//! logctl - read-only inspection tool for a seqlog master or secondary
//!
//! Usage:
//!   logctl status              - Show health of the node at --endpoint
//!   logctl messages            - List the node's visible messages

use clap::{Parser, Subcommand};
use serde::Deserialize;

/// Inspect a running seqlog master or secondary node.
#[derive(Parser)]
#[command(name = "logctl")]
#[command(about = "Inspect a seqlog master or secondary node", long_about = None)]
struct Cli {
    /// Node HTTP endpoint to query.
    #[arg(short, long, default_value = "http://127.0.0.1:8000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the node's health/status
    Status,
    /// List the node's visible messages
    Messages,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MasterHealthResponse {
    status: String,
    count: usize,
    secondaries: Vec<String>,
    secondary_statuses: std::collections::HashMap<String, SecondaryStatus>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct SecondaryStatus {
    status: String,
    #[serde(default)]
    last_heartbeat: Option<u64>,
    #[serde(default)]
    failures: u32,
}

#[derive(Debug, Deserialize)]
struct SecondaryHealthResponse {
    status: String,
    count: usize,
    delay_ms: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status => show_status(&cli.endpoint).await,
        Commands::Messages => show_messages(&cli.endpoint).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Tries the master health shape first, falling back to the secondary's
/// shape -- logctl doesn't know which kind of node it's pointed at.
async fn show_status(endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{endpoint}/health");
    let client = reqwest::Client::new();
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(format!("API error: {}", response.status()).into());
    }

    let body = response.text().await?;
    let raw: serde_json::Value = serde_json::from_str(&body)?;

    // A master's /health body carries a "secondaries" field; a secondary's
    // does not. That's the only reliable way to tell them apart, since
    // logctl doesn't know in advance which kind of node it's pointed at.
    if raw.get("secondaries").is_some() {
        let master: MasterHealthResponse = serde_json::from_value(raw)?;
        println!();
        println!("Master Status");
        println!("=============");
        println!();
        println!("Status: {}", master.status);
        println!("Messages: {}", master.count);
        println!("Secondaries: {}", master.secondaries.len());
        println!();
        println!("{:<28} {:<12} {:<10}", "SECONDARY", "STATE", "FAILURES");
        println!("{}", "-".repeat(52));
        for peer in &master.secondaries {
            if let Some(s) = master.secondary_statuses.get(peer) {
                println!("{:<28} {:<12} {:<10}", peer, s.status, s.failures);
            } else {
                println!("{:<28} {:<12} {:<10}", peer, "unknown", "-");
            }
        }
        println!();
        return Ok(());
    }

    let secondary: SecondaryHealthResponse = serde_json::from_value(raw)?;
    println!();
    println!("Secondary Status");
    println!("================");
    println!();
    println!("Status: {}", secondary.status);
    println!("Messages applied: {}", secondary.count);
    println!("Artificial delay: {}ms", secondary.delay_ms);
    println!();
    Ok(())
}

async fn show_messages(endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{endpoint}/messages");
    let client = reqwest::Client::new();
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(format!("API error: {}", response.status()).into());
    }

    let body: MessagesResponse = response.json().await?;

    println!();
    println!("{} message(s):", body.messages.len());
    for (i, msg) in body.messages.iter().enumerate() {
        println!("  [{}] {}", i + 1, msg);
    }
    println!();

    Ok(())
}
