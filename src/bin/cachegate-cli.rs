use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "cachegate-cli")]
#[command(about = "Management CLI for the caching gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active version tag and namespace layout
    Status,
    /// Show per-namespace entry counts
    Cache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/internal/status", cli.url))
        .send()
        .await?;

    let status = res.status();
    let body: Value = res.json().await?;

    match cli.command {
        Commands::Status => {
            println!("HTTP {}", status);
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Cache => {
            if let Some(namespaces) = body.get("namespaces").and_then(|v| v.as_array()) {
                for ns in namespaces {
                    println!(
                        "{}\t{} entries",
                        ns.get("tag").and_then(|v| v.as_str()).unwrap_or("?"),
                        ns.get("entries").and_then(|v| v.as_u64()).unwrap_or(0)
                    );
                }
            }
        }
    }

    Ok(())
}
