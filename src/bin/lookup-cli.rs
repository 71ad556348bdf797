use clap::{Parser, Subcommand};
use lookup_sdk::{GatewayClient, SdkError};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "lookup-cli")]
#[command(about = "Command-line client for the lookup gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a session and show the token and remaining quota
    Session,
    /// Run a search (email, phone, username or domain)
    Search {
        #[arg(short = 't', long = "type", default_value = "email")]
        kind: String,
        query: String,
    },
    /// Check gateway health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = GatewayClient::new(&cli.url);

    match cli.command {
        Commands::Session => {
            let info = client.open_session().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Search { kind, query } => {
            let info = client.open_session().await?;
            eprintln!("Searches remaining before this one: {}/{}", info.remaining, info.limit);
            match client.search(&kind, &query).await {
                Ok(result) => print_json(&result)?,
                Err(SdkError::Gateway { status, message }) => {
                    eprintln!("Error: gateway returned {}: {}", status, message);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            print_json(&health)?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
