use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "cep-cli")]
#[command(about = "Query a running CEP resolver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a postal code and print the address
    Lookup {
        /// Postal code, with or without the dash
        cep: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Lookup { cep } => {
            let res = client
                .get(format!("{}/", cli.url.trim_end_matches('/')))
                .query(&[("cep", cep.as_str())])
                .send()
                .await?;
            if !print_response(res).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Print the record, or the failure reason. Returns whether the lookup succeeded.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let reason = match status.as_u16() {
            400 => "missing postal code",
            408 => "no provider answered in time",
            500 => "providers failed or returned an unexpected payload",
            _ => "unexpected response",
        };
        eprintln!("Error: resolver returned status {} ({})", status, reason);
        return Ok(false);
    }

    let provider = res
        .headers()
        .get("x-cep-provider")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    eprintln!("Via: {}", provider);
    Ok(true)
}
