use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "middleware-cli")]
#[command(about = "Admin CLI for the security middleware", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8082")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request counts per trusted caller
    Stats,
    /// Most recent audit entries
    Logs {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Liveness check
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Stats => client.get(format!("{base}/admin/stats")).send().await?,
        Commands::Logs { limit } => {
            client
                .get(format!("{base}/admin/logs"))
                .query(&[("limit", limit)])
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{base}/admin/health")).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
