use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slog-cli")]
#[command(about = "Command-line client for a running slog-viewer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List log files
    Files,
    /// Show parsed entries of a file
    Show { name: String },
    /// Download a file's raw contents
    Export {
        name: String,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Truncate a file (server must run in dev mode with clear enabled)
    Clear { name: String },
    /// Delete every file (server must run in dev mode with delete enabled)
    DeleteAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Files => {
            let res = client.get(format!("{}/log/getLogFilesList", base))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Show { name } => {
            let res = client.get(format!("{}/log/getFileContent", base))
                .query(&[("name", name)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Export { name, output } => {
            let res = client.get(format!("{}/log/exportFile", base))
                .query(&[("name", &name)])
                .send()
                .await?;
            let Some(json) = read_json(res).await? else {
                return Ok(());
            };
            match (json["code"].as_u64(), json["data"].as_str()) {
                (Some(200), Some(content)) => match output {
                    Some(path) => {
                        std::fs::write(&path, content)?;
                        println!("Exported {} to {}", name, path.display());
                    }
                    None => print!("{}", content),
                },
                _ => println!("{}", serde_json::to_string_pretty(&json)?),
            }
        }
        Commands::Clear { name } => {
            let res = client.post(format!("{}/log/clearFileContent", base))
                .form(&[("name", name)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::DeleteAll => {
            let res = client.post(format!("{}/log/deleteAllFiles", base))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(json) = read_json(res).await? {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
