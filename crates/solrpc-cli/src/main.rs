use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;

use client::McpClient;

#[derive(Parser)]
#[command(name = "solrpc", about = "Query a solrpc MCP server from the command line")]
struct Cli {
    /// solrpc server URL
    #[arg(long, env = "SOLRPC_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tools the server exposes
    ListTools,

    /// Call a tool and print its result
    Call {
        /// Tool name, e.g. `get_account_balance`
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = McpClient::new(&cli.server_url);

    match cli.command {
        Commands::ListTools => {
            for tool in client.list_tools().await? {
                println!(
                    "{:<40} {}",
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Call { tool, args } => {
            let arguments: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| anyhow::anyhow!("--args is not valid JSON: {e}"))?;
            let output = client.call_tool(&tool, arguments).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
