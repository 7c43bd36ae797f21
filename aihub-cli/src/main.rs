use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{json, Value};
use tracing::debug;

use aihub_nodes::catalog::SEARCH_MODELS_METHOD;
use aihub_nodes::credentials::{AiHubCredentials, Region, REGION_ENV};
use aihub_nodes::transport::ReqwestTransport;
use aihub_nodes::{register_all_nodes, NodeExecutionContext, NodeRegistry};

const CHAT_NODE: &str = "zeaburAiHub";

#[derive(Parser, Debug)]
#[command(name = "aihub", about = "Talk to Zeabur AI Hub from the command line")]
struct Cli {
    /// 覆盖 ZEABUR_AI_HUB_REGION (hnd1 / sfo1)
    #[arg(long, global = true, env = REGION_ENV)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List models, popular ones first
    Models {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Send a single message to a model
    Chat {
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        max_tokens: Option<i64>,
        content: String,
    },
    /// Check that the API key is accepted
    Check,
    /// Print node descriptions as JSON
    Nodes,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aihub=info".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_credentials(region: Option<&str>) -> Result<AiHubCredentials> {
    let mut credentials = AiHubCredentials::from_env()?;
    if let Some(region) = region {
        credentials.region = Region::from(region);
    }
    debug!("Using region {}", credentials.region.as_str());
    Ok(credentials)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let mut registry = NodeRegistry::new();
    register_all_nodes(&mut registry);

    match cli.command {
        Command::Nodes => {
            print_json(&serde_json::to_value(registry.descriptions())?)?;
        }
        Command::Check => {
            let credentials = load_credentials(cli.region.as_deref())?;
            credentials
                .test(&ReqwestTransport::new())
                .await
                .context("credential test failed")?;
            print_json(&json!({"ok": true, "region": credentials.region.as_str()}))?;
        }
        Command::Models { filter } => {
            let credentials = load_credentials(cli.region.as_deref())?;
            let node = registry
                .get(CHAT_NODE)
                .ok_or_else(|| anyhow!("node '{CHAT_NODE}' is not registered"))?;
            let ctx = NodeExecutionContext::new(Value::Null, credentials.to_value());
            let result = node
                .search_list(SEARCH_MODELS_METHOD, &ctx, filter.as_deref())
                .await?;
            print_json(&serde_json::to_value(result)?)?;
        }
        Command::Chat { model, temperature, max_tokens, content } => {
            let credentials = load_credentials(cli.region.as_deref())?;
            let node = registry
                .get(CHAT_NODE)
                .ok_or_else(|| anyhow!("node '{CHAT_NODE}' is not registered"))?;

            let mut options = serde_json::Map::new();
            if let Some(t) = temperature {
                options.insert("temperature".into(), json!(t));
            }
            if let Some(n) = max_tokens {
                options.insert("maxTokens".into(), json!(n));
            }
            let ctx = NodeExecutionContext::new(
                json!({
                    "resource": "chat",
                    "operation": "message",
                    "model": {"mode": "id", "value": model},
                    "content": content,
                    "options": options,
                }),
                credentials.to_value(),
            );
            let output = node.execute(&ctx).await?;
            print_json(&output.data)?;
        }
    }

    Ok(())
}
