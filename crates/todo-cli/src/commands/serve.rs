//! Web server command.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use todo_core::{MemoryCollection, RedisCollection, TaskCollection, TaskGateway};
use todo_web::ServerConfig;

/// Where tasks are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Redis,
    /// Process-local, lost on exit
    Memory,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Frontend origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// Task store backend
    #[arg(long, value_enum, default_value = "redis")]
    pub store: StoreKind,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./todo-serve.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, redis_url: &str) -> Result<()> {
    let collection: Arc<dyn TaskCollection> = match args.store {
        StoreKind::Redis => Arc::new(RedisCollection::connect(redis_url).await?),
        StoreKind::Memory => {
            tracing::warn!("Using in-memory task store; tasks are lost on exit");
            Arc::new(MemoryCollection::new())
        }
    };

    println!();
    println!("  {} {}", "Todo".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}        http://{}:{}", "API".green(), args.host, args.port);
    println!(
        "  {}     http://{}:{}/tasksSub",
        "Stream".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        frontend_url: args.frontend_url,
    };
    todo_web::run_server(TaskGateway::new(collection), config).await?;

    Ok(())
}
