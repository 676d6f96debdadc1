//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;
pub mod task;

/// Default Redis URL when neither `--redis-url` nor `REDIS_URL` is set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Todo list server and task management
#[derive(Parser)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Redis URL of the task store
    #[arg(long, global = true, env = "REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Task management
    Task(task::TaskArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.redis_url).await,
            Commands::Task(args) => task::execute(args, &self.redis_url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update_flags() {
        let cli = Cli::try_parse_from([
            "todo", "task", "update", "abc", "--title", "new", "--completed", "true",
        ])
        .unwrap();
        match cli.command {
            Commands::Task(task::TaskArgs {
                command: task::TaskCommands::Update(args),
                ..
            }) => {
                assert_eq!(args.task_id, "abc");
                assert_eq!(args.title.as_deref(), Some("new"));
                assert_eq!(args.completed, Some(true));
                assert!(args.description.is_none());
            }
            _ => panic!("expected task update"),
        }
    }
}
