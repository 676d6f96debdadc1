//! Task management commands.
//!
//! These talk to the store directly and then ask a running server, if any,
//! to push the new list to its open streams.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use todo_core::web_notifier::DEFAULT_WEB_URL;
use todo_core::{RedisCollection, TaskGateway, TaskPatch, WebNotifier};

use crate::output;

#[derive(Args)]
pub struct TaskArgs {
    /// Base URL of the running web server to notify
    #[arg(long, global = true, env = "TODO_WEB_URL", default_value = DEFAULT_WEB_URL)]
    pub web_url: String,

    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List all tasks
    List,

    /// Create a new task
    Add(AddTaskArgs),

    /// Change fields of a task
    Update(UpdateTaskArgs),

    /// Mark a task as completed
    Done { task_id: String },

    /// Mark a task as not completed
    Undo { task_id: String },

    /// Delete a task
    Rm { task_id: String },
}

#[derive(Args)]
pub struct AddTaskArgs {
    /// Task title
    pub title: String,

    /// Task description
    pub description: String,
}

#[derive(Args)]
pub struct UpdateTaskArgs {
    /// Task ID
    pub task_id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub completed: Option<bool>,
}

pub async fn execute(args: TaskArgs, redis_url: &str) -> Result<()> {
    let collection = RedisCollection::connect(redis_url).await?;
    let tasks = TaskGateway::new(Arc::new(collection));
    let notifier = WebNotifier::with_url(&args.web_url);

    match args.command {
        TaskCommands::List => {
            let list = tasks.list().await?;
            output::print_tasks_table(&list);
            return Ok(());
        }

        TaskCommands::Add(add) => {
            let id = tasks.create(&add.title, &add.description).await?;
            println!(
                "{} Created task: {} ({})",
                "✓".green().bold(),
                add.title.cyan(),
                id.dimmed()
            );
        }

        TaskCommands::Update(update) => {
            let patch = TaskPatch {
                title: update.title,
                description: update.description,
                completed: update.completed,
            };
            tasks.update(&update.task_id, patch).await?;
            let task = tasks.get(&update.task_id).await?;
            println!("{} Updated task", "✓".green().bold());
            output::print_task(&task);
        }

        TaskCommands::Done { task_id } => {
            tasks.update(&task_id, TaskPatch::completed(true)).await?;
            println!("{} Marked {} done", "✓".green().bold(), task_id.dimmed());
        }

        TaskCommands::Undo { task_id } => {
            tasks.update(&task_id, TaskPatch::completed(false)).await?;
            println!("{} Marked {} not done", "✓".green().bold(), task_id.dimmed());
        }

        TaskCommands::Rm { task_id } => {
            tasks.delete(&task_id).await?;
            println!("{} Deleted task {}", "✓".green().bold(), task_id.dimmed());
        }
    }

    if !notifier.notify_changed().await {
        println!(
            "  {}",
            format!("No server reachable at {}; open streams were not updated.", args.web_url).dimmed()
        );
    }

    Ok(())
}
