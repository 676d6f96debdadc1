//! Terminal output formatting.

use colored::Colorize;
use todo_core::Task;

/// Print a single task.
pub fn print_task(task: &Task) {
    println!("{} {}", task.title.cyan().bold(), format!("({})", task.id).dimmed());
    if !task.description.is_empty() {
        println!("{}", task.description);
    }
    println!("{}: {}", "Completed".bold(), status_label(task.completed));
}

/// Print tasks as a table.
pub fn print_tasks_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks found.".dimmed());
        return;
    }

    println!("{:<36} {:<6} {:<30} {}", "ID", "Done", "Title", "Description");
    println!("{}", "─".repeat(100));

    for task in tasks {
        println!(
            "{:<36} {:<6} {:<30} {}",
            task.id,
            status_label(task.completed),
            truncate(&task.title, 28),
            truncate(&task.description, 40).dimmed()
        );
    }
}

fn status_label(completed: bool) -> colored::ColoredString {
    if completed {
        "yes".green()
    } else {
        "no".yellow()
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with "...".
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longe...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }
}
