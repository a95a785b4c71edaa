use clap::ValueEnum;
use colored::Colorize;

use crate::error::Result;
use crate::model::{Goal, GoalStatus, User, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

pub fn print_user(user: &User, format: Format) -> Result<()> {
    let profile = UserProfile::from(user);
    match format {
        Format::Json => println!("{}", serde_json::to_string(&profile)?),
        Format::Pretty => {
            let name = match &profile.last_name {
                Some(last) => format!("{} {}", profile.first_name, last),
                None => profile.first_name.clone(),
            };
            println!(
                "{} {} {}",
                format!("[{}]", profile.user_id).cyan().bold(),
                profile.username,
                format!("({name})").dimmed()
            );
            if let Some(ref photo) = profile.photo_url {
                println!("  {} {}", "photo:".dimmed(), photo);
            }
        }
        Format::Minimal => println!("{} {}", profile.user_id, profile.username),
    }
    Ok(())
}

fn style_status(status: GoalStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        GoalStatus::Pending => label.yellow(),
        GoalStatus::InProgress => label.blue(),
        GoalStatus::Completed => label.green(),
        GoalStatus::Canceled => label.dimmed(),
    }
}

pub fn print_goal(goal: &Goal, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(goal)?),
        Format::Pretty => {
            let (done, total) = goal.progress();
            println!(
                "{} {} ({}) {}",
                format!("[{}]", goal.id).cyan().bold(),
                goal.title.bold(),
                style_status(goal.status),
                format!("{done}/{total}").dimmed()
            );
            if let Some(ref desc) = goal.description {
                println!("  {}", desc);
            }
            println!("  priority: {}", goal.priority);
            if let Some(ref deadline) = goal.deadline {
                println!("  deadline: {}", deadline);
            }
            for task in &goal.tasks {
                let mark = if task.completed {
                    "[x]".green()
                } else {
                    "[ ]".normal()
                };
                println!("  {} {} {}", mark, task.title, task.id.dimmed());
            }
        }
        Format::Minimal => println!("{}", minimal_line(goal)),
    }
    Ok(())
}

pub fn print_goals(goals: &[Goal], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(goals)?),
        Format::Pretty => {
            for goal in goals {
                print_goal(goal, Format::Pretty)?;
                println!();
            }
        }
        Format::Minimal => {
            println!(
                "{:36} {:16} {:11} {:6} TASKS",
                "ID", "TITLE", "STATUS", "PRIO"
            );
            println!("{}", "-".repeat(80));
            for goal in goals {
                println!("{}", minimal_line(goal));
            }
        }
    }
    Ok(())
}

fn minimal_line(goal: &Goal) -> String {
    let (done, total) = goal.progress();
    format!(
        "{:36} {:16} {:11} {:6} {}/{}",
        goal.id,
        truncate_title(&goal.title, 16),
        goal.status.to_string(),
        goal.priority.to_string(),
        done,
        total
    )
}

pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() > max_len {
        let truncated: String = title.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}
