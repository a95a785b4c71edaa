use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::build_info;
use crate::error::Result;
use crate::output::Format;
use crate::store::data_dir::DataDir;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    message: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_sha: Option<&'static str>,
    data_dir: String,
    users_file: String,
    goals_file: String,
    users: usize,
    goals: usize,
}

pub fn run(data_dir: &Path, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let status = Status {
        message: "PlanPilot is working!",
        version: build_info::version(),
        git_sha: build_info::git_sha(),
        data_dir: data.root().display().to_string(),
        users_file: data.users.collection().path().display().to_string(),
        goals_file: data.goals.collection().path().display().to_string(),
        users: data.users.collection().len()?,
        goals: data.goals.collection().len()?,
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string(&status)?),
        Format::Pretty => {
            println!("{}", status.message.green().bold());
            let version = match status.git_sha {
                Some(sha) => format!("{} ({sha})", status.version),
                None => status.version.to_string(),
            };
            println!("  {} {}", "version:".dimmed(), version);
            println!("  {} {}", "data:".dimmed(), status.data_dir);
            println!(
                "  {} {} users, {} goals",
                "stored:".dimmed(),
                status.users,
                status.goals
            );
        }
        Format::Minimal => println!("ok"),
    }
    Ok(())
}
