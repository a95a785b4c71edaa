use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::data_dir::DataDir;
use crate::store::goals::{GoalUpdate, NewGoal};

pub fn list(data_dir: &Path, user_id: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goals = data.goals.list_for_user(user_id)?;
    output::print_goals(&goals, format)
}

pub fn show(data_dir: &Path, goal_id: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.get(goal_id)?;
    output::print_goal(&goal, format)
}

pub fn create(data_dir: &Path, new_goal: NewGoal, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.create(new_goal)?;
    output::print_goal(&goal, format)
}

pub fn update(data_dir: &Path, goal_id: &str, update: GoalUpdate, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.update(goal_id, update)?;
    output::print_goal(&goal, format)
}

pub fn delete(data_dir: &Path, goal_id: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.delete(goal_id)?;
    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({
                "message": "Goal deleted successfully",
                "deleted": goal.id
            })
        ),
        Format::Pretty => println!("Deleted goal '{}'", goal.title),
        Format::Minimal => println!("{}", goal.id),
    }
    Ok(())
}
