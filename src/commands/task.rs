use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::data_dir::DataDir;
use crate::store::goals::TaskUpdate;

pub fn add(data_dir: &Path, goal_id: &str, title: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.add_task(goal_id, title)?;
    output::print_goal(&goal, format)
}

pub fn update(
    data_dir: &Path,
    goal_id: &str,
    task_id: &str,
    update: TaskUpdate,
    format: Format,
) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.update_task(goal_id, task_id, update)?;
    output::print_goal(&goal, format)
}

pub fn remove(data_dir: &Path, goal_id: &str, task_id: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let goal = data.goals.remove_task(goal_id, task_id)?;
    output::print_goal(&goal, format)
}
