use std::path::Path;

use colored::Colorize;
use tracing::info;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::data_dir::DataDir;
use crate::store::users::{NewUser, ProfileUpdate, TelegramProfile};

pub fn create(data_dir: &Path, new_user: NewUser, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let user = data.users.create(new_user)?;
    output::print_user(&user, format)
}

pub fn show(data_dir: &Path, user_id: &str, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let user = data.users.get(user_id)?;
    output::print_user(&user, format)
}

pub fn update(data_dir: &Path, user_id: &str, update: ProfileUpdate, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let user = data.users.update_profile(user_id, update)?;
    output::print_user(&user, format)
}

/// Bot `/start` flow: look up or register the Telegram account.
pub fn register(data_dir: &Path, profile: TelegramProfile, format: Format) -> Result<()> {
    let data = DataDir::open(data_dir)?;
    let (user, created) = data.users.register_telegram(profile)?;
    if created {
        info!(user_id = %user.user_id, "registered telegram user");
    }
    match format {
        Format::Pretty => {
            println!(
                "Welcome to PlanPilot, {}! Your personal ID: {}",
                user.first_name,
                user.user_id.cyan().bold()
            );
            Ok(())
        }
        _ => output::print_user(&user, format),
    }
}
