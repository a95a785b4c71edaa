use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planpilot::model::{GoalStatus, Priority};
use planpilot::output::Format;
use planpilot::store::goals::{GoalUpdate, NewGoal, NewTask, TaskUpdate};
use planpilot::store::users::{NewUser, ProfileUpdate, TelegramProfile};

#[derive(Parser)]
#[command(
    name = "planpilot",
    version,
    about = "Goal and task tracker backed by flat-file JSON collections"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Directory holding users.json and goals.json (default: $PLANPILOT_DATA_DIR, then ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report that the store is reachable, with version and document counts
    Status,
    /// Manage user profiles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
    /// Manage tasks inside a goal
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user with an explicit user ID
    Create {
        user_id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
        #[arg(long)]
        telegram_id: Option<String>,
    },
    /// Show a user's profile
    Show { user_id: String },
    /// Update username and/or photo
    Update {
        user_id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Find or register the user linked to a Telegram account
    Register {
        telegram_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[derive(Subcommand)]
enum GoalAction {
    /// List a user's goals, newest first
    List { user_id: String },
    /// Show a single goal
    Show { goal_id: String },
    /// Create a goal for a user
    Create {
        user_id: String,
        title: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long, value_enum, default_value = "medium")]
        priority: Priority,
        /// Initial task title (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    /// Edit goal fields
    Update {
        goal_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long, value_enum)]
        status: Option<GoalStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },
    /// Delete a goal and its tasks
    Delete { goal_id: String },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Append a task to a goal
    Add { goal_id: String, title: String },
    /// Edit a task's title or completion
    Update {
        goal_id: String,
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Remove a task from a goal
    Remove { goal_id: String, task_id: String },
}

fn run(cli: Cli, format: Format) -> planpilot::error::Result<()> {
    let root = planpilot::config::resolve_data_dir(cli.data_dir);

    match cli.command {
        Commands::Status => planpilot::commands::status::run(&root, format),
        Commands::User { action } => match action {
            UserAction::Create {
                user_id,
                username,
                first_name,
                last_name,
                photo_url,
                telegram_id,
            } => planpilot::commands::user::create(
                &root,
                NewUser {
                    user_id,
                    username,
                    first_name,
                    last_name,
                    photo_url,
                    telegram_id,
                },
                format,
            ),
            UserAction::Show { user_id } => planpilot::commands::user::show(&root, &user_id, format),
            UserAction::Update {
                user_id,
                username,
                photo_url,
            } => planpilot::commands::user::update(
                &root,
                &user_id,
                ProfileUpdate {
                    username,
                    photo_url,
                },
                format,
            ),
            UserAction::Register {
                telegram_id,
                first_name,
                username,
                last_name,
            } => planpilot::commands::user::register(
                &root,
                TelegramProfile {
                    telegram_id,
                    username,
                    first_name,
                    last_name,
                },
                format,
            ),
        },
        Commands::Goal { action } => match action {
            GoalAction::List { user_id } => planpilot::commands::goal::list(&root, &user_id, format),
            GoalAction::Show { goal_id } => planpilot::commands::goal::show(&root, &goal_id, format),
            GoalAction::Create {
                user_id,
                title,
                description,
                deadline,
                priority,
                tasks,
            } => planpilot::commands::goal::create(
                &root,
                NewGoal {
                    user_id,
                    title,
                    description,
                    deadline,
                    status: GoalStatus::Pending,
                    priority,
                    tasks: tasks
                        .into_iter()
                        .map(|title| NewTask {
                            title,
                            completed: false,
                        })
                        .collect(),
                },
                format,
            ),
            GoalAction::Update {
                goal_id,
                title,
                description,
                deadline,
                status,
                priority,
            } => planpilot::commands::goal::update(
                &root,
                &goal_id,
                GoalUpdate {
                    title,
                    description,
                    deadline,
                    status,
                    priority,
                    tasks: None,
                },
                format,
            ),
            GoalAction::Delete { goal_id } => {
                planpilot::commands::goal::delete(&root, &goal_id, format)
            }
        },
        Commands::Task { action } => match action {
            TaskAction::Add { goal_id, title } => {
                planpilot::commands::task::add(&root, &goal_id, &title, format)
            }
            TaskAction::Update {
                goal_id,
                task_id,
                title,
                completed,
            } => planpilot::commands::task::update(
                &root,
                &goal_id,
                &task_id,
                TaskUpdate { title, completed },
                format,
            ),
            TaskAction::Remove { goal_id, task_id } => {
                planpilot::commands::task::remove(&root, &goal_id, &task_id, format)
            }
        },
    }
}

fn main() {
    planpilot::config::init_tracing();
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        tracing::debug!(error = %e, "command failed");
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
