use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("user with id {0} already exists")]
    UserExists(String),

    #[error("goal {0} not found")]
    GoalNotFound(String),

    #[error("goal {0} or task {1} not found")]
    TaskNotFound(String, String),

    #[error("invalid update document: {0}")]
    InvalidUpdate(String),

    #[error("corrupt collection file '{0}': {1}")]
    CorruptCollection(String, String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "user_not_found",
            Self::UserExists(_) => "user_exists",
            Self::GoalNotFound(_) => "goal_not_found",
            Self::TaskNotFound(_, _) => "task_not_found",
            Self::InvalidUpdate(_) => "invalid_update",
            Self::CorruptCollection(_, _) => "corrupt_collection",
            Self::Random(_) => "random_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
