use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::collection::Collection;
use crate::store::goals::GoalStore;
use crate::store::users::UserStore;

pub const USERS_FILE: &str = "users.json";
pub const GOALS_FILE: &str = "goals.json";

/// The data directory holding every collection file.
pub struct DataDir {
    root: PathBuf,
    pub users: UserStore,
    pub goals: GoalStore,
}

impl DataDir {
    /// Open (and lazily initialize) both collections under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let users = UserStore::new(Collection::open(root.join(USERS_FILE))?);
        let goals = GoalStore::new(Collection::open(root.join(GOALS_FILE))?, users.clone());
        Ok(Self {
            root: root.to_path_buf(),
            users,
            goals,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
