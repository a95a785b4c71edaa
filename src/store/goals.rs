use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{PlanError, Result};
use crate::ids;
use crate::model::{Goal, GoalStatus, Priority, Task};
use crate::store::collection::{Collection, ReturnDocument};
use crate::store::filter::Filter;
use crate::store::update::Update;
use crate::store::users::UserStore;
use crate::store::{from_document, to_document};

const TASKS_FIELD: &str = "tasks";

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub user_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub status: GoalStatus,
    pub priority: Priority,
    #[serde(skip)]
    pub tasks: Vec<NewTask>,
}

/// Goal fields to replace; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<GoalStatus>,
    pub priority: Option<Priority>,
    /// Replaces the whole task list. Tasks with an empty id get a fresh one.
    pub tasks: Option<Vec<Task>>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Goals and their embedded tasks.
#[derive(Debug, Clone)]
pub struct GoalStore {
    collection: Collection,
    users: UserStore,
}

impl GoalStore {
    pub fn new(collection: Collection, users: UserStore) -> Self {
        Self { collection, users }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Goals owned by `user_id`, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Goal>> {
        self.users.get(user_id)?;
        let goals = self
            .collection
            .find(&Filter::new().eq("userId", user_id))?
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<Goal>>>()?;
        Ok(newest_first(goals))
    }

    pub fn get(&self, goal_id: &str) -> Result<Goal> {
        let doc = self
            .collection
            .find_by_id(goal_id)?
            .ok_or_else(|| PlanError::GoalNotFound(goal_id.to_string()))?;
        from_document(doc)
    }

    pub fn create(&self, new_goal: NewGoal) -> Result<Goal> {
        self.users.get(&new_goal.user_id)?;

        let tasks: Vec<Task> = new_goal
            .tasks
            .iter()
            .map(|t| Task {
                id: ids::document_id(),
                title: t.title.clone(),
                completed: t.completed,
            })
            .collect();
        let mut fields = to_document(&new_goal)?;
        fields.insert(TASKS_FIELD.to_string(), serde_json::to_value(tasks)?);

        let goal: Goal = from_document(self.collection.create(fields)?)?;
        info!(goal_id = %goal.id, user_id = %goal.user_id, "created goal");
        Ok(goal)
    }

    pub fn update(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let mut fields: Vec<(&str, Value)> = Vec::new();
        if let Some(title) = update.title {
            fields.push(("title", Value::String(title)));
        }
        if let Some(description) = update.description {
            fields.push(("description", Value::String(description)));
        }
        if let Some(deadline) = update.deadline {
            fields.push(("deadline", Value::String(deadline)));
        }
        if let Some(status) = update.status {
            fields.push(("status", serde_json::to_value(status)?));
        }
        if let Some(priority) = update.priority {
            fields.push(("priority", serde_json::to_value(priority)?));
        }
        if let Some(mut tasks) = update.tasks {
            for task in tasks.iter_mut().filter(|t| t.id.is_empty()) {
                task.id = ids::document_id();
            }
            fields.push((TASKS_FIELD, serde_json::to_value(tasks)?));
        }

        self.apply(goal_id, &Update::set(fields))
    }

    pub fn delete(&self, goal_id: &str) -> Result<Goal> {
        let doc = self
            .collection
            .find_by_id_and_delete(goal_id)?
            .ok_or_else(|| PlanError::GoalNotFound(goal_id.to_string()))?;
        info!(goal_id, "deleted goal");
        from_document(doc)
    }

    pub fn add_task(&self, goal_id: &str, title: &str) -> Result<Goal> {
        self.apply(
            goal_id,
            &Update::push(TASKS_FIELD, json!({ "title": title, "completed": false })),
        )
    }

    pub fn update_task(&self, goal_id: &str, task_id: &str, update: TaskUpdate) -> Result<Goal> {
        let mut fields = Vec::new();
        if let Some(title) = update.title {
            fields.push(("tasks.$.title", Value::String(title)));
        }
        if let Some(completed) = update.completed {
            fields.push(("tasks.$.completed", Value::Bool(completed)));
        }

        let filter = Filter::by_id(goal_id).eq("tasks._id", task_id);
        let doc = self
            .collection
            .find_one_and_update(&filter, &Update::set(fields), ReturnDocument::After)?
            .ok_or_else(|| PlanError::TaskNotFound(goal_id.to_string(), task_id.to_string()))?;
        from_document(doc)
    }

    /// Remove a task; removing an unknown task id leaves the goal as is.
    pub fn remove_task(&self, goal_id: &str, task_id: &str) -> Result<Goal> {
        self.apply(goal_id, &Update::pull(TASKS_FIELD, task_id))
    }

    fn apply(&self, goal_id: &str, update: &Update) -> Result<Goal> {
        let doc = self
            .collection
            .find_by_id_and_update(goal_id, update)?
            .ok_or_else(|| PlanError::GoalNotFound(goal_id.to_string()))?;
        from_document(doc)
    }
}

/// Sort by `createdAt` descending; goals stamped in the same millisecond
/// keep reverse insertion order.
fn newest_first(goals: Vec<Goal>) -> Vec<Goal> {
    let mut indexed: Vec<(usize, Goal)> = goals.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, goal)| goal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::users::NewUser;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, GoalStore) {
        let dir = tempdir().unwrap();
        let users = UserStore::new(Collection::open(dir.path().join("users.json")).unwrap());
        for user_id in ["u1", "u2"] {
            users
                .create(NewUser {
                    user_id: user_id.into(),
                    username: user_id.into(),
                    first_name: "Test".into(),
                    ..Default::default()
                })
                .unwrap();
        }
        let goals = GoalStore::new(
            Collection::open(dir.path().join("goals.json")).unwrap(),
            users,
        );
        (dir, goals)
    }

    fn goal_for(user_id: &str, title: &str) -> NewGoal {
        NewGoal {
            user_id: user_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_requires_existing_user() {
        let (_dir, goals) = setup();
        let err = goals.create(goal_for("ghost", "Nope")).unwrap_err();
        assert!(matches!(err, PlanError::UserNotFound(_)));
        assert!(goals.collection().is_empty().unwrap());
    }

    #[test]
    fn create_assigns_task_ids() {
        let (_dir, goals) = setup();
        let goal = goals
            .create(NewGoal {
                tasks: vec![
                    NewTask {
                        title: "one".into(),
                        completed: false,
                    },
                    NewTask {
                        title: "two".into(),
                        completed: true,
                    },
                ],
                ..goal_for("u1", "Learn Go")
            })
            .unwrap();
        assert_eq!(goal.tasks.len(), 2);
        assert_ne!(goal.tasks[0].id, goal.tasks[1].id);
        assert!(goal.tasks[1].completed);
        assert_eq!(goal.status, GoalStatus::Pending);
        assert_eq!(goals.get(&goal.id).unwrap(), goal);
    }

    #[test]
    fn list_for_user_is_scoped_and_newest_first() {
        let (_dir, goals) = setup();
        let first = goals.create(goal_for("u1", "first")).unwrap();
        goals.create(goal_for("u2", "other")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = goals.create(goal_for("u1", "second")).unwrap();

        let listed = goals.list_for_user("u1").unwrap();
        let ids: Vec<&str> = listed.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert!(listed.iter().all(|g| g.user_id == "u1"));
    }

    #[test]
    fn same_millisecond_goals_list_latest_insert_first() {
        let (_dir, goals) = setup();
        let created: Vec<Goal> = ["a", "b", "c"]
            .into_iter()
            .map(|title| goals.create(goal_for("u1", title)).unwrap())
            .collect();
        let stamp = created[0].created_at;
        let same_stamp: Vec<Goal> = created
            .into_iter()
            .map(|goal| Goal {
                created_at: stamp,
                ..goal
            })
            .collect();

        let titles: Vec<String> = newest_first(same_stamp)
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[test]
    fn list_for_unknown_user_fails() {
        let (_dir, goals) = setup();
        assert!(matches!(
            goals.list_for_user("ghost").unwrap_err(),
            PlanError::UserNotFound(_)
        ));
    }

    #[test]
    fn update_sets_only_supplied_fields() {
        let (_dir, goals) = setup();
        let goal = goals
            .create(NewGoal {
                description: Some("keep me".into()),
                ..goal_for("u1", "Learn Go")
            })
            .unwrap();
        let updated = goals
            .update(
                &goal.id,
                GoalUpdate {
                    status: Some(GoalStatus::InProgress),
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, GoalStatus::InProgress);
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.title, "Learn Go");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.created_at, goal.created_at);
    }

    #[test]
    fn update_replacing_tasks_fills_missing_ids() {
        let (_dir, goals) = setup();
        let goal = goals.create(goal_for("u1", "g")).unwrap();
        let updated = goals
            .update(
                &goal.id,
                GoalUpdate {
                    tasks: Some(vec![Task {
                        id: String::new(),
                        title: "fresh".into(),
                        completed: false,
                    }]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tasks.len(), 1);
        assert!(!updated.tasks[0].id.is_empty());
    }

    #[test]
    fn update_missing_goal_fails() {
        let (_dir, goals) = setup();
        let err = goals.update("nope", GoalUpdate::default()).unwrap_err();
        assert_eq!(err.code(), "goal_not_found");
    }

    #[test]
    fn task_lifecycle() {
        let (_dir, goals) = setup();
        let goal = goals.create(goal_for("u1", "g")).unwrap();

        let goal = goals.add_task(&goal.id, "Step 1").unwrap();
        let goal = goals.add_task(&goal.id, "Step 2").unwrap();
        assert_eq!(goal.tasks.len(), 2);
        assert!(goal.tasks.iter().all(|t| !t.completed));
        let (step1, step2) = (goal.tasks[0].clone(), goal.tasks[1].clone());

        let goal = goals
            .update_task(
                &goal.id,
                &step2.id,
                TaskUpdate {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(goal.tasks[0], step1);
        assert!(goal.tasks[1].completed);
        assert_eq!(goal.tasks[1].title, "Step 2");
        assert_eq!(goal.progress(), (1, 2));

        let goal = goals.remove_task(&goal.id, &step1.id).unwrap();
        assert_eq!(goal.tasks.len(), 1);
        assert_eq!(goal.tasks[0].id, step2.id);
    }

    #[test]
    fn update_unknown_task_fails() {
        let (_dir, goals) = setup();
        let goal = goals.create(goal_for("u1", "g")).unwrap();
        let err = goals
            .update_task(&goal.id, "no-such-task", TaskUpdate::default())
            .unwrap_err();
        assert!(matches!(err, PlanError::TaskNotFound(_, _)));
    }

    #[test]
    fn task_operations_on_missing_goal_fail() {
        let (_dir, goals) = setup();
        assert!(matches!(
            goals.add_task("nope", "x").unwrap_err(),
            PlanError::GoalNotFound(_)
        ));
        assert!(matches!(
            goals.remove_task("nope", "t").unwrap_err(),
            PlanError::GoalNotFound(_)
        ));
    }

    #[test]
    fn delete_returns_removed_goal() {
        let (_dir, goals) = setup();
        let goal = goals.create(goal_for("u1", "g")).unwrap();
        assert_eq!(goals.delete(&goal.id).unwrap(), goal);
        assert!(goals.get(&goal.id).is_err());
        assert!(goals.delete(&goal.id).is_err());
    }
}
