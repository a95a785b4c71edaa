use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PlanError, Result};
use crate::ids;
use crate::model::User;
use crate::store::collection::{Collection, ReturnDocument};
use crate::store::filter::Filter;
use crate::store::update::Update;
use crate::store::{from_document, timestamp, to_document};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub telegram_id: Option<String>,
}

/// Editable profile fields; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub photo_url: Option<String>,
}

/// Identity reported by Telegram when a user first talks to the bot.
#[derive(Debug, Clone, Default)]
pub struct TelegramProfile {
    pub telegram_id: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Users keyed by their application-level `userId`.
#[derive(Debug, Clone)]
pub struct UserStore {
    collection: Collection,
}

impl UserStore {
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn find(&self, user_id: &str) -> Result<Option<User>> {
        self.collection
            .find_one(&by_user_id(user_id))?
            .map(from_document)
            .transpose()
    }

    pub fn get(&self, user_id: &str) -> Result<User> {
        self.find(user_id)?
            .ok_or_else(|| PlanError::UserNotFound(user_id.to_string()))
    }

    pub fn create(&self, new_user: NewUser) -> Result<User> {
        if self.find(&new_user.user_id)?.is_some() {
            return Err(PlanError::UserExists(new_user.user_id));
        }
        let doc = self.collection.create(to_document(&new_user)?)?;
        info!(user_id = %new_user.user_id, "created user");
        from_document(doc)
    }

    pub fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        let mut fields = Vec::new();
        if let Some(username) = update.username {
            fields.push(("username", Value::String(username)));
        }
        if let Some(photo_url) = update.photo_url {
            fields.push(("photoUrl", Value::String(photo_url)));
        }
        fields.push(("updatedAt", Value::String(timestamp())));

        let doc = self
            .collection
            .find_one_and_update(
                &by_user_id(user_id),
                &Update::set(fields),
                ReturnDocument::After,
            )?
            .ok_or_else(|| PlanError::UserNotFound(user_id.to_string()))?;
        from_document(doc)
    }

    /// Find the user linked to a Telegram account, registering a new one
    /// with a random `userId` if none exists. The flag reports creation.
    pub fn register_telegram(&self, profile: TelegramProfile) -> Result<(User, bool)> {
        let existing = self
            .collection
            .find_one(&Filter::new().eq("telegramId", profile.telegram_id.as_str()))?;
        if let Some(doc) = existing {
            debug!(telegram_id = %profile.telegram_id, "telegram user already registered");
            return Ok((from_document(doc)?, false));
        }

        let user_id = loop {
            let candidate = ids::user_id()?;
            if self.find(&candidate)?.is_none() {
                break candidate;
            }
        };

        let user = self.create(NewUser {
            user_id,
            username: profile.username.unwrap_or_else(|| "Anonymous".to_string()),
            first_name: profile.first_name,
            last_name: profile.last_name,
            photo_url: None,
            telegram_id: Some(profile.telegram_id),
        })?;
        Ok((user, true))
    }
}

fn by_user_id(user_id: &str) -> Filter {
    Filter::new().eq("userId", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path) -> UserStore {
        UserStore::new(Collection::open(dir.join("users.json")).unwrap())
    }

    fn ann() -> NewUser {
        NewUser {
            user_id: "u1".into(),
            username: "ann".into(),
            first_name: "Ann".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_and_get_user() {
        let dir = tempdir().unwrap();
        let users = store(dir.path());
        let created = users.create(ann()).unwrap();
        assert_eq!(created.user_id, "u1");
        assert!(!created.id.is_empty());
        assert_eq!(users.get("u1").unwrap(), created);
    }

    #[test]
    fn duplicate_user_id_is_rejected() {
        let dir = tempdir().unwrap();
        let users = store(dir.path());
        users.create(ann()).unwrap();
        let err = users.create(ann()).unwrap_err();
        assert!(matches!(err, PlanError::UserExists(ref id) if id == "u1"));
        assert_eq!(users.collection().len().unwrap(), 1);
    }

    #[test]
    fn get_missing_user_fails() {
        let dir = tempdir().unwrap();
        let err = store(dir.path()).get("ghost").unwrap_err();
        assert_eq!(err.code(), "user_not_found");
    }

    #[test]
    fn update_profile_only_touches_supplied_fields() {
        let dir = tempdir().unwrap();
        let users = store(dir.path());
        users
            .create(NewUser {
                photo_url: Some("old.png".into()),
                ..ann()
            })
            .unwrap();

        let updated = users
            .update_profile(
                "u1",
                ProfileUpdate {
                    username: Some("annie".into()),
                    photo_url: None,
                },
            )
            .unwrap();
        assert_eq!(updated.username, "annie");
        assert_eq!(updated.photo_url.as_deref(), Some("old.png"));
        assert_eq!(updated.first_name, "Ann");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn update_profile_of_missing_user_fails() {
        let dir = tempdir().unwrap();
        let err = store(dir.path())
            .update_profile("ghost", ProfileUpdate::default())
            .unwrap_err();
        assert!(matches!(err, PlanError::UserNotFound(_)));
    }

    #[test]
    fn register_telegram_is_idempotent() {
        let dir = tempdir().unwrap();
        let users = store(dir.path());
        let profile = TelegramProfile {
            telegram_id: "4242".into(),
            username: None,
            first_name: "Bob".into(),
            last_name: Some("Stone".into()),
        };

        let (first, created) = users.register_telegram(profile.clone()).unwrap();
        assert!(created);
        assert_eq!(first.username, "Anonymous");
        assert_eq!(first.user_id.len(), ids::USER_ID_LEN);
        assert_eq!(first.telegram_id.as_deref(), Some("4242"));

        let (second, created) = users.register_telegram(profile).unwrap();
        assert!(!created);
        assert_eq!(second.user_id, first.user_id);
        assert_eq!(users.collection().len().unwrap(), 1);
    }
}
