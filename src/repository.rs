use std::{collections::HashMap, fs, io, path::Path, sync::Arc};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::User;

/// UserRepository
///
/// Lookup contract used by the authorization gate to confirm that a session's
/// subject is still a known operator. Handlers and extractors only see the trait
/// object, so tests can substitute their own implementation.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Option<User>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn UserRepository>;

/// Fixed id of the development operator seeded in local mode.
pub const LOCAL_DEV_USER_ID: Uuid = Uuid::from_u128(0x0d15_7a7c_4000_8000_0000_0000_0000_0001);

/// InMemoryUserRepository
///
/// Read-only user table loaded at startup.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: HashMap<Uuid, User>,
}

impl InMemoryUserRepository {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }

    /// Loads a JSON array of users.
    pub fn from_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        Ok(Self::new(users))
    }

    /// A repository holding only the local development operator.
    pub fn with_local_dev_user() -> Self {
        Self::new([User {
            id: LOCAL_DEV_USER_ID,
            email: "dispatch-admin@localhost".to_string(),
            role: "admin".to_string(),
        }])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).cloned()
    }
}
