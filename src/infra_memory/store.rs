use crate::application_port::GraphError;
use crate::domain_model::{UserId, UserPair};
use crate::domain_port::{FriendshipRepo, StorageTx, TxManager, UserRecord, UserRepo};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process backend for tests and local development. One mutex guards the
/// whole state, so every repo call is serialized, including check-then-act
/// sequences on the same friendship pair.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, UserRecord>,
    hobbies: HashMap<UserId, HashSet<String>>,
    edges: BTreeSet<(UserId, UserId)>,
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(MemoryStore {
            state: Mutex::new(MemoryState::default()),
        })
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Writes apply eagerly; commit and rollback are no-ops. The memory backend
/// only backs flows where a transaction's writes cannot fail halfway.
pub struct MemoryTxManager;

impl MemoryTxManager {
    pub fn new() -> Self {
        MemoryTxManager
    }
}

impl Default for MemoryTxManager {
    fn default() -> Self {
        Self::new()
    }
}

struct MemoryTx;

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        Ok(Box::new(MemoryTx))
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct MemoryUserRepo {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryUserRepo { store }
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError> {
        let mut state = self.store.state();
        if state.users.values().any(|u| u.username == record.username) {
            return Err(GraphError::UsernameTaken);
        }
        state.users.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn update_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError> {
        let mut state = self.store.state();
        // Mirrors a unique-key violation: update has no business-level
        // uniqueness check, so a collision surfaces as a store error.
        if state
            .users
            .values()
            .any(|u| u.user_id != record.user_id && u.username == record.username)
        {
            return Err(GraphError::Store(format!(
                "duplicate key on username {:?}",
                record.username
            )));
        }
        match state.users.get_mut(&record.user_id) {
            Some(existing) => {
                existing.username = record.username.clone();
                existing.age = record.age;
                Ok(())
            }
            None => Err(GraphError::UserNotFound),
        }
    }

    async fn delete_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<(), GraphError> {
        let mut state = self.store.state();
        state.users.remove(&user_id);
        state.hobbies.remove(&user_id);
        Ok(())
    }

    async fn set_hobbies_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
        hobbies: &HashSet<String>,
    ) -> Result<(), GraphError> {
        self.store.state().hobbies.insert(user_id, hobbies.clone());
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<UserRecord>, GraphError> {
        Ok(self.store.state().users.get(&user_id).cloned())
    }

    async fn get_hobbies(&self, user_id: UserId) -> Result<HashSet<String>, GraphError> {
        Ok(self
            .store
            .state()
            .hobbies
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, GraphError> {
        Ok(self
            .store
            .state()
            .users
            .values()
            .any(|u| u.username == username))
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, GraphError> {
        Ok(self.store.state().users.values().cloned().collect())
    }

    async fn list_all_hobbies(&self) -> Result<HashMap<UserId, HashSet<String>>, GraphError> {
        Ok(self.store.state().hobbies.clone())
    }
}

pub struct MemoryFriendshipRepo {
    store: Arc<MemoryStore>,
}

impl MemoryFriendshipRepo {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        MemoryFriendshipRepo { store }
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MemoryFriendshipRepo {
    async fn insert_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError> {
        if self.store.state().edges.insert((pair.min(), pair.max())) {
            Ok(())
        } else {
            Err(GraphError::AlreadyFriends)
        }
    }

    async fn delete_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError> {
        if self.store.state().edges.remove(&(pair.min(), pair.max())) {
            Ok(())
        } else {
            Err(GraphError::NotFriends)
        }
    }

    async fn friends_of(&self, user_id: UserId) -> Result<HashSet<UserId>, GraphError> {
        Ok(self
            .store
            .state()
            .edges
            .iter()
            .filter_map(|&(a, b)| {
                if a == user_id {
                    Some(b)
                } else if b == user_id {
                    Some(a)
                } else {
                    None
                }
            })
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<(UserId, UserId)>, GraphError> {
        Ok(self.store.state().edges.iter().copied().collect())
    }
}
