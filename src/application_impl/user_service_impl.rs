use crate::application_impl::loader::{load_all_users, load_user};
use crate::application_port::{GraphError, UserService};
use crate::domain_model::{
    User, UserDraft, UserId, UserPatch, UserProfile, popularity_score,
};
use crate::domain_port::{TxManager, UserRecord, UserRepo};
use crate::domain_port::FriendshipRepo;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        friendship_repo: Arc<dyn FriendshipRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            user_repo,
            friendship_repo,
            tx_manager,
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn create_user(&self, draft: UserDraft) -> Result<User, GraphError> {
        if draft.username.trim().is_empty() {
            warn!("create rejected: empty username");
            return Err(GraphError::EmptyUsername);
        }
        if self.user_repo.username_exists(&draft.username).await? {
            warn!("create rejected: username {:?} already taken", draft.username);
            return Err(GraphError::UsernameTaken);
        }

        let record = UserRecord {
            user_id: UserId::fresh(),
            username: draft.username,
            age: draft.age,
            created_at: Utc::now(),
        };
        let hobbies = draft.hobbies.unwrap_or_default();

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;
        self.user_repo.insert_in_tx(&mut *tx, &record).await?;
        self.user_repo
            .set_hobbies_in_tx(&mut *tx, record.user_id, &hobbies)
            .await?;
        tx.commit()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;

        info!("created user {} ({})", record.user_id, record.username);

        Ok(User {
            id: record.user_id,
            username: record.username,
            age: record.age,
            hobbies,
            friends: HashSet::new(),
            created_at: record.created_at,
        })
    }

    async fn get_user(&self, id: UserId) -> Result<User, GraphError> {
        load_user(self.user_repo.as_ref(), self.friendship_repo.as_ref(), id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, GraphError> {
        let users = load_all_users(self.user_repo.as_ref(), self.friendship_repo.as_ref()).await?;
        debug!("listed {} users", users.len());
        Ok(users)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, GraphError> {
        if patch.username.trim().is_empty() {
            warn!("update rejected: empty username");
            return Err(GraphError::EmptyUsername);
        }

        let Some(existing) = self.user_repo.get(id).await? else {
            warn!("update rejected: user {} not found", id);
            return Err(GraphError::UserNotFound);
        };

        // Uniqueness of the new username is deliberately not re-checked here,
        // unlike create; the store's unique key is the only guard on update.
        let record = UserRecord {
            user_id: id,
            username: patch.username,
            age: patch.age,
            created_at: existing.created_at,
        };
        let hobbies = patch.hobbies.unwrap_or_default();

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;
        self.user_repo.update_in_tx(&mut *tx, &record).await?;
        self.user_repo
            .set_hobbies_in_tx(&mut *tx, id, &hobbies)
            .await?;
        tx.commit()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;

        info!("updated user {}", id);

        let friends = self.friendship_repo.friends_of(id).await?;
        Ok(User {
            id,
            username: record.username,
            age: record.age,
            hobbies,
            friends,
            created_at: record.created_at,
        })
    }

    async fn delete_user(&self, id: UserId) -> Result<(), GraphError> {
        if self.user_repo.get(id).await?.is_none() {
            warn!("delete rejected: user {} not found", id);
            return Err(GraphError::UserNotFound);
        }

        let friends = self.friendship_repo.friends_of(id).await?;
        if !friends.is_empty() {
            warn!(
                "delete rejected: user {} still has {} friend(s)",
                id,
                friends.len()
            );
            return Err(GraphError::HasFriends);
        }

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;
        self.user_repo.delete_in_tx(&mut *tx, id).await?;
        tx.commit()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;

        info!("deleted user {}", id);
        Ok(())
    }

    async fn profile(&self, user: &User) -> Result<UserProfile, GraphError> {
        let mut friend_hobbies = Vec::with_capacity(user.friends.len());
        for friend_id in &user.friends {
            friend_hobbies.push(self.user_repo.get_hobbies(*friend_id).await?);
        }
        let score = popularity_score(user, friend_hobbies.iter());

        Ok(UserProfile {
            id: user.id,
            username: user.username.clone(),
            age: user.age,
            hobbies: user.hobbies.clone(),
            popularity_score: score,
            friend_ids: user.friends.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::{MemoryFriendshipRepo, MemoryStore, MemoryTxManager, MemoryUserRepo};

    fn service() -> RealUserService {
        let store = MemoryStore::shared();
        RealUserService::new(
            Arc::new(MemoryUserRepo::new(store.clone())),
            Arc::new(MemoryFriendshipRepo::new(store)),
            Arc::new(MemoryTxManager::new()),
        )
    }

    fn draft(username: &str, age: u32, hobbies: Option<&[&str]>) -> UserDraft {
        UserDraft {
            username: username.to_string(),
            age,
            hobbies: hobbies.map(|h| h.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn create_normalizes_missing_hobbies_to_empty() {
        let service = service();

        let user = service.create_user(draft("alice", 30, None)).await.unwrap();

        assert!(user.hobbies.is_empty());
        assert!(user.friends.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username() {
        let service = service();
        service.create_user(draft("alice", 30, None)).await.unwrap();

        let err = service.create_user(draft("alice", 25, None)).await.unwrap_err();

        assert!(matches!(err, GraphError::UsernameTaken));
    }

    #[tokio::test]
    async fn create_rejects_blank_username() {
        let service = service();

        let err = service.create_user(draft("   ", 30, None)).await.unwrap_err();

        assert!(matches!(err, GraphError::EmptyUsername));
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let service = service();

        let err = service.get_user(UserId::fresh()).await.unwrap_err();

        assert!(matches!(err, GraphError::UserNotFound));
    }

    #[tokio::test]
    async fn update_replaces_fields_but_keeps_created_at() {
        let service = service();
        let user = service
            .create_user(draft("alice", 30, Some(&["Reading"])))
            .await
            .unwrap();

        let updated = service
            .update_user(
                user.id,
                UserPatch {
                    username: "alicia".to_string(),
                    age: 31,
                    hobbies: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.age, 31);
        assert!(updated.hobbies.is_empty());
        assert_eq!(updated.created_at, user.created_at);
    }

    #[tokio::test]
    async fn update_unknown_user_is_not_found() {
        let service = service();

        let err = service
            .update_user(
                UserId::fresh(),
                UserPatch {
                    username: "ghost".to_string(),
                    age: 1,
                    hobbies: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::UserNotFound));
    }

    #[tokio::test]
    async fn update_does_not_precheck_username_uniqueness() {
        let service = service();
        service.create_user(draft("alice", 30, None)).await.unwrap();
        let bob = service.create_user(draft("bob", 28, None)).await.unwrap();

        // Update skips the uniqueness pre-check that create performs; the
        // collision comes back from the store's unique key instead.
        let err = service
            .update_user(
                bob.id,
                UserPatch {
                    username: "alice".to_string(),
                    age: 28,
                    hobbies: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::Store(_)));
    }

    #[tokio::test]
    async fn delete_removes_friendless_user() {
        let service = service();
        let user = service.create_user(draft("alice", 30, None)).await.unwrap();

        service.delete_user(user.id).await.unwrap();

        assert!(matches!(
            service.get_user(user.id).await.unwrap_err(),
            GraphError::UserNotFound
        ));
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let service = service();

        let err = service.delete_user(UserId::fresh()).await.unwrap_err();

        assert!(matches!(err, GraphError::UserNotFound));
    }

    #[tokio::test]
    async fn profile_carries_friend_ids_only_and_fresh_score() {
        let store = MemoryStore::shared();
        let user_repo = Arc::new(MemoryUserRepo::new(store.clone()));
        let friendship_repo = Arc::new(MemoryFriendshipRepo::new(store));
        let service = RealUserService::new(
            user_repo.clone(),
            friendship_repo.clone(),
            Arc::new(MemoryTxManager::new()),
        );
        let relations = crate::application_impl::RealRelationshipService::new(
            user_repo,
            friendship_repo,
            Arc::new(MemoryTxManager::new()),
        );
        use crate::application_port::RelationshipService;

        let alice = service
            .create_user(draft("alice", 30, Some(&["Reading"])))
            .await
            .unwrap();
        let bob = service
            .create_user(draft("bob", 28, Some(&["Reading", "Gaming"])))
            .await
            .unwrap();
        relations.link_users(alice.id, bob.id).await.unwrap();

        let alice = service.get_user(alice.id).await.unwrap();
        let profile = service.profile(&alice).await.unwrap();

        assert_eq!(profile.friend_ids, HashSet::from([bob.id]));
        assert_eq!(profile.popularity_score, 1.5);
    }
}
