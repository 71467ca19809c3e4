use crate::application_impl::loader::load_all_users;
use crate::application_port::{GraphError, RelationshipService};
use crate::domain_model::{
    GraphData, GraphEdge, GraphNode, User, UserId, UserPair, popularity_score,
};
use crate::domain_port::{FriendshipRepo, TxManager, UserRepo};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub struct RealRelationshipService {
    user_repo: Arc<dyn UserRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealRelationshipService {
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

    /// Both sides must resolve before an edge may change. The "user" vs
    /// "friend" distinction in the error is cosmetic but part of the
    /// surface.
    async fn resolve_pair(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<UserPair, GraphError> {
        if self.user_repo.get(user_id).await?.is_none() {
            warn!("user {} not found", user_id);
            return Err(GraphError::UserNotFound);
        }
        if self.user_repo.get(friend_id).await?.is_none() {
            warn!("friend {} not found", friend_id);
            return Err(GraphError::FriendNotFound);
        }
        Ok(UserPair::new(user_id, friend_id))
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn link_users(&self, user_id: UserId, friend_id: UserId) -> Result<(), GraphError> {
        // Self-links are rejected before resolution, so the conflict fires
        // whether or not the user exists.
        if user_id == friend_id {
            warn!("attempted to link user {} to self", user_id);
            return Err(GraphError::SelfLink);
        }

        let pair = self.resolve_pair(user_id, friend_id).await?;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;
        match self.friendship_repo.insert_in_tx(&mut *tx, &pair).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| GraphError::Store(e.to_string()))?;
                info!("linked users {} and {}", user_id, friend_id);
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn unlink_users(&self, user_id: UserId, friend_id: UserId) -> Result<(), GraphError> {
        let pair = self.resolve_pair(user_id, friend_id).await?;

        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;
        match self.friendship_repo.delete_in_tx(&mut *tx, &pair).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| GraphError::Store(e.to_string()))?;
                info!("unlinked users {} and {}", user_id, friend_id);
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn popularity_score(&self, user: &User) -> Result<f64, GraphError> {
        let mut friend_hobbies = Vec::with_capacity(user.friends.len());
        for friend_id in &user.friends {
            friend_hobbies.push(self.user_repo.get_hobbies(*friend_id).await?);
        }
        Ok(popularity_score(user, friend_hobbies.iter()))
    }

    async fn graph_data(&self) -> Result<GraphData, GraphError> {
        let users = load_all_users(self.user_repo.as_ref(), self.friendship_repo.as_ref()).await?;

        let hobby_index: HashMap<UserId, &HashSet<String>> =
            users.iter().map(|u| (u.id, &u.hobbies)).collect();

        let mut nodes = Vec::with_capacity(users.len());
        let mut edges = Vec::new();
        for user in &users {
            let friend_hobbies = user
                .friends
                .iter()
                .filter_map(|id| hobby_index.get(id).copied());
            nodes.push(GraphNode {
                id: user.id.to_string(),
                username: user.username.clone(),
                age: user.age,
                popularity_score: popularity_score(user, friend_hobbies),
            });

            // One edge per directed observation: a friendship shows up
            // twice, once from each side.
            for friend_id in &user.friends {
                edges.push(GraphEdge {
                    source: user.id.to_string(),
                    target: friend_id.to_string(),
                });
            }
        }

        info!(
            "graph export with {} node(s) and {} edge(s)",
            nodes.len(),
            edges.len()
        );
        Ok(GraphData { nodes, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_port::UserService;
    use crate::application_impl::RealUserService;
    use crate::domain_model::UserDraft;
    use crate::infra_memory::{MemoryFriendshipRepo, MemoryStore, MemoryTxManager, MemoryUserRepo};

    fn services() -> (RealUserService, RealRelationshipService) {
        let store = MemoryStore::shared();
        let user_repo = Arc::new(MemoryUserRepo::new(store.clone()));
        let friendship_repo = Arc::new(MemoryFriendshipRepo::new(store));
        (
            RealUserService::new(
                user_repo.clone(),
                friendship_repo.clone(),
                Arc::new(MemoryTxManager::new()),
            ),
            RealRelationshipService::new(user_repo, friendship_repo, Arc::new(MemoryTxManager::new())),
        )
    }

    async fn create(users: &RealUserService, username: &str, hobbies: &[&str]) -> User {
        users
            .create_user(UserDraft {
                username: username.to_string(),
                age: 30,
                hobbies: Some(hobbies.iter().map(|s| s.to_string()).collect()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn link_is_symmetric_and_unlink_removes_both_sides() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &[]).await;
        let bob = create(&users, "bob", &[]).await;

        relations.link_users(alice.id, bob.id).await.unwrap();
        assert!(users.get_user(alice.id).await.unwrap().friends.contains(&bob.id));
        assert!(users.get_user(bob.id).await.unwrap().friends.contains(&alice.id));

        relations.unlink_users(bob.id, alice.id).await.unwrap();
        assert!(users.get_user(alice.id).await.unwrap().friends.is_empty());
        assert!(users.get_user(bob.id).await.unwrap().friends.is_empty());
    }

    #[tokio::test]
    async fn self_link_conflicts_even_for_unknown_users() {
        let (_, relations) = services();
        let ghost = UserId::fresh();

        let err = relations.link_users(ghost, ghost).await.unwrap_err();

        assert!(matches!(err, GraphError::SelfLink));
    }

    #[tokio::test]
    async fn relinking_existing_friends_conflicts_and_leaves_state_alone() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &[]).await;
        let bob = create(&users, "bob", &[]).await;
        relations.link_users(alice.id, bob.id).await.unwrap();

        // The reverse direction is the same edge.
        let err = relations.link_users(bob.id, alice.id).await.unwrap_err();

        assert!(matches!(err, GraphError::AlreadyFriends));
        assert!(users.get_user(alice.id).await.unwrap().friends.contains(&bob.id));
    }

    #[tokio::test]
    async fn unlinking_strangers_conflicts() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &[]).await;
        let bob = create(&users, "bob", &[]).await;

        let err = relations.unlink_users(alice.id, bob.id).await.unwrap_err();

        assert!(matches!(err, GraphError::NotFriends));
    }

    #[tokio::test]
    async fn link_distinguishes_missing_user_from_missing_friend() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &[]).await;

        let err = relations
            .link_users(UserId::fresh(), alice.id)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::UserNotFound));

        let err = relations
            .link_users(alice.id, UserId::fresh())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::FriendNotFound));
    }

    #[tokio::test]
    async fn score_counts_friends_plus_half_point_per_shared_hobby() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &["Reading"]).await;
        let bob = create(&users, "bob", &["Reading", "Gaming"]).await;
        relations.link_users(alice.id, bob.id).await.unwrap();

        let alice = users.get_user(alice.id).await.unwrap();
        let bob = users.get_user(bob.id).await.unwrap();

        assert_eq!(relations.popularity_score(&alice).await.unwrap(), 1.5);
        assert_eq!(relations.popularity_score(&bob).await.unwrap(), 1.5);
    }

    #[tokio::test]
    async fn graph_export_emits_two_directed_edges_per_friendship() {
        let (users, relations) = services();
        let alice = create(&users, "alice", &["Reading"]).await;
        let bob = create(&users, "bob", &["Reading"]).await;
        let carol = create(&users, "carol", &[]).await;
        relations.link_users(alice.id, bob.id).await.unwrap();
        relations.link_users(bob.id, carol.id).await.unwrap();

        let graph = relations.graph_data().await.unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 4);

        let alice_node = graph
            .nodes
            .iter()
            .find(|n| n.id == alice.id.to_string())
            .unwrap();
        assert_eq!(alice_node.username, "alice");
        assert_eq!(alice_node.popularity_score, 1.5);

        // Every edge must have its mirror.
        for edge in &graph.edges {
            assert!(
                graph
                    .edges
                    .iter()
                    .any(|e| e.source == edge.target && e.target == edge.source)
            );
        }
    }

    #[tokio::test]
    async fn empty_graph_exports_empty_collections() {
        let (_, relations) = services();

        let graph = relations.graph_data().await.unwrap();

        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}
