use crate::application_port::GraphError;
use crate::domain_model::{UserId, UserPair};
use crate::domain_port::repo_tx::StorageTx;
use std::collections::HashSet;

/// Friendship edges, one row per order-normalized pair. Both directions of
/// the symmetric relation derive from that single row, and the pair key is
/// what serializes racing link/unlink calls on the same two users.
#[async_trait::async_trait]
pub trait FriendshipRepo: Send + Sync {
    /// Insert the edge. Surfaces `AlreadyFriends` when the pair key already
    /// holds a row, which also resolves concurrent double-links to exactly
    /// one winner.
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError>;

    /// Remove the edge. Surfaces `NotFriends` when no row was removed.
    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError>;

    async fn friends_of(&self, user_id: UserId) -> Result<HashSet<UserId>, GraphError>;

    /// Every stored edge as a normalized (min, max) pair.
    async fn list_all(&self) -> Result<Vec<(UserId, UserId)>, GraphError>;
}
