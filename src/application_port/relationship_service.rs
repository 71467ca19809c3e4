use crate::application_port::GraphError;
use crate::domain_model::{GraphData, User, UserId};

#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    /// Establish a friendship between two distinct existing users. Linking a
    /// user to itself or re-linking existing friends is a conflict, not a
    /// no-op.
    async fn link_users(&self, user_id: UserId, friend_id: UserId) -> Result<(), GraphError>;

    /// Tear down an existing friendship. Unlinking users that are not
    /// friends is a conflict.
    async fn unlink_users(&self, user_id: UserId, friend_id: UserId) -> Result<(), GraphError>;

    /// Recompute the user's popularity score from current state.
    async fn popularity_score(&self, user: &User) -> Result<f64, GraphError>;

    /// Export the whole graph: one node per user with a fresh score, one
    /// edge per directed observation of a friendship.
    async fn graph_data(&self) -> Result<GraphData, GraphError>;
}
