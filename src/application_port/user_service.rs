use crate::application_port::GraphError;
use crate::domain_model::{User, UserDraft, UserId, UserPatch, UserProfile};

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Create a user from a draft. Rejects duplicate usernames; a missing
    /// hobby set normalizes to empty. Id and creation timestamp are always
    /// assigned here.
    async fn create_user(&self, draft: UserDraft) -> Result<User, GraphError>;

    async fn get_user(&self, id: UserId) -> Result<User, GraphError>;

    /// Every stored user, in storage iteration order.
    async fn list_users(&self) -> Result<Vec<User>, GraphError>;

    /// Replace username, age and hobbies. Friends and created_at are left
    /// alone. Uniqueness of the new username is not re-checked here; the
    /// store's unique key is the only guard on update.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, GraphError>;

    /// Delete a user. Fails while the user still has friends; callers must
    /// unlink first.
    async fn delete_user(&self, id: UserId) -> Result<(), GraphError>;

    /// Map a user to its transfer shape, recomputing the popularity score.
    async fn profile(&self, user: &User) -> Result<UserProfile, GraphError>;
}
