/// Failure taxonomy of the social-graph core.
///
/// Not-found and the business-rule conflicts are client-facing conditions;
/// `Store` covers everything unexpected underneath and is never shown to
/// callers verbatim.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("user not found")]
    UserNotFound,
    #[error("friend not found")]
    FriendNotFound,
    #[error("username already exists")]
    UsernameTaken,
    #[error("cannot link user to self")]
    SelfLink,
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("users are not friends")]
    NotFriends,
    #[error("unlink user from friends before deletion")]
    HasFriends,
    #[error("username cannot be empty")]
    EmptyUsername,
    #[error("store error: {0}")]
    Store(String),
}
