use crate::application_port::GraphError;
use crate::domain_model::{User, UserId};
use crate::domain_port::{FriendshipRepo, UserRepo};
use std::collections::{HashMap, HashSet};

/// Assemble a full user from its row, hobby rows and friendship adjacency.
pub(crate) async fn load_user(
    user_repo: &dyn UserRepo,
    friendship_repo: &dyn FriendshipRepo,
    id: UserId,
) -> Result<User, GraphError> {
    let Some(record) = user_repo.get(id).await? else {
        return Err(GraphError::UserNotFound);
    };
    let hobbies = user_repo.get_hobbies(id).await?;
    let friends = friendship_repo.friends_of(id).await?;

    Ok(User {
        id: record.user_id,
        username: record.username,
        age: record.age,
        hobbies,
        friends,
        created_at: record.created_at,
    })
}

/// Assemble every stored user in three bulk reads instead of per-user
/// round trips.
pub(crate) async fn load_all_users(
    user_repo: &dyn UserRepo,
    friendship_repo: &dyn FriendshipRepo,
) -> Result<Vec<User>, GraphError> {
    let records = user_repo.list_all().await?;
    let mut hobbies = user_repo.list_all_hobbies().await?;

    let mut adjacency: HashMap<UserId, HashSet<UserId>> = HashMap::new();
    for (a, b) in friendship_repo.list_all().await? {
        adjacency.entry(a).or_default().insert(b);
        adjacency.entry(b).or_default().insert(a);
    }

    Ok(records
        .into_iter()
        .map(|record| User {
            hobbies: hobbies.remove(&record.user_id).unwrap_or_default(),
            friends: adjacency.remove(&record.user_id).unwrap_or_default(),
            id: record.user_id,
            username: record.username,
            age: record.age,
            created_at: record.created_at,
        })
        .collect())
}
