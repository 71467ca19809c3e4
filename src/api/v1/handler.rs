use super::error::*;
use crate::application_port::{RelationshipService, UserService};
use crate::domain_model::{UserDraft, UserId, UserPatch, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Body shared by create and update. Id, friends and creation timestamp are
/// never accepted from the wire.
#[derive(Debug, Deserialize)]
pub struct UserBody {
    pub username: String,
    pub age: u32,
    pub hobbies: Option<HashSet<String>>,
}

impl UserBody {
    fn validate(&self) -> Result<(), warp::Rejection> {
        if self.age < 1 {
            return Err(reject::custom(ApiRejection::bad_request(
                "age must be at least 1",
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FriendQuery {
    #[serde(rename = "friendId")]
    pub friend_id: UserId,
}

async fn to_profile(
    user_service: &Arc<dyn UserService>,
    user: &crate::domain_model::User,
) -> Result<UserProfile, warp::Rejection> {
    user_service
        .profile(user)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)
}

pub async fn list_users(
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = user_service
        .list_users()
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let mut profiles = Vec::with_capacity(users.len());
    for user in &users {
        profiles.push(to_profile(&user_service, user).await?);
    }

    Ok(warp::reply::json(&ApiResponse::ok(profiles)))
}

pub async fn get_user(
    id: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .get_user(id)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let profile = to_profile(&user_service, &user).await?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn create_user(
    body: UserBody,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    body.validate()?;

    let draft = UserDraft {
        username: body.username,
        age: body.age,
        hobbies: body.hobbies,
    };
    let user = user_service
        .create_user(draft)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let profile = to_profile(&user_service, &user).await?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn update_user(
    id: UserId,
    body: UserBody,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    body.validate()?;

    let patch = UserPatch {
        username: body.username,
        age: body.age,
        hobbies: body.hobbies,
    };
    let user = user_service
        .update_user(id, patch)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let profile = to_profile(&user_service, &user).await?;
    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

pub async fn delete_user(
    id: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    user_service
        .delete_user(id)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok("user deleted")))
}

pub async fn link_users(
    id: UserId,
    query: FriendQuery,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    relationship_service
        .link_users(id, query.friend_id)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok("users linked")))
}

pub async fn unlink_users(
    id: UserId,
    query: FriendQuery,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    relationship_service
        .unlink_users(id, query.friend_id)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok("users unlinked")))
}

pub async fn graph_data(
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let graph = relationship_service
        .graph_data()
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(graph)))
}
