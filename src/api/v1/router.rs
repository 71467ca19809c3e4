use super::handler;
use crate::api::v1::handler::{FriendQuery, UserBody};
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // `users/graph` must match before the `users/{id}` param route.
    let graph_data = warp::get()
        .and(warp::path("users"))
        .and(warp::path("graph"))
        .and(warp::path::end())
        .and(with(server.relationship_service.clone()))
        .and_then(handler::graph_data);

    let list_users = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(with(server.user_service.clone()))
        .and_then(handler::list_users);

    let get_user = warp::get()
        .and(warp::path("users"))
        .and(warp::path::param::<UserId>())
        .and(warp::path::end())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let create_user = warp::post()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::body::json::<UserBody>())
        .and(with(server.user_service.clone()))
        .and_then(handler::create_user);

    let update_user = warp::put()
        .and(warp::path("users"))
        .and(warp::path::param::<UserId>())
        .and(warp::path::end())
        .and(warp::body::json::<UserBody>())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let delete_user = warp::delete()
        .and(warp::path("users"))
        .and(warp::path::param::<UserId>())
        .and(warp::path::end())
        .and(with(server.user_service.clone()))
        .and_then(handler::delete_user);

    let link_users = warp::post()
        .and(warp::path("users"))
        .and(warp::path::param::<UserId>())
        .and(warp::path("link"))
        .and(warp::path::end())
        .and(warp::query::<FriendQuery>())
        .and(with(server.relationship_service.clone()))
        .and_then(handler::link_users);

    let unlink_users = warp::delete()
        .and(warp::path("users"))
        .and(warp::path::param::<UserId>())
        .and(warp::path("unlink"))
        .and(warp::path::end())
        .and(warp::query::<FriendQuery>())
        .and(with(server.relationship_service.clone()))
        .and_then(handler::unlink_users);

    graph_data
        .or(list_users)
        .or(link_users)
        .or(get_user)
        .or(create_user)
        .or(update_user)
        .or(unlink_users)
        .or(delete_user)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
