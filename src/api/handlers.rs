//! Request handlers for `/` and `/users`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, Envelope};
use crate::parser::{HttpRequest, Method};
use crate::server::{Error, HttpResponse, HttpServer, StatusCode};
use crate::store::SharedStore;

/// Body of the root route.
pub const GREETING: &str = "Hello! Your server is running 🎉";

/// Request body for create and update.
///
/// A missing `name` decodes as the empty string; anything that is not a JSON
/// object with an optional string `name` is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub name: String,
}

/// Turn the `{id}` path segment into a record id.
///
/// Anything that is not a non-negative integer maps to 0, an id the store
/// never assigns, so bad ids come back as 404 rather than 400.
///
/// ```
/// use microcrud_rs::api::parse_id;
///
/// assert_eq!(parse_id(Some("12")), 12);
/// assert_eq!(parse_id(Some("abc")), 0);
/// assert_eq!(parse_id(None), 0);
/// ```
pub fn parse_id(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn respond<T: Serialize>(result: Result<T, ApiError>, status: StatusCode) -> Result<HttpResponse, Error> {
    match result {
        Ok(data) => Envelope::success(data).into_response(status),
        Err(e) => e.into_response(),
    }
}

pub async fn hello(_request: HttpRequest) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::text(StatusCode::Ok, GREETING))
}

/// `GET /users`
pub async fn list_users(store: SharedStore, _request: HttpRequest) -> Result<HttpResponse, Error> {
    let users = store.read().await.list().to_vec();
    respond(Ok(users), StatusCode::Ok)
}

/// `GET /users/{id}`
pub async fn get_user(store: SharedStore, request: HttpRequest) -> Result<HttpResponse, Error> {
    let id = parse_id(request.param("id"));
    let result = store.read().await.get(id).cloned().map_err(ApiError::from);
    respond(result, StatusCode::Ok)
}

/// `POST /users`
///
/// The body is decoded before the store is touched, so a bad body leaves it
/// unchanged.
pub async fn create_user(store: SharedStore, request: HttpRequest) -> Result<HttpResponse, Error> {
    let payload: UserPayload = match request.json() {
        Ok(payload) => payload,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let user = store.write().await.create(payload.name);
    debug!("Created user {id}", id = user.id);
    respond(Ok(user), StatusCode::Created)
}

/// `PUT /users/{id}`
pub async fn update_user(store: SharedStore, request: HttpRequest) -> Result<HttpResponse, Error> {
    let id = parse_id(request.param("id"));
    let payload: UserPayload = match request.json() {
        Ok(payload) => payload,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let result = store.write().await.update(id, payload.name).map_err(ApiError::from);
    respond(result, StatusCode::Ok)
}

/// `DELETE /users/{id}`
pub async fn delete_user(store: SharedStore, request: HttpRequest) -> Result<HttpResponse, Error> {
    let id = parse_id(request.param("id"));
    let result = store.write().await.delete(id);

    match result {
        Ok(user) => {
            debug!("Deleted user {id}", id = user.id);
            Ok(HttpResponse::new(StatusCode::NoContent))
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Register `/` and the `/users` resource on `server`, backed by `store`.
pub async fn register_routes(server: &HttpServer, store: SharedStore) {
    server.add_route("/", vec![Method::GET], hello).await;

    let s = store.clone();
    server.add_route("/users", vec![Method::GET], move |req| list_users(s.clone(), req)).await;

    let s = store.clone();
    server.add_route("/users", vec![Method::POST], move |req| create_user(s.clone(), req)).await;

    let s = store.clone();
    server.add_route("/users/{id}", vec![Method::GET], move |req| get_user(s.clone(), req)).await;

    let s = store.clone();
    server.add_route("/users/{id}", vec![Method::PUT], move |req| update_user(s.clone(), req)).await;

    server.add_route("/users/{id}", vec![Method::DELETE], move |req| delete_user(store.clone(), req)).await;
}
