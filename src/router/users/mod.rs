//! Users-related HTTP API.
mod get;
mod list;
mod names;
mod profile_pic;
mod reviews;
mod skills;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::error::Result;
use crate::token::Principal;
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Bearer token from the `Authorization` header, if any.
fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|header| header.trim_start_matches(BEARER).to_owned())
}

/// Resolve the authenticated caller into a [`Principal`] extension.
///
/// A missing or invalid token resolves to an anonymous request; handlers
/// that require a caller reject it with 401 at extraction time.
async fn resolve_principal(
    State(state): State<AppState>,
    mut req: Request,
    next: middleware::Next,
) -> Response {
    if let Some(token) = bearer(req.headers()) {
        if let Ok(claims) = state.token.decode(&token) {
            req.extensions_mut().insert(Principal {
                user_id: claims.sub,
            });
        }
    }

    next.run(req).await
}

/// The caller must be the subject user.
fn authorize(principal: &Principal, user_id: &str) -> Result<()> {
    if principal.user_id != user_id {
        return Err(ServerError::Unauthorized);
    }
    Ok(())
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /users` goes to `list`.
        .route("/", get(list::handler))
        // `GET /users/:ID` goes to `get`.
        .route("/{user_id}", get(get::handler))
        // Names. POSTs require the caller to be the subject.
        .route("/{user_id}/names", get(names::get).post(names::update))
        .route(
            "/{user_id}/firstname",
            get(names::get_first).post(names::update_first),
        )
        // Profile picture.
        .route(
            "/{user_id}/profilepic",
            get(profile_pic::get).post(profile_pic::update),
        )
        // Skill assignment.
        .route("/{user_id}/skills", post(skills::add_skill))
        .route("/{user_id}/wantedskills", post(skills::add_wanted_skill))
        // Reviews. The route id is the review author.
        .route("/{user_id}/reviews", post(reviews::submit))
        .route_layer(middleware::from_fn_with_state(state, resolve_principal))
}
