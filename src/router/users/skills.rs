//! Attach skills and wanted skills to the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::router::Valid;
use crate::token::Principal;
use crate::user::{SkillKind, UserRepository};
use crate::{AppState, ServerError};

use super::authorize;

#[derive(Debug, Serialize, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(range(min = 1, message = "Skill id must be at least 1."))]
    skill_id: i32,
}

pub async fn add_skill(
    state: State<AppState>,
    path: Path<String>,
    principal: Principal,
    body: Valid<Body>,
) -> Result<StatusCode, ServerError> {
    assign(state, path, principal, body, SkillKind::Has).await
}

pub async fn add_wanted_skill(
    state: State<AppState>,
    path: Path<String>,
    principal: Principal,
    body: Valid<Body>,
) -> Result<StatusCode, ServerError> {
    assign(state, path, principal, body, SkillKind::Wanted).await
}

/// Authorization comes first so unauthenticated callers learn nothing
/// about existing users or assignments.
async fn assign(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    principal: Principal,
    Valid(body): Valid<Body>,
    kind: SkillKind,
) -> Result<StatusCode, ServerError> {
    authorize(&principal, &user_id)?;

    UserRepository::new(state.db.postgres.clone())
        .assign_skill(&user_id, body.skill_id, kind)
        .await?;
    Ok(StatusCode::OK)
}
