//! Get and update user names.

use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::router::Valid;
use crate::token::Principal;
use crate::user::{Names, UserRepository};
use crate::{AppState, ServerError};

use super::authorize;

#[derive(Debug, Serialize, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct NamesBody {
    #[validate(length(min = 1, message = "First name must not be empty."))]
    first_name: String,
    middle_name: Option<String>,
    #[validate(length(min = 1, message = "Last name must not be empty."))]
    last_name: String,
}

#[derive(Debug, Serialize, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct FirstNameBody {
    #[validate(length(min = 1, message = "First name must not be empty."))]
    first_name: String,
}

pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Names>, ServerError> {
    let names = UserRepository::new(state.db.postgres.clone())
        .names(&user_id)
        .await?;
    Ok(Json(names))
}

pub async fn get_first(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<FirstNameBody>, ServerError> {
    let names = UserRepository::new(state.db.postgres.clone())
        .names(&user_id)
        .await?;
    Ok(Json(FirstNameBody {
        first_name: names.first_name.unwrap_or_default(),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    principal: Principal,
    Valid(body): Valid<NamesBody>,
) -> Result<StatusCode, ServerError> {
    authorize(&principal, &user_id)?;

    let names = Names {
        first_name: Some(body.first_name),
        middle_name: body.middle_name,
        last_name: Some(body.last_name),
    };
    UserRepository::new(state.db.postgres.clone())
        .update_names(&user_id, &names)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn update_first(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    principal: Principal,
    Valid(body): Valid<FirstNameBody>,
) -> Result<StatusCode, ServerError> {
    authorize(&principal, &user_id)?;

    UserRepository::new(state.db.postgres.clone())
        .update_first_name(&user_id, &body.first_name)
        .await?;
    Ok(StatusCode::OK)
}
