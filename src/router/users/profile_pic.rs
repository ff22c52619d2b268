//! Get and replace the profile picture.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::token::Principal;
use crate::user::UserRepository;
use crate::{AppState, ServerError};

use super::authorize;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureResponse {
    pub user_id: String,
    /// Absent when the user never uploaded a picture.
    pub profile_pic_url: Option<String>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PictureResponse>, ServerError> {
    let url = UserRepository::new(state.db.postgres.clone())
        .profile_picture(&user_id)
        .await?;
    Ok(Json(PictureResponse {
        user_id,
        profile_pic_url: url,
    }))
}

/// Store the raw image body and overwrite the current picture URL.
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    principal: Principal,
    image: Bytes,
) -> Result<(StatusCode, Json<String>), ServerError> {
    authorize(&principal, &user_id)?;

    if image.is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "image",
            ValidationError::new("image")
                .with_message("Image body must not be empty.".into()),
        );
        return Err(errors.into());
    }

    let url = state.images.store(&user_id, &image).await?;
    UserRepository::new(state.db.postgres.clone())
        .set_profile_picture(&user_id, &url)
        .await?;

    Ok((StatusCode::CREATED, Json(url)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use super::PictureResponse;
    use crate::*;

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_profile_pic(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/admin/profilepic",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: PictureResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.user_id, "admin");
        assert_eq!(
            body.profile_pic_url.as_deref(),
            Some("https://cdn.example.com/ada.webp")
        );
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_missing_picture_is_null(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/bob/profilepic",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: PictureResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.profile_pic_url, None);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_picture_roundtrip(pool: Pool<Postgres>) {
        let state = test_state(pool);

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/users/bob/profilepic",
            Some((&state, "bob")),
            "not-really-webp-bytes".to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let url: String = serde_json::from_slice(&body).unwrap();

        // The stored URL reads back exactly.
        let response = make_request(
            app(state),
            Method::GET,
            "/users/bob/profilepic",
            None,
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: PictureResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.profile_pic_url, Some(url));
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_picture_requires_caller(pool: Pool<Postgres>) {
        let state = test_state(pool);

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/users/bob/profilepic",
            None,
            "bytes".to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/users/bob/profilepic",
            Some((&state, "admin")),
            "bytes".to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_replace_picture_rejects_empty_body(pool: Pool<Postgres>) {
        let state = test_state(pool);

        let response = make_request(
            app(state.clone()),
            Method::POST,
            "/users/bob/profilepic",
            Some((&state, "bob")),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
