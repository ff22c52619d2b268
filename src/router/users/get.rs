//! Single-user profile.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::ServerError;
use crate::user::{UserProfile, UserRepository};

pub async fn handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ServerError> {
    let profile = UserRepository::new(state.db.postgres.clone())
        .find_profile(&user_id)
        .await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use crate::user::UserProfile;
    use crate::*;

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_user_profile(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/admin",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: UserProfile = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.id, "admin");
        assert_eq!(body.name, "Ada Lovelace");
        assert_eq!(body.bio.as_deref(), Some("Mathematician."));
        assert_eq!(body.review_count, 2);
        assert_eq!(body.rating, Some(4));
        assert_eq!(body.skills.len(), 2);
        assert_eq!(body.wanted_skills.len(), 1);
        assert_eq!(body.wanted_skills[0].name, "Spanish");
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_unknown_user(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/users/ghost",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
