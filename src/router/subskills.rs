//! Sub-skills HTTP API.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use validator::{ValidationError, ValidationErrors};

use crate::skill::{SubSkillRepository, SubSkillSummary};
use crate::{AppState, ServerError};

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /subskills` goes to `list`.
        .route("/", get(list))
        // `GET /subskills/:ID` goes to `find`.
        .route("/{id}", get(find))
}

/// All known sub-skills; an empty taxonomy reads as absent.
async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubSkillSummary>>, ServerError> {
    let subskills = SubSkillRepository::new(state.db.postgres.clone())
        .list()
        .await?;

    if subskills.is_empty() {
        return Err(ServerError::NotFound(
            "The subskills could not be found".into(),
        ));
    }
    Ok(Json(subskills))
}

async fn find(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubSkillSummary>, ServerError> {
    if id < 1 {
        let mut errors = ValidationErrors::new();
        errors.add(
            "id",
            ValidationError::new("id")
                .with_message("The id has to be at least 1.".into()),
        );
        return Err(errors.into());
    }

    let subskill = SubSkillRepository::new(state.db.postgres.clone())
        .find_by_id(id)
        .await?;
    Ok(Json(subskill))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use crate::*;

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_list_subskills(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response =
            make_request(app, Method::GET, "/subskills", None, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Vec<skill::SubSkillSummary> =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(body.len(), 3);
        assert_eq!(body[0].name, "Acoustic guitar");
    }

    #[sqlx::test]
    async fn test_list_subskills_empty_taxonomy(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response =
            make_request(app, Method::GET, "/subskills", None, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_find_subskill(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/subskills/3",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: skill::SubSkillSummary =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(body.name, "Baking");
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_find_subskill_rejects_non_positive_id(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/subskills/0",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(fixtures("../../fixtures/users.sql"))]
    async fn test_find_unknown_subskill(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let response = make_request(
            app,
            Method::GET,
            "/subskills/999",
            None,
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
