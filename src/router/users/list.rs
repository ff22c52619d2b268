//! Paginated user discovery listing.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::AppState;
use crate::ServerError;
use crate::token::Principal;
use crate::user::{
    ListFilter, Page, PaginatedResponse, SortKey, UserRepository, UserSummary,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    page_index: Option<i64>,
    page_size: Option<i64>,
    skill_id: Option<i32>,
    sort_by: Option<String>,
}

/// List users with optional skill filter, sort token and windowing.
///
/// When a valid bearer token accompanies the request, its owner is hidden
/// from the results so users do not discover themselves.
pub async fn handler(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    principal: Option<Principal>,
) -> Result<Json<PaginatedResponse<UserSummary>>, ServerError> {
    let filter = ListFilter {
        skill_id: params.skill_id,
        exclude_user_id: principal.map(|principal| principal.user_id),
    };
    let sort = SortKey::parse(params.sort_by.as_deref());
    let page = Page::new(params.page_index, params.page_size);

    let users = UserRepository::new(state.db.postgres.clone())
        .list(&filter, sort, page)
        .await?;
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    use crate::user::{PaginatedResponse, UserSummary};
    use crate::*;

    async fn fetch(
        app: axum::Router,
        path: &str,
        caller: Option<(&AppState, &str)>,
    ) -> PaginatedResponse<UserSummary> {
        let response =
            make_request(app, Method::GET, path, caller, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_defaults(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let body = fetch(app, "/users", None).await;
        assert_eq!(body.page_index, 1);
        assert_eq!(body.page_size, 10);
        assert_eq!(body.total_records, 3);
        assert_eq!(body.data.len(), 3);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_projection(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let body = fetch(app, "/users", None).await;
        let admin =
            body.data.iter().find(|user| user.id == "admin").unwrap();
        assert_eq!(admin.name, "Ada Lovelace");
        assert_eq!(admin.city.as_deref(), Some("Oslo"));
        assert_eq!(admin.review_count, 2);
        // Mean 4.5 truncates toward zero.
        assert_eq!(admin.rating, Some(4));
        assert_eq!(admin.skills, vec!["Cooking", "Guitar"]);

        let carol =
            body.data.iter().find(|user| user.id == "carol").unwrap();
        assert_eq!(carol.review_count, 0);
        assert_eq!(carol.rating, None);
        assert!(carol.skills.is_empty());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_windowing(pool: Pool<Postgres>) {
        let state = test_state(pool);

        let body =
            fetch(app(state.clone()), "/users?pageIndex=1&pageSize=2", None)
                .await;
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.total_records, 3);

        let last =
            fetch(app(state.clone()), "/users?pageIndex=2&pageSize=2", None)
                .await;
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.total_records, 3);

        // An out-of-range index clamps to the first page.
        let clamped =
            fetch(app(state), "/users?pageIndex=0&pageSize=2", None).await;
        assert_eq!(clamped.page_index, 1);
        assert_eq!(clamped.data.len(), 2);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_skill_filter(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state);

        let body = fetch(app, "/users?skillId=1", None).await;
        assert_eq!(body.total_records, 2);
        let mut ids: Vec<_> =
            body.data.iter().map(|user| user.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["admin", "bob"]);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_sorting(pool: Pool<Postgres>) {
        let state = test_state(pool);

        let best =
            fetch(app(state.clone()), "/users?sortBy=best-rating", None).await;
        let ratings: Vec<_> =
            best.data.iter().map(|user| user.rating).collect();
        assert_eq!(ratings, vec![Some(4), Some(3), None]);

        let most =
            fetch(app(state.clone()), "/users?sortBy=most-ratings", None)
                .await;
        let counts: Vec<_> =
            most.data.iter().map(|user| user.review_count).collect();
        assert_eq!(counts, vec![2, 1, 0]);

        // Unknown tokens fall through to the unsorted default.
        let unknown =
            fetch(app(state), "/users?sortBy=freshest", None).await;
        assert_eq!(unknown.total_records, 3);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_list_users_hides_caller(pool: Pool<Postgres>) {
        let state = test_state(pool);
        let app = app(state.clone());

        let body = fetch(app, "/users", Some((&state, "admin"))).await;
        assert_eq!(body.total_records, 2);
        assert!(body.data.iter().all(|user| user.id != "admin"));
    }
}
