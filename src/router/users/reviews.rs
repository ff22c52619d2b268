//! Review submission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::router::Valid;
use crate::token::Principal;
use crate::user::{Review, UserRepository, new_review_id};
use crate::{AppState, ServerError};

use super::authorize;

#[derive(Debug, Serialize, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    /// User receiving the review.
    user_id: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    rating: i16,
    #[validate(length(max = 500, message = "Comment must be at most 500 characters long."))]
    comment: Option<String>,
}

/// Submit a review; the route id is the author, the body names the subject.
pub async fn submit(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    principal: Principal,
    Valid(body): Valid<Body>,
) -> Result<StatusCode, ServerError> {
    authorize(&principal, &author_id)?;

    if body.user_id == author_id {
        let mut errors = ValidationErrors::new();
        errors.add(
            "userId",
            ValidationError::new("self_review")
                .with_message("You cannot review yourself.".into()),
        );
        return Err(errors.into());
    }

    let review = Review {
        id: new_review_id(),
        rating: body.rating,
        comment: body.comment,
        created_at: chrono::Utc::now(),
        user_id: body.user_id,
        posted_by_id: author_id,
    };
    UserRepository::new(state.db.postgres.clone())
        .insert_review(&review)
        .await?;
    Ok(StatusCode::OK)
}
