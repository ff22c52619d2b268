//! Pure pieces of the user query service: sort dispatch, windowing and
//! row projection rules. Everything hitting the database lives in
//! [`super::UserRepository`].

use rand::RngCore;
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Sort orders accepted by the user listing.
///
/// Tokens are matched exactly; anything else falls through to
/// [`SortKey::Unsorted`] rather than erroring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Mean received rating, descending.
    BestRating,
    /// Received review count, descending.
    MostRatings,
    #[default]
    Unsorted,
}

impl SortKey {
    /// Parse a `sortBy` query token.
    pub fn parse(token: Option<&str>) -> Self {
        match token {
            Some("best-rating") => Self::BestRating,
            Some("most-ratings") => Self::MostRatings,
            _ => Self::Unsorted,
        }
    }
}

/// 1-based pagination window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub index: i64,
    pub size: i64,
}

impl Page {
    /// Build a window from raw query parameters.
    ///
    /// An index below 1 is clamped to the first page; the size is clamped
    /// to `1..=100`.
    pub fn new(index: Option<i64>, size: Option<i64>) -> Self {
        Self {
            index: index.unwrap_or(1).max(1),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip before the requested page.
    pub fn offset(&self) -> i64 {
        (self.index - 1) * self.size
    }
}

/// One page of results plus the unwindowed total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub page_index: i64,
    pub page_size: i64,
    /// Count of rows matching the predicate, regardless of page.
    pub total_records: i64,
    pub data: Vec<T>,
}

/// Row of the user listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub profile_picture_url: Option<String>,
    pub review_count: i64,
    /// Mean received rating truncated toward zero; absent without reviews.
    pub rating: Option<i32>,
    pub skills: Vec<String>,
}

/// Skill reference as exposed on a user profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SkillRef {
    pub skill_id: i32,
    pub name: String,
}

/// Single-user profile projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub review_count: i64,
    pub rating: Option<i32>,
    pub skills: Vec<SkillRef>,
    pub wanted_skills: Vec<SkillRef>,
}

/// Kind of skill assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillKind {
    Has,
    Wanted,
}

impl SkillKind {
    /// Join table carrying this assignment kind.
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Has => "user_skills",
            Self::Wanted => "user_wanted_skills",
        }
    }

    pub(crate) fn noun(&self) -> &'static str {
        match self {
            Self::Has => "skill",
            Self::Wanted => "wanted skill",
        }
    }
}

/// Concatenation used for display names: no trimming, absent parts read
/// as empty strings.
pub(crate) fn full_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
}

/// Mean rating truncated toward zero; `None` without any review.
pub(crate) fn truncated_mean(mean: Option<f64>) -> Option<i32> {
    mean.map(|value| value.trunc() as i32)
}

/// Random identifier for a new review.
pub fn new_review_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_tokens() {
        assert_eq!(SortKey::parse(Some("best-rating")), SortKey::BestRating);
        assert_eq!(SortKey::parse(Some("most-ratings")), SortKey::MostRatings);
        assert_eq!(SortKey::parse(Some("freshest")), SortKey::Unsorted);
        assert_eq!(SortKey::parse(None), SortKey::Unsorted);
    }

    #[test]
    fn test_page_clamps_window() {
        assert_eq!(Page::new(None, None), Page { index: 1, size: 10 });
        assert_eq!(Page::new(Some(0), Some(10)).index, 1);
        assert_eq!(Page::new(Some(-3), Some(10)).index, 1);
        assert_eq!(Page::new(Some(2), Some(0)).size, 1);
        assert_eq!(Page::new(Some(2), Some(1_000)).size, 100);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(Some(1), Some(10)).offset(), 0);
        assert_eq!(Page::new(Some(3), Some(25)).offset(), 50);
    }

    #[test]
    fn test_full_name_keeps_separator() {
        assert_eq!(full_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(full_name(None, Some("Lovelace")), " Lovelace");
        assert_eq!(full_name(Some("Ada"), None), "Ada ");
    }

    #[test]
    fn test_truncated_mean() {
        assert_eq!(truncated_mean(Some(4.9)), Some(4));
        assert_eq!(truncated_mean(Some(0.4)), Some(0));
        assert_eq!(truncated_mean(None), None);
    }

    #[test]
    fn test_review_ids_are_unique() {
        assert_ne!(new_review_id(), new_review_id());
        assert_eq!(new_review_id().len(), 32);
    }
}
