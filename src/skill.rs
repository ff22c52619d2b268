//! Skill taxonomy: skills and their decorative sub-skills.

use serde::{Deserialize, Serialize};
use sqlx::{Pool, Postgres};

use crate::error::{Result, ServerError};

/// Sub-skill as exposed over the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubSkillSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Clone)]
pub struct SubSkillRepository {
    pool: Pool<Postgres>,
}

impl SubSkillRepository {
    /// Create a new [`SubSkillRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All sub-skills in taxonomy order.
    pub async fn list(&self) -> Result<Vec<SubSkillSummary>> {
        Ok(sqlx::query_as::<_, SubSkillSummary>(
            r#"SELECT id, name FROM sub_skills ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Single sub-skill by id.
    pub async fn find_by_id(&self, id: i32) -> Result<SubSkillSummary> {
        sqlx::query_as::<_, SubSkillSummary>(
            r#"SELECT id, name FROM sub_skills WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            ServerError::NotFound(format!(
                "The subskill with the id: {id} could not be found"
            ))
        })
    }
}
