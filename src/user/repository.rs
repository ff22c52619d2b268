//! Handle database requests.

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::error::{Result, ServerError};
use crate::user::{
    Names, Page, PaginatedResponse, Review, SkillKind, SkillRef, SortKey,
    UserProfile, UserSummary, full_name, truncated_mean,
};

/// Predicate of the user listing.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    /// Restrict to users having this skill.
    pub skill_id: Option<i32>,
    /// Hide this user from the results (the authenticated caller).
    pub exclude_user_id: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List users: predicate, sort, count, window, project.
    pub async fn list(
        &self,
        filter: &ListFilter,
        sort: SortKey,
        page: Page,
    ) -> Result<PaginatedResponse<UserSummary>> {
        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM users u");
        push_filters(&mut count_query, filter);
        let total_records: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::new(
            r#"SELECT
                u.id,
                u.email,
                u.first_name,
                u.last_name,
                c.name AS city,
                u.profile_picture_url,
                (SELECT COUNT(*) FROM reviews r
                    WHERE r.user_id = u.id) AS review_count,
                (SELECT AVG(r.rating)::FLOAT8 FROM reviews r
                    WHERE r.user_id = u.id) AS mean_rating,
                ARRAY(SELECT s.name FROM user_skills us
                    JOIN skills s ON s.id = us.skill_id
                    WHERE us.user_id = u.id
                    ORDER BY s.name) AS skills
            FROM users u
            LEFT JOIN cities c ON c.id = u.city_id"#,
        );
        push_filters(&mut query, filter);

        // Secondary key keeps pagination stable across equal ranks.
        query.push(match sort {
            SortKey::BestRating => {
                " ORDER BY mean_rating DESC NULLS LAST, u.id"
            },
            SortKey::MostRatings => " ORDER BY review_count DESC, u.id",
            SortKey::Unsorted => " ORDER BY u.id",
        });
        query.push(" OFFSET ").push_bind(page.offset());
        query.push(" LIMIT ").push_bind(page.size);

        let rows: Vec<ListRow> =
            query.build_query_as().fetch_all(&self.pool).await?;

        Ok(PaginatedResponse {
            page_index: page.index,
            page_size: page.size,
            total_records,
            data: rows.into_iter().map(UserSummary::from).collect(),
        })
    }

    /// Single-user profile with skills and wanted skills.
    pub async fn find_profile(&self, user_id: &str) -> Result<UserProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"SELECT
                u.id,
                u.first_name,
                u.last_name,
                c.name AS city,
                u.bio,
                u.profile_picture_url,
                (SELECT COUNT(*) FROM reviews r
                    WHERE r.user_id = u.id) AS review_count,
                (SELECT AVG(r.rating)::FLOAT8 FROM reviews r
                    WHERE r.user_id = u.id) AS mean_rating
            FROM users u
            LEFT JOIN cities c ON c.id = u.city_id
            WHERE u.id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

        let skills = self.skill_refs(user_id, SkillKind::Has).await?;
        let wanted_skills = self.skill_refs(user_id, SkillKind::Wanted).await?;

        Ok(UserProfile {
            name: full_name(
                row.first_name.as_deref(),
                row.last_name.as_deref(),
            ),
            id: row.id,
            city: row.city,
            bio: row.bio,
            profile_picture_url: row.profile_picture_url,
            review_count: row.review_count,
            rating: truncated_mean(row.mean_rating),
            skills,
            wanted_skills,
        })
    }

    /// Name triple of a user.
    pub async fn names(&self, user_id: &str) -> Result<Names> {
        sqlx::query_as::<_, Names>(
            r#"SELECT first_name, middle_name, last_name
                FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| user_not_found(user_id))
    }

    /// Replace the full name triple.
    pub async fn update_names(
        &self,
        user_id: &str,
        names: &Names,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE users
                SET first_name = $1, middle_name = $2, last_name = $3
                WHERE id = $4"#,
        )
        .bind(&names.first_name)
        .bind(&names.middle_name)
        .bind(&names.last_name)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    /// Replace the first name only.
    pub async fn update_first_name(
        &self,
        user_id: &str,
        first_name: &str,
    ) -> Result<()> {
        let result =
            sqlx::query(r#"UPDATE users SET first_name = $1 WHERE id = $2"#)
                .bind(first_name)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    /// Profile-picture URL; `None` is a valid absence, not an error.
    pub async fn profile_picture(
        &self,
        user_id: &str,
    ) -> Result<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>(
            r#"SELECT profile_picture_url FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| user_not_found(user_id))
    }

    /// Overwrite the profile-picture URL.
    pub async fn set_profile_picture(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE users SET profile_picture_url = $1 WHERE id = $2"#,
        )
        .bind(url)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    /// Attach a skill or wanted skill to a user.
    ///
    /// The uniqueness invariant lives in the join-table primary key; a
    /// concurrent identical call loses the race at the constraint, not at
    /// an application-level existence check.
    pub async fn assign_skill(
        &self,
        user_id: &str,
        skill_id: i32,
        kind: SkillKind,
    ) -> Result<()> {
        self.ensure_exists(user_id).await?;

        let known_skill = sqlx::query_scalar::<_, i32>(
            r#"SELECT id FROM skills WHERE id = $1"#,
        )
        .bind(skill_id)
        .fetch_optional(&self.pool)
        .await?;
        if known_skill.is_none() {
            return Err(ServerError::NotFound(format!(
                "The skill with the id: {skill_id} could not be found"
            )));
        }

        let insert = format!(
            "INSERT INTO {} (user_id, skill_id) VALUES ($1, $2)",
            kind.table()
        );
        match sqlx::query(&insert)
            .bind(user_id)
            .bind(skill_id)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(ServerError::Duplicate(format!(
                    "The user with id: {user_id} already has the {} with id: {skill_id}",
                    kind.noun()
                )))
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Insert a review; the subject user must exist.
    pub async fn insert_review(&self, review: &Review) -> Result<()> {
        self.ensure_exists(&review.user_id).await?;

        sqlx::query(
            r#"INSERT INTO reviews (id, rating, comment, created_at, user_id, posted_by_id)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(&review.user_id)
        .bind(&review.posted_by_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reviews received by a user, newest first.
    pub async fn reviews(&self, user_id: &str) -> Result<Vec<Review>> {
        Ok(sqlx::query_as::<_, Review>(
            r#"SELECT id, rating, comment, created_at, user_id, posted_by_id
                FROM reviews WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn skill_refs(
        &self,
        user_id: &str,
        kind: SkillKind,
    ) -> Result<Vec<SkillRef>> {
        let query = format!(
            "SELECT s.id AS skill_id, s.name FROM {} j \
                JOIN skills s ON s.id = j.skill_id \
                WHERE j.user_id = $1 ORDER BY s.id",
            kind.table()
        );

        Ok(sqlx::query_as::<_, SkillRef>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn ensure_exists(&self, user_id: &str) -> Result<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(user_not_found(user_id))
        }
    }
}

fn user_not_found(user_id: &str) -> ServerError {
    ServerError::NotFound(format!(
        "The user with id: {user_id} could not be found"
    ))
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ListFilter) {
    let mut separator = " WHERE ";

    if let Some(skill_id) = filter.skill_id {
        query
            .push(separator)
            .push(
                "EXISTS (SELECT 1 FROM user_skills f \
                    WHERE f.user_id = u.id AND f.skill_id = ",
            )
            .push_bind(skill_id)
            .push(")");
        separator = " AND ";
    }

    if let Some(exclude) = &filter.exclude_user_id {
        query
            .push(separator)
            .push("u.id <> ")
            .push_bind(exclude.clone());
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListRow {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    city: Option<String>,
    profile_picture_url: Option<String>,
    review_count: i64,
    mean_rating: Option<f64>,
    skills: Vec<String>,
}

impl From<ListRow> for UserSummary {
    fn from(row: ListRow) -> Self {
        Self {
            name: full_name(
                row.first_name.as_deref(),
                row.last_name.as_deref(),
            ),
            id: row.id,
            email: row.email,
            city: row.city,
            profile_picture_url: row.profile_picture_url,
            review_count: row.review_count,
            rating: truncated_mean(row.mean_rating),
            skills: row.skills,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    city: Option<String>,
    bio: Option<String>,
    profile_picture_url: Option<String>,
    review_count: i64,
    mean_rating: Option<f64>,
}
