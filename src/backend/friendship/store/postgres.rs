//! PostgreSQL adapter for the relation store.
//!
//! Relation sets live as `uuid[]` columns on the user row. Mutations run
//! inside SERIALIZABLE transactions; serialization failures and deadlocks
//! (sqlstate 40001/40P01) are reported as [`StoreError::Conflict`] so the
//! service can retry the whole operation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::shared::friendship::{PublicProfile, UserStatus};

use super::{NewUser, RelationSet, RelationStore, RelationTx, StoreError, UserRecord};

const USER_COLUMNS: &str = "id, display_name, email, password_hash, avatar_url, city, country, \
     status, friends, pending_requests, sent_requests, created_at, last_seen_at";

const PROFILE_COLUMNS: &str = "id, display_name, avatar_url, city, country, last_seen_at";

/// Relation store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgRelationStore {
    pool: PgPool,
}

impl PgRelationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            // serialization_failure / deadlock_detected: retryable contention
            if code.as_ref() == "40001" || code.as_ref() == "40P01" {
                return StoreError::Conflict;
            }
            // unique_violation: the only unique constraint is the email
            if code.as_ref() == "23505" {
                return StoreError::DuplicateEmail;
            }
        }
    }
    StoreError::Database(err)
}

fn row_to_user(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        avatar_url: row.get("avatar_url"),
        city: row.get("city"),
        country: row.get("country"),
        status: UserStatus::from_str(row.get::<String, _>("status").as_str())
            .unwrap_or(UserStatus::Pending),
        friends: row.get("friends"),
        pending_requests: row.get("pending_requests"),
        sent_requests: row.get("sent_requests"),
        created_at: row.get("created_at"),
        last_seen_at: row.get("last_seen_at"),
    }
}

fn row_to_profile(row: &PgRow) -> PublicProfile {
    PublicProfile {
        id: row.get("id"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        city: row.get("city"),
        country: row.get("country"),
        last_seen_at: row.get("last_seen_at"),
    }
}

#[async_trait]
impl RelationStore for PgRelationStore {
    async fn begin(&self) -> Result<Box<dyn RelationTx>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        Ok(Box::new(PgRelationTx { tx }))
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, email, password_hash, avatar_url, city, country, status, created_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(&user.city)
        .bind(&user.country)
        .bind(user.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(UserRecord {
            id,
            display_name: user.display_name,
            email: user.email,
            password_hash: user.password_hash,
            avatar_url: user.avatar_url,
            city: user.city,
            country: user.country,
            status: user.status,
            friends: Vec::new(),
            pending_requests: Vec::new(),
            sent_requests: Vec::new(),
            created_at: now,
            last_seen_at: now,
        })
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn active_profiles(&self, ids: &[Uuid]) -> Result<Vec<PublicProfile>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users \
             WHERE id = ANY($1) AND status = 'active' \
             ORDER BY last_seen_at DESC"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn active_profile_page(
        &self,
        ids: &[Uuid],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users \
             WHERE id = ANY($1) AND status = 'active' \
             ORDER BY last_seen_at DESC \
             OFFSET $2 LIMIT $3"
        ))
        .bind(ids.to_vec())
        .bind(offset as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn count_active(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM users WHERE id = ANY($1) AND status = 'active'",
        )
        .bind(ids.to_vec())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.get::<i64, _>("count") as u64)
    }

    async fn suggestion_candidates(
        &self,
        exclude: &[Uuid],
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users \
             WHERE status = 'active' AND id <> ALL($1) \
             ORDER BY created_at DESC \
             LIMIT $2"
        ))
        .bind(exclude.to_vec())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(row_to_profile).collect())
    }

    async fn touch_last_seen(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_seen_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}

struct PgRelationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RelationTx for PgRelationTx {
    async fn fetch_user(&mut self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn add_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError> {
        let column = set.column();
        sqlx::query(&format!(
            "UPDATE users SET {column} = array_append({column}, $2) \
             WHERE id = $1 AND NOT ({column} @> ARRAY[$2])"
        ))
        .bind(user)
        .bind(other)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn remove_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError> {
        let column = set.column();
        sqlx::query(&format!(
            "UPDATE users SET {column} = array_remove({column}, $2) WHERE id = $1"
        ))
        .bind(user)
        .bind(other)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
