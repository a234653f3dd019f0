//! Relation Store
//!
//! Storage abstraction for user records and their relation sets. The
//! friendship service talks to a [`RelationStore`] and never to a concrete
//! database, so the transactional protocol can run against PostgreSQL in
//! production and against the in-memory store in tests or when no database
//! is configured.
//!
//! A [`RelationTx`] covers exactly one friendship operation: both user
//! documents are read and mutated inside it, and dropping the transaction
//! without committing rolls every write back.

pub mod memory;
pub mod postgres;

pub use memory::MemoryRelationStore;
pub use postgres::PgRelationStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::friendship::{PublicProfile, UserStatus};

/// Storage-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Concurrent transactions touched the same rows; the whole operation
    /// may be retried against a fresh snapshot.
    #[error("write conflict on concurrent update")]
    Conflict,

    /// The email address is already registered
    #[error("email address already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether retrying the operation can succeed. Only contention-style
    /// failures qualify; everything else is surfaced on first occurrence.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

/// The three relation sets stored on every user record.
///
/// Mirrors the document layout: a friendship or pending request is an entry
/// in one of these sets on each of the two users involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSet {
    Friends,
    PendingRequests,
    SentRequests,
}

impl RelationSet {
    pub fn column(&self) -> &'static str {
        match self {
            RelationSet::Friends => "friends",
            RelationSet::PendingRequests => "pending_requests",
            RelationSet::SentRequests => "sent_requests",
        }
    }
}

/// A stored user with their relation sets
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: UserStatus,
    pub friends: Vec<Uuid>,
    pub pending_requests: Vec<Uuid>,
    pub sent_requests: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn has_friend(&self, other: Uuid) -> bool {
        self.friends.contains(&other)
    }

    pub fn has_pending_from(&self, other: Uuid) -> bool {
        self.pending_requests.contains(&other)
    }

    pub fn has_sent_to(&self, other: Uuid) -> bool {
        self.sent_requests.contains(&other)
    }

    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            last_seen_at: self.last_seen_at,
        }
    }
}

/// Fields needed to create a user; relation sets start empty.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: UserStatus,
}

/// One in-flight friendship operation.
///
/// Reads observe a consistent snapshot; writes are idempotent set
/// operations so a retried operation never double-applies. Dropping the
/// transaction without calling [`RelationTx::commit`] discards all writes.
#[async_trait]
pub trait RelationTx: Send {
    /// Read a user record inside the transaction
    async fn fetch_user(&mut self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Add `other` to one of `user`'s relation sets, if absent
    async fn add_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError>;

    /// Remove `other` from one of `user`'s relation sets, if present
    async fn remove_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError>;

    /// Commit all writes. Returns [`StoreError::Conflict`] when another
    /// transaction won a race on the same records.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// User-record storage with transactional pair updates
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Open a transaction at the strongest isolation the store offers
    async fn begin(&self) -> Result<Box<dyn RelationTx>, StoreError>;

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn fetch_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Join-read the active users among `ids`, most recently seen first
    async fn active_profiles(&self, ids: &[Uuid]) -> Result<Vec<PublicProfile>, StoreError>;

    /// Page of active users among `ids`, most recently seen first
    async fn active_profile_page(
        &self,
        ids: &[Uuid],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError>;

    /// Number of active users among `ids`
    async fn count_active(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    /// Active users not in `exclude`, newest accounts first
    async fn suggestion_candidates(
        &self,
        exclude: &[Uuid],
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError>;

    /// Record a connection, bumping `last_seen_at`
    async fn touch_last_seen(&self, id: Uuid) -> Result<(), StoreError>;
}
