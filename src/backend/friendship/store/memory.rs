//! In-memory adapter for the relation store.
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. The
//! store keeps a version counter per user record; a transaction snapshots
//! the versions it read and the commit fails with [`StoreError::Conflict`]
//! if any of them moved in the meantime, so the service's retry path is
//! exercised for real instead of being Postgres-only behavior.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::shared::friendship::PublicProfile;

use super::{NewUser, RelationSet, RelationStore, RelationTx, StoreError, UserRecord};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, VersionedUser>,
    forced_conflicts: u32,
}

struct VersionedUser {
    record: UserRecord,
    version: u64,
}

/// Relation store held entirely in process memory
#[derive(Clone, Default)]
pub struct MemoryRelationStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next `n` commits to fail with a write conflict.
    ///
    /// Test hook for the retry path; has no effect on reads.
    pub fn inject_commit_conflicts(&self, n: u32) {
        self.inner.lock().unwrap().forced_conflicts += n;
    }

    /// Change a user's account status.
    ///
    /// Account activation and deactivation are driven from outside the
    /// friendship API, so the in-memory backend exposes them directly.
    pub fn set_status(&self, id: Uuid, status: crate::shared::friendship::UserStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.users.get_mut(&id) {
            entry.record.status = status;
            entry.version += 1;
        }
    }
}

fn set_of(record: &mut UserRecord, set: RelationSet) -> &mut Vec<Uuid> {
    match set {
        RelationSet::Friends => &mut record.friends,
        RelationSet::PendingRequests => &mut record.pending_requests,
        RelationSet::SentRequests => &mut record.sent_requests,
    }
}

#[async_trait]
impl RelationStore for MemoryRelationStore {
    async fn begin(&self) -> Result<Box<dyn RelationTx>, StoreError> {
        Ok(Box::new(MemoryRelationTx {
            inner: self.inner.clone(),
            read_versions: HashMap::new(),
            writes: Vec::new(),
        }))
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .values()
            .any(|entry| entry.record.email == user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
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
        };
        inner.users.insert(
            record.id,
            VersionedUser {
                record: record.clone(),
                version: 0,
            },
        );
        Ok(record)
    }

    async fn fetch_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).map(|entry| entry.record.clone()))
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|entry| entry.record.email == email)
            .map(|entry| entry.record.clone()))
    }

    async fn active_profiles(&self, ids: &[Uuid]) -> Result<Vec<PublicProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut profiles: Vec<PublicProfile> = ids
            .iter()
            .filter_map(|id| inner.users.get(id))
            .filter(|entry| entry.record.is_active())
            .map(|entry| entry.record.public_profile())
            .collect();
        profiles.sort_by(|a, b| b.last_seen_at.cmp(&a.last_seen_at));
        Ok(profiles)
    }

    async fn active_profile_page(
        &self,
        ids: &[Uuid],
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError> {
        let all = self.active_profiles(ids).await?;
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_active(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id))
            .filter(|entry| entry.record.is_active())
            .count() as u64)
    }

    async fn suggestion_candidates(
        &self,
        exclude: &[Uuid],
        limit: u64,
    ) -> Result<Vec<PublicProfile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut candidates: Vec<&UserRecord> = inner
            .users
            .values()
            .map(|entry| &entry.record)
            .filter(|record| record.is_active() && !exclude.contains(&record.id))
            .collect();
        candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(candidates
            .into_iter()
            .take(limit as usize)
            .map(|record| record.public_profile())
            .collect())
    }

    async fn touch_last_seen(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.users.get_mut(&id) {
            entry.record.last_seen_at = Utc::now();
            entry.version += 1;
        }
        Ok(())
    }
}

struct PendingWrite {
    user: Uuid,
    set: RelationSet,
    other: Uuid,
    add: bool,
}

struct MemoryRelationTx {
    inner: Arc<Mutex<Inner>>,
    /// Versions observed by reads; checked again at commit time
    read_versions: HashMap<Uuid, u64>,
    /// Writes buffered until commit; dropping the tx discards them
    writes: Vec<PendingWrite>,
}

#[async_trait]
impl RelationTx for MemoryRelationTx {
    async fn fetch_user(&mut self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        match inner.users.get(&id) {
            Some(entry) => {
                self.read_versions.insert(id, entry.version);
                Ok(Some(entry.record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn add_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError> {
        self.writes.push(PendingWrite {
            user,
            set,
            other,
            add: true,
        });
        Ok(())
    }

    async fn remove_relation(
        &mut self,
        user: Uuid,
        set: RelationSet,
        other: Uuid,
    ) -> Result<(), StoreError> {
        self.writes.push(PendingWrite {
            user,
            set,
            other,
            add: false,
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if inner.forced_conflicts > 0 {
            inner.forced_conflicts -= 1;
            return Err(StoreError::Conflict);
        }

        for (id, seen_version) in &self.read_versions {
            let current = inner.users.get(id).map(|entry| entry.version);
            if current != Some(*seen_version) {
                return Err(StoreError::Conflict);
            }
        }

        for write in &self.writes {
            if let Some(entry) = inner.users.get_mut(&write.user) {
                let set = set_of(&mut entry.record, write.set);
                if write.add {
                    if !set.contains(&write.other) {
                        set.push(write.other);
                    }
                } else {
                    set.retain(|id| *id != write.other);
                }
                entry.version += 1;
            }
        }

        Ok(())
    }
}
