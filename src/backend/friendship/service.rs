//! Friendship State Service
//!
//! Owns the bidirectional friend-request state machine stored as relation
//! sets on two user records. Every mutation runs the same protocol: open a
//! transaction, re-read both records inside it, re-validate every guard
//! against that snapshot, apply the symmetric writes with idempotent set
//! primitives, and commit. Write conflicts from concurrent mutations of
//! the same pair retry the whole operation from the top, with jittered
//! backoff, up to a bounded number of attempts under a wall-clock deadline.
//!
//! Guard failures never retry: a request that is already resolved stays
//! resolved, and the caller gets the precise reason instead of a second
//! attempt that cannot succeed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use rand::Rng;
use tokio::time::Instant;
use uuid::Uuid;

use crate::shared::friendship::{PublicProfile, RelationshipState};

use super::error::FriendshipError;
use super::store::{RelationSet, RelationStore, UserRecord};

/// Tuning knobs for the service
#[derive(Debug, Clone)]
pub struct FriendshipConfig {
    /// Attempts per operation before giving up on write conflicts
    pub max_attempts: u32,
    /// Wall-clock cap per operation, counted across retries
    pub retry_deadline: Duration,
    /// Cap on the suggestions listing
    pub suggestion_limit: u64,
    /// Friend-list page size when the caller does not pass one
    pub default_page_size: u32,
    /// Upper bound on caller-provided page sizes
    pub max_page_size: u32,
}

impl Default for FriendshipConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_deadline: Duration::from_secs(3),
            suggestion_limit: 10,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// A page of active friends
#[derive(Debug, Clone)]
pub struct FriendPage {
    pub items: Vec<PublicProfile>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// The friendship state machine over a relation store
#[derive(Clone)]
pub struct FriendshipService {
    store: Arc<dyn RelationStore>,
    config: FriendshipConfig,
}

impl FriendshipService {
    pub fn new(store: Arc<dyn RelationStore>, config: FriendshipConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn RelationStore> {
        &self.store
    }

    /// Send a friend request from `requester_id` to `target_id`.
    ///
    /// Fails when the two ids are equal, when either user is missing or
    /// inactive, when the pair is already friends, or when a request is
    /// already pending in either direction (so crossed simultaneous
    /// requests cannot create two independent edges). On success returns
    /// the target's public profile for UI display.
    pub async fn send_request(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
    ) -> Result<PublicProfile, FriendshipError> {
        if requester_id == target_id {
            return Err(FriendshipError::SelfOperation);
        }
        self.with_retries("send_request", || {
            Box::pin(self.try_send_request(requester_id, target_id))
        })
        .await
    }

    async fn try_send_request(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
    ) -> Result<PublicProfile, FriendshipError> {
        let mut tx = self.store.begin().await?;

        let requester = tx
            .fetch_user(requester_id)
            .await?
            .filter(UserRecord::is_active)
            .ok_or(FriendshipError::UserNotFound {
                user_id: requester_id,
            })?;
        let target = tx
            .fetch_user(target_id)
            .await?
            .filter(UserRecord::is_active)
            .ok_or(FriendshipError::UserNotFound { user_id: target_id })?;

        if requester.has_friend(target_id) || target.has_friend(requester_id) {
            return Err(FriendshipError::AlreadyFriends);
        }

        // Any pending edge between the pair, in either direction, blocks a
        // new request.
        if target.has_pending_from(requester_id)
            || requester.has_sent_to(target_id)
            || requester.has_pending_from(target_id)
            || target.has_sent_to(requester_id)
        {
            return Err(FriendshipError::RequestAlreadyExists);
        }

        tx.add_relation(target_id, RelationSet::PendingRequests, requester_id)
            .await?;
        tx.add_relation(requester_id, RelationSet::SentRequests, target_id)
            .await?;
        tx.commit().await?;

        tracing::debug!(%requester_id, %target_id, "friend request sent");
        Ok(target.public_profile())
    }

    /// Accept the pending request `requester_id` sent to `receiver_id`.
    ///
    /// The edge must exist on both sides; a one-sided edge means the data
    /// is inconsistent and the operation fails instead of repairing it.
    pub async fn accept_request(
        &self,
        requester_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), FriendshipError> {
        self.with_retries("accept_request", || {
            Box::pin(self.try_accept_request(requester_id, receiver_id))
        })
        .await
    }

    async fn try_accept_request(
        &self,
        requester_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), FriendshipError> {
        let mut tx = self.store.begin().await?;

        let requester =
            tx.fetch_user(requester_id)
                .await?
                .ok_or(FriendshipError::UserNotFound {
                    user_id: requester_id,
                })?;
        let receiver =
            tx.fetch_user(receiver_id)
                .await?
                .ok_or(FriendshipError::UserNotFound {
                    user_id: receiver_id,
                })?;

        if !receiver.has_pending_from(requester_id) || !requester.has_sent_to(receiver_id) {
            return Err(FriendshipError::RequestNotFound);
        }

        tx.remove_relation(receiver_id, RelationSet::PendingRequests, requester_id)
            .await?;
        tx.add_relation(receiver_id, RelationSet::Friends, requester_id)
            .await?;
        tx.remove_relation(requester_id, RelationSet::SentRequests, receiver_id)
            .await?;
        tx.add_relation(requester_id, RelationSet::Friends, receiver_id)
            .await?;
        tx.commit().await?;

        tracing::debug!(%requester_id, %receiver_id, "friend request accepted");
        Ok(())
    }

    /// Reject the pending request `requester_id` sent to `receiver_id`,
    /// removing the edge on both sides without creating a friendship.
    pub async fn reject_request(
        &self,
        requester_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), FriendshipError> {
        self.with_retries("reject_request", || {
            Box::pin(self.try_remove_request(requester_id, receiver_id, "friend request rejected"))
        })
        .await
    }

    /// Cancel a still-pending request the sender no longer wants to make.
    /// Same resulting state as a reject; only the invoking party differs.
    pub async fn cancel_request(
        &self,
        requester_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<(), FriendshipError> {
        self.with_retries("cancel_request", || {
            Box::pin(self.try_remove_request(requester_id, receiver_id, "friend request cancelled"))
        })
        .await
    }

    async fn try_remove_request(
        &self,
        requester_id: Uuid,
        receiver_id: Uuid,
        outcome: &'static str,
    ) -> Result<(), FriendshipError> {
        let mut tx = self.store.begin().await?;

        let requester =
            tx.fetch_user(requester_id)
                .await?
                .ok_or(FriendshipError::UserNotFound {
                    user_id: requester_id,
                })?;
        let receiver =
            tx.fetch_user(receiver_id)
                .await?
                .ok_or(FriendshipError::UserNotFound {
                    user_id: receiver_id,
                })?;

        if !receiver.has_pending_from(requester_id) || !requester.has_sent_to(receiver_id) {
            return Err(FriendshipError::RequestNotFound);
        }

        tx.remove_relation(receiver_id, RelationSet::PendingRequests, requester_id)
            .await?;
        tx.remove_relation(requester_id, RelationSet::SentRequests, receiver_id)
            .await?;
        tx.commit().await?;

        tracing::debug!(%requester_id, %receiver_id, outcome);
        Ok(())
    }

    /// Remove an existing friendship, symmetrically on both sides.
    pub async fn unfriend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), FriendshipError> {
        self.with_retries("unfriend", || {
            Box::pin(self.try_unfriend(user_id, friend_id))
        })
        .await
    }

    async fn try_unfriend(&self, user_id: Uuid, friend_id: Uuid) -> Result<(), FriendshipError> {
        let mut tx = self.store.begin().await?;

        let user = tx
            .fetch_user(user_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id })?;
        let friend = tx
            .fetch_user(friend_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id: friend_id })?;

        if !user.has_friend(friend_id) || !friend.has_friend(user_id) {
            return Err(FriendshipError::NotFriends);
        }

        tx.remove_relation(user_id, RelationSet::Friends, friend_id)
            .await?;
        tx.remove_relation(friend_id, RelationSet::Friends, user_id)
            .await?;
        tx.commit().await?;

        tracing::debug!(%user_id, %friend_id, "friendship removed");
        Ok(())
    }

    /// Relationship of `viewer_id` towards `other_id`.
    ///
    /// Single-record read outside any transaction; checks the viewer's
    /// relation sets in priority order.
    pub async fn relationship_state(
        &self,
        viewer_id: Uuid,
        other_id: Uuid,
    ) -> Result<RelationshipState, FriendshipError> {
        if viewer_id == other_id {
            return Ok(RelationshipState::Myself);
        }

        let viewer = self
            .store
            .fetch_user(viewer_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id: viewer_id })?;

        if viewer.has_friend(other_id) {
            Ok(RelationshipState::Friends)
        } else if viewer.has_pending_from(other_id) {
            Ok(RelationshipState::RequestReceived)
        } else if viewer.has_sent_to(other_id) {
            Ok(RelationshipState::RequestSent)
        } else {
            Ok(RelationshipState::None)
        }
    }

    /// Paginated list of active friends, most recently seen first.
    pub async fn list_friends(
        &self,
        user_id: Uuid,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<FriendPage, FriendshipError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(self.config.default_page_size)
            .clamp(1, self.config.max_page_size);

        let user = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id })?;

        let total = self.store.count_active(&user.friends).await?;
        let offset = u64::from(page - 1) * u64::from(page_size);
        let items = self
            .store
            .active_profile_page(&user.friends, offset, u64::from(page_size))
            .await?;

        Ok(FriendPage {
            items,
            page,
            page_size,
            total,
        })
    }

    /// Pending requests other users sent to `user_id`, active senders only.
    pub async fn list_received_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PublicProfile>, FriendshipError> {
        let user = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id })?;
        Ok(self.store.active_profiles(&user.pending_requests).await?)
    }

    /// Requests `user_id` has sent that are still pending.
    pub async fn list_sent_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PublicProfile>, FriendshipError> {
        let user = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id })?;
        Ok(self.store.active_profiles(&user.sent_requests).await?)
    }

    /// Active users with no relation to `user_id`, newest accounts first.
    /// A plain exclusion-set filter, capped at the configured limit.
    pub async fn suggest_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PublicProfile>, FriendshipError> {
        let user = self
            .store
            .fetch_user(user_id)
            .await?
            .ok_or(FriendshipError::UserNotFound { user_id })?;

        let mut exclude = Vec::with_capacity(
            1 + user.friends.len() + user.pending_requests.len() + user.sent_requests.len(),
        );
        exclude.push(user.id);
        exclude.extend_from_slice(&user.friends);
        exclude.extend_from_slice(&user.pending_requests);
        exclude.extend_from_slice(&user.sent_requests);

        Ok(self
            .store
            .suggestion_candidates(&exclude, self.config.suggestion_limit)
            .await?)
    }

    /// Run one attempt function until it succeeds, fails deterministically,
    /// or the retry budget is spent. Only transient store conflicts retry.
    async fn with_retries<'a, T>(
        &'a self,
        op: &'static str,
        attempt_fn: impl Fn() -> BoxFuture<'a, Result<T, FriendshipError>>,
    ) -> Result<T, FriendshipError> {
        let deadline = Instant::now() + self.config.retry_deadline;
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Err(FriendshipError::Store(err)) if err.is_transient() => {
                    if attempt >= self.config.max_attempts || Instant::now() >= deadline {
                        tracing::warn!(op, attempt, "giving up after repeated write conflicts");
                        return Err(FriendshipError::Unavailable);
                    }
                    let pause = backoff_delay(attempt);
                    tracing::debug!(
                        op,
                        attempt,
                        pause_ms = pause.as_millis() as u64,
                        "write conflict, retrying"
                    );
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Randomized backoff in the tens of milliseconds, scaled by attempt, to
/// de-correlate concurrently racing clients.
fn backoff_delay(attempt: u32) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(10..=40);
    Duration::from_millis(u64::from(attempt) * jitter_ms)
}
