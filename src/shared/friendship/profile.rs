//! User status and public profile projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account status of a user
///
/// Only `Active` users may participate in friendship operations; the other
/// two states are excluded from listings and suggestions as well.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account is active and visible
    Active,
    /// Account has been deactivated
    Inactive,
    /// Account was created but not yet activated
    Pending,
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Active
    }
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "pending" => Some(UserStatus::Pending),
            _ => None,
        }
    }
}

/// Minimal public view of a user, returned by listings and by a successful
/// friend request. Display fields are joined in at read time, never stored
/// on the relation edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicProfile {
    /// Unique user ID
    pub id: Uuid,
    /// Name shown in friend lists and request cards
    pub display_name: String,
    /// Avatar image URL, if the user uploaded one
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Last connection time, used to order friend listings
    pub last_seen_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [UserStatus::Active, UserStatus::Inactive, UserStatus::Pending] {
            assert_eq!(UserStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_from_unknown() {
        assert_eq!(UserStatus::from_str("banned"), None);
    }

    #[test]
    fn test_status_case_insensitive() {
        assert_eq!(UserStatus::from_str("Active"), Some(UserStatus::Active));
    }

    #[test]
    fn test_profile_serialization_round_trip() {
        let profile = PublicProfile {
            id: Uuid::new_v4(),
            display_name: "Ada Lovelace".to_string(),
            avatar_url: Some("https://example.com/ada.png".to_string()),
            city: Some("London".to_string()),
            country: None,
            last_seen_at: Utc::now(),
        };
        let json = serde_json::to_string(&profile).unwrap();
        let back: PublicProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }
}
