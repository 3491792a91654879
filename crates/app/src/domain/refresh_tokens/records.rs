//! Refresh Token Records

use jiff::Timestamp;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Refresh Token UUID
pub type RefreshTokenUuid = TypedUuid<RefreshTokenRecord>;

/// Refresh Token Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub uuid: RefreshTokenUuid,
    pub user_uuid: UserUuid,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

impl RefreshTokenRecord {
    /// A token is redeemable until it is used, revoked, or expired.
    #[must_use]
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.used_at.is_none() && self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use super::*;

    fn record(expires_at: Timestamp) -> RefreshTokenRecord {
        RefreshTokenRecord {
            uuid: RefreshTokenUuid::new(),
            user_uuid: UserUuid::new(),
            token_hash: String::new(),
            expires_at,
            created_at: Timestamp::UNIX_EPOCH,
            used_at: None,
            revoked_at: None,
        }
    }

    #[test]
    fn fresh_token_is_live() {
        let now = Timestamp::now();

        assert!(record(now + SignedDuration::from_hours(1)).is_live(now));
    }

    #[test]
    fn used_revoked_or_expired_tokens_are_not_live() {
        let now = Timestamp::now();
        let later = now + SignedDuration::from_hours(1);

        let mut used = record(later);
        used.used_at = Some(now);

        let mut revoked = record(later);
        revoked.revoked_at = Some(now);

        assert!(!used.is_live(now), "used");
        assert!(!revoked.is_live(now), "revoked");
        assert!(!record(now).is_live(now), "expiry is exclusive");
    }
}
