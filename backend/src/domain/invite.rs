//! Invite codes gating account registration.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::{Role, UserId};
use crate::domain::Error;

const CODE_LEN: usize = 12;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A single- or multi-use token that authorises registration for a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteCode {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(example = "K7M2P9QXW4RT")]
    pub code: String,
    pub role: Role,
    pub max_uses: u32,
    pub used_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    #[schema(value_type = String)]
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    /// Mint a new invite with a random code.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        role: Role,
        max_uses: u32,
        expires_at: Option<DateTime<Utc>>,
        created_by: UserId,
    ) -> Result<Self, Error> {
        if max_uses == 0 {
            return Err(Error::invalid_request("maxUses must be at least 1"));
        }
        let code: String = (0..CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..CODE_ALPHABET.len());
                char::from(CODE_ALPHABET[idx])
            })
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            role,
            max_uses,
            used_count: 0,
            expires_at,
            revoked: false,
            created_by,
            created_at: Utc::now(),
        })
    }

    /// Check the invite can still be redeemed at `now`.
    ///
    /// Exhaustion is reported as a conflict so the client can distinguish a
    /// race on the last use from a dead code.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), Error> {
        if self.revoked {
            return Err(Error::invalid_request("invite code has been revoked"));
        }
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return Err(Error::invalid_request("invite code has expired"));
            }
        }
        if self.used_count >= self.max_uses {
            return Err(Error::conflict("invite code has no uses remaining"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::ErrorCode;

    fn invite(mutator: impl FnOnce(&mut InviteCode)) -> InviteCode {
        let mut rng = StdRng::seed_from_u64(11);
        let mut invite =
            InviteCode::generate(&mut rng, Role::Agent, 3, None, UserId::random())
                .expect("valid invite");
        mutator(&mut invite);
        invite
    }

    #[test]
    fn zero_max_uses_is_rejected() {
        let mut rng = StdRng::seed_from_u64(11);
        let err = InviteCode::generate(&mut rng, Role::Agent, 0, None, UserId::random())
            .expect_err("zero uses");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn generated_codes_have_expected_shape() {
        let invite = invite(|_| {});
        assert_eq!(invite.code.len(), CODE_LEN);
        assert!(invite.code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn fresh_invite_is_redeemable() {
        assert!(invite(|_| {}).check_redeemable(Utc::now()).is_ok());
    }

    #[test]
    fn revoked_invite_is_a_bad_request() {
        let err = invite(|i| i.revoked = true)
            .check_redeemable(Utc::now())
            .expect_err("revoked");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn expired_invite_is_a_bad_request() {
        let err = invite(|i| i.expires_at = Some(Utc::now() - Duration::hours(1)))
            .check_redeemable(Utc::now())
            .expect_err("expired");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn exhausted_invite_is_a_conflict() {
        let err = invite(|i| i.used_count = i.max_uses)
            .check_redeemable(Utc::now())
            .expect_err("exhausted");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}
