//! Verification code business logic for the public group-lookup flow.
//!
//! Codes are persisted with a TTL and keyed by group code (one live code per
//! group), so they survive restarts and work across instances. A code is
//! consumed on successful check.

use crate::{
    entities::{VerificationCode, VerificationCodeModel, verification_code},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// How long an issued code stays valid.
pub const CODE_TTL_MINUTES: i64 = 10;

/// Issues a fresh 6-digit code for a group, replacing any previous one.
pub async fn issue_code<C>(
    conn: &C,
    group_code: &str,
    contact: &str,
) -> Result<VerificationCodeModel>
where
    C: ConnectionTrait,
{
    let code = format!("{:06}", rand::rng().random_range(0..=999_999u32));
    let now = Utc::now();
    let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);

    let existing = VerificationCode::find()
        .filter(verification_code::Column::GroupCode.eq(group_code))
        .one(conn)
        .await?;

    if let Some(existing) = existing {
        let mut active: verification_code::ActiveModel = existing.into();
        active.code = Set(code);
        active.contact = Set(contact.to_string());
        active.expires_at = Set(expires_at);
        active.created_at = Set(now);
        active.update(conn).await.map_err(Into::into)
    } else {
        verification_code::ActiveModel {
            group_code: Set(group_code.to_string()),
            code: Set(code),
            contact: Set(contact.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(Into::into)
    }
}

/// Checks a submitted code against the stored one. A match consumes the
/// code; an expired code is removed and reported as such.
pub async fn check_code<C>(conn: &C, group_code: &str, submitted: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let stored = VerificationCode::find()
        .filter(verification_code::Column::GroupCode.eq(group_code))
        .one(conn)
        .await?
        .ok_or(Error::VerificationCodeInvalid)?;

    if Utc::now() > stored.expires_at {
        stored.delete(conn).await?;
        return Err(Error::VerificationCodeExpired);
    }

    if stored.code != submitted {
        return Err(Error::VerificationCodeInvalid);
    }

    stored.delete(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_issue_and_check_code() -> Result<()> {
        let db = setup_test_db().await?;

        let issued = issue_code(&db, "001-002-003-004-005", "+221770000000").await?;
        assert_eq!(issued.code.len(), 6);

        check_code(&db, "001-002-003-004-005", &issued.code).await?;

        // Consumed on success.
        let err = check_code(&db, "001-002-003-004-005", &issued.code)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VerificationCodeInvalid));

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_code_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let issued = issue_code(&db, "001-002-003-004-005", "+221770000000").await?;
        let wrong = if issued.code == "000000" { "000001" } else { "000000" };

        let err = check_code(&db, "001-002-003-004-005", wrong).await.unwrap_err();
        assert!(matches!(err, Error::VerificationCodeInvalid));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_code_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        let issued = issue_code(&db, "001-002-003-004-005", "+221770000000").await?;
        let mut active: verification_code::ActiveModel = issued.clone().into();
        active.expires_at = Set(Utc::now() - Duration::minutes(1));
        active.update(&db).await?;

        let err = check_code(&db, "001-002-003-004-005", &issued.code)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VerificationCodeExpired));

        Ok(())
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() -> Result<()> {
        let db = setup_test_db().await?;

        let first = issue_code(&db, "001-002-003-004-005", "+221770000000").await?;
        let second = issue_code(&db, "001-002-003-004-005", "+221770000000").await?;

        // Only one live code per group.
        let count = VerificationCode::find().count(&db).await?;
        assert_eq!(count, 1);

        if first.code != second.code {
            let err = check_code(&db, "001-002-003-004-005", &first.code)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::VerificationCodeInvalid));
        }
        check_code(&db, "001-002-003-004-005", &second.code).await?;

        Ok(())
    }
}
