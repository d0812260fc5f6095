use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::core::error::AppError;

/// SQL condition for an active direct share; `ds` is the `document_shares` alias
pub const ACTIVE_SHARE_SQL: &str = "(ds.expires_at IS NULL OR ds.expires_at > NOW())";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    Read,
    Edit,
}

impl PermissionLevel {
    /// Unknown values degrade to read-only
    pub fn parse(value: &str) -> Self {
        match value {
            "edit" => PermissionLevel::Edit,
            _ => PermissionLevel::Read,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::Read => "read",
            PermissionLevel::Edit => "edit",
        }
    }
}

/// Why a user may read a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGrant {
    Owner,
    Shared(PermissionLevel),
    Link(PermissionLevel),
}

/// A direct share of the document with the requesting user
#[derive(Debug, Clone, Copy)]
pub struct ShareFacts {
    pub permission: PermissionLevel,
    pub expires_at: Option<DateTime<Utc>>,
}

pub fn is_share_active(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.map_or(true, |at| at > now)
}

/// Access of `user_id` to a document owned by `owner_id`.
///
/// Trashed documents are never reachable through a share.
pub fn resolve_access(
    user_id: i64,
    owner_id: i64,
    trashed: bool,
    share: Option<ShareFacts>,
    now: DateTime<Utc>,
) -> Option<AccessGrant> {
    if trashed {
        return None;
    }
    if user_id == owner_id {
        return Some(AccessGrant::Owner);
    }
    share
        .filter(|s| is_share_active(s.expires_at, now))
        .map(|s| AccessGrant::Shared(s.permission))
}

/// Append ` AND <alias> is visible to user_id`: not trashed, and owned or actively shared.
pub fn push_visible_condition(
    builder: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    user_id: i64,
) {
    builder
        .push(format!(
            " AND {alias}.deleted_at IS NULL AND ({alias}.user_id = "
        ))
        .push_bind(user_id)
        .push(format!(
            " OR EXISTS (SELECT 1 FROM document_shares ds WHERE ds.document_id = {alias}.id AND ds.user_id = "
        ))
        .push_bind(user_id)
        .push(format!(" AND {ACTIVE_SHARE_SQL}))"));
}

/// Share link state relevant to the access gates
#[derive(Debug, Clone, Copy)]
pub struct LinkFacts<'a> {
    pub expires_at: Option<DateTime<Utc>>,
    pub require_login: bool,
    pub require_code: bool,
    pub access_code: Option<&'a str>,
    pub locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDenial {
    Expired,
    LoginRequired,
    Locked,
    CodeRequired,
    CodeIncorrect,
}

impl From<LinkDenial> for AppError {
    fn from(denial: LinkDenial) -> Self {
        match denial {
            LinkDenial::Expired => AppError::Forbidden("This share link has expired".to_string()),
            LinkDenial::LoginRequired => {
                AppError::Unauthorized("Login is required to open this share link".to_string())
            }
            LinkDenial::Locked => AppError::RateLimitExceeded(
                "Too many incorrect access codes, try again later".to_string(),
            ),
            LinkDenial::CodeRequired => {
                AppError::Forbidden("An access code is required".to_string())
            }
            LinkDenial::CodeIncorrect => {
                AppError::Forbidden("The access code is incorrect".to_string())
            }
        }
    }
}

/// Gate chain of a link that exists: expiry, login, lock, then access code
pub fn check_link_gates(
    link: &LinkFacts<'_>,
    authenticated: bool,
    presented_code: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), LinkDenial> {
    if !is_share_active(link.expires_at, now) {
        return Err(LinkDenial::Expired);
    }
    if link.require_login && !authenticated {
        return Err(LinkDenial::LoginRequired);
    }
    if !link.require_code {
        return Ok(());
    }
    if link.locked_until.is_some_and(|until| until > now) {
        return Err(LinkDenial::Locked);
    }

    let presented = presented_code
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(LinkDenial::CodeRequired)?;
    let expected = link.access_code.ok_or(LinkDenial::CodeIncorrect)?;

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(LinkDenial::CodeIncorrect)
    }
}

/// Byte comparison whose duration does not depend on where the inputs differ
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn share(expires_at: Option<DateTime<Utc>>) -> Option<ShareFacts> {
        Some(ShareFacts {
            permission: PermissionLevel::Read,
            expires_at,
        })
    }

    fn link<'a>() -> LinkFacts<'a> {
        LinkFacts {
            expires_at: None,
            require_login: false,
            require_code: false,
            access_code: None,
            locked_until: None,
        }
    }

    #[test]
    fn test_share_activity() {
        let now = Utc::now();
        assert!(is_share_active(None, now));
        assert!(is_share_active(Some(now + Duration::hours(1)), now));
        assert!(!is_share_active(Some(now - Duration::seconds(1)), now));
        assert!(!is_share_active(Some(now), now));
    }

    #[test]
    fn test_resolve_access() {
        let now = Utc::now();

        assert_eq!(resolve_access(1, 1, false, None, now), Some(AccessGrant::Owner));
        assert_eq!(
            resolve_access(2, 1, false, share(None), now),
            Some(AccessGrant::Shared(PermissionLevel::Read))
        );
        assert_eq!(
            resolve_access(2, 1, false, share(Some(now - Duration::days(1))), now),
            None
        );
        assert_eq!(resolve_access(2, 1, false, None, now), None);
    }

    #[test]
    fn test_trashed_documents_are_not_reachable_through_shares() {
        let now = Utc::now();
        assert_eq!(resolve_access(2, 1, true, share(None), now), None);
        assert_eq!(resolve_access(1, 1, true, None, now), None);
    }

    #[test]
    fn test_permission_level_parse() {
        assert_eq!(PermissionLevel::parse("edit"), PermissionLevel::Edit);
        assert_eq!(PermissionLevel::parse("bogus"), PermissionLevel::Read);
    }

    #[test]
    fn test_visible_condition_sql() {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT d.id FROM documents d WHERE TRUE");
        push_visible_condition(&mut builder, "d", 5);

        assert_eq!(
            builder.sql(),
            "SELECT d.id FROM documents d WHERE TRUE AND d.deleted_at IS NULL AND (d.user_id = $1 \
             OR EXISTS (SELECT 1 FROM document_shares ds WHERE ds.document_id = d.id AND ds.user_id = $2 \
             AND (ds.expires_at IS NULL OR ds.expires_at > NOW())))"
        );
    }

    #[test]
    fn test_link_without_gates() {
        assert_eq!(check_link_gates(&link(), false, None, Utc::now()), Ok(()));
    }

    #[test]
    fn test_link_gate_order() {
        let now = Utc::now();
        let mut facts = link();
        facts.expires_at = Some(now - Duration::minutes(1));
        facts.require_login = true;
        facts.require_code = true;
        facts.access_code = Some("123456");

        // Expiry wins over every other gate
        assert_eq!(
            check_link_gates(&facts, false, None, now),
            Err(LinkDenial::Expired)
        );

        facts.expires_at = None;
        assert_eq!(
            check_link_gates(&facts, false, Some("123456"), now),
            Err(LinkDenial::LoginRequired)
        );
        assert_eq!(
            check_link_gates(&facts, true, None, now),
            Err(LinkDenial::CodeRequired)
        );
        assert_eq!(
            check_link_gates(&facts, true, Some("654321"), now),
            Err(LinkDenial::CodeIncorrect)
        );
        assert_eq!(check_link_gates(&facts, true, Some("123456"), now), Ok(()));
    }

    #[test]
    fn test_locked_link_rejects_even_the_right_code() {
        let now = Utc::now();
        let mut facts = link();
        facts.require_code = true;
        facts.access_code = Some("123456");
        facts.locked_until = Some(now + Duration::minutes(10));

        assert_eq!(
            check_link_gates(&facts, false, Some("123456"), now),
            Err(LinkDenial::Locked)
        );

        facts.locked_until = Some(now - Duration::seconds(1));
        assert_eq!(check_link_gates(&facts, false, Some("123456"), now), Ok(()));
    }

    #[test]
    fn test_denials_map_to_status_codes() {
        use axum::http::StatusCode;

        let status = |d: LinkDenial| AppError::from(d).status_code();
        assert_eq!(status(LinkDenial::Expired), StatusCode::FORBIDDEN);
        assert_eq!(status(LinkDenial::LoginRequired), StatusCode::UNAUTHORIZED);
        assert_eq!(status(LinkDenial::Locked), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(LinkDenial::CodeRequired), StatusCode::FORBIDDEN);
        assert_eq!(status(LinkDenial::CodeIncorrect), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"12345", b"123456"));
    }
}
