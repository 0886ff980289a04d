//! Per-request identity

use crate::{ApplicationError, ApplicationResult};
use quill_core::UserId;
use std::fmt;

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityContext {
    /// No session, or a session that failed validation
    #[default]
    Anonymous,
    /// Logged-in user
    Authenticated(UserId),
}

impl IdentityContext {
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    pub fn authenticated<U: Into<UserId>>(user: U) -> Self {
        Self::Authenticated(user.into())
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The logged-in user, or [`ApplicationError::AuthenticationRequired`] for `operation`
    pub fn require_authenticated(&self, operation: &str) -> ApplicationResult<&UserId> {
        self.user_id()
            .ok_or_else(|| ApplicationError::authentication_required(operation))
    }
}

impl From<UserId> for IdentityContext {
    fn from(user: UserId) -> Self {
        Self::Authenticated(user)
    }
}

impl From<Option<UserId>> for IdentityContext {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Self::Anonymous, Self::Authenticated)
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated(user) => write!(f, "user:{}", user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_user() {
        let identity = IdentityContext::default();
        assert!(identity.is_anonymous());
        assert!(identity.user_id().is_none());
        assert!(matches!(
            identity.require_authenticated("create_note"),
            Err(ApplicationError::AuthenticationRequired { operation }) if operation == "create_note"
        ));
    }

    #[test]
    fn authenticated_exposes_user() {
        let identity = IdentityContext::authenticated("alice");
        assert_eq!(identity.user_id(), Some(&UserId::new("alice")));
        assert_eq!(identity.require_authenticated("x").unwrap().as_str(), "alice");
        assert_eq!(identity.to_string(), "user:alice");
    }

    #[test]
    fn converts_from_optional_user() {
        assert!(IdentityContext::from(None).is_anonymous());
        assert!(!IdentityContext::from(Some(UserId::new("bob"))).is_anonymous());
    }
}
