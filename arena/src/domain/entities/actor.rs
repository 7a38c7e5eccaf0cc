//! Acting user identity
//!
//! Handed in by the calling layer and trusted as-is.

use serde::Serialize;

use super::member::MemberId;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// Member profile of the acting user, if they have one
    pub member_id: Option<MemberId>,
    /// Whether the acting user may run operator-only mutations
    pub is_privileged: bool,
}

impl Actor {
    /// A privileged operator without a member profile
    pub fn operator() -> Self {
        Self {
            member_id: None,
            is_privileged: true,
        }
    }

    /// A regular member
    pub fn member(member_id: MemberId) -> Self {
        Self {
            member_id: Some(member_id),
            is_privileged: false,
        }
    }

    pub fn require_privileged(&self, action: &str) -> Result<(), DomainError> {
        if self.is_privileged {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!("Only admin can {}.", action)))
        }
    }

    pub fn require_member(&self) -> Result<MemberId, DomainError> {
        self.member_id
            .ok_or_else(|| DomainError::Forbidden("Member profile not found.".to_string()))
    }
}
