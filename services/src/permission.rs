use db::models::{tickets, user};

use crate::error::ServiceError;

/// The identity performing an operation, as resolved by the transport
/// layer. Anonymous actors fail every permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: i64, admin: bool },
}

impl Actor {
    pub fn id(&self) -> Option<i64> {
        match self {
            Actor::Anonymous => None,
            Actor::User { id, .. } => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::User { admin: true, .. })
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Actor::User {
            id: user.id,
            admin: user.admin,
        }
    }
}

/// Decides who may act on a ticket. Admins override the creator-only
/// rule everywhere; deletion is admin-only. The policy only decides, it
/// never renders a response.
pub struct PermissionPolicy;

impl PermissionPolicy {
    pub fn can_view(actor: &Actor, ticket: &tickets::Model) -> bool {
        match actor {
            Actor::Anonymous => false,
            Actor::User { id, admin } => *admin || *id == ticket.user_id,
        }
    }

    pub fn can_reply(actor: &Actor, ticket: &tickets::Model) -> bool {
        Self::can_view(actor, ticket)
    }

    pub fn can_delete(actor: &Actor, _ticket: &tickets::Model) -> bool {
        actor.is_admin()
    }

    pub fn can_moderate(actor: &Actor) -> bool {
        actor.is_admin()
    }

    pub fn require_view(actor: &Actor, ticket: &tickets::Model) -> Result<(), ServiceError> {
        if Self::can_view(actor, ticket) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "not allowed to view ticket {}",
                ticket.id
            )))
        }
    }

    pub fn require_reply(actor: &Actor, ticket: &tickets::Model) -> Result<(), ServiceError> {
        if Self::can_reply(actor, ticket) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "not allowed to reply to ticket {}",
                ticket.id
            )))
        }
    }

    pub fn require_delete(actor: &Actor, ticket: &tickets::Model) -> Result<(), ServiceError> {
        if Self::can_delete(actor, ticket) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "not allowed to delete ticket {}",
                ticket.id
            )))
        }
    }
}
