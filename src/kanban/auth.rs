//! Authorization predicates shared by every board entry point.
//!
//! The acting identity is passed in explicitly; nothing here looks up a
//! "current user".

use demand_common::Identity;

use crate::errors::{BoardError, BoardResult};

/// The identity belongs to the company that owns the record.
pub fn can_view_board(identity: &Identity, company_id: i64) -> bool {
    identity.belongs_to(company_id)
}

/// The identity may create, reshape and delete boards and cards of the company.
pub fn can_manage_board(identity: &Identity, company_id: i64) -> bool {
    can_view_board(identity, company_id) && identity.role.manages_boards()
}

pub fn ensure_can_view(identity: &Identity, company_id: i64) -> BoardResult<()> {
    if can_view_board(identity, company_id) {
        Ok(())
    } else {
        Err(BoardError::forbidden("board belongs to another company"))
    }
}

pub fn ensure_can_manage(identity: &Identity, company_id: i64) -> BoardResult<()> {
    ensure_can_view(identity, company_id)?;
    if can_manage_board(identity, company_id) {
        Ok(())
    } else {
        Err(BoardError::forbidden(format!(
            "role '{}' cannot manage boards",
            identity.role
        )))
    }
}

/// The company the identity acts for. Platform users without one have no board access.
pub fn company_of(identity: &Identity) -> BoardResult<i64> {
    identity
        .company_id
        .ok_or_else(|| BoardError::forbidden("identity is not attached to a company"))
}
