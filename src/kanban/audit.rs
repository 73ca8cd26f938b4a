//! Fire-and-forget audit trail for board operations.
//!
//! Recording never blocks or fails the request that triggered it.

use tracing::{info, warn};

use super::db::DbHandle;
use crate::errors::{BoardError, BoardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Ok,
    Denied,
    Error,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Denied => "denied",
            Self::Error => "error",
        }
    }

    pub fn of<T>(result: &BoardResult<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(BoardError::Forbidden(_))
            | Err(BoardError::NotFound {
                cross_tenant: true, ..
            }) => Self::Denied,
            Err(_) => Self::Error,
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, actor_id: i64, action: &str, outcome: AuditOutcome);
}

/// Writes audit entries to the `audit_log` table from a detached task.
pub struct DbAuditSink {
    db: DbHandle,
}

impl DbAuditSink {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

impl AuditSink for DbAuditSink {
    fn record(&self, actor_id: i64, action: &str, outcome: AuditOutcome) {
        info!(actor_id, action, outcome = outcome.as_str(), "audit");

        let db = self.db.clone();
        let action = action.to_string();
        tokio::spawn(async move {
            let result = db
                .call(move |db| db.write(|s| s.insert_audit(actor_id, &action, outcome.as_str())))
                .await;
            if let Err(e) = result {
                warn!(error = %e, "Failed to write audit entry");
            }
        });
    }
}
