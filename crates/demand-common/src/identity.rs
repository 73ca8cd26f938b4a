use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four fixed platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Platform employee (support desk, blog).
    Staff,
    /// Administrator of a client company.
    CompanyAdmin,
    /// Regular member of a client company.
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::CompanyAdmin => "company_admin",
            Self::Client => "client",
        }
    }

    /// Roles allowed to create, reshape and delete boards and cards.
    pub fn manages_boards(&self) -> bool {
        matches!(self, Self::Admin | Self::CompanyAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "company_admin" => Ok(Self::CompanyAdmin),
            "client" => Ok(Self::Client),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// The acting identity for one call, supplied by the surrounding application.
///
/// The board core never authenticates; it only compares `company_id` and
/// `role` against the records it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    /// `None` for platform users that are not attached to any company.
    pub company_id: Option<i64>,
}

impl Identity {
    pub fn new(user_id: i64, role: Role, company_id: Option<i64>) -> Self {
        Self {
            user_id,
            role,
            company_id,
        }
    }

    pub fn belongs_to(&self, company_id: i64) -> bool {
        self.company_id == Some(company_id)
    }
}
