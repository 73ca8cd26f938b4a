use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::gut::{GutScores, GutTier};

/// Columns every new board is seeded with, in position order: `(name, color)`.
pub const DEFAULT_COLUMNS: [(&str, &str); 4] = [
    ("Backlog", "#6b7280"),
    ("To Do", "#3b82f6"),
    ("Doing", "#f59e0b"),
    ("Done", "#10b981"),
];

// ── Persisted records ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub position: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: i64,
    pub column_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub gut: GutScores,
    pub what_to_do: String,
    pub where_to_do: Option<String>,
    pub responsible_id: Option<i64>,
    pub sector_id: Option<i64>,
    pub due_at: Option<NaiveDateTime>,
    pub position: i32,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sector {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// An operational-roster person. May or may not have a login (`user_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collaborator {
    pub id: i64,
    pub company_id: i64,
    pub user_id: Option<i64>,
    pub sector_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
}

// ── Request payloads ──────────────────────────────────────────────────

/// Fields for a new card. Required fields are optional here so that a
/// missing value surfaces as a validation failure rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCard {
    pub column_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub what_to_do: Option<String>,
    pub where_to_do: Option<String>,
    pub responsible_id: Option<i64>,
    pub sector_id: Option<i64>,
    pub severity: Option<i32>,
    pub urgency: Option<i32>,
    pub trend: Option<i32>,
    /// Full timestamp or date-only string.
    pub due_at: Option<String>,
}

/// Partial card update. For the nullable references, an explicit `null`
/// clears the value while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub what_to_do: Option<String>,
    pub where_to_do: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub responsible_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub sector_id: Option<Option<i64>>,
    pub severity: Option<i32>,
    pub urgency: Option<i32>,
    pub trend: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub due_at: Option<Option<String>>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub column_id: i64,
    /// Top of the target column when omitted.
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub card_order: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
    pub description: Option<String>,
}

// ── Snapshot views ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponsibleRef {
    pub id: i64,
    pub name: String,
    /// Linked login account; only reported in the personal view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Why a card shows up in someone's personal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Involvement {
    Responsible,
    Creator,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub what_to_do: String,
    pub where_to_do: Option<String>,
    pub due_at: Option<NaiveDateTime>,
    pub severity: i32,
    pub urgency: i32,
    pub trend: i32,
    pub gut_score: i32,
    pub gut_tier: GutTier,
    pub position: i32,
    pub responsible: Option<ResponsibleRef>,
    pub sector: Option<NamedRef>,
    pub creator: NamedRef,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involvement: Option<Involvement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnView {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub position: i32,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub columns: Vec<ColumnView>,
}

/// People and sectors a card can reference, for the card form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Roster {
    pub collaborators: Vec<NamedRef>,
    pub sectors: Vec<NamedRef>,
}
