//! Kanban demand board back-end.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │ Upstream │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │   app    │ <─────── │    └─ api.rs  (handlers, Actor extractor)        │
//! └──────────┘  JSON    │         │                                        │
//!                       │         ├─ directory.rs  (boards, roster)        │
//!                       │         ├─ ordering.rs   (card positions)        │
//!                       │         └─ projection.rs (snapshots)             │
//!                       │                 │                                │
//!                       │                 v                                │
//!                       │  db.rs  (BoardDb, Store, DbHandle)               │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module   | Responsibility                                          |
//! |----------|---------------------------------------------------------|
//! | `auth`   | `can_view_board` / `can_manage_board` predicates        |
//! | `audit`  | `AuditSink` trait + `DbAuditSink` (detached writes)     |
//!
//! ## Typical Request Flow (move card)
//!
//! 1. `POST /api/cards/{id}/move` → `api::move_card()`; the `Actor`
//!    extractor builds an `Identity` from the upstream headers.
//! 2. `DbHandle::call` hops to the blocking pool and runs
//!    `ordering::move_card()`.
//! 3. The engine opens one `BEGIN IMMEDIATE` transaction, checks tenant and
//!    role, closes the gap in the source column, opens a slot in the target
//!    column and places the card.
//! 4. The handler reports the outcome to the audit sink and acknowledges
//!    with `{"success": true}`.

pub mod api;
pub mod audit;
pub mod auth;
pub mod db;
pub mod directory;
pub mod ordering;
pub mod projection;
pub mod server;
