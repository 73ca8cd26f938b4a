//! Board Directory: list, create and delete a company's boards.

use chrono::Utc;
use demand_common::{Board, DEFAULT_COLUMNS, Identity, Roster};
use tracing::{info, instrument};

use super::auth::{company_of, ensure_can_manage};
use super::db::BoardDb;
use crate::errors::{BoardError, BoardResult};

/// Create a board for the identity's company, seeded with the four default columns.
#[instrument(skip(db, identity, description), fields(user_id = identity.user_id))]
pub fn create_board(
    db: &BoardDb,
    identity: &Identity,
    name: &str,
    description: Option<&str>,
) -> BoardResult<Board> {
    let company_id = company_of(identity)?;
    ensure_can_manage(identity, company_id)?;

    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::validation("board name is required"));
    }
    let description = description.map(str::trim).filter(|d| !d.is_empty());

    let board = db.write(|s| {
        let now = Utc::now();
        let board = s.insert_board(company_id, name, description, now)?;
        for (position, (column_name, color)) in DEFAULT_COLUMNS.iter().enumerate() {
            s.insert_column(board.id, column_name, position as i32, color, now)?;
        }
        Ok(board)
    })?;

    info!(board_id = board.id, company_id, "Board created");
    Ok(board)
}

/// Delete a board with all of its columns and cards.
///
/// A board of another company reads as absent.
#[instrument(skip(db, identity), fields(user_id = identity.user_id))]
pub fn delete_board(db: &BoardDb, identity: &Identity, board_id: i64) -> BoardResult<()> {
    let company_id = company_of(identity)?;

    let (cards, columns) = db.write(|s| {
        s.require_board(board_id, company_id)?;
        ensure_can_manage(identity, company_id)?;
        s.delete_board_tree(board_id)
    })?;

    info!(board_id, cards, columns, "Board deleted");
    Ok(())
}

pub fn list_boards(db: &BoardDb, identity: &Identity) -> BoardResult<Vec<Board>> {
    let company_id = company_of(identity)?;
    db.read(|s| s.list_boards(company_id))
}

/// Collaborators and sectors a card of the identity's company may reference.
pub fn list_roster(db: &BoardDb, identity: &Identity) -> BoardResult<Roster> {
    let company_id = company_of(identity)?;
    db.read(|s| {
        Ok(Roster {
            collaborators: s.list_collaborator_refs(company_id)?,
            sectors: s.list_sector_refs(company_id)?,
        })
    })
}
