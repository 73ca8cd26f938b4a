//! Board Projection: render boards as client snapshots.
//!
//! Both projections fetch in three batched queries (boards, columns, cards
//! with joined names) and assemble in memory; nothing walks relations one
//! row at a time.

use std::collections::{BTreeMap, HashMap};

use demand_common::{Board, BoardView, CardView, Column, ColumnView, Identity, Involvement};
use tracing::{debug, instrument};

use super::auth::{company_of, ensure_can_view};
use super::db::{BoardDb, CardRow, CardScope};
use crate::config::BoardSection;
use crate::errors::{BoardError, BoardResult};

/// Display labels for column names. Names without a label pass through.
#[derive(Debug, Clone)]
pub struct ColumnLabels {
    labels: BTreeMap<String, String>,
}

impl ColumnLabels {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    pub fn display(&self, name: &str) -> String {
        self.labels
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self::new(BoardSection::default().column_labels)
    }
}

/// Full snapshot of one board of the identity's company.
#[instrument(skip(db, identity, labels), fields(user_id = identity.user_id))]
pub fn project_board(
    db: &BoardDb,
    identity: &Identity,
    board_id: i64,
    labels: &ColumnLabels,
) -> BoardResult<BoardView> {
    let company_id = company_of(identity)?;
    ensure_can_view(identity, company_id)?;

    let (board, columns, rows) = db.read(|s| {
        let board = s.require_board(board_id, company_id)?;
        let columns = s.list_columns(CardScope::Board(board_id))?;
        let rows = s.card_rows(CardScope::Board(board_id))?;
        Ok((board, columns, rows))
    })?;

    let cards = rows
        .into_iter()
        .map(|row| (row.card.column_id, row.into_view()))
        .collect();
    let mut views = assemble(vec![board], columns, cards, labels, false);
    debug!(board_id, "Board projected");
    views
        .pop()
        .ok_or_else(|| BoardError::not_found("Board", board_id))
}

/// Every board of the identity's company, reduced to the cards the user
/// created or is responsible for. Empty columns and boards are dropped.
#[instrument(skip(db, identity, labels), fields(user_id = identity.user_id))]
pub fn project_personal_view(
    db: &BoardDb,
    identity: &Identity,
    labels: &ColumnLabels,
) -> BoardResult<Vec<BoardView>> {
    let company_id = company_of(identity)?;
    let user_id = identity.user_id;

    let (boards, columns, rows) = db.read(|s| {
        Ok((
            s.list_boards(company_id)?,
            s.list_columns(CardScope::Company(company_id))?,
            s.card_rows(CardScope::Company(company_id))?,
        ))
    })?;

    let cards = rows
        .into_iter()
        .filter_map(|row| personal_card(row, user_id))
        .collect();
    let views = assemble(boards, columns, cards, labels, true);
    debug!(boards = views.len(), "Personal view projected");
    Ok(views)
}

/// Keep a card for `user_id`'s personal view, tagging why it is there.
fn personal_card(row: CardRow, user_id: i64) -> Option<(i64, CardView)> {
    let involvement = if row.responsible_user_id == Some(user_id) {
        Involvement::Responsible
    } else if row.card.created_by == user_id {
        Involvement::Creator
    } else {
        return None;
    };

    let column_id = row.card.column_id;
    let responsible_user_id = row.responsible_user_id;
    let mut view = row.into_view();
    if let Some(responsible) = view.responsible.as_mut() {
        responsible.user_id = responsible_user_id;
    }
    view.column_id = Some(column_id);
    view.involvement = Some(involvement);
    Some((column_id, view))
}

/// Nest cards under columns and columns under boards.
///
/// Inputs arrive in position order from the store and that order is kept.
fn assemble(
    boards: Vec<Board>,
    columns: Vec<Column>,
    cards: Vec<(i64, CardView)>,
    labels: &ColumnLabels,
    prune_empty: bool,
) -> Vec<BoardView> {
    let mut cards_by_column: HashMap<i64, Vec<CardView>> = HashMap::new();
    for (column_id, card) in cards {
        cards_by_column.entry(column_id).or_default().push(card);
    }

    let mut columns_by_board: HashMap<i64, Vec<ColumnView>> = HashMap::new();
    for column in columns {
        let cards = cards_by_column.remove(&column.id).unwrap_or_default();
        if prune_empty && cards.is_empty() {
            continue;
        }
        columns_by_board
            .entry(column.board_id)
            .or_default()
            .push(ColumnView {
                id: column.id,
                name: labels.display(&column.name),
                color: column.color,
                position: column.position,
                cards,
            });
    }

    boards
        .into_iter()
        .filter_map(|board| {
            let columns = columns_by_board.remove(&board.id).unwrap_or_default();
            if prune_empty && columns.is_empty() {
                return None;
            }
            Some(BoardView {
                id: board.id,
                name: board.name,
                description: board.description,
                columns,
            })
        })
        .collect()
}
