//! Column/Card Ordering Engine.
//!
//! Cards in a column always occupy positions `0..k` with no gaps or
//! duplicates. Every mutation below runs in one `BEGIN IMMEDIATE`
//! transaction, so renumbering is either fully committed or not at all, and
//! concurrent writers serialize on the store's write lock.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use demand_common::{Card, CardPatch, GutScores, Identity, NewCard};
use tracing::{info, instrument};

use super::auth::{company_of, ensure_can_manage};
use super::db::{BoardDb, CardLocation, Store};
use crate::errors::{BoardError, BoardResult};

/// Naive formats accepted for a due date, tried in order after RFC 3339.
const DUE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a due date given as a full timestamp or a bare `YYYY-MM-DD`.
///
/// Blank input means "no due date". Offsets are normalized to UTC.
pub fn parse_due_date(input: &str) -> BoardResult<Option<NaiveDateTime>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.naive_utc()));
    }
    for format in DUE_DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Some(dt));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| BoardError::validation(format!("unparseable due date '{}'", input)))
}

fn required(value: Option<&str>, field: &str) -> BoardResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BoardError::validation(format!("{} is required", field))),
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_scores(gut: GutScores) -> BoardResult<GutScores> {
    gut.validate().map_err(BoardError::Validation)?;
    Ok(gut)
}

/// Reject collaborator/sector references that resolve outside `company_id`.
fn check_references(
    s: &Store<'_>,
    company_id: i64,
    responsible_id: Option<i64>,
    sector_id: Option<i64>,
) -> BoardResult<()> {
    if let Some(id) = responsible_id {
        if s.collaborator_company(id)? != Some(company_id) {
            return Err(BoardError::validation(format!(
                "responsible {} does not belong to your company",
                id
            )));
        }
    }
    if let Some(id) = sector_id {
        if s.sector_company(id)? != Some(company_id) {
            return Err(BoardError::validation(format!(
                "sector {} does not belong to your company",
                id
            )));
        }
    }
    Ok(())
}

/// Resolve a card for mutation: it must exist, live in the identity's
/// company, and the identity must be allowed to manage boards.
///
/// Unknown and foreign ids fail identically.
fn card_for_update(s: &Store<'_>, identity: &Identity, card_id: i64) -> BoardResult<CardLocation> {
    let location = s
        .locate_card(card_id)?
        .filter(|loc| identity.belongs_to(loc.company_id))
        .ok_or_else(|| BoardError::forbidden(format!("card {} is not accessible", card_id)))?;
    ensure_can_manage(identity, location.company_id)?;
    Ok(location)
}

/// Append a new card to the end of its column.
#[instrument(skip(db, identity, new), fields(user_id = identity.user_id, column_id = ?new.column_id))]
pub fn create_card(db: &BoardDb, identity: &Identity, new: NewCard) -> BoardResult<Card> {
    let company_id = company_of(identity)?;
    ensure_can_manage(identity, company_id)?;

    let title = required(new.title.as_deref(), "title")?;
    let what_to_do = required(new.what_to_do.as_deref(), "what_to_do")?;
    let column_id = new
        .column_id
        .ok_or_else(|| BoardError::validation("column_id is required"))?;
    let gut = check_scores(GutScores {
        severity: new.severity.unwrap_or(demand_common::gut::DEFAULT_SCORE),
        urgency: new.urgency.unwrap_or(demand_common::gut::DEFAULT_SCORE),
        trend: new.trend.unwrap_or(demand_common::gut::DEFAULT_SCORE),
    })?;
    let due_at = match new.due_at.as_deref() {
        Some(raw) => parse_due_date(raw)?,
        None => None,
    };
    let description = optional_text(new.description.as_deref());
    let where_to_do = optional_text(new.where_to_do.as_deref());

    let card = db.write(|s| {
        match s.locate_column(column_id)? {
            Some(loc) if loc.company_id == company_id => {}
            _ => {
                return Err(BoardError::validation(format!(
                    "column {} does not belong to your company",
                    column_id
                )));
            }
        }
        check_references(s, company_id, new.responsible_id, new.sector_id)?;

        let position = s.max_card_position(column_id)?.map_or(0, |max| max + 1);
        s.insert_card(
            column_id,
            &title,
            description.as_deref(),
            gut,
            &what_to_do,
            where_to_do.as_deref(),
            new.responsible_id,
            new.sector_id,
            due_at,
            position,
            identity.user_id,
            Utc::now(),
        )
    })?;

    info!(card_id = card.id, position = card.position, "Card created");
    Ok(card)
}

/// Move a card to `target_position` of `target_column_id` on the same board.
///
/// The card's slot is vacated first (closing the gap in its column), then a
/// slot is opened at the target. `target_position` must lie in `0..=len`,
/// where `len` counts the target column's cards without the moved one.
#[instrument(skip(db, identity), fields(user_id = identity.user_id))]
pub fn move_card(
    db: &BoardDb,
    identity: &Identity,
    card_id: i64,
    target_column_id: i64,
    target_position: i32,
) -> BoardResult<()> {
    company_of(identity)?;

    let source_column = db.write(|s| {
        let CardLocation { card, board_id, .. } = card_for_update(s, identity, card_id)?;

        match s.locate_column(target_column_id)? {
            Some(target) if target.column.board_id == board_id => {}
            _ => {
                return Err(BoardError::validation(format!(
                    "column {} is not on the card's board",
                    target_column_id
                )));
            }
        }

        let same_column = card.column_id == target_column_id;
        let len = s.count_cards(target_column_id)? - i32::from(same_column);
        if !(0..=len).contains(&target_position) {
            return Err(BoardError::validation(format!(
                "position {} is outside 0..={}",
                target_position, len
            )));
        }

        s.shift_cards(card.column_id, card.position + 1, -1, card.id)?;
        s.shift_cards(target_column_id, target_position, 1, card.id)?;
        s.place_card(card.id, target_column_id, target_position, Utc::now())?;
        Ok(card.column_id)
    })?;

    info!(
        card_id,
        from_column = source_column,
        to_column = target_column_id,
        position = target_position,
        "Card moved"
    );
    Ok(())
}

/// Reassign positions in a column from a complete ordering of its cards.
///
/// `card_order` must list every card currently in the column exactly once.
#[instrument(skip(db, identity, card_order), fields(user_id = identity.user_id, cards = card_order.len()))]
pub fn reorder_column(
    db: &BoardDb,
    identity: &Identity,
    column_id: i64,
    card_order: &[i64],
) -> BoardResult<()> {
    company_of(identity)?;

    db.write(|s| {
        let location = s
            .locate_column(column_id)?
            .filter(|loc| identity.belongs_to(loc.company_id))
            .ok_or_else(|| {
                BoardError::forbidden(format!("column {} is not accessible", column_id))
            })?;
        ensure_can_manage(identity, location.company_id)?;

        let current: HashSet<i64> = s.card_ids_in_column(column_id)?.into_iter().collect();
        let mut seen = HashSet::with_capacity(card_order.len());
        for id in card_order {
            if !seen.insert(*id) {
                return Err(BoardError::validation(format!("card {} listed twice", id)));
            }
            if !current.contains(id) {
                return Err(BoardError::validation(format!(
                    "card {} is not in column {}",
                    id, column_id
                )));
            }
        }
        if seen.len() != current.len() {
            return Err(BoardError::validation(format!(
                "card_order lists {} of {} cards in column {}",
                seen.len(),
                current.len(),
                column_id
            )));
        }

        for (index, id) in card_order.iter().enumerate() {
            s.set_card_position(*id, index as i32)?;
        }
        Ok(())
    })?;

    info!(column_id, "Column reordered");
    Ok(())
}

/// Apply a partial edit to a card. Column and position are never touched.
#[instrument(skip(db, identity, patch), fields(user_id = identity.user_id))]
pub fn update_card(
    db: &BoardDb,
    identity: &Identity,
    card_id: i64,
    patch: CardPatch,
) -> BoardResult<Card> {
    company_of(identity)?;

    let due_at = match &patch.due_at {
        Some(Some(raw)) => Some(parse_due_date(raw)?),
        Some(None) => Some(None),
        None => None,
    };

    let card = db.write(|s| {
        let CardLocation {
            mut card,
            company_id,
            ..
        } = card_for_update(s, identity, card_id)?;

        if patch.title.is_some() {
            card.title = required(patch.title.as_deref(), "title")?;
        }
        if patch.what_to_do.is_some() {
            card.what_to_do = required(patch.what_to_do.as_deref(), "what_to_do")?;
        }
        if patch.description.is_some() {
            card.description = optional_text(patch.description.as_deref());
        }
        if patch.where_to_do.is_some() {
            card.where_to_do = optional_text(patch.where_to_do.as_deref());
        }
        if let Some(responsible_id) = patch.responsible_id {
            card.responsible_id = responsible_id;
        }
        if let Some(sector_id) = patch.sector_id {
            card.sector_id = sector_id;
        }
        if let Some(due_at) = due_at {
            card.due_at = due_at;
        }
        card.gut = check_scores(GutScores {
            severity: patch.severity.unwrap_or(card.gut.severity),
            urgency: patch.urgency.unwrap_or(card.gut.urgency),
            trend: patch.trend.unwrap_or(card.gut.trend),
        })?;
        check_references(s, company_id, card.responsible_id, card.sector_id)?;

        s.save_card_fields(&card, Utc::now())?;
        s.get_card(card_id)?
            .ok_or_else(|| BoardError::not_found("Card", card_id))
    })?;

    info!(card_id, "Card updated");
    Ok(card)
}

/// Remove a card and close the gap it leaves in its column.
#[instrument(skip(db, identity), fields(user_id = identity.user_id))]
pub fn delete_card(db: &BoardDb, identity: &Identity, card_id: i64) -> BoardResult<()> {
    company_of(identity)?;

    db.write(|s| {
        let CardLocation { card, .. } = card_for_update(s, identity, card_id)?;
        s.delete_card(card.id)?;
        s.shift_cards(card.column_id, card.position + 1, -1, card.id)?;
        Ok(())
    })?;

    info!(card_id, "Card deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban::db::CardScope;
    use crate::kanban::directory::create_board;
    use demand_common::{Column, Role};

    struct Fixture {
        db: BoardDb,
        admin: Identity,
        columns: Vec<Column>,
    }

    fn fixture() -> BoardResult<Fixture> {
        let db = BoardDb::new_in_memory()?;
        let (company, user) = db.write(|s| {
            let company = s.insert_company("Acme")?;
            let user = s.insert_user(Some(company), "Ana", Role::CompanyAdmin)?;
            Ok((company, user))
        })?;
        let admin = Identity::new(user, Role::CompanyAdmin, Some(company));
        let board = create_board(&db, &admin, "Ops", None)?;
        let columns = db.read(|s| s.list_columns(CardScope::Board(board.id)))?;
        Ok(Fixture { db, admin, columns })
    }

    fn new_card(column_id: i64, title: &str) -> NewCard {
        NewCard {
            column_id: Some(column_id),
            title: Some(title.to_string()),
            what_to_do: Some("handle it".to_string()),
            ..Default::default()
        }
    }

    fn add(f: &Fixture, column: usize, titles: &[&str]) -> BoardResult<Vec<i64>> {
        titles
            .iter()
            .map(|t| Ok(create_card(&f.db, &f.admin, new_card(f.columns[column].id, t))?.id))
            .collect()
    }

    /// Card ids of a column in position order, asserting the positions are dense.
    fn order(f: &Fixture, column: usize) -> BoardResult<Vec<i64>> {
        let column_id = f.columns[column].id;
        let ids = f.db.read(|s| s.card_ids_in_column(column_id))?;
        for (i, id) in ids.iter().enumerate() {
            let card = f.db.read(|s| s.get_card(*id))?.expect("card exists");
            assert_eq!(card.position, i as i32, "column {} is not dense", column_id);
        }
        Ok(ids)
    }

    #[test]
    fn test_parse_due_date_forms() -> BoardResult<()> {
        let date = |s: &str| parse_due_date(s).map(|d| d.map(|d| d.to_string()));
        assert_eq!(date("2025-03-01")?.as_deref(), Some("2025-03-01 00:00:00"));
        assert_eq!(date("2025-03-01T14:30:00")?.as_deref(), Some("2025-03-01 14:30:00"));
        assert_eq!(date("2025-03-01T14:30")?.as_deref(), Some("2025-03-01 14:30:00"));
        assert_eq!(date("2025-03-01 14:30:15.5")?.as_deref(), Some("2025-03-01 14:30:15.500"));
        assert_eq!(date("2025-03-01T14:30:00-03:00")?.as_deref(), Some("2025-03-01 17:30:00"));
        assert_eq!(date("   ")?, None);
        assert!(matches!(parse_due_date("next tuesday"), Err(BoardError::Validation(_))));
        assert!(matches!(parse_due_date("2025-13-01"), Err(BoardError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_create_card_appends() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C"])?;
        assert_eq!(order(&f, 0)?, ids);

        let card = f.db.read(|s| s.get_card(ids[0]))?.expect("card exists");
        assert_eq!(card.gut, GutScores::default());
        assert_eq!(card.created_by, f.admin.user_id);
        Ok(())
    }

    #[test]
    fn test_create_card_requires_fields() -> BoardResult<()> {
        let f = fixture()?;
        let column_id = f.columns[0].id;

        let mut missing_title = new_card(column_id, "x");
        missing_title.title = Some("  ".into());
        let mut missing_what = new_card(column_id, "x");
        missing_what.what_to_do = None;
        let mut missing_column = new_card(column_id, "x");
        missing_column.column_id = None;
        let mut bad_score = new_card(column_id, "x");
        bad_score.trend = Some(9);
        let mut bad_date = new_card(column_id, "x");
        bad_date.due_at = Some("soon".into());

        for bad in [missing_title, missing_what, missing_column, bad_score, bad_date] {
            assert!(matches!(
                create_card(&f.db, &f.admin, bad),
                Err(BoardError::Validation(_))
            ));
        }
        assert!(order(&f, 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_card_rejects_foreign_references() -> BoardResult<()> {
        let f = fixture()?;
        let (foreign_collab, foreign_sector) = f.db.write(|s| {
            let other = s.insert_company("Globex")?;
            let sector = s.insert_sector(other, "Legal", None)?;
            let collab = s.insert_collaborator(other, "Eve", None, None, None)?;
            Ok((collab.id, sector.id))
        })?;

        let mut with_collab = new_card(f.columns[0].id, "x");
        with_collab.responsible_id = Some(foreign_collab);
        let mut with_sector = new_card(f.columns[0].id, "x");
        with_sector.sector_id = Some(foreign_sector);
        let unknown_column = new_card(424242, "x");

        for bad in [with_collab, with_sector, unknown_column] {
            assert!(matches!(
                create_card(&f.db, &f.admin, bad),
                Err(BoardError::Validation(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_create_card_forbidden_for_client() -> BoardResult<()> {
        let f = fixture()?;
        let client = Identity::new(f.admin.user_id, Role::Client, f.admin.company_id);
        assert!(matches!(
            create_card(&f.db, &client, new_card(f.columns[0].id, "x")),
            Err(BoardError::Forbidden(_))
        ));
        Ok(())
    }

    #[test]
    fn test_move_to_other_column() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C"])?;
        let existing = add(&f, 1, &["X", "Y"])?;

        move_card(&f.db, &f.admin, ids[1], f.columns[1].id, 1)?;

        assert_eq!(order(&f, 0)?, vec![ids[0], ids[2]]);
        assert_eq!(order(&f, 1)?, vec![existing[0], ids[1], existing[1]]);
        Ok(())
    }

    #[test]
    fn test_move_within_column_down_and_up() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C", "D"])?;

        move_card(&f.db, &f.admin, ids[0], f.columns[0].id, 3)?;
        assert_eq!(order(&f, 0)?, vec![ids[1], ids[2], ids[3], ids[0]]);

        move_card(&f.db, &f.admin, ids[3], f.columns[0].id, 0)?;
        assert_eq!(order(&f, 0)?, vec![ids[3], ids[1], ids[2], ids[0]]);

        move_card(&f.db, &f.admin, ids[2], f.columns[0].id, 2)?;
        assert_eq!(order(&f, 0)?, vec![ids[3], ids[1], ids[2], ids[0]]);
        Ok(())
    }

    #[test]
    fn test_move_rejects_out_of_range_position() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B"])?;

        // Same column: len excludes the moved card, so 1 is the last slot.
        assert!(matches!(
            move_card(&f.db, &f.admin, ids[0], f.columns[0].id, 2),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            move_card(&f.db, &f.admin, ids[0], f.columns[1].id, 1),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            move_card(&f.db, &f.admin, ids[0], f.columns[1].id, -1),
            Err(BoardError::Validation(_))
        ));
        // Appending to an empty column is position 0.
        move_card(&f.db, &f.admin, ids[0], f.columns[1].id, 0)?;
        assert_eq!(order(&f, 0)?, vec![ids[1]]);
        Ok(())
    }

    #[test]
    fn test_create_card_for_identity_without_user_row() -> BoardResult<()> {
        let f = fixture()?;
        let upstream = Identity::new(500, Role::CompanyAdmin, f.admin.company_id);

        let card = create_card(&f.db, &upstream, new_card(f.columns[0].id, "Remote"))?;
        assert_eq!(card.created_by, 500);
        assert_eq!(card.position, 0);
        Ok(())
    }

    #[test]
    fn test_move_across_boards_is_rejected() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A"])?;
        let other = create_board(&f.db, &f.admin, "Other", None)?;
        let other_column = f.db.read(|s| s.list_columns(CardScope::Board(other.id)))?[0].id;

        assert!(matches!(
            move_card(&f.db, &f.admin, ids[0], other_column, 0),
            Err(BoardError::Validation(_))
        ));
        assert_eq!(order(&f, 0)?, ids);
        Ok(())
    }

    #[test]
    fn test_move_cross_tenant_is_forbidden() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A"])?;
        let outsider = Identity::new(77, Role::CompanyAdmin, Some(9999));

        let foreign = match move_card(&f.db, &outsider, ids[0], f.columns[1].id, 0) {
            Err(BoardError::Forbidden(msg)) => msg.replace(&ids[0].to_string(), "{id}"),
            other => panic!("Expected Forbidden, got {:?}", other),
        };
        let unknown = match move_card(&f.db, &outsider, 424242, f.columns[1].id, 0) {
            Err(BoardError::Forbidden(msg)) => msg.replace("424242", "{id}"),
            other => panic!("Expected Forbidden, got {:?}", other),
        };
        assert_eq!(foreign, unknown);
        assert_eq!(order(&f, 0)?, ids);
        Ok(())
    }

    #[test]
    fn test_reorder_column() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C", "D"])?;
        let wanted = vec![ids[3], ids[1], ids[0], ids[2]];

        reorder_column(&f.db, &f.admin, f.columns[0].id, &wanted)?;
        assert_eq!(order(&f, 0)?, wanted);

        reorder_column(&f.db, &f.admin, f.columns[0].id, &wanted)?;
        assert_eq!(order(&f, 0)?, wanted);
        Ok(())
    }

    #[test]
    fn test_reorder_requires_exact_membership() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C"])?;
        let elsewhere = add(&f, 1, &["X"])?;
        let column_id = f.columns[0].id;

        for bad in [
            vec![ids[2], ids[1]],
            vec![ids[2], ids[1], ids[1]],
            vec![ids[2], ids[1], ids[0], elsewhere[0]],
            vec![ids[2], ids[1], 424242],
        ] {
            assert!(matches!(
                reorder_column(&f.db, &f.admin, column_id, &bad),
                Err(BoardError::Validation(_))
            ));
        }
        assert_eq!(order(&f, 0)?, ids);
        Ok(())
    }

    #[test]
    fn test_reorder_cross_tenant_is_forbidden() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B"])?;
        let outsider = Identity::new(77, Role::CompanyAdmin, Some(9999));

        assert!(matches!(
            reorder_column(&f.db, &outsider, f.columns[0].id, &[ids[1], ids[0]]),
            Err(BoardError::Forbidden(_))
        ));
        assert!(matches!(
            reorder_column(&f.db, &f.admin, 424242, &[]),
            Err(BoardError::Forbidden(_))
        ));
        assert_eq!(order(&f, 0)?, ids);
        Ok(())
    }

    #[test]
    fn test_update_card_patch_semantics() -> BoardResult<()> {
        let f = fixture()?;
        let company = f.admin.company_id.unwrap_or_default();
        let collab = f
            .db
            .write(|s| s.insert_collaborator(company, "Bruno", None, None, None))?;

        let mut new = new_card(f.columns[0].id, "Draft");
        new.responsible_id = Some(collab.id);
        new.due_at = Some("2025-06-30".into());
        let card = create_card(&f.db, &f.admin, new)?;

        let patch: CardPatch =
            serde_json::from_str(r#"{"title": "Final", "severity": 5, "due_at": null}"#)
                .expect("valid patch");
        let updated = update_card(&f.db, &f.admin, card.id, patch)?;
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.gut, GutScores::new(5, 3, 3));
        assert_eq!(updated.due_at, None);
        assert_eq!(updated.responsible_id, Some(collab.id));
        assert_eq!(updated.position, card.position);

        let clear: CardPatch =
            serde_json::from_str(r#"{"responsible_id": null}"#).expect("valid patch");
        let cleared = update_card(&f.db, &f.admin, card.id, clear)?;
        assert_eq!(cleared.responsible_id, None);
        assert_eq!(cleared.title, "Final");
        Ok(())
    }

    #[test]
    fn test_update_card_validation_leaves_card_untouched() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A"])?;
        let patch = CardPatch {
            title: Some("B".into()),
            urgency: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            update_card(&f.db, &f.admin, ids[0], patch),
            Err(BoardError::Validation(_))
        ));
        let card = f.db.read(|s| s.get_card(ids[0]))?.expect("card exists");
        assert_eq!(card.title, "A");
        Ok(())
    }

    #[test]
    fn test_delete_card_closes_gap() -> BoardResult<()> {
        let f = fixture()?;
        let ids = add(&f, 0, &["A", "B", "C"])?;

        delete_card(&f.db, &f.admin, ids[0])?;
        assert_eq!(order(&f, 0)?, vec![ids[1], ids[2]]);

        assert!(matches!(
            delete_card(&f.db, &f.admin, ids[0]),
            Err(BoardError::Forbidden(_))
        ));
        let new = add(&f, 0, &["D"])?;
        assert_eq!(order(&f, 0)?, vec![ids[1], ids[2], new[0]]);
        Ok(())
    }
}
