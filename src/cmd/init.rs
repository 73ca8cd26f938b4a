//! Database setup command — `demand-board init`.

use std::time::Duration;

use anyhow::{Context, Result};
use demand_board::config::BoardConfig;
use demand_board::kanban::db::BoardDb;
use demand_board::kanban::server::open_database;
use demand_board::kanban::{directory, ordering};
use demand_common::{Identity, NewCard, Role};

pub fn cmd_init(config: &BoardConfig, demo: bool) -> Result<()> {
    let db_path = &config.server.db_path;
    let db = open_database(
        db_path,
        Duration::from_millis(config.server.busy_timeout_ms),
    )?;
    println!("Board database initialized at {}", db_path.display());

    if demo {
        let admin = seed_demo(&db).context("Failed to seed demo data (already seeded?)")?;
        println!("Demo data created. Send these headers to act as the demo admin:");
        println!("  x-user-id: {}", admin.user_id);
        println!("  x-user-role: {}", admin.role);
        if let Some(company_id) = admin.company_id {
            println!("  x-company-id: {}", company_id);
        }
    }
    Ok(())
}

/// Seed one company with an admin, a sector, a collaborator and a board
/// holding two cards. Returns the admin identity.
fn seed_demo(db: &BoardDb) -> Result<Identity> {
    let (company_id, user_id, collaborator_id, sector_id) = db.write(|s| {
        let company = s.insert_company("Demo Company")?;
        let admin = s.insert_user(Some(company), "Demo Admin", Role::CompanyAdmin)?;
        let sector = s.insert_sector(company, "Operations", Some("Day-to-day running"))?;
        let collab = s.insert_collaborator(
            company,
            "Demo Admin",
            Some(admin),
            Some(sector.id),
            Some("admin@demo.example"),
        )?;
        Ok((company, admin, collab.id, sector.id))
    })?;
    let admin = Identity::new(user_id, Role::CompanyAdmin, Some(company_id));

    let board = directory::create_board(db, &admin, "Demandas", Some("Demo board"))?;
    let columns = db.read(|s| {
        s.list_columns(demand_board::kanban::db::CardScope::Board(board.id))
    })?;
    let backlog = columns
        .first()
        .map(|c| c.id)
        .context("Demo board has no columns")?;

    ordering::create_card(
        db,
        &admin,
        NewCard {
            column_id: Some(backlog),
            title: Some("Review supplier contracts".into()),
            what_to_do: Some("Compare renewal terms".into()),
            responsible_id: Some(collaborator_id),
            sector_id: Some(sector_id),
            severity: Some(4),
            urgency: Some(3),
            trend: Some(3),
            ..Default::default()
        },
    )?;
    ordering::create_card(
        db,
        &admin,
        NewCard {
            column_id: Some(backlog),
            title: Some("Update onboarding guide".into()),
            what_to_do: Some("Add the new VPN steps".into()),
            ..Default::default()
        },
    )?;

    Ok(admin)
}
