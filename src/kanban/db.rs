use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use demand_common::{
    Board, Card, CardView, Collaborator, Column, GutScores, NamedRef, ResponsibleRef, Role,
    Sector,
};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};

use crate::errors::{BoardError, BoardResult};

/// Async-safe handle to the board database.
///
/// Wraps `BoardDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, keeping synchronous SQLite
/// I/O off the async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardDb>>,
}

impl DbHandle {
    pub fn new(db: BoardDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> BoardResult<R>
    where
        F: FnOnce(&BoardDb) -> BoardResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|_| BoardError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| BoardError::TaskFailed(e.to_string()))?
    }
}

pub struct BoardDb {
    conn: Connection,
}

impl BoardDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path, busy_timeout: Duration) -> BoardResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> BoardResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> BoardResult<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.run_migrations()
    }

    fn run_migrations(&self) -> BoardResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER REFERENCES companies(id),
                name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'client',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS sectors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL REFERENCES companies(id),
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS collaborators (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL REFERENCES companies(id),
                user_id INTEGER REFERENCES users(id),
                sector_id INTEGER REFERENCES sectors(id),
                name TEXT NOT NULL,
                email TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS boards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL REFERENCES companies(id),
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS board_columns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                board_id INTEGER NOT NULL REFERENCES boards(id),
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                color TEXT NOT NULL DEFAULT '#6b7280',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                column_id INTEGER NOT NULL REFERENCES board_columns(id),
                title TEXT NOT NULL,
                description TEXT,
                severity INTEGER NOT NULL DEFAULT 3,
                urgency INTEGER NOT NULL DEFAULT 3,
                trend INTEGER NOT NULL DEFAULT 3,
                what_to_do TEXT NOT NULL,
                where_to_do TEXT,
                responsible_id INTEGER REFERENCES collaborators(id),
                sector_id INTEGER REFERENCES sectors(id),
                due_at TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                -- upstream user id; a local users row is optional
                created_by INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                actor_id INTEGER,
                action TEXT NOT NULL,
                outcome TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_boards_company ON boards(company_id);
            CREATE INDEX IF NOT EXISTS idx_columns_board ON board_columns(board_id, position);
            CREATE INDEX IF NOT EXISTS idx_cards_column ON cards(column_id, position);
            CREATE INDEX IF NOT EXISTS idx_cards_created_by ON cards(created_by);
            CREATE INDEX IF NOT EXISTS idx_cards_responsible ON cards(responsible_id);
            CREATE INDEX IF NOT EXISTS idx_collaborators_company ON collaborators(company_id);
            CREATE INDEX IF NOT EXISTS idx_sectors_company ON sectors(company_id);
            ",
        )?;
        Ok(())
    }

    /// Run `f` inside one write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes SQLite's write lock up front, so the
    /// read-modify-write renumbering in `f` serializes against every other
    /// writer. Returning `Err` from `f` drops the transaction, rolling back.
    pub fn write<F, R>(&self, f: F) -> BoardResult<R>
    where
        F: FnOnce(&Store<'_>) -> BoardResult<R>,
    {
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let out = f(&Store { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }

    /// Run `f` against a consistent read snapshot.
    pub fn read<F, R>(&self, f: F) -> BoardResult<R>
    where
        F: FnOnce(&Store<'_>) -> BoardResult<R>,
    {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Deferred)?;
        let out = f(&Store { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }
}

/// Scoped queries against an open transaction.
pub struct Store<'c> {
    conn: &'c Connection,
}

/// A card together with the board and company it lives under.
#[derive(Debug, Clone)]
pub struct CardLocation {
    pub card: Card,
    pub board_id: i64,
    pub company_id: i64,
}

/// A column together with the company that owns its board.
#[derive(Debug, Clone)]
pub struct ColumnLocation {
    pub column: Column,
    pub company_id: i64,
}

/// Which cards a projection query should fetch.
#[derive(Debug, Clone, Copy)]
pub enum CardScope {
    Board(i64),
    Company(i64),
}

const CARD_FIELDS: &str = "c.id, c.column_id, c.title, c.description, c.severity, c.urgency, c.trend,
     c.what_to_do, c.where_to_do, c.responsible_id, c.sector_id, c.due_at, c.position,
     c.created_by, c.created_at, c.updated_at";

const COLUMN_FIELDS: &str = "col.id, col.board_id, col.name, col.position, col.color, col.created_at";

impl Store<'_> {
    // ── Roster seeding ────────────────────────────────────────────────

    pub fn insert_company(&self, name: &str) -> BoardResult<i64> {
        self.conn
            .execute("INSERT INTO companies (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_user(&self, company_id: Option<i64>, name: &str, role: Role) -> BoardResult<i64> {
        self.conn.execute(
            "INSERT INTO users (company_id, name, role) VALUES (?1, ?2, ?3)",
            params![company_id, name, role.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_sector(
        &self,
        company_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> BoardResult<Sector> {
        self.conn.execute(
            "INSERT INTO sectors (company_id, name, description) VALUES (?1, ?2, ?3)",
            params![company_id, name, description],
        )?;
        Ok(Sector {
            id: self.conn.last_insert_rowid(),
            company_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    pub fn insert_collaborator(
        &self,
        company_id: i64,
        name: &str,
        user_id: Option<i64>,
        sector_id: Option<i64>,
        email: Option<&str>,
    ) -> BoardResult<Collaborator> {
        self.conn.execute(
            "INSERT INTO collaborators (company_id, user_id, sector_id, name, email)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![company_id, user_id, sector_id, name, email],
        )?;
        Ok(Collaborator {
            id: self.conn.last_insert_rowid(),
            company_id,
            user_id,
            sector_id,
            name: name.to_string(),
            email: email.map(str::to_string),
        })
    }

    pub fn collaborator_company(&self, collaborator_id: i64) -> BoardResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT company_id FROM collaborators WHERE id = ?1",
                params![collaborator_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn sector_company(&self, sector_id: i64) -> BoardResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT company_id FROM sectors WHERE id = ?1",
                params![sector_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn list_collaborator_refs(&self, company_id: i64) -> BoardResult<Vec<NamedRef>> {
        self.named_refs(
            "SELECT id, name FROM collaborators WHERE company_id = ?1 ORDER BY name, id",
            company_id,
        )
    }

    pub fn list_sector_refs(&self, company_id: i64) -> BoardResult<Vec<NamedRef>> {
        self.named_refs(
            "SELECT id, name FROM sectors WHERE company_id = ?1 ORDER BY name, id",
            company_id,
        )
    }

    fn named_refs(&self, sql: &str, company_id: i64) -> BoardResult<Vec<NamedRef>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![company_id], |row| {
            Ok(NamedRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let mut refs = Vec::new();
        for row in rows {
            refs.push(row?);
        }
        Ok(refs)
    }

    // ── Boards ────────────────────────────────────────────────────────

    pub fn insert_board(
        &self,
        company_id: i64,
        name: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> BoardResult<Board> {
        self.conn.execute(
            "INSERT INTO boards (company_id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![company_id, name, description, now],
        )?;
        Ok(Board {
            id: self.conn.last_insert_rowid(),
            company_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
        })
    }

    /// Look a board up inside one company; boards of other companies read as absent.
    pub fn get_board(&self, board_id: i64, company_id: i64) -> BoardResult<Option<Board>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, company_id, name, description, created_at
                 FROM boards WHERE id = ?1 AND company_id = ?2",
                params![board_id, company_id],
                map_board,
            )
            .optional()?)
    }

    /// Load a board of `company_id`. A board owned by another company reads
    /// as absent, flagged as cross-tenant for the audit trail.
    pub fn require_board(&self, board_id: i64, company_id: i64) -> BoardResult<Board> {
        if let Some(board) = self.get_board(board_id, company_id)? {
            return Ok(board);
        }
        let exists = self
            .conn
            .query_row("SELECT 1 FROM boards WHERE id = ?1", params![board_id], |_| Ok(()))
            .optional()?
            .is_some();
        Err(if exists {
            BoardError::not_found_cross_tenant("Board", board_id)
        } else {
            BoardError::not_found("Board", board_id)
        })
    }

    pub fn list_boards(&self, company_id: i64) -> BoardResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_id, name, description, created_at
             FROM boards WHERE company_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![company_id], map_board)?;
        let mut boards = Vec::new();
        for row in rows {
            boards.push(row?);
        }
        Ok(boards)
    }

    /// Delete a board and everything under it, children first.
    /// Returns `(cards_deleted, columns_deleted)`.
    pub fn delete_board_tree(&self, board_id: i64) -> BoardResult<(usize, usize)> {
        let cards = self.conn.execute(
            "DELETE FROM cards WHERE column_id IN (SELECT id FROM board_columns WHERE board_id = ?1)",
            params![board_id],
        )?;
        let columns = self
            .conn
            .execute("DELETE FROM board_columns WHERE board_id = ?1", params![board_id])?;
        self.conn
            .execute("DELETE FROM boards WHERE id = ?1", params![board_id])?;
        Ok((cards, columns))
    }

    // ── Columns ───────────────────────────────────────────────────────

    pub fn insert_column(
        &self,
        board_id: i64,
        name: &str,
        position: i32,
        color: &str,
        now: DateTime<Utc>,
    ) -> BoardResult<Column> {
        self.conn.execute(
            "INSERT INTO board_columns (board_id, name, position, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![board_id, name, position, color, now],
        )?;
        Ok(Column {
            id: self.conn.last_insert_rowid(),
            board_id,
            name: name.to_string(),
            position,
            color: color.to_string(),
            created_at: now,
        })
    }

    pub fn locate_column(&self, column_id: i64) -> BoardResult<Option<ColumnLocation>> {
        let sql = format!(
            "SELECT {COLUMN_FIELDS}, b.company_id
             FROM board_columns col JOIN boards b ON b.id = col.board_id
             WHERE col.id = ?1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![column_id], |row| {
                Ok(ColumnLocation {
                    column: map_column(row)?,
                    company_id: row.get(6)?,
                })
            })
            .optional()?)
    }

    /// Columns in position order, for one board or every board of a company.
    pub fn list_columns(&self, scope: CardScope) -> BoardResult<Vec<Column>> {
        let (filter, id) = match scope {
            CardScope::Board(id) => ("col.board_id = ?1", id),
            CardScope::Company(id) => ("b.company_id = ?1", id),
        };
        let sql = format!(
            "SELECT {COLUMN_FIELDS}
             FROM board_columns col JOIN boards b ON b.id = col.board_id
             WHERE {filter}
             ORDER BY col.board_id, col.position, col.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], map_column)?;
        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    // ── Cards ─────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn insert_card(
        &self,
        column_id: i64,
        title: &str,
        description: Option<&str>,
        gut: GutScores,
        what_to_do: &str,
        where_to_do: Option<&str>,
        responsible_id: Option<i64>,
        sector_id: Option<i64>,
        due_at: Option<NaiveDateTime>,
        position: i32,
        created_by: i64,
        now: DateTime<Utc>,
    ) -> BoardResult<Card> {
        self.conn.execute(
            "INSERT INTO cards (column_id, title, description, severity, urgency, trend,
                                what_to_do, where_to_do, responsible_id, sector_id, due_at,
                                position, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                column_id,
                title,
                description,
                gut.severity,
                gut.urgency,
                gut.trend,
                what_to_do,
                where_to_do,
                responsible_id,
                sector_id,
                due_at,
                position,
                created_by,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_card(id)?
            .ok_or_else(|| BoardError::not_found("Card", id))
    }

    pub fn get_card(&self, card_id: i64) -> BoardResult<Option<Card>> {
        let sql = format!("SELECT {CARD_FIELDS} FROM cards c WHERE c.id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![card_id], map_card)
            .optional()?)
    }

    pub fn locate_card(&self, card_id: i64) -> BoardResult<Option<CardLocation>> {
        let sql = format!(
            "SELECT {CARD_FIELDS}, col.board_id, b.company_id
             FROM cards c
             JOIN board_columns col ON col.id = c.column_id
             JOIN boards b ON b.id = col.board_id
             WHERE c.id = ?1"
        );
        Ok(self
            .conn
            .query_row(&sql, params![card_id], |row| {
                Ok(CardLocation {
                    card: map_card(row)?,
                    board_id: row.get(16)?,
                    company_id: row.get(17)?,
                })
            })
            .optional()?)
    }

    /// Highest card position in a column, `None` when it is empty.
    pub fn max_card_position(&self, column_id: i64) -> BoardResult<Option<i32>> {
        Ok(self.conn.query_row(
            "SELECT MAX(position) FROM cards WHERE column_id = ?1",
            params![column_id],
            |row| row.get(0),
        )?)
    }

    pub fn count_cards(&self, column_id: i64) -> BoardResult<i32> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE column_id = ?1",
            params![column_id],
            |row| row.get(0),
        )?)
    }

    /// Ids of the cards currently in a column, in position order.
    pub fn card_ids_in_column(&self, column_id: i64) -> BoardResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM cards WHERE column_id = ?1 ORDER BY position, id")?;
        let rows = stmt.query_map(params![column_id], |row| row.get(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Add `delta` to the position of every card in `column_id` at or after
    /// `from_position`, skipping `except_card`.
    pub fn shift_cards(
        &self,
        column_id: i64,
        from_position: i32,
        delta: i32,
        except_card: i64,
    ) -> BoardResult<usize> {
        Ok(self.conn.execute(
            "UPDATE cards SET position = position + ?1
             WHERE column_id = ?2 AND position >= ?3 AND id != ?4",
            params![delta, column_id, from_position, except_card],
        )?)
    }

    pub fn place_card(
        &self,
        card_id: i64,
        column_id: i64,
        position: i32,
        now: DateTime<Utc>,
    ) -> BoardResult<()> {
        self.conn.execute(
            "UPDATE cards SET column_id = ?1, position = ?2, updated_at = ?3 WHERE id = ?4",
            params![column_id, position, now, card_id],
        )?;
        Ok(())
    }

    pub fn set_card_position(&self, card_id: i64, position: i32) -> BoardResult<()> {
        self.conn.execute(
            "UPDATE cards SET position = ?1 WHERE id = ?2",
            params![position, card_id],
        )?;
        Ok(())
    }

    /// Overwrite the editable fields of a card. Position and column are untouched.
    pub fn save_card_fields(&self, card: &Card, now: DateTime<Utc>) -> BoardResult<()> {
        self.conn.execute(
            "UPDATE cards SET title = ?1, description = ?2, severity = ?3, urgency = ?4,
                              trend = ?5, what_to_do = ?6, where_to_do = ?7,
                              responsible_id = ?8, sector_id = ?9, due_at = ?10,
                              updated_at = ?11
             WHERE id = ?12",
            params![
                card.title,
                card.description,
                card.gut.severity,
                card.gut.urgency,
                card.gut.trend,
                card.what_to_do,
                card.where_to_do,
                card.responsible_id,
                card.sector_id,
                card.due_at,
                now,
                card.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_card(&self, card_id: i64) -> BoardResult<bool> {
        let count = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![card_id])?;
        Ok(count > 0)
    }

    /// Cards for a projection, with responsible/sector/creator names resolved
    /// in the same query.
    pub fn card_rows(&self, scope: CardScope) -> BoardResult<Vec<CardRow>> {
        let (filter, id) = match scope {
            CardScope::Board(id) => ("col.board_id = ?1", id),
            CardScope::Company(id) => ("b.company_id = ?1", id),
        };
        let sql = format!(
            "SELECT {CARD_FIELDS},
                    r.name, r.user_id, s.name, u.name
             FROM cards c
             JOIN board_columns col ON col.id = c.column_id
             JOIN boards b ON b.id = col.board_id
             LEFT JOIN collaborators r ON r.id = c.responsible_id
             LEFT JOIN sectors s ON s.id = c.sector_id
             LEFT JOIN users u ON u.id = c.created_by
             WHERE {filter}
             ORDER BY c.column_id, c.position, c.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(CardRow {
                card: map_card(row)?,
                responsible_name: row.get(16)?,
                responsible_user_id: row.get(17)?,
                sector_name: row.get(18)?,
                creator_name: row.get(19)?,
            })
        })?;
        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?);
        }
        Ok(cards)
    }

    // ── Audit ─────────────────────────────────────────────────────────

    pub fn insert_audit(&self, actor_id: i64, action: &str, outcome: &str) -> BoardResult<()> {
        self.conn.execute(
            "INSERT INTO audit_log (actor_id, action, outcome) VALUES (?1, ?2, ?3)",
            params![actor_id, action, outcome],
        )?;
        Ok(())
    }

    pub fn count_audit(&self, action: &str) -> BoardResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM audit_log WHERE action = ?1",
            params![action],
            |row| row.get(0),
        )?)
    }
}

// ── Internal row helpers ──────────────────────────────────────────────

/// A card row joined with the display names a projection needs.
#[derive(Debug, Clone)]
pub struct CardRow {
    pub card: Card,
    pub responsible_name: Option<String>,
    pub responsible_user_id: Option<i64>,
    pub sector_name: Option<String>,
    pub creator_name: Option<String>,
}

impl CardRow {
    pub fn into_view(self) -> CardView {
        let card = self.card;
        let responsible = card.responsible_id.map(|id| ResponsibleRef {
            id,
            name: self.responsible_name.unwrap_or_default(),
            user_id: None,
        });
        let sector = card.sector_id.map(|id| NamedRef {
            id,
            name: self.sector_name.unwrap_or_default(),
        });
        CardView {
            id: card.id,
            title: card.title,
            description: card.description,
            what_to_do: card.what_to_do,
            where_to_do: card.where_to_do,
            due_at: card.due_at,
            severity: card.gut.severity,
            urgency: card.gut.urgency,
            trend: card.gut.trend,
            gut_score: card.gut.score(),
            gut_tier: card.gut.tier(),
            position: card.position,
            responsible,
            sector,
            creator: NamedRef {
                id: card.created_by,
                name: self.creator_name.unwrap_or_default(),
            },
            created_at: card.created_at,
            column_id: None,
            involvement: None,
        }
    }
}

fn map_board(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        company_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_column(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: row.get(0)?,
        board_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        color: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        column_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        gut: GutScores::new(row.get(4)?, row.get(5)?, row.get(6)?),
        what_to_do: row.get(7)?,
        where_to_do: row.get(8)?,
        responsible_id: row.get(9)?,
        sector_id: row.get(10)?,
        due_at: row.get(11)?,
        position: row.get(12)?,
        created_by: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> BoardResult<(BoardDb, i64, i64, i64)> {
        let db = BoardDb::new_in_memory()?;
        let (company, user, column) = db.write(|s| {
            let company = s.insert_company("Acme")?;
            let user = s.insert_user(Some(company), "Ana", Role::CompanyAdmin)?;
            let board = s.insert_board(company, "Ops", None, Utc::now())?;
            let column = s.insert_column(board.id, "Backlog", 0, "#6b7280", Utc::now())?;
            Ok((company, user, column.id))
        })?;
        Ok((db, company, user, column))
    }

    fn add_card(s: &Store<'_>, column: i64, user: i64, title: &str, position: i32) -> BoardResult<Card> {
        s.insert_card(
            column,
            title,
            None,
            GutScores::default(),
            "do it",
            None,
            None,
            None,
            None,
            position,
            user,
            Utc::now(),
        )
    }

    #[test]
    fn test_create_database_and_run_migrations() -> BoardResult<()> {
        let db = BoardDb::new_in_memory()?;
        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
             ('companies', 'users', 'sectors', 'collaborators', 'boards', 'board_columns', 'cards', 'audit_log')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 8);

        let index_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name IN
             ('idx_boards_company', 'idx_columns_board', 'idx_cards_column')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(index_count, 3);

        // Re-running migrations is harmless.
        db.run_migrations()?;
        Ok(())
    }

    #[test]
    fn test_write_rolls_back_on_error() -> BoardResult<()> {
        let (db, company, _, _) = seeded()?;
        let result: BoardResult<()> = db.write(|s| {
            s.insert_board(company, "Doomed", None, Utc::now())?;
            Err(BoardError::validation("abort"))
        });
        assert!(result.is_err());

        let boards = db.read(|s| s.list_boards(company))?;
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].name, "Ops");
        Ok(())
    }

    #[test]
    fn test_get_board_is_company_scoped() -> BoardResult<()> {
        let (db, company, _, _) = seeded()?;
        let other = db.write(|s| s.insert_company("Globex"))?;
        let board_id = db.read(|s| s.list_boards(company))?[0].id;

        assert!(db.read(|s| s.get_board(board_id, company))?.is_some());
        assert!(db.read(|s| s.get_board(board_id, other))?.is_none());

        assert!(matches!(
            db.read(|s| s.require_board(board_id, other)),
            Err(BoardError::NotFound { cross_tenant: true, .. })
        ));
        assert!(matches!(
            db.read(|s| s.require_board(424242, company)),
            Err(BoardError::NotFound { cross_tenant: false, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_shift_cards_skips_excluded_card() -> BoardResult<()> {
        let (db, _, user, column) = seeded()?;
        let ids = db.write(|s| {
            let a = add_card(s, column, user, "A", 0)?;
            let b = add_card(s, column, user, "B", 1)?;
            let c = add_card(s, column, user, "C", 2)?;
            Ok(vec![a.id, b.id, c.id])
        })?;

        let shifted = db.write(|s| s.shift_cards(column, 1, 1, ids[2]))?;
        assert_eq!(shifted, 1);

        let positions: Vec<i32> = db.read(|s| {
            ids.iter()
                .map(|id| Ok(s.get_card(*id)?.map(|c| c.position).unwrap_or(-1)))
                .collect()
        })?;
        assert_eq!(positions, vec![0, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_max_position_and_count() -> BoardResult<()> {
        let (db, _, user, column) = seeded()?;
        assert_eq!(db.read(|s| s.max_card_position(column))?, None);
        db.write(|s| {
            add_card(s, column, user, "A", 0)?;
            add_card(s, column, user, "B", 1)?;
            Ok(())
        })?;
        assert_eq!(db.read(|s| s.max_card_position(column))?, Some(1));
        assert_eq!(db.read(|s| s.count_cards(column))?, 2);
        Ok(())
    }

    #[test]
    fn test_locate_card_reports_board_and_company() -> BoardResult<()> {
        let (db, company, user, column) = seeded()?;
        let card = db.write(|s| add_card(s, column, user, "A", 0))?;
        let loc = db.read(|s| s.locate_card(card.id))?.expect("card should exist");
        assert_eq!(loc.company_id, company);
        assert_eq!(loc.card.title, "A");
        assert_eq!(loc.card.gut, GutScores::default());
        assert!(db.read(|s| s.locate_card(9999))?.is_none());
        Ok(())
    }

    #[test]
    fn test_delete_board_tree_removes_children() -> BoardResult<()> {
        let (db, company, user, column) = seeded()?;
        let board_id = db.read(|s| s.list_boards(company))?[0].id;
        db.write(|s| {
            s.insert_column(board_id, "Done", 1, "#10b981", Utc::now())?;
            add_card(s, column, user, "A", 0)?;
            add_card(s, column, user, "B", 1)?;
            Ok(())
        })?;

        let (cards, columns) = db.write(|s| s.delete_board_tree(board_id))?;
        assert_eq!((cards, columns), (2, 2));
        assert!(db.read(|s| s.list_boards(company))?.is_empty());
        assert!(db.read(|s| s.list_columns(CardScope::Company(company)))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_card_rows_resolve_names() -> BoardResult<()> {
        let (db, company, user, column) = seeded()?;
        db.write(|s| {
            let sector = s.insert_sector(company, "Finance", None)?;
            let collab = s.insert_collaborator(company, "Bruno", Some(user), Some(sector.id), None)?;
            s.insert_card(
                column,
                "Audit",
                Some("yearly"),
                GutScores::new(5, 4, 2),
                "count",
                Some("HQ"),
                Some(collab.id),
                Some(sector.id),
                None,
                0,
                user,
                Utc::now(),
            )
        })?;

        let rows = db.read(|s| s.card_rows(CardScope::Company(company)))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].responsible_user_id, Some(user));

        let view = rows[0].clone().into_view();
        assert_eq!(view.responsible.as_ref().map(|r| r.name.as_str()), Some("Bruno"));
        assert_eq!(view.sector.as_ref().map(|s| s.name.as_str()), Some("Finance"));
        assert_eq!(view.creator.name, "Ana");
        assert_eq!(view.gut_score, 40);
        Ok(())
    }

    #[test]
    fn test_foreign_keys_enforced() -> BoardResult<()> {
        let db = BoardDb::new_in_memory()?;
        let result = db.write(|s| s.insert_board(999, "Orphan", None, Utc::now()));
        assert!(matches!(result, Err(BoardError::Storage(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_db_handle_call() -> BoardResult<()> {
        let handle = DbHandle::new(BoardDb::new_in_memory()?);
        let id = handle
            .call(|db| db.write(|s| s.insert_company("Initech")))
            .await?;
        assert!(id > 0);
        Ok(())
    }
}
