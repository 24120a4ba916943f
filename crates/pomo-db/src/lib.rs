//! Storage layer for the focus timer.
//!
//! Provides persistence for users and session records using `rusqlite`, and
//! implements [`SessionLog`] so the timer and statistics code can run
//! against it directly.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. All reads go through the
//! same connection as writes, so a query issued after an insert observes it.
//!
//! # Schema
//!
//! ## Dates
//!
//! Session dates are stored as TEXT in `YYYY-MM-DD` form. Lexicographic order
//! matches calendar order, so range filters and `ORDER BY date` work on the
//! raw column.
//!
//! ## Legacy session tables
//!
//! Older databases have a `sessions` table without `owner_id`. Opening such a
//! database adds the column in place; existing rows keep a NULL owner and
//! therefore never show up in any per-owner query.
//!
//! ## Credentials
//!
//! `users.password_hash` holds an Argon2id PHC string, never the password.

mod password;

use std::path::Path;
use std::sync::mpsc;

use chrono::{NaiveDate, SecondsFormat, Utc};
use pomo_core::{
    CategoryTotal, DailyTotal, NewSessionRecord, SessionId, SessionLog, SessionRecord, User,
    UserId, ValidationError, types::normalize_username,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

pub use password::{hash_password, verify_password};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Registration with a username that already exists.
    #[error("username is already taken: {0}")]
    UsernameTaken(String),
    /// Login with an unknown username or a wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Input rejected before reaching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Hashing failed or a stored hash could not be parsed.
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
    /// A stored row could not be mapped back to a domain value.
    #[error("invalid session record {id}: {message}")]
    InvalidRecord { id: String, message: String },
    /// An aggregate came back negative.
    #[error("negative total: {0}")]
    NegativeTotal(i64),
}

/// A change to the session log, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChange {
    Appended { owner: UserId, session: SessionId },
    Cleared { owner: UserId, removed: usize },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
    subscribers: Vec<mpsc::Sender<LogChange>>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DbError> {
        let db = Self {
            conn,
            subscribers: Vec::new(),
        };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Sessions table: one row per finalized focus session
            -- date: calendar day, 'YYYY-MM-DD'
            -- category: display name (e.g. 'Coding')
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
                distraction_count INTEGER NOT NULL CHECK (distraction_count >= 0),
                owner_id TEXT,
                FOREIGN KEY (owner_id) REFERENCES users(id)
            );
            ",
        )?;
        self.migrate_sessions_owner()?;
        self.conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_sessions_owner_date ON sessions(owner_id, date);",
        )?;
        Ok(())
    }

    /// Adds `owner_id` to a `sessions` table created before ownership existed.
    fn migrate_sessions_owner(&self) -> Result<(), DbError> {
        let columns = {
            let mut stmt = self.conn.prepare("PRAGMA table_info(sessions)")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<Result<Vec<_>, _>>()?;
            names
        };
        let has_owner = columns.iter().any(|column| column == "owner_id");
        if !has_owner {
            tracing::info!("adding owner_id column to legacy sessions table");
            self.conn.execute_batch(
                "ALTER TABLE sessions ADD COLUMN owner_id TEXT REFERENCES users(id);",
            )?;
        }
        Ok(())
    }

    /// Registers to change notifications.
    ///
    /// The receiver gets one [`LogChange`] per append or clear until it is dropped.
    pub fn subscribe(&mut self) -> mpsc::Receiver<LogChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: &LogChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }

    // ========== Accounts ==========

    /// Inserts a user with an already-hashed password.
    pub fn insert_user(&mut self, username: &str, password_hash: &str) -> Result<User, DbError> {
        let user = User {
            id: UserId::generate(),
            username: username.to_string(),
        };
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let result = self.conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
            params![user.id.as_str(), user.username, password_hash, created_at],
        );
        match result {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(DbError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a user by exact username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        Ok(self
            .user_row(username)?
            .map(|(user, _password_hash)| user))
    }

    /// Looks up a user whose stored hash matches `password`.
    pub fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DbError> {
        let Some((user, stored)) = self.user_row(username)? else {
            return Ok(None);
        };
        let matches = verify_password(password, &stored).map_err(DbError::PasswordHash)?;
        Ok(matches.then_some(user))
    }

    /// Creates an account.
    ///
    /// The username is trimmed; blank usernames or passwords are rejected.
    pub fn register(&mut self, username: &str, password: &str) -> Result<User, DbError> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(ValidationError::Empty { field: "password" }.into());
        }
        if self.find_user_by_username(username)?.is_some() {
            return Err(DbError::UsernameTaken(username.to_string()));
        }
        let hash = hash_password(password).map_err(DbError::PasswordHash)?;
        let user = self.insert_user(username, &hash)?;
        tracing::info!(user = %user.username, "registered user");
        Ok(user)
    }

    /// Resolves credentials to a user.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, DbError> {
        let username = normalize_username(username)?;
        self.find_user_by_credentials(username, password)?
            .ok_or(DbError::InvalidCredentials)
    }

    fn user_row(&self, username: &str) -> Result<Option<(User, String)>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?",
                [username],
                |row| {
                    let id: String = row.get(0)?;
                    let username: String = row.get(1)?;
                    let password_hash: String = row.get(2)?;
                    Ok((id, username, password_hash))
                },
            )
            .optional()?;
        row.map(|(id, username, password_hash)| {
            let user = User {
                id: UserId::new(id)?,
                username,
            };
            Ok::<_, DbError>((user, password_hash))
        })
        .transpose()
    }

    // ========== Aggregate helpers ==========

    fn sum_query(&self, sql: &str, params: impl rusqlite::Params) -> Result<u64, DbError> {
        let total: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        u64::try_from(total).map_err(|_| DbError::NegativeTotal(total))
    }
}

impl SessionLog for Database {
    type Error = DbError;

    fn insert_session_record(
        &mut self,
        record: &NewSessionRecord,
    ) -> Result<SessionRecord, DbError> {
        let stored = SessionRecord::from_new(SessionId::generate(), record);
        self.conn.execute(
            "
            INSERT INTO sessions (id, date, category, duration_seconds, distraction_count, owner_id)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                stored.id.as_str(),
                format_date(stored.date),
                stored.category.as_str(),
                stored.duration_seconds,
                stored.distraction_count,
                stored.owner_id.as_str(),
            ],
        )?;
        self.notify(&LogChange::Appended {
            owner: stored.owner_id.clone(),
            session: stored.id.clone(),
        });
        Ok(stored)
    }

    fn list_records_for_owner(&self, owner: &UserId) -> Result<Vec<SessionRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, category, duration_seconds, distraction_count
            FROM sessions
            WHERE owner_id = ?
            ORDER BY date DESC, rowid DESC
            ",
        )?;
        let rows = stmt.query_map([owner.as_str()], |row| {
            Ok(RawSession {
                id: row.get(0)?,
                date: row.get(1)?,
                category: row.get(2)?,
                duration_seconds: row.get(3)?,
                distraction_count: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record(owner)?);
        }
        Ok(records)
    }

    fn delete_all_records_for_owner(&mut self, owner: &UserId) -> Result<usize, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE owner_id = ?", [owner.as_str()])?;
        tracing::info!(owner = %owner, removed, "cleared session records");
        self.notify(&LogChange::Cleared {
            owner: owner.clone(),
            removed,
        });
        Ok(removed)
    }

    fn total_seconds_on(&self, owner: &UserId, date: NaiveDate) -> Result<u64, DbError> {
        self.sum_query(
            "SELECT COALESCE(SUM(duration_seconds), 0) FROM sessions WHERE owner_id = ? AND date = ?",
            params![owner.as_str(), format_date(date)],
        )
    }

    fn total_seconds(&self, owner: &UserId) -> Result<u64, DbError> {
        self.sum_query(
            "SELECT COALESCE(SUM(duration_seconds), 0) FROM sessions WHERE owner_id = ?",
            [owner.as_str()],
        )
    }

    fn total_distractions(&self, owner: &UserId) -> Result<u64, DbError> {
        self.sum_query(
            "SELECT COALESCE(SUM(distraction_count), 0) FROM sessions WHERE owner_id = ?",
            [owner.as_str()],
        )
    }

    fn daily_totals(
        &self,
        owner: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotal>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date, SUM(duration_seconds) AS total
            FROM sessions
            WHERE owner_id = ? AND date >= ? AND date <= ?
            GROUP BY date
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![owner.as_str(), format_date(from), format_date(to)],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        )?;
        let mut totals = Vec::new();
        for row in rows {
            let (date, total) = row?;
            totals.push(DailyTotal {
                date: parse_date(&date, "daily total")?,
                total_seconds: u64::try_from(total).map_err(|_| DbError::NegativeTotal(total))?,
            });
        }
        Ok(totals)
    }

    fn category_totals(&self, owner: &UserId) -> Result<Vec<CategoryTotal>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT category, SUM(duration_seconds) AS total
            FROM sessions
            WHERE owner_id = ?
            GROUP BY category
            ",
        )?;
        let rows = stmt.query_map([owner.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut totals = Vec::new();
        for row in rows {
            let (category, total) = row?;
            totals.push(CategoryTotal {
                category: category.parse().map_err(|e: ValidationError| {
                    DbError::InvalidRecord {
                        id: "category total".to_string(),
                        message: e.to_string(),
                    }
                })?,
                total_seconds: u64::try_from(total).map_err(|_| DbError::NegativeTotal(total))?,
            });
        }
        totals.sort_by_key(|total| total.category);
        Ok(totals)
    }
}

#[derive(Debug)]
struct RawSession {
    id: String,
    date: String,
    category: String,
    duration_seconds: u32,
    distraction_count: u32,
}

impl RawSession {
    fn into_record(self, owner: &UserId) -> Result<SessionRecord, DbError> {
        let invalid = |message: String| DbError::InvalidRecord {
            id: self.id.clone(),
            message,
        };
        let date = parse_date(&self.date, &self.id)?;
        let category = self
            .category
            .parse()
            .map_err(|e: ValidationError| invalid(e.to_string()))?;
        let id = SessionId::new(self.id.clone()).map_err(|e| invalid(e.to_string()))?;
        Ok(SessionRecord {
            id,
            owner_id: owner.clone(),
            date,
            category,
            duration_seconds: self.duration_seconds,
            distraction_count: self.distraction_count,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str, id: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| DbError::InvalidRecord {
        id: id.to_string(),
        message: format!("bad date {value:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomo_core::{
        Aggregator, Category, FixedClock, FocusController, MemoryLog, SessionSummary,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 3, 10)
    }

    fn new_record(
        owner: &UserId,
        on: NaiveDate,
        category: Category,
        seconds: u32,
        distractions: u32,
    ) -> NewSessionRecord {
        NewSessionRecord {
            owner_id: owner.clone(),
            date: on,
            summary: SessionSummary {
                category,
                duration_seconds: seconds,
                distraction_count: distractions,
            },
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "users"),
            vec!["id", "username", "password_hash", "created_at"]
        );
        assert_eq!(
            table_columns(&db.conn, "sessions"),
            vec![
                "id",
                "date",
                "category",
                "duration_seconds",
                "distraction_count",
                "owner_id",
            ]
        );
    }

    #[test]
    fn init_is_idempotent_on_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pomo.db");
        let mut db = Database::open(&path).unwrap();
        let user = db.register("alice", "pw").unwrap();
        drop(db);

        let db = Database::open(&path).unwrap();
        assert_eq!(db.find_user_by_username("alice").unwrap(), Some(user));
    }

    #[test]
    fn legacy_sessions_table_gains_owner_column_without_data_loss() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "
                CREATE TABLE sessions (
                    id TEXT PRIMARY KEY,
                    date TEXT NOT NULL,
                    category TEXT NOT NULL,
                    duration_seconds INTEGER NOT NULL,
                    distraction_count INTEGER NOT NULL
                );
                INSERT INTO sessions VALUES ('old-1', '2024-12-01', 'Study', 1500, 1);
                ",
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let columns = table_columns(&db.conn, "sessions");
        assert!(columns.contains(&"owner_id".to_string()));

        let (count, owner): (i64, Option<String>) = db
            .conn
            .query_row(
                "SELECT COUNT(*), MAX(owner_id) FROM sessions WHERE id = 'old-1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(owner, None);
    }

    #[test]
    fn register_then_authenticate() {
        let mut db = Database::open_in_memory().unwrap();
        let user = db.register("  alice ", "s3cret").unwrap();
        assert_eq!(user.username, "alice");

        let found = db.authenticate("alice", "s3cret").unwrap();
        assert_eq!(found, user);
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let mut db = Database::open_in_memory().unwrap();
        db.register("alice", "s3cret").unwrap();
        let stored: String = db
            .conn
            .query_row(
                "SELECT password_hash FROM users WHERE username = 'alice'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_ne!(stored, "s3cret");
        assert!(stored.starts_with("$argon2id$"));
    }

    #[test]
    fn duplicate_username_is_taken() {
        let mut db = Database::open_in_memory().unwrap();
        db.register("alice", "one").unwrap();
        let err = db.register("alice", "two").unwrap_err();
        assert!(matches!(err, DbError::UsernameTaken(name) if name == "alice"));

        let err = db.insert_user("alice", "hash").unwrap_err();
        assert!(matches!(err, DbError::UsernameTaken(_)));
    }

    #[test]
    fn wrong_password_or_unknown_user_is_invalid_credentials() {
        let mut db = Database::open_in_memory().unwrap();
        db.register("alice", "right").unwrap();

        assert!(matches!(
            db.authenticate("alice", "wrong"),
            Err(DbError::InvalidCredentials)
        ));
        assert!(matches!(
            db.authenticate("bob", "right"),
            Err(DbError::InvalidCredentials)
        ));
        assert_eq!(db.find_user_by_credentials("alice", "wrong").unwrap(), None);
    }

    #[test]
    fn blank_credentials_are_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.register("   ", "pw"),
            Err(DbError::Validation(ValidationError::Empty { field: "username" }))
        ));
        assert!(matches!(
            db.register("alice", ""),
            Err(DbError::Validation(ValidationError::Empty { field: "password" }))
        ));
    }

    #[test]
    fn records_list_newest_first_and_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let owner = db.register("alice", "pw").unwrap().id;
        let older = db
            .insert_session_record(&new_record(&owner, date(2025, 3, 1), Category::Study, 600, 0))
            .unwrap();
        let newer = db
            .insert_session_record(&new_record(&owner, date(2025, 3, 5), Category::Coding, 1500, 2))
            .unwrap();

        let records = db.list_records_for_owner(&owner).unwrap();
        assert_eq!(records, vec![newer, older]);
    }

    #[test]
    fn session_without_registered_owner_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let ghost = UserId::new("ghost").unwrap();
        let result = db.insert_session_record(&new_record(&ghost, today(), Category::Study, 60, 0));
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }

    #[test]
    fn delete_all_is_scoped_to_owner() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = db.register("alice", "pw").unwrap().id;
        let bob = db.register("bob", "pw").unwrap().id;
        for owner in [&alice, &alice, &bob] {
            db.insert_session_record(&new_record(owner, today(), Category::Study, 60, 0))
                .unwrap();
        }

        assert_eq!(db.delete_all_records_for_owner(&alice).unwrap(), 2);
        assert!(db.list_records_for_owner(&alice).unwrap().is_empty());
        assert_eq!(db.list_records_for_owner(&bob).unwrap().len(), 1);
    }

    #[test]
    fn sql_aggregates_match_in_memory_aggregates() {
        let mut db = Database::open_in_memory().unwrap();
        let owner = db.register("alice", "pw").unwrap().id;
        let mut memory = MemoryLog::new();
        let rows = [
            (date(2025, 3, 2), Category::Project, 900, 1), // outside the 7-day window
            (date(2025, 3, 4), Category::Study, 300, 0),
            (date(2025, 3, 8), Category::Coding, 600, 2),
            (date(2025, 3, 8), Category::Reading, 120, 0),
            (today(), Category::Coding, 1500, 1),
            (today(), Category::Reading, 300, 0),
        ];
        for (on, category, seconds, distractions) in rows {
            let record = new_record(&owner, on, category, seconds, distractions);
            db.insert_session_record(&record).unwrap();
            memory.insert_session_record(&record).unwrap();
        }

        let from_db = Aggregator::new(&db, FixedClock(today()))
            .snapshot(&owner)
            .unwrap();
        let from_memory = Aggregator::new(&memory, FixedClock(today()))
            .snapshot(&owner)
            .unwrap();
        assert_eq!(from_db, from_memory);

        assert_eq!(from_db.today_total_seconds, 1800);
        assert_eq!(from_db.all_time_total_seconds, 3720);
        assert_eq!(from_db.total_distractions, 4);
        assert_eq!(
            from_db.last_7_days,
            vec![
                DailyTotal {
                    date: date(2025, 3, 4),
                    total_seconds: 300,
                },
                DailyTotal {
                    date: date(2025, 3, 8),
                    total_seconds: 720,
                },
                DailyTotal {
                    date: today(),
                    total_seconds: 1800,
                },
            ]
        );
        let categories: Vec<_> = from_db
            .category_totals
            .iter()
            .map(|t| (t.category, t.total_seconds))
            .collect();
        assert_eq!(
            categories,
            vec![
                (Category::Study, 300),
                (Category::Coding, 2100),
                (Category::Project, 900),
                (Category::Reading, 420),
            ]
        );
    }

    #[test]
    fn aggregates_are_zero_for_new_owner_and_isolated() {
        let mut db = Database::open_in_memory().unwrap();
        let alice = db.register("alice", "pw").unwrap().id;
        let bob = db.register("bob", "pw").unwrap().id;
        db.insert_session_record(&new_record(&alice, today(), Category::Coding, 1500, 2))
            .unwrap();

        let stats = Aggregator::new(&db, FixedClock(today()));
        assert_eq!(stats.today_total(&bob).unwrap(), 0);
        assert_eq!(stats.all_time_total(&bob).unwrap(), 0);
        assert_eq!(stats.total_distractions(&bob).unwrap(), 0);
        assert!(stats.last_7_days(&bob).unwrap().is_empty());
        assert!(stats.category_totals(&bob).unwrap().is_empty());

        assert_eq!(stats.all_time_total(&alice).unwrap(), 1500);
        assert_eq!(stats.total_distractions(&alice).unwrap(), 2);
        assert_eq!(
            stats.category_totals(&alice).unwrap(),
            vec![CategoryTotal {
                category: Category::Coding,
                total_seconds: 1500,
            }]
        );
    }

    #[test]
    fn subscribers_see_appends_and_clears() {
        let mut db = Database::open_in_memory().unwrap();
        let owner = db.register("alice", "pw").unwrap().id;
        let changes = db.subscribe();
        let dropped = db.subscribe();
        drop(dropped);

        let stored = db
            .insert_session_record(&new_record(&owner, today(), Category::Study, 60, 0))
            .unwrap();
        db.delete_all_records_for_owner(&owner).unwrap();

        assert_eq!(
            changes.try_recv().unwrap(),
            LogChange::Appended {
                owner: owner.clone(),
                session: stored.id,
            }
        );
        assert_eq!(
            changes.try_recv().unwrap(),
            LogChange::Cleared { owner, removed: 1 }
        );
        assert!(changes.try_recv().is_err());
        assert_eq!(db.subscribers.len(), 1);
    }

    #[test]
    fn controller_records_into_database() {
        let mut db = Database::open_in_memory().unwrap();
        let owner = db.register("alice", "pw").unwrap().id;
        let mut controller = FocusController::new(db, FixedClock(today()), Some(owner.clone()));
        let _ = controller.configure(1, Category::Reading);
        let _ = controller.start();
        for _ in 0..60 {
            let _ = controller.tick().unwrap();
        }

        let records = controller.log().list_records_for_owner(&owner).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_seconds, 60);
        assert_eq!(records[0].date, today());
        assert_eq!(controller.stats().today_total(&owner).unwrap(), 60);
    }
}
