//! Parcel store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the single gateway between callers and the `parcel` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every operation is one statement; there are no read-then-write paths.
//! - Address updates and deletes match on both `number` and the
//!   `registered` status inside the statement itself.
//! - A guard that matches nothing is not an error.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::schema::{user_version, SCHEMA_VERSION};
use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use rusqlite::{named_params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

const REQUIRED_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by parcel store operations.
///
/// `NotFound` is the only semantic error; every other variant is a storage
/// failure reported as-is.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ParcelNumber),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether this error means the requested parcel does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel persistence.
///
/// Mutating operations return the number of affected rows; zero is a
/// successful outcome when the parcel is missing or its guard fails.
pub trait ParcelRepository {
    /// Inserts a new parcel and returns its storage-assigned number.
    ///
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Gets one parcel, failing with `RepoError::NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists all parcels of a client in insertion order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Sets the status regardless of its current value.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<usize>;
    /// Sets the address only while the parcel is `registered`.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<usize>;
    /// Deletes the parcel only while it is `registered`.
    fn delete(&self, number: ParcelNumber) -> RepoResult<usize>;
}

/// SQLite-backed parcel store.
#[derive(Debug, Clone, Copy)]
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Wraps a connection whose `parcel` table was provisioned externally.
    ///
    /// No schema checks are performed.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying it was bootstrapped by `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` differs from `SCHEMA_VERSION`.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the table shape is wrong.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (:client, :status, :address, :created_at);",
            named_params! {
                ":client": parcel.client,
                ":status": parcel.status.as_str(),
                ":address": parcel.address.as_str(),
                ":created_at": parcel.created_at.as_str(),
            },
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PARCEL_SELECT_SQL} WHERE number = :number;"))?;

        let mut rows = stmt.query(named_params! { ":number": number })?;
        if let Some(row) = rows.next()? {
            return parse_parcel_row(row);
        }

        Err(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{PARCEL_SELECT_SQL} WHERE client = :client ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query(named_params! { ":client": client })?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = :status WHERE number = :number;",
            named_params! {
                ":status": status.as_str(),
                ":number": number,
            },
        )?;

        Ok(changed)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET address = :address
             WHERE number = :number AND status = :status;",
            named_params! {
                ":address": address,
                ":number": number,
                ":status": ParcelStatus::Registered.as_str(),
            },
        )?;

        Ok(changed)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = :number AND status = :status;",
            named_params! {
                ":number": number,
                ":status": ParcelStatus::Registered.as_str(),
            },
        )?;

        Ok(changed)
    }
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<ParcelStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid parcel status `{status_text}` in parcel.status"
        ))
    })?;

    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = user_version(conn)?;
    if actual_version != SCHEMA_VERSION {
        return Err(RepoError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'parcel'
        );",
        [],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("parcel"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(parcel);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "parcel",
                column,
            });
        }
    }

    Ok(())
}
