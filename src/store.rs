//! Read-only access to a Chromium `Login Data` database.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::error::{ImportError, Result};

/// File name of the login store inside a profile directory.
pub const LOGIN_DATA_FILE: &str = "Login Data";

/// Fixed query run against every login store.
pub const LOGINS_QUERY: &str =
    "SELECT origin_url, username_value, password_value, date_created FROM logins";

/// A login as stored by Chromium, before decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRow {
    pub origin_url: String,
    pub username: String,
    pub encrypted_password: Vec<u8>,
    pub date_created: i64,
}

/// One result row of [`LOGINS_QUERY`], with columns kept as SQLite stored them.
#[derive(Debug, Clone)]
pub struct RawLoginRow {
    origin_url: Value,
    username_value: Value,
    password_value: Value,
    date_created: Value,
}

/// Open handle on a login store. Closed when dropped.
pub struct LoginStore {
    conn: Connection,
}

impl LoginStore {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Run [`LOGINS_QUERY`] and collect every row in query order.
    pub fn read_logins(&self) -> rusqlite::Result<Vec<RawLoginRow>> {
        let mut stmt = self.conn.prepare(LOGINS_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(RawLoginRow {
                origin_url: row.get(0)?,
                username_value: row.get(1)?,
                password_value: row.get(2)?,
                date_created: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}

impl RawLoginRow {
    /// Check column types and turn the row into a [`LoginRow`].
    pub fn into_login_row(self) -> Result<LoginRow> {
        Ok(LoginRow {
            origin_url: text_or_empty("origin_url", self.origin_url)?,
            username: text_or_empty("username_value", self.username_value)?,
            encrypted_password: bytes("password_value", self.password_value)?,
            date_created: integer("date_created", self.date_created)?,
        })
    }
}

fn text_or_empty(column: &'static str, value: Value) -> Result<String> {
    match value {
        Value::Text(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => Err(invalid_type(column, "TEXT", &other)),
    }
}

fn bytes(column: &'static str, value: Value) -> Result<Vec<u8>> {
    match value {
        Value::Blob(bytes) => Ok(bytes),
        other => Err(invalid_type(column, "BLOB", &other)),
    }
}

fn integer(column: &'static str, value: Value) -> Result<i64> {
    match value {
        Value::Integer(value) => Ok(value),
        other => Err(invalid_type(column, "INTEGER", &other)),
    }
}

fn invalid_type(column: &'static str, expected: &'static str, found: &Value) -> ImportError {
    let found = match found {
        Value::Null => "NULL",
        Value::Integer(_) => "INTEGER",
        Value::Real(_) => "REAL",
        Value::Text(_) => "TEXT",
        Value::Blob(_) => "BLOB",
    };
    ImportError::InvalidColumnType {
        column,
        expected,
        found,
    }
}
