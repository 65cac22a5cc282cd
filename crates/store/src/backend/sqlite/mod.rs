// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Embedded SQL backend.
//!
//! One database file per pool, one SQL table per logical table with a
//! `key` primary key column and a `val` blob column. A single connection
//! behind a mutex serializes all work.

mod connection;
mod kv;
mod ts;

use std::{collections::HashSet, path::PathBuf};

use edgekv_core::{Driver, config::SqliteConfig};
use edgekv_type::{
	Error, Result,
	diagnostic::{backend::operation_failed, config::missing_directory, store::not_connected},
	error,
};
pub use kv::SqliteKv;
use parking_lot::{Mutex, RwLock};
use rusqlite::Connection;
use tracing::{debug, instrument};
pub use ts::SqliteTs;

use self::connection::{connect, resolve_db_path};

#[derive(Debug, Clone, PartialEq)]
pub enum DbPath {
	File(PathBuf),
	Memory,
}

pub struct SqliteDriver {
	path: DbPath,
	config: SqliteConfig,
	conn: Mutex<Option<Connection>>,
	/// Tables known to exist in the current connection.
	created_tables: RwLock<HashSet<String>>,
}

impl SqliteDriver {
	/// `file` is created inside `config.path`.
	pub fn new(config: SqliteConfig, file: &str) -> Result<Self> {
		if config.path.as_os_str().is_empty() {
			return Err(error!(missing_directory(Self::NAME)));
		}
		let path = DbPath::File(config.path.join(file));
		Ok(Self::with_path(config, path))
	}

	pub fn in_memory() -> Self {
		Self::with_path(SqliteConfig::default(), DbPath::Memory)
	}

	fn with_path(config: SqliteConfig, path: DbPath) -> Self {
		Self {
			path,
			config,
			conn: Mutex::new(None),
			created_tables: RwLock::new(HashSet::new()),
		}
	}

	pub fn path(&self) -> &DbPath {
		&self.path
	}

	/// Only meaningful while the connection lock is held.
	pub(crate) fn has_table(&self, table: &str) -> bool {
		self.created_tables.read().contains(table)
	}

	/// Creates the table unless this connection already did.
	pub(crate) fn ensure_table(&self, conn: &Connection, table: &str, ddl: &str) -> Result<()> {
		if self.has_table(table) {
			return Ok(());
		}
		conn.execute_batch(ddl).map_err(sqlite_error)?;
		self.created_tables.write().insert(table.to_string());
		debug!(table, "created sqlite table");
		Ok(())
	}

	pub(crate) fn drop_table(&self, conn: &Connection, table: &str) -> Result<()> {
		conn.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", table)).map_err(sqlite_error)?;
		self.created_tables.write().remove(table);
		debug!(table, "dropped sqlite table");
		Ok(())
	}
}

impl Driver for SqliteDriver {
	type Handle = Connection;

	const NAME: &'static str = "sqlite";

	#[instrument(name = "store::sqlite::connect", level = "info", skip(self), fields(
		db_path = ?self.path,
		journal_mode = %self.config.journal_mode.as_str(),
		synchronous_mode = %self.config.synchronous_mode.as_str()
	))]
	fn connect(&self) -> Result<()> {
		let path = resolve_db_path(&self.path)?;
		let conn = connect(&path)?;
		if path != DbPath::Memory {
			conn.pragma_update(None, "journal_mode", self.config.journal_mode.as_str())
				.map_err(sqlite_error)?;
		}
		conn.pragma_update(None, "synchronous", self.config.synchronous_mode.as_str()).map_err(sqlite_error)?;
		conn.set_prepared_statement_cache_capacity(128);
		let tables = existing_tables(&conn)?;
		debug!(tables = tables.len(), "found existing sqlite tables");

		let mut guard = self.conn.lock();
		*self.created_tables.write() = tables;
		*guard = Some(conn);
		Ok(())
	}

	#[instrument(name = "store::sqlite::disconnect", level = "info", skip(self))]
	fn disconnect(&self) -> Result<()> {
		if let Some(conn) = self.conn.lock().take() {
			conn.close().map_err(|(_, e)| sqlite_error(e))?;
		}
		self.created_tables.write().clear();
		Ok(())
	}

	fn apply<R>(&self, work: impl FnOnce(&mut Connection) -> Result<R>) -> Result<R> {
		let mut guard = self.conn.lock();
		let conn = guard.as_mut().ok_or_else(|| error!(not_connected(Self::NAME)))?;
		work(conn)
	}

	fn is_connected(&self) -> bool {
		self.conn.lock().is_some()
	}
}

fn existing_tables(conn: &Connection) -> Result<HashSet<String>> {
	let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'").map_err(sqlite_error)?;
	let names = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(sqlite_error)?;
	names.collect::<rusqlite::Result<HashSet<_>>>().map_err(sqlite_error)
}

pub(crate) fn sqlite_error(err: rusqlite::Error) -> Error {
	error!(operation_failed(SqliteDriver::NAME, err.to_string()))
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
	matches!(
		err,
		rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
	)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use edgekv_core::{
		KeyValue, KeyValueExt, TableName,
		config::{JournalMode, SynchronousMode},
	};
	use edgekv_testing::tempdir::temp_dir;

	use super::*;

	#[test]
	fn test_creates_database_file_in_directory() {
		temp_dir(|path| {
			let driver = SqliteDriver::new(SqliteConfig::new(path.join("nested")), "sqliteKV.db").unwrap();
			driver.connect().unwrap();
			assert!(path.join("nested").join("sqliteKV.db").exists());
			driver.disconnect().unwrap();
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_missing_directory() {
		let err = SqliteDriver::new(SqliteConfig::new(""), "sqliteKV.db").err().unwrap();
		assert_eq!(err.code(), "CFG_002");
	}

	#[test]
	fn test_pragma_settings_applied() {
		temp_dir(|path| {
			let config = SqliteConfig::new(path)
				.journal_mode(JournalMode::Delete)
				.synchronous_mode(SynchronousMode::Extra);
			let driver = SqliteDriver::new(config, "pragma.db").unwrap();
			driver.connect().unwrap();

			let (journal_mode, synchronous) = driver
				.apply(|conn| {
					let journal_mode: String = conn
						.pragma_query_value(None, "journal_mode", |row| row.get(0))
						.map_err(sqlite_error)?;
					let synchronous: i32 = conn
						.pragma_query_value(None, "synchronous", |row| row.get(0))
						.map_err(sqlite_error)?;
					Ok((journal_mode, synchronous))
				})
				.unwrap();
			assert_eq!(journal_mode.to_uppercase(), "DELETE");
			assert_eq!(synchronous, 3);
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_reconnect_keeps_existing_tables() {
		temp_dir(|path| {
			let driver = Arc::new(SqliteDriver::new(SqliteConfig::new(path), "reconnect.db").unwrap());
			driver.connect().unwrap();
			let kv = SqliteKv::new(driver.clone(), TableName::new("rules").unwrap()).unwrap();
			kv.set_value("r1", &"select *".to_string()).unwrap();

			driver.disconnect().unwrap();
			driver.connect().unwrap();

			assert_eq!(kv.get_value::<String>("r1").unwrap().as_deref(), Some("select *"));
			assert_eq!(kv.keys().unwrap(), vec!["r1".to_string()]);
			kv.delete("r1").unwrap();
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_apply_after_disconnect() {
		let driver = SqliteDriver::in_memory();
		driver.connect().unwrap();
		driver.disconnect().unwrap();
		driver.disconnect().unwrap();
		let err = driver.apply(|_| Ok(())).unwrap_err();
		assert_eq!(err.code(), "STORE_004");
	}
}
