// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use edgekv_core::{Driver, EncodedValue, Monotonic, TableName, Tskv};
use edgekv_type::Result;
use rusqlite::{OptionalExtension, params};
use tracing::instrument;

use super::{SqliteDriver, sqlite_error};

struct Statements {
	create: String,
	replace: String,
	select: String,
	select_max: String,
	delete: String,
	delete_before: String,
}

impl Statements {
	fn new(table: &str) -> Self {
		Self {
			create: format!("CREATE TABLE IF NOT EXISTS \"{table}\" (key INTEGER PRIMARY KEY, val BLOB)"),
			replace: format!("REPLACE INTO \"{table}\" (key, val) VALUES (?1, ?2)"),
			select: format!("SELECT val FROM \"{table}\" WHERE key = ?1"),
			select_max: format!("SELECT key FROM \"{table}\" ORDER BY key DESC LIMIT 1"),
			delete: format!("DELETE FROM \"{table}\" WHERE key = ?1"),
			delete_before: format!("DELETE FROM \"{table}\" WHERE key < ?1"),
		}
	}
}

pub struct SqliteTs {
	driver: Arc<SqliteDriver>,
	table: TableName,
	sql: Statements,
	last: Monotonic,
}

impl SqliteTs {
	pub fn new(driver: Arc<SqliteDriver>, table: TableName) -> Result<Self> {
		let sql = Statements::new(&table);
		let max = driver.apply(|conn| {
			driver.ensure_table(conn, &table, &sql.create)?;
			let mut stmt = conn.prepare_cached(&sql.select_max).map_err(sqlite_error)?;
			stmt.query_row([], |row| row.get::<_, i64>(0)).optional().map_err(sqlite_error)
		})?;
		Ok(Self {
			driver,
			table,
			sql,
			last: Monotonic::recover(max),
		})
	}

	fn execute(&self, sql: &str, key: i64) -> Result<()> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(());
			}
			let mut stmt = conn.prepare_cached(sql).map_err(sqlite_error)?;
			stmt.execute(params![key]).map(|_| ()).map_err(sqlite_error)
		})
	}
}

impl Tskv for SqliteTs {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::sqlite::ts::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool> {
		self.last.advance(key, || {
			self.driver.apply(|conn| {
				self.driver.ensure_table(conn, &self.table, &self.sql.create)?;
				let mut stmt = conn.prepare_cached(&self.sql.replace).map_err(sqlite_error)?;
				stmt.execute(params![key, value.as_slice()]).map(|_| ()).map_err(sqlite_error)
			})
		})
	}

	#[instrument(name = "store::sqlite::ts::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: i64) -> Result<Option<EncodedValue>> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(None);
			}
			let mut stmt = conn.prepare_cached(&self.sql.select).map_err(sqlite_error)?;
			stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0))
				.optional()
				.map(|v| v.map(EncodedValue::new))
				.map_err(sqlite_error)
		})
	}

	fn last(&self) -> Result<(i64, Option<EncodedValue>)> {
		let key = self.last.last();
		Ok((key, self.get(key)?))
	}

	fn delete(&self, key: i64) -> Result<()> {
		self.execute(&self.sql.delete, key)
	}

	#[instrument(name = "store::sqlite::ts::delete_before", level = "debug", skip(self), fields(table = %self.table))]
	fn delete_before(&self, key: i64) -> Result<()> {
		self.execute(&self.sql.delete_before, key)
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}

	#[instrument(name = "store::sqlite::ts::drop", level = "debug", skip(self), fields(table = %self.table))]
	fn drop_table(&self) -> Result<()> {
		self.execute(&self.sql.delete_before, i64::MAX)?;
		self.driver.apply(|conn| self.driver.drop_table(conn, &self.table))
	}
}
