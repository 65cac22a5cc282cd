// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use edgekv_core::{Driver, EncodedValue, KeyValue, TableName};
use edgekv_type::{
	Result,
	diagnostic::store::{already_exists, not_found},
	error,
};
use rusqlite::{OptionalExtension, params};
use tracing::instrument;

use super::{SqliteDriver, is_constraint_violation, sqlite_error};
use crate::backend::{collect_prefixed, parse_keyed_state};

/// SQL text per table, prepared through the connection's statement cache.
struct Statements {
	create: String,
	insert: String,
	replace: String,
	select: String,
	select_prefix: String,
	select_all: String,
	select_keys: String,
	delete: String,
	delete_all: String,
}

impl Statements {
	fn new(table: &str) -> Self {
		Self {
			create: format!("CREATE TABLE IF NOT EXISTS \"{table}\" (key TEXT PRIMARY KEY, val BLOB)"),
			insert: format!("INSERT INTO \"{table}\" (key, val) VALUES (?1, ?2)"),
			replace: format!("REPLACE INTO \"{table}\" (key, val) VALUES (?1, ?2)"),
			select: format!("SELECT val FROM \"{table}\" WHERE key = ?1"),
			select_prefix: format!("SELECT key, val FROM \"{table}\" WHERE key LIKE ?1 ESCAPE '\\'"),
			select_all: format!("SELECT key, val FROM \"{table}\""),
			select_keys: format!("SELECT key FROM \"{table}\""),
			delete: format!("DELETE FROM \"{table}\" WHERE key = ?1"),
			delete_all: format!("DELETE FROM \"{table}\""),
		}
	}
}

pub struct SqliteKv {
	driver: Arc<SqliteDriver>,
	table: TableName,
	sql: Statements,
}

impl SqliteKv {
	pub fn new(driver: Arc<SqliteDriver>, table: TableName) -> Result<Self> {
		let sql = Statements::new(&table);
		driver.apply(|conn| driver.ensure_table(conn, &table, &sql.create))?;
		Ok(Self {
			driver,
			table,
			sql,
		})
	}

	fn write(&self, sql: &str, key: &str, value: &[u8]) -> Result<usize> {
		self.driver.apply(|conn| {
			self.driver.ensure_table(conn, &self.table, &self.sql.create)?;
			let mut stmt = conn.prepare_cached(sql).map_err(sqlite_error)?;
			stmt.execute(params![key, value]).map_err(sqlite_error)
		})
	}

	fn select_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(None);
			}
			let mut stmt = conn.prepare_cached(&self.sql.select).map_err(sqlite_error)?;
			stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0)).optional().map_err(sqlite_error)
		})
	}

	fn select_rows(&self, sql: &str, param: Option<&str>) -> Result<Vec<(String, EncodedValue)>> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(Vec::new());
			}
			let mut stmt = conn.prepare_cached(sql).map_err(sqlite_error)?;
			let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, EncodedValue)> {
				Ok((row.get(0)?, EncodedValue::new(row.get::<_, Vec<u8>>(1)?)))
			};
			let rows = match param {
				Some(param) => stmt.query_map(params![param], map),
				None => stmt.query_map([], map),
			}
			.map_err(sqlite_error)?;
			rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sqlite_error)
		})
	}
}

impl KeyValue for SqliteKv {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::sqlite::kv::setnx", level = "debug", skip(self, value), fields(table = %self.table))]
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.driver.apply(|conn| {
			self.driver.ensure_table(conn, &self.table, &self.sql.create)?;
			let mut stmt = conn.prepare_cached(&self.sql.insert).map_err(sqlite_error)?;
			match stmt.execute(params![key, value.as_slice()]) {
				Ok(_) => Ok(()),
				Err(e) if is_constraint_violation(&e) => Err(error!(already_exists(&self.table, key))),
				Err(e) => Err(sqlite_error(e)),
			}
		})
	}

	#[instrument(name = "store::sqlite::kv::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.write(&self.sql.replace, key, value).map(|_| ())
	}

	#[instrument(name = "store::sqlite::kv::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		Ok(self.select_bytes(key)?.map(EncodedValue::new))
	}

	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
		self.select_bytes(key)?.map(|bytes| parse_keyed_state(&bytes)).transpose()
	}

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
		self.write(&self.sql.replace, key, value.to_string().as_bytes()).map(|_| ())
	}

	#[instrument(name = "store::sqlite::kv::get_by_prefix", level = "trace", skip(self), fields(table = %self.table))]
	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		let pattern = format!("{}%", escape_like(prefix));
		let rows = self.select_rows(&self.sql.select_prefix, Some(&pattern))?;
		// LIKE ignores ASCII case
		Ok(collect_prefixed(rows, prefix))
	}

	#[instrument(name = "store::sqlite::kv::delete", level = "debug", skip(self), fields(table = %self.table))]
	fn delete(&self, key: &str) -> Result<()> {
		let deleted = self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(0);
			}
			let mut stmt = conn.prepare_cached(&self.sql.delete).map_err(sqlite_error)?;
			stmt.execute(params![key]).map_err(sqlite_error)
		})?;
		if deleted == 0 {
			return Err(error!(not_found(&self.table, key)));
		}
		Ok(())
	}

	fn keys(&self) -> Result<Vec<String>> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(Vec::new());
			}
			let mut stmt = conn.prepare_cached(&self.sql.select_keys).map_err(sqlite_error)?;
			let rows = stmt.query_map([], |row| row.get::<_, String>(0)).map_err(sqlite_error)?;
			rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sqlite_error)
		})
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		self.select_rows(&self.sql.select_all, None)
	}

	fn clean(&self) -> Result<()> {
		self.driver.apply(|conn| {
			if !self.driver.has_table(&self.table) {
				return Ok(());
			}
			conn.execute(&self.sql.delete_all, []).map(|_| ()).map_err(sqlite_error)
		})
	}

	#[instrument(name = "store::sqlite::kv::drop", level = "debug", skip(self), fields(table = %self.table))]
	fn drop_table(&self) -> Result<()> {
		self.driver.apply(|conn| self.driver.drop_table(conn, &self.table))
	}
}

fn escape_like(prefix: &str) -> String {
	let mut escaped = String::with_capacity(prefix.len());
	for c in prefix.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

#[cfg(test)]
mod tests {
	use std::{
		sync::atomic::{AtomicBool, Ordering},
		thread,
	};

	use edgekv_core::{KeyValueExt, encoding::encode};

	use super::*;

	fn store(table: &str) -> (Arc<SqliteDriver>, SqliteKv) {
		let driver = Arc::new(SqliteDriver::in_memory());
		driver.connect().unwrap();
		let kv = SqliteKv::new(driver.clone(), TableName::new(table).unwrap()).unwrap();
		(driver, kv)
	}

	#[test]
	fn test_escape_like() {
		assert_eq!(escape_like("rule_1%"), "rule\\_1\\%");
		assert_eq!(escape_like("plain"), "plain");
	}

	#[test]
	fn test_prefix_is_case_sensitive_and_literal() {
		let (_driver, kv) = store("prefixes");
		kv.set_value("rule_1", &"a".to_string()).unwrap();
		kv.set_value("RULE_2", &"b".to_string()).unwrap();
		kv.set_value("ruleX1", &"c".to_string()).unwrap();

		let found = kv.get_by_prefix("rule_").unwrap();
		assert_eq!(found.len(), 1);
		assert!(found.contains_key("rule_1"));
	}

	#[test]
	fn test_drop_removes_table() {
		let (driver, kv) = store("doomed");
		kv.set_value("k", &"v".to_string()).unwrap();
		kv.drop_table().unwrap();

		let count: i64 = driver
			.apply(|conn| {
				conn.query_row(
					"SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'doomed'",
					[],
					|row| row.get(0),
				)
				.map_err(sqlite_error)
			})
			.unwrap();
		assert_eq!(count, 0);

		assert_eq!(kv.get("k").unwrap(), None);
		assert!(kv.keys().unwrap().is_empty());
		assert!(kv.delete("k").unwrap_err().is_not_found());

		kv.set("k", &encode(&"again".to_string()).unwrap()).unwrap();
		assert_eq!(kv.get_value::<String>("k").unwrap().as_deref(), Some("again"));
	}

	#[test]
	fn test_reads_while_another_instance_drops() {
		let (driver, writer) = store("shared");
		let reader = SqliteKv::new(driver, TableName::new("shared").unwrap()).unwrap();
		let value = encode(&"v".to_string()).unwrap();
		let done = AtomicBool::new(false);

		thread::scope(|s| {
			s.spawn(|| {
				for _ in 0..3000 {
					writer.set("k", &value).unwrap();
					writer.drop_table().unwrap();
				}
				done.store(true, Ordering::Release);
			});
			s.spawn(|| {
				while !done.load(Ordering::Acquire) {
					reader.get("k").unwrap();
					reader.keys().unwrap();
					reader.entries().unwrap();
					reader.clean().unwrap();
					if let Err(err) = reader.delete("k") {
						assert!(err.is_not_found(), "{err}");
					}
				}
			});
		});
	}

	#[test]
	fn test_keyed_state_is_json_text() {
		let (driver, kv) = store("state");
		kv.set_keyed_state("count", &serde_json::json!(12)).unwrap();
		assert_eq!(kv.get_keyed_state("count").unwrap(), Some(serde_json::json!(12)));

		let raw: Vec<u8> = driver
			.apply(|conn| {
				conn.query_row("SELECT val FROM \"state\" WHERE key = 'count'", [], |row| row.get(0))
					.map_err(sqlite_error)
			})
			.unwrap();
		assert_eq!(raw, b"12".to_vec());
	}

	#[test]
	fn test_corrupt_value_fails_decode() {
		let (driver, kv) = store("corrupt");
		driver
			.apply(|conn| {
				conn.execute("INSERT INTO \"corrupt\" (key, val) VALUES ('bad', x'ff00ff')", [])
					.map_err(sqlite_error)
			})
			.unwrap();
		let err = kv.get_value::<String>("bad").unwrap_err();
		assert_eq!(err.code(), "ENC_002");
	}
}
