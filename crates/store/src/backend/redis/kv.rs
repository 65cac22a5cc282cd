// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use edgekv_core::{Driver, EncodedValue, KeyValue, TableName};
use edgekv_type::{
	Result,
	diagnostic::store::{already_exists, not_found},
	error,
};
use redis::Connection;
use tracing::instrument;

use super::{RedisDriver, escape_glob, redis_error};
use crate::backend::parse_keyed_state;

pub struct RedisKv {
	driver: Arc<RedisDriver>,
	table: TableName,
	/// `<namespace>:<table>:`
	prefix: String,
}

impl RedisKv {
	pub fn new(driver: Arc<RedisDriver>, table: TableName) -> Self {
		let prefix = format!("{}:{}:", driver.namespace(), table);
		Self {
			driver,
			table,
			prefix,
		}
	}

	fn key(&self, key: &str) -> String {
		format!("{}{}", self.prefix, key)
	}

	fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
		self.driver.apply(|conn| redis::cmd("GET").arg(self.key(key)).query(conn).map_err(redis_error))
	}

	fn matching(&self, conn: &mut Connection, prefix: &str) -> Result<Vec<String>> {
		let pattern = format!("{}{}*", escape_glob(&self.prefix), escape_glob(prefix));
		redis::cmd("KEYS").arg(pattern).query(conn).map_err(redis_error)
	}

	fn collect(&self, prefix: &str) -> Result<Vec<(String, EncodedValue)>> {
		self.driver.apply(|conn| {
			let keys = self.matching(conn, prefix)?;
			if keys.is_empty() {
				return Ok(Vec::new());
			}
			let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET").arg(&keys).query(conn).map_err(redis_error)?;
			Ok(keys
				.into_iter()
				.zip(values)
				// a key may expire or be deleted between KEYS and MGET
				.filter_map(|(key, value)| {
					value.map(|v| (key[self.prefix.len()..].to_string(), EncodedValue::new(v)))
				})
				.collect())
		})
	}

	fn delete_matching(&self) -> Result<()> {
		self.driver.apply(|conn| {
			let keys = self.matching(conn, "")?;
			if keys.is_empty() {
				return Ok(());
			}
			redis::cmd("DEL").arg(&keys).query::<i64>(conn).map(|_| ()).map_err(redis_error)
		})
	}
}

impl KeyValue for RedisKv {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::redis::kv::setnx", level = "debug", skip(self, value), fields(table = %self.table))]
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		let inserted: bool = self.driver.apply(|conn| {
			redis::cmd("SETNX").arg(self.key(key)).arg(value.as_slice()).query(conn).map_err(redis_error)
		})?;
		if !inserted {
			return Err(error!(already_exists(&self.table, key)));
		}
		Ok(())
	}

	#[instrument(name = "store::redis::kv::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.driver.apply(|conn| {
			redis::cmd("SET").arg(self.key(key)).arg(value.as_slice()).query(conn).map_err(redis_error)
		})
	}

	#[instrument(name = "store::redis::kv::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		Ok(self.get_raw(key)?.map(EncodedValue::new))
	}

	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
		self.get_raw(key)?.map(|bytes| parse_keyed_state(&bytes)).transpose()
	}

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
		self.driver.apply(|conn| {
			redis::cmd("SET").arg(self.key(key)).arg(value.to_string()).query(conn).map_err(redis_error)
		})
	}

	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		Ok(self.collect(prefix)?.into_iter().collect())
	}

	#[instrument(name = "store::redis::kv::delete", level = "debug", skip(self), fields(table = %self.table))]
	fn delete(&self, key: &str) -> Result<()> {
		let deleted: i64 =
			self.driver.apply(|conn| redis::cmd("DEL").arg(self.key(key)).query(conn).map_err(redis_error))?;
		if deleted == 0 {
			return Err(error!(not_found(&self.table, key)));
		}
		Ok(())
	}

	fn keys(&self) -> Result<Vec<String>> {
		self.driver.apply(|conn| {
			Ok(self.matching(conn, "")?.into_iter().map(|key| key[self.prefix.len()..].to_string()).collect())
		})
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		self.collect("")
	}

	fn clean(&self) -> Result<()> {
		self.delete_matching()
	}

	fn drop_table(&self) -> Result<()> {
		self.delete_matching()
	}
}
