// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use edgekv_core::{Driver, EncodedValue, KeyValue, TableName};
use edgekv_type::{
	Result,
	diagnostic::store::{already_exists, not_found},
	error,
};
use tracing::instrument;

use super::{RocksDbDriver, delete_prefixed, rocksdb_error, scan};
use crate::backend::{parse_keyed_state, utf8_key};

pub struct RocksDbKv {
	driver: Arc<RocksDbDriver>,
	table: TableName,
	prefix: Vec<u8>,
}

impl RocksDbKv {
	pub fn new(driver: Arc<RocksDbDriver>, table: TableName) -> Self {
		let prefix = table.prefix();
		Self {
			driver,
			table,
			prefix,
		}
	}

	fn key(&self, key: &str) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.prefix.len() + key.len());
		out.extend_from_slice(&self.prefix);
		out.extend_from_slice(key.as_bytes());
		out
	}

	fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
		self.driver.apply(|db| db.get(self.key(key)).map_err(rocksdb_error))
	}

	fn collect(&self, prefix: &str) -> Result<Vec<(String, EncodedValue)>> {
		let start = self.key(prefix);
		self.driver.apply(|db| {
			let mut rows = Vec::new();
			scan(db, &start, &start, |key, value| {
				rows.push((utf8_key(&key[self.prefix.len()..])?, EncodedValue::new(value)));
				Ok(true)
			})?;
			Ok(rows)
		})
	}
}

impl KeyValue for RocksDbKv {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::rocksdb::kv::setnx", level = "debug", skip(self, value), fields(table = %self.table))]
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		let physical = self.key(key);
		self.driver.apply(|db| {
			if db.get_pinned(&physical).map_err(rocksdb_error)?.is_some() {
				return Err(error!(already_exists(&self.table, key)));
			}
			db.put(&physical, value.as_slice()).map_err(rocksdb_error)
		})
	}

	#[instrument(name = "store::rocksdb::kv::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.driver.apply(|db| db.put(self.key(key), value.as_slice()).map_err(rocksdb_error))
	}

	#[instrument(name = "store::rocksdb::kv::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		Ok(self.get_raw(key)?.map(EncodedValue::new))
	}

	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
		self.get_raw(key)?.map(|bytes| parse_keyed_state(&bytes)).transpose()
	}

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
		self.driver.apply(|db| db.put(self.key(key), value.to_string()).map_err(rocksdb_error))
	}

	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		Ok(self.collect(prefix)?.into_iter().collect())
	}

	#[instrument(name = "store::rocksdb::kv::delete", level = "debug", skip(self), fields(table = %self.table))]
	fn delete(&self, key: &str) -> Result<()> {
		let physical = self.key(key);
		self.driver.apply(|db| {
			if db.get_pinned(&physical).map_err(rocksdb_error)?.is_none() {
				return Err(error!(not_found(&self.table, key)));
			}
			db.delete(&physical).map_err(rocksdb_error)
		})
	}

	fn keys(&self) -> Result<Vec<String>> {
		Ok(self.collect("")?.into_iter().map(|(key, _)| key).collect())
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		self.collect("")
	}

	#[instrument(name = "store::rocksdb::kv::clean", level = "debug", skip(self), fields(table = %self.table))]
	fn clean(&self) -> Result<()> {
		self.driver.apply(|db| delete_prefixed(db, &self.prefix, None).map(|_| ()))
	}

	fn drop_table(&self) -> Result<()> {
		self.clean()
	}
}
