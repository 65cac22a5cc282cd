// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use edgekv_core::{Driver, EncodedValue, Monotonic, TableName, Tskv, encoding::keycode};
use edgekv_type::Result;
use rocksdb::{Direction, IteratorMode};
use tracing::instrument;

use super::{RocksDbDriver, delete_prefixed, rocksdb_error};

pub struct RocksDbTs {
	driver: Arc<RocksDbDriver>,
	table: TableName,
	prefix: Vec<u8>,
	last: Monotonic,
}

impl RocksDbTs {
	pub fn new(driver: Arc<RocksDbDriver>, table: TableName) -> Result<Self> {
		let prefix = table.prefix();
		let end = table.prefix_end();
		let max = driver.apply(|db| {
			match db.iterator(IteratorMode::From(&end, Direction::Reverse)).next() {
				Some(item) => {
					let (key, _) = item.map_err(rocksdb_error)?;
					if key.starts_with(&prefix) {
						Ok(Some(keycode::strip_prefixed(&prefix, &key)?))
					} else {
						Ok(None)
					}
				}
				None => Ok(None),
			}
		})?;
		Ok(Self {
			driver,
			table,
			prefix,
			last: Monotonic::recover(max),
		})
	}

	fn key(&self, key: i64) -> Vec<u8> {
		keycode::prefixed(&self.prefix, key)
	}
}

impl Tskv for RocksDbTs {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::rocksdb::ts::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool> {
		self.last.advance(key, || self.driver.apply(|db| db.put(self.key(key), value.as_slice()).map_err(rocksdb_error)))
	}

	#[instrument(name = "store::rocksdb::ts::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: i64) -> Result<Option<EncodedValue>> {
		self.driver.apply(|db| Ok(db.get(self.key(key)).map_err(rocksdb_error)?.map(EncodedValue::new)))
	}

	fn last(&self) -> Result<(i64, Option<EncodedValue>)> {
		let key = self.last.last();
		Ok((key, self.get(key)?))
	}

	fn delete(&self, key: i64) -> Result<()> {
		self.driver.apply(|db| db.delete(self.key(key)).map_err(rocksdb_error))
	}

	#[instrument(name = "store::rocksdb::ts::delete_before", level = "debug", skip(self), fields(table = %self.table))]
	fn delete_before(&self, key: i64) -> Result<()> {
		let end = self.key(key);
		self.driver.apply(|db| delete_prefixed(db, &self.prefix, Some(&end)).map(|_| ()))
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}

	fn drop_table(&self) -> Result<()> {
		self.driver.apply(|db| delete_prefixed(db, &self.prefix, None).map(|_| ()))
	}
}
