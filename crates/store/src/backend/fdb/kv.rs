// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use edgekv_core::{EncodedValue, KeyValue, TableName};
use edgekv_type::{
	Result,
	diagnostic::{
		encoding::decode_failed,
		store::{already_exists, not_found},
	},
	error,
};
use foundationdb::{RangeOption, tuple::Subspace};
use tracing::instrument;

use super::{FdbDriver, read_range};
use crate::backend::parse_keyed_state;

pub struct FdbKv {
	driver: Arc<FdbDriver>,
	table: TableName,
	subspace: Subspace,
}

impl FdbKv {
	pub fn new(driver: Arc<FdbDriver>, table: TableName) -> Self {
		let subspace = driver.subspace("KV", &table);
		Self {
			driver,
			table,
			subspace,
		}
	}

	fn key(&self, key: &str) -> Vec<u8> {
		self.subspace.pack(&key)
	}

	/// Range of packed string keys starting with `prefix`.
	fn prefix_range(&self, prefix: &str) -> RangeOption<'static> {
		let mut begin = self.subspace.bytes().to_vec();
		// tuple string code, then the escaped utf-8 bytes
		begin.push(0x02);
		for byte in prefix.bytes() {
			begin.push(byte);
			if byte == 0x00 {
				begin.push(0xff);
			}
		}
		let mut end = begin.clone();
		end.push(0xff);
		RangeOption::from((begin, end))
	}

	fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let key = self.key(key);
		self.driver.run(|trx| {
			let key = key.clone();
			async move { Ok(trx.get(&key, false).await?.map(|v| v.to_vec())) }
		})
	}

	fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
		let key = self.key(key);
		self.driver.run(|trx| {
			trx.set(&key, &value);
			async move { Ok(()) }
		})
	}

	fn collect(&self, prefix: &str) -> Result<Vec<(String, EncodedValue)>> {
		let rows = self.driver.run(|trx| {
			let range = self.prefix_range(prefix);
			async move { read_range(&trx, range).await }
		})?;
		rows.into_iter()
			.map(|(key, value)| {
				let key: String = self
					.subspace
					.unpack(&key)
					.map_err(|e| error!(decode_failed(format!("stored key: {:?}", e))))?;
				Ok((key, EncodedValue::new(value)))
			})
			.collect()
	}
}

impl KeyValue for FdbKv {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::fdb::kv::setnx", level = "debug", skip(self, value), fields(table = %self.table))]
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		let physical = self.key(key);
		let inserted = self.driver.run(|trx| {
			let physical = physical.clone();
			let value = value.to_vec();
			async move {
				if trx.get(&physical, false).await?.is_some() {
					return Ok(false);
				}
				trx.set(&physical, &value);
				Ok(true)
			}
		})?;
		if !inserted {
			return Err(error!(already_exists(&self.table, key)));
		}
		Ok(())
	}

	#[instrument(name = "store::fdb::kv::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.put(key, value.to_vec())
	}

	#[instrument(name = "store::fdb::kv::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		Ok(self.get_raw(key)?.map(EncodedValue::new))
	}

	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
		self.get_raw(key)?.map(|bytes| parse_keyed_state(&bytes)).transpose()
	}

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
		self.put(key, value.to_string().into_bytes())
	}

	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		Ok(self.collect(prefix)?.into_iter().collect())
	}

	#[instrument(name = "store::fdb::kv::delete", level = "debug", skip(self), fields(table = %self.table))]
	fn delete(&self, key: &str) -> Result<()> {
		let physical = self.key(key);
		let deleted = self.driver.run(|trx| {
			let physical = physical.clone();
			async move {
				if trx.get(&physical, false).await?.is_none() {
					return Ok(false);
				}
				trx.clear(&physical);
				Ok(true)
			}
		})?;
		if !deleted {
			return Err(error!(not_found(&self.table, key)));
		}
		Ok(())
	}

	fn keys(&self) -> Result<Vec<String>> {
		Ok(self.collect("")?.into_iter().map(|(key, _)| key).collect())
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		self.collect("")
	}

	fn clean(&self) -> Result<()> {
		let (begin, end) = self.subspace.range();
		self.driver.run(|trx| {
			trx.clear_range(&begin, &end);
			async move { Ok(()) }
		})
	}

	fn drop_table(&self) -> Result<()> {
		self.clean()
	}
}
