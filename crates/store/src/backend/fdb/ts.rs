// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use edgekv_core::{EncodedValue, Monotonic, TableName, Tskv};
use edgekv_type::{Result, diagnostic::encoding::decode_failed, error};
use foundationdb::{RangeOption, tuple::Subspace};
use tracing::instrument;

use super::FdbDriver;

pub struct FdbTs {
	driver: Arc<FdbDriver>,
	table: TableName,
	subspace: Subspace,
	last: Monotonic,
}

impl FdbTs {
	pub fn new(driver: Arc<FdbDriver>, table: TableName) -> Result<Self> {
		let subspace = driver.subspace("TS", &table);
		let last_key = driver.run(|trx| {
			let mut range = RangeOption::from(subspace.range());
			range.limit = Some(1);
			range.reverse = true;
			async move {
				let values = trx.get_range(&range, 1, false).await?;
				Ok(values.iter().next().map(|kv| kv.key().to_vec()))
			}
		})?;
		let max = match last_key {
			Some(key) => Some(
				subspace.unpack::<i64>(&key).map_err(|e| error!(decode_failed(format!("stored key: {:?}", e))))?,
			),
			None => None,
		};
		Ok(Self {
			driver,
			table,
			subspace,
			last: Monotonic::recover(max),
		})
	}

	fn key(&self, key: i64) -> Vec<u8> {
		self.subspace.pack(&key)
	}

	fn clear_range(&self, begin: Vec<u8>, end: Vec<u8>) -> Result<()> {
		self.driver.run(|trx| {
			trx.clear_range(&begin, &end);
			async move { Ok(()) }
		})
	}
}

impl Tskv for FdbTs {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::fdb::ts::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool> {
		let physical = self.key(key);
		self.last.advance(key, || {
			self.driver.run(|trx| {
				trx.set(&physical, value.as_slice());
				async move { Ok(()) }
			})
		})
	}

	#[instrument(name = "store::fdb::ts::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: i64) -> Result<Option<EncodedValue>> {
		let physical = self.key(key);
		self.driver.run(|trx| {
			let physical = physical.clone();
			async move { Ok(trx.get(&physical, false).await?.map(|v| EncodedValue::new(v.to_vec()))) }
		})
	}

	fn last(&self) -> Result<(i64, Option<EncodedValue>)> {
		let key = self.last.last();
		Ok((key, self.get(key)?))
	}

	fn delete(&self, key: i64) -> Result<()> {
		let physical = self.key(key);
		self.driver.run(|trx| {
			trx.clear(&physical);
			async move { Ok(()) }
		})
	}

	#[instrument(name = "store::fdb::ts::delete_before", level = "debug", skip(self), fields(table = %self.table))]
	fn delete_before(&self, key: i64) -> Result<()> {
		let (begin, _) = self.subspace.range();
		self.clear_range(begin, self.key(key))
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}

	fn drop_table(&self) -> Result<()> {
		let (begin, end) = self.subspace.range();
		self.clear_range(begin, end)
	}
}
