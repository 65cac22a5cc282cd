// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use edgekv_core::{Driver, EncodedValue, Monotonic, TableName, Tskv};
use edgekv_type::Result;
use tracing::instrument;

use super::MemoryDriver;

pub struct MemoryTs {
	driver: Arc<MemoryDriver>,
	table: TableName,
	last: Monotonic,
}

impl MemoryTs {
	pub fn new(driver: Arc<MemoryDriver>, table: TableName) -> Result<Self> {
		let max = driver.apply(|state| {
			Ok(state.ts
				.range((table.to_string(), i64::MIN)..=(table.to_string(), i64::MAX))
				.next_back()
				.map(|((_, key), _)| *key))
		})?;
		Ok(Self {
			driver,
			table,
			last: Monotonic::recover(max),
		})
	}

	fn remove_where(&self, doomed: impl Fn(i64) -> bool) -> Result<()> {
		let table = self.table.as_str();
		self.driver.apply(|state| {
			state.ts.retain(|(t, key), _| t != table || !doomed(*key));
			Ok(())
		})
	}
}

impl Tskv for MemoryTs {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::memory::ts::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool> {
		self.last.advance(key, || {
			self.driver.apply(|state| {
				state.ts.insert((self.table.to_string(), key), value.to_vec());
				Ok(())
			})
		})
	}

	fn get(&self, key: i64) -> Result<Option<EncodedValue>> {
		self.driver
			.apply(|state| Ok(state.ts.get(&(self.table.to_string(), key)).map(|v| EncodedValue::new(v.clone()))))
	}

	fn last(&self) -> Result<(i64, Option<EncodedValue>)> {
		let key = self.last.last();
		Ok((key, self.get(key)?))
	}

	fn delete(&self, key: i64) -> Result<()> {
		self.driver.apply(|state| {
			state.ts.remove(&(self.table.to_string(), key));
			Ok(())
		})
	}

	#[instrument(name = "store::memory::ts::delete_before", level = "debug", skip(self), fields(table = %self.table))]
	fn delete_before(&self, key: i64) -> Result<()> {
		self.remove_where(|k| k < key)
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}

	fn drop_table(&self) -> Result<()> {
		self.remove_where(|_| true)
	}
}
