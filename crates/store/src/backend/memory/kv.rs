// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, ops::Bound, sync::Arc};

use edgekv_core::{Driver, EncodedValue, KeyValue, TableName};
use edgekv_type::{
	Result,
	diagnostic::store::{already_exists, not_found},
	error,
};
use tracing::instrument;

use super::{MemoryDriver, MemoryState};
use crate::backend::parse_keyed_state;

pub struct MemoryKv {
	driver: Arc<MemoryDriver>,
	table: TableName,
}

impl MemoryKv {
	pub fn new(driver: Arc<MemoryDriver>, table: TableName) -> Self {
		Self {
			driver,
			table,
		}
	}

	fn id(&self, key: &str) -> (String, String) {
		(self.table.to_string(), key.to_string())
	}

	fn rows<'a>(&self, state: &'a MemoryState, prefix: &str) -> impl Iterator<Item = (&'a String, &'a Vec<u8>)> {
		let table = self.table.to_string();
		let start = (table.clone(), prefix.to_string());
		let prefix = prefix.to_string();
		state.kv
			.range((Bound::Included(start), Bound::Unbounded))
			.take_while(move |((t, k), _)| *t == table && k.starts_with(&prefix))
			.map(|((_, k), v)| (k, v))
	}
}

impl KeyValue for MemoryKv {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::memory::kv::setnx", level = "debug", skip(self, value), fields(table = %self.table))]
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.driver.apply(|state| {
			let id = self.id(key);
			if state.kv.contains_key(&id) {
				return Err(error!(already_exists(&self.table, key)));
			}
			state.kv.insert(id, value.to_vec());
			Ok(())
		})
	}

	#[instrument(name = "store::memory::kv::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.driver.apply(|state| {
			state.kv.insert(self.id(key), value.to_vec());
			Ok(())
		})
	}

	#[instrument(name = "store::memory::kv::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		self.driver.apply(|state| Ok(state.kv.get(&self.id(key)).map(|v| EncodedValue::new(v.clone()))))
	}

	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
		let raw = self.driver.apply(|state| Ok(state.kv.get(&self.id(key)).cloned()))?;
		raw.map(|bytes| parse_keyed_state(&bytes)).transpose()
	}

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
		self.driver.apply(|state| {
			state.kv.insert(self.id(key), value.to_string().into_bytes());
			Ok(())
		})
	}

	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		self.driver.apply(|state| {
			Ok(self.rows(state, prefix).map(|(k, v)| (k.clone(), EncodedValue::new(v.clone()))).collect())
		})
	}

	#[instrument(name = "store::memory::kv::delete", level = "debug", skip(self), fields(table = %self.table))]
	fn delete(&self, key: &str) -> Result<()> {
		self.driver.apply(|state| match state.kv.remove(&self.id(key)) {
			Some(_) => Ok(()),
			None => Err(error!(not_found(&self.table, key))),
		})
	}

	fn keys(&self) -> Result<Vec<String>> {
		self.driver.apply(|state| Ok(self.rows(state, "").map(|(k, _)| k.clone()).collect()))
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		self.driver.apply(|state| {
			Ok(self.rows(state, "").map(|(k, v)| (k.clone(), EncodedValue::new(v.clone()))).collect())
		})
	}

	fn clean(&self) -> Result<()> {
		self.driver.apply(|state| {
			state.kv.retain(|(t, _), _| t != self.table.as_str());
			Ok(())
		})
	}

	fn drop_table(&self) -> Result<()> {
		self.clean()
	}
}
