// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use edgekv_type::Result;

use crate::encoding::{EncodedValue, Registered, TypeRegistry, decode, encode};

/// Point key/value records inside one logical table.
///
/// Values are opaque bytes produced by the Value Encoder; the typed
/// helpers live on [`KeyValueExt`].
pub trait KeyValue: Send + Sync {
	fn table(&self) -> &str;

	/// Inserts only if absent, failing with `STORE_002` otherwise.
	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()>;

	fn set(&self, key: &str, value: &EncodedValue) -> Result<()>;

	fn get(&self, key: &str) -> Result<Option<EncodedValue>>;

	/// Scalar state stored as JSON text, bypassing the envelope.
	fn get_keyed_state(&self, key: &str) -> Result<Option<serde_json::Value>>;

	fn set_keyed_state(&self, key: &str, value: &serde_json::Value) -> Result<()>;

	/// Every record whose key starts with `prefix`, values still encoded.
	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>>;

	/// Fails with `STORE_001` if the key does not exist.
	fn delete(&self, key: &str) -> Result<()>;

	/// Order is backend defined.
	fn keys(&self) -> Result<Vec<String>>;

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>>;

	/// Removes every record; the table remains.
	fn clean(&self) -> Result<()>;

	/// Removes every record and the table itself.
	fn drop_table(&self) -> Result<()>;
}

pub trait KeyValueExt: KeyValue {
	fn setnx_value<T: Registered>(&self, key: &str, value: &T) -> Result<()> {
		self.setnx(key, &encode(value)?)
	}

	fn set_value<T: Registered>(&self, key: &str, value: &T) -> Result<()> {
		self.set(key, &encode(value)?)
	}

	fn get_value<T: Registered>(&self, key: &str) -> Result<Option<T>> {
		match self.get(key)? {
			Some(value) => Ok(Some(decode(&value)?)),
			None => Ok(None),
		}
	}

	/// All records decoded as strings. A single undecodable record fails
	/// the whole call.
	fn all(&self) -> Result<HashMap<String, String>> {
		self.entries()?
			.into_iter()
			.map(|(key, value)| -> Result<(String, String)> { Ok((key, decode::<String>(&value)?)) })
			.collect()
	}

	/// All records rendered through `registry`, whatever their type.
	fn all_with(&self, registry: &TypeRegistry) -> Result<HashMap<String, String>> {
		self.entries()?
			.into_iter()
			.map(|(key, value)| -> Result<(String, String)> { Ok((key, registry.render(&value)?)) })
			.collect()
	}
}

impl<K: KeyValue + ?Sized> KeyValueExt for K {}
