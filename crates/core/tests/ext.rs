// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, HashMap};

use edgekv_core::{
	EncodedValue, KeyValue, KeyValueExt, Result, TypeRegistry,
	encoding::encode,
};
use edgekv_type::{diagnostic::store::not_found, error};
use parking_lot::Mutex;

#[derive(Default)]
struct MapStore {
	rows: Mutex<BTreeMap<String, EncodedValue>>,
}

impl KeyValue for MapStore {
	fn table(&self) -> &str {
		"map"
	}

	fn setnx(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.rows.lock().entry(key.to_string()).or_insert_with(|| value.clone());
		Ok(())
	}

	fn set(&self, key: &str, value: &EncodedValue) -> Result<()> {
		self.rows.lock().insert(key.to_string(), value.clone());
		Ok(())
	}

	fn get(&self, key: &str) -> Result<Option<EncodedValue>> {
		Ok(self.rows.lock().get(key).cloned())
	}

	fn get_keyed_state(&self, _key: &str) -> Result<Option<serde_json::Value>> {
		Ok(None)
	}

	fn set_keyed_state(&self, _key: &str, _value: &serde_json::Value) -> Result<()> {
		Ok(())
	}

	fn get_by_prefix(&self, prefix: &str) -> Result<HashMap<String, EncodedValue>> {
		Ok(self.rows.lock().iter().filter(|(k, _)| k.starts_with(prefix)).map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn delete(&self, key: &str) -> Result<()> {
		self.rows.lock().remove(key).map(|_| ()).ok_or_else(|| error!(not_found("map", key)))
	}

	fn keys(&self) -> Result<Vec<String>> {
		Ok(self.rows.lock().keys().cloned().collect())
	}

	fn entries(&self) -> Result<Vec<(String, EncodedValue)>> {
		Ok(self.rows.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn clean(&self) -> Result<()> {
		self.rows.lock().clear();
		Ok(())
	}

	fn drop_table(&self) -> Result<()> {
		self.clean()
	}
}

#[test]
fn test_typed_round_trip_through_trait_object() {
	let store: Box<dyn KeyValue> = Box::new(MapStore::default());
	store.set_value("count", &7u64).unwrap();
	store.set_value("name", &"edge".to_string()).unwrap();

	assert_eq!(store.get_value::<u64>("count").unwrap(), Some(7));
	assert_eq!(store.get_value::<String>("name").unwrap().as_deref(), Some("edge"));
	assert_eq!(store.get_value::<String>("missing").unwrap(), None);
}

#[test]
fn test_all_fails_on_non_string_value() {
	let store = MapStore::default();
	store.set_value("a", &"1".to_string()).unwrap();
	store.set_value("b", &2i64).unwrap();

	let err = store.all().unwrap_err();
	assert_eq!(err.code(), "ENC_003");
}

#[test]
fn test_all_with_registry_renders_every_type() {
	let store = MapStore::default();
	store.set_value("a", &"1".to_string()).unwrap();
	store.set_value("b", &2i64).unwrap();
	store.set("c", &encode(&true).unwrap()).unwrap();

	let all = store.all_with(&TypeRegistry::with_builtins()).unwrap();
	assert_eq!(all.len(), 3);
	assert_eq!(all["a"], "1");
	assert_eq!(all["b"], "2");
	assert_eq!(all["c"], "true");
}
