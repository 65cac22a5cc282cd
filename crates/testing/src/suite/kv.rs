// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc, thread};

use edgekv_core::{KeyValue, KeyValueExt, Result, TypeRegistry, encoding::encode};
use serde_json::json;

use crate::unique_table;

pub type Open<'a> = &'a dyn Fn(&str) -> Result<Arc<dyn KeyValue>>;

pub fn run(open: impl Fn(&str) -> Result<Arc<dyn KeyValue>>) {
	crate::init_tracing();
	let open: Open<'_> = &open;
	setnx(open);
	set(open);
	get(open);
	delete(open);
	keys(open, 10);
	all(open, 10);
	keyed_state(open);
	get_by_prefix(open);
	clean(open);
	drop_table(open);
	table_isolation(open);
	shared_table(open);
	setnx_race(open, 16);
}

fn store(open: Open<'_>, prefix: &str) -> Arc<dyn KeyValue> {
	open(&unique_table(prefix)).unwrap()
}

pub fn setnx(open: Open<'_>) {
	let kv = store(open, "kv_setnx");
	kv.setnx_value("foo", &"bar".to_string()).unwrap();

	let err = kv.setnx_value("foo", &"bar1".to_string()).unwrap_err();
	assert!(err.is_already_exists(), "{err}");
	assert_eq!(kv.get_value::<String>("foo").unwrap().as_deref(), Some("bar"));
}

pub fn set(open: Open<'_>) {
	let kv = store(open, "kv_set");
	kv.set_value("foo", &"bar".to_string()).unwrap();
	kv.set_value("foo", &"bar1".to_string()).unwrap();
	assert_eq!(kv.get_value::<String>("foo").unwrap().as_deref(), Some("bar1"));
}

pub fn get(open: Open<'_>) {
	let kv = store(open, "kv_get");
	kv.set_value("count", &42i64).unwrap();
	kv.set_value("flag", &true).unwrap();

	assert_eq!(kv.get_value::<i64>("count").unwrap(), Some(42));
	assert_eq!(kv.get_value::<bool>("flag").unwrap(), Some(true));
	assert_eq!(kv.get_value::<String>("missing").unwrap(), None);
	assert_eq!(kv.get("missing").unwrap(), None);
	assert_eq!(kv.get_value::<String>("count").unwrap_err().code(), "ENC_003");
}

pub fn delete(open: Open<'_>) {
	let kv = store(open, "kv_delete");
	kv.setnx_value("foo", &"bar".to_string()).unwrap();
	kv.delete("foo").unwrap();
	assert_eq!(kv.get("foo").unwrap(), None);

	let err = kv.delete("foo").unwrap_err();
	assert!(err.is_not_found(), "{err}");
	assert!(kv.delete("never").unwrap_err().is_not_found());
}

pub fn keys(open: Open<'_>, n: usize) {
	let kv = store(open, "kv_keys");
	for i in 0..n {
		kv.setnx_value(&format!("key{i}"), &format!("value{i}")).unwrap();
	}
	let mut keys = kv.keys().unwrap();
	keys.sort();
	let mut expected: Vec<String> = (0..n).map(|i| format!("key{i}")).collect();
	expected.sort();
	assert_eq!(keys, expected);
}

pub fn all(open: Open<'_>, n: usize) {
	let kv = store(open, "kv_all");
	let mut expected = HashMap::new();
	for i in 0..n {
		kv.setnx_value(&format!("key{i}"), &format!("value{i}")).unwrap();
		expected.insert(format!("key{i}"), format!("value{i}"));
	}
	assert_eq!(kv.all().unwrap(), expected);
	assert_eq!(kv.entries().unwrap().len(), n);
	assert_eq!(kv.all_with(&TypeRegistry::with_builtins()).unwrap(), expected);
}

pub fn keyed_state(open: Open<'_>) {
	let kv = store(open, "kv_state");
	assert_eq!(kv.get_keyed_state("count").unwrap(), None);

	kv.set_keyed_state("count", &json!(41)).unwrap();
	kv.set_keyed_state("count", &json!(42)).unwrap();
	kv.set_keyed_state("name", &json!("sensor")).unwrap();
	kv.set_keyed_state("window", &json!({"start": 1, "end": 2})).unwrap();

	assert_eq!(kv.get_keyed_state("count").unwrap(), Some(json!(42)));
	assert_eq!(kv.get_keyed_state("name").unwrap(), Some(json!("sensor")));
	assert_eq!(kv.get_keyed_state("window").unwrap(), Some(json!({"start": 1, "end": 2})));
}

pub fn get_by_prefix(open: Open<'_>) {
	let kv = store(open, "kv_prefix");
	for key in ["rule1_a", "rule1_b", "rule10_a", "rule2_a", "other"] {
		kv.set_value(key, &key.to_string()).unwrap();
	}

	let found = kv.get_by_prefix("rule1_").unwrap();
	let mut keys: Vec<&String> = found.keys().collect();
	keys.sort();
	assert_eq!(keys, vec!["rule1_a", "rule1_b"]);
	assert_eq!(found["rule1_a"], encode(&"rule1_a".to_string()).unwrap());

	assert_eq!(kv.get_by_prefix("rule").unwrap().len(), 4);
	assert!(kv.get_by_prefix("nothing").unwrap().is_empty());
	assert_eq!(kv.get_by_prefix("").unwrap().len(), 5);
}

pub fn clean(open: Open<'_>) {
	let kv = store(open, "kv_clean");
	kv.set_value("k1", &"v1".to_string()).unwrap();
	kv.set_value("k2", &"v2".to_string()).unwrap();
	kv.clean().unwrap();
	assert!(kv.keys().unwrap().is_empty());

	kv.setnx_value("k1", &"again".to_string()).unwrap();
	assert_eq!(kv.get_value::<String>("k1").unwrap().as_deref(), Some("again"));
}

pub fn drop_table(open: Open<'_>) {
	let kv = store(open, "kv_drop");
	kv.set_value("k1", &"v1".to_string()).unwrap();
	kv.set_value("k2", &"v2".to_string()).unwrap();
	kv.drop_table().unwrap();

	assert!(kv.keys().unwrap().is_empty());
	assert_eq!(kv.get("k1").unwrap(), None);
	assert_eq!(kv.get("k2").unwrap(), None);
	assert!(kv.all().unwrap().is_empty());
}

/// `rule` must not see keys of `rule2`.
pub fn table_isolation(open: Open<'_>) {
	let base = unique_table("kv_iso");
	let rule = open(&base).unwrap();
	let rule2 = open(&format!("{base}2")).unwrap();

	rule.set_value("a", &"1".to_string()).unwrap();
	rule2.set_value("a", &"2".to_string()).unwrap();
	rule2.set_value("b", &"3".to_string()).unwrap();

	assert_eq!(rule.keys().unwrap(), vec!["a".to_string()]);
	assert_eq!(rule.get_value::<String>("a").unwrap().as_deref(), Some("1"));

	rule.drop_table().unwrap();
	assert_eq!(rule2.keys().unwrap().len(), 2);
}

/// Two instances over one table see each other's writes.
pub fn shared_table(open: Open<'_>) {
	let table = unique_table("kv_shared");
	let first = open(&table).unwrap();
	let second = open(&table).unwrap();

	first.setnx_value("k", &"v".to_string()).unwrap();
	assert!(second.setnx_value("k", &"w".to_string()).unwrap_err().is_already_exists());
	assert_eq!(second.get_value::<String>("k").unwrap().as_deref(), Some("v"));
}

/// `n` threads race `setnx` on one key; exactly one of them wins.
pub fn setnx_race(open: Open<'_>, n: usize) {
	let kv = store(open, "kv_setnx_race");
	let results: Vec<(String, Result<()>)> = thread::scope(|s| {
		let handles: Vec<_> = (0..n)
			.map(|i| {
				let kv = kv.clone();
				s.spawn(move || {
					let node = format!("node{i}");
					let result = kv.setnx_value("leader", &node);
					(node, result)
				})
			})
			.collect();
		handles.into_iter().map(|h| h.join().unwrap()).collect()
	});

	let mut winners = Vec::new();
	for (node, result) in results {
		match result {
			Ok(()) => winners.push(node),
			Err(err) => assert!(err.is_already_exists(), "{err}"),
		}
	}
	assert_eq!(winners.len(), 1, "winners: {winners:?}");
	assert_eq!(kv.get_value::<String>("leader").unwrap(), winners.pop());
}
