// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use edgekv_core::KeyValueExt;
use edgekv_store::StoreBuilder;
use edgekv_testing::suite;

#[test]
fn test_memory_kv_contract() {
	let builder = StoreBuilder::memory().unwrap();
	suite::kv::run(|table| builder.create_store(table));
}

#[test]
fn test_memory_ts_contract() {
	let builder = StoreBuilder::memory().unwrap();
	suite::ts::run(|table| builder.create_ts(table));
}

#[test]
fn test_memory_builders_do_not_share_data() {
	let first = StoreBuilder::memory().unwrap();
	let second = StoreBuilder::memory().unwrap();
	first.create_store("rules").unwrap().set_value("k", &"v".to_string()).unwrap();
	assert_eq!(second.create_store("rules").unwrap().get("k").unwrap(), None);
}
