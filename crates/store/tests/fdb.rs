// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Needs a reachable FoundationDB cluster through the default cluster file.

#![cfg(feature = "fdb")]

use edgekv_core::config::{BackendType, StoreConfig};
use edgekv_store::{Database, StoreBuilder};
use edgekv_testing::suite;

fn open() -> StoreBuilder {
	StoreBuilder::open(BackendType::Fdb, &StoreConfig::default(), &Database::new("unused", "edgekv_test")).unwrap()
}

#[test]
#[ignore = "requires a running foundationdb cluster"]
fn test_fdb_contract() {
	let builder = open();
	suite::kv::run(|table| builder.create_store(table));
	suite::ts::run(|table| builder.create_ts(table));
	builder.close().unwrap();
}
