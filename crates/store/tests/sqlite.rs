// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg(feature = "sqlite")]

use std::path::Path;

use edgekv_core::{
	KeyValueExt, TskvExt,
	config::{BackendType, JournalMode, SqliteConfig, StoreConfig, SynchronousMode},
};
use edgekv_store::{Database, StoreBuilder};
use edgekv_testing::{suite, tempdir::temp_dir};

fn open(path: &Path) -> StoreBuilder {
	let config = StoreConfig {
		sqlite: SqliteConfig::new(path),
		..StoreConfig::default()
	};
	StoreBuilder::open(BackendType::Sqlite, &config, &Database::new("sqliteKV.db", "kv")).unwrap()
}

#[test]
fn test_sqlite_kv_contract() {
	temp_dir(|path| {
		let builder = open(path);
		suite::kv::run(|table| builder.create_store(table));
		builder.close().unwrap();
		Ok(())
	})
	.expect("test failed");
}

#[test]
fn test_sqlite_ts_contract() {
	temp_dir(|path| {
		let builder = open(path);
		suite::ts::run(|table| builder.create_ts(table));
		builder.close().unwrap();
		Ok(())
	})
	.expect("test failed");
}

#[test]
fn test_sqlite_survives_reopen() {
	temp_dir(|path| {
		let builder = open(path);
		builder.create_store("rules").unwrap().set_value("rule1", &"SELECT * FROM demo".to_string()).unwrap();
		assert!(builder.create_ts("checkpoints").unwrap().set_value(1000, &"snap".to_string()).unwrap());
		builder.close().unwrap();

		let builder = open(path);
		let kv = builder.create_store("rules").unwrap();
		assert_eq!(kv.get_value::<String>("rule1").unwrap().as_deref(), Some("SELECT * FROM demo"));
		let ts = builder.create_ts("checkpoints").unwrap();
		assert_eq!(ts.last_value::<String>().unwrap(), (1000, Some("snap".to_string())));
		builder.close().unwrap();
		Ok(())
	})
	.expect("test failed");
}

#[test]
fn test_sqlite_custom_modes() {
	temp_dir(|path| {
		let config = StoreConfig {
			sqlite: SqliteConfig::new(path)
				.journal_mode(JournalMode::Delete)
				.synchronous_mode(SynchronousMode::Full),
			..StoreConfig::default()
		};
		let builder = StoreBuilder::open(BackendType::Sqlite, &config, &Database::new("modes.db", "kv")).unwrap();
		builder.create_store("rules").unwrap().set_value("k", &1i64).unwrap();
		assert!(path.join("modes.db").exists());
		builder.close().unwrap();
		Ok(())
	})
	.expect("test failed");
}

#[test]
fn test_sqlite_rejects_invalid_table() {
	temp_dir(|path| {
		let builder = open(path);
		let err = builder.create_store("1_abc").err().unwrap();
		assert_eq!(err.code(), "CFG_003");
		let err = builder.create_ts("1_abc").err().unwrap();
		assert_eq!(err.code(), "CFG_003");
		builder.close().unwrap();
		Ok(())
	})
	.expect("test failed");
}
