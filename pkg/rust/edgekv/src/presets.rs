// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ready-made registries for common deployments.

use std::path::PathBuf;

use edgekv_core::config::{BackendType, StoreConfig};
#[cfg(feature = "redis")]
use edgekv_core::config::RedisConfig;
#[cfg(feature = "rocksdb")]
use edgekv_core::config::RocksDbConfig;
#[cfg(feature = "sqlite")]
use edgekv_core::config::SqliteConfig;
use edgekv_registry::StoreRegistry;
use edgekv_type::Result;

/// Every pool in memory. Nothing survives the process.
pub fn memory() -> Result<StoreRegistry> {
	StoreRegistry::setup(&StoreConfig {
		r#type: BackendType::Memory,
		extstate_type: BackendType::Memory,
		..StoreConfig::default()
	})
}

/// Every pool in its own SQLite file under `dir`.
#[cfg(feature = "sqlite")]
pub fn sqlite(dir: impl Into<PathBuf>) -> Result<StoreRegistry> {
	StoreRegistry::setup(&StoreConfig {
		r#type: BackendType::Sqlite,
		extstate_type: BackendType::Sqlite,
		sqlite: SqliteConfig::new(dir),
		..StoreConfig::default()
	})
}

/// General and cache pools in RocksDB, external state in SQLite, both
/// under `dir`.
#[cfg(all(feature = "rocksdb", feature = "sqlite"))]
pub fn rocksdb(dir: impl Into<PathBuf>) -> Result<StoreRegistry> {
	let dir = dir.into();
	StoreRegistry::setup(&StoreConfig {
		r#type: BackendType::RocksDb,
		extstate_type: BackendType::Sqlite,
		rocksdb: RocksDbConfig::new(dir.clone()),
		sqlite: SqliteConfig::new(dir),
		..StoreConfig::default()
	})
}

/// Every pool on one Redis server, separated by namespace.
#[cfg(feature = "redis")]
pub fn redis(host: impl Into<String>, port: u16) -> Result<StoreRegistry> {
	StoreRegistry::setup(&StoreConfig {
		r#type: BackendType::Redis,
		extstate_type: BackendType::Redis,
		redis: RedisConfig {
			host: host.into(),
			port,
			..RedisConfig::default()
		},
		..StoreConfig::default()
	})
}
