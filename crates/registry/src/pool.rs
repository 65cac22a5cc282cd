// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt;

use edgekv_core::config::{BackendType, StoreConfig};
use edgekv_store::Database;

/// One of the registry's independent store groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Pool {
	/// Rule and stream state.
	General = 0,
	/// Sink caches, dropped in bulk per rule.
	Cache = 1,
	/// State owned by external plugins. May use a different backend.
	ExtState = 2,
}

impl Pool {
	pub const ALL: [Pool; 3] = [Pool::General, Pool::Cache, Pool::ExtState];

	pub fn as_str(&self) -> &'static str {
		match self {
			Pool::General => "general",
			Pool::Cache => "cache",
			Pool::ExtState => "extState",
		}
	}

	pub(crate) fn index(self) -> usize {
		self as usize
	}

	/// The backend configured for this pool.
	pub fn backend(&self, config: &StoreConfig) -> BackendType {
		match self {
			Pool::General | Pool::Cache => config.r#type,
			Pool::ExtState => config.extstate_type,
		}
	}

	/// Physical database for this pool on `backend`.
	///
	/// Embedded backends get one file or directory per pool. Server
	/// backends share one keyspace and separate pools by namespace.
	pub fn database(&self, backend: BackendType, config: &StoreConfig) -> Database {
		let name = match (backend, self) {
			(BackendType::Sqlite, Pool::General) => config.sqlite.name.clone(),
			(BackendType::Sqlite, Pool::Cache) => "cache.db".to_string(),
			(BackendType::Sqlite, Pool::ExtState) => "extState.db".to_string(),
			(BackendType::RocksDb, Pool::General) => config.rocksdb.name.clone(),
			(_, pool) => pool.namespace().to_string(),
		};
		Database::new(name, self.namespace())
	}

	fn namespace(&self) -> &'static str {
		match self {
			Pool::General => "kv",
			Pool::Cache => "cache",
			Pool::ExtState => "extState",
		}
	}
}

impl fmt::Display for Pool {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sqlite_database_names() {
		let config = StoreConfig::default();
		assert_eq!(Pool::General.database(BackendType::Sqlite, &config).name, "sqliteKV.db");
		assert_eq!(Pool::Cache.database(BackendType::Sqlite, &config).name, "cache.db");
		assert_eq!(Pool::ExtState.database(BackendType::Sqlite, &config).name, "extState.db");
	}

	#[test]
	fn test_rocksdb_database_names() {
		let config = StoreConfig::default();
		assert_eq!(Pool::General.database(BackendType::RocksDb, &config).name, "rocksKV");
		assert_eq!(Pool::Cache.database(BackendType::RocksDb, &config).name, "cache");
		assert_eq!(Pool::ExtState.database(BackendType::RocksDb, &config).name, "extState");
	}

	#[test]
	fn test_namespaces_are_distinct() {
		let config = StoreConfig::default();
		let namespaces: Vec<String> =
			Pool::ALL.iter().map(|p| p.database(BackendType::Redis, &config).namespace).collect();
		assert_eq!(namespaces, vec!["kv", "cache", "extState"]);
	}

	#[test]
	fn test_ext_state_backend() {
		let config = StoreConfig {
			r#type: BackendType::Sqlite,
			extstate_type: BackendType::Memory,
			..StoreConfig::default()
		};
		assert_eq!(Pool::General.backend(&config), BackendType::Sqlite);
		assert_eq!(Pool::Cache.backend(&config), BackendType::Sqlite);
		assert_eq!(Pool::ExtState.backend(&config), BackendType::Memory);
	}
}
