// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Store builders.
//!
//! A builder owns one connected driver and produces table-specific stores
//! on top of it. The backend is selected once, from configuration.

use std::sync::Arc;

use edgekv_core::{
	Driver, KeyValue, TableName, Tskv,
	config::{BackendType, StoreConfig},
};
use edgekv_type::{Result, diagnostic::config::invalid_option, error};
use tracing::{debug, instrument};

#[cfg(feature = "fdb")]
use crate::backend::fdb::{FdbDriver, FdbKv, FdbTs};
#[cfg(feature = "redis")]
use crate::backend::redis::{RedisDriver, RedisKv, RedisTs};
#[cfg(feature = "rocksdb")]
use crate::backend::rocksdb::{RocksDbDriver, RocksDbKv, RocksDbTs};
#[cfg(feature = "sqlite")]
use crate::backend::sqlite::{SqliteDriver, SqliteKv, SqliteTs};
use crate::backend::memory::{MemoryDriver, MemoryKv, MemoryTs};

/// Where a builder keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
	/// Database file (embedded SQL) or directory (embedded LSM).
	pub name: String,
	/// Key prefix (Redis) or top-level subspace (FoundationDB).
	pub namespace: String,
}

impl Database {
	pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
		}
	}
}

#[derive(Clone)]
#[repr(u8)]
pub enum StoreBuilder {
	Memory(Arc<MemoryDriver>) = 0,
	#[cfg(feature = "sqlite")]
	Sqlite(Arc<SqliteDriver>) = 1,
	#[cfg(feature = "redis")]
	Redis(Arc<RedisDriver>) = 2,
	#[cfg(feature = "rocksdb")]
	RocksDb(Arc<RocksDbDriver>) = 3,
	#[cfg(feature = "fdb")]
	Fdb(Arc<FdbDriver>) = 4,
}

impl StoreBuilder {
	/// Creates and connects the driver for `backend`.
	#[instrument(name = "store::builder::open", level = "info", skip(config), fields(backend = %backend, database = %database.name))]
	pub fn open(backend: BackendType, config: &StoreConfig, database: &Database) -> Result<Self> {
		let builder = match backend {
			BackendType::Memory => Self::Memory(Arc::new(MemoryDriver::new())),
			#[cfg(feature = "sqlite")]
			BackendType::Sqlite => Self::Sqlite(Arc::new(SqliteDriver::new(config.sqlite.clone(), &database.name)?)),
			#[cfg(feature = "redis")]
			BackendType::Redis => Self::Redis(Arc::new(RedisDriver::new(config.redis.clone(), &database.namespace))),
			#[cfg(feature = "rocksdb")]
			BackendType::RocksDb => Self::RocksDb(Arc::new(RocksDbDriver::new(&config.rocksdb, &database.name)?)),
			#[cfg(feature = "fdb")]
			BackendType::Fdb => Self::Fdb(Arc::new(FdbDriver::new(config.fdb.clone(), &database.namespace))),
			#[allow(unreachable_patterns)]
			other => return Err(error!(invalid_option("type", format!("{} support is not compiled in", other)))),
		};
		builder.connect()?;
		Ok(builder)
	}

	pub fn memory() -> Result<Self> {
		let builder = Self::Memory(Arc::new(MemoryDriver::new()));
		builder.connect()?;
		Ok(builder)
	}

	pub fn backend(&self) -> BackendType {
		match self {
			Self::Memory(_) => BackendType::Memory,
			#[cfg(feature = "sqlite")]
			Self::Sqlite(_) => BackendType::Sqlite,
			#[cfg(feature = "redis")]
			Self::Redis(_) => BackendType::Redis,
			#[cfg(feature = "rocksdb")]
			Self::RocksDb(_) => BackendType::RocksDb,
			#[cfg(feature = "fdb")]
			Self::Fdb(_) => BackendType::Fdb,
		}
	}

	#[inline]
	fn connect(&self) -> Result<()> {
		match self {
			Self::Memory(d) => d.connect(),
			#[cfg(feature = "sqlite")]
			Self::Sqlite(d) => d.connect(),
			#[cfg(feature = "redis")]
			Self::Redis(d) => d.connect(),
			#[cfg(feature = "rocksdb")]
			Self::RocksDb(d) => d.connect(),
			#[cfg(feature = "fdb")]
			Self::Fdb(d) => d.connect(),
		}
	}

	/// Disconnects the driver. Stores built from it fail afterwards.
	#[inline]
	pub fn close(&self) -> Result<()> {
		match self {
			Self::Memory(d) => d.disconnect(),
			#[cfg(feature = "sqlite")]
			Self::Sqlite(d) => d.disconnect(),
			#[cfg(feature = "redis")]
			Self::Redis(d) => d.disconnect(),
			#[cfg(feature = "rocksdb")]
			Self::RocksDb(d) => d.disconnect(),
			#[cfg(feature = "fdb")]
			Self::Fdb(d) => d.disconnect(),
		}
	}

	#[instrument(name = "store::builder::create_store", level = "debug", skip(self), fields(backend = %self.backend()))]
	pub fn create_store(&self, table: &str) -> Result<Arc<dyn KeyValue>> {
		let table = TableName::new(table)?;
		let store: Arc<dyn KeyValue> = match self {
			Self::Memory(d) => Arc::new(MemoryKv::new(d.clone(), table)),
			#[cfg(feature = "sqlite")]
			Self::Sqlite(d) => Arc::new(SqliteKv::new(d.clone(), table)?),
			#[cfg(feature = "redis")]
			Self::Redis(d) => Arc::new(RedisKv::new(d.clone(), table)),
			#[cfg(feature = "rocksdb")]
			Self::RocksDb(d) => Arc::new(RocksDbKv::new(d.clone(), table)),
			#[cfg(feature = "fdb")]
			Self::Fdb(d) => Arc::new(FdbKv::new(d.clone(), table)),
		};
		debug!(table = store.table(), "created kv store");
		Ok(store)
	}

	#[instrument(name = "store::builder::create_ts", level = "debug", skip(self), fields(backend = %self.backend()))]
	pub fn create_ts(&self, table: &str) -> Result<Arc<dyn Tskv>> {
		let table = TableName::new(table)?;
		let store: Arc<dyn Tskv> = match self {
			Self::Memory(d) => Arc::new(MemoryTs::new(d.clone(), table)?),
			#[cfg(feature = "sqlite")]
			Self::Sqlite(d) => Arc::new(SqliteTs::new(d.clone(), table)?),
			#[cfg(feature = "redis")]
			Self::Redis(d) => Arc::new(RedisTs::new(d.clone(), table)?),
			#[cfg(feature = "rocksdb")]
			Self::RocksDb(d) => Arc::new(RocksDbTs::new(d.clone(), table)?),
			#[cfg(feature = "fdb")]
			Self::Fdb(d) => Arc::new(FdbTs::new(d.clone(), table)?),
		};
		debug!(table = store.table(), "created ts store");
		Ok(store)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rejects_invalid_table_before_touching_backend() {
		let builder = StoreBuilder::memory().unwrap();
		let err = builder.create_store("1_abc").err().unwrap();
		assert_eq!(err.code(), "CFG_003");
		let err = builder.create_ts("bad name").err().unwrap();
		assert_eq!(err.code(), "CFG_003");
	}

	#[test]
	fn test_open_memory() {
		let builder =
			StoreBuilder::open(BackendType::Memory, &StoreConfig::default(), &Database::new("unused", "kv"))
				.unwrap();
		assert_eq!(builder.backend(), BackendType::Memory);
		let kv = builder.create_store("rules").unwrap();
		assert_eq!(kv.table(), "rules");
	}

	#[test]
	fn test_close_disconnects_stores() {
		let builder = StoreBuilder::memory().unwrap();
		let kv = builder.create_store("rules").unwrap();
		builder.close().unwrap();
		assert_eq!(kv.keys().unwrap_err().code(), "STORE_004");
	}

	#[cfg(feature = "sqlite")]
	#[test]
	fn test_sqlite_rejects_invalid_table() {
		edgekv_testing::tempdir::temp_dir(|path| {
			let config = StoreConfig {
				sqlite: edgekv_core::config::SqliteConfig::new(path),
				..StoreConfig::default()
			};
			let builder =
				StoreBuilder::open(BackendType::Sqlite, &config, &Database::new("sqliteKV.db", "kv")).unwrap();
			let err = builder.create_store("1_abc").err().unwrap();
			assert_eq!(err.code(), "CFG_003");
			assert!(err.to_string().contains("1_abc"));
			builder.close().unwrap();
			Ok(())
		})
		.expect("test failed");
	}
}
