// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Store configuration.
//!
//! These are plain deserializable structs; loading them from a file is
//! left to the application.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use edgekv_type::{Error, diagnostic::config::unknown_backend, error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendType {
	#[default]
	Sqlite,
	Redis,
	RocksDb,
	Fdb,
	Memory,
}

impl BackendType {
	pub fn as_str(&self) -> &'static str {
		match self {
			BackendType::Sqlite => "sqlite",
			BackendType::Redis => "redis",
			BackendType::RocksDb => "rocksdb",
			BackendType::Fdb => "fdb",
			BackendType::Memory => "memory",
		}
	}
}

impl FromStr for BackendType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"sqlite" => Ok(BackendType::Sqlite),
			"redis" => Ok(BackendType::Redis),
			"rocksdb" | "pebble" => Ok(BackendType::RocksDb),
			"fdb" | "foundationdb" => Ok(BackendType::Fdb),
			"memory" => Ok(BackendType::Memory),
			_ => Err(error!(unknown_backend(s))),
		}
	}
}

impl TryFrom<String> for BackendType {
	type Error = Error;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<BackendType> for String {
	fn from(value: BackendType) -> Self {
		value.as_str().to_string()
	}
}

impl fmt::Display for BackendType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
	pub r#type: BackendType,
	pub extstate_type: BackendType,
	pub sqlite: SqliteConfig,
	pub rocksdb: RocksDbConfig,
	pub redis: RedisConfig,
	pub fdb: FdbConfig,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			r#type: BackendType::Sqlite,
			extstate_type: BackendType::Sqlite,
			sqlite: SqliteConfig::default(),
			rocksdb: RocksDbConfig::default(),
			redis: RedisConfig::default(),
			fdb: FdbConfig::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
	Delete,
	Truncate,
	Persist,
	Memory,
	Wal,
	Off,
}

impl JournalMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			JournalMode::Delete => "DELETE",
			JournalMode::Truncate => "TRUNCATE",
			JournalMode::Persist => "PERSIST",
			JournalMode::Memory => "MEMORY",
			JournalMode::Wal => "WAL",
			JournalMode::Off => "OFF",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynchronousMode {
	Off,
	Normal,
	Full,
	Extra,
}

impl SynchronousMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			SynchronousMode::Off => "OFF",
			SynchronousMode::Normal => "NORMAL",
			SynchronousMode::Full => "FULL",
			SynchronousMode::Extra => "EXTRA",
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
	/// Directory holding one database file per pool.
	pub path: PathBuf,
	/// File name of the general pool.
	pub name: String,
	pub journal_mode: JournalMode,
	pub synchronous_mode: SynchronousMode,
}

impl SqliteConfig {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	pub fn journal_mode(mut self, mode: JournalMode) -> Self {
		self.journal_mode = mode;
		self
	}

	pub fn synchronous_mode(mut self, mode: SynchronousMode) -> Self {
		self.synchronous_mode = mode;
		self
	}
}

impl Default for SqliteConfig {
	fn default() -> Self {
		Self {
			path: PathBuf::from("data"),
			name: "sqliteKV.db".to_string(),
			journal_mode: JournalMode::Wal,
			synchronous_mode: SynchronousMode::Normal,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocksDbConfig {
	/// Directory holding one database directory per pool.
	pub path: PathBuf,
	/// Directory name of the general pool.
	pub name: String,
}

impl RocksDbConfig {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}
}

impl Default for RocksDbConfig {
	fn default() -> Self {
		Self {
			path: PathBuf::from("data"),
			name: "rocksKV".to_string(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
	pub host: String,
	pub port: u16,
	pub password: Option<String>,
	pub db: i64,
	/// Connection timeout in milliseconds.
	pub timeout: u64,
	pub max_pool_size: u32,
}

impl RedisConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout)
	}
}

impl Default for RedisConfig {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: 6379,
			password: None,
			db: 0,
			timeout: 1000,
			max_pool_size: 16,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FdbConfig {
	/// Whether this process boots the client network thread. Only one
	/// boot may happen per process.
	pub boot_network: bool,
	/// Cluster file; the client default is used when absent.
	pub path: Option<PathBuf>,
	pub api_version: i32,
}

impl Default for FdbConfig {
	fn default() -> Self {
		Self {
			boot_network: true,
			path: None,
			api_version: 710,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_backend_type_from_str() {
		assert_eq!("sqlite".parse::<BackendType>().unwrap(), BackendType::Sqlite);
		assert_eq!("Redis".parse::<BackendType>().unwrap(), BackendType::Redis);
		assert_eq!("pebble".parse::<BackendType>().unwrap(), BackendType::RocksDb);
		assert_eq!("rocksdb".parse::<BackendType>().unwrap(), BackendType::RocksDb);
		assert_eq!("fdb".parse::<BackendType>().unwrap(), BackendType::Fdb);
		assert_eq!("memory".parse::<BackendType>().unwrap(), BackendType::Memory);
	}

	#[test]
	fn test_unknown_backend_type() {
		let err = "mongodb".parse::<BackendType>().unwrap_err();
		assert_eq!(err.code(), "CFG_001");
		assert!(err.to_string().contains("mongodb"));
	}

	#[test]
	fn test_deserialize_with_defaults() {
		let config: StoreConfig = serde_json::from_str(
			r#"{"type": "redis", "redis": {"host": "10.0.0.5", "password": "p@ss"}}"#,
		)
		.unwrap();
		assert_eq!(config.r#type, BackendType::Redis);
		assert_eq!(config.extstate_type, BackendType::Sqlite);
		assert_eq!(config.redis.host, "10.0.0.5");
		assert_eq!(config.redis.port, 6379);
		assert_eq!(config.redis.password.as_deref(), Some("p@ss"));
		assert_eq!(config.sqlite.name, "sqliteKV.db");
	}

	#[test]
	fn test_deserialize_rejects_unknown_type() {
		let result: Result<StoreConfig, _> = serde_json::from_str(r#"{"type": "etcd"}"#);
		let err = result.unwrap_err();
		assert!(err.to_string().contains("CFG_001"));
	}

	#[test]
	fn test_sqlite_pragmas() {
		let config = SqliteConfig::new("/tmp/edgekv")
			.journal_mode(JournalMode::Delete)
			.synchronous_mode(SynchronousMode::Extra);
		assert_eq!(config.journal_mode.as_str(), "DELETE");
		assert_eq!(config.synchronous_mode.as_str(), "EXTRA");
		assert_eq!(config.name, "sqliteKV.db");
	}
}
