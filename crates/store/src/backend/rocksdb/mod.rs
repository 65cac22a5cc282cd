// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Embedded LSM backend.
//!
//! All logical tables of a pool share one keyspace. Point keys are
//! `<table>:<key>`, time-series keys are `<table>:` followed by the 8 byte
//! order-preserving encoding of the `i64` key.

mod kv;
mod ts;

use std::path::PathBuf;

use edgekv_core::{Driver, config::RocksDbConfig};
use edgekv_type::{
	Error, Result,
	diagnostic::{
		backend::{connect_failed, operation_failed},
		config::missing_directory,
		store::not_connected,
	},
	error,
};
pub use kv::RocksDbKv;
use parking_lot::Mutex;
use rocksdb::{DB, Direction, IteratorMode, Options, WriteBatch};
use tracing::instrument;
pub use ts::RocksDbTs;

pub struct RocksDbDriver {
	path: PathBuf,
	db: Mutex<Option<DB>>,
}

impl RocksDbDriver {
	/// `dir` is created inside `config.path`.
	pub fn new(config: &RocksDbConfig, dir: &str) -> Result<Self> {
		if config.path.as_os_str().is_empty() {
			return Err(error!(missing_directory(Self::NAME)));
		}
		Ok(Self {
			path: config.path.join(dir),
			db: Mutex::new(None),
		})
	}

	pub fn path(&self) -> &PathBuf {
		&self.path
	}
}

impl Driver for RocksDbDriver {
	type Handle = DB;

	const NAME: &'static str = "rocksdb";

	#[instrument(name = "store::rocksdb::connect", level = "info", skip(self), fields(db_path = ?self.path))]
	fn connect(&self) -> Result<()> {
		std::fs::create_dir_all(&self.path).map_err(|e| {
			error!(connect_failed(Self::NAME, format!("failed to create {}: {}", self.path.display(), e)))
		})?;
		let mut options = Options::default();
		options.create_if_missing(true);
		let db = DB::open(&options, &self.path).map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		*self.db.lock() = Some(db);
		Ok(())
	}

	#[instrument(name = "store::rocksdb::disconnect", level = "info", skip(self))]
	fn disconnect(&self) -> Result<()> {
		self.db.lock().take();
		Ok(())
	}

	fn apply<R>(&self, work: impl FnOnce(&mut DB) -> Result<R>) -> Result<R> {
		let mut guard = self.db.lock();
		let db = guard.as_mut().ok_or_else(|| error!(not_connected(Self::NAME)))?;
		work(db)
	}

	fn is_connected(&self) -> bool {
		self.db.lock().is_some()
	}
}

pub(crate) fn rocksdb_error(err: rocksdb::Error) -> Error {
	error!(operation_failed(RocksDbDriver::NAME, err.into_string()))
}

/// Visits every record whose key starts with `prefix`, in key order,
/// beginning at `start`. Stops early when `visit` returns `false`.
pub(crate) fn scan(
	db: &DB,
	prefix: &[u8],
	start: &[u8],
	mut visit: impl FnMut(&[u8], &[u8]) -> Result<bool>,
) -> Result<()> {
	for item in db.iterator(IteratorMode::From(start, Direction::Forward)) {
		let (key, value) = item.map_err(rocksdb_error)?;
		if !key.starts_with(prefix) {
			break;
		}
		if !visit(&key[..], &value[..])? {
			break;
		}
	}
	Ok(())
}

/// Deletes every key starting with `prefix` and below `end`, in one batch.
pub(crate) fn delete_prefixed(db: &DB, prefix: &[u8], end: Option<&[u8]>) -> Result<usize> {
	let mut batch = WriteBatch::default();
	scan(db, prefix, prefix, |key, _| {
		if let Some(end) = end {
			if key >= end {
				return Ok(false);
			}
		}
		batch.delete(key);
		Ok(true)
	})?;
	let count = batch.len();
	db.write(batch).map_err(rocksdb_error)?;
	Ok(count)
}

#[cfg(test)]
mod tests {
	use edgekv_testing::tempdir::temp_dir;

	use super::*;

	#[test]
	fn test_missing_directory() {
		let err = RocksDbDriver::new(&RocksDbConfig::new(""), "rocksKV").err().unwrap();
		assert_eq!(err.code(), "CFG_002");
	}

	#[test]
	fn test_scan_respects_separator() {
		temp_dir(|path| {
			let driver = RocksDbDriver::new(&RocksDbConfig::new(path), "rocksKV").unwrap();
			driver.connect().unwrap();
			driver
				.apply(|db| {
					for key in ["rule:a", "rule:b", "rule2:a", "rulf"] {
						db.put(key, b"v").map_err(rocksdb_error)?;
					}
					let mut seen = Vec::new();
					scan(db, b"rule:", b"rule:", |key, _| {
						seen.push(key.to_vec());
						Ok(true)
					})?;
					assert_eq!(seen, vec![b"rule:a".to_vec(), b"rule:b".to_vec()]);

					assert_eq!(delete_prefixed(db, b"rule:", None)?, 2);
					assert!(db.get(b"rule2:a").map_err(rocksdb_error)?.is_some());
					Ok(())
				})
				.unwrap();
			driver.disconnect().unwrap();
			Ok(())
		})
		.expect("test failed");
	}
}
