// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Store registry.
//!
//! The registry hands out one store instance per table and pool, created
//! lazily through the pool's builder. Each pool has its own lock and cache,
//! so creating a store in one pool never waits on another.

use std::{collections::HashMap, sync::Arc};

use edgekv_core::{KeyValue, Tskv, config::StoreConfig};
use edgekv_store::StoreBuilder;
use edgekv_type::{Error, Result, diagnostic::store::not_initialized, error};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::Pool;

struct PoolCache {
	builder: StoreBuilder,
	kv: HashMap<String, Arc<dyn KeyValue>>,
	ts: HashMap<String, Arc<dyn Tskv>>,
}

impl PoolCache {
	fn new(builder: StoreBuilder) -> Self {
		Self {
			builder,
			kv: HashMap::new(),
			ts: HashMap::new(),
		}
	}

	fn kv_store(&mut self, table: &str) -> Result<Arc<dyn KeyValue>> {
		if let Some(store) = self.kv.get(table) {
			return Ok(store.clone());
		}
		let store = self.builder.create_store(table)?;
		self.kv.insert(table.to_string(), store.clone());
		Ok(store)
	}

	fn ts_store(&mut self, table: &str) -> Result<Arc<dyn Tskv>> {
		if let Some(store) = self.ts.get(table) {
			return Ok(store.clone());
		}
		let store = self.builder.create_ts(table)?;
		self.ts.insert(table.to_string(), store.clone());
		Ok(store)
	}
}

/// Owns the three store pools of an application.
pub struct StoreRegistry {
	pools: [Mutex<Option<PoolCache>>; 3],
}

impl Default for StoreRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl StoreRegistry {
	/// A registry with no pools. Every lookup fails until pools are installed.
	pub fn new() -> Self {
		Self {
			pools: [Mutex::new(None), Mutex::new(None), Mutex::new(None)],
		}
	}

	/// Opens all three pools from `config`.
	///
	/// The general and cache pools use `config.type`, the external-state
	/// pool uses `config.extstate_type`.
	#[instrument(name = "registry::setup", level = "info", skip(config), fields(
		backend = %config.r#type,
		extstate_backend = %config.extstate_type
	))]
	pub fn setup(config: &StoreConfig) -> Result<Self> {
		let registry = Self::new();
		for pool in Pool::ALL {
			let backend = pool.backend(config);
			let builder = StoreBuilder::open(backend, config, &pool.database(backend, config))?;
			registry.install(pool, builder);
		}
		info!("store pools ready");
		Ok(registry)
	}

	/// Sets the builder of `pool`, discarding stores cached for a previous one.
	pub fn install(&self, pool: Pool, builder: StoreBuilder) {
		debug!(%pool, backend = %builder.backend(), "installing pool");
		*self.pools[pool.index()].lock() = Some(PoolCache::new(builder));
	}

	pub fn is_initialized(&self, pool: Pool) -> bool {
		self.pools[pool.index()].lock().is_some()
	}

	fn lock(&self, pool: Pool) -> MutexGuard<'_, Option<PoolCache>> {
		self.pools[pool.index()].lock()
	}

	fn with_pool<R>(&self, pool: Pool, f: impl FnOnce(&mut PoolCache) -> Result<R>) -> Result<R> {
		let mut guard = self.lock(pool);
		let cache = guard.as_mut().ok_or_else(|| error!(not_initialized(pool.as_str())))?;
		f(cache)
	}

	#[instrument(name = "registry::get_kv", level = "trace", skip(self))]
	pub fn get_kv(&self, pool: Pool, table: &str) -> Result<Arc<dyn KeyValue>> {
		self.with_pool(pool, |cache| cache.kv_store(table))
	}

	#[instrument(name = "registry::get_ts", level = "trace", skip(self))]
	pub fn get_ts(&self, pool: Pool, table: &str) -> Result<Arc<dyn Tskv>> {
		self.with_pool(pool, |cache| cache.ts_store(table))
	}

	/// Drops the table and evicts its store. The entry stays cached when
	/// the drop fails.
	#[instrument(name = "registry::drop_kv", level = "debug", skip(self))]
	pub fn drop_kv(&self, pool: Pool, table: &str) -> Result<()> {
		self.with_pool(pool, |cache| {
			cache.kv_store(table)?.drop_table()?;
			cache.kv.remove(table);
			debug!("evicted kv store");
			Ok(())
		})
	}

	#[instrument(name = "registry::drop_ts", level = "debug", skip(self))]
	pub fn drop_ts(&self, pool: Pool, table: &str) -> Result<()> {
		self.with_pool(pool, |cache| {
			cache.ts_store(table)?.drop_table()?;
			cache.ts.remove(table);
			debug!("evicted ts store");
			Ok(())
		})
	}

	/// Drops every cached kv store whose table starts with `prefix`.
	///
	/// Every matching table is attempted. The first failure is returned and
	/// the failed stores stay cached.
	#[instrument(name = "registry::drop_ref_kvs", level = "debug", skip(self))]
	pub fn drop_ref_kvs(&self, pool: Pool, prefix: &str) -> Result<()> {
		self.with_pool(pool, |cache| {
			let tables: Vec<String> = cache.kv.keys().filter(|t| t.starts_with(prefix)).cloned().collect();

			let mut first: Option<Error> = None;
			for table in tables {
				let Some(store) = cache.kv.get(&table).cloned() else {
					continue;
				};
				match store.drop_table() {
					Ok(()) => {
						cache.kv.remove(&table);
						debug!(table = %table, "evicted kv store");
					}
					Err(err) => {
						warn!(table = %table, code = err.code(), "failed to drop kv store");
						first.get_or_insert(err);
					}
				}
			}

			match first {
				Some(err) => Err(err),
				None => Ok(()),
			}
		})
	}

	/// Number of stores cached in `pool`, kv and ts together.
	pub fn cached(&self, pool: Pool) -> usize {
		self.lock(pool).as_ref().map(|c| c.kv.len() + c.ts.len()).unwrap_or(0)
	}

	/// Disconnects every pool and forgets their stores. The first
	/// disconnect failure is returned after all pools were attempted.
	#[instrument(name = "registry::close", level = "info", skip(self))]
	pub fn close(&self) -> Result<()> {
		let mut first: Option<Error> = None;
		for pool in Pool::ALL {
			let Some(cache) = self.lock(pool).take() else {
				continue;
			};
			if let Err(err) = cache.builder.close() {
				warn!(%pool, code = err.code(), "failed to close pool");
				first.get_or_insert(err);
			}
		}
		match first {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use edgekv_core::{KeyValueExt, TskvExt};

	use super::*;

	fn memory_registry() -> StoreRegistry {
		let registry = StoreRegistry::new();
		for pool in Pool::ALL {
			registry.install(pool, StoreBuilder::memory().unwrap());
		}
		registry
	}

	#[test]
	fn test_uninitialized_pool() {
		let registry = StoreRegistry::new();
		let err = registry.get_kv(Pool::General, "rules").err().unwrap();
		assert_eq!(err.code(), "STORE_003");
		let err = registry.get_ts(Pool::Cache, "rules").err().unwrap();
		assert_eq!(err.code(), "STORE_003");
		assert_eq!(registry.drop_ref_kvs(Pool::ExtState, "rule").unwrap_err().code(), "STORE_003");
		assert!(!registry.is_initialized(Pool::General));
	}

	#[test]
	fn test_returns_cached_instance() {
		let registry = memory_registry();
		let first = registry.get_kv(Pool::General, "rules").unwrap();
		let second = registry.get_kv(Pool::General, "rules").unwrap();
		assert!(Arc::ptr_eq(&first, &second));

		let ts = registry.get_ts(Pool::General, "rules").unwrap();
		assert!(Arc::ptr_eq(&ts, &registry.get_ts(Pool::General, "rules").unwrap()));
		assert_eq!(registry.cached(Pool::General), 2);
		assert_eq!(registry.cached(Pool::Cache), 0);
	}

	#[test]
	fn test_pools_are_independent() {
		let registry = memory_registry();
		registry.get_kv(Pool::General, "rules").unwrap().set_value("k", &"general".to_string()).unwrap();
		assert_eq!(registry.get_kv(Pool::Cache, "rules").unwrap().get("k").unwrap(), None);
	}

	#[test]
	fn test_creation_failure_is_not_cached() {
		let registry = memory_registry();
		assert_eq!(registry.get_kv(Pool::General, "1_abc").err().unwrap().code(), "CFG_003");
		assert_eq!(registry.cached(Pool::General), 0);
	}

	#[test]
	fn test_drop_kv_evicts() {
		let registry = memory_registry();
		let kv = registry.get_kv(Pool::General, "rules").unwrap();
		kv.set_value("k", &"v".to_string()).unwrap();

		registry.drop_kv(Pool::General, "rules").unwrap();
		assert_eq!(registry.cached(Pool::General), 0);

		let fresh = registry.get_kv(Pool::General, "rules").unwrap();
		assert!(!Arc::ptr_eq(&kv, &fresh));
		assert!(fresh.keys().unwrap().is_empty());
	}

	#[test]
	fn test_drop_ts_evicts() {
		let registry = memory_registry();
		let ts = registry.get_ts(Pool::General, "checkpoints").unwrap();
		assert!(ts.set_value(1000, &"snap".to_string()).unwrap());

		registry.drop_ts(Pool::General, "checkpoints").unwrap();
		let fresh = registry.get_ts(Pool::General, "checkpoints").unwrap();
		assert_eq!(fresh.last().unwrap(), (0, None));
	}

	#[test]
	fn test_drop_of_uncached_table() {
		let registry = memory_registry();
		registry.drop_kv(Pool::Cache, "never_opened").unwrap();
		assert_eq!(registry.cached(Pool::Cache), 0);
	}

	#[test]
	fn test_drop_ref_kvs() {
		let registry = memory_registry();
		for table in ["rule1_sink1", "rule1_sink2", "rule10_sink1", "rule2_sink1"] {
			registry.get_kv(Pool::Cache, table).unwrap().set_value("k", &table.to_string()).unwrap();
		}

		registry.drop_ref_kvs(Pool::Cache, "rule1_").unwrap();
		assert_eq!(registry.cached(Pool::Cache), 2);
		assert!(registry.get_kv(Pool::Cache, "rule1_sink1").unwrap().keys().unwrap().is_empty());
		assert_eq!(
			registry.get_kv(Pool::Cache, "rule10_sink1").unwrap().get_value::<String>("k").unwrap().as_deref(),
			Some("rule10_sink1")
		);
	}

	#[test]
	fn test_drop_ref_kvs_keeps_failed_stores() {
		let registry = StoreRegistry::new();
		let builder = StoreBuilder::memory().unwrap();
		registry.install(Pool::Cache, builder.clone());
		registry.get_kv(Pool::Cache, "rule1_a").unwrap();
		registry.get_kv(Pool::Cache, "rule1_b").unwrap();

		builder.close().unwrap();
		let err = registry.drop_ref_kvs(Pool::Cache, "rule1_").unwrap_err();
		assert_eq!(err.code(), "STORE_004");
		assert_eq!(registry.cached(Pool::Cache), 2);
	}

	#[test]
	fn test_close() {
		let registry = memory_registry();
		let kv = registry.get_kv(Pool::General, "rules").unwrap();
		registry.close().unwrap();

		assert_eq!(kv.keys().unwrap_err().code(), "STORE_004");
		assert_eq!(registry.get_kv(Pool::General, "rules").err().unwrap().code(), "STORE_003");
	}
}
