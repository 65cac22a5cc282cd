// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Distributed transactional backend.
//!
//! Each logical table is the subspace `(namespace, "KV" | "TS", table)`
//! with tuple-packed keys. Every operation, multi-step ones included, runs
//! inside one retried transaction. The client network thread is process
//! wide and booted at most once.

mod kv;
mod ts;

use std::{future::Future, sync::Arc};

use edgekv_core::{Driver, config::FdbConfig};
use edgekv_type::{
	Error, Result,
	diagnostic::{
		backend::{connect_failed, transaction_failed},
		store::not_connected,
	},
	error,
};
use foundationdb::{
	Database, FdbBindingError, RangeOption, RetryableTransaction,
	api::{FdbApiBuilder, NetworkAutoStop},
	future::FdbValues,
	tuple::Subspace,
};
pub use kv::FdbKv;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{info, instrument};
pub use ts::FdbTs;

static NETWORK: Lazy<Mutex<Option<NetworkAutoStop>>> = Lazy::new(|| Mutex::new(None));

pub struct FdbDriver {
	config: FdbConfig,
	namespace: String,
	db: RwLock<Option<Arc<Database>>>,
}

impl FdbDriver {
	pub fn new(config: FdbConfig, namespace: impl Into<String>) -> Self {
		Self {
			config,
			namespace: namespace.into(),
			db: RwLock::new(None),
		}
	}

	pub(crate) fn subspace(&self, kind: &str, table: &str) -> Subspace {
		Subspace::all().subspace(&(self.namespace.as_str(), kind, table))
	}

	/// Runs `work` in a retried transaction and blocks until it commits.
	pub(crate) fn run<T, F, Fut>(&self, work: F) -> Result<T>
	where
		F: Fn(RetryableTransaction) -> Fut,
		Fut: Future<Output = std::result::Result<T, FdbBindingError>>,
	{
		self.apply(|db| {
			futures::executor::block_on(db.run(|trx, _maybe_committed| work(trx))).map_err(fdb_error)
		})
	}

	fn boot_network(&self) -> Result<()> {
		let mut network = NETWORK.lock();
		if network.is_some() {
			return Ok(());
		}
		let builder = FdbApiBuilder::default()
			.set_runtime_version(self.config.api_version)
			.build()
			.map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		// SAFETY: the network is booted once per process and the guard is
		// kept for the rest of the process lifetime.
		let guard = unsafe { builder.boot() }.map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		*network = Some(guard);
		info!(api_version = self.config.api_version, "booted fdb network");
		Ok(())
	}
}

impl Driver for FdbDriver {
	type Handle = Arc<Database>;

	const NAME: &'static str = "fdb";

	#[instrument(name = "store::fdb::connect", level = "info", skip(self), fields(
		cluster_file = ?self.config.path,
		namespace = %self.namespace
	))]
	fn connect(&self) -> Result<()> {
		if self.config.boot_network {
			self.boot_network()?;
		}
		let path = self.config.path.as_ref().map(|p| p.to_string_lossy().into_owned());
		let db = Database::new(path.as_deref()).map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		*self.db.write() = Some(Arc::new(db));
		Ok(())
	}

	#[instrument(name = "store::fdb::disconnect", level = "info", skip(self))]
	fn disconnect(&self) -> Result<()> {
		self.db.write().take();
		Ok(())
	}

	fn apply<R>(&self, work: impl FnOnce(&mut Arc<Database>) -> Result<R>) -> Result<R> {
		let mut db = self.db.read().clone().ok_or_else(|| error!(not_connected(Self::NAME)))?;
		work(&mut db)
	}

	fn is_connected(&self) -> bool {
		self.db.read().is_some()
	}
}

pub(crate) fn fdb_error(err: FdbBindingError) -> Error {
	error!(transaction_failed(FdbDriver::NAME, err.to_string()))
}

/// Reads a whole range inside `trx`, following continuation pages.
pub(crate) async fn read_range(
	trx: &RetryableTransaction,
	range: RangeOption<'static>,
) -> std::result::Result<Vec<(Vec<u8>, Vec<u8>)>, FdbBindingError> {
	let mut rows = Vec::new();
	let mut next = Some(range);
	let mut iteration = 1;
	while let Some(range) = next.take() {
		let values: FdbValues = trx.get_range(&range, iteration, false).await?;
		for kv in values.iter() {
			rows.push((kv.key().to_vec(), kv.value().to_vec()));
		}
		next = range.next_range(&values);
		iteration += 1;
	}
	Ok(rows)
}
