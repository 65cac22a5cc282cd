// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod suite;
pub mod tempdir;

pub use tempdir::{TempDir, temp_dir};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<()> = OnceCell::new();

/// Installs a test subscriber once per process, filtered by `RUST_LOG`.
pub fn init_tracing() {
	TRACING.get_or_init(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}

/// A table name no other test uses.
pub fn unique_table(prefix: &str) -> String {
	format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
