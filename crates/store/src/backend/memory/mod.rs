// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-local backend for tests and ephemeral pools. Data lives as long
//! as the driver stays connected.

mod kv;
mod ts;

use std::collections::BTreeMap;

use edgekv_core::Driver;
use edgekv_type::{Result, diagnostic::store::not_connected, error};
pub use kv::MemoryKv;
use parking_lot::Mutex;
use tracing::instrument;
pub use ts::MemoryTs;

#[derive(Debug, Default)]
pub struct MemoryState {
	pub(crate) kv: BTreeMap<(String, String), Vec<u8>>,
	pub(crate) ts: BTreeMap<(String, i64), Vec<u8>>,
}

pub struct MemoryDriver {
	state: Mutex<Option<MemoryState>>,
}

impl MemoryDriver {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(None),
		}
	}
}

impl Default for MemoryDriver {
	fn default() -> Self {
		Self::new()
	}
}

impl Driver for MemoryDriver {
	type Handle = MemoryState;

	const NAME: &'static str = "memory";

	#[instrument(name = "store::memory::connect", level = "info", skip(self))]
	fn connect(&self) -> Result<()> {
		*self.state.lock() = Some(MemoryState::default());
		Ok(())
	}

	#[instrument(name = "store::memory::disconnect", level = "info", skip(self))]
	fn disconnect(&self) -> Result<()> {
		self.state.lock().take();
		Ok(())
	}

	fn apply<R>(&self, work: impl FnOnce(&mut MemoryState) -> Result<R>) -> Result<R> {
		let mut guard = self.state.lock();
		let state = guard.as_mut().ok_or_else(|| error!(not_connected(Self::NAME)))?;
		work(state)
	}

	fn is_connected(&self) -> bool {
		self.state.lock().is_some()
	}
}
