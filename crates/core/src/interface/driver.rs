// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use edgekv_type::Result;

/// Owns the live connection to one storage technology.
///
/// A driver is shared by every store built on the same physical database.
/// `connect` and `disconnect` are called once at process lifecycle
/// boundaries; calling `connect` twice may leak the first handle.
pub trait Driver: Send + Sync {
	type Handle;

	const NAME: &'static str;

	fn connect(&self) -> Result<()>;

	/// No-op on a driver that is not connected.
	fn disconnect(&self) -> Result<()>;

	/// Runs `work` against the live handle.
	///
	/// Embedded engines admit one unit of work at a time; server backends
	/// hand out pooled connections or rely on server-side transactions.
	/// Errors from `work` are returned unchanged and never retried.
	fn apply<R>(&self, work: impl FnOnce(&mut Self::Handle) -> Result<R>) -> Result<R>;

	fn is_connected(&self) -> bool;
}
