// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use edgekv_type::Result;
use parking_lot::Mutex;

/// The last accepted time-series key of one store instance.
///
/// The lock is held across the write, so concurrent `advance` calls on the
/// same instance are serialized and the key only ever grows.
#[derive(Debug)]
pub struct Monotonic {
	last: Mutex<i64>,
}

impl Monotonic {
	pub fn new(last: i64) -> Self {
		Self {
			last: Mutex::new(last),
		}
	}

	/// Recovered from the largest stored key, `0` for an empty table.
	pub fn recover(max: Option<i64>) -> Self {
		Self::new(max.unwrap_or(0))
	}

	pub fn last(&self) -> i64 {
		*self.last.lock()
	}

	/// Runs `write` and records `key` if it is greater than the last key.
	/// Returns `false` without calling `write` otherwise.
	pub fn advance(&self, key: i64, write: impl FnOnce() -> Result<()>) -> Result<bool> {
		let mut last = self.last.lock();
		if key <= *last {
			return Ok(false);
		}
		write()?;
		*last = key;
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use edgekv_type::{diagnostic::backend::operation_failed, error};

	use super::*;

	#[test]
	fn test_rejects_stale_keys() {
		let monotonic = Monotonic::recover(None);
		assert!(monotonic.advance(1000, || Ok(())).unwrap());
		assert!(monotonic.advance(3000, || Ok(())).unwrap());

		let mut written = false;
		assert!(!monotonic
			.advance(2500, || {
				written = true;
				Ok(())
			})
			.unwrap());
		assert!(!written);
		assert!(!monotonic.advance(3000, || Ok(())).unwrap());
		assert_eq!(monotonic.last(), 3000);
	}

	#[test]
	fn test_failed_write_keeps_last() {
		let monotonic = Monotonic::new(10);
		let err = monotonic.advance(20, || Err(error!(operation_failed("test", "disk full")))).unwrap_err();
		assert_eq!(err.code(), "BACKEND_002");
		assert_eq!(monotonic.last(), 10);
		assert!(monotonic.advance(20, || Ok(())).unwrap());
	}

	#[test]
	fn test_empty_table_rejects_non_positive_keys() {
		let monotonic = Monotonic::recover(None);
		assert!(!monotonic.advance(0, || Ok(())).unwrap());
		assert!(!monotonic.advance(-5, || Ok(())).unwrap());
	}
}
