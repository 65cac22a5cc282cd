// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use edgekv_type::Result;

use crate::encoding::{EncodedValue, Registered, decode, encode};

/// Time-series records keyed by a strictly increasing `i64`.
///
/// Each instance remembers the last accepted key, recovered from the
/// backend when the instance is built. Two live instances over the same
/// table do not coordinate that key.
pub trait Tskv: Send + Sync {
	fn table(&self) -> &str;

	/// Returns `Ok(false)` without writing when `key` is not greater than
	/// the last accepted key.
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool>;

	fn get(&self, key: i64) -> Result<Option<EncodedValue>>;

	/// The last accepted key and its value. The value is `None` when the
	/// record was deleted or nothing was ever written (key `0`).
	fn last(&self) -> Result<(i64, Option<EncodedValue>)>;

	/// Removes one record. The last accepted key is never rewound.
	fn delete(&self, key: i64) -> Result<()>;

	/// Removes every record with a key strictly less than `key`.
	fn delete_before(&self, key: i64) -> Result<()>;

	fn close(&self) -> Result<()>;

	fn drop_table(&self) -> Result<()>;
}

pub trait TskvExt: Tskv {
	fn set_value<T: Registered>(&self, key: i64, value: &T) -> Result<bool> {
		self.set(key, &encode(value)?)
	}

	fn get_value<T: Registered>(&self, key: i64) -> Result<Option<T>> {
		match self.get(key)? {
			Some(value) => Ok(Some(decode(&value)?)),
			None => Ok(None),
		}
	}

	fn last_value<T: Registered>(&self) -> Result<(i64, Option<T>)> {
		let (key, value) = self.last()?;
		match value {
			Some(value) => Ok((key, Some(decode(&value)?))),
			None => Ok((key, None)),
		}
	}
}

impl<T: Tskv + ?Sized> TskvExt for T {}
