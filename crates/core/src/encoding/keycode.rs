// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Order-preserving encoding of time-series keys.
//!
//! An `i64` is written big-endian with the sign bit flipped, so the byte
//! order of encoded keys matches the numeric order, negatives included.
//! Prefix-emulated backends append these 8 bytes to `<table>:`.

use edgekv_type::{IntoDiagnostic, diagnostic::Diagnostic, diagnostic::encoding::decode_failed};
use thiserror::Error;

pub const KEY_LEN: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
	#[error("expected 8 key bytes, found {0}")]
	Length(usize),
	#[error("key does not start with table prefix '{0}'")]
	Prefix(String),
}

impl IntoDiagnostic for KeyError {
	fn into_diagnostic(self) -> Diagnostic {
		decode_failed(self.to_string())
	}
}

pub fn encode_i64(key: i64) -> [u8; KEY_LEN] {
	((key as u64) ^ (1 << 63)).to_be_bytes()
}

pub fn decode_i64(bytes: &[u8]) -> Result<i64, KeyError> {
	let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| KeyError::Length(bytes.len()))?;
	Ok((u64::from_be_bytes(array) ^ (1 << 63)) as i64)
}

/// `<prefix><encoded key>`
pub fn prefixed(prefix: &[u8], key: i64) -> Vec<u8> {
	let mut out = Vec::with_capacity(prefix.len() + KEY_LEN);
	out.extend_from_slice(prefix);
	out.extend_from_slice(&encode_i64(key));
	out
}

pub fn strip_prefixed(prefix: &[u8], bytes: &[u8]) -> Result<i64, KeyError> {
	let suffix = bytes
		.strip_prefix(prefix)
		.ok_or_else(|| KeyError::Prefix(String::from_utf8_lossy(prefix).into_owned()))?;
	decode_i64(suffix)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_preserved() {
		let keys = [i64::MIN, -1000, -1, 0, 1, 1000, 1500, 3000, i64::MAX];
		for pair in keys.windows(2) {
			assert!(encode_i64(pair[0]) < encode_i64(pair[1]), "{} < {}", pair[0], pair[1]);
		}
	}

	#[test]
	fn test_decode() {
		for key in [i64::MIN, -7, 0, 3000, i64::MAX] {
			assert_eq!(decode_i64(&encode_i64(key)).unwrap(), key);
		}
	}

	#[test]
	fn test_zero_has_sign_bit_set() {
		assert_eq!(encode_i64(0), [0x80, 0, 0, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn test_wrong_length() {
		assert_eq!(decode_i64(&[1, 2, 3]), Err(KeyError::Length(3)));
	}

	#[test]
	fn test_prefixed() {
		let key = prefixed(b"ts:", 1500);
		assert_eq!(strip_prefixed(b"ts:", &key).unwrap(), 1500);
		assert!(matches!(strip_prefixed(b"other:", &key), Err(KeyError::Prefix(_))));
	}
}
