// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! One module per storage technology. Each provides a [`Driver`] and the
//! KeyValue and time-series stores built on it.
//!
//! [`Driver`]: edgekv_core::Driver

#[cfg(feature = "fdb")]
pub mod fdb;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::collections::HashMap;

use edgekv_core::EncodedValue;
use edgekv_type::{Result, diagnostic::encoding::decode_failed, error};

pub(crate) fn utf8_key(bytes: &[u8]) -> Result<String> {
	String::from_utf8(bytes.to_vec()).map_err(|e| error!(decode_failed(format!("stored key is not utf-8: {}", e))))
}

pub(crate) fn parse_keyed_state(bytes: &[u8]) -> Result<serde_json::Value> {
	serde_json::from_slice(bytes).map_err(|e| error!(decode_failed(format!("keyed state: {}", e))))
}

pub(crate) fn collect_prefixed(
	rows: impl IntoIterator<Item = (String, EncodedValue)>,
	prefix: &str,
) -> HashMap<String, EncodedValue> {
	rows.into_iter().filter(|(key, _)| key.starts_with(prefix)).collect()
}
