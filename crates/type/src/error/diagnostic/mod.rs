// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Coded diagnostics.
//!
//! Every error surfaced by the storage crates carries a stable code. The
//! code families are:
//!
//! * `CFG_*` configuration errors, fatal at setup time
//! * `STORE_*` contract conditions (not found, already exists, ...)
//! * `ENC_*` value encoding and decoding failures
//! * `BACKEND_*` failures reported by a storage technology, passed through verbatim

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config;
pub mod encoding;
pub mod store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}
