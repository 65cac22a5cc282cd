// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod config;
pub mod encoding;
pub mod interface;
mod monotonic;
pub mod table;

pub use edgekv_type::{Error, Result};
pub use encoding::{EncodedValue, Registered, TypeRegistry};
pub use interface::{Driver, KeyValue, KeyValueExt, Tskv, TskvExt};
pub use monotonic::Monotonic;
pub use table::TableName;
