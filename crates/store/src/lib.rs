// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod backend;
mod builder;

pub use builder::{Database, StoreBuilder};
pub use edgekv_core::{
	Driver, EncodedValue, Error, KeyValue, KeyValueExt, Result, Tskv, TskvExt,
	config::{BackendType, StoreConfig},
};
