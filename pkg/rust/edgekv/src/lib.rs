// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Pluggable key-value and time-series persistence.
//!
//! Applications build a [`StoreRegistry`] once at startup, usually through
//! [`StoreRegistry::setup`] or one of the [`presets`], and ask it for
//! stores by pool and table.

pub mod presets;

pub use edgekv_core as core;
pub use edgekv_core::{
	EncodedValue, KeyValue, KeyValueExt, Registered, Tskv, TskvExt, TypeRegistry,
	config::{BackendType, FdbConfig, RedisConfig, RocksDbConfig, SqliteConfig, StoreConfig},
	encoding::{decode, encode},
};
pub use edgekv_registry::{Pool, StoreRegistry};
pub use edgekv_store as store;
pub use edgekv_store::{Database, StoreBuilder};
pub use edgekv_type::{Error, Result, diagnostic};
