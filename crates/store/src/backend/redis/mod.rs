// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Redis-compatible server backend.
//!
//! Point values are plain string keys `<namespace>:<table>:<key>`. Each
//! time-series table is one sorted set `<namespace>:<table>` scored by the
//! `i64` key. `keys` and `entries` scan the server keyspace with `KEYS`,
//! which is linear in the size of the whole database.

mod kv;
mod ts;

use edgekv_core::{Driver, config::RedisConfig};
use edgekv_type::{
	Error, Result,
	diagnostic::{
		backend::{connect_failed, operation_failed},
		store::not_connected,
	},
	error,
};
pub use kv::RedisKv;
use parking_lot::RwLock;
use r2d2::Pool;
use redis::{Client, Connection};
use tracing::instrument;
pub use ts::RedisTs;

pub struct RedisDriver {
	config: RedisConfig,
	namespace: String,
	pool: RwLock<Option<Pool<Client>>>,
}

impl RedisDriver {
	/// Every key written through this driver starts with `namespace`.
	pub fn new(config: RedisConfig, namespace: impl Into<String>) -> Self {
		Self {
			config,
			namespace: namespace.into(),
			pool: RwLock::new(None),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn url(&self) -> String {
		let config = &self.config;
		match config.password.as_deref() {
			Some(password) if !password.is_empty() => format!(
				"redis://:{}@{}:{}/{}",
				urlencoding::encode(password),
				config.host,
				config.port,
				config.db
			),
			_ => format!("redis://{}:{}/{}", config.host, config.port, config.db),
		}
	}
}

impl Driver for RedisDriver {
	type Handle = Connection;

	const NAME: &'static str = "redis";

	#[instrument(name = "store::redis::connect", level = "info", skip(self), fields(
		host = %self.config.host,
		port = self.config.port,
		db = self.config.db
	))]
	fn connect(&self) -> Result<()> {
		let client = Client::open(self.url()).map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		let pool = Pool::builder()
			.max_size(self.config.max_pool_size)
			.connection_timeout(self.config.timeout())
			.build(client)
			.map_err(|e| error!(connect_failed(Self::NAME, e.to_string())))?;
		*self.pool.write() = Some(pool);
		Ok(())
	}

	#[instrument(name = "store::redis::disconnect", level = "info", skip(self))]
	fn disconnect(&self) -> Result<()> {
		self.pool.write().take();
		Ok(())
	}

	fn apply<R>(&self, work: impl FnOnce(&mut Connection) -> Result<R>) -> Result<R> {
		let pool = self.pool.read().clone().ok_or_else(|| error!(not_connected(Self::NAME)))?;
		let mut conn = pool.get().map_err(|e| error!(operation_failed(Self::NAME, e.to_string())))?;
		work(&mut conn)
	}

	fn is_connected(&self) -> bool {
		self.pool.read().is_some()
	}
}

pub(crate) fn redis_error(err: redis::RedisError) -> Error {
	error!(operation_failed(RedisDriver::NAME, err.to_string()))
}

/// Escapes glob metacharacters for `KEYS` patterns.
pub(crate) fn escape_glob(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());
	for c in raw.chars() {
		if matches!(c, '*' | '?' | '[' | ']' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}
