// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Sorted-set time series.
//!
//! Members are the 8 byte key encoding followed by the value bytes, so
//! equal values under different keys stay distinct members and the exact
//! key is recovered from the member rather than from the `f64` score.
//! Scores lose precision beyond 2^53; lookups filter on the member key.

use std::sync::Arc;

use edgekv_core::{Driver, EncodedValue, Monotonic, TableName, Tskv, encoding::keycode};
use edgekv_type::Result;
use tracing::instrument;

use super::{RedisDriver, redis_error};

pub struct RedisTs {
	driver: Arc<RedisDriver>,
	table: TableName,
	/// `<namespace>:<table>`
	key: String,
	last: Monotonic,
}

impl RedisTs {
	pub fn new(driver: Arc<RedisDriver>, table: TableName) -> Result<Self> {
		let key = format!("{}:{}", driver.namespace(), table);
		let members: Vec<Vec<u8>> = driver.apply(|conn| {
			redis::cmd("ZREVRANGE").arg(&key).arg(0).arg(0).query(conn).map_err(redis_error)
		})?;
		let max = match members.first() {
			Some(member) => Some(split(member)?.0),
			None => None,
		};
		Ok(Self {
			driver,
			table,
			key,
			last: Monotonic::recover(max),
		})
	}

	fn remove_by_score(&self, min: &str, max: &str) -> Result<()> {
		self.driver.apply(|conn| {
			redis::cmd("ZREMRANGEBYSCORE")
				.arg(&self.key)
				.arg(min)
				.arg(max)
				.query::<i64>(conn)
				.map(|_| ())
				.map_err(redis_error)
		})
	}

	/// Members whose score equals the score `key` rounds to.
	fn members_at(&self, key: i64) -> Result<Vec<Vec<u8>>> {
		self.driver.apply(|conn| {
			redis::cmd("ZRANGEBYSCORE").arg(&self.key).arg(key).arg(key).query(conn).map_err(redis_error)
		})
	}

	fn remove(&self, members: &[Vec<u8>]) -> Result<()> {
		if members.is_empty() {
			return Ok(());
		}
		self.driver.apply(|conn| {
			redis::cmd("ZREM").arg(&self.key).arg(members).query::<i64>(conn).map(|_| ()).map_err(redis_error)
		})
	}
}

fn split(member: &[u8]) -> Result<(i64, &[u8])> {
	if member.len() < keycode::KEY_LEN {
		return Err(keycode::KeyError::Length(member.len()).into());
	}
	let (key, value) = member.split_at(keycode::KEY_LEN);
	Ok((keycode::decode_i64(key)?, value))
}

/// Keeps the members whose exact key satisfies `pred`.
fn select(members: Vec<Vec<u8>>, pred: impl Fn(i64) -> bool) -> Result<Vec<Vec<u8>>> {
	let mut selected = Vec::new();
	for member in members {
		if pred(split(&member)?.0) {
			selected.push(member);
		}
	}
	Ok(selected)
}

fn member(key: i64, value: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(keycode::KEY_LEN + value.len());
	out.extend_from_slice(&keycode::encode_i64(key));
	out.extend_from_slice(value);
	out
}

impl Tskv for RedisTs {
	fn table(&self) -> &str {
		&self.table
	}

	#[instrument(name = "store::redis::ts::set", level = "debug", skip(self, value), fields(table = %self.table))]
	fn set(&self, key: i64, value: &EncodedValue) -> Result<bool> {
		self.last.advance(key, || {
			self.driver.apply(|conn| {
				redis::cmd("ZADD")
					.arg(&self.key)
					.arg(key)
					.arg(member(key, value))
					.query::<i64>(conn)
					.map(|_| ())
					.map_err(redis_error)
			})
		})
	}

	#[instrument(name = "store::redis::ts::get", level = "trace", skip(self), fields(table = %self.table))]
	fn get(&self, key: i64) -> Result<Option<EncodedValue>> {
		for member in &self.members_at(key)? {
			let (stored, value) = split(member)?;
			if stored == key {
				return Ok(Some(EncodedValue::new(value)));
			}
		}
		Ok(None)
	}

	fn last(&self) -> Result<(i64, Option<EncodedValue>)> {
		let key = self.last.last();
		Ok((key, self.get(key)?))
	}

	fn delete(&self, key: i64) -> Result<()> {
		let doomed = select(self.members_at(key)?, |stored| stored == key)?;
		self.remove(&doomed)
	}

	#[instrument(name = "store::redis::ts::delete_before", level = "debug", skip(self), fields(table = %self.table))]
	fn delete_before(&self, key: i64) -> Result<()> {
		self.remove_by_score("-inf", &format!("({}", key))?;
		// smaller keys can share the boundary score
		let doomed = select(self.members_at(key)?, |stored| stored < key)?;
		self.remove(&doomed)
	}

	fn close(&self) -> Result<()> {
		Ok(())
	}

	fn drop_table(&self) -> Result<()> {
		self.driver.apply(|conn| redis::cmd("DEL").arg(&self.key).query::<i64>(conn).map(|_| ()).map_err(redis_error))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_member_layout() {
		let encoded = member(3000, b"bar3");
		assert_eq!(&encoded[..keycode::KEY_LEN], &keycode::encode_i64(3000));
		assert_eq!(split(&encoded).unwrap(), (3000, &b"bar3"[..]));
	}

	#[test]
	fn test_select_by_exact_key_above_f64_precision() {
		let key = (1i64 << 53) + 1;
		assert_eq!(key as f64, (key - 1) as f64);

		let members = vec![member(key - 1, b"old"), member(key, b"cut"), member(key + 1, b"new")];
		let before = select(members.clone(), |stored| stored < key).unwrap();
		assert_eq!(before, vec![member(key - 1, b"old")]);

		let exact = select(members, |stored| stored == key).unwrap();
		assert_eq!(exact, vec![member(key, b"cut")]);
	}

	#[test]
	fn test_short_member() {
		assert_eq!(split(&[1, 2]).unwrap_err().code(), "ENC_002");
	}
}
