// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	collections::HashMap,
	fmt::{Debug, Formatter},
};

use chrono::{DateTime, Utc};
use edgekv_type::{
	Result,
	diagnostic::encoding::{encode_failed, unregistered_type},
	error,
};
use tracing::debug;

use super::value::{Registered, decode_payload, payload_of};

type DecodeFn = fn(&[u8]) -> Result<Box<dyn Any + Send + Sync>>;
type RenderFn = fn(&[u8]) -> Result<String>;

struct Entry {
	decode: DecodeFn,
	render: RenderFn,
}

/// Maps type tags to decoders, so stored bytes can be reconstructed
/// without knowing their Rust type in advance.
pub struct TypeRegistry {
	entries: HashMap<&'static str, Entry>,
}

/// A value decoded by tag.
pub struct Decoded {
	tag: String,
	value: Box<dyn Any + Send + Sync>,
}

impl Decoded {
	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn is<T: 'static>(&self) -> bool {
		self.value.is::<T>()
	}

	pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}

	pub fn downcast<T: 'static>(self) -> Option<T> {
		self.value.downcast::<T>().ok().map(|v| *v)
	}
}

impl Debug for Decoded {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Decoded").field("tag", &self.tag).finish_non_exhaustive()
	}
}

impl TypeRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}

	/// A registry with every built-in type registered.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register::<String>();
		registry.register::<bool>();
		registry.register::<i64>();
		registry.register::<u64>();
		registry.register::<f64>();
		registry.register::<Vec<u8>>();
		registry.register::<DateTime<Utc>>();
		registry.register::<serde_json::Value>();
		registry.register::<HashMap<String, String>>();
		registry
	}

	/// Registering the same tag twice keeps the latest decoder.
	pub fn register<T>(&mut self) -> &mut Self
	where
		T: Registered + Send + Sync + 'static,
	{
		let previous = self.entries.insert(
			T::TYPE_NAME,
			Entry {
				decode: decode_boxed::<T>,
				render: render::<T>,
			},
		);
		if previous.is_some() {
			debug!(tag = T::TYPE_NAME, "replaced registered decoder");
		}
		self
	}

	pub fn contains(&self, tag: &str) -> bool {
		self.entries.contains_key(tag)
	}

	pub fn decode_any(&self, bytes: &[u8]) -> Result<Decoded> {
		let (tag, payload) = payload_of(bytes)?;
		let entry = self.entries.get(tag).ok_or_else(|| error!(unregistered_type(tag)))?;
		Ok(Decoded {
			tag: tag.to_string(),
			value: (entry.decode)(payload)?,
		})
	}

	/// Renders any registered value as text. Strings are returned as-is,
	/// everything else as its JSON representation.
	pub fn render(&self, bytes: &[u8]) -> Result<String> {
		let (tag, payload) = payload_of(bytes)?;
		let entry = self.entries.get(tag).ok_or_else(|| error!(unregistered_type(tag)))?;
		(entry.render)(payload)
	}
}

impl Default for TypeRegistry {
	fn default() -> Self {
		Self::with_builtins()
	}
}

fn decode_boxed<T>(payload: &[u8]) -> Result<Box<dyn Any + Send + Sync>>
where
	T: Registered + Send + Sync + 'static,
{
	Ok(Box::new(decode_payload::<T>(payload)?))
}

fn render<T: Registered>(payload: &[u8]) -> Result<String> {
	let value = decode_payload::<T>(payload)?;
	match serde_json::to_value(&value).map_err(|e| error!(encode_failed(e.to_string())))? {
		serde_json::Value::String(s) => Ok(s),
		other => Ok(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	use super::*;
	use crate::encoding::encode;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct RuleStatus {
		running: bool,
		restarts: u32,
	}

	impl Registered for RuleStatus {
		const TYPE_NAME: &'static str = "rule_status";
	}

	#[test]
	fn test_decode_any_builtin() {
		let registry = TypeRegistry::with_builtins();
		let decoded = registry.decode_any(&encode(&42i64).unwrap()).unwrap();
		assert_eq!(decoded.tag(), "i64");
		assert_eq!(decoded.downcast::<i64>(), Some(42));
	}

	#[test]
	fn test_decode_any_registered_type() {
		let mut registry = TypeRegistry::with_builtins();
		registry.register::<RuleStatus>();

		let status = RuleStatus {
			running: true,
			restarts: 2,
		};
		let decoded = registry.decode_any(&encode(&status).unwrap()).unwrap();
		assert!(decoded.is::<RuleStatus>());
		assert_eq!(decoded.downcast_ref::<RuleStatus>(), Some(&status));
	}

	#[test]
	fn test_unregistered_tag() {
		let registry = TypeRegistry::new();
		let err = registry.decode_any(&encode(&"x".to_string()).unwrap()).unwrap_err();
		assert_eq!(err.code(), "ENC_004");
	}

	#[test]
	fn test_render() {
		let registry = TypeRegistry::with_builtins();
		assert_eq!(registry.render(&encode(&"plain".to_string()).unwrap()).unwrap(), "plain");
		assert_eq!(registry.render(&encode(&12u64).unwrap()).unwrap(), "12");
		assert_eq!(registry.render(&encode(&false).unwrap()).unwrap(), "false");
	}
}
