// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, ops::Deref};

use chrono::{DateTime, Utc};
use edgekv_type::{
	Result,
	diagnostic::encoding::{decode_failed, encode_failed, type_mismatch},
	error,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Opaque bytes produced by [`encode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedValue(pub Vec<u8>);

impl EncodedValue {
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(bytes.into())
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl Deref for EncodedValue {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<Vec<u8>> for EncodedValue {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
	/// Compact binary, for types with a fixed shape.
	Postcard,
	/// JSON text, for types that need a self-describing payload.
	Json,
}

/// A type that can be stored through the Value Encoder.
///
/// `TYPE_NAME` is written into every envelope and must never change once
/// values of the type have been persisted.
pub trait Registered: Serialize + DeserializeOwned {
	const TYPE_NAME: &'static str;
	const FORMAT: PayloadFormat = PayloadFormat::Postcard;
}

macro_rules! registered {
	($($ty:ty => $name:literal),* $(,)?) => {
		$(impl Registered for $ty {
			const TYPE_NAME: &'static str = $name;
		})*
	};
}

registered! {
	String => "string",
	bool => "bool",
	i64 => "i64",
	u64 => "u64",
	f64 => "f64",
	Vec<u8> => "bytes",
	DateTime<Utc> => "time",
	HashMap<String, String> => "map",
}

impl Registered for serde_json::Value {
	const TYPE_NAME: &'static str = "json";
	const FORMAT: PayloadFormat = PayloadFormat::Json;
}

#[derive(Serialize, Deserialize)]
struct Envelope<'a> {
	tag: &'a str,
	#[serde(with = "serde_bytes")]
	payload: &'a [u8],
}

pub fn encode<T: Registered>(value: &T) -> Result<EncodedValue> {
	let payload = match T::FORMAT {
		PayloadFormat::Postcard => postcard::to_stdvec(value).map_err(|e| error!(encode_failed(e.to_string())))?,
		PayloadFormat::Json => serde_json::to_vec(value).map_err(|e| error!(encode_failed(e.to_string())))?,
	};

	let envelope = Envelope {
		tag: T::TYPE_NAME,
		payload: &payload,
	};
	let bytes = postcard::to_stdvec(&envelope).map_err(|e| error!(encode_failed(e.to_string())))?;
	Ok(EncodedValue(bytes))
}

pub fn decode<T: Registered>(bytes: &[u8]) -> Result<T> {
	let envelope = open(bytes)?;
	if envelope.tag != T::TYPE_NAME {
		return Err(error!(type_mismatch(T::TYPE_NAME, envelope.tag)));
	}
	decode_payload::<T>(envelope.payload)
}

/// Type tag carried by an encoded value.
pub fn tag_of(bytes: &[u8]) -> Result<&str> {
	Ok(open(bytes)?.tag)
}

pub(super) fn payload_of(bytes: &[u8]) -> Result<(&str, &[u8])> {
	let envelope = open(bytes)?;
	Ok((envelope.tag, envelope.payload))
}

pub(super) fn decode_payload<T: Registered>(payload: &[u8]) -> Result<T> {
	match T::FORMAT {
		PayloadFormat::Postcard => {
			postcard::from_bytes(payload).map_err(|e| error!(decode_failed(format!("{}: {}", T::TYPE_NAME, e))))
		}
		PayloadFormat::Json => serde_json::from_slice(payload)
			.map_err(|e| error!(decode_failed(format!("{}: {}", T::TYPE_NAME, e)))),
	}
}

fn open(bytes: &[u8]) -> Result<Envelope<'_>> {
	let (envelope, rest): (Envelope<'_>, _) =
		postcard::take_from_bytes(bytes).map_err(|e| error!(decode_failed(e.to_string())))?;
	if !rest.is_empty() {
		return Err(error!(decode_failed(format!("{} trailing bytes after value", rest.len()))));
	}
	Ok(envelope)
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use serde_json::json;

	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Checkpoint {
		offset: u64,
		source: String,
	}

	impl Registered for Checkpoint {
		const TYPE_NAME: &'static str = "checkpoint";
	}

	#[test]
	fn test_string() {
		let encoded = encode(&"bar1".to_string()).unwrap();
		assert_eq!(decode::<String>(&encoded).unwrap(), "bar1");
		assert_eq!(tag_of(&encoded).unwrap(), "string");
	}

	#[test]
	fn test_time() {
		let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
		let encoded = encode(&at).unwrap();
		assert_eq!(decode::<DateTime<Utc>>(&encoded).unwrap(), at);
	}

	#[test]
	fn test_json_payload() {
		let value = json!({"count": 3, "enabled": true, "tags": ["a", "b"]});
		let encoded = encode(&value).unwrap();
		assert_eq!(decode::<serde_json::Value>(&encoded).unwrap(), value);
	}

	#[test]
	fn test_application_type() {
		let checkpoint = Checkpoint {
			offset: 42,
			source: "mqtt".to_string(),
		};
		let encoded = encode(&checkpoint).unwrap();
		assert_eq!(tag_of(&encoded).unwrap(), "checkpoint");
		assert_eq!(decode::<Checkpoint>(&encoded).unwrap(), checkpoint);
	}

	#[test]
	fn test_type_mismatch() {
		let encoded = encode(&7i64).unwrap();
		let err = decode::<String>(&encoded).unwrap_err();
		assert_eq!(err.code(), "ENC_003");
	}

	#[test]
	fn test_corrupt_bytes() {
		let err = decode::<String>(b"not_an_envelope").unwrap_err();
		assert_eq!(err.code(), "ENC_002");

		let err = decode::<String>(&[]).unwrap_err();
		assert_eq!(err.code(), "ENC_002");
	}

	#[test]
	fn test_trailing_bytes() {
		let mut encoded = encode(&true).unwrap().into_inner();
		encoded.push(0);
		assert_eq!(decode::<bool>(&encoded).unwrap_err().code(), "ENC_002");
	}
}
