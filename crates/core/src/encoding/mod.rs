// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Value Encoder.
//!
//! Stored values are self-describing envelopes: a stable type tag plus the
//! serialized payload. Every backend stores the same bytes, so a value
//! written through one backend decodes unchanged from another. The bytes
//! are only guaranteed to round-trip through this implementation.

pub mod keycode;
mod registry;
mod value;

pub use registry::{Decoded, TypeRegistry};
pub use value::{EncodedValue, PayloadFormat, Registered, decode, encode, tag_of};
