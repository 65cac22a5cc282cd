// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn encode_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "ENC_001".to_string(),
		message: format!("failed to encode value: {}", reason.into()),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn decode_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "ENC_002".to_string(),
		message: format!("failed to decode value: {}", reason.into()),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Encoded tag differs from the requested type
pub fn type_mismatch(expected: &str, actual: &str) -> Diagnostic {
	Diagnostic {
		code: "ENC_003".to_string(),
		message: format!("expected value of type '{}', found '{}'", expected, actual),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Encoded tag has no registered decoder
pub fn unregistered_type(tag: &str) -> Diagnostic {
	Diagnostic {
		code: "ENC_004".to_string(),
		message: format!("no decoder registered for type '{}'", tag),
		label: None,
		help: Some("register the type before decoding values that carry it".to_string()),
		notes: vec![],
		cause: None,
	}
}
