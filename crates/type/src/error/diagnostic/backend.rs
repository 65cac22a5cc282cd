// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Failures reported by the storage technology itself. The message of the
//! underlying driver is carried verbatim.

use super::Diagnostic;

pub fn connect_failed(backend: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "BACKEND_001".to_string(),
		message: format!("failed to connect {} backend: {}", backend, reason.into()),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn operation_failed(backend: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "BACKEND_002".to_string(),
		message: format!("{} operation failed: {}", backend, reason.into()),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn transaction_failed(backend: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "BACKEND_003".to_string(),
		message: format!("{} transaction failed: {}", backend, reason.into()),
		label: None,
		help: Some("the transaction may be retried".to_string()),
		notes: vec![],
		cause: None,
	}
}
