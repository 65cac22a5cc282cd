// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub const NOT_FOUND: &str = "STORE_001";
pub const ALREADY_EXISTS: &str = "STORE_002";
pub const NOT_INITIALIZED: &str = "STORE_003";
pub const NOT_CONNECTED: &str = "STORE_004";

/// Key was expected to exist but does not
pub fn not_found(table: &str, key: &str) -> Diagnostic {
	Diagnostic {
		code: NOT_FOUND.to_string(),
		message: format!("key '{}' not found in table '{}'", key, table),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Key already present on a set-if-absent write
pub fn already_exists(table: &str, key: &str) -> Diagnostic {
	Diagnostic {
		code: ALREADY_EXISTS.to_string(),
		message: format!("key '{}' already exists in table '{}'", key, table),
		label: None,
		help: Some("use an unconditional set to overwrite the value".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Pool has no builder installed
pub fn not_initialized(pool: &str) -> Diagnostic {
	Diagnostic {
		code: NOT_INITIALIZED.to_string(),
		message: format!("stores not initialized for pool '{}'", pool),
		label: None,
		help: Some("run registry setup before requesting stores".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn not_connected(backend: &str) -> Diagnostic {
	Diagnostic {
		code: NOT_CONNECTED.to_string(),
		message: format!("{} driver is not connected", backend),
		label: None,
		help: Some("the driver was disconnected or never opened".to_string()),
		notes: vec![],
		cause: None,
	}
}
