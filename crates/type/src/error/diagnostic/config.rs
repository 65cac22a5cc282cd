// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// Backend type string does not name a known backend
pub fn unknown_backend(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CFG_001".to_string(),
		message: format!("unknown store type '{}'", name),
		label: None,
		help: Some("expected one of: sqlite, redis, rocksdb, pebble, fdb, memory".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Backend needs a directory but none was configured
pub fn missing_directory(backend: &str) -> Diagnostic {
	Diagnostic {
		code: "CFG_002".to_string(),
		message: format!("{} store requires a data directory", backend),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_table_name(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CFG_003".to_string(),
		message: format!("invalid table name '{}'", name),
		label: Some("table names must match ^[A-Za-z_][A-Za-z0-9/_]*$".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_option(option: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "CFG_004".to_string(),
		message: format!("invalid store option '{}': {}", option, reason.into()),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
