// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use edgekv_type::{Result, diagnostic::backend::connect_failed, error};
use rusqlite::{Connection, OpenFlags};

use super::DbPath;

pub(super) fn connect(path: &DbPath) -> Result<Connection> {
	let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
	match path {
		DbPath::File(path) => Connection::open_with_flags(path, flags).map_err(|e| {
			error!(connect_failed(
				"sqlite",
				format!("failed to open database at {}: {}", path.display(), e)
			))
		}),
		DbPath::Memory => Connection::open_in_memory_with_flags(flags)
			.map_err(|e| error!(connect_failed("sqlite", format!("failed to open in-memory database: {}", e)))),
	}
}

/// Creates the parent directory of a database file.
pub(super) fn resolve_db_path(path: &DbPath) -> Result<DbPath> {
	if let DbPath::File(file) = path {
		if let Some(parent) = file.parent() {
			std::fs::create_dir_all(parent).map_err(|e| {
				error!(connect_failed("sqlite", format!("failed to create {}: {}", parent.display(), e)))
			})?;
		}
	}
	Ok(path.clone())
}
