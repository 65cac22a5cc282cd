// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	env, fs, io,
	path::{Path, PathBuf},
};

use uuid::Uuid;

/// A uniquely named directory under the system temp dir, removed on drop.
///
/// Removal also happens when a test panics while holding it, so failed
/// backend tests do not leave database files behind.
pub struct TempDir {
	path: PathBuf,
}

impl TempDir {
	pub fn new() -> io::Result<Self> {
		let path = env::temp_dir().join(format!("edgekv-{}", Uuid::new_v4().simple()));
		fs::create_dir(&path)?;
		Ok(Self {
			path,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for TempDir {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.path);
	}
}

/// Runs `f` with a fresh directory that is removed afterwards.
pub fn temp_dir<F>(f: F) -> io::Result<()>
where
	F: FnOnce(&Path) -> io::Result<()>,
{
	let dir = TempDir::new()?;
	f(dir.path())
}
