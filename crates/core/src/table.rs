// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Logical table names.
//!
//! SQL identifiers cannot be bound as statement parameters, so every
//! backend validates names up front against the same pattern. The
//! pattern excludes [`SEPARATOR`], which keeps prefix-emulated tables
//! (`rule` and `rule2`) from matching each other's keys.

use std::{fmt, ops::Deref};

use edgekv_type::{Result, diagnostic::config::invalid_table_name, return_error};
use once_cell::sync::Lazy;
use regex::Regex;

/// Separates the table prefix from the key on prefix-emulated backends.
pub const SEPARATOR: u8 = b':';

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^[A-Za-z_][A-Za-z0-9/_]*$").unwrap_or_else(|_| unreachable!("table name pattern is valid"))
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
	pub fn new(name: impl Into<String>) -> Result<Self> {
		let name = name.into();
		validate(&name)?;
		Ok(Self(name))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// `<table>:` as bytes.
	pub fn prefix(&self) -> Vec<u8> {
		let mut prefix = Vec::with_capacity(self.0.len() + 1);
		prefix.extend_from_slice(self.0.as_bytes());
		prefix.push(SEPARATOR);
		prefix
	}

	/// Exclusive upper bound of [`Self::prefix`], i.e. `<table>;`.
	pub fn prefix_end(&self) -> Vec<u8> {
		let mut end = Vec::with_capacity(self.0.len() + 1);
		end.extend_from_slice(self.0.as_bytes());
		end.push(SEPARATOR + 1);
		end
	}
}

impl Deref for TableName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl fmt::Display for TableName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

pub fn validate(name: &str) -> Result<()> {
	if !TABLE_NAME.is_match(name) {
		return_error!(invalid_table_name(name));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_valid_names() {
		for name in ["rules", "_tmp", "sink/cache_1", "A9", "rule_2/state"] {
			assert!(TableName::new(name).is_ok(), "{name} should be valid");
		}
	}

	#[test]
	fn test_rejects_leading_digit() {
		let err = TableName::new("1_abc").unwrap_err();
		assert_eq!(err.code(), "CFG_003");
		assert!(err.to_string().contains("1_abc"));
	}

	#[test]
	fn test_rejects_separator_and_quotes() {
		for name in ["", "a:b", "a\"b", "a b", "a-b", "drop table;"] {
			assert!(TableName::new(name).is_err(), "{name} should be rejected");
		}
	}

	#[test]
	fn test_prefix_bounds() {
		let table = TableName::new("rule").unwrap();
		assert_eq!(table.prefix(), b"rule:".to_vec());
		assert_eq!(table.prefix_end(), b"rule;".to_vec());

		let other = TableName::new("rule2").unwrap();
		assert!(!other.prefix().starts_with(&table.prefix()));
	}
}
