// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Builds an [`Error`](crate::Error) from a diagnostic.
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::Error::new($diagnostic)
	};
}

/// Returns early with an [`Error`](crate::Error) built from a diagnostic.
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::Error::new($diagnostic))
	};
}

#[cfg(test)]
mod tests {
	use crate::{Result, diagnostic::store};

	#[test]
	fn test_return_error() {
		fn lookup() -> Result<()> {
			return_error!(store::not_found("t", "k"));
		}
		let err = lookup().unwrap_err();
		assert!(err.is_not_found());
	}
}
