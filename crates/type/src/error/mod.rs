// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

pub mod diagnostic;
mod r#macro;
mod render;

use diagnostic::{Diagnostic, store};
pub use render::DefaultRenderer;

/// Converts a domain error into a coded [`Diagnostic`].
pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

impl Error {
	pub fn new(diagnostic: impl IntoDiagnostic) -> Self {
		Self(Box::new(diagnostic.into_diagnostic()))
	}

	pub fn diagnostic(self) -> Diagnostic {
		*self.0
	}

	/// The stable code callers branch on, e.g. `STORE_001`.
	pub fn code(&self) -> &str {
		&self.0.code
	}

	pub fn is_not_found(&self) -> bool {
		self.code() == store::NOT_FOUND
	}

	pub fn is_already_exists(&self) -> bool {
		self.code() == store::ALREADY_EXISTS
	}
}

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl std::error::Error for Error {}

impl<D: IntoDiagnostic> From<D> for Error {
	fn from(diagnostic: D) -> Self {
		Error::new(diagnostic)
	}
}
