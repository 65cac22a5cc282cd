// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Contract suites shared by every backend.
//!
//! Each check opens its own table through the supplied factory, so a suite
//! can run against a long-lived server without clearing it first.

pub mod kv;
pub mod ts;
