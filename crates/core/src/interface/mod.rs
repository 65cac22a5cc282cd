// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod driver;
mod kv;
mod ts;

pub use driver::Driver;
pub use kv::{KeyValue, KeyValueExt};
pub use ts::{Tskv, TskvExt};
