// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod pool;
mod registry;

pub use pool::Pool;
pub use registry::StoreRegistry;
