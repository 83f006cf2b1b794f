// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod options;

pub mod consts;

pub use options::{load_options, GraphOptions};
