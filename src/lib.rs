// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config; // graph options
pub mod errors; // error handling
pub mod graph; // builder + runtime
pub mod node; // stage functions and ports
pub mod observability;
pub mod stage; // identity, enablement, providers
