// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default capacity of the channel feeding each middle and terminal stage
pub const DEFAULT_CHANNEL_BUFFER_LEN: usize = 1;
/// Smallest channel capacity a bounded tokio channel accepts
pub const MIN_CHANNEL_BUFFER_LEN: usize = 1;
