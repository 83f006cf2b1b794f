// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic event emitted by the builder and the runtime has its own
//! message type in [`messages`]. Message types carry the event's fields,
//! implement `Display` for the human-readable text, and implement
//! [`messages::StructuredLog`] to emit a `tracing` event with those fields
//! attached. Call sites never format log strings themselves.
//!
//! # Usage
//!
//! ```rust
//! use the_stagehand::observability::messages::builder::StageSkipped;
//! use the_stagehand::observability::messages::StructuredLog;
//!
//! StageSkipped {
//!     field: "tail",
//!     reason: "disabled by configuration",
//! }
//! .log();
//! ```

pub mod messages;
