// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking core for the Mailtrace email tracker.
//!
//! Three pieces: the pixel issuer ([`pixel`]), the open classifier
//! ([`classifier`]), and the deferred pipeline ([`pipeline`]) that turns a
//! pixel fetch into a receipt, a classification, and -- for genuine first
//! opens -- a read transition plus notification.

pub mod classifier;
pub mod pipeline;
pub mod pixel;

pub use classifier::is_genuine_open;
pub use pipeline::process_pixel_fetch;
pub use pixel::{TRACKING_PIXEL_PNG, TrackingPixel, embed_pixel, issue_pixel};
