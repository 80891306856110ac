//! Advertisement format decoders.
//!
//! Each format follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access
//! - `fields`: raw-to-measurement transforms
//! - `parser`: assembly of the decoded reading (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O.

pub mod rawv2;
