//! # statesync-id
//!
//! Typed GUIDs for the statesync reconciler.
//!
//! ## Design Principles
//!
//! - GUIDs are opaque, system-generated tokens; the reconciler never invents
//!   them, it only relays what the desired-state authority hands out
//! - Every GUID has a canonical string representation with strict parsing
//! - GUIDs round-trip through serde (parse → format → parse)
//! - GUIDs are typed so a route GUID can never be passed where a process
//!   GUID is expected
//!
//! ## GUID Format
//!
//! Simple GUIDs use a prefixed format: `{prefix}_{ulid}`, e.g.
//! `app_01HV4Z2WQXKJNM8GPQY6VBKC3D`.
//!
//! A [`ProcessGuid`] is composite: it is derived from an application GUID
//! plus a process-version token and renders as `{app}-{version}`. The same
//! logical process yields a new `ProcessGuid` on every revision while the
//! application half stays stable.

mod error;
mod guids;
mod macros;
mod process;

pub use error::GuidError;
pub use guids::*;
pub use process::ProcessGuid;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
