//! Typed GUID definitions for every resource the reconciler touches.
//!
//! Each GUID type has a unique prefix identifying the resource kind.
//! GUIDs are ULID-based for sortability and uniqueness.

use crate::define_guid;

// =============================================================================
// Application Model
// =============================================================================

define_guid!(AppGuid, "app");
define_guid!(VersionGuid, "ver");
define_guid!(DropletGuid, "drp");

// =============================================================================
// Routing
// =============================================================================

define_guid!(RouteGuid, "rte");

// =============================================================================
// Tests
// =============================================================================
