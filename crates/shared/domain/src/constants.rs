//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Entity Codes
// =============================================================================

/// Code prefix for directorates (e.g. `DIR-004`)
pub const CODE_PREFIX_DIRECTORATE: &str = "DIR";

/// Code prefix for work units
pub const CODE_PREFIX_WORK_UNIT: &str = "WU";

/// Code prefix for affairs
pub const CODE_PREFIX_AFFAIR: &str = "AFF";

/// Code prefix for positions
pub const CODE_PREFIX_POSITION: &str = "POS";

/// Width of the zero-padded numeric part of a generated code
pub const CODE_NUMBER_WIDTH: usize = 3;

/// Placeholder shown when a referenced entity is absent
pub const EMPTY_DISPLAY: &str = "-";

// =============================================================================
// Updates
// =============================================================================

/// Fields that are always stripped from an update payload
pub const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "created_by"];

// =============================================================================
// Assignment Status
// =============================================================================

/// Assignment currently in force
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Assignment closed with an end date
pub const STATUS_ENDED: &str = "ENDED";

// =============================================================================
// Roles
// =============================================================================

/// Full access, including deletes and audit review
pub const ROLE_ADMIN: &str = "admin";

/// May read, create and update organization data
pub const ROLE_OPERATOR: &str = "operator";

/// Read-only access
pub const ROLE_VIEWER: &str = "viewer";

// =============================================================================
// Validation
// =============================================================================

/// Maximum name length accepted for organization units
pub const MAX_NAME_LENGTH: u64 = 200;

/// Lowest position level
pub const MIN_POSITION_LEVEL: i32 = 1;

/// Highest position level
pub const MAX_POSITION_LEVEL: i32 = 99;
