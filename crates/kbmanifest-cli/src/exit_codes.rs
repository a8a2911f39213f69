//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the configuration violates the kind's constraints
pub const VALIDATION_ERROR: i32 = 2;

/// Render error - the manifest could not be serialized
pub const RENDER_ERROR: i32 = 3;

/// Data source error - unknown or ambiguous data source
pub const DATA_SOURCE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
