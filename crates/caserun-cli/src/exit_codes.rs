//! Unified exit codes for the caserun CLI. Part of the public contract.

pub const SUCCESS: i32 = 0;
pub const CASES_FAILED: i32 = 1; // At least one case carried a failure annotation
pub const CONFIG_ERROR: i32 = 2; // Config missing/invalid, or a refused overwrite
pub const RUN_ERROR: i32 = 3; // Precondition failure aborted the run
