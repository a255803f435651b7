//! CLI Exit Code Registry
//!
//! Single source of truth for `ringscan` exit codes. Scripts driving batch
//! runs rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments)                          |
//! | 3    | Config file unreadable, unparsable or invalid        |
//! | 4    | Input library unreadable or missing schema columns   |
//! | 5    | Data incomplete (missing baseline, unresolved cell)  |
//! | 6    | Rendering failed (fonts, backgrounds, drawing)       |
//! | 7    | Charge output directory already exists               |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

/// Config file could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 3;

/// Input file unreadable, malformed CSV, or a schema column is absent.
pub const EXIT_INPUT: u8 = 4;

/// The library cannot produce a complete matrix or charge table.
pub const EXIT_INCOMPLETE: u8 = 5;

/// Figure or diagram rendering failed.
pub const EXIT_RENDER: u8 = 6;

/// The charge output directory exists and the policy forbids reuse.
pub const EXIT_OUTPUT_EXISTS: u8 = 7;
