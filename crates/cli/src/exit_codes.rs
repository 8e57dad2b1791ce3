//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                       |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | Usage error (bad args, bad cell reference)    |
//! | 3    | I/O error (cannot read/write a file)          |
//! | 4    | Parse error (malformed JSON/CSV input)        |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed references or edit ops.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - cannot read or write a file.
pub const EXIT_IO: u8 = 3;

/// Parse error - structured input (JSON, CSV) could not be decoded.
pub const EXIT_PARSE: u8 = 4;
