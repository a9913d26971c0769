//! Session-token types shared by Folio binaries.
//!
//! Provides JWT claim validation and the `BearerSession` extractor.

pub mod bearer;
pub mod token;
