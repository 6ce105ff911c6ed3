//! Text payload handling and output files.
//!
//! - header discovery in comment-prefixed CSV (`header`)
//! - record and line-list parsing (`records`)
//! - JSON export of a run (`export`)

pub mod export;
pub mod header;
pub mod records;

pub use export::*;
pub use header::*;
pub use records::*;
