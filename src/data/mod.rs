//! Feed retrieval.
//!
//! - plain HTTP GET behind the `Fetch` seam (`http`)
//! - per-day file addressing with a one-day fallback (`dated`)
//! - the NVD vulnerability API adapter (`nvd`)

pub mod dated;
pub mod http;
pub mod nvd;

pub use dated::*;
pub use http::*;
pub use nvd::*;
