//! Record filters.

pub mod window;

pub use window::*;
