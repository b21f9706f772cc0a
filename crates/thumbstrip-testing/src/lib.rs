//! Testing utilities and harness for thumbstrip

pub mod test_rule;
pub mod test_source;

pub use test_rule::*;
pub use test_source::*;
