//! Common test utilities for musicfa-dl integration tests

#[allow(dead_code)]
pub mod config;
#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod site;

pub use config::*;
#[allow(unused_imports)]
pub use fixtures::*;
pub use site::*;
