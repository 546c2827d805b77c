#![allow(dead_code)]

pub mod test_utils;

pub use mocks::MockModelBackend;
pub use test_utils::*;
