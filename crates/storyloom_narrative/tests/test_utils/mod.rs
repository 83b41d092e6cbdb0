//! Shared helpers for narrative integration tests.

#![allow(dead_code)]

pub mod mock_driver;

pub use mock_driver::{MockDriver, MockResponse};
