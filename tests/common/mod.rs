//! Common test utilities, fixtures, and fakes
//! This module contains shared functionality used across different test categories

pub mod mocks;
