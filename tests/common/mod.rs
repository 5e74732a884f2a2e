//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod git_helpers;
pub mod mock_gitlab;
