//! Shared test utilities for steward integration tests.
//!
//! This module provides:
//! - In-memory fakes of the host store and both remote systems
//! - `TestHarness`, a controller wired to those fakes
//! - Builders for Project and Team declarations

pub mod fakes;
pub mod harness;

pub use builders::*;
pub use fakes::{FakeDirectory, FakeGitLab, MemoryStore};
pub use harness::*;
