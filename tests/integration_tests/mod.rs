//! Integration tests module
//!
//! This module provides end-to-end integration tests for the merge pipeline,
//! including:
//! - Complete load → link → translate → augment → serialize runs
//! - Error handling and recovery scenarios

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
