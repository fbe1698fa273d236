//! Test Helper Utilities
//!
//! Shared utilities for testing moodreads-engine

#![allow(dead_code)]

pub mod db_utils;
pub mod scripted_service;

pub use db_utils::{create_test_store, profiled_book, test_engine, test_engine_config};
pub use scripted_service::{profile_reply, ScriptedAnalysisService};
