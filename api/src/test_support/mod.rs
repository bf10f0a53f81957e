//! Helpers for writing tests against the catalog api.
//!
//! Test helper functions are a mixed blessing: shared fixtures and deep base
//! harness hierarchies make individual tests harder to read on their own. The
//! helpers collected here earn their place anyway, because they remove the
//! same boilerplate from nearly every functional test: getting a clean
//! database, calling an action or auth function directly, and talking to a
//! running server over HTTP.
//!
//! This module ships inside the library, not under `tests/`, so downstream
//! crates extending the catalog can reuse the same harness.

pub mod database;
pub mod forms;
pub mod harness;
pub mod helpers;
pub mod test_app;

pub use database::{create_catalog_database, reset_database};
pub use forms::{submit_fields, FieldValue, Form, FormField, SubmitError};
pub use harness::{FunctionalTestHarness, SettingsGuard};
pub use helpers::{call_action, call_auth, ContextParams};
pub use test_app::{spawn_test_app, spawn_test_app_with_settings, TestApp};
