//! Integration tests against a live cluster running the Steward controllers.
//!
//! The shared harness and helpers live in `common.rs`.
//!
//! Requirements: a kubeconfig pointing at a cluster with Steward installed and
//! `E2E_CLIENT_NAMESPACE` set to an existing client namespace.
//! Run with: `cargo test --test integration -- --ignored`

mod common;

mod pipeline_runs;
