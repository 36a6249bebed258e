//! pipelinerun-e2e — end-to-end verification of Steward tenants and pipeline runs.
//!
//! The harness creates resources through a [`client::ResourceClient`], then
//! bridges their eventually-consistent status into synchronous pass / fail
//! outcomes by polling [`condition::Condition`]s with a [`waiter::Waiter`].
//! [`executor::Executor`] expands [`plan::TestPlans`] into uniquely named
//! cases and runs them inside a tenant that is always torn down afterwards.

pub mod builder;
pub mod cases;
pub mod client;
pub mod condition;
pub mod crd;
pub mod error;
pub mod executor;
pub mod fake;
pub mod lifecycle;
pub mod plan;
pub mod waiter;
