//! Typed views of the Steward custom resources driven by the harness.
//!
//! Only the fields the harness reads or writes are modelled; unknown fields
//! coming back from the API server are ignored.

pub mod pipeline_run;
pub mod tenant;
