//! AWS-oriented adapters and handlers for the upload-driven function deployer.
//!
//! This crate owns runtime integration details (the Lambda entry point, the
//! create/update workflow, and the provider adapter traits). Request
//! assembly and configuration contracts live in `deploy_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
