//! Deployment domain primitives for the upload-driven function deployer.
//!
//! This crate owns the configuration document, the provider request
//! contracts, and the deterministic request-assembly rules. It intentionally
//! excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod event;
pub mod permissions;
