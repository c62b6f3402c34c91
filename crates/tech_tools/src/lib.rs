//! # Tech Development Tools
//!
//! Command-line tools for working on tech-tree data:
//! - Data validators
//! - Connector route reports
//! - Offline research simulation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod dataset;
pub mod error;
pub mod routes;
pub mod simulate;
pub mod validate;
