//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured components
//! from application configuration.
//!
//! # Submodules
//!
//! - [`pipeline`] - Analysis pipeline construction
//! - [`source`] - Activity source construction

pub mod pipeline;
pub mod source;
