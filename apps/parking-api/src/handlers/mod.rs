//! Handlers 模块

pub mod auth;
pub mod parking;
pub mod registration;
pub mod reports;
pub mod system;
pub mod thresholds;

pub use auth::*;
pub use parking::*;
pub use registration::*;
pub use reports::*;
pub use system::*;
pub use thresholds::*;
