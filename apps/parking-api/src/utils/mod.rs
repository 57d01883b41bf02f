//! HTTP 层辅助函数。

pub mod request_log;
pub mod response;
pub mod validation;

pub use request_log::record_api_call;
pub use validation::*;
