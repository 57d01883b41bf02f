//! 中间件：请求上下文、会话校验、紧急停止。

pub mod auth;
pub mod kill_switch;

pub use auth::*;
pub use kill_switch::*;
