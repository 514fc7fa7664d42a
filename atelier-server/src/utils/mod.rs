//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`AppResponse`] - 应用错误类型与 API 响应结构
//! - [`logger`] - tracing 初始化
//! - [`validation`] - 输入校验辅助
//! - [`time`] - Unix 毫秒时间戳

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

pub use error::{AppError, AppResponse, AppResult};
pub use error::{ok, ok_with_message};
pub use time::now_millis;
