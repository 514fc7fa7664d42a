//! 身份边界
//!
//! 认证协作方（外部）签发 JWT；本服务只做验证并注入
//! [`Viewer`](shared::role::Viewer) 身份，不存储凭证、不管理
//! 用户。签发函数保留给测试与开发工具。
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`require_auth`] - 认证中间件

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
