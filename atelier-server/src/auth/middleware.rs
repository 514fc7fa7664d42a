//! 认证中间件
//!
//! 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
//! 验证成功后将 [`Viewer`] 注入请求扩展，处理器通过
//! `Extension<Viewer>` 取用。
//!
//! WebSocket 端点无法设置请求头（浏览器限制），允许通过
//! `?token=` 查询参数携带令牌。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::role::Viewer;

use crate::auth::{JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 认证中间件 - 要求有效的观看者身份
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/health`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    if path == "/api/health" {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?
            .to_string(),
        None => match token_from_query(req.uri().query()) {
            Some(token) => token,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
                return Err(AppError::unauthorized());
            }
        },
    };

    let jwt_service = state.get_jwt_service();
    match jwt_service.validate_token(&token) {
        Ok(claims) => {
            let viewer = Viewer::from(claims);
            req.extensions_mut().insert(viewer);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Pull `token=` out of a query string. JWTs are URL-safe, no
/// percent-decoding needed.
fn token_from_query(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "token")
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_query() {
        assert_eq!(
            token_from_query(Some("status=pending&token=abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(token_from_query(Some("status=pending")), None);
        assert_eq!(token_from_query(Some("token=")), None);
        assert_eq!(token_from_query(None), None);
    }
}
