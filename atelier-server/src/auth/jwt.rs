//! JWT validation
//!
//! 令牌由认证协作方签发（HS256 共享密钥）。这里验证签名和
//! 过期时间，把声明转换为 [`Viewer`]。

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use shared::role::{Role, Viewer};
use thiserror::Error;

/// JWT 配置
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | JWT_SECRET | dev-secret-change-me | HS256 共享密钥 |
/// | JWT_EXPIRY_HOURS | 12 | 令牌有效期（小时） |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into()),
            expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Token claims: the viewer identity plus standard timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Viewer uid
    pub sub: String,
    /// Display name
    pub name: String,
    /// Dashboard role
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl From<Claims> for Viewer {
    fn from(claims: Claims) -> Self {
        Viewer {
            uid: claims.sub,
            display_name: claims.name,
            role: claims.role,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT 令牌服务
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            config,
        }
    }

    /// Extract the raw token from an `Authorization: Bearer <token>`
    /// header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Issue a token for a viewer.
    ///
    /// 生产环境由认证协作方签发；保留给测试和开发工具。
    pub fn issue(&self, viewer: &Viewer) -> Result<String, JwtError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: viewer.uid.clone(),
            name: viewer.display_name.clone(),
            role: viewer.role,
            iat: now,
            exp: now + self.config.expiry_hours * 3600,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new(JwtConfig::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiry_hours: 1,
        })
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let svc = service();
        let viewer = Viewer::new("u1", "Mohamed", Role::Originator);
        let token = svc.issue(&viewer).unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(Viewer::from(claims), viewer);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let svc = service();
        let other = JwtService::new(JwtConfig {
            secret: "other-secret".to_string(),
            expiry_hours: 1,
        });
        let token = other
            .issue(&Viewer::new("u1", "Mohamed", Role::Approver))
            .unwrap();
        assert!(matches!(
            svc.validate_token(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_header_extraction() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
