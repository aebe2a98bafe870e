use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::jwt::JwtConfig;
use crate::ids::EntityId;
use crate::modules::auth::model::{Claims, Role};
use crate::utils::errors::AppError;

pub fn create_access_token(
    user_id: EntityId,
    role: Role,
    school_id: Option<EntityId>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        school_id,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("failed to create token: {}", e)))
}

/// Verify signature and expiry. Any failure maps to the same stable code so
/// callers cannot distinguish a forged token from an expired one.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::invalid_token())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_create_and_verify_round_trip() {
        let config = test_config();
        let token =
            create_access_token(EntityId(42), Role::Teacher, Some(EntityId(7)), &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.school_id, Some(EntityId(7)));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let config = test_config();
        let token = create_access_token(EntityId(1), Role::Student, None, &config).unwrap();

        let other = JwtConfig {
            secret: "different-secret".to_string(),
            access_token_expiry: 3600,
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify_token("not.a.token", &test_config()).unwrap_err();
        assert_eq!(err.code, "INVALID_TOKEN");
    }
}
