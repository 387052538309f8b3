use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::middleware::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Login,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub auth: String,
    pub exp: usize,
    pub iat: usize,
    pub r#type: TokenType,
}

pub struct JWT {
    key_enc: EncodingKey,
    key_dec: DecodingKey,
    duration: TimeDelta,
}

impl JWT {
    pub fn new(secret: String, duration: TimeDelta) -> Self {
        Self {
            duration,
            key_enc: EncodingKey::from_secret(secret.as_ref()),
            key_dec: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn create_by_login(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            exp: (now + self.duration).timestamp() as usize,
            iat: now.timestamp() as usize,
            r#type: TokenType::Login,
        };

        Ok(encode(&Header::default(), &claims, &self.key_enc)?)
    }

    pub fn decode_by_type(&self, token: &str, r#type: TokenType) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.key_dec, &Validation::new(Algorithm::HS256))?
            .claims;

        if data.r#type == r#type {
            Ok(data)
        } else {
            Err(AppError::AuthFailJwtInvalid {
                source: "Token type is not equal".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn login_token_decodes_to_same_user() {
        let jwt = JWT::new("some-secret".to_string(), Duration::days(1));
        let token = jwt.create_by_login("abc123").unwrap();
        let claims = jwt.decode_by_type(&token, TokenType::Login).unwrap();
        assert_eq!(claims.auth, "abc123");
        assert_eq!(claims.sub, "abc123");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_fails() {
        let jwt = JWT::new("some-secret".to_string(), Duration::days(1));
        let other = JWT::new("other-secret".to_string(), Duration::days(1));
        let token = other.create_by_login("abc123").unwrap();
        let res = jwt.decode_by_type(&token, TokenType::Login);
        assert!(matches!(res, Err(AppError::AuthFailJwtInvalid { .. })));
    }

    #[test]
    fn expired_token_fails() {
        let jwt = JWT::new("some-secret".to_string(), Duration::days(-1));
        let token = jwt.create_by_login("abc123").unwrap();
        assert!(jwt.decode_by_type(&token, TokenType::Login).is_err());
    }
}
