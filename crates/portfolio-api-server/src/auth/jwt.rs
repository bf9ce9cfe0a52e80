use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::utils::error::ApiError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Investor ID (Subject)
    pub exp: usize,  // Expiration
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn investor_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_seconds: u64,
}

impl JwtManager {
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds: expiry_hours * 3600,
        }
    }

    pub fn generate_token(&self, investor_id: Uuid) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
        let expiration = now + self.expiration_seconds as usize;

        let claims = Claims {
            sub: investor_id.to_string(),
            exp: expiration,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_subject() {
        let manager = JwtManager::new("test-secret", 1);
        let investor_id = Uuid::new_v4();

        let token = manager.generate_token(investor_id).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.investor_id().unwrap(), investor_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn validation_rejects_wrong_secret() {
        let manager = JwtManager::new("secret-a", 1);
        let other = JwtManager::new("secret-b", 1);

        let token = manager.generate_token(Uuid::new_v4()).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn validation_rejects_garbage() {
        let manager = JwtManager::new("test-secret", 1);
        assert!(manager.validate_token("not-a-token").is_err());
    }
}
