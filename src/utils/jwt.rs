use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::usuario::Role;

/// Claims portés par le JWT de session
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // usuario_id
    pub email: String,
    pub role: Role,
    pub empleado_id: Option<i32>,
    pub exp: i64,        // expiration timestamp
}

/// Génère un JWT de session pour un usuario
pub fn generate_token(
    usuario_id: i32,
    email: &str,
    role: Role,
    empleado_id: Option<i32>,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or("Failed to calculate expiration")?
        .timestamp();

    let claims = Claims {
        sub: usuario_id,
        email: email.to_string(),
        role,
        empleado_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un JWT de session
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}
