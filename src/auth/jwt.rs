use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::{model::user::User, models::Claims};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_session_token(
    user: &User,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = Claims {
        user_id: user.id,
        sub: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: now().saturating_add(ttl),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use chrono::NaiveDate;

    fn user() -> User {
        User {
            id: 4,
            name: "Ally Hansen".into(),
            email: "ally@example.com".into(),
            password_hash: "x".into(),
            role: Role::Employee,
            phone: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_carries_identity() {
        let (token, issued) = generate_session_token(&user(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 4);
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = generate_session_token(&user(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn huge_ttl_saturates_expiry() {
        let (_, claims) = generate_session_token(&user(), "secret", usize::MAX).unwrap();
        assert_eq!(claims.exp, usize::MAX);
    }
}
