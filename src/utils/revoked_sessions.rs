use moka::future::Cache;
use std::time::Duration;

/// Session ids (`jti`) that were logged out before their token expired.
/// Entries only need to outlive the token itself.
pub struct RevokedSessions {
    cache: Cache<String, ()>,
}

impl RevokedSessions {
    pub fn new(session_ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1_000_000)
                .time_to_live(Duration::from_secs(session_ttl_secs.max(1)))
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.cache.contains_key(jti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn revoked_ids_are_remembered() {
        let revoked = RevokedSessions::new(60);
        assert!(!revoked.is_revoked("abc"));
        revoked.revoke("abc").await;
        assert!(revoked.is_revoked("abc"));
        assert!(!revoked.is_revoked("def"));
    }
}
