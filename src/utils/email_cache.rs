use moka::future::Cache;
use std::time::Duration;

/// Recently confirmed registered emails.
/// true  => email is TAKEN (only taken emails are stored)
pub struct EmailCache {
    cache: Cache<String, bool>,
}

impl Default for EmailCache {
    fn default() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(86400)) // 24h TTL
                .build(),
        }
    }
}

impl EmailCache {
    pub async fn mark_taken(&self, email: &str) {
        self.cache.insert(email.to_string(), true).await;
    }

    pub async fn is_taken(&self, email: &str) -> bool {
        self.cache.get(email).await.unwrap_or(false)
    }

    /// Batch mark emails as taken
    pub async fn batch_mark(&self, emails: &[String]) {
        let futures: Vec<_> = emails
            .iter()
            .map(|e| self.cache.insert(e.clone(), true))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn remembers_taken_emails() {
        let cache = EmailCache::default();
        assert!(!cache.is_taken("ally@example.com").await);
        cache.mark_taken("ally@example.com").await;
        cache
            .batch_mark(&["jane@example.com".to_string(), "john@example.com".to_string()])
            .await;
        assert!(cache.is_taken("ally@example.com").await);
        assert!(cache.is_taken("john@example.com").await);
    }
}
