use anyhow::Result;
use futures::StreamExt;

use crate::store::{Store, StoreError};
use crate::utils::{email_cache::EmailCache, email_filter::EmailFilter};

/// Fast signup pre-check in front of the store's unique email index.
#[derive(Default)]
pub struct EmailRegistry {
    filter: EmailFilter,
    cache: EmailCache,
}

impl EmailRegistry {
    /// true  => email AVAILABLE
    /// false => email TAKEN
    ///
    /// `email` must already be normalized.
    pub async fn is_available(&self, email: &str, store: &dyn Store) -> Result<bool, StoreError> {
        // 1️⃣ Cuckoo filter: fast negative
        if !self.filter.might_exist(email) {
            return Ok(true);
        }

        // 2️⃣ Moka cache: fast positive
        if self.cache.is_taken(email).await {
            return Ok(false);
        }

        // 3️⃣ Store fallback
        let exists = store.find_user_by_email(email).await?.is_some();
        if exists {
            self.cache.mark_taken(email).await;
        }
        Ok(!exists)
    }

    /// Called once an account with this email has been persisted.
    pub async fn record(&self, email: &str) {
        self.filter.insert(email);
        self.cache.mark_taken(email).await;
    }

    /// Stream every stored email into the filter, `batch_size` at a time.
    pub async fn warmup(&self, store: &dyn Store, batch_size: usize) -> Result<()> {
        let batch_size = batch_size.max(1);
        let mut stream = store.email_stream();
        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(email) = stream.next().await {
            batch.push(email?);
            total += 1;

            if batch.len() == batch_size {
                self.filter.insert_batch(&batch);
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.filter.insert_batch(&batch);
        }

        log::info!("Email filter warmup complete: {} users", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{role::Role, user::NewUser};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, Utc};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane Smith".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Employee,
            phone: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn warmup_makes_existing_emails_unavailable() {
        let store = MemoryStore::new();
        store.insert_user(new_user("jane@example.com")).await.unwrap();
        store.insert_user(new_user("john@example.com")).await.unwrap();

        let registry = EmailRegistry::default();
        registry.warmup(&store, 1).await.unwrap();

        assert!(!registry.is_available("jane@example.com", &store).await.unwrap());
        assert!(!registry.is_available("john@example.com", &store).await.unwrap());
        assert!(registry.is_available("ally@example.com", &store).await.unwrap());
    }

    #[actix_web::test]
    async fn warmup_loads_a_trailing_partial_batch() {
        let store = MemoryStore::new();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            store.insert_user(new_user(email)).await.unwrap();
        }

        let registry = EmailRegistry::default();
        registry.warmup(&store, 2).await.unwrap();

        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            assert!(!registry.is_available(email, &store).await.unwrap());
        }
    }

    #[actix_web::test]
    async fn recorded_email_is_taken() {
        let store = MemoryStore::new();
        let registry = EmailRegistry::default();
        registry.record("ally@example.com").await;
        assert!(!registry.is_available("ally@example.com", &store).await.unwrap());
    }
}
