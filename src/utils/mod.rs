pub mod email_cache;
pub mod email_filter;
pub mod email_registry;
pub mod revoked_sessions;
pub mod time;
