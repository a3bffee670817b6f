//! Record lifecycles for shifts, time-off requests and payroll.
//!
//! Functions here take the store, a typed caller id handed out by
//! [`AccessGate`](crate::auth::policy::AccessGate), the input and the
//! current instant. Each transition is delegated to exactly one conditional
//! store write; a `false` from the store means the record was missing, not
//! owned by the caller, or not in the expected state, and all three surface
//! as the same not-found error.

pub mod payroll;
pub mod shift;
pub mod time_off;

/// Blank optional text fields are stored as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use crate::model::{role::Role, user::NewUser, user::User};
    use crate::store::{MemoryStore, Store};

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .insert_user(NewUser {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password_hash: "hash".into(),
                role,
                phone: None,
                hire_date: day(2024, 1, 15),
                created_at: at(2024, 1, 15, 9),
            })
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Dock B ".into())), Some("Dock B".into()));
    }
}
