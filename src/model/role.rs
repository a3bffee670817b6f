use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    /// Role granted at signup. The client never picks its own role; only
    /// addresses on the configured allow-list become admins.
    pub fn for_signup(email: &str, admin_emails: &[String]) -> Self {
        if admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)) {
            Role::Admin
        } else {
            Role::Employee
        }
    }

    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Employee => "/employee/dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_stored_role_names() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("employee").unwrap(), Role::Employee);
        assert!(Role::from_str("hr").is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn signup_role_comes_from_allow_list_only() {
        let admins = vec!["boss@company.com".to_string()];
        assert_eq!(Role::for_signup("BOSS@company.com", &admins), Role::Admin);
        assert_eq!(Role::for_signup("someone@admin.com", &admins), Role::Employee);
        assert_eq!(Role::for_signup("boss@company.com", &[]), Role::Employee);
    }
}
