//! Access policy gate.
//!
//! Role checks are flat: an operation belongs either to admins or to
//! employees. A successful check hands out an [`AdminId`] or [`EmployeeId`],
//! and the lifecycle functions only accept those, so a transition cannot be
//! reached without passing the gate. Ownership is checked later, inside the
//! conditional store write.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use derive_more::Display;
use tracing::warn;

use crate::{auth::auth::AuthUser, error::AppError, model::role::Role};

const DENIAL_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[display(fmt = "view employee pages")]
    EmployeeView,
    #[display(fmt = "request shift")]
    RequestShift,
    #[display(fmt = "withdraw shift request")]
    WithdrawShiftRequest,
    #[display(fmt = "take open shift")]
    TakeShift,
    #[display(fmt = "request time off")]
    RequestTimeOff,
    #[display(fmt = "cancel time off")]
    CancelTimeOff,
    #[display(fmt = "view admin pages")]
    AdminView,
    #[display(fmt = "post shift")]
    PostShift,
    #[display(fmt = "approve shift request")]
    ApproveShiftRequest,
    #[display(fmt = "deny shift request")]
    DenyShiftRequest,
    #[display(fmt = "delete shift")]
    DeleteShift,
    #[display(fmt = "approve time off")]
    ApproveTimeOff,
    #[display(fmt = "deny time off")]
    DenyTimeOff,
    #[display(fmt = "create payroll")]
    CreatePayroll,
    #[display(fmt = "update payroll")]
    UpdatePayroll,
    #[display(fmt = "approve payroll")]
    ApprovePayroll,
    #[display(fmt = "mark payroll paid")]
    MarkPayrollPaid,
}

/// Proof that the caller passed the admin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminId(u64);

/// Proof that the caller passed the employee check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeId(u64);

impl AdminId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl EmployeeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
impl AdminId {
    pub fn for_tests(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
impl EmployeeId {
    pub fn for_tests(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub user_id: u64,
    pub role: Role,
    pub operation: Operation,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
pub struct AccessGate {
    denials: Mutex<VecDeque<Denial>>,
}

impl AccessGate {
    pub fn authorize_admin(&self, user: &AuthUser, op: Operation) -> Result<AdminId, AppError> {
        self.require(user, Role::Admin, op)?;
        Ok(AdminId(user.user_id))
    }

    pub fn authorize_employee(
        &self,
        user: &AuthUser,
        op: Operation,
    ) -> Result<EmployeeId, AppError> {
        self.require(user, Role::Employee, op)?;
        Ok(EmployeeId(user.user_id))
    }

    /// Most recent denials, oldest first.
    pub fn recent_denials(&self) -> Vec<Denial> {
        self.denials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn require(&self, user: &AuthUser, role: Role, op: Operation) -> Result<(), AppError> {
        if user.role == role {
            return Ok(());
        }

        warn!(
            user_id = user.user_id,
            email = %user.email,
            role = %user.role,
            operation = %op,
            "Access denied"
        );
        let mut denials = self.denials.lock().unwrap_or_else(PoisonError::into_inner);
        if denials.len() == DENIAL_LOG_CAPACITY {
            denials.pop_front();
        }
        denials.push_back(Denial {
            user_id: user.user_id,
            role: user.role,
            operation: op,
            at: Utc::now(),
        });

        Err(match role {
            Role::Admin => AppError::Forbidden("Access denied. Admins only."),
            Role::Employee => AppError::Forbidden("Access denied. Employees only."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, role: Role) -> AuthUser {
        AuthUser {
            user_id: id,
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[test]
    fn roles_map_to_typed_ids() {
        let gate = AccessGate::default();
        assert_eq!(
            gate.authorize_admin(&user(1, Role::Admin), Operation::PostShift).unwrap().get(),
            1
        );
        assert_eq!(
            gate.authorize_employee(&user(2, Role::Employee), Operation::TakeShift)
                .unwrap()
                .get(),
            2
        );
        assert!(gate.recent_denials().is_empty());
    }

    #[test]
    fn wrong_role_is_denied_and_recorded() {
        let gate = AccessGate::default();
        let err = gate
            .authorize_admin(&user(2, Role::Employee), Operation::ApprovePayroll)
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied. Admins only.");

        let err = gate
            .authorize_employee(&user(1, Role::Admin), Operation::RequestShift)
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied. Employees only.");

        let denials = gate.recent_denials();
        assert_eq!(denials.len(), 2);
        assert_eq!(denials[0].user_id, 2);
        assert_eq!(denials[0].operation, Operation::ApprovePayroll);
        assert_eq!(denials[1].role, Role::Admin);
    }

    #[test]
    fn denial_log_is_bounded() {
        let gate = AccessGate::default();
        for id in 0..(DENIAL_LOG_CAPACITY as u64 + 10) {
            let _ = gate.authorize_admin(&user(id, Role::Employee), Operation::AdminView);
        }
        let denials = gate.recent_denials();
        assert_eq!(denials.len(), DENIAL_LOG_CAPACITY);
        assert_eq!(denials[0].user_id, 10);
    }
}
