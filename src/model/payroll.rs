use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollStatus {
    Pending,
    Approved,
    Paid,
}

/// Hours, rate and deductions together with the pay derived from them.
///
/// Gross and net pay have no setters: the only way to obtain a value is
/// [`PayrollFigures::compute`], so a persisted record always satisfies
/// `gross = hours * rate` and `net = gross - deductions`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PayrollFigures {
    hours_worked: f64,
    hourly_rate: f64,
    deductions: f64,
    gross_pay: f64,
    net_pay: f64,
}

impl PayrollFigures {
    pub fn compute(hours_worked: f64, hourly_rate: f64, deductions: f64) -> Result<Self, String> {
        for (name, value) in [
            ("hours_worked", hours_worked),
            ("hourly_rate", hourly_rate),
            ("deductions", deductions),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number"));
            }
        }

        let gross_pay = hours_worked * hourly_rate;
        let net_pay = gross_pay - deductions;
        if !gross_pay.is_finite() || !net_pay.is_finite() {
            return Err("Payroll figures out of range".into());
        }

        Ok(Self {
            hours_worked,
            hourly_rate,
            deductions,
            gross_pay,
            net_pay,
        })
    }

    pub fn hours_worked(&self) -> f64 {
        self.hours_worked
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    pub fn deductions(&self) -> f64 {
        self.deductions
    }

    pub fn gross_pay(&self) -> f64 {
        self.gross_pay
    }

    pub fn net_pay(&self) -> f64 {
        self.net_pay
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "employee_id": 2,
    "period_start": "2025-11-16T12:00:00Z",
    "period_end": "2025-11-30T12:00:00Z",
    "hours_worked": 75.0,
    "hourly_rate": 25.0,
    "deductions": 280.0,
    "gross_pay": 1875.0,
    "net_pay": 1595.0,
    "status": "approved",
    "approved_by": 1,
    "paid_date": null,
    "notes": null
}))]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date-time")]
    pub period_start: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub period_end: DateTime<Utc>,
    #[serde(flatten)]
    pub figures: PayrollFigures,
    pub status: PayrollStatus,
    #[schema(nullable = true)]
    pub approved_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub paid_date: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayroll {
    pub employee_id: u64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub figures: PayrollFigures,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
