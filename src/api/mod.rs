pub mod dashboard;
pub mod payroll;
pub mod shift;
pub mod time_off;
