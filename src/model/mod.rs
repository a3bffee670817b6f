pub mod payroll;
pub mod role;
pub mod shift;
pub mod time_off;
pub mod user;
