/// Database configuration and connection management
pub mod database;

/// Payroll configuration loading from payroll.toml
pub mod payroll;

pub use payroll::{CashRegisterConfig, CompanyConfig, PayrollConfig, TransferConfig};
