//! Payroll configuration loading from payroll.toml
//!
//! The company identifier, transfer-order conventions and the cash registers
//! to seed on first run are read from a TOML file and passed explicitly to
//! the operations that need them.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire payroll.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// Tenant the payroll runs for
    pub company: CompanyConfig,
    /// Transfer-order and ledger conventions
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Cash registers to create when the database has none
    #[serde(default)]
    pub cash_registers: Vec<CashRegisterConfig>,
}

/// Company (tenant) identification
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyConfig {
    /// Identifier stamped on every ledger posting and transfer order
    pub id: String,
    /// Display name
    pub name: String,
}

/// Conventions used when building transfer orders and ledger postings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Prefix of the transfer reference, followed by `/ddmmyyyy`
    pub reference_prefix: String,
    /// Bank name printed for employees without banking details
    pub default_bank_name: String,
    /// Operator recorded on ledger postings
    pub operator_name: String,
    /// Origin module recorded on ledger postings
    pub origin: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            reference_prefix: "1250.1".to_string(),
            default_bank_name: "Pagamento em Mão".to_string(),
            operator_name: "RH System".to_string(),
            origin: "RH".to_string(),
        }
    }
}

/// A cash register to seed
#[derive(Debug, Clone, Deserialize)]
pub struct CashRegisterConfig {
    pub name: String,
    #[serde(default)]
    pub opening_balance: f64,
}

impl PayrollConfig {
    /// Builds a configuration for the given company with default transfer conventions.
    #[must_use]
    pub fn for_company(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            company: CompanyConfig {
                id: id.into(),
                name: name.into(),
            },
            transfer: TransferConfig::default(),
            cash_registers: Vec::new(),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.company.id.trim().is_empty() {
            return Err(Error::Config {
                message: "company.id cannot be empty".to_string(),
            });
        }
        if let Some(register) = self
            .cash_registers
            .iter()
            .find(|r| r.name.trim().is_empty() || !r.opening_balance.is_finite())
        {
            return Err(Error::Config {
                message: format!("Invalid cash register entry: {register:?}"),
            });
        }
        Ok(self)
    }
}

/// Parses payroll configuration from TOML text
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid, required fields are
/// missing, or the company id is blank.
pub fn parse_config(contents: &str) -> Result<PayrollConfig> {
    let config: PayrollConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse payroll.toml: {e}"),
    })?;
    config.validate()
}

/// Loads payroll configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PayrollConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads payroll configuration from `PAYROLL_CONFIG`, or ./payroll.toml when unset
pub fn load_default_config() -> Result<PayrollConfig> {
    let path = std::env::var("PAYROLL_CONFIG").unwrap_or_else(|_| "payroll.toml".to_string());
    load_config(path)
}
