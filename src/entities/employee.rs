//! Employee entity - A person under contract, owned by the HR module.
//!
//! Payroll reads the pay fields (base salary, complement, subsidies, standing
//! adjustments and penalties) and the banking fields. Lifecycle is a single
//! [`EmploymentStatus`]; every "is this employee payable" check goes through
//! [`EmploymentStatus::is_terminated`] or [`EmploymentStatus::is_active`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an employee
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum EmploymentStatus {
    /// Hired and working
    #[sea_orm(string_value = "active")]
    Active,
    /// Dismissed; blocked from every payroll operation
    #[sea_orm(string_value = "terminated")]
    Terminated,
    /// Temporarily away but still under contract
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
    /// Brought back after a dismissal
    #[sea_orm(string_value = "readmitted")]
    Readmitted,
}

impl EmploymentStatus {
    /// Dismissed employees cannot have effectiveness or salary processed.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Counted as active headcount (working or readmitted).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Readmitted)
    }
}

/// Employee database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Internal employee number, used in ledger references
    pub idnf: Option<String>,
    /// Full name
    pub name: String,
    /// Job title printed on the slip
    pub role: String,
    /// Monthly base salary in kwanzas
    pub base_salary: f64,
    /// Fixed salary complement paid on top of the base
    pub complement_salary: f64,
    pub subsidy_food: f64,
    pub subsidy_transport: f64,
    pub subsidy_housing: f64,
    pub subsidy_family: f64,
    pub subsidy_vacation: f64,
    pub subsidy_christmas: f64,
    /// Standing positive delta applied at slip-build time
    pub salary_adjustments: f64,
    /// Standing deduction applied at slip-build time
    pub penalties: f64,
    pub status: EmploymentStatus,
    pub dismissal_date: Option<Date>,
    pub dismissed_by: Option<String>,
    pub dismissal_reason: Option<String>,
    pub dismissal_occurrence: Option<String>,
    pub rehire_date: Option<Date>,
    pub rehire_orderer: Option<String>,
    pub rehire_reason: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub iban: Option<String>,
    pub admission_date: Date,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee has many lifecycle events
    #[sea_orm(has_many = "super::employee_event::Entity")]
    Events,
    /// One employee has many effectiveness records (one per period)
    #[sea_orm(has_many = "super::effectiveness::Entity")]
    Effectiveness,
    /// One employee has many salary slips (one per period)
    #[sea_orm(has_many = "super::salary_slip::Entity")]
    SalarySlips,
}

impl Related<super::employee_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl Related<super::effectiveness::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Effectiveness.def()
    }
}

impl Related<super::salary_slip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalarySlips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
