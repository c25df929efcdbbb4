//! Salary slip entity - The computed compensation record for one period key.
//!
//! Every line item is stored so the slip can be printed or audited without
//! recomputation. Slips are never updated; they are only created or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Salary slip database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_slips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub employee_id: i64,
    /// Name as it was when the slip was built
    pub employee_name: String,
    pub employee_role: String,
    pub month: u32,
    pub year: i32,
    pub base_salary: f64,
    /// Salary complement
    pub allowances: f64,
    pub bonuses: f64,
    pub adjustments: f64,
    pub penalties: f64,
    /// Unjustified absence days deducted
    pub absences: i32,
    /// Justified absence days, shown but not deducted
    pub justified_absences: i32,
    pub absence_deduction: f64,
    pub gross_before_subsidies: f64,
    pub subsidy_food: f64,
    pub subsidy_transport: f64,
    pub subsidy_housing: f64,
    pub subsidy_vacation: f64,
    pub subsidy_christmas: f64,
    pub subsidy_family: f64,
    /// Sum of the six subsidies
    pub subsidies: f64,
    pub gross_total: f64,
    /// Employee social security (INSS, 3%)
    pub inss: f64,
    /// Progressive income tax (IRT)
    pub irt: f64,
    pub advances: f64,
    pub net_total: f64,
    pub is_processed: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
