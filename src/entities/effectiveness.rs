//! Effectiveness entity - Finalised attendance for one period key.
//!
//! At most one row exists per (employee, month, year). Presence of the row is
//! what "effectiveness processed" means; there is no partial state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Effectiveness record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "effectiveness_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub employee_id: i64,
    /// Period month, 1 to 12
    pub month: u32,
    pub year: i32,
    /// Manually entered absence days; replaces the per-day tally when present
    pub manual_absence_days: Option<i32>,
    /// Days classified as unjustified absence
    pub unjustified_absence_days: i32,
    /// Days classified as justified absence
    pub justified_absence_days: i32,
    /// Food subsidy for this period only
    pub food_subsidy_override: Option<f64>,
    /// Transport subsidy for this period only
    pub transport_subsidy_override: Option<f64>,
    pub processed_at: DateTimeUtc,
}

impl Model {
    /// Absence days that drive the salary deduction.
    #[must_use]
    pub fn absence_days(&self) -> i32 {
        self.manual_absence_days
            .unwrap_or(self.unjustified_absence_days)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Per-day classification rows
    #[sea_orm(has_many = "super::attendance_day::Entity")]
    Days,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::attendance_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Days.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
