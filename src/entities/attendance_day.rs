//! Attendance day entity - Classification of a single calendar day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a day was spent
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DayKind {
    #[sea_orm(string_value = "service")]
    Service,
    #[sea_orm(string_value = "day_off")]
    DayOff,
    #[sea_orm(string_value = "justified_absence")]
    JustifiedAbsence,
    #[sea_orm(string_value = "unjustified_absence")]
    UnjustifiedAbsence,
    #[sea_orm(string_value = "vacation")]
    Vacation,
}

/// Attendance day database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_days")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub effectiveness_id: i64,
    /// Day of month, starting at 1
    pub day: u32,
    pub kind: DayKind,
    pub overtime_hours: f64,
    pub lost_hours: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::effectiveness::Entity",
        from = "Column::EffectivenessId",
        to = "super::effectiveness::Column::Id"
    )]
    Effectiveness,
}

impl Related<super::effectiveness::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Effectiveness.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
