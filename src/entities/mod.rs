//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance_day;
pub mod cash_register;
pub mod effectiveness;
pub mod employee;
pub mod employee_event;
pub mod ledger_posting;
pub mod salary_slip;
pub mod transfer_order;
pub mod transfer_order_item;

// Re-export specific types to avoid conflicts
pub use attendance_day::{
    Column as AttendanceDayColumn, DayKind, Entity as AttendanceDay, Model as AttendanceDayModel,
};
pub use cash_register::{
    Column as CashRegisterColumn, Entity as CashRegister, Model as CashRegisterModel,
};
pub use effectiveness::{
    Column as EffectivenessColumn, Entity as Effectiveness, Model as EffectivenessModel,
};
pub use employee::{
    Column as EmployeeColumn, EmploymentStatus, Entity as Employee, Model as EmployeeModel,
};
pub use employee_event::{
    Column as EmployeeEventColumn, EmployeeAction, Entity as EmployeeEvent,
    Model as EmployeeEventModel,
};
pub use ledger_posting::{
    Column as LedgerPostingColumn, Entity as LedgerPosting, Model as LedgerPostingModel,
};
pub use salary_slip::{
    Column as SalarySlipColumn, Entity as SalarySlip, Model as SalarySlipModel,
};
pub use transfer_order::{
    Column as TransferOrderColumn, Entity as TransferOrder, Model as TransferOrderModel,
};
pub use transfer_order_item::{
    Column as TransferOrderItemColumn, Entity as TransferOrderItem,
    Model as TransferOrderItemModel,
};
