/// INSS and IRT statutory deductions
pub mod deductions;

/// Attendance capture and effectiveness processing
pub mod effectiveness;

/// Employee hiring, pay changes and lifecycle
pub mod employee;

/// Cash registers and ledger postings
pub mod ledger;

/// Period keys, derived processing state, and single/bulk transitions
pub mod period;

/// Salary slip computation
pub mod slip;

/// Period payroll summary
pub mod summary;

/// All-or-nothing salary transfer orders
pub mod transfer;
