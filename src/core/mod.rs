//! Core household bookkeeping logic, independent of the Discord layer.

/// Attendance ledger
pub mod attendance;
/// Profile export, restore, and clearing
pub mod backup;
/// Helper registry
pub mod helper;
/// Lenient decoding of stored records
pub mod lenient;
/// Milk ledger
pub mod milk;
/// Month and date keys
pub mod month;
/// Payment ledger
pub mod payment;
/// Text rendering and money formatting
pub mod report;
/// Monthly aggregation of all ledgers
pub mod statement;
