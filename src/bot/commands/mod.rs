//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Attendance marking and summaries
pub mod attendance;

/// Backup, restore and clear-data commands
pub mod backup;

/// General utility commands
pub mod general;

/// Helper registry commands
pub mod helper;

/// Milk delivery commands
pub mod milk;

/// Salary and milk payment commands
pub mod payment;

/// Statement, dashboard and export commands
pub mod statement;

// Export commands
pub use attendance::*;
pub use backup::*;
pub use general::*;
pub use helper::*;
pub use milk::*;
pub use payment::*;
pub use statement::*;
