//! # Reporting Module / 报告模块
//!
//! This module handles the orchestration of remote reporting and the
//! console rendering of the session summary and warnings.
//!
//! 此模块处理远程报告的编排以及会话摘要和警告的控制台渲染。

pub mod console;
pub mod coordinator;

// Re-export common reporting types
pub use console::{SummaryEntry, print_summary, summary_entry};
pub use coordinator::{Disposition, ReportingCoordinator};
