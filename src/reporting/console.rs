//! # Console Reporting Module / 控制台报告模块
//!
//! This module renders the session summary and the user-visible warning
//! lines. It prints colorful, formatted output; the formatting functions are
//! separate from the printing ones so hosts and tests can capture the text.
//!
//! 此模块渲染会话摘要和用户可见的警告行。
//! 它打印彩色的格式化输出；格式化函数与打印函数分离，
//! 以便宿主和测试可以捕获文本。

use colored::*;

use crate::core::models::{CompletedTest, TestStatus};
use crate::core::outcome;
use crate::reporting::coordinator::Disposition;

/// One row of the session summary.
/// 会话摘要中的一行。
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub name: String,
    pub status: TestStatus,
    /// Whether a remote result call was made for this test.
    /// 是否为此测试进行了远程结果调用。
    pub transmitted: bool,
}

/// Builds one summary row from a finished test and its report disposition.
/// Tests outside the managed universe keep their local status.
/// 从一个已完成的测试及其报告处置构建一行摘要。
/// 受管范围之外的测试保留其本地状态。
pub fn summary_entry(test: &CompletedTest, disposition: &Disposition) -> SummaryEntry {
    SummaryEntry {
        name: test.name.clone(),
        status: disposition
            .effective_status()
            .unwrap_or_else(|| outcome::local_status(test)),
        transmitted: disposition.was_transmitted(),
    }
}

/// Prints a formatted summary of the session to the console.
/// Displays a table with status and test name, using color coding to
/// highlight the different statuses, followed by the per-status counts.
///
/// 在控制台打印会话的格式化摘要。
/// 显示一个包含状态和测试名称的表格，使用颜色编码突出显示不同的状态，
/// 随后是按状态的计数。
pub fn print_summary(entries: &[SummaryEntry]) {
    println!("\n{}", "--- Reporting Summary ---".bold());

    for entry in entries {
        let status_colored = match entry.status {
            TestStatus::Pass => entry.status.as_api_str().green(),
            TestStatus::Fail => entry.status.as_api_str().red(),
            TestStatus::Blocked => entry.status.as_api_str().yellow(),
            TestStatus::NotExecuted => entry.status.as_api_str().dimmed(),
        };
        let remote_note = if entry.transmitted {
            String::new()
        } else {
            " (not reported)".to_string()
        };
        println!(
            "  - {:<14} | {:<40}{}",
            status_colored,
            entry.name,
            remote_note.dimmed()
        );
    }

    println!("{}", format_counts(entries));
}

/// Renders the per-status counts line, e.g. `1 passed, 1 blocked`.
/// Statuses with a zero count are omitted.
/// 渲染按状态计数的行，例如 `1 passed, 1 blocked`。计数为零的状态被省略。
pub fn format_counts(entries: &[SummaryEntry]) -> String {
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut blocked = 0usize;
    let mut not_executed = 0usize;
    for entry in entries {
        match entry.status {
            TestStatus::Pass => passed += 1,
            TestStatus::Fail => failed += 1,
            TestStatus::Blocked => blocked += 1,
            TestStatus::NotExecuted => not_executed += 1,
        }
    }

    let mut parts = Vec::new();
    if passed > 0 {
        parts.push(format!("{passed} passed"));
    }
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }
    if blocked > 0 {
        parts.push(format!("{blocked} blocked"));
    }
    if not_executed > 0 {
        parts.push(format!("{not_executed} not executed"));
    }
    if parts.is_empty() {
        parts.push("no tests".to_string());
    }
    parts.join(", ")
}

/// The warning line emitted when the reporting identity is unknown to the
/// remote system. The substring `is not known in Adaptavist` is part of the
/// observable contract.
/// 当远程系统不认识报告身份时发出的警告行。
/// 子字符串 `is not known in Adaptavist` 是可观察契约的一部分。
pub fn unknown_user_warning(user: &str) -> String {
    format!(
        "Warning: reporting user '{user}' is not known in Adaptavist. Test results will not be reported."
    )
}

/// Prints the unknown-user warning in the console's warning color.
/// 以控制台的警告颜色打印未知用户警告。
pub fn print_unknown_user_warning(user: &str) {
    println!("{}", unknown_user_warning(user).yellow());
}
