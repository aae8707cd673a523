//! # Adaptavist Reporter Library / Adaptavist Reporter 库
//!
//! This library maps the execution of individual test functions onto result
//! records in Adaptavist Test Management: each test, and each logical step
//! inside a test, becomes exactly one reported outcome attributed to the
//! correct test case key, test run key and environment.
//!
//! 此库将单个测试函数的执行映射为 Adaptavist Test Management 中的结果记录：
//! 每个测试以及测试内的每个逻辑步骤，都恰好成为一个归属于正确的
//! 测试用例键、测试运行键和环境的已报告结果。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, case identification, step
//!   tracking and outcome reduction
//! - `infra` - The consumed remote API interface and cross-process
//!   coordination
//! - `reporting` - The reporting coordinator and console rendering
//! - `cli` - The flag surface a host runner embeds
//!
//! - `core` - 数据模型、配置、用例识别、步骤跟踪和结果归约
//! - `infra` - 被消费的远程 API 接口和跨进程协调
//! - `reporting` - 报告协调器和控制台渲染
//! - `cli` - 宿主运行器嵌入的标志接口面

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::steps;

use crate::core::models::MarkerSpec;

/// Performs the one-time startup registration and returns the marker
/// metadata the host runner should list. Calling it again returns the same
/// registry.
///
/// 执行一次性的启动注册，并返回宿主运行器应列出的标记元数据。
/// 再次调用会返回同一个注册表。
pub fn init() -> &'static [MarkerSpec] {
    crate::core::models::registered_markers()
}
