//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the reporter, including
//! data models, configuration resolution, case identification, step
//! tracking and outcome reduction.
//!
//! 此模块包含报告器的核心功能，
//! 包括数据模型、配置解析、用例识别、步骤跟踪和结果归约。

pub mod config;
pub mod identify;
pub mod models;
pub mod outcome;
pub mod steps;

// Re-exports
pub use config::EffectiveConfig;
pub use identify::identify;
pub use models::{CompletedTest, TestOutcome, TestStatus};
pub use outcome::reduce;
pub use steps::StepTracker;
