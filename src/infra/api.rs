//! # Remote API Interface Module / 远程 API 接口模块
//!
//! This module defines the contract the reporting engine requires from an
//! Adaptavist Test Management client. The client itself (transport,
//! authentication, retry policy) lives outside this crate; anything
//! implementing [`AdaptavistApi`] can be driven by the coordinator.
//!
//! 此模块定义了报告引擎对 Adaptavist Test Management 客户端的契约要求。
//! 客户端本身（传输、认证、重试策略）位于此 crate 之外；
//! 任何实现了 [`AdaptavistApi`] 的东西都可以由协调器驱动。

use anyhow::Result;

use crate::core::models::{RunIdentity, StepStatus, TestStatus};

/// The consumed surface of the remote test management system.
///
/// Calls are not retried by this engine; a failed call surfaces as an error
/// of the reporting phase and never masks the test's own verdict.
///
/// 远程测试管理系统被消费的接口面。
///
/// 本引擎不会重试调用；失败的调用作为报告阶段的错误浮出，
/// 绝不会掩盖测试自身的判定。
#[allow(async_fn_in_trait)]
pub trait AdaptavistApi {
    /// Creates a new test run and returns its run key.
    /// 创建一个新的测试运行并返回其运行键。
    async fn create_test_run(&self, project_key: &str, run_name: &str) -> Result<String>;

    /// Fetches an existing test run, or `None` when the key is unknown.
    /// 获取一个已存在的测试运行；键未知时返回 `None`。
    async fn get_test_run(&self, run_key: &str) -> Result<Option<RunIdentity>>;

    /// Writes the result of one test case within a run. Reporting the same
    /// case twice overwrites the earlier record (last write wins remotely).
    /// 写入一次运行中单个测试用例的结果。
    /// 对同一用例报告两次会覆盖较早的记录（远端后写优先）。
    async fn execute_test_result(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        environment: &str,
        status: TestStatus,
        comment: Option<&str>,
    ) -> Result<()>;

    /// Writes the result of one step of a test case.
    /// 写入测试用例单个步骤的结果。
    async fn execute_test_step(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        step_index: usize,
        status: StepStatus,
        comment: Option<&str>,
    ) -> Result<()>;

    /// Attaches a payload to the test-case result. Per-step attachment is
    /// not part of this surface; attachments always target the case level.
    /// 将负载附加到测试用例结果上。单步附件不属于此接口面；
    /// 附件总是针对用例级别。
    async fn add_test_result_attachment(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        attachment: &[u8],
        filename: &str,
    ) -> Result<()>;

    /// Whether the remote system knows this user identity.
    /// 远程系统是否认识此用户身份。
    async fn user_is_valid(&self, user_id: &str) -> Result<bool>;
}
