//! # Outcome Reduction Module / 结果归约模块
//!
//! This module combines a test's raw runner result with the steps its body
//! recorded into one external status. Reduction happens once per test at
//! teardown; the produced outcome is immutable afterwards.
//!
//! 此模块将测试的原始运行器结果与其测试体记录的步骤合并为一个外部状态。
//! 归约在测试拆卸时每个测试进行一次；产生的结果此后不可变。

use crate::core::models::{
    CompletedTest, MarkerKind, RawTestResult, Step, StepStatus, TestCaseRef, TestOutcome,
    TestStatus,
};

/// Reduces one raw result plus recorded steps into the final outcome.
///
/// The decision table is evaluated in order: blocked wins over everything,
/// a runner skip maps to `Not Executed`, any failed step or a failed test
/// body yields `Fail`, and only then `Pass`. Step comments and attachments
/// are carried through unmodified.
///
/// 将一个原始结果加上记录的步骤归约为最终结果。
///
/// 决策表按顺序求值：阻塞优先于一切，运行器跳过映射为 `Not Executed`，
/// 任何失败的步骤或失败的测试体产生 `Fail`，然后才是 `Pass`。
/// 步骤的注释和附件原样透传。
pub fn reduce(result: &RawTestResult, steps: Vec<Step>, case_ref: TestCaseRef) -> TestOutcome {
    let (status, comment) = match result {
        RawTestResult::Blocked { reason } => (TestStatus::Blocked, reason.clone()),
        RawTestResult::Skipped { reason } => (TestStatus::NotExecuted, reason.clone()),
        RawTestResult::Failed { message } => (TestStatus::Fail, message.clone()),
        RawTestResult::Passed => {
            if steps.iter().any(|step| step.status == StepStatus::Fail) {
                (TestStatus::Fail, None)
            } else {
                (TestStatus::Pass, None)
            }
        }
    };

    TestOutcome {
        case_ref,
        status,
        steps,
        comment,
    }
}

/// The status a test carries in local accounting, independent of whether it
/// was reportable. Blocked stays blocked even for tests that never reach the
/// remote system.
///
/// 测试在本地计数中携带的状态，与其是否可报告无关。
/// 即使测试从未到达远程系统，阻塞的测试仍然是阻塞的。
pub fn local_status(test: &CompletedTest) -> TestStatus {
    if test.has_marker(MarkerKind::Block) {
        return TestStatus::Blocked;
    }
    match &test.result {
        RawTestResult::Blocked { .. } => TestStatus::Blocked,
        RawTestResult::Skipped { .. } => TestStatus::NotExecuted,
        RawTestResult::Failed { .. } => TestStatus::Fail,
        RawTestResult::Passed => {
            if test.steps.iter().any(|step| step.status == StepStatus::Fail) {
                TestStatus::Fail
            } else {
                TestStatus::Pass
            }
        }
    }
}

/// Convenience over [`reduce`] for a completed handoff value: a `block`
/// marker forces the blocked branch even when the runner executed the body.
///
/// [`reduce`] 的便捷封装，用于已完成的移交值：`block` 标记会强制进入阻塞分支，
/// 即使运行器执行了测试体。
pub fn reduce_test(test: &CompletedTest, case_ref: TestCaseRef) -> TestOutcome {
    if test.has_marker(MarkerKind::Block) && !test.result.is_blocked() {
        return reduce(
            &RawTestResult::Blocked { reason: None },
            test.steps.clone(),
            case_ref,
        );
    }
    reduce(&test.result, test.steps.clone(), case_ref)
}
