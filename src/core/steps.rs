//! # Step Tracking Module / 步骤跟踪模块
//!
//! This module represents the scoped regions a test body opens to record one
//! or more checked assertions as ordered steps. Scopes accumulate their steps
//! locally and flush them into the per-test tracker on scope exit, including
//! when the scope body panicked.
//!
//! 此模块表示测试体为了将一个或多个检查断言记录为有序步骤而打开的作用域区域。
//! 作用域在本地累积其步骤，并在作用域退出时将它们刷新到每个测试的跟踪器中，
//! 包括作用域体发生 panic 的情况。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::models::{CompletedTest, Marker, RawTestResult, Step, StepStatus};

/// Optional details for a single `check` call.
/// 单次 `check` 调用的可选详细信息。
#[derive(Debug, Default, Clone)]
pub struct CheckDetail {
    /// Explicit step index. When absent, the call's ordinal position within
    /// the test (1-based) is used. Index uniqueness is the caller's
    /// responsibility; a duplicate index replaces the earlier step.
    /// 显式步骤索引。缺省时使用该调用在测试内的序号位置（从 1 开始）。
    /// 索引唯一性由调用者负责；重复的索引会替换先前的步骤。
    pub index: Option<usize>,
    pub comment: Option<String>,
    pub attachment: Option<Vec<u8>>,
    pub filename: Option<String>,
}

#[derive(Default)]
struct TrackerInner {
    steps: Vec<Step>,
    ordinal: usize,
}

impl TrackerInner {
    /// Inserts a step, replacing any earlier step with the same index.
    /// 插入一个步骤，替换任何具有相同索引的先前步骤。
    fn insert(&mut self, step: Step) {
        if let Some(existing) = self.steps.iter_mut().find(|s| s.index == step.index) {
            *existing = step;
        } else {
            self.steps.push(step);
        }
    }
}

/// Per-test accumulator for recorded steps and the `block()` invocation.
///
/// One tracker lives for the duration of one test body; a clone can be handed
/// into the test while the runner keeps the original for the handoff.
///
/// 每个测试的已记录步骤与 `block()` 调用的累加器。
///
/// 一个跟踪器存活于单个测试体的整个期间；可以将其克隆传入测试，
/// 同时运行器保留原件用于移交。
#[derive(Clone, Default)]
pub struct StepTracker {
    inner: Arc<Mutex<TrackerInner>>,
    blocked: Arc<AtomicBool>,
}

impl StepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a checking scope. Each `check` call inside it appends one step.
    /// 打开一个检查作用域。其中的每次 `check` 调用都会追加一个步骤。
    pub fn meta_block(&self) -> StepScope {
        StepScope {
            tracker: Arc::clone(&self.inner),
            pending: Vec::new(),
        }
    }

    /// Opens a bare numbered scope that only marks a step boundary. It
    /// captures no checks; a failure inside it surfaces as the test's own
    /// failure, not as a recorded step outcome.
    /// 打开一个仅标记步骤边界的裸编号作用域。它不捕获任何检查；
    /// 其中的失败表现为测试自身的失败，而不是记录的步骤结果。
    pub fn meta_block_at(&self, index: usize) -> StepBoundary {
        StepBoundary { index }
    }

    /// The `block()` invocation: marks this execution as intentionally not
    /// run to completion. / `block()` 调用：将本次执行标记为有意不运行到结束。
    pub fn block(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Snapshot of the steps recorded so far, in recording order.
    /// 到目前为止已记录步骤的快照，按记录顺序排列。
    pub fn steps(&self) -> Vec<Step> {
        lock(&self.inner).steps.clone()
    }

    /// Closes the tracker and builds the handoff value for the coordinator.
    /// A `block()` call turns the runner's verdict into a blocked result.
    /// 关闭跟踪器并构建移交给协调器的值。
    /// `block()` 调用会将运行器的判定转换为阻塞结果。
    pub fn finish(
        self,
        name: impl Into<String>,
        markers: Vec<Marker>,
        result: RawTestResult,
    ) -> CompletedTest {
        let result = if self.is_blocked() && !result.is_blocked() {
            RawTestResult::Blocked { reason: None }
        } else {
            result
        };
        let steps = std::mem::take(&mut lock(&self.inner).steps);
        CompletedTest::new(name, markers, result, steps)
    }
}

/// A checking scope yielded by [`StepTracker::meta_block`]. Steps accumulate
/// locally and are flushed into the tracker when the scope is dropped, even
/// if the scope body panicked.
///
/// 由 [`StepTracker::meta_block`] 产生的检查作用域。步骤在本地累积，
/// 并在作用域被丢弃时刷新到跟踪器中，即使作用域体发生了 panic。
pub struct StepScope {
    tracker: Arc<Mutex<TrackerInner>>,
    pending: Vec<Step>,
}

impl StepScope {
    /// Records one checked assertion under the call's ordinal index.
    /// 以该调用的序号索引记录一次检查断言。
    pub fn check(&mut self, condition: bool) {
        self.check_with(condition, CheckDetail::default());
    }

    /// Records one checked assertion with explicit details.
    /// 记录一次带有显式详细信息的检查断言。
    pub fn check_with(&mut self, condition: bool, detail: CheckDetail) {
        let index = match detail.index {
            Some(explicit) => explicit,
            None => {
                let mut inner = lock(&self.tracker);
                inner.ordinal += 1;
                inner.ordinal
            }
        };
        self.pending.push(Step {
            index,
            status: StepStatus::from_condition(condition),
            comment: detail.comment,
            attachment: detail.attachment,
            filename: detail.filename,
        });
    }

    /// Net status of this scope: `false` once any contained check was false.
    /// 此作用域的净状态：一旦任何包含的检查为假，即为 `false`。
    pub fn passed(&self) -> bool {
        self.pending
            .iter()
            .all(|step| step.status == StepStatus::Pass)
    }
}

impl Drop for StepScope {
    fn drop(&mut self) {
        let mut inner = lock(&self.tracker);
        for step in self.pending.drain(..) {
            inner.insert(step);
        }
    }
}

/// A bare numbered scope marking a step boundary without capturing checks.
/// 一个仅标记步骤边界而不捕获检查的裸编号作用域。
pub struct StepBoundary {
    index: usize,
}

impl StepBoundary {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Step recording must survive a panic in another scope holder, so a
/// poisoned lock is entered anyway.
/// 步骤记录必须在另一个作用域持有者发生 panic 后仍然可用，
/// 因此即使锁已中毒也照常进入。
fn lock(inner: &Mutex<TrackerInner>) -> MutexGuard<'_, TrackerInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
