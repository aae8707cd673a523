//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the reporter.
//! It includes models for external statuses, recorded steps, test case
//! references, raw runner results and the shared run identity.
//!
//! 此模块定义了整个报告器中使用的核心数据结构。
//! 它包括外部状态、记录的步骤、测试用例引用、运行器原始结果
//! 以及共享的测试运行标识的模型。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The status a test case result carries in Adaptavist Test Management.
/// 测试用例结果在 Adaptavist Test Management 中携带的状态。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TestStatus {
    /// Every recorded check and the runner's own verdict passed.
    /// 每个记录的检查以及运行器自身的判定都通过了。
    Pass,
    /// At least one check failed, or the test itself failed.
    /// 至少有一个检查失败，或者测试本身失败。
    Fail,
    /// The test was intentionally not executed. Counted separately from
    /// pass and fail, never reported as passed.
    /// 测试被有意地未执行。与通过和失败分开计数，绝不报告为通过。
    Blocked,
    /// The runner skipped the test through its own skip mechanism.
    /// 运行器通过其自身的跳过机制跳过了测试。
    NotExecuted,
}

impl TestStatus {
    /// The literal status string the remote API expects.
    /// 远程 API 期望的状态字符串字面量。
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "Pass",
            TestStatus::Fail => "Fail",
            TestStatus::Blocked => "Blocked",
            TestStatus::NotExecuted => "Not Executed",
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, TestStatus::Blocked)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

/// The status of one recorded step inside a test.
/// 测试内单个已记录步骤的状态。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum StepStatus {
    Pass,
    Fail,
}

impl StepStatus {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            StepStatus::Pass => "Pass",
            StepStatus::Fail => "Fail",
        }
    }

    /// Builds a step status from the boolean handed to `check`.
    /// 从传给 `check` 的布尔值构建步骤状态。
    pub fn from_condition(condition: bool) -> Self {
        if condition {
            StepStatus::Pass
        } else {
            StepStatus::Fail
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_api_str())
    }
}

/// One checked assertion recorded inside a test, reported at finer
/// granularity than the whole test's verdict.
///
/// Steps are append-ordered within one test. Index `0` is the whole-test
/// scope; indices `>= 1` are numbered steps. A duplicate index replaces the
/// earlier step (last write wins).
///
/// 在测试内记录的一次检查断言，以比整个测试判定更细的粒度报告。
///
/// 步骤在单个测试内按追加顺序排列。索引 `0` 是整个测试的作用域；
/// 索引 `>= 1` 是带编号的步骤。重复的索引会替换先前的步骤（后写优先）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step index. `0` marks the whole-test scope.
    /// 步骤索引。`0` 表示整个测试的作用域。
    pub index: usize,
    /// Outcome of the check that produced this step.
    /// 产生此步骤的检查的结果。
    pub status: StepStatus,
    /// Optional free-form comment attached to the step result.
    /// 附加到步骤结果的可选自由格式注释。
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional attachment payload. Attachments are always associated with
    /// the test-case result, not with the per-step result.
    /// 可选的附件负载。附件总是与测试用例结果关联，而不是与单步结果关联。
    #[serde(default)]
    pub attachment: Option<Vec<u8>>,
    /// File name under which the attachment is stored remotely.
    /// 附件在远端存储时使用的文件名。
    #[serde(default)]
    pub filename: Option<String>,
}

impl Step {
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// The fully resolved address of one test inside the external system.
/// Created once per test, derived deterministically from the test name and
/// the effective configuration, never mutated afterwards.
///
/// 单个测试在外部系统中的完整解析地址。
/// 每个测试创建一次，由测试名称和生效配置确定性地派生，此后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRef {
    /// Project key, e.g. `TEST`. / 项目键，例如 `TEST`。
    pub project_key: String,
    /// Case key, e.g. `TEST-T123`. / 用例键，例如 `TEST-T123`。
    pub case_key: String,
    /// Run key, e.g. `TEST-C1`. / 运行键，例如 `TEST-C1`。
    pub run_key: String,
    /// Environment label reported alongside the result. May be empty.
    /// 与结果一起报告的环境标签。可以为空。
    pub environment: String,
}

/// What the host runner observed for one executed test body.
/// 宿主运行器对单个已执行测试体的观察结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawTestResult {
    /// The test body completed without failure.
    /// 测试体在没有失败的情况下完成。
    Passed,
    /// The test asserted or raised. / 测试断言失败或抛出了异常。
    Failed {
        #[serde(default)]
        message: Option<String>,
    },
    /// The runner's own skip mechanism fired before or during the test.
    /// 运行器自身的跳过机制在测试之前或期间触发。
    Skipped {
        #[serde(default)]
        reason: Option<String>,
    },
    /// The test was marked or invoked as blocked; it is not run to
    /// completion. / 测试被标记或调用为已阻塞；它不会运行到结束。
    Blocked {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl RawTestResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, RawTestResult::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RawTestResult::Skipped { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, RawTestResult::Blocked { .. })
    }
}

/// The reduced, immutable outcome of one test: a single external status plus
/// the recorded steps and an optional result comment.
///
/// 单个测试归约后的不可变结果：一个外部状态，加上记录的步骤和可选的结果注释。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub case_ref: TestCaseRef,
    pub status: TestStatus,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TestOutcome {
    /// Steps carrying an attachment payload, in recording order.
    /// 携带附件负载的步骤，按记录顺序排列。
    pub fn attachments(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.has_attachment())
    }
}

/// The process-wide identity of the test run results are reported into.
/// Lazily created on the first test that needs reporting, shared by every
/// test in the process (and across worker processes through the coordination
/// channel), read-only thereafter.
///
/// 测试结果所汇报到的测试运行在进程范围内的标识。
/// 在第一个需要报告的测试时惰性创建，由进程中的每个测试共享
/// （并通过协调通道跨工作进程共享），此后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    pub project_key: String,
    pub run_key: String,
    /// Human-readable run name; only known when this engine created the run.
    /// 人类可读的运行名称；仅当本引擎自己创建该运行时才已知。
    #[serde(default)]
    pub run_name: Option<String>,
}

/// A marker attached to a test by its author, overriding name-derived
/// identification or blocking execution outright.
///
/// 测试作者附加到测试上的标记，用于覆盖从名称派生的识别或直接阻塞执行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Mark the test as blocked; it is never counted as passed.
    /// 将测试标记为已阻塞；它永远不会被计为通过。
    Block,
    /// Override the project key for this test.
    /// 覆盖此测试的项目键。
    Project { key: String },
    /// Override the full case key for this test.
    /// 覆盖此测试的完整用例键。
    TestCase { key: String },
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Block => MarkerKind::Block,
            Marker::Project { .. } => MarkerKind::Project,
            Marker::TestCase { .. } => MarkerKind::TestCase,
        }
    }
}

/// The static set of recognized marker kinds.
/// 可识别标记种类的静态集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Block,
    Project,
    TestCase,
}

/// Registration metadata for one marker, exposed so the host runner can list
/// the markers this engine understands.
/// 单个标记的注册元数据，公开给宿主运行器以列出本引擎理解的标记。
#[derive(Debug, Clone, Copy)]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    /// Registered name, e.g. `mark.block`. / 注册名称，例如 `mark.block`。
    pub name: &'static str,
    /// Help line shown by the host runner. / 宿主运行器显示的帮助行。
    pub help: &'static str,
}

static MARKERS: Lazy<Vec<MarkerSpec>> = Lazy::new(|| {
    vec![
        MarkerSpec {
            kind: MarkerKind::Block,
            name: "mark.block",
            help: "mark.block: report the test as Blocked instead of executing it",
        },
        MarkerSpec {
            kind: MarkerKind::Project,
            name: "mark.project",
            help: "mark.project(key): override the Adaptavist project key for this test",
        },
        MarkerSpec {
            kind: MarkerKind::TestCase,
            name: "mark.testcase",
            help: "mark.testcase(key): override the Adaptavist test case key for this test",
        },
    ]
});

/// Returns the marker registry, performing the one-time registration on
/// first use. / 返回标记注册表，在首次使用时执行一次性注册。
pub fn registered_markers() -> &'static [MarkerSpec] {
    &MARKERS
}

/// Everything the host runner hands over for one finished test: its declared
/// name, its markers, the runner's own verdict and the steps recorded by the
/// test body.
///
/// 宿主运行器为单个已完成测试移交的全部内容：其声明的名称、其标记、
/// 运行器自身的判定以及测试体记录的步骤。
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTest {
    pub name: String,
    pub markers: Vec<Marker>,
    pub result: RawTestResult,
    pub steps: Vec<Step>,
}

impl CompletedTest {
    pub fn new(
        name: impl Into<String>,
        markers: Vec<Marker>,
        result: RawTestResult,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            name: name.into(),
            markers,
            result,
            steps,
        }
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.markers.iter().any(|marker| marker.kind() == kind)
    }
}
