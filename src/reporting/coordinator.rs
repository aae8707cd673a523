//! # Reporting Coordination Module / 报告协调模块
//!
//! This module orchestrates, per finished test, whether to report at all and
//! how. It applies the policy gates in a fixed order, lazily creates or
//! obtains the shared run identity, and drives the remote API with exactly
//! one result call per report invocation.
//!
//! 此模块为每个已完成的测试编排是否报告以及如何报告。
//! 它以固定顺序应用策略闸门，惰性创建或获取共享的运行标识，
//! 并驱动远程 API，每次报告调用恰好产生一次结果调用。
//!
//! Failure handling: a malformed configuration degrades to defaults long
//! before this module runs; an unresolvable case is not an error but an
//! unmanaged test; a policy gate produces a Blocked outcome with a comment;
//! an unknown reporting user suppresses transmission with a warning line;
//! and a failed remote call propagates as an error of the reporting phase
//! without touching the test's own verdict.
//!
//! 失败处理：格式错误的配置早在此模块运行之前就降级为默认值；
//! 无法解析的用例不是错误而是不受管的测试；策略闸门产生带注释的 Blocked 结果；
//! 未知的报告用户会抑制传输并打印一行警告；
//! 失败的远程调用作为报告阶段的错误向上传播，而不触及测试自身的判定。

use anyhow::{Context, Result};
use futures::{StreamExt, stream};
use tokio::sync::Mutex;

use crate::core::config::EffectiveConfig;
use crate::core::identify::{self, DEFAULT_PROJECT_KEY, parse_case_token};
use crate::core::models::{CompletedTest, RunIdentity, TestOutcome, TestStatus};
use crate::core::outcome;
use crate::infra::api::AdaptavistApi;
use crate::infra::sync::{DistributedSync, RunClaim};
use crate::reporting::console;

/// Comment attached when the allow-list excludes a case. The exact wording
/// is part of the observable contract.
/// 当允许列表排除某个用例时附加的注释。确切措辞是可观察契约的一部分。
pub const ALLOW_LIST_SKIP_COMMENT: &str = "skipped as requested";

/// What happened to one test's report.
/// 单个测试的报告发生了什么。
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Reporting is globally disabled; nothing happened.
    /// 报告被全局禁用；什么都没有发生。
    Disabled,
    /// The test lies outside the managed case universe; it passes or fails
    /// normally and no remote call was attempted.
    /// 测试位于受管用例范围之外；它正常通过或失败，且未尝试任何远程调用。
    Unmanaged,
    /// The reporting user is unknown to the remote system; the outcome was
    /// computed but not transmitted.
    /// 远程系统不认识报告用户；结果已计算但未传输。
    UserUnknown,
    /// A policy gate forced the status to Blocked. `transmitted` is true for
    /// the allow-list gate and false for the not-a-test-case gate, which has
    /// no case key to address.
    /// 策略闸门将状态强制为 Blocked。对于允许列表闸门 `transmitted` 为真，
    /// 对于无用例键可寻址的非测试用例闸门为假。
    ForcedBlocked { transmitted: bool },
    /// The computed outcome was reported with this status.
    /// 已计算的结果以此状态被报告。
    Reported(TestStatus),
}

impl Disposition {
    /// The status this test carries in the run's accounting, when the
    /// coordinator decided one. / 协调器做出决定时，此测试在运行计数中携带的状态。
    pub fn effective_status(&self) -> Option<TestStatus> {
        match self {
            Disposition::Reported(status) => Some(*status),
            Disposition::ForcedBlocked { .. } => Some(TestStatus::Blocked),
            _ => None,
        }
    }

    /// Whether a remote result call was made for this test.
    /// 是否为此测试进行了远程结果调用。
    pub fn was_transmitted(&self) -> bool {
        matches!(
            self,
            Disposition::Reported(_) | Disposition::ForcedBlocked { transmitted: true }
        )
    }
}

/// Per-process orchestrator between finished tests and the remote API.
///
/// The coordinator owns the only shared mutable state of the engine: the
/// lazily created run identity and the cached user check. Both are guarded
/// so concurrent reports of different tests never interleave inside the
/// run-identity critical section.
///
/// 已完成测试与远程 API 之间的每进程编排器。
///
/// 协调器拥有引擎中唯一的共享可变状态：惰性创建的运行标识和缓存的用户检查。
/// 两者都有保护，因此不同测试的并发报告绝不会在运行标识临界区内交错。
pub struct ReportingCoordinator<A: AdaptavistApi> {
    api: A,
    config: EffectiveConfig,
    sync: Option<DistributedSync>,
    run: Mutex<Option<RunIdentity>>,
    user_known: Mutex<Option<bool>>,
}

impl<A: AdaptavistApi> ReportingCoordinator<A> {
    pub fn new(api: A, config: EffectiveConfig) -> Self {
        Self {
            api,
            config,
            sync: None,
            run: Mutex::new(None),
            user_known: Mutex::new(None),
        }
    }

    /// Attaches distributed arbitration, produced by
    /// [`DistributedSync::detect`] when the host runs parallel workers.
    /// 附加由 [`DistributedSync::detect`] 在宿主运行并行工作进程时产生的分布式仲裁。
    pub fn with_sync(mut self, sync: Option<DistributedSync>) -> Self {
        self.sync = sync;
        self
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Reports one finished test, applying the policy gates in order. Each
    /// gate is a hard short-circuit: once a gate fails, no remote call is
    /// made beyond it.
    /// 报告一个已完成的测试，按顺序应用策略闸门。
    /// 每个闸门都是硬短路：一旦某个闸门未通过，就不再进行其后的远程调用。
    pub async fn report(&self, test: &CompletedTest) -> Result<Disposition> {
        if !self.config.enabled {
            return Ok(Disposition::Disabled);
        }

        let Some(case_ref) = identify::identify(&test.name, &test.markers, &self.config) else {
            if self.config.skip_ntc_methods && parse_case_token(&test.name).is_none() {
                return Ok(Disposition::ForcedBlocked { transmitted: false });
            }
            return Ok(Disposition::Unmanaged);
        };

        let mut computed = outcome::reduce_test(test, case_ref);
        let mut forced = false;
        if self.config.has_allow_list() && !self.config.allows_case(&computed.case_ref.case_key) {
            // The forced block replaces the computed outcome entirely; the
            // excluded case must not leak its recorded steps.
            // 强制阻塞完全替换已计算的结果；被排除的用例不得泄露其记录的步骤。
            computed.status = TestStatus::Blocked;
            computed.steps = Vec::new();
            computed.comment = Some(ALLOW_LIST_SKIP_COMMENT.to_string());
            forced = true;
        }

        if !self.user_is_known().await? {
            return Ok(Disposition::UserUnknown);
        }

        self.transmit(&computed).await?;

        if forced {
            Ok(Disposition::ForcedBlocked { transmitted: true })
        } else {
            Ok(Disposition::Reported(computed.status))
        }
    }

    /// Reports many finished tests with bounded concurrency, preserving the
    /// input order of the returned dispositions. Calls belonging to one test
    /// stay ordered; tests only contend on the run-identity critical
    /// section.
    /// 以有界并发报告多个已完成的测试，返回的处置保持输入顺序。
    /// 属于单个测试的调用保持有序；测试之间仅在运行标识临界区上竞争。
    pub async fn report_all(
        &self,
        tests: &[CompletedTest],
        jobs: Option<usize>,
    ) -> Result<Vec<Disposition>> {
        let width = jobs.unwrap_or_else(|| num_cpus::get() / 2 + 1);
        stream::iter(tests)
            .map(|test| self.report(test))
            .buffered(width.max(1))
            .collect::<Vec<Result<Disposition>>>()
            .await
            .into_iter()
            .collect()
    }

    /// Runs the identity check once per coordinator and caches the answer.
    /// An unknown user prints the warning line and suppresses reporting for
    /// the rest of the run.
    /// 每个协调器运行一次身份检查并缓存答案。
    /// 未知用户会打印警告行，并在本次运行的剩余时间内抑制报告。
    async fn user_is_known(&self) -> Result<bool> {
        let mut cached = self.user_known.lock().await;
        if let Some(known) = *cached {
            return Ok(known);
        }
        let user = self.reporting_user();
        let known = self
            .api
            .user_is_valid(&user)
            .await
            .with_context(|| format!("Failed to verify reporting user '{user}'"))?;
        if !known {
            console::print_unknown_user_warning(&user);
        }
        *cached = Some(known);
        Ok(known)
    }

    /// The identity reported against: the configured user, else the process
    /// user. / 报告所使用的身份：配置的用户，否则为进程用户。
    fn reporting_user(&self) -> String {
        self.config
            .user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_default()
    }

    /// Sends one outcome over the wire: the case result first, then every
    /// recorded step, then every attachment at the case level.
    /// 通过网络发送一个结果：先是用例结果，然后是每个记录的步骤，
    /// 最后是用例级别的每个附件。
    async fn transmit(&self, outcome: &TestOutcome) -> Result<()> {
        let run = self.run_identity().await?;
        let case = &outcome.case_ref;

        self.api
            .execute_test_result(
                &run.run_key,
                &case.case_key,
                &case.environment,
                outcome.status,
                outcome.comment.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to report result for {}", case.case_key))?;

        for step in &outcome.steps {
            self.api
                .execute_test_step(
                    &run.run_key,
                    &case.case_key,
                    step.index,
                    step.status,
                    step.comment.as_deref(),
                )
                .await
                .with_context(|| {
                    format!("Failed to report step {} of {}", step.index, case.case_key)
                })?;
        }

        for step in outcome.attachments() {
            let Some(payload) = step.attachment.as_deref() else {
                continue;
            };
            let filename = step.filename.as_deref().unwrap_or("attachment.bin");
            self.api
                .add_test_result_attachment(&run.run_key, &case.case_key, payload, filename)
                .await
                .with_context(|| {
                    format!("Failed to attach {} to {}", filename, case.case_key)
                })?;
        }

        Ok(())
    }

    /// Returns the shared run identity, creating or fetching it on first
    /// use. At most one creation call happens per run key per process group;
    /// under distributed execution the coordination channel arbitrates.
    /// 返回共享的运行标识，在首次使用时创建或获取。
    /// 每个进程组内每个运行键最多发生一次创建调用；
    /// 在分布式执行下由协调通道进行仲裁。
    async fn run_identity(&self) -> Result<RunIdentity> {
        let mut slot = self.run.lock().await;
        if let Some(identity) = slot.as_ref() {
            return Ok(identity.clone());
        }
        let identity = self.resolve_run_identity().await?;
        *slot = Some(identity.clone());
        Ok(identity)
    }

    async fn resolve_run_identity(&self) -> Result<RunIdentity> {
        let project = self
            .config
            .project_key
            .clone()
            .unwrap_or_else(|| DEFAULT_PROJECT_KEY.to_string());

        // A configured run key is used verbatim, even when the remote system
        // does not know it yet.
        // 配置的运行键按原样使用，即使远程系统尚不认识它。
        if let Some(key) = &self.config.test_run_key {
            let fetched = self
                .api
                .get_test_run(key)
                .await
                .with_context(|| format!("Failed to look up test run {key}"))?;
            return Ok(fetched.unwrap_or_else(|| RunIdentity {
                project_key: project,
                run_key: key.clone(),
                run_name: None,
            }));
        }

        match &self.sync {
            Some(sync) => match sync.claim()? {
                RunClaim::Leader => {
                    let identity = self.create_run(&project).await?;
                    sync.publish(&identity)?;
                    Ok(identity)
                }
                RunClaim::Follower => sync.wait_for_identity().await,
            },
            None => self.create_run(&project).await,
        }
    }

    async fn create_run(&self, project: &str) -> Result<RunIdentity> {
        let run_name = format!("{} {}", project, chrono::Local::now().format("%Y%m%d%H%M"));
        let run_key = self
            .api
            .create_test_run(project, &run_name)
            .await
            .with_context(|| format!("Failed to create a test run for project {project}"))?;
        Ok(RunIdentity {
            project_key: project.to_string(),
            run_key,
            run_name: Some(run_name),
        })
    }
}
