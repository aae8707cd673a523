//! # Distributed Coordination Module / 分布式协调模块
//!
//! When multiple worker processes share one logical test run, exactly one of
//! them may create the run identity; every other worker detects the identity
//! through a coordination channel and reuses it. The channel is
//! authoritative: its claim admits at most one leader, so no optimistic
//! retry is needed on this side.
//!
//! 当多个工作进程共享一个逻辑测试运行时，只允许其中一个创建运行标识；
//! 其他每个工作进程都通过协调通道检测该标识并复用它。
//! 通道具有权威性：其声明最多接纳一个领导者，因此本侧不需要乐观重试。

use anyhow::{Context, Result, bail};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::models::RunIdentity;

/// Plugin name queried on the host to decide whether distributed
/// coordination is needed at all.
/// 在宿主上查询的插件名称，用于决定是否需要分布式协调。
pub const PARALLEL_PLUGIN: &str = "parallel";

/// Poll interval while waiting for the leader to publish.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Upper bound on waiting for the shared identity.
const WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability queries against the host runner environment.
/// 针对宿主运行器环境的能力查询。
pub trait HostCapabilities {
    fn has_plugin(&self, name: &str) -> bool;
}

/// The outcome of claiming run creation on the channel.
/// 在通道上声明运行创建的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClaim {
    /// This worker won the claim and must create and publish the identity.
    /// 此工作进程赢得了声明，必须创建并发布标识。
    Leader,
    /// Another worker owns creation; wait for its published identity.
    /// 另一个工作进程拥有创建权；等待其发布的标识。
    Follower,
}

/// The coordination protocol: claim once, publish once, fetch many times.
/// The transport behind it is external; this crate ships a file-based
/// channel for workers sharing a filesystem.
///
/// 协调协议：声明一次，发布一次，获取多次。
/// 其背后的传输是外部的；本 crate 附带一个用于共享文件系统的
/// 工作进程的基于文件的通道。
pub trait CoordinationChannel: Send + Sync {
    /// Claims run creation. At most one caller per channel ever observes
    /// [`RunClaim::Leader`]. / 声明运行创建。每个通道最多只有一个调用者
    /// 会观察到 [`RunClaim::Leader`]。
    fn claim(&self) -> Result<RunClaim>;

    /// Publishes the created identity for the followers.
    /// 为跟随者发布已创建的标识。
    fn publish(&self, identity: &RunIdentity) -> Result<()>;

    /// Fetches the published identity, or `None` when not yet published.
    /// 获取已发布的标识；尚未发布时返回 `None`。
    fn fetch(&self) -> Result<Option<RunIdentity>>;
}

/// File-based coordination for worker processes sharing one host: the claim
/// is an exclusive file creation, the publication an atomic rename.
///
/// 共享同一宿主的工作进程的基于文件的协调：
/// 声明是独占的文件创建，发布是原子重命名。
#[derive(Debug, Clone)]
pub struct FileChannel {
    dir: PathBuf,
}

impl FileChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn claim_path(&self) -> PathBuf {
        self.dir.join("run.claim")
    }

    fn identity_path(&self) -> PathBuf {
        self.dir.join("run.json")
    }
}

impl CoordinationChannel for FileChannel {
    fn claim(&self) -> Result<RunClaim> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!(
                "Failed to create coordination directory: {}",
                self.dir.display()
            )
        })?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.claim_path())
        {
            Ok(_) => Ok(RunClaim::Leader),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(RunClaim::Follower),
            Err(err) => Err(err).with_context(|| {
                format!(
                    "Failed to claim run creation in {}",
                    self.dir.display()
                )
            }),
        }
    }

    fn publish(&self, identity: &RunIdentity) -> Result<()> {
        let payload = serde_json::to_string(identity)
            .context("Failed to serialize run identity")?;
        let staged = self.dir.join("run.json.tmp");
        fs::write(&staged, payload).with_context(|| {
            format!("Failed to stage run identity in {}", self.dir.display())
        })?;
        // Followers only ever see a complete file thanks to the rename.
        // 归功于重命名，跟随者只会看到完整的文件。
        fs::rename(&staged, self.identity_path())
            .context("Failed to publish run identity")?;
        Ok(())
    }

    fn fetch(&self) -> Result<Option<RunIdentity>> {
        let content = match fs::read_to_string(self.identity_path()) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!(
                        "Failed to read run identity from {}",
                        self.dir.display()
                    )
                });
            }
        };
        let identity = serde_json::from_str(&content)
            .context("Failed to parse published run identity")?;
        Ok(Some(identity))
    }
}

/// Arbitration handle the coordinator uses when distributed mode is active.
/// 当分布式模式处于活动状态时协调器使用的仲裁句柄。
pub struct DistributedSync {
    channel: Box<dyn CoordinationChannel>,
}

impl DistributedSync {
    pub fn new(channel: Box<dyn CoordinationChannel>) -> Self {
        Self { channel }
    }

    /// Capability check against the host: a coordination object exists only
    /// when the parallel-execution plugin is present. Without it the
    /// coordinator behaves single-process.
    /// 针对宿主的能力检查：仅当并行执行插件存在时协调对象才存在。
    /// 没有它时协调器按单进程方式运行。
    pub fn detect(
        host: &dyn HostCapabilities,
        channel: Box<dyn CoordinationChannel>,
    ) -> Option<Self> {
        if host.has_plugin(PARALLEL_PLUGIN) {
            Some(Self::new(channel))
        } else {
            None
        }
    }

    pub fn claim(&self) -> Result<RunClaim> {
        self.channel.claim()
    }

    pub fn publish(&self, identity: &RunIdentity) -> Result<()> {
        self.channel.publish(identity)
    }

    pub fn fetch(&self) -> Result<Option<RunIdentity>> {
        self.channel.fetch()
    }

    /// Polls the channel until the leader publishes the shared identity.
    /// 轮询通道，直到领导者发布共享标识。
    pub async fn wait_for_identity(&self) -> Result<RunIdentity> {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            if let Some(identity) = self.channel.fetch()? {
                return Ok(identity);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("Timed out waiting for the shared test run identity");
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// A host description backed by a plain plugin list; useful for hosts that
/// expose their plugin set as names.
/// 由简单插件列表支撑的宿主描述；适用于以名称形式公开插件集合的宿主。
#[derive(Debug, Default, Clone)]
pub struct PluginList {
    plugins: Vec<String>,
}

impl PluginList {
    pub fn new<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugins: plugins.into_iter().map(Into::into).collect(),
        }
    }
}

impl HostCapabilities for PluginList {
    fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin == name)
    }
}

/// Default on-disk location for the file channel of one run key.
/// 单个运行键的文件通道的默认磁盘位置。
pub fn default_channel_dir(run_scope: &str) -> PathBuf {
    let sanitized: String = run_scope
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    std::env::temp_dir().join(format!("adaptavist_reporter_{sanitized}"))
}

/// Checks if a path exists and is usable as a channel directory.
/// 检查路径是否存在并且可用作通道目录。
pub fn is_channel_dir(path: &Path) -> bool {
    path.exists() && path.is_dir()
}
