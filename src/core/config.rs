//! # Configuration Module / 配置模块
//!
//! This module merges the three configuration sources into one effective,
//! immutable configuration: command line flags, the host runner's settings
//! file and the JSON config file. Precedence is fixed and total: CLI beats
//! settings, settings beat the file, the file beats built-in defaults, for
//! every field. Resolution happens once before any test executes.
//!
//! 此模块将三个配置来源合并为一个生效的、不可变的配置：
//! 命令行标志、宿主运行器的设置文件和 JSON 配置文件。
//! 优先级是固定且完整的：对于每个字段，CLI 优先于设置，设置优先于文件，
//! 文件优先于内置默认值。解析在任何测试执行之前进行一次。

use colored::*;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the JSON config file, relative to the runner's
/// working directory. / JSON 配置文件的默认位置，相对于运行器的工作目录。
pub const DEFAULT_CONFIG_PATH: &str = "config/global_config.json";

/// Options supplied on the command line. The enable flag and the most
/// specific per-run overrides live here.
/// 在命令行上提供的选项。启用标志和最具体的每次运行覆盖位于此处。
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOptions {
    /// The `--adaptavist` flag. / `--adaptavist` 标志。
    pub adaptavist: bool,
    pub project_key: Option<String>,
    pub test_run_key: Option<String>,
    pub environment: Option<String>,
    pub user: Option<String>,
    /// Path of the JSON config file; defaults to [`DEFAULT_CONFIG_PATH`].
    /// JSON 配置文件的路径；默认为 [`DEFAULT_CONFIG_PATH`]。
    pub config_path: Option<String>,
}

/// The `[adaptavist]` table of the host runner's settings file. This is the
/// middle layer of the precedence chain.
/// 宿主运行器设置文件中的 `[adaptavist]` 表。这是优先级链的中间层。
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct IniOptions {
    /// Settings-file form of the enable flag, same name as the CLI flag.
    /// 启用标志在设置文件中的形式，与 CLI 标志同名。
    #[serde(default)]
    pub adaptavist: Option<bool>,
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub test_run_key: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub skip_ntc_methods: Option<bool>,
    #[serde(default)]
    pub test_case_keys: Option<Vec<String>>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RunnerSettings {
    #[serde(default)]
    adaptavist: IniOptions,
}

impl IniOptions {
    /// Loads the `[adaptavist]` table from a TOML settings file. A missing
    /// or malformed file degrades to defaults and is never fatal.
    /// 从 TOML 设置文件加载 `[adaptavist]` 表。
    /// 文件缺失或格式错误时降级为默认值，绝不致命。
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<RunnerSettings>(&content) {
            Ok(settings) => settings.adaptavist,
            Err(err) => {
                warn_malformed(path, &err.to_string());
                Self::default()
            }
        }
    }
}

/// The JSON config file. All keys are optional.
/// JSON 配置文件。所有键都是可选的。
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FileOptions {
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub test_run_key: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub skip_ntc_methods: Option<bool>,
    #[serde(default)]
    pub test_case_keys: Option<Vec<String>>,
    #[serde(default)]
    pub user: Option<String>,
}

impl FileOptions {
    /// Loads the JSON config file. A missing file or malformed JSON yields
    /// defaults; malformed content additionally prints a console warning.
    /// 加载 JSON 配置文件。文件缺失或 JSON 格式错误时产生默认值；
    /// 格式错误的内容还会打印控制台警告。
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(options) => options,
            Err(err) => {
                warn_malformed(path, &err.to_string());
                Self::default()
            }
        }
    }
}

/// The fully merged configuration, captured once per process and immutable
/// for its lifetime. / 完全合并后的配置，每个进程捕获一次，在其生命周期内不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// Whether reporting is enabled at all. Off by default.
    /// 是否启用报告。默认关闭。
    pub enabled: bool,
    pub project_key: Option<String>,
    pub test_run_key: Option<String>,
    /// Environment label attached to every reported result. May be empty.
    /// 附加到每个已报告结果的环境标签。可以为空。
    pub environment: String,
    /// Force tests without a recognizable case token to Blocked.
    /// 将没有可识别用例标记的测试强制为 Blocked。
    pub skip_ntc_methods: bool,
    /// Allow-list of case keys eligible for reporting. `None` or an empty
    /// set means every case is eligible.
    /// 有资格报告的用例键允许列表。`None` 或空集合表示每个用例都有资格。
    pub test_case_keys: Option<BTreeSet<String>>,
    /// Reporting identity checked against the remote system.
    /// 与远程系统核对的报告身份。
    pub user: Option<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_key: None,
            test_run_key: None,
            environment: String::new(),
            skip_ntc_methods: false,
            test_case_keys: None,
            user: None,
        }
    }
}

impl EffectiveConfig {
    /// Whether the allow-list admits this case key. An absent or empty list
    /// admits everything. / 允许列表是否接纳此用例键。缺失或为空的列表接纳一切。
    pub fn allows_case(&self, case_key: &str) -> bool {
        match &self.test_case_keys {
            Some(keys) if !keys.is_empty() => keys.contains(case_key),
            _ => true,
        }
    }

    /// Whether the allow-list is active, i.e. present and non-empty.
    /// 允许列表是否处于活动状态，即存在且非空。
    pub fn has_allow_list(&self) -> bool {
        self.test_case_keys
            .as_ref()
            .is_some_and(|keys| !keys.is_empty())
    }
}

/// Merges the three sources into the effective configuration. Never fails;
/// every field resolves to the most specific value that provides one.
/// 将三个来源合并为生效配置。绝不失败；每个字段都解析为提供值的最具体来源。
pub fn resolve(cli: &CliOptions, ini: &IniOptions, file: &FileOptions) -> EffectiveConfig {
    EffectiveConfig {
        enabled: cli.adaptavist || ini.adaptavist.unwrap_or(false),
        project_key: cli
            .project_key
            .clone()
            .or_else(|| ini.project_key.clone())
            .or_else(|| file.project_key.clone()),
        test_run_key: cli
            .test_run_key
            .clone()
            .or_else(|| ini.test_run_key.clone())
            .or_else(|| file.test_run_key.clone()),
        environment: cli
            .environment
            .clone()
            .or_else(|| ini.environment.clone())
            .or_else(|| file.environment.clone())
            .unwrap_or_default(),
        skip_ntc_methods: ini
            .skip_ntc_methods
            .or(file.skip_ntc_methods)
            .unwrap_or(false),
        test_case_keys: ini
            .test_case_keys
            .clone()
            .or_else(|| file.test_case_keys.clone())
            .map(|keys| keys.into_iter().collect()),
        user: cli
            .user
            .clone()
            .or_else(|| ini.user.clone())
            .or_else(|| file.user.clone()),
    }
}

/// Resolves the whole chain in one call: expands the config path, loads both
/// files and merges them with the CLI options.
/// 一次调用解析整条链：展开配置路径，加载两个文件并与 CLI 选项合并。
pub fn resolve_from_sources(cli: &CliOptions, settings_path: Option<&Path>) -> EffectiveConfig {
    let config_path = expand_path(cli.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
    let file = FileOptions::load(&config_path);
    let ini = settings_path
        .map(IniOptions::load)
        .unwrap_or_default();
    resolve(cli, &ini, &file)
}

/// Expands `~` and environment variables in a user-supplied path. A path
/// that fails to expand is used verbatim.
/// 展开用户提供路径中的 `~` 和环境变量。无法展开的路径按原样使用。
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(raw),
    }
}

fn warn_malformed(path: &Path, detail: &str) {
    eprintln!(
        "{}",
        format!(
            "Warning: ignoring malformed config file {}: {}",
            path.display(),
            detail
        )
        .yellow()
    );
}
