//! # Case Identification Module / 用例识别模块
//!
//! This module derives the (project key, test case key) pair for a test from
//! its declared name, its markers and the effective configuration. Parsing is
//! a pure string function over a small grammar so it stays unit-testable in
//! isolation from any runner.
//!
//! 此模块从测试声明的名称、其标记和生效配置中派生（项目键，测试用例键）对。
//! 解析是基于一个小型文法的纯字符串函数，因此可以脱离任何运行器独立进行单元测试。
//!
//! Grammar: the test name is split on `_`; the first token consisting of `T`
//! followed by one or more ASCII digits is the case token. The token directly
//! before it names the project when it looks like a project key (uppercase
//! alphanumeric, starting with a letter). Examples:
//!
//! - `test_T123` → case token `T123`, no embedded project
//! - `test_TEST_T123` → case token `T123`, project `TEST`

use crate::core::config::EffectiveConfig;
use crate::core::models::{Marker, TestCaseRef};

/// Project used when neither markers, the test name nor the configuration
/// name one. / 当标记、测试名称和配置都未指定项目时使用的项目。
pub const DEFAULT_PROJECT_KEY: &str = "TEST";

/// The name-derived part of a case identity.
/// 用例标识中从名称派生的部分。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Project key embedded in the name, when present.
    /// 名称中内嵌的项目键（如果存在）。
    pub project: Option<String>,
    /// The bare case token, e.g. `T123`. / 裸用例标记，例如 `T123`。
    pub token: String,
}

/// Extracts the case token (and an optional embedded project key) from a test
/// name. Returns `None` when the name carries no recognizable token, meaning
/// the test lies outside the managed case universe.
///
/// 从测试名称中提取用例标记（以及可选的内嵌项目键）。
/// 当名称不包含可识别的标记时返回 `None`，表示该测试位于受管用例范围之外。
pub fn parse_case_token(test_name: &str) -> Option<ParsedName> {
    let tokens: Vec<&str> = test_name.split('_').collect();
    let position = tokens.iter().position(|token| is_case_token(token))?;
    let project = position
        .checked_sub(1)
        .map(|prev| tokens[prev])
        .filter(|candidate| is_project_key(candidate))
        .map(str::to_string);
    Some(ParsedName {
        project,
        token: tokens[position].to_string(),
    })
}

/// Resolves the full external address for one test, or `None` when the test
/// is not reportable. Without a usable run key no remote call is ever
/// attempted, regardless of the test's own pass or fail.
///
/// 解析单个测试的完整外部地址；当测试不可报告时返回 `None`。
/// 没有可用的运行键时，无论测试自身通过与否，都绝不会尝试远程调用。
pub fn identify(
    test_name: &str,
    markers: &[Marker],
    config: &EffectiveConfig,
) -> Option<TestCaseRef> {
    // The run key comes verbatim from the configuration. A configured
    // project without a run key still makes the test reportable: the engine
    // then creates the run lazily at reporting time, and until it does the
    // reference carries an empty run key. With neither value configured the
    // test is outside the managed case universe.
    // 运行键逐字取自配置。只配置了项目而没有运行键时测试仍可报告：
    // 引擎随后在报告时惰性创建运行，在此之前引用携带空运行键。
    // 两个值都未配置时，测试位于受管用例范围之外。
    let run_key = match (&config.test_run_key, &config.project_key) {
        (Some(key), _) => key.clone(),
        (None, Some(_)) => String::new(),
        (None, None) => return None,
    };

    let marker_project = markers.iter().find_map(|marker| match marker {
        Marker::Project { key } => Some(key.clone()),
        _ => None,
    });
    let marker_case = markers.iter().find_map(|marker| match marker {
        Marker::TestCase { key } => Some(key.clone()),
        _ => None,
    });

    // A full marker-supplied case key carries its own project prefix and
    // wins over everything the name says.
    // 标记提供的完整用例键自带项目前缀，并优先于名称所表达的一切。
    if let Some(key) = marker_case {
        if let Some((project, _)) = key.rsplit_once('-') {
            return Some(TestCaseRef {
                project_key: marker_project.unwrap_or_else(|| project.to_string()),
                case_key: key,
                run_key,
                environment: config.environment.clone(),
            });
        }
        let project = marker_project
            .or_else(|| config.project_key.clone())
            .unwrap_or_else(|| DEFAULT_PROJECT_KEY.to_string());
        return Some(TestCaseRef {
            case_key: format!("{project}-{key}"),
            project_key: project,
            run_key,
            environment: config.environment.clone(),
        });
    }

    let parsed = parse_case_token(test_name)?;
    let project = marker_project
        .or(parsed.project)
        .or_else(|| config.project_key.clone())
        .unwrap_or_else(|| DEFAULT_PROJECT_KEY.to_string());

    Some(TestCaseRef {
        case_key: format!("{project}-{}", parsed.token),
        project_key: project,
        run_key,
        environment: config.environment.clone(),
    })
}

/// `T` followed by one or more ASCII digits.
fn is_case_token(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('T')
        && token.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// Uppercase alphanumeric, starting with a letter, e.g. `TEST` or `QA2`.
fn is_project_key(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
