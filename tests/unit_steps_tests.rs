//! # Steps Module Unit Tests / Steps 模块单元测试
//!
//! This module contains unit tests for step scopes: ordinal indexing,
//! flushing on scope exit (including panics), last-write-wins on duplicate
//! indices and the block invocation.
//!
//! 此模块包含步骤作用域的单元测试：序号索引、作用域退出时的刷新
//! （包括 panic 的情况）、重复索引的后写优先以及阻塞调用。

use adaptavist_reporter::core::models::{RawTestResult, StepStatus};
use adaptavist_reporter::core::steps::{CheckDetail, StepTracker};
use std::panic::AssertUnwindSafe;

#[cfg(test)]
mod scope_tests {
    use super::*;

    #[test]
    fn test_checks_use_ordinal_positions() {
        let tracker = StepTracker::new();
        {
            let mut scope = tracker.meta_block();
            scope.check(true);
            scope.check(false);
            scope.check(true);
        }

        let steps = tracker.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[1].index, 2);
        assert_eq!(steps[2].index, 3);
        assert_eq!(steps[0].status, StepStatus::Pass);
        assert_eq!(steps[1].status, StepStatus::Fail);
    }

    #[test]
    fn test_ordinals_continue_across_scopes() {
        let tracker = StepTracker::new();
        {
            let mut scope = tracker.meta_block();
            scope.check(true);
        }
        {
            let mut scope = tracker.meta_block();
            scope.check(true);
        }

        let steps = tracker.steps();
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[1].index, 2);
    }

    #[test]
    fn test_steps_flush_on_scope_exit_only() {
        let tracker = StepTracker::new();
        let mut scope = tracker.meta_block();
        scope.check(true);

        assert!(tracker.steps().is_empty());
        drop(scope);
        assert_eq!(tracker.steps().len(), 1);
    }

    #[test]
    fn test_steps_flush_when_scope_body_panics() {
        let tracker = StepTracker::new();
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let mut scope = tracker.meta_block();
            scope.check(false);
            panic!("assertion outside any check");
        }));

        assert!(result.is_err());
        let steps = tracker.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].status, StepStatus::Fail);
    }

    #[test]
    fn test_explicit_index_duplicate_last_write_wins() {
        let tracker = StepTracker::new();
        {
            let mut scope = tracker.meta_block();
            scope.check_with(
                false,
                CheckDetail {
                    index: Some(5),
                    ..CheckDetail::default()
                },
            );
            scope.check_with(
                true,
                CheckDetail {
                    index: Some(5),
                    ..CheckDetail::default()
                },
            );
        }

        let steps = tracker.steps();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].index, 5);
        assert_eq!(steps[0].status, StepStatus::Pass);
    }

    #[test]
    fn test_check_with_carries_details() {
        let tracker = StepTracker::new();
        {
            let mut scope = tracker.meta_block();
            scope.check_with(
                true,
                CheckDetail {
                    index: None,
                    comment: Some("looks good".to_string()),
                    attachment: Some(b"ATTACHMENT".to_vec()),
                    filename: Some("test.txt".to_string()),
                },
            );
        }

        let steps = tracker.steps();
        assert_eq!(steps[0].comment.as_deref(), Some("looks good"));
        assert_eq!(steps[0].attachment.as_deref(), Some(&b"ATTACHMENT"[..]));
        assert_eq!(steps[0].filename.as_deref(), Some("test.txt"));
        assert!(steps[0].has_attachment());
    }

    #[test]
    fn test_scope_net_status() {
        let tracker = StepTracker::new();
        let mut scope = tracker.meta_block();
        scope.check(true);
        assert!(scope.passed());
        scope.check(false);
        assert!(!scope.passed());
    }

    #[test]
    fn test_numbered_boundary_records_nothing() {
        let tracker = StepTracker::new();
        {
            let boundary = tracker.meta_block_at(1);
            assert_eq!(boundary.index(), 1);
        }

        assert!(tracker.steps().is_empty());
    }
}

#[cfg(test)]
mod tracker_tests {
    use super::*;

    #[test]
    fn test_block_invocation_turns_result_blocked() {
        let tracker = StepTracker::new();
        tracker.block();
        assert!(tracker.is_blocked());

        let completed = tracker.finish("test_T123", Vec::new(), RawTestResult::Passed);
        assert!(completed.result.is_blocked());
    }

    #[test]
    fn test_block_invocation_visible_through_clones() {
        let tracker = StepTracker::new();
        let handed_to_test = tracker.clone();
        handed_to_test.block();

        assert!(tracker.is_blocked());
    }

    #[test]
    fn test_finish_without_block_keeps_result() {
        let tracker = StepTracker::new();
        {
            let mut scope = tracker.meta_block();
            scope.check(true);
        }

        let completed = tracker.finish(
            "test_T123",
            Vec::new(),
            RawTestResult::Failed {
                message: Some("boom".to_string()),
            },
        );

        assert!(completed.result.is_failure());
        assert_eq!(completed.steps.len(), 1);
        assert_eq!(completed.name, "test_T123");
    }

    #[test]
    fn test_finish_keeps_blocked_reason() {
        let tracker = StepTracker::new();
        let completed = tracker.finish(
            "test_T123",
            Vec::new(),
            RawTestResult::Blocked {
                reason: Some("environment down".to_string()),
            },
        );

        assert_eq!(
            completed.result,
            RawTestResult::Blocked {
                reason: Some("environment down".to_string())
            }
        );
    }

    #[test]
    fn test_clone_shares_recorded_steps() {
        let tracker = StepTracker::new();
        let handed_to_test = tracker.clone();
        {
            let mut scope = handed_to_test.meta_block();
            scope.check(true);
        }

        assert_eq!(tracker.steps().len(), 1);
    }
}
