//! # Outcome Module Unit Tests / Outcome 模块单元测试
//!
//! This module contains unit tests for the status decision table and the
//! local accounting status.
//!
//! 此模块包含状态决策表和本地计数状态的单元测试。

use adaptavist_reporter::core::models::{
    CompletedTest, Marker, RawTestResult, Step, StepStatus, TestCaseRef, TestStatus,
};
use adaptavist_reporter::core::outcome::{local_status, reduce, reduce_test};

fn case_ref() -> TestCaseRef {
    TestCaseRef {
        project_key: "TEST".to_string(),
        case_key: "TEST-T123".to_string(),
        run_key: "TEST-C1".to_string(),
        environment: String::new(),
    }
}

fn passing_step(index: usize) -> Step {
    Step {
        index,
        status: StepStatus::Pass,
        comment: None,
        attachment: None,
        filename: None,
    }
}

fn failing_step(index: usize) -> Step {
    Step {
        index,
        status: StepStatus::Fail,
        comment: None,
        attachment: None,
        filename: None,
    }
}

#[cfg(test)]
mod decision_table_tests {
    use super::*;

    #[test]
    fn test_clean_pass() {
        let outcome = reduce(&RawTestResult::Passed, vec![passing_step(1)], case_ref());
        assert_eq!(outcome.status, TestStatus::Pass);
        assert!(outcome.comment.is_none());
    }

    #[test]
    fn test_failed_step_fails_the_test() {
        let outcome = reduce(
            &RawTestResult::Passed,
            vec![passing_step(1), failing_step(2)],
            case_ref(),
        );
        assert_eq!(outcome.status, TestStatus::Fail);
    }

    #[test]
    fn test_failed_body_fails_despite_clean_steps() {
        let outcome = reduce(
            &RawTestResult::Failed {
                message: Some("assertion outside any scope".to_string()),
            },
            vec![passing_step(1)],
            case_ref(),
        );
        assert_eq!(outcome.status, TestStatus::Fail);
        assert_eq!(
            outcome.comment.as_deref(),
            Some("assertion outside any scope")
        );
    }

    #[test]
    fn test_skip_maps_to_not_executed() {
        let outcome = reduce(
            &RawTestResult::Skipped {
                reason: Some("platform not supported".to_string()),
            },
            Vec::new(),
            case_ref(),
        );
        assert_eq!(outcome.status, TestStatus::NotExecuted);
        assert_eq!(outcome.comment.as_deref(), Some("platform not supported"));
    }

    #[test]
    fn test_blocked_wins_over_failed_steps() {
        let outcome = reduce(
            &RawTestResult::Blocked { reason: None },
            vec![failing_step(1)],
            case_ref(),
        );
        assert_eq!(outcome.status, TestStatus::Blocked);
    }

    #[test]
    fn test_steps_are_carried_unmodified() {
        let step = Step {
            index: 1,
            status: StepStatus::Pass,
            comment: Some("checked".to_string()),
            attachment: Some(b"payload".to_vec()),
            filename: Some("log.txt".to_string()),
        };
        let outcome = reduce(&RawTestResult::Passed, vec![step.clone()], case_ref());

        assert_eq!(outcome.steps, vec![step]);
        assert_eq!(outcome.attachments().count(), 1);
    }

    #[test]
    fn test_status_api_strings() {
        assert_eq!(TestStatus::Pass.as_api_str(), "Pass");
        assert_eq!(TestStatus::Fail.as_api_str(), "Fail");
        assert_eq!(TestStatus::Blocked.as_api_str(), "Blocked");
        assert_eq!(TestStatus::NotExecuted.as_api_str(), "Not Executed");
    }
}

#[cfg(test)]
mod marker_and_local_tests {
    use super::*;

    #[test]
    fn test_block_marker_forces_blocked() {
        let test = CompletedTest::new(
            "test_T123",
            vec![Marker::Block],
            RawTestResult::Passed,
            vec![passing_step(1)],
        );
        let outcome = reduce_test(&test, case_ref());

        assert_eq!(outcome.status, TestStatus::Blocked);
        assert_eq!(outcome.steps.len(), 1);
    }

    #[test]
    fn test_without_block_marker_reduction_is_plain() {
        let test = CompletedTest::new(
            "test_T123",
            Vec::new(),
            RawTestResult::Passed,
            vec![failing_step(1)],
        );
        assert_eq!(reduce_test(&test, case_ref()).status, TestStatus::Fail);
    }

    #[test]
    fn test_local_status_blocked_for_marker() {
        let test = CompletedTest::new(
            "test_dummy",
            vec![Marker::Block],
            RawTestResult::Passed,
            Vec::new(),
        );
        assert_eq!(local_status(&test), TestStatus::Blocked);
    }

    #[test]
    fn test_local_status_follows_steps() {
        let clean = CompletedTest::new(
            "test_dummy",
            Vec::new(),
            RawTestResult::Passed,
            vec![passing_step(1)],
        );
        let dirty = CompletedTest::new(
            "test_dummy",
            Vec::new(),
            RawTestResult::Passed,
            vec![failing_step(1)],
        );

        assert_eq!(local_status(&clean), TestStatus::Pass);
        assert_eq!(local_status(&dirty), TestStatus::Fail);
    }

    #[test]
    fn test_local_status_skip_and_fail() {
        let skipped = CompletedTest::new(
            "test_dummy",
            Vec::new(),
            RawTestResult::Skipped { reason: None },
            Vec::new(),
        );
        let failed = CompletedTest::new(
            "test_dummy",
            Vec::new(),
            RawTestResult::Failed { message: None },
            Vec::new(),
        );

        assert_eq!(local_status(&skipped), TestStatus::NotExecuted);
        assert_eq!(local_status(&failed), TestStatus::Fail);
    }
}
