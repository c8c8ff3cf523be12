use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::test::PassPercentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    Passed,
    Failed,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Passed => f.write_str("Passed"),
            TestResult::Failed => f.write_str("Failed"),
        }
    }
}

pub struct GradingService;

impl GradingService {
    /// How far into the ordered question sequence the student is, computed
    /// before the current question is answered.
    pub fn progress(remaining: i64, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let done = ((remaining - 1) as f64 / total as f64) * 100.0;
        100 - done.round_ties_even() as i64
    }

    /// Percentage of correct answers, rounded half-to-even to two places.
    pub fn score(correct: i64, total: i64) -> Decimal {
        if total <= 0 {
            return Decimal::ZERO;
        }
        let mut score =
            (Decimal::from(correct) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(2);
        score.rescale(2);
        score
    }

    pub fn classify(score: Decimal, pass_percentage: PassPercentage) -> TestResult {
        if score < Decimal::from(pass_percentage.value()) {
            TestResult::Failed
        } else {
            TestResult::Passed
        }
    }

    pub fn result_message(test_name: &str, score: Decimal, result: TestResult) -> String {
        match result {
            TestResult::Passed => format!(
                "Congratulations! You completed the test {} with success! You scored {} points.",
                test_name, score
            ),
            TestResult::Failed => format!(
                "Better luck next time! Your score for the test {} was {}.",
                test_name, score
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn progress_follows_remaining_questions() {
        assert_eq!(GradingService::progress(1, 1), 100);
        assert_eq!(GradingService::progress(2, 2), 50);
        assert_eq!(GradingService::progress(1, 2), 100);
        assert_eq!(GradingService::progress(4, 4), 25);
        assert_eq!(GradingService::progress(3, 4), 50);
        assert_eq!(GradingService::progress(3, 3), 33);
        assert_eq!(GradingService::progress(2, 3), 67);
    }

    #[test]
    fn progress_rounds_half_to_even() {
        // 3/8 = 37.5% done -> 38, 5/8 = 62.5% done -> 62
        assert_eq!(GradingService::progress(4, 8), 62);
        assert_eq!(GradingService::progress(6, 8), 38);
    }

    #[test]
    fn progress_of_empty_test_is_zero() {
        assert_eq!(GradingService::progress(0, 0), 0);
    }

    #[test]
    fn score_rounds_to_two_places() {
        assert_eq!(GradingService::score(2, 2), dec("100.00"));
        assert_eq!(GradingService::score(1, 2), dec("50.00"));
        assert_eq!(GradingService::score(0, 2), dec("0.00"));
        assert_eq!(GradingService::score(2, 3), dec("66.67"));
        assert_eq!(GradingService::score(1, 3), dec("33.33"));
        assert_eq!(GradingService::score(1, 32), dec("3.12"));
        assert_eq!(GradingService::score(0, 0), Decimal::ZERO);
        assert_eq!(GradingService::score(1, 2).to_string(), "50.00");
    }

    #[test]
    fn threshold_is_inclusive() {
        let pass = PassPercentage::P50;
        assert_eq!(GradingService::classify(dec("100.00"), pass), TestResult::Passed);
        assert_eq!(GradingService::classify(dec("50.00"), pass), TestResult::Passed);
        assert_eq!(GradingService::classify(dec("49.99"), pass), TestResult::Failed);
        assert_eq!(GradingService::classify(dec("0.00"), pass), TestResult::Failed);
    }

    #[test]
    fn algebra_example() {
        let total = 2;
        let pass = PassPercentage::P50;
        let outcomes: Vec<_> = (0..=total)
            .rev()
            .map(|correct| {
                let score = GradingService::score(correct, total);
                (score, GradingService::classify(score, pass))
            })
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (dec("100.00"), TestResult::Passed),
                (dec("50.00"), TestResult::Passed),
                (dec("0.00"), TestResult::Failed),
            ]
        );
    }

    #[test]
    fn messages_name_test_and_score() {
        let msg = GradingService::result_message("Algebra 101", dec("50.00"), TestResult::Passed);
        assert_eq!(
            msg,
            "Congratulations! You completed the test Algebra 101 with success! You scored 50.00 points."
        );
        let msg = GradingService::result_message("Algebra 101", dec("0.00"), TestResult::Failed);
        assert_eq!(msg, "Better luck next time! Your score for the test Algebra 101 was 0.00.");
    }
}
