//! Grade derivation.
//!
//! A pure function of the raw marks and the subject's marking scheme,
//! called by the write path before persistence. The band table is
//! configurable through the `GRADE_MAPPING` setting; the table below is
//! the fallback.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A percentage range (inclusive lower bound) mapped to a letter grade and
/// a numeric grade point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeBand {
    pub min: f64,
    pub grade: String,
    pub grade_point: f64,
}

/// Derived fields of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub percentage: f64,
    pub grade: String,
    pub grade_point: f64,
    pub is_passed: bool,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn default_bands() -> Vec<GradeBand> {
    [
        (90.0, "A+", 10.0),
        (80.0, "A", 9.0),
        (70.0, "B+", 8.0),
        (60.0, "B", 7.0),
        (50.0, "C", 6.0),
        (40.0, "D", 5.0),
        (0.0, "F", 0.0),
    ]
    .into_iter()
    .map(|(min, grade, grade_point)| GradeBand {
        min,
        grade: grade.to_string(),
        grade_point,
    })
    .collect()
}

/// Parses a band table from the `GRADE_MAPPING` setting value, falling
/// back to [`default_bands`] when the setting is absent or malformed.
pub fn bands_from_config(value: Option<serde_json::Value>) -> Vec<GradeBand> {
    let mut bands = value
        .and_then(|v| serde_json::from_value::<Vec<GradeBand>>(v).ok())
        .filter(|bands| !bands.is_empty())
        .unwrap_or_else(default_bands);

    bands.sort_by(|a, b| b.min.partial_cmp(&a.min).unwrap_or(std::cmp::Ordering::Equal));
    bands
}

/// Computes the derived fields of a result.
///
/// The percentage is rounded to two decimals before the band lookup, so a
/// raw 89.995% lands in the A+ band. Pass/fail compares raw marks against
/// `pass_marks` and is independent of the band table.
pub fn compute(
    marks_obtained: f64,
    max_marks: f64,
    pass_marks: f64,
    bands: &[GradeBand],
) -> GradeOutcome {
    let percentage = if max_marks > 0.0 {
        round2(marks_obtained / max_marks * 100.0)
    } else {
        0.0
    };

    let (grade, grade_point) = bands
        .iter()
        .find(|band| percentage >= band.min)
        .map(|band| (band.grade.clone(), band.grade_point))
        .unwrap_or_else(|| ("F".to_string(), 0.0));

    GradeOutcome {
        percentage,
        grade,
        grade_point,
        is_passed: marks_obtained >= pass_marks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_full_scheme() {
        // Subject{max:100, pass:40}, marks 85
        let outcome = compute(85.0, 100.0, 40.0, &default_bands());
        assert_eq!(outcome.percentage, 85.00);
        assert_eq!(outcome.grade, "A");
        assert_eq!(outcome.grade_point, 9.0);
        assert!(outcome.is_passed);
    }

    #[test]
    fn test_scenario_half_scheme_fail() {
        // Subject{max:50, pass:20}, marks 15
        let outcome = compute(15.0, 50.0, 20.0, &default_bands());
        assert_eq!(outcome.percentage, 30.00);
        assert_eq!(outcome.grade, "F");
        assert_eq!(outcome.grade_point, 0.0);
        assert!(!outcome.is_passed);
    }

    #[test]
    fn test_band_boundaries_inclusive() {
        let bands = default_bands();
        for (marks, expected_grade, expected_point) in [
            (90.0, "A+", 10.0),
            (80.0, "A", 9.0),
            (70.0, "B+", 8.0),
            (60.0, "B", 7.0),
            (50.0, "C", 6.0),
            (40.0, "D", 5.0),
            (39.99, "F", 0.0),
            (0.0, "F", 0.0),
        ] {
            let outcome = compute(marks, 100.0, 40.0, &bands);
            assert_eq!(outcome.grade, expected_grade, "marks {}", marks);
            assert_eq!(outcome.grade_point, expected_point, "marks {}", marks);
        }
    }

    #[test]
    fn test_rounding_happens_before_band_lookup() {
        // 89.995% rounds to 90.00 and lands in the A+ band.
        let outcome = compute(89.995, 100.0, 40.0, &default_bands());
        assert_eq!(outcome.percentage, 90.00);
        assert_eq!(outcome.grade, "A+");
    }

    #[test]
    fn test_pass_is_independent_of_band() {
        // Pass mark above the D/F boundary: 45/100 is a D but still a fail.
        let outcome = compute(45.0, 100.0, 50.0, &default_bands());
        assert_eq!(outcome.grade, "D");
        assert!(!outcome.is_passed);

        // Pass mark below the boundary: 30/100 is an F but a pass.
        let outcome = compute(30.0, 100.0, 25.0, &default_bands());
        assert_eq!(outcome.grade, "F");
        assert!(outcome.is_passed);
    }

    #[test]
    fn test_pass_boundary_is_inclusive() {
        let outcome = compute(40.0, 100.0, 40.0, &default_bands());
        assert!(outcome.is_passed);
    }

    #[test]
    fn test_zero_max_marks() {
        let outcome = compute(10.0, 0.0, 0.0, &default_bands());
        assert_eq!(outcome.percentage, 0.0);
        assert_eq!(outcome.grade, "F");
    }

    #[test]
    fn test_bands_from_config_custom_table() {
        let value = serde_json::json!([
            {"min": 50.0, "grade": "PASS", "grade_point": 1.0},
            {"min": 0.0, "grade": "FAIL", "grade_point": 0.0}
        ]);
        let bands = bands_from_config(Some(value));

        let outcome = compute(60.0, 100.0, 50.0, &bands);
        assert_eq!(outcome.grade, "PASS");
        assert_eq!(outcome.grade_point, 1.0);

        let outcome = compute(40.0, 100.0, 50.0, &bands);
        assert_eq!(outcome.grade, "FAIL");
    }

    #[test]
    fn test_bands_from_config_sorts_unordered_input() {
        let value = serde_json::json!([
            {"min": 0.0, "grade": "F", "grade_point": 0.0},
            {"min": 90.0, "grade": "A+", "grade_point": 10.0},
            {"min": 50.0, "grade": "C", "grade_point": 6.0}
        ]);
        let bands = bands_from_config(Some(value));
        assert_eq!(compute(95.0, 100.0, 40.0, &bands).grade, "A+");
        assert_eq!(compute(55.0, 100.0, 40.0, &bands).grade, "C");
    }

    #[test]
    fn test_bands_from_config_falls_back_on_garbage() {
        let bands = bands_from_config(Some(serde_json::json!({"not": "a table"})));
        assert_eq!(bands, {
            let mut expected = default_bands();
            expected.sort_by(|a, b| b.min.partial_cmp(&a.min).unwrap());
            expected
        });

        let bands = bands_from_config(None);
        assert_eq!(compute(85.0, 100.0, 40.0, &bands).grade, "A");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(63.333333), 63.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(85.0), 85.0);
    }
}
