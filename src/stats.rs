use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{GradeRecord, ScoreCategory, StudentBuckets, WeightedAverage};

pub const EXAM_WEIGHT: f64 = 0.5;
pub const QUIZ_WEIGHT: f64 = 0.3;
pub const HOMEWORK_WEIGHT: f64 = 0.2;

/// Pass cutoff for class-level reports, applied to the weighted average.
pub const CLASS_PASS_THRESHOLD: f64 = 60.0;
/// Pass cutoff for the enrollment report, applied to the flat score mean.
pub const ENROLLMENT_PASS_THRESHOLD: f64 = 70.0;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no classifiable averages in the record set; ratio is undefined")]
    EmptyResult,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdSummary {
    pub total: usize,
    pub above_threshold: usize,
    pub ratio: f64,
}

/// Flattens every record's score list and groups entries by learner.
/// Entries with an unrecognized category reach no bucket; not an error.
pub fn group_scores(records: &[GradeRecord]) -> BTreeMap<i64, StudentBuckets> {
    let mut buckets: BTreeMap<i64, StudentBuckets> = BTreeMap::new();

    for record in records {
        for entry in &record.scores {
            let Some(category) = ScoreCategory::parse(&entry.category) else {
                continue;
            };
            buckets
                .entry(record.learner_id)
                .or_default()
                .push(category, entry.value);
        }
    }

    buckets
}

/// Combines one student's category averages into a weighted score.
/// Absence propagates: a student missing any category has no weighted
/// average at all.
pub fn weighted_average(buckets: &StudentBuckets) -> WeightedAverage {
    let exam_avg = mean(&buckets.exam);
    let quiz_avg = mean(&buckets.quiz);
    let homework_avg = mean(&buckets.homework);

    let weighted_avg = match (exam_avg, quiz_avg, homework_avg) {
        (Some(exam), Some(quiz), Some(homework)) => {
            Some(exam * EXAM_WEIGHT + quiz * QUIZ_WEIGHT + homework * HOMEWORK_WEIGHT)
        }
        _ => None,
    };

    WeightedAverage {
        exam_avg,
        quiz_avg,
        homework_avg,
        weighted_avg,
    }
}

/// Counts averages strictly above `threshold` against the number of
/// present averages. Absent averages cannot be classified and are
/// excluded from the total.
pub fn aggregate_above_threshold(
    averages: &[Option<f64>],
    threshold: f64,
) -> Result<ThresholdSummary, StatsError> {
    let mut total = 0usize;
    let mut above = 0usize;

    for avg in averages.iter().flatten() {
        total += 1;
        if *avg > threshold {
            above += 1;
        }
    }

    if total == 0 {
        return Err(StatsError::EmptyResult);
    }

    Ok(ThresholdSummary {
        total,
        above_threshold: above,
        ratio: above as f64 / total as f64,
    })
}

/// Mean of every score on a record regardless of category, used by the
/// enrollment report. A record with no scores has no mean.
pub fn flat_average(record: &GradeRecord) -> Option<f64> {
    let values: Vec<f64> = record.scores.iter().map(|entry| entry.value).collect();
    mean(&values)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreEntry;
    use uuid::Uuid;

    fn sample_record(class_id: i32, learner_id: i64, scores: &[(&str, f64)]) -> GradeRecord {
        GradeRecord {
            id: Uuid::new_v4(),
            class_id,
            learner_id,
            scores: scores
                .iter()
                .map(|(category, value)| ScoreEntry {
                    category: category.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn groups_scores_by_learner_and_category() {
        let records = vec![
            sample_record(101, 1, &[("exam", 80.0), ("quiz", 70.0)]),
            sample_record(102, 1, &[("homework", 100.0)]),
            sample_record(101, 2, &[("exam", 55.0)]),
        ];

        let grouped = group_scores(&records);
        assert_eq!(grouped.len(), 2);

        let first = &grouped[&1];
        assert_eq!(first.exam, vec![80.0]);
        assert_eq!(first.quiz, vec![70.0]);
        assert_eq!(first.homework, vec![100.0]);

        let second = &grouped[&2];
        assert_eq!(second.exam, vec![55.0]);
        assert!(second.quiz.is_empty());
        assert!(second.homework.is_empty());
    }

    #[test]
    fn unrecognized_categories_reach_no_bucket() {
        let records = vec![sample_record(
            101,
            1,
            &[("exam", 90.0), ("extra-credit", 100.0), ("quiz", 80.0)],
        )];

        let grouped = group_scores(&records);
        let buckets = &grouped[&1];
        assert_eq!(buckets.categorized_count(), 2);
        assert_eq!(buckets.exam, vec![90.0]);
        assert_eq!(buckets.quiz, vec![80.0]);
        assert!(buckets.homework.is_empty());
    }

    #[test]
    fn grouping_preserves_categorized_entry_counts() {
        let records = vec![
            sample_record(101, 1, &[("exam", 1.0), ("quiz", 2.0), ("oral", 3.0)]),
            sample_record(102, 1, &[("homework", 4.0), ("homework", 5.0)]),
        ];

        let grouped = group_scores(&records);
        assert_eq!(grouped[&1].categorized_count(), 4);
    }

    #[test]
    fn weighted_average_matches_fixed_weights() {
        let records = vec![sample_record(
            101,
            1,
            &[
                ("exam", 80.0),
                ("exam", 90.0),
                ("quiz", 70.0),
                ("homework", 100.0),
            ],
        )];

        let grouped = group_scores(&records);
        let avg = weighted_average(&grouped[&1]);

        assert_eq!(avg.exam_avg, Some(85.0));
        assert_eq!(avg.quiz_avg, Some(70.0));
        assert_eq!(avg.homework_avg, Some(100.0));
        let weighted = avg.weighted_avg.unwrap();
        assert!((weighted - 83.5).abs() < 1e-9);
    }

    #[test]
    fn weighted_average_ignores_score_order() {
        let forward = StudentBuckets {
            quiz: vec![60.0, 90.0],
            exam: vec![70.0, 80.0],
            homework: vec![100.0],
        };
        let reversed = StudentBuckets {
            quiz: vec![90.0, 60.0],
            exam: vec![80.0, 70.0],
            homework: vec![100.0],
        };

        let a = weighted_average(&forward).weighted_avg.unwrap();
        let b = weighted_average(&reversed).weighted_avg.unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn empty_bucket_keeps_average_absent() {
        let buckets = StudentBuckets {
            quiz: vec![70.0],
            exam: vec![80.0],
            homework: Vec::new(),
        };

        let avg = weighted_average(&buckets);
        assert_eq!(avg.homework_avg, None);
        assert_eq!(avg.weighted_avg, None);
    }

    #[test]
    fn aggregate_counts_strictly_above_threshold() {
        let averages = vec![Some(83.5), Some(50.0), Some(60.0)];
        let summary = aggregate_above_threshold(&averages, CLASS_PASS_THRESHOLD).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.above_threshold, 1);
        assert!((summary.ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!(summary.above_threshold <= summary.total);
    }

    #[test]
    fn aggregate_excludes_absent_averages_from_total() {
        let averages = vec![Some(83.5), None, Some(50.0)];
        let summary = aggregate_above_threshold(&averages, CLASS_PASS_THRESHOLD).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.above_threshold, 1);
        assert!((summary.ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn aggregate_with_no_classifiable_averages_is_an_error() {
        let averages = vec![None, None];
        let result = aggregate_above_threshold(&averages, CLASS_PASS_THRESHOLD);
        assert!(matches!(result, Err(StatsError::EmptyResult)));

        let result = aggregate_above_threshold(&[], CLASS_PASS_THRESHOLD);
        assert!(matches!(result, Err(StatsError::EmptyResult)));
    }

    #[test]
    fn flat_average_spans_every_category() {
        let record = sample_record(
            101,
            1,
            &[("exam", 80.0), ("quiz", 60.0), ("extra-credit", 100.0)],
        );

        let avg = flat_average(&record).unwrap();
        assert!((avg - 80.0).abs() < 1e-9);
    }

    #[test]
    fn flat_average_of_scoreless_record_is_absent() {
        let record = sample_record(101, 1, &[]);
        assert_eq!(flat_average(&record), None);
    }
}
