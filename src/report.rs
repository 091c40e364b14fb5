use crate::models::{
    ClassStatsReport, EnrollmentStatsReport, GradeRecord, PerClassStatsReport,
};
use crate::stats::{self, StatsError};

/// Class pass-rate across the whole record set, grouped by learner only.
/// A learner enrolled in several classes is merged into one aggregate row
/// spanning all of them; that grouping is part of the report's contract.
pub fn global_class_stats(records: &[GradeRecord]) -> Result<ClassStatsReport, StatsError> {
    let summary = class_summary(records)?;

    let mut class_ids: Vec<i32> = records.iter().map(|record| record.class_id).collect();
    class_ids.sort_unstable();
    class_ids.dedup();

    Ok(ClassStatsReport {
        total_students: summary.total,
        above_60_students: summary.above_threshold,
        ratio: summary.ratio,
        class_ids,
    })
}

/// Pass-rate for one class. The record source pre-filters to the class,
/// so the pipeline here is the global one minus the class id listing.
pub fn per_class_stats(records: &[GradeRecord]) -> Result<PerClassStatsReport, StatsError> {
    let summary = class_summary(records)?;
    Ok(PerClassStatsReport {
        ratio: summary.ratio,
    })
}

/// Enrollment-level performance. Counts grade records (one per
/// enrollment, never deduplicated by learner) and classifies each by the
/// flat mean of all its scores. The ratio is total over above.
pub fn enrollment_stats(records: &[GradeRecord]) -> Result<EnrollmentStatsReport, StatsError> {
    let total_learners = records.len();
    let above = records
        .iter()
        .filter(|record| {
            stats::flat_average(record)
                .is_some_and(|avg| avg > stats::ENROLLMENT_PASS_THRESHOLD)
        })
        .count();

    if total_learners == 0 || above == 0 {
        return Err(StatsError::EmptyResult);
    }

    Ok(EnrollmentStatsReport {
        total_learners,
        learners_avg_above_70: above,
        ratio_of_students_above_70: total_learners as f64 / above as f64,
    })
}

fn class_summary(records: &[GradeRecord]) -> Result<stats::ThresholdSummary, StatsError> {
    let grouped = stats::group_scores(records);
    let averages: Vec<Option<f64>> = grouped
        .values()
        .map(|buckets| stats::weighted_average(buckets).weighted_avg)
        .collect();

    stats::aggregate_above_threshold(&averages, stats::CLASS_PASS_THRESHOLD)
}
