use crate::models::{GradeRecord, ScoreCategory, Violation};

pub const MIN_CLASS_ID: i32 = 0;
pub const MAX_CLASS_ID: i32 = 300;

/// Advisory conformance check: findings are reported, never enforced,
/// and the aggregation pipeline runs over the records regardless.
pub fn check_records(records: &[GradeRecord]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for record in records {
        if record.class_id < MIN_CLASS_ID || record.class_id > MAX_CLASS_ID {
            violations.push(Violation {
                class_id: record.class_id,
                learner_id: record.learner_id,
                field: "class_id",
                message: format!(
                    "class_id must be between {MIN_CLASS_ID} and {MAX_CLASS_ID}, got {}",
                    record.class_id
                ),
            });
        }

        if record.learner_id < 0 {
            violations.push(Violation {
                class_id: record.class_id,
                learner_id: record.learner_id,
                field: "learner_id",
                message: format!(
                    "learner_id must be greater than or equal to 0, got {}",
                    record.learner_id
                ),
            });
        }

        for entry in &record.scores {
            if ScoreCategory::parse(&entry.category).is_none() {
                violations.push(Violation {
                    class_id: record.class_id,
                    learner_id: record.learner_id,
                    field: "scores.category",
                    message: format!(
                        "unrecognized score category {:?}; entry is excluded from averages",
                        entry.category
                    ),
                });
            }
        }
    }

    violations
}
