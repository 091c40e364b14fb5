use serde::Serialize;
use uuid::Uuid;

/// One grade document per learner enrollment in a class.
#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub id: Uuid,
    pub class_id: i32,
    pub learner_id: i64,
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone)]
pub struct ScoreEntry {
    pub category: String,
    pub value: f64,
}

/// Closed set of assessment categories. Anything else is
/// present-but-uncategorized and contributes to no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCategory {
    Quiz,
    Exam,
    Homework,
}

impl ScoreCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "quiz" => Some(Self::Quiz),
            "exam" => Some(Self::Exam),
            "homework" => Some(Self::Homework),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentBuckets {
    pub quiz: Vec<f64>,
    pub exam: Vec<f64>,
    pub homework: Vec<f64>,
}

impl StudentBuckets {
    pub fn push(&mut self, category: ScoreCategory, value: f64) {
        match category {
            ScoreCategory::Quiz => self.quiz.push(value),
            ScoreCategory::Exam => self.exam.push(value),
            ScoreCategory::Homework => self.homework.push(value),
        }
    }

    pub fn categorized_count(&self) -> usize {
        self.quiz.len() + self.exam.len() + self.homework.len()
    }
}

/// Per-student category averages. An empty bucket yields `None`, never zero.
#[derive(Debug, Clone, Copy)]
pub struct WeightedAverage {
    pub exam_avg: Option<f64>,
    pub quiz_avg: Option<f64>,
    pub homework_avg: Option<f64>,
    pub weighted_avg: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassStatsReport {
    #[serde(rename = "totalStudents")]
    pub total_students: usize,
    #[serde(rename = "above60Students")]
    pub above_60_students: usize,
    pub ratio: f64,
    #[serde(rename = "class_id")]
    pub class_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerClassStatsReport {
    pub ratio: f64,
}

/// The ratio runs total-over-above, the inverse of the class reports;
/// callers depend on that orientation.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentStatsReport {
    #[serde(rename = "totalLearners")]
    pub total_learners: usize,
    #[serde(rename = "learnersAvgAbove70")]
    pub learners_avg_above_70: usize,
    #[serde(rename = "ratioOfStudentsAbove70")]
    pub ratio_of_students_above_70: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub class_id: i32,
    pub learner_id: i64,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "class {} learner {}: {} ({})",
            self.class_id, self.learner_id, self.message, self.field
        )
    }
}
