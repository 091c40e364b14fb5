use anyhow::Context;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{GradeRecord, ScoreEntry};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Fetches grade records, optionally scoped to one class. Enrollments
/// without any scores still come back as records with an empty score
/// list; the enrollment report counts them.
pub async fn fetch_records(
    pool: &PgPool,
    class_id: Option<i32>,
) -> anyhow::Result<Vec<GradeRecord>> {
    let mut query = String::from(
        "SELECT g.id AS grade_id, g.class_id, g.learner_id, s.category, s.value \
         FROM gradebook.grades g \
         LEFT JOIN gradebook.scores s ON s.grade_id = g.id",
    );

    if class_id.is_some() {
        query.push_str(" WHERE g.class_id = $1");
    }
    query.push_str(" ORDER BY g.id, s.ordinal");

    let mut rows = sqlx::query(&query);
    if let Some(value) = class_id {
        rows = rows.bind(value);
    }

    let fetched = rows
        .fetch_all(pool)
        .await
        .context("failed to fetch grade records")?;

    let mut records: Vec<GradeRecord> = Vec::new();

    for row in fetched {
        let grade_id: Uuid = row.get("grade_id");
        if !records.last().is_some_and(|record| record.id == grade_id) {
            records.push(GradeRecord {
                id: grade_id,
                class_id: row.get("class_id"),
                learner_id: row.get("learner_id"),
                scores: Vec::new(),
            });
        }

        let category: Option<String> = row.get("category");
        let value: Option<f64> = row.get("value");
        if let (Some(category), Some(value), Some(record)) =
            (category, value, records.last_mut())
        {
            record.scores.push(ScoreEntry { category, value });
        }
    }

    Ok(records)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let enrollments = vec![
        (101, 1001_i64),
        (101, 1002),
        (102, 1001),
        (102, 1003),
    ];

    for (class_id, learner_id) in enrollments {
        upsert_grade(pool, class_id, learner_id).await?;
    }

    let scores = vec![
        ("seed-001", 101, 1001_i64, "exam", 82.0, 0),
        ("seed-002", 101, 1001, "quiz", 74.5, 1),
        ("seed-003", 101, 1001, "homework", 91.0, 2),
        ("seed-004", 101, 1002, "exam", 48.0, 0),
        ("seed-005", 101, 1002, "quiz", 55.0, 1),
        ("seed-006", 101, 1002, "homework", 66.0, 2),
        ("seed-007", 102, 1001, "exam", 77.0, 0),
        ("seed-008", 102, 1001, "extra-credit", 100.0, 1),
        ("seed-009", 102, 1003, "quiz", 88.0, 0),
        ("seed-010", 102, 1003, "homework", 93.5, 1),
    ];

    for (source_key, class_id, learner_id, category, value, ordinal) in scores {
        let grade_id = upsert_grade(pool, class_id, learner_id).await?;

        sqlx::query(
            r#"
            INSERT INTO gradebook.scores
            (id, grade_id, category, value, ordinal, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(grade_id)
        .bind(category)
        .bind(value)
        .bind(ordinal)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        class_id: i32,
        learner_id: i64,
        category: String,
        value: f64,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let grade_id = upsert_grade(pool, row.class_id, row.learner_id).await?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO gradebook.scores
            (id, grade_id, category, value, ordinal, source_key)
            VALUES ($1, $2, $3, $4,
                (SELECT COALESCE(MAX(ordinal) + 1, 0)
                 FROM gradebook.scores WHERE grade_id = $2),
                $5)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(grade_id)
        .bind(&row.category)
        .bind(row.value)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

async fn upsert_grade(pool: &PgPool, class_id: i32, learner_id: i64) -> anyhow::Result<Uuid> {
    let grade_id: Uuid = sqlx::query(
        r#"
        INSERT INTO gradebook.grades (id, class_id, learner_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (class_id, learner_id) DO UPDATE
        SET learner_id = EXCLUDED.learner_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(class_id)
    .bind(learner_id)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(grade_id)
}
