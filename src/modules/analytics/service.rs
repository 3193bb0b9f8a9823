use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::analytics::model::{
    DistributionStats, GradeBucket, SubjectDistribution, SubjectSummary, TopPerformer,
    TrendParams, TrendPoint,
};
use crate::modules::classes::service::ClassService;
use crate::modules::results::grading::round2;
use crate::modules::subjects::service::SubjectService;
use crate::utils::errors::AppError;

pub struct AnalyticsService;

impl AnalyticsService {
    /// Top performers of a class: roster results grouped by student,
    /// ordered by mean marks. Ties break by student creation order.
    #[instrument(skip(db))]
    pub async fn top_performers(
        db: &PgPool,
        class_id: Uuid,
        semester: Option<i32>,
        limit: i64,
    ) -> Result<Vec<TopPerformer>, AppError> {
        ClassService::get_class_by_id(db, class_id).await?;

        let mut performers = sqlx::query_as::<_, TopPerformer>(
            "SELECT st.id AS student_id, st.roll_no, u.first_name, u.last_name, \
                    AVG(r.marks_obtained) AS avg_marks, \
                    AVG(r.grade_point) AS avg_grade_point, \
                    COUNT(*) AS total_subjects \
             FROM results r \
             JOIN students st ON st.id = r.student_id \
             JOIN users u ON u.id = st.user_id \
             WHERE st.class_id = $1 AND ($2::INT IS NULL OR r.semester = $2) \
             GROUP BY st.id, st.roll_no, u.first_name, u.last_name, st.created_at \
             ORDER BY avg_marks DESC, st.created_at ASC, st.id \
             LIMIT $3",
        )
        .bind(class_id)
        .bind(semester)
        .bind(limit)
        .fetch_all(db)
        .await?;

        for performer in &mut performers {
            performer.avg_marks = round2(performer.avg_marks);
            performer.avg_grade_point = round2(performer.avg_grade_point);
        }

        Ok(performers)
    }

    /// Marks distribution for a subject: per-grade buckets plus an overall
    /// statistics block for the slice.
    #[instrument(skip(db))]
    pub async fn subject_distribution(
        db: &PgPool,
        subject_id: Uuid,
        semester: Option<i32>,
    ) -> Result<SubjectDistribution, AppError> {
        let subject = SubjectService::get_subject_by_id(db, subject_id).await?;

        let mut distribution = sqlx::query_as::<_, GradeBucket>(
            "SELECT grade, COUNT(*) AS count, AVG(marks_obtained) AS avg_marks \
             FROM results \
             WHERE subject_id = $1 AND ($2::INT IS NULL OR semester = $2) \
             GROUP BY grade \
             ORDER BY grade",
        )
        .bind(subject_id)
        .bind(semester)
        .fetch_all(db)
        .await?;

        for bucket in &mut distribution {
            bucket.avg_marks = round2(bucket.avg_marks);
        }

        let stats: (i64, Option<f64>, Option<f64>, Option<f64>, i64) = sqlx::query_as(
            "SELECT COUNT(*), AVG(marks_obtained), MAX(marks_obtained), MIN(marks_obtained), \
                    COUNT(*) FILTER (WHERE is_passed) \
             FROM results \
             WHERE subject_id = $1 AND ($2::INT IS NULL OR semester = $2)",
        )
        .bind(subject_id)
        .bind(semester)
        .fetch_one(db)
        .await?;

        Ok(SubjectDistribution {
            subject: SubjectSummary {
                id: subject.id,
                code: subject.code,
                name: subject.name,
                max_marks: subject.max_marks,
            },
            distribution,
            statistics: DistributionStats {
                total_students: stats.0,
                avg_marks: round2(stats.1.unwrap_or(0.0)),
                max_marks: stats.2.unwrap_or(0.0),
                min_marks: stats.3.unwrap_or(0.0),
                passed_count: stats.4,
            },
        })
    }

    /// Performance over time, bucketed by (year, month, semester) of the
    /// result's creation, in chronological order.
    #[instrument(skip(db, params))]
    pub async fn performance_trends(
        db: &PgPool,
        params: &TrendParams,
    ) -> Result<Vec<TrendPoint>, AppError> {
        type Row = (i32, i32, i32, f64, f64, f64, i64);

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT EXTRACT(YEAR FROM r.created_at)::INT AS year, \
                    EXTRACT(MONTH FROM r.created_at)::INT AS month, \
                    r.semester, \
                    AVG(r.marks_obtained) AS avg_marks, \
                    AVG(r.grade_point) AS avg_grade_point, \
                    AVG(CASE WHEN r.is_passed THEN 100.0 ELSE 0.0 END)::FLOAT8 AS pass_rate, \
                    COUNT(*) AS total_results \
             FROM results r \
             JOIN students st ON st.id = r.student_id \
             WHERE ($1::DATE IS NULL OR r.created_at >= $1) \
               AND ($2::DATE IS NULL OR r.created_at <= $2 + INTERVAL '1 day') \
               AND ($3::UUID IS NULL OR st.class_id = $3) \
               AND ($4::UUID IS NULL OR r.subject_id = $4) \
             GROUP BY 1, 2, 3 \
             ORDER BY 1, 2, 3",
        )
        .bind(params.from)
        .bind(params.to)
        .bind(params.class_id)
        .bind(params.subject_id)
        .fetch_all(db)
        .await?;

        let trends = rows
            .into_iter()
            .map(
                |(year, month, semester, avg_marks, avg_grade_point, pass_rate, total_results)| {
                    TrendPoint {
                        period: format!("{}-{} (Sem {})", year, month, semester),
                        year,
                        month,
                        semester,
                        avg_marks: round2(avg_marks),
                        avg_grade_point: round2(avg_grade_point),
                        pass_rate: round2(pass_rate),
                        total_results,
                    }
                },
            )
            .collect();

        Ok(trends)
    }
}
