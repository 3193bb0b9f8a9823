use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::attendance::model::{
    AttendanceEntry, AttendanceFilterParams, AttendanceRecord, AttendanceStatus,
    AttendanceSummary, AttendanceSummaryParams, AttendanceWithContext, AttendanceEntryError, StatusCount,
    SubjectAttendance,
};
use crate::modules::results::grading::round2;
use crate::modules::students::service::StudentService;
use crate::modules::subjects::service::SubjectService;
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

const COLUMNS: &str = "id, student_id, subject_id, date, status, remarks, created_by, \
     created_at, updated_at";

pub struct AttendanceService;

impl AttendanceService {
    /// Bulk attendance marking for one subject on one day. Entries are
    /// isolated from each other; an existing (student, subject, date)
    /// record is updated in place.
    #[instrument(skip(db, entries))]
    pub async fn mark_attendance(
        db: &PgPool,
        subject_id: Uuid,
        date: Option<chrono::NaiveDate>,
        entries: Vec<AttendanceEntry>,
        actor_id: Uuid,
    ) -> Result<(Vec<AttendanceRecord>, Vec<AttendanceEntryError>), AppError> {
        SubjectService::get_subject_by_id(db, subject_id).await?;

        let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for entry in entries {
            match Self::mark_one(db, subject_id, date, &entry, actor_id).await {
                Ok(record) => results.push(record),
                Err(err) => errors.push(AttendanceEntryError {
                    student_id: entry.student_id,
                    error: match err {
                        AppError::Validation(msg)
                        | AppError::NotFound(msg)
                        | AppError::Conflict(msg) => msg,
                        _ => "Failed to mark attendance".to_string(),
                    },
                }),
            }
        }

        Ok((results, errors))
    }

    async fn mark_one(
        db: &PgPool,
        subject_id: Uuid,
        date: chrono::NaiveDate,
        entry: &AttendanceEntry,
        actor_id: Uuid,
    ) -> Result<AttendanceRecord, AppError> {
        let student: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM students WHERE id = $1")
            .bind(entry.student_id)
            .fetch_optional(db)
            .await?;
        if student.is_none() {
            return Err(AppError::not_found("Student"));
        }

        let existing = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {COLUMNS} FROM attendance \
             WHERE student_id = $1 AND subject_id = $2 AND date = $3"
        ))
        .bind(entry.student_id)
        .bind(subject_id)
        .bind(date)
        .fetch_optional(db)
        .await?;

        let record = match existing {
            Some(before) => {
                sqlx::query_as::<_, AttendanceRecord>(&format!(
                    "UPDATE attendance \
                     SET status = $1, remarks = $2, updated_at = NOW() \
                     WHERE id = $3 \
                     RETURNING {COLUMNS}"
                ))
                .bind(entry.status)
                .bind(&entry.remarks)
                .bind(before.id)
                .fetch_one(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, AttendanceRecord>(&format!(
                    "INSERT INTO attendance \
                         (student_id, subject_id, date, status, remarks, created_by) \
                     VALUES ($1, $2, $3, $4, $5, $6) \
                     RETURNING {COLUMNS}"
                ))
                .bind(entry.student_id)
                .bind(subject_id)
                .bind(date)
                .bind(entry.status)
                .bind(&entry.remarks)
                .bind(actor_id)
                .fetch_one(db)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            return AppError::conflict(
                                "Attendance already marked for this student, subject and date",
                            );
                        }
                    }
                    AppError::database(e)
                })?
            }
        };

        Ok(record)
    }

    #[instrument(skip(db, params))]
    pub async fn get_attendance(
        db: &PgPool,
        params: &AttendanceFilterParams,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<(Vec<AttendanceWithContext>, i64), AppError> {
        // Students only ever see their own attendance.
        let student_filter = if actor_role == UserRole::Student {
            match StudentService::find_by_user_id(db, actor_id).await? {
                Some(student) => Some(student.id),
                None => return Ok((Vec::new(), 0)),
            }
        } else {
            params.student_id
        };

        let filter = "($1::UUID IS NULL OR a.student_id = $1) \
             AND ($2::UUID IS NULL OR a.subject_id = $2) \
             AND ($3::attendance_status IS NULL OR a.status = $3) \
             AND ($4::DATE IS NULL OR a.date >= $4) \
             AND ($5::DATE IS NULL OR a.date <= $5)";

        let records = sqlx::query_as::<_, AttendanceWithContext>(&format!(
            "SELECT a.id, a.student_id, a.subject_id, a.date, a.status, a.remarks, \
                    s.roll_no, u.first_name, u.last_name, \
                    sub.code AS subject_code, sub.name AS subject_name, a.created_at \
             FROM attendance a \
             JOIN students s ON s.id = a.student_id \
             JOIN users u ON u.id = s.user_id \
             JOIN subjects sub ON sub.id = a.subject_id \
             WHERE {filter} \
             ORDER BY a.date DESC \
             LIMIT $6 OFFSET $7"
        ))
        .bind(student_filter)
        .bind(params.subject_id)
        .bind(params.status)
        .bind(params.from)
        .bind(params.to)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM attendance a WHERE {filter}"
        ))
        .bind(student_filter)
        .bind(params.subject_id)
        .bind(params.status)
        .bind(params.from)
        .bind(params.to)
        .fetch_one(db)
        .await?;

        Ok((records, total))
    }

    /// Per-status counts for a student, with overall percentage and an
    /// optional per-subject breakdown when no subject filter was given.
    #[instrument(skip(db, params))]
    pub async fn get_summary(
        db: &PgPool,
        student_id: Uuid,
        params: &AttendanceSummaryParams,
    ) -> Result<AttendanceSummary, AppError> {
        let student = StudentService::get_student_by_id(db, student_id).await?;

        let breakdown: Vec<StatusCount> = sqlx::query_as::<_, (AttendanceStatus, i64)>(
            "SELECT status, COUNT(*) \
             FROM attendance \
             WHERE student_id = $1 \
               AND ($2::UUID IS NULL OR subject_id = $2) \
               AND ($3::DATE IS NULL OR date >= $3) \
               AND ($4::DATE IS NULL OR date <= $4) \
             GROUP BY status",
        )
        .bind(student_id)
        .bind(params.subject_id)
        .bind(params.from)
        .bind(params.to)
        .fetch_all(db)
        .await?
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();

        let total: i64 = breakdown.iter().map(|s| s.count).sum();
        let present = breakdown
            .iter()
            .find(|s| s.status == AttendanceStatus::Present)
            .map(|s| s.count)
            .unwrap_or(0);
        let percentage = if total > 0 {
            round2(present as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        let subject_wise = if params.subject_id.is_none() {
            Some(Self::subject_breakdown(db, student_id).await?)
        } else {
            None
        };

        Ok(AttendanceSummary {
            student_id: student.id,
            roll_no: student.roll_no,
            total,
            present,
            percentage,
            breakdown,
            subject_wise,
        })
    }

    async fn subject_breakdown(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<SubjectAttendance>, AppError> {
        type Row = (Uuid, String, String, AttendanceStatus, i64);

        let rows: Vec<Row> = sqlx::query_as(
            "SELECT a.subject_id, sub.code, sub.name, a.status, COUNT(*) \
             FROM attendance a \
             JOIN subjects sub ON sub.id = a.subject_id \
             WHERE a.student_id = $1 \
             GROUP BY a.subject_id, sub.code, sub.name, a.status \
             ORDER BY sub.code",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        let mut subjects: Vec<SubjectAttendance> = Vec::new();
        for (subject_id, code, name, status, count) in rows {
            match subjects.iter_mut().find(|s| s.subject_id == subject_id) {
                Some(subject) => {
                    subject.total += count;
                    subject.breakdown.push(StatusCount { status, count });
                }
                None => subjects.push(SubjectAttendance {
                    subject_id,
                    subject_code: code,
                    subject_name: name,
                    total: count,
                    breakdown: vec![StatusCount { status, count }],
                }),
            }
        }

        Ok(subjects)
    }
}
