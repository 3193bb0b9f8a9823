use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::modules::audit::model::AuditEntry;
use crate::modules::audit::service::AuditService;
use crate::modules::notifications::service::NotificationService;
use crate::modules::results::grading;
use crate::modules::results::model::{
    EntryError, ExamResult, ExamType, MarkEntry, ResultFilterParams, ResultWithContext,
    UpdateResultDto,
};
use crate::modules::settings::service::SettingService;
use crate::modules::students::service::StudentService;
use crate::modules::subjects::model::Subject;
use crate::modules::subjects::service::SubjectService;
use crate::modules::teachers::service::TeacherService;
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;

const COLUMNS: &str = "id, student_id, subject_id, marks_obtained, semester, exam_type, grade, \
     grade_point, percentage, is_passed, remarks, created_by, is_approved, approved_by, \
     approved_at, created_at, updated_at";

const JOINED_COLUMNS: &str = "r.id, r.student_id, r.subject_id, r.marks_obtained, r.semester, \
     r.exam_type, r.grade, r.grade_point, r.percentage, r.is_passed, r.remarks, r.created_by, \
     r.is_approved, r.approved_by, r.approved_at, s.roll_no, u.first_name, u.last_name, \
     sub.code AS subject_code, sub.name AS subject_name, sub.max_marks, sub.pass_marks, \
     r.created_at, r.updated_at";

pub struct ResultService;

impl ResultService {
    /// Bulk mark entry for one (subject, semester, exam type) slice.
    ///
    /// Entries are isolated from each other: an unknown student or a
    /// duplicate-insert race records an item error and the loop moves on.
    /// An existing row for the composite key is updated in place with
    /// recomputed derived fields.
    #[instrument(skip(db, entries))]
    pub async fn enter_marks(
        db: &PgPool,
        subject_id: Uuid,
        semester: i32,
        exam_type: ExamType,
        entries: Vec<MarkEntry>,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<(Vec<ExamResult>, Vec<EntryError>), AppError> {
        let subject = SubjectService::get_subject_by_id(db, subject_id).await?;

        if actor_role == UserRole::Teacher
            && !TeacherService::is_assigned_to_subject(db, actor_id, subject_id).await?
        {
            return Err(AppError::forbidden("Not assigned to this subject"));
        }

        let bands = SettingService::grade_bands(db).await?;

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for entry in entries {
            match Self::enter_one(
                db, &subject, semester, exam_type, &entry, actor_id, &bands,
            )
            .await
            {
                Ok(result) => results.push(result),
                Err(err) => errors.push(EntryError {
                    student_id: entry.student_id,
                    error: match err {
                        AppError::Validation(msg)
                        | AppError::NotFound(msg)
                        | AppError::Conflict(msg) => msg,
                        _ => "Failed to record marks".to_string(),
                    },
                }),
            }
        }

        Ok((results, errors))
    }

    async fn enter_one(
        db: &PgPool,
        subject: &Subject,
        semester: i32,
        exam_type: ExamType,
        entry: &MarkEntry,
        actor_id: Uuid,
        bands: &[grading::GradeBand],
    ) -> Result<ExamResult, AppError> {
        let student: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM students WHERE id = $1")
            .bind(entry.student_id)
            .fetch_optional(db)
            .await?;
        if student.is_none() {
            return Err(AppError::not_found("Student"));
        }

        let existing = sqlx::query_as::<_, ExamResult>(&format!(
            "SELECT {COLUMNS} FROM results \
             WHERE student_id = $1 AND subject_id = $2 AND semester = $3 AND exam_type = $4"
        ))
        .bind(entry.student_id)
        .bind(subject.id)
        .bind(semester)
        .bind(exam_type)
        .fetch_optional(db)
        .await?;

        let outcome = grading::compute(
            entry.marks_obtained,
            subject.max_marks,
            subject.pass_marks,
            bands,
        );

        match existing {
            Some(before) => {
                if before.is_approved {
                    return Err(AppError::conflict("Result already approved"));
                }

                let updated = sqlx::query_as::<_, ExamResult>(&format!(
                    "UPDATE results \
                     SET marks_obtained = $1, percentage = $2, grade = $3, grade_point = $4, \
                         is_passed = $5, remarks = COALESCE($6, remarks), created_by = $7, \
                         updated_at = NOW() \
                     WHERE id = $8 \
                     RETURNING {COLUMNS}"
                ))
                .bind(entry.marks_obtained)
                .bind(outcome.percentage)
                .bind(&outcome.grade)
                .bind(outcome.grade_point)
                .bind(outcome.is_passed)
                .bind(&entry.remarks)
                .bind(actor_id)
                .bind(before.id)
                .fetch_one(db)
                .await?;

                AuditService::record(
                    db,
                    AuditEntry::new(actor_id, "UPDATE_MARKS", "Result")
                        .resource(updated.id)
                        .before(&before)
                        .after(&updated),
                );

                Ok(updated)
            }
            None => {
                let created = sqlx::query_as::<_, ExamResult>(&format!(
                    "INSERT INTO results \
                         (student_id, subject_id, marks_obtained, semester, exam_type, grade, \
                          grade_point, percentage, is_passed, remarks, created_by) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                     RETURNING {COLUMNS}"
                ))
                .bind(entry.student_id)
                .bind(subject.id)
                .bind(entry.marks_obtained)
                .bind(semester)
                .bind(exam_type)
                .bind(&outcome.grade)
                .bind(outcome.grade_point)
                .bind(outcome.percentage)
                .bind(outcome.is_passed)
                .bind(&entry.remarks)
                .bind(actor_id)
                .fetch_one(db)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(db_err) = &e {
                        if db_err.is_unique_violation() {
                            return AppError::conflict(
                                "Result already exists for this student, subject, semester and exam type",
                            );
                        }
                    }
                    AppError::database(e)
                })?;

                AuditService::record(
                    db,
                    AuditEntry::new(actor_id, "CREATE_MARKS", "Result")
                        .resource(created.id)
                        .after(&created),
                );

                Ok(created)
            }
        }
    }

    #[instrument(skip(db, params))]
    pub async fn get_results(
        db: &PgPool,
        params: &ResultFilterParams,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<(Vec<ResultWithContext>, i64), AppError> {
        // Students only ever see their own results.
        let student_filter = if actor_role == UserRole::Student {
            match StudentService::find_by_user_id(db, actor_id).await? {
                Some(student) => Some(student.id),
                None => return Ok((Vec::new(), 0)),
            }
        } else {
            params.student_id
        };

        let filter = "($1::UUID IS NULL OR r.student_id = $1) \
             AND ($2::UUID IS NULL OR r.subject_id = $2) \
             AND ($3::INT IS NULL OR r.semester = $3) \
             AND ($4::exam_type IS NULL OR r.exam_type = $4)";

        let results = sqlx::query_as::<_, ResultWithContext>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM results r \
             JOIN students s ON s.id = r.student_id \
             JOIN users u ON u.id = s.user_id \
             JOIN subjects sub ON sub.id = r.subject_id \
             WHERE {filter} \
             ORDER BY r.created_at DESC \
             LIMIT $5 OFFSET $6"
        ))
        .bind(student_filter)
        .bind(params.subject_id)
        .bind(params.semester)
        .bind(params.exam_type)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM results r WHERE {filter}"
        ))
        .bind(student_filter)
        .bind(params.subject_id)
        .bind(params.semester)
        .bind(params.exam_type)
        .fetch_one(db)
        .await?;

        Ok((results, total))
    }

    #[instrument(skip(db))]
    pub async fn get_result_by_id(
        db: &PgPool,
        id: Uuid,
        actor_id: Uuid,
        actor_role: UserRole,
    ) -> Result<ResultWithContext, AppError> {
        let result = sqlx::query_as::<_, ResultWithContext>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM results r \
             JOIN students s ON s.id = r.student_id \
             JOIN users u ON u.id = s.user_id \
             JOIN subjects sub ON sub.id = r.subject_id \
             WHERE r.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

        if actor_role == UserRole::Student {
            let owned = StudentService::find_by_user_id(db, actor_id)
                .await?
                .map(|student| student.id == result.student_id)
                .unwrap_or(false);
            if !owned {
                return Err(AppError::forbidden("Access denied"));
            }
        }

        Ok(result)
    }

    /// Updates marks and/or remarks. Derived fields are recomputed in the
    /// same statement as the marks write. Approved results are immutable.
    #[instrument(skip(db, dto))]
    pub async fn update_result(
        db: &PgPool,
        id: Uuid,
        dto: UpdateResultDto,
        actor_id: Uuid,
    ) -> Result<ExamResult, AppError> {
        let before = Self::fetch(db, id).await?;

        if before.is_approved {
            return Err(AppError::conflict("Result already approved"));
        }

        let updated = match dto.marks_obtained {
            Some(marks) => {
                let subject = SubjectService::get_subject_by_id(db, before.subject_id).await?;
                let bands = SettingService::grade_bands(db).await?;
                let outcome =
                    grading::compute(marks, subject.max_marks, subject.pass_marks, &bands);

                sqlx::query_as::<_, ExamResult>(&format!(
                    "UPDATE results \
                     SET marks_obtained = $1, percentage = $2, grade = $3, grade_point = $4, \
                         is_passed = $5, remarks = COALESCE($6, remarks), updated_at = NOW() \
                     WHERE id = $7 \
                     RETURNING {COLUMNS}"
                ))
                .bind(marks)
                .bind(outcome.percentage)
                .bind(&outcome.grade)
                .bind(outcome.grade_point)
                .bind(outcome.is_passed)
                .bind(&dto.remarks)
                .bind(id)
                .fetch_one(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExamResult>(&format!(
                    "UPDATE results \
                     SET remarks = COALESCE($1, remarks), updated_at = NOW() \
                     WHERE id = $2 \
                     RETURNING {COLUMNS}"
                ))
                .bind(&dto.remarks)
                .bind(id)
                .fetch_one(db)
                .await?
            }
        };

        AuditService::record(
            db,
            AuditEntry::new(actor_id, "UPDATE_RESULT", "Result")
                .resource(id)
                .before(&before)
                .after(&updated),
        );

        Ok(updated)
    }

    /// Approves a result, stamping actor and timestamp, and notifies the
    /// student. Approving an already-approved result is a no-op.
    #[instrument(skip(db))]
    pub async fn approve_result(
        db: &PgPool,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<ExamResult, AppError> {
        let before = Self::fetch(db, id).await?;

        if before.is_approved {
            return Ok(before);
        }

        let approved = sqlx::query_as::<_, ExamResult>(&format!(
            "UPDATE results \
             SET is_approved = TRUE, approved_by = $1, approved_at = NOW(), updated_at = NOW() \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(actor_id)
        .bind(id)
        .fetch_one(db)
        .await?;

        AuditService::record(
            db,
            AuditEntry::new(actor_id, "APPROVE_RESULT", "Result").resource(id),
        );

        // Notification failure never blocks the approval.
        if let Err(err) = Self::notify_student(db, &approved).await {
            warn!(result_id = %id, error = ?err, "failed to notify student of approval");
        }

        Ok(approved)
    }

    async fn notify_student(db: &PgPool, result: &ExamResult) -> Result<(), AppError> {
        let row: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT s.user_id, sub.name \
             FROM students s, subjects sub \
             WHERE s.id = $1 AND sub.id = $2",
        )
        .bind(result.student_id)
        .bind(result.subject_id)
        .fetch_optional(db)
        .await?;

        if let Some((user_id, subject_name)) = row {
            NotificationService::notify(
                db,
                user_id,
                "Result approved",
                &format!(
                    "Your {} result for semester {} has been approved.",
                    subject_name, result.semester
                ),
                "medium",
                Some("Result"),
                Some(result.id),
            )
            .await?;
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_result(db: &PgPool, id: Uuid, actor_id: Uuid) -> Result<(), AppError> {
        let before = Self::fetch(db, id).await?;

        if before.is_approved {
            return Err(AppError::conflict("Result already approved"));
        }

        sqlx::query("DELETE FROM results WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        AuditService::record(
            db,
            AuditEntry::new(actor_id, "DELETE_RESULT", "Result")
                .resource(id)
                .before(&before),
        );

        Ok(())
    }

    async fn fetch(db: &PgPool, id: Uuid) -> Result<ExamResult, AppError> {
        sqlx::query_as::<_, ExamResult>(&format!("SELECT {COLUMNS} FROM results WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Result"))
    }
}
