use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::teachers::model::{
    AssignedSubject, CreateTeacherDto, Teacher, TeacherDetail, TeacherFilterParams,
    TeacherWithUser, UpdateTeacherDto,
};
use crate::modules::users::model::UserRole;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const JOINED_COLUMNS: &str = "t.id, t.user_id, t.employee_id, t.department, t.qualification, \
     t.specialization, u.first_name, u.last_name, u.email, u.phone, u.is_active, \
     t.created_at, t.updated_at";

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto))]
    pub async fn create_teacher(
        db: &PgPool,
        dto: CreateTeacherDto,
    ) -> Result<TeacherDetail, AppError> {
        if UserService::find_auth_by_email(db, &dto.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM teachers WHERE employee_id = $1")
                .bind(&dto.employee_id)
                .fetch_optional(db)
                .await?;
        if existing.is_some() {
            return Err(AppError::conflict("Employee ID already exists"));
        }

        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let (user_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO users (first_name, last_name, email, password, role, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(UserRole::Teacher)
        .bind(&dto.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;

        let (teacher_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO teachers \
                 (user_id, employee_id, department, qualification, specialization) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(&dto.employee_id)
        .bind(&dto.department)
        .bind(&dto.qualification)
        .bind(&dto.specialization)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;

        for subject_id in &dto.subject_ids {
            sqlx::query(
                "INSERT INTO teacher_subjects (teacher_id, subject_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(teacher_id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::get_teacher_by_id(db, teacher_id).await
    }

    #[instrument(skip(db, params))]
    pub async fn get_teachers(
        db: &PgPool,
        params: &TeacherFilterParams,
    ) -> Result<(Vec<TeacherWithUser>, i64), AppError> {
        let filter = "($1::TEXT IS NULL OR t.department = $1) \
             AND ($2::TEXT IS NULL OR u.first_name ILIKE '%' || $2 || '%' \
                  OR u.last_name ILIKE '%' || $2 || '%' \
                  OR u.email ILIKE '%' || $2 || '%' \
                  OR t.employee_id ILIKE '%' || $2 || '%')";

        let teachers = sqlx::query_as::<_, TeacherWithUser>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM teachers t \
             JOIN users u ON u.id = t.user_id \
             WHERE {filter} \
             ORDER BY t.created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(params.department.as_deref())
        .bind(params.search.as_deref())
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM teachers t JOIN users u ON u.id = t.user_id WHERE {filter}"
        ))
        .bind(params.department.as_deref())
        .bind(params.search.as_deref())
        .fetch_one(db)
        .await?;

        Ok((teachers, total))
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, id: Uuid) -> Result<TeacherDetail, AppError> {
        let teacher = sqlx::query_as::<_, TeacherWithUser>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM teachers t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher"))?;

        let subjects = Self::assigned_subjects(db, id).await?;

        Ok(TeacherDetail { teacher, subjects })
    }

    pub async fn find_by_user_id(db: &PgPool, user_id: Uuid) -> Result<Option<Teacher>, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT id, user_id, employee_id, department, qualification, specialization, \
                    created_at, updated_at \
             FROM teachers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(teacher)
    }

    pub async fn assigned_subjects(
        db: &PgPool,
        teacher_id: Uuid,
    ) -> Result<Vec<AssignedSubject>, AppError> {
        let subjects = sqlx::query_as::<_, AssignedSubject>(
            "SELECT s.id, s.code, s.name \
             FROM teacher_subjects ts \
             JOIN subjects s ON s.id = ts.subject_id \
             WHERE ts.teacher_id = $1 \
             ORDER BY s.code",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(subjects)
    }

    /// Whether the user (a teacher) is assigned to the subject. Used to
    /// gate mark entry for teacher callers.
    pub async fn is_assigned_to_subject(
        db: &PgPool,
        user_id: Uuid,
        subject_id: Uuid,
    ) -> Result<bool, AppError> {
        let assigned: Option<(Uuid,)> = sqlx::query_as(
            "SELECT ts.teacher_id \
             FROM teacher_subjects ts \
             JOIN teachers t ON t.id = ts.teacher_id \
             WHERE t.user_id = $1 AND ts.subject_id = $2",
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_optional(db)
        .await?;

        Ok(assigned.is_some())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<TeacherDetail, AppError> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE teachers \
             SET department = COALESCE($1, department), \
                 qualification = COALESCE($2, qualification), \
                 specialization = COALESCE($3, specialization), \
                 updated_at = NOW() \
             WHERE id = $4 \
             RETURNING id",
        )
        .bind(dto.department)
        .bind(dto.qualification)
        .bind(dto.specialization)
        .bind(id)
        .fetch_optional(db)
        .await?;

        if updated.is_none() {
            return Err(AppError::not_found("Teacher"));
        }

        Self::get_teacher_by_id(db, id).await
    }

    /// Replaces the teacher's subject assignments wholesale.
    #[instrument(skip(db))]
    pub async fn assign_subjects(
        db: &PgPool,
        id: Uuid,
        subject_ids: &[Uuid],
    ) -> Result<TeacherDetail, AppError> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found("Teacher"));
        }

        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM teacher_subjects WHERE teacher_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for subject_id in subject_ids {
            sqlx::query(
                "INSERT INTO teacher_subjects (teacher_id, subject_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::get_teacher_by_id(db, id).await
    }

    /// Teachers are never hard-deleted: removal deactivates the linked
    /// user, which also revokes all their sessions.
    #[instrument(skip(db))]
    pub async fn deactivate_teacher(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let detail = Self::get_teacher_by_id(db, id).await?;
        UserService::deactivate(db, detail.teacher.user_id).await?;
        Ok(())
    }
}

fn map_unique(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::conflict("Email already registered"),
                Some("teachers_employee_id_key") => {
                    AppError::conflict("Employee ID already exists")
                }
                _ => AppError::conflict("Duplicate record"),
            };
        }
    }
    AppError::database(err)
}
