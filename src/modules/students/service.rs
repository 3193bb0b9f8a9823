use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, StudentWithUser, UpdateStudentDto,
};
use crate::modules::users::model::UserRole;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const JOINED_COLUMNS: &str = "s.id, s.user_id, s.roll_no, s.department, s.batch, s.semester, \
     s.class_id, s.guardian_name, s.guardian_phone, u.first_name, u.last_name, u.email, \
     u.phone, u.is_active, s.created_at, s.updated_at";

pub struct StudentService;

impl StudentService {
    /// Creates the identity record and the profile together. Both inserts
    /// run in one transaction so a roll-number collision cannot leave an
    /// orphaned user behind.
    #[instrument(skip(db, dto))]
    pub async fn create_student(
        db: &PgPool,
        dto: CreateStudentDto,
    ) -> Result<StudentWithUser, AppError> {
        if UserService::find_auth_by_email(db, &dto.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let existing_roll: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM students WHERE roll_no = $1")
                .bind(&dto.roll_no)
                .fetch_optional(db)
                .await?;
        if existing_roll.is_some() {
            return Err(AppError::conflict("Roll number already exists"));
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
        .bind(UserRole::Student)
        .bind(&dto.phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique(e))?;

        let (student_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO students \
                 (user_id, roll_no, department, batch, semester, class_id, \
                  guardian_name, guardian_phone) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(&dto.roll_no)
        .bind(&dto.department)
        .bind(&dto.batch)
        .bind(dto.semester)
        .bind(dto.class_id)
        .bind(&dto.guardian_name)
        .bind(&dto.guardian_phone)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique(e))?;

        tx.commit().await?;

        Self::get_student_by_id(db, student_id).await
    }

    #[instrument(skip(db, params))]
    pub async fn get_students(
        db: &PgPool,
        params: &StudentFilterParams,
    ) -> Result<(Vec<StudentWithUser>, i64), AppError> {
        let filter = "($1::TEXT IS NULL OR s.department = $1) \
             AND ($2::TEXT IS NULL OR s.batch = $2) \
             AND ($3::INT IS NULL OR s.semester = $3) \
             AND ($4::UUID IS NULL OR s.class_id = $4) \
             AND ($5::TEXT IS NULL OR u.first_name ILIKE '%' || $5 || '%' \
                  OR u.last_name ILIKE '%' || $5 || '%' \
                  OR u.email ILIKE '%' || $5 || '%' \
                  OR s.roll_no ILIKE '%' || $5 || '%')";

        let students = sqlx::query_as::<_, StudentWithUser>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM students s \
             JOIN users u ON u.id = s.user_id \
             WHERE {filter} \
             ORDER BY s.created_at DESC \
             LIMIT $6 OFFSET $7"
        ))
        .bind(params.department.as_deref())
        .bind(params.batch.as_deref())
        .bind(params.semester)
        .bind(params.class_id)
        .bind(params.search.as_deref())
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM students s JOIN users u ON u.id = s.user_id WHERE {filter}"
        ))
        .bind(params.department.as_deref())
        .bind(params.batch.as_deref())
        .bind(params.semester)
        .bind(params.class_id)
        .bind(params.search.as_deref())
        .fetch_one(db)
        .await?;

        Ok((students, total))
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, id: Uuid) -> Result<StudentWithUser, AppError> {
        sqlx::query_as::<_, StudentWithUser>(&format!(
            "SELECT {JOINED_COLUMNS} \
             FROM students s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))
    }

    /// Resolves the student profile owned by a user, if any. Used to scope
    /// result and attendance reads for student callers.
    pub async fn find_by_user_id(db: &PgPool, user_id: Uuid) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, user_id, roll_no, department, batch, semester, class_id, \
                    guardian_name, guardian_phone, created_at, updated_at \
             FROM students WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(student)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<StudentWithUser, AppError> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE students \
             SET roll_no = COALESCE($1, roll_no), \
                 department = COALESCE($2, department), \
                 batch = COALESCE($3, batch), \
                 semester = COALESCE($4, semester), \
                 class_id = COALESCE($5, class_id), \
                 guardian_name = COALESCE($6, guardian_name), \
                 guardian_phone = COALESCE($7, guardian_phone), \
                 updated_at = NOW() \
             WHERE id = $8 \
             RETURNING id",
        )
        .bind(dto.roll_no)
        .bind(dto.department)
        .bind(dto.batch)
        .bind(dto.semester)
        .bind(dto.class_id)
        .bind(dto.guardian_name)
        .bind(dto.guardian_phone)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| map_unique(e))?;

        if updated.is_none() {
            return Err(AppError::not_found("Student"));
        }

        Self::get_student_by_id(db, id).await
    }

    /// Students are never hard-deleted: removal deactivates the linked
    /// user, which also revokes all their sessions.
    #[instrument(skip(db))]
    pub async fn deactivate_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let student = Self::get_student_by_id(db, id).await?;
        UserService::deactivate(db, student.user_id).await?;
        Ok(())
    }
}

fn map_unique(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::conflict("Email already registered"),
                Some("students_roll_no_key") => AppError::conflict("Roll number already exists"),
                _ => AppError::conflict("Duplicate record"),
            };
        }
    }
    AppError::database(err)
}
