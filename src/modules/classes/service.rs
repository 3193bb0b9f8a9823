use chrono::Datelike;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::classes::model::{
    Class, ClassFilterParams, CreateClassDto, UpdateClassDto,
};
use crate::modules::students::model::StudentWithUser;
use crate::utils::errors::{AppError, conflict_on_unique};

const COLUMNS: &str = "c.id, c.name, c.code, c.year, c.semester, c.class_teacher_id, \
     c.max_strength, c.is_active, \
     (SELECT COUNT(*) FROM students st WHERE st.class_id = c.id) AS current_strength, \
     c.created_at, c.updated_at";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, dto))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<Class, AppError> {
        let year = dto.year.unwrap_or_else(|| chrono::Utc::now().year());

        let class = sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes AS c (name, code, year, semester, class_teacher_id, max_strength) \
             VALUES ($1, UPPER($2), $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(year)
        .bind(dto.semester)
        .bind(dto.class_teacher_id)
        .bind(dto.max_strength.unwrap_or(60))
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "Class code already exists"))?;

        Ok(class)
    }

    #[instrument(skip(db, params))]
    pub async fn get_classes(
        db: &PgPool,
        params: &ClassFilterParams,
    ) -> Result<(Vec<Class>, i64), AppError> {
        let filter = "($1::INT IS NULL OR c.year = $1) \
             AND ($2::INT IS NULL OR c.semester = $2) \
             AND ($3::BOOLEAN IS NULL OR c.is_active = $3)";

        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {COLUMNS} FROM classes c WHERE {filter} \
             ORDER BY c.year DESC, c.code LIMIT $4 OFFSET $5"
        ))
        .bind(params.year)
        .bind(params.semester)
        .bind(params.is_active)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM classes c WHERE {filter}"))
                .bind(params.year)
                .bind(params.semester)
                .bind(params.is_active)
                .fetch_one(db)
                .await?;

        Ok((classes, total))
    }

    #[instrument(skip(db))]
    pub async fn get_class_by_id(db: &PgPool, id: Uuid) -> Result<Class, AppError> {
        sqlx::query_as::<_, Class>(&format!("SELECT {COLUMNS} FROM classes c WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Class"))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_class(
        db: &PgPool,
        id: Uuid,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes AS c \
             SET name = COALESCE($1, name), \
                 year = COALESCE($2, year), \
                 semester = COALESCE($3, semester), \
                 class_teacher_id = COALESCE($4, class_teacher_id), \
                 max_strength = COALESCE($5, max_strength), \
                 is_active = COALESCE($6, is_active), \
                 updated_at = NOW() \
             WHERE c.id = $7 \
             RETURNING {COLUMNS}"
        ))
        .bind(dto.name)
        .bind(dto.year)
        .bind(dto.semester)
        .bind(dto.class_teacher_id)
        .bind(dto.max_strength)
        .bind(dto.is_active)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Class"))
    }

    /// Lists the class roster.
    #[instrument(skip(db))]
    pub async fn get_roster(db: &PgPool, id: Uuid) -> Result<Vec<StudentWithUser>, AppError> {
        Self::get_class_by_id(db, id).await?;

        let students = sqlx::query_as::<_, StudentWithUser>(
            "SELECT s.id, s.user_id, s.roll_no, s.department, s.batch, s.semester, s.class_id, \
                    s.guardian_name, s.guardian_phone, u.first_name, u.last_name, u.email, \
                    u.phone, u.is_active, s.created_at, s.updated_at \
             FROM students s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.class_id = $1 \
             ORDER BY s.roll_no",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    /// Adds a student to the class roster. A student belongs to at most one
    /// class, so this overwrites any previous membership.
    #[instrument(skip(db))]
    pub async fn assign_student(
        db: &PgPool,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        Self::get_class_by_id(db, class_id).await?;

        let updated = sqlx::query("UPDATE students SET class_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(class_id)
            .bind(student_id)
            .execute(db)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Student"));
        }

        Ok(())
    }

    /// Removes a student from the class roster.
    #[instrument(skip(db))]
    pub async fn remove_student(
        db: &PgPool,
        class_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE students SET class_id = NULL, updated_at = NOW() \
             WHERE id = $1 AND class_id = $2",
        )
        .bind(student_id)
        .bind(class_id)
        .execute(db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Student"));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE students SET class_id = NULL WHERE class_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Class"));
        }

        tx.commit().await?;

        Ok(())
    }
}
