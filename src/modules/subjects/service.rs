use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::subjects::model::{
    CreateSubjectDto, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use crate::utils::errors::{AppError, conflict_on_unique};

const COLUMNS: &str = "id, code, name, max_marks, pass_marks, credits, category, description, \
     is_active, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    #[instrument(skip(db, dto))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let max_marks = dto.max_marks.unwrap_or(100.0);
        let pass_marks = dto.pass_marks.unwrap_or(40.0);

        if pass_marks > max_marks {
            return Err(AppError::validation(
                "pass_marks cannot exceed max_marks",
            ));
        }

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "INSERT INTO subjects (code, name, max_marks, pass_marks, credits, category, description) \
             VALUES (UPPER($1), $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        ))
        .bind(&dto.code)
        .bind(&dto.name)
        .bind(max_marks)
        .bind(pass_marks)
        .bind(dto.credits.unwrap_or(3))
        .bind(dto.category.as_deref().unwrap_or("theory"))
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "Subject code already exists"))?;

        Ok(subject)
    }

    #[instrument(skip(db, params))]
    pub async fn get_subjects(
        db: &PgPool,
        params: &SubjectFilterParams,
    ) -> Result<(Vec<Subject>, i64), AppError> {
        let filter = "($1::TEXT IS NULL OR category = $1) \
             AND ($2::TEXT IS NULL OR code ILIKE '%' || $2 || '%' OR name ILIKE '%' || $2 || '%') \
             AND ($3::BOOLEAN IS NULL OR is_active = $3)";

        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {COLUMNS} FROM subjects WHERE {filter} ORDER BY code LIMIT $4 OFFSET $5"
        ))
        .bind(params.category.as_deref())
        .bind(params.search.as_deref())
        .bind(params.is_active)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM subjects WHERE {filter}"))
                .bind(params.category.as_deref())
                .bind(params.search.as_deref())
                .bind(params.is_active)
                .fetch_one(db)
                .await?;

        Ok((subjects, total))
    }

    #[instrument(skip(db))]
    pub async fn get_subject_by_id(db: &PgPool, id: Uuid) -> Result<Subject, AppError> {
        sqlx::query_as::<_, Subject>(&format!("SELECT {COLUMNS} FROM subjects WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Subject"))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_subject(
        db: &PgPool,
        id: Uuid,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let existing = Self::get_subject_by_id(db, id).await?;

        let max_marks = dto.max_marks.unwrap_or(existing.max_marks);
        let pass_marks = dto.pass_marks.unwrap_or(existing.pass_marks);

        if pass_marks > max_marks {
            return Err(AppError::validation(
                "pass_marks cannot exceed max_marks",
            ));
        }

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects \
             SET name = COALESCE($1, name), \
                 max_marks = $2, \
                 pass_marks = $3, \
                 credits = COALESCE($4, credits), \
                 category = COALESCE($5, category), \
                 description = COALESCE($6, description), \
                 is_active = COALESCE($7, is_active), \
                 updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {COLUMNS}"
        ))
        .bind(dto.name)
        .bind(max_marks)
        .bind(pass_marks)
        .bind(dto.credits)
        .bind(dto.category)
        .bind(dto.description)
        .bind(dto.is_active)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(subject)
    }

    #[instrument(skip(db))]
    pub async fn delete_subject(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::conflict(
                            "Subject has recorded results or attendance and cannot be deleted",
                        );
                    }
                }
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Subject"));
        }

        Ok(())
    }
}
