//! Postgres-backed placement store.
//!
//! ## Atomicity
//!
//! Every counter-affecting write runs in one transaction that first locks the
//! posting row (`SELECT ... FOR UPDATE`). Inserts, deletes and recounts for the
//! same posting therefore serialize on that row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | Any other | `Backend` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use placement_applications::{Application, ApplicationStatus, SubmissionFields};
use placement_core::{ApplicationId, Entity, PostingId, UserId};
use placement_postings::{Posting, PostingDetails, PostingStatus};

use super::{CounterDrift, CounterUpdate, PlacementStore, PostingFilter, RemovedApplication, StoreError};

const MIGRATION: &str = include_str!("../../migrations/0001_placements.sql");
const MIGRATION_LOCK_KEY: i64 = 0x706c_6163_656d_6e74;

/// Unique constraint on `(posting_id, applicant_id)`, named in the migration.
const APPLICATION_PAIR_CONSTRAINT: &str = "applications_posting_applicant_key";

const POSTING_COLUMNS: &str = "id, owner_id, title, company_name, description, skills, location, \
     work_mode, duration, salary, category, start_date, application_deadline, interview_details, \
     other_details, featured, status, applicant_count, created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, posting_id, applicant_id, status, full_name, email, \
     phone_number, location, university, degree_program, year_of_study, availability, gpa, other, \
     document_ref, submitted_at, updated_at";

/// Postgres-backed placement store.
#[derive(Debug, Clone)]
pub struct PostgresPlacementStore {
    pool: Arc<PgPool>,
}

impl PostgresPlacementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Apply the schema. Idempotent; concurrent callers serialize on an
    /// advisory lock.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MIGRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("migrate_lock", e))?;
        sqlx::raw_sql(MIGRATION)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        commit(tx).await
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

/// Lock a posting row for the rest of the transaction and return its counter.
async fn lock_posting_counter(
    tx: &mut Transaction<'_, Postgres>,
    posting_id: PostingId,
) -> Result<Option<i64>, StoreError> {
    let row = sqlx::query("SELECT applicant_count FROM postings WHERE id = $1 FOR UPDATE")
        .bind(posting_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_posting", e))?;

    row.map(|r| {
        r.try_get::<i64, _>("applicant_count")
            .map_err(|e| StoreError::Backend(format!("failed to read applicant_count: {e}")))
    })
    .transpose()
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), StoreError> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))
}

#[async_trait]
impl PlacementStore for PostgresPlacementStore {
    #[instrument(skip(self), fields(posting_id = %id), err)]
    async fn get_posting(&self, id: PostingId) -> Result<Option<Posting>, StoreError> {
        let sql = format!("SELECT {POSTING_COLUMNS} FROM postings WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_posting", e))?;

        row.map(|r| posting_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_postings(&self, filter: &PostingFilter) -> Result<Vec<Posting>, StoreError> {
        let sql = format!(
            r#"
            SELECT {POSTING_COLUMNS}
            FROM postings
            WHERE ($1::uuid IS NULL OR owner_id = $1)
                AND ($2::text IS NULL OR status = $2)
                AND ($3::text IS NULL OR lower(category) = lower($3))
                AND ($4::text IS NULL OR work_mode = $4)
            ORDER BY created_at DESC, id DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(filter.owner_id.map(|id| *id.as_uuid()))
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.category.as_deref())
            .bind(filter.work_mode.map(|m| m.as_str()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_postings", e))?;

        rows.iter().map(posting_from_row).collect()
    }

    #[instrument(skip(self, posting), fields(posting_id = %posting.id()), err)]
    async fn insert_posting(&self, posting: &Posting) -> Result<(), StoreError> {
        let d = posting.details();
        sqlx::query(
            r#"
            INSERT INTO postings (
                id, owner_id, title, company_name, description, skills, location,
                work_mode, duration, salary, category, start_date, application_deadline,
                interview_details, other_details, featured, status, applicant_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(posting.id().as_uuid())
        .bind(posting.owner_id().as_uuid())
        .bind(&d.title)
        .bind(&d.company_name)
        .bind(&d.description)
        .bind(&d.skills)
        .bind(&d.location)
        .bind(d.work_mode.as_str())
        .bind(&d.duration)
        .bind(&d.salary)
        .bind(&d.category)
        .bind(&d.start_date)
        .bind(&d.application_deadline)
        .bind(&d.interview_details)
        .bind(&d.other_details)
        .bind(d.featured)
        .bind(posting.status().as_str())
        .bind(posting.applicant_count() as i64)
        .bind(posting.created_at())
        .bind(posting.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_posting", e))?;

        Ok(())
    }

    #[instrument(skip(self, posting), fields(posting_id = %posting.id()), err)]
    async fn update_posting(&self, posting: &Posting) -> Result<(), StoreError> {
        let d = posting.details();
        let result = sqlx::query(
            r#"
            UPDATE postings SET
                title = $2, company_name = $3, description = $4, skills = $5, location = $6,
                work_mode = $7, duration = $8, salary = $9, category = $10, start_date = $11,
                application_deadline = $12, interview_details = $13, other_details = $14,
                featured = $15, status = $16, updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(posting.id().as_uuid())
        .bind(&d.title)
        .bind(&d.company_name)
        .bind(&d.description)
        .bind(&d.skills)
        .bind(&d.location)
        .bind(d.work_mode.as_str())
        .bind(&d.duration)
        .bind(&d.salary)
        .bind(&d.category)
        .bind(&d.start_date)
        .bind(&d.application_deadline)
        .bind(&d.interview_details)
        .bind(&d.other_details)
        .bind(d.featured)
        .bind(posting.status().as_str())
        .bind(posting.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_posting", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(posting_id = %id), err)]
    async fn delete_posting(&self, id: PostingId) -> Result<u64, StoreError> {
        let mut tx = self.begin().await?;

        if lock_posting_counter(&mut tx, id).await?.is_none() {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        let removed = sqlx::query("DELETE FROM applications WHERE posting_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_posting_applications", e))?
            .rows_affected();

        sqlx::query("DELETE FROM postings WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_posting", e))?;

        commit(tx).await?;
        Ok(removed)
    }

    #[instrument(skip(self), fields(application_id = %id), err)]
    async fn get_application(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_application", e))?;

        row.map(|r| application_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_application(
        &self,
        posting_id: PostingId,
        applicant_id: UserId,
    ) -> Result<Option<Application>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE posting_id = $1 AND applicant_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(posting_id.as_uuid())
            .bind(applicant_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_application", e))?;

        row.map(|r| application_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_applications_by_applicant(&self, applicant_id: UserId) -> Result<Vec<Application>, StoreError> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE applicant_id = $1 \
             ORDER BY submitted_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(applicant_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_applications_by_applicant", e))?;

        rows.iter().map(application_from_row).collect()
    }

    #[instrument(skip(self, posting_ids), fields(posting_count = posting_ids.len()), err)]
    async fn list_applications_for_postings(&self, posting_ids: &[PostingId]) -> Result<Vec<Application>, StoreError> {
        if posting_ids.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = posting_ids.iter().map(|id| *id.as_uuid()).collect();
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE posting_id = ANY($1) \
             ORDER BY submitted_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_applications_for_postings", e))?;

        rows.iter().map(application_from_row).collect()
    }

    #[instrument(
        skip(self, application),
        fields(
            application_id = %application.id(),
            posting_id = %application.posting_id()
        ),
        err
    )]
    async fn insert_application(&self, application: &Application) -> Result<u64, StoreError> {
        let mut tx = self.begin().await?;

        if lock_posting_counter(&mut tx, application.posting_id()).await?.is_none() {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        let s = application.submission();
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, posting_id, applicant_id, status, full_name, email, phone_number,
                location, university, degree_program, year_of_study, availability, gpa,
                other, document_ref, submitted_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(application.id().as_uuid())
        .bind(application.posting_id().as_uuid())
        .bind(application.applicant_id().as_uuid())
        .bind(application.status().as_str())
        .bind(&s.full_name)
        .bind(&s.email)
        .bind(&s.phone_number)
        .bind(&s.location)
        .bind(&s.university)
        .bind(&s.degree_program)
        .bind(&s.year_of_study)
        .bind(&s.availability)
        .bind(&s.gpa)
        .bind(&s.other)
        .bind(&s.document_ref)
        .bind(application.submitted_at())
        .bind(application.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_application", e))?;

        let row = sqlx::query(
            "UPDATE postings SET applicant_count = applicant_count + 1 WHERE id = $1 RETURNING applicant_count",
        )
        .bind(application.posting_id().as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("increment_applicant_count", e))?;
        let count: i64 = row
            .try_get("applicant_count")
            .map_err(|e| StoreError::Backend(format!("failed to read applicant_count: {e}")))?;

        commit(tx).await?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self, now), fields(application_id = %id), err)]
    async fn update_application_status(
        &self,
        id: ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Application, StoreError> {
        let sql = format!(
            "UPDATE applications SET status = $3, updated_at = $4 \
             WHERE id = $1 AND status = $2 RETURNING {APPLICATION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(now)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_application_status", e))?;

        if let Some(row) = row {
            return application_from_row(&row);
        }

        // Lost the compare-and-set: either gone or moved on.
        let current = sqlx::query("SELECT status FROM applications WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_application_status", e))?;

        match current {
            None => Err(StoreError::NotFound),
            Some(row) => {
                let status: String = row
                    .try_get("status")
                    .map_err(|e| StoreError::Backend(format!("failed to read status: {e}")))?;
                Err(StoreError::StaleStatus {
                    current: parse_application_status(&status)?,
                })
            }
        }
    }

    #[instrument(skip(self), fields(application_id = %id), err)]
    async fn delete_application(&self, id: ApplicationId) -> Result<RemovedApplication, StoreError> {
        let mut tx = self.begin().await?;

        // Posting row first, then the application, like every other
        // counter-affecting transaction.
        let posting = sqlx::query("SELECT posting_id FROM applications WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("read_application_posting", e))?;
        let Some(posting) = posting else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        };
        let posting_id: Uuid = posting
            .try_get("posting_id")
            .map_err(|e| StoreError::Backend(format!("failed to read posting_id: {e}")))?;
        let posting_id = PostingId::from_uuid(posting_id);

        let recorded = lock_posting_counter(&mut tx, posting_id).await?;

        let sql = format!("DELETE FROM applications WHERE id = $1 RETURNING {APPLICATION_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_application", e))?;

        // Removed by a concurrent delete while we waited on the posting lock.
        let Some(row) = row else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        };
        let application = application_from_row(&row)?;

        let counter = match recorded {
            None => CounterUpdate::PostingMissing,
            Some(n) if n <= 0 => CounterUpdate::Floored,
            Some(_) => {
                let row = sqlx::query(
                    "UPDATE postings SET applicant_count = applicant_count - 1 WHERE id = $1 RETURNING applicant_count",
                )
                .bind(posting_id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("decrement_applicant_count", e))?;
                let n: i64 = row
                    .try_get("applicant_count")
                    .map_err(|e| StoreError::Backend(format!("failed to read applicant_count: {e}")))?;
                CounterUpdate::Decremented(n.max(0) as u64)
            }
        };

        commit(tx).await?;
        Ok(RemovedApplication { application, counter })
    }

    #[instrument(skip(self), fields(posting_id = %posting_id), err)]
    async fn count_applications(&self, posting_id: PostingId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM applications WHERE posting_id = $1")
            .bind(posting_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_applications", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self), fields(posting_id = %posting_id), err)]
    async fn recount_applicants(&self, posting_id: PostingId) -> Result<Option<CounterDrift>, StoreError> {
        let mut tx = self.begin().await?;

        let Some(recorded) = lock_posting_counter(&mut tx, posting_id).await? else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        };

        let row = sqlx::query("SELECT COUNT(*) AS total FROM applications WHERE posting_id = $1")
            .bind(posting_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("recount_applicants", e))?;
        let actual: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Backend(format!("failed to read count: {e}")))?;

        if recorded == actual {
            commit(tx).await?;
            return Ok(None);
        }

        sqlx::query("UPDATE postings SET applicant_count = $2 WHERE id = $1")
            .bind(posting_id.as_uuid())
            .bind(actual)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("reset_applicant_count", e))?;

        commit(tx).await?;
        Ok(Some(CounterDrift {
            posting_id,
            recorded: recorded.max(0) as u64,
            actual: actual.max(0) as u64,
        }))
    }
}

fn parse_application_status(s: &str) -> Result<ApplicationStatus, StoreError> {
    s.parse()
        .map_err(|e| StoreError::Backend(format!("unexpected application status {s:?}: {e}")))
}

fn posting_from_row(row: &PgRow) -> Result<Posting, StoreError> {
    let row = PostingRow::from_row(row)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize posting row: {e}")))?;
    row.try_into()
}

fn application_from_row(row: &PgRow) -> Result<Application, StoreError> {
    let row = ApplicationRow::from_row(row)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize application row: {e}")))?;
    row.try_into()
}

/// Client-facing message for a unique violation on `constraint`.
fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(APPLICATION_PAIR_CONSTRAINT) => "applicant already applied to this posting",
        Some("postings_pkey") => "posting id already exists",
        Some("applications_pkey") => "application id already exists",
        _ => "duplicate record",
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(conflict_message(db_err.constraint()).to_string()),
                Some("23503") => StoreError::NotFound,
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct PostingRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    company_name: String,
    description: String,
    skills: Vec<String>,
    location: String,
    work_mode: String,
    duration: String,
    salary: String,
    category: String,
    start_date: Option<String>,
    application_deadline: Option<String>,
    interview_details: Option<String>,
    other_details: Option<String>,
    featured: bool,
    status: String,
    applicant_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for PostingRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PostingRow {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            company_name: row.try_get("company_name")?,
            description: row.try_get("description")?,
            skills: row.try_get("skills")?,
            location: row.try_get("location")?,
            work_mode: row.try_get("work_mode")?,
            duration: row.try_get("duration")?,
            salary: row.try_get("salary")?,
            category: row.try_get("category")?,
            start_date: row.try_get("start_date")?,
            application_deadline: row.try_get("application_deadline")?,
            interview_details: row.try_get("interview_details")?,
            other_details: row.try_get("other_details")?,
            featured: row.try_get("featured")?,
            status: row.try_get("status")?,
            applicant_count: row.try_get("applicant_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<PostingRow> for Posting {
    type Error = StoreError;

    fn try_from(row: PostingRow) -> Result<Self, Self::Error> {
        let work_mode = row
            .work_mode
            .parse()
            .map_err(|e| StoreError::Backend(format!("unexpected work mode {:?}: {e}", row.work_mode)))?;
        let status: PostingStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Backend(format!("unexpected posting status {:?}: {e}", row.status)))?;

        let details = PostingDetails {
            title: row.title,
            company_name: row.company_name,
            description: row.description,
            skills: row.skills,
            location: row.location,
            work_mode,
            duration: row.duration,
            salary: row.salary,
            category: row.category,
            start_date: row.start_date,
            application_deadline: row.application_deadline,
            interview_details: row.interview_details,
            other_details: row.other_details,
            featured: row.featured,
        };

        Ok(Posting::rehydrate(
            PostingId::from_uuid(row.id),
            UserId::from_uuid(row.owner_id),
            details,
            status,
            row.applicant_count.max(0) as u64,
            row.created_at,
            row.updated_at,
        ))
    }
}

#[derive(Debug)]
struct ApplicationRow {
    id: Uuid,
    posting_id: Uuid,
    applicant_id: Uuid,
    status: String,
    submission: SubmissionFields,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ApplicationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ApplicationRow {
            id: row.try_get("id")?,
            posting_id: row.try_get("posting_id")?,
            applicant_id: row.try_get("applicant_id")?,
            status: row.try_get("status")?,
            submission: SubmissionFields {
                full_name: row.try_get("full_name")?,
                email: row.try_get("email")?,
                phone_number: row.try_get("phone_number")?,
                location: row.try_get("location")?,
                university: row.try_get("university")?,
                degree_program: row.try_get("degree_program")?,
                year_of_study: row.try_get("year_of_study")?,
                availability: row.try_get("availability")?,
                gpa: row.try_get("gpa")?,
                other: row.try_get("other")?,
                document_ref: row.try_get("document_ref")?,
            },
            submitted_at: row.try_get("submitted_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application::rehydrate(
            ApplicationId::from_uuid(row.id),
            PostingId::from_uuid(row.posting_id),
            UserId::from_uuid(row.applicant_id),
            parse_application_status(&row.status)?,
            row.submission,
            row.submitted_at,
            row.updated_at,
        ))
    }
}
