use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{
    models::{NewVisit, Visit, VisitPatch, VisitQuery, VisitStatus},
    types::VisitRow,
    utils::sql,
};
use crate::error::AppError;
use crate::services::visit_lifecycle::VisitStore;

const VISIT_COLUMNS: &str = "id, company_id, team_id, customer_id, date_planned, status, \
                             check_in_lat, check_in_lng, check_in_at, note, date_completed, \
                             created_at, updated_at";

#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, company_id: Uuid, filter: &VisitQuery) -> Result<Vec<Visit>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM visits WHERE company_id = ",
            VISIT_COLUMNS
        ));
        builder.push_bind(company_id);
        if let Some(team_id) = filter.team_id {
            builder.push(" AND team_id = ").push_bind(team_id);
        }
        if let Some(date) = filter.date {
            builder.push(" AND date_planned = ").push_bind(date);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder.push(" ORDER BY date_planned, created_at");

        let rows = builder
            .build_query_as::<VisitRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }

    /// A team's visits for one day, in creation order. Route planning treats
    /// the first of them as the depot stop.
    pub async fn list_for_team_on(
        &self,
        company_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Visit>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM visits WHERE company_id = $1 AND team_id = $2 AND date_planned = $3 \
             ORDER BY created_at",
            VISIT_COLUMNS
        );

        let rows = sqlx::query_as::<_, VisitRow>(&query)
            .bind(company_id)
            .bind(team_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }
}

#[async_trait]
impl VisitStore for VisitRepository {
    async fn insert_visit(&self, visit: NewVisit) -> Result<Visit, AppError> {
        let now = Utc::now();
        let query = format!(
            "{} RETURNING {}",
            sql(r#"
                INSERT INTO
                    visits (
                        id,
                        company_id,
                        team_id,
                        customer_id,
                        date_planned,
                        status,
                        created_at,
                        updated_at
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?)
            "#),
            VISIT_COLUMNS
        );

        let row = sqlx::query_as::<_, VisitRow>(&query)
            .bind(Uuid::new_v4())
            .bind(visit.company_id)
            .bind(visit.team_id)
            .bind(visit.customer_id)
            .bind(visit.date_planned)
            .bind(VisitStatus::Planned)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_visit(&self, id: Uuid) -> Result<Option<Visit>, AppError> {
        let query = format!("SELECT {} FROM visits WHERE id = $1", VISIT_COLUMNS);

        let row = sqlx::query_as::<_, VisitRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Visit::from))
    }

    async fn update_visit(&self, id: Uuid, patch: VisitPatch) -> Result<Option<Visit>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE visits SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(team_id) = patch.team_id {
            builder.push(", team_id = ").push_bind(team_id);
        }
        if let Some(customer_id) = patch.customer_id {
            builder.push(", customer_id = ").push_bind(customer_id);
        }
        if let Some(date_planned) = patch.date_planned {
            builder.push(", date_planned = ").push_bind(date_planned);
        }
        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(location) = patch.check_in_location {
            builder
                .push(", check_in_lat = ")
                .push_bind(location.map(|l| l.lat));
            builder
                .push(", check_in_lng = ")
                .push_bind(location.map(|l| l.lng));
            builder
                .push(", check_in_at = ")
                .push_bind(location.map(|l| l.timestamp));
        }
        if let Some(note) = patch.note {
            builder.push(", note = ").push_bind(note);
        }
        if let Some(date_completed) = patch.date_completed {
            builder.push(", date_completed = ").push_bind(date_completed);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(VISIT_COLUMNS);

        let row = builder
            .build_query_as::<VisitRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Visit::from))
    }

    async fn delete_visit(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(&sql("DELETE FROM visits WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
