use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::{
    models::{Coordinate, Customer, CustomerInput},
    types::CustomerRow,
    utils::sql,
};
use crate::error::AppError;
use crate::services::customer_directory::CustomerStore;

const CUSTOMER_COLUMNS: &str = "id, company_id, team_id, name, address, service_frequency, \
                                price, latitude, longitude, created_at, updated_at";

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_customer(
        &self,
        company_id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Customer, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "{} RETURNING {}",
            sql(r#"
                INSERT INTO
                    customers (
                        id,
                        company_id,
                        team_id,
                        name,
                        address,
                        service_frequency,
                        price,
                        latitude,
                        longitude,
                        created_at,
                        updated_at
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#),
            CUSTOMER_COLUMNS
        );

        let row = sqlx::query_as::<_, CustomerRow>(&query)
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(input.team_id)
            .bind(input.name)
            .bind(input.address)
            .bind(input.service_frequency)
            .bind(input.price)
            .bind(geocoordinate.map(|c| c.lat))
            .bind(geocoordinate.map(|c| c.lng))
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM customers WHERE id = $1 AND company_id = $2",
            CUSTOMER_COLUMNS
        );

        let row = sqlx::query_as::<_, CustomerRow>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Customer::from))
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM customers WHERE company_id = ",
            CUSTOMER_COLUMNS
        ));
        builder.push_bind(company_id);
        if let Some(team_id) = team_id {
            builder.push(" AND team_id = ").push_bind(team_id);
        }
        builder.push(" ORDER BY name");

        let rows = builder
            .build_query_as::<CustomerRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    pub async fn update_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "{} RETURNING {}",
            sql(r#"
                UPDATE
                    customers
                SET
                    team_id = ?,
                    name = ?,
                    address = ?,
                    service_frequency = ?,
                    price = ?,
                    latitude = ?,
                    longitude = ?,
                    updated_at = ?
                WHERE
                    id = ?
                    AND company_id = ?
            "#),
            CUSTOMER_COLUMNS
        );

        let row = sqlx::query_as::<_, CustomerRow>(&query)
            .bind(input.team_id)
            .bind(input.name)
            .bind(input.address)
            .bind(input.service_frequency)
            .bind(input.price)
            .bind(geocoordinate.map(|c| c.lat))
            .bind(geocoordinate.map(|c| c.lng))
            .bind(Utc::now())
            .bind(id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Customer::from))
    }

    pub async fn count_visits(&self, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&sql("SELECT COUNT(*) FROM visits WHERE customer_id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn delete_customer(&self, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&sql("DELETE FROM customers WHERE id = ? AND company_id = ?"))
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes the customer together with every visit referencing it.
    pub async fn delete_with_visits(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let visits = sqlx::query(&sql(
            "DELETE FROM visits WHERE customer_id = ? AND company_id = ?",
        ))
        .bind(id)
        .bind(company_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query(&sql("DELETE FROM customers WHERE id = ? AND company_id = ?"))
            .bind(id)
            .bind(company_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            log::warn!("Cascade delete found no customer {}, rolling back", id);
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(visits))
    }

    pub async fn count_for_company(&self, company_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&sql("SELECT COUNT(*) FROM customers WHERE company_id = ?"))
            .bind(company_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn insert_customer(
        &self,
        company_id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Customer, AppError> {
        Ok(self.create_customer(company_id, input, geocoordinate).await?)
    }

    async fn find_customer(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.find_by_id(company_id, id).await?)
    }

    async fn list_customers(
        &self,
        company_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        Ok(self.list(company_id, team_id).await?)
    }

    async fn replace_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Option<Customer>, AppError> {
        Ok(self
            .update_customer(company_id, id, input, geocoordinate)
            .await?)
    }

    async fn visit_count(&self, customer_id: Uuid) -> Result<i64, AppError> {
        Ok(self.count_visits(customer_id).await?)
    }

    async fn remove_customer(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        Ok(self.delete_customer(company_id, id).await?)
    }

    async fn remove_with_visits(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<u64>, AppError> {
        Ok(self.delete_with_visits(company_id, id).await?)
    }
}
