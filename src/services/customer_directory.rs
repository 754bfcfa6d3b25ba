use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Coordinate, Customer, CustomerInput};
use crate::error::AppError;
use crate::services::geocoding::{Geocoder, geocode_changed_address, geocode_new_address};
use crate::services::{TeamDirectory, UserContext};

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert_customer(
        &self,
        company_id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Customer, AppError>;
    async fn find_customer(&self, company_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError>;
    async fn list_customers(
        &self,
        company_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError>;
    async fn replace_customer(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: CustomerInput,
        geocoordinate: Option<Coordinate>,
    ) -> Result<Option<Customer>, AppError>;
    async fn visit_count(&self, customer_id: Uuid) -> Result<i64, AppError>;
    async fn remove_customer(&self, company_id: Uuid, id: Uuid) -> Result<bool, AppError>;
    /// Removes the customer and its visits in one transaction. `None` when
    /// the customer was not there, in which case nothing is removed.
    async fn remove_with_visits(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<u64>, AppError>;
}

fn validate(input: CustomerInput) -> Result<CustomerInput, AppError> {
    let name = input.name.trim().to_string();
    let address = input.address.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("Customer name is required"));
    }
    if address.is_empty() {
        return Err(AppError::validation("Customer address is required"));
    }
    if input.price < BigDecimal::from(0) {
        return Err(AppError::validation("Price cannot be negative"));
    }
    Ok(CustomerInput {
        name,
        address,
        ..input
    })
}

/// Customer administration. Addresses are geocoded on write; a failed lookup
/// stores no coordinate and never fails the write.
#[derive(Clone)]
pub struct CustomerDirectory {
    store: Arc<dyn CustomerStore>,
    teams: TeamDirectory,
    geocoder: Arc<dyn Geocoder>,
}

impl CustomerDirectory {
    pub fn new(
        store: Arc<dyn CustomerStore>,
        teams: TeamDirectory,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            store,
            teams,
            geocoder,
        }
    }

    async fn find(&self, ctx: &UserContext, customer_id: Uuid) -> Result<Customer, AppError> {
        self.store
            .find_customer(ctx.company_id, customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))
    }

    pub async fn create(
        &self,
        ctx: &UserContext,
        input: CustomerInput,
    ) -> Result<Customer, AppError> {
        ctx.requires_admin()?;
        let input = validate(input)?;
        self.teams.find(ctx, input.team_id).await?;

        let geocoordinate = geocode_new_address(self.geocoder.as_ref(), &input.address).await;

        self.store
            .insert_customer(ctx.company_id, input, geocoordinate)
            .await
            .map_err(|e| {
                log::error!("Failed to create customer: {}", e);
                e
            })
    }

    /// Staff see their own team's customers regardless of the filter.
    pub async fn list(
        &self,
        ctx: &UserContext,
        team_id: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        let team_id = if ctx.is_admin() {
            team_id
        } else {
            Some(ctx.requires_team()?)
        };

        self.store.list_customers(ctx.company_id, team_id).await
    }

    pub async fn get(&self, ctx: &UserContext, customer_id: Uuid) -> Result<Customer, AppError> {
        ctx.requires_admin()?;
        self.find(ctx, customer_id).await
    }

    /// Keeps the stored coordinate unless the address changed.
    pub async fn update(
        &self,
        ctx: &UserContext,
        customer_id: Uuid,
        input: CustomerInput,
    ) -> Result<Customer, AppError> {
        ctx.requires_admin()?;
        let input = validate(input)?;
        let existing = self.find(ctx, customer_id).await?;
        if input.team_id != existing.team_id {
            self.teams.find(ctx, input.team_id).await?;
        }

        let geocoordinate = geocode_changed_address(
            self.geocoder.as_ref(),
            &existing.address,
            existing.geocoordinate,
            &input.address,
        )
        .await;

        self.store
            .replace_customer(ctx.company_id, existing.id, input, geocoordinate)
            .await
            .map_err(|e| {
                log::error!("Failed to update customer {}: {}", existing.id, e);
                e
            })?
            .ok_or_else(|| AppError::not_found("Customer"))
    }

    /// Refused while visits reference the customer, unless `cascade` is set.
    /// Returns the number of visits removed with it.
    pub async fn delete(
        &self,
        ctx: &UserContext,
        customer_id: Uuid,
        cascade: bool,
    ) -> Result<u64, AppError> {
        ctx.requires_admin()?;
        let customer = self.find(ctx, customer_id).await?;

        if cascade {
            let removed = self
                .store
                .remove_with_visits(ctx.company_id, customer.id)
                .await
                .map_err(|e| {
                    log::error!("Cascade delete of customer {} failed: {}", customer.id, e);
                    e
                })?
                .ok_or_else(|| AppError::not_found("Customer"))?;
            log::info!("Deleted customer {} with {} visits", customer.id, removed);
            return Ok(removed);
        }

        let visits = self.store.visit_count(customer.id).await?;
        if visits > 0 {
            return Err(AppError::Conflict(format!(
                "Customer '{}' has {} visits; delete with cascade=true to remove them",
                customer.name, visits
            )));
        }

        if !self.store.remove_customer(ctx.company_id, customer.id).await? {
            return Err(AppError::not_found("Customer"));
        }
        Ok(0)
    }

    /// A visit's team and customer must belong to the caller's company, and
    /// the customer must be served by that team.
    pub async fn ensure_visit_references(
        &self,
        ctx: &UserContext,
        team_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError> {
        self.teams.find(ctx, team_id).await?;
        let customer = self.find(ctx, customer_id).await?;

        if customer.team_id != team_id {
            log::warn!(
                "Customer {} belongs to team {}, not {}",
                customer.id,
                customer.team_id,
                team_id
            );
            return Err(AppError::validation("Customer is not served by the visit's team"));
        }
        Ok(())
    }
}
