use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::models::{CheckInLocation, Coordinate, Customer, Visit, VisitStatus};

// Row types for tables whose nested values are flattened into columns
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub address: String,
    pub service_frequency: String,
    pub price: BigDecimal,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VisitRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub customer_id: Uuid,
    pub date_planned: NaiveDate,
    pub status: VisitStatus,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_in_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub date_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        let geocoordinate = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        };

        Self {
            id: row.id,
            company_id: row.company_id,
            team_id: row.team_id,
            name: row.name,
            address: row.address,
            service_frequency: row.service_frequency,
            price: row.price,
            geocoordinate,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        let check_in_location = match (row.check_in_lat, row.check_in_lng, row.check_in_at) {
            (Some(lat), Some(lng), Some(timestamp)) => Some(CheckInLocation {
                lat,
                lng,
                timestamp,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            company_id: row.company_id,
            team_id: row.team_id,
            customer_id: row.customer_id,
            date_planned: row.date_planned,
            status: row.status,
            check_in_location,
            note: row.note,
            date_completed: row.date_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
