use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{
    CheckInInput, CheckInLocation, Coordinate, CreateVisitInput, NewVisit, PositionReport,
    PositionUnavailable, RescheduleVisitInput, Visit, VisitOverrideInput, VisitPatch, VisitStatus,
};
use crate::error::AppError;
use crate::services::user_context::UserContext;

/// Storage seam for visits. Reads and writes are separate calls, so a guard
/// checked between them can be outdated by the time the write lands.
#[async_trait]
pub trait VisitStore: Send + Sync {
    async fn insert_visit(&self, visit: NewVisit) -> Result<Visit, AppError>;

    async fn find_visit(&self, id: Uuid) -> Result<Option<Visit>, AppError>;

    /// Returns `None` when no visit has this id.
    async fn update_visit(&self, id: Uuid, patch: VisitPatch) -> Result<Option<Visit>, AppError>;

    async fn delete_visit(&self, id: Uuid) -> Result<bool, AppError>;
}

/// The visit state machine. Every operation is a single read followed by at
/// most one write.
#[derive(Clone)]
pub struct VisitLifecycle {
    store: Arc<dyn VisitStore>,
}

impl VisitLifecycle {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        ctx: &UserContext,
        input: CreateVisitInput,
    ) -> Result<Visit, AppError> {
        ctx.requires_admin()?;
        ensure_not_past(input.date_planned)?;

        let visit = self
            .store
            .insert_visit(NewVisit {
                company_id: ctx.company_id,
                team_id: input.team_id,
                customer_id: input.customer_id,
                date_planned: input.date_planned,
            })
            .await?;

        log::info!("Visit {} planned for {}", visit.id, visit.date_planned);
        Ok(visit)
    }

    pub async fn get(&self, ctx: &UserContext, id: Uuid) -> Result<Visit, AppError> {
        self.load(ctx, id).await
    }

    pub async fn check_in(
        &self,
        ctx: &UserContext,
        id: Uuid,
        input: CheckInInput,
    ) -> Result<Visit, AppError> {
        let coordinate = resolve_position(input.position)?;
        let visit = self.load(ctx, id).await?;

        if visit.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "cannot check in to a {} visit",
                visit.status
            )));
        }

        let location = CheckInLocation {
            lat: coordinate.lat,
            lng: coordinate.lng,
            timestamp: input.timestamp.unwrap_or_else(Utc::now),
        };

        self.write(
            id,
            VisitPatch {
                status: Some(VisitStatus::OnProgress),
                check_in_location: Some(Some(location)),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_note(
        &self,
        ctx: &UserContext,
        id: Uuid,
        note: String,
    ) -> Result<Visit, AppError> {
        let visit = self.load(ctx, id).await?;

        if visit.status == VisitStatus::Completed {
            return Err(AppError::InvalidTransition(
                "notes are closed on completed visits".to_string(),
            ));
        }

        self.write(
            id,
            VisitPatch {
                note: Some(Some(note)),
                ..Default::default()
            },
        )
        .await
    }

    /// Not idempotent: two racing calls both pass the guard and the later
    /// write sets `date_completed`.
    pub async fn complete(&self, ctx: &UserContext, id: Uuid) -> Result<Visit, AppError> {
        let visit = self.load(ctx, id).await?;

        if visit.status == VisitStatus::Completed {
            return Err(AppError::InvalidTransition(
                "visit is already completed".to_string(),
            ));
        }

        self.write(
            id,
            VisitPatch {
                status: Some(VisitStatus::Completed),
                date_completed: Some(Some(Utc::now())),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn cancel(&self, ctx: &UserContext, id: Uuid) -> Result<Visit, AppError> {
        ctx.requires_admin()?;
        let visit = self.load(ctx, id).await?;

        if visit.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "cannot cancel a {} visit",
                visit.status
            )));
        }

        self.write(
            id,
            VisitPatch {
                status: Some(VisitStatus::Cancelled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn reschedule(
        &self,
        ctx: &UserContext,
        id: Uuid,
        input: RescheduleVisitInput,
    ) -> Result<Visit, AppError> {
        ctx.requires_admin()?;

        let patch = VisitPatch {
            team_id: input.team_id,
            customer_id: input.customer_id,
            date_planned: input.date_planned,
            ..Default::default()
        };
        if patch.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        if let Some(date) = input.date_planned {
            ensure_not_past(date)?;
        }

        self.load(ctx, id).await?;
        self.write(id, patch).await
    }

    /// Unchecked admin patch. Bypasses every lifecycle guard.
    pub async fn override_visit(
        &self,
        ctx: &UserContext,
        id: Uuid,
        input: VisitOverrideInput,
    ) -> Result<Visit, AppError> {
        ctx.requires_admin()?;

        let patch = VisitPatch::from(input);
        if patch.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }

        let visit = self.load(ctx, id).await?;
        log::warn!(
            "Administrative override of visit {} by {} (status {} -> {})",
            id,
            ctx.email,
            visit.status,
            patch.status.unwrap_or(visit.status)
        );

        self.write(id, patch).await
    }

    pub async fn delete(&self, ctx: &UserContext, id: Uuid) -> Result<(), AppError> {
        ctx.requires_admin()?;
        self.load(ctx, id).await?;

        if !self.store.delete_visit(id).await? {
            return Err(AppError::not_found("Visit"));
        }
        log::info!("Visit {} deleted by {}", id, ctx.email);
        Ok(())
    }

    async fn load(&self, ctx: &UserContext, id: Uuid) -> Result<Visit, AppError> {
        let visit = self
            .store
            .find_visit(id)
            .await?
            .filter(|v| v.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("Visit"))?;

        if !ctx.can_act_on_team(visit.team_id) {
            return Err(AppError::PermissionDenied(
                "Visit belongs to another team".to_string(),
            ));
        }
        Ok(visit)
    }

    async fn write(&self, id: Uuid, patch: VisitPatch) -> Result<Visit, AppError> {
        self.store
            .update_visit(id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Visit"))
    }
}

fn ensure_not_past(date: NaiveDate) -> Result<(), AppError> {
    let today = Utc::now().date_naive();
    if date < today {
        return Err(AppError::validation(format!(
            "Planned date {} is in the past",
            date
        )));
    }
    Ok(())
}

/// Turns the device's position outcome into a coordinate, or fails closed.
pub fn resolve_position(report: PositionReport) -> Result<Coordinate, AppError> {
    match report {
        PositionReport::Fix { lat, lng } => {
            let coordinate = Coordinate { lat, lng };
            if !coordinate.is_valid() {
                return Err(AppError::validation(format!(
                    "Coordinate out of range: {}, {}",
                    lat, lng
                )));
            }
            Ok(coordinate)
        }
        PositionReport::Unavailable { reason } => Err(match reason {
            PositionUnavailable::Denied => {
                AppError::PermissionDenied("Location permission was denied".to_string())
            }
            PositionUnavailable::Unsupported => {
                AppError::validation("Device does not support geolocation")
            }
            PositionUnavailable::Timeout => AppError::validation("Location request timed out"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fix_inside_range_resolves() {
        let coordinate = resolve_position(PositionReport::Fix {
            lat: -6.2,
            lng: 106.8,
        })
        .unwrap();
        assert_eq!(coordinate, Coordinate { lat: -6.2, lng: 106.8 });
    }

    #[test]
    fn unavailable_positions_fail_closed() {
        assert!(matches!(
            resolve_position(PositionReport::Unavailable {
                reason: PositionUnavailable::Denied
            }),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            resolve_position(PositionReport::Unavailable {
                reason: PositionUnavailable::Timeout
            }),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_position(PositionReport::Fix { lat: 91.0, lng: 0.0 }),
            Err(AppError::Validation(_))
        ));
    }
}
