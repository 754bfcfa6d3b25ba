use serde::Serialize;

use super::visit::{Visit, VisitStatus};

pub const RECENT_VISITS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_teams: i64,
    pub total_personnel: i64,
    pub today_visits: i64,
    pub completed_visits: i64,
    pub pending_visits: i64,
    pub recent_visits: Vec<Visit>,
}

impl DashboardStats {
    /// Today's figures from today's visits. Anything not completed, cancelled
    /// included, counts as pending.
    pub fn from_today(
        total_customers: i64,
        total_teams: i64,
        total_personnel: i64,
        mut visits: Vec<Visit>,
    ) -> Self {
        let today_visits = visits.len() as i64;
        let completed_visits = visits
            .iter()
            .filter(|v| v.status == VisitStatus::Completed)
            .count() as i64;
        visits.truncate(RECENT_VISITS);

        Self {
            total_customers,
            total_teams,
            total_personnel,
            today_visits,
            completed_visits,
            pending_visits: today_visits - completed_visits,
            recent_visits: visits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn visit(status: VisitStatus) -> Visit {
        let now = Utc::now();
        Visit {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            date_planned: now.date_naive(),
            status,
            check_in_location: None,
            note: None,
            date_completed: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pending_is_total_minus_completed() {
        let visits = vec![
            visit(VisitStatus::Completed),
            visit(VisitStatus::Planned),
            visit(VisitStatus::OnProgress),
            visit(VisitStatus::Cancelled),
            visit(VisitStatus::Completed),
        ];

        let stats = DashboardStats::from_today(12, 3, 7, visits);

        assert_eq!(stats.today_visits, 5);
        assert_eq!(stats.completed_visits, 2);
        assert_eq!(stats.pending_visits, 3);
        assert_eq!(stats.total_customers, 12);
        assert_eq!(stats.total_teams, 3);
        assert_eq!(stats.total_personnel, 7);
    }

    #[test]
    fn only_the_first_visits_are_listed_as_recent() {
        let visits: Vec<Visit> = (0..8).map(|_| visit(VisitStatus::Planned)).collect();
        let first: Vec<Uuid> = visits.iter().take(RECENT_VISITS).map(|v| v.id).collect();

        let stats = DashboardStats::from_today(0, 0, 0, visits);

        assert_eq!(stats.today_visits, 8);
        assert_eq!(stats.pending_visits, 8);
        assert_eq!(
            stats.recent_visits.iter().map(|v| v.id).collect::<Vec<_>>(),
            first
        );
    }

    #[test]
    fn an_empty_day_has_nothing_pending() {
        let stats = DashboardStats::from_today(1, 1, 0, vec![]);

        assert_eq!(stats.today_visits, 0);
        assert_eq!(stats.pending_visits, 0);
        assert!(stats.recent_visits.is_empty());
    }
}
