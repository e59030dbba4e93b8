use crate::analytics::percent;
use crate::domain::models::{Ticket, TicketStatus};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub week: i32,
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    pub total_story_points: i64,
    pub done_story_points: i64,
    pub total_estimated_days: f64,
    pub done_estimated_days: f64,
}

impl WeekBucket {
    fn new(week: i32) -> Self {
        Self {
            week,
            total: 0,
            todo: 0,
            in_progress: 0,
            done: 0,
            total_story_points: 0,
            done_story_points: 0,
            total_estimated_days: 0.0,
            done_estimated_days: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintOverview {
    pub total_tickets: i64,
    pub done_tickets: i64,
    pub total_story_points: i64,
    pub done_story_points: i64,
    pub completion_rate: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekVelocity {
    pub week: i32,
    pub completed_story_points: i64,
    pub completed_tickets: i64,
    pub completion_rate: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWorkDistribution {
    pub week: i32,
    pub planned: i64,
    pub completed: i64,
    pub remaining: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintHealth {
    pub completion_rate: i32,
    pub velocity_by_week: Vec<WeekVelocity>,
    pub work_distribution: Vec<WeekWorkDistribution>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintAnalytics {
    pub overview: SprintOverview,
    pub weekly_breakdown: Vec<WeekBucket>,
    pub sprint_health: SprintHealth,
}

/// Fold one sprint's tickets into per-week buckets plus overall health
/// indicators. The work-distribution view surfaces work sliding into later
/// weeks (planned vs completed vs remaining per week).
pub fn sprint_analytics(tickets: &[Ticket]) -> SprintAnalytics {
    let mut weeks: BTreeMap<i32, WeekBucket> = BTreeMap::new();

    for ticket in tickets {
        let bucket = weeks
            .entry(ticket.sprint_week)
            .or_insert_with(|| WeekBucket::new(ticket.sprint_week));

        bucket.total += 1;
        match ticket.status {
            TicketStatus::Todo => bucket.todo += 1,
            TicketStatus::InProgress => bucket.in_progress += 1,
            TicketStatus::Done => bucket.done += 1,
        }
        bucket.total_story_points += ticket.story_points as i64;
        bucket.total_estimated_days += ticket.estimated_days;

        if ticket.status.is_done() {
            bucket.done_story_points += ticket.story_points as i64;
            bucket.done_estimated_days += ticket.estimated_days;
        }
    }

    let weekly_breakdown: Vec<WeekBucket> = weeks.into_values().collect();

    let total_tickets = tickets.len() as i64;
    let done_tickets = tickets.iter().filter(|t| t.status.is_done()).count() as i64;
    let total_story_points: i64 = tickets.iter().map(|t| t.story_points as i64).sum();
    let done_story_points: i64 = tickets
        .iter()
        .filter(|t| t.status.is_done())
        .map(|t| t.story_points as i64)
        .sum();

    let completion_rate = percent(done_tickets, total_tickets);

    let velocity_by_week = weekly_breakdown
        .iter()
        .map(|week| WeekVelocity {
            week: week.week,
            completed_story_points: week.done_story_points,
            completed_tickets: week.done,
            completion_rate: percent(week.done, week.total),
        })
        .collect();

    let work_distribution = weekly_breakdown
        .iter()
        .map(|week| WeekWorkDistribution {
            week: week.week,
            planned: week.total,
            completed: week.done,
            remaining: week.total - week.done,
        })
        .collect();

    SprintAnalytics {
        overview: SprintOverview {
            total_tickets,
            done_tickets,
            total_story_points,
            done_story_points,
            completion_rate,
        },
        weekly_breakdown,
        sprint_health: SprintHealth {
            completion_rate,
            velocity_by_week,
            work_distribution,
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSummary {
    pub total_tickets: i64,
    pub total_story_points: i64,
    pub total_estimated_days: f64,
    pub todo_count: i64,
    pub in_progress_count: i64,
    pub done_count: i64,
    pub completion_percentage: i32,
}

pub fn sprint_summary(tickets: &[Ticket]) -> SprintSummary {
    let done_count = tickets.iter().filter(|t| t.status.is_done()).count() as i64;
    SprintSummary {
        total_tickets: tickets.len() as i64,
        total_story_points: tickets.iter().map(|t| t.story_points as i64).sum(),
        total_estimated_days: tickets.iter().map(|t| t.estimated_days).sum(),
        todo_count: tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Todo)
            .count() as i64,
        in_progress_count: tickets
            .iter()
            .filter(|t| t.status == TicketStatus::InProgress)
            .count() as i64,
        done_count,
        completion_percentage: percent(done_count, tickets.len() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn ticket(week: i32, points: i32, days: f64, status: TicketStatus) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            card_id: format!("CARD-{week}"),
            title: "Ticket".to_string(),
            story_points: points,
            estimated_days: days,
            status,
            sprint_week: week,
            sprint_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            completed_at: status.is_done().then(Utc::now),
        }
    }

    #[test]
    fn summary_for_empty_sprint_is_all_zero() {
        let summary = sprint_summary(&[]);
        assert_eq!(summary.total_tickets, 0);
        assert_eq!(summary.completion_percentage, 0);
    }

    #[test]
    fn summary_counts_points_and_percentage() {
        // Week 1: 2 + 3 + 5 points, one 3-point ticket done.
        let tickets = vec![
            ticket(1, 2, 1.0, TicketStatus::Todo),
            ticket(1, 3, 1.0, TicketStatus::Done),
            ticket(1, 5, 2.0, TicketStatus::Todo),
        ];
        let summary = sprint_summary(&tickets);
        assert_eq!(summary.total_tickets, 3);
        assert_eq!(summary.total_story_points, 10);
        assert_eq!(summary.todo_count, 2);
        assert_eq!(summary.done_count, 1);
        assert_eq!(summary.completion_percentage, 33);
    }

    #[test]
    fn weekly_breakdown_sums_match_overview() {
        let tickets = vec![
            ticket(1, 2, 0.5, TicketStatus::Done),
            ticket(1, 3, 1.0, TicketStatus::InProgress),
            ticket(2, 5, 2.0, TicketStatus::Todo),
            ticket(3, 8, 3.0, TicketStatus::Done),
        ];
        let report = sprint_analytics(&tickets);

        let week_total: i64 = report.weekly_breakdown.iter().map(|w| w.total).sum();
        let week_points: i64 = report
            .weekly_breakdown
            .iter()
            .map(|w| w.total_story_points)
            .sum();
        let week_done: i64 = report.weekly_breakdown.iter().map(|w| w.done).sum();

        assert_eq!(week_total, report.overview.total_tickets);
        assert_eq!(week_points, report.overview.total_story_points);
        assert_eq!(week_done, report.overview.done_tickets);
    }

    #[test]
    fn weeks_are_sorted_and_bucketed() {
        let tickets = vec![
            ticket(3, 1, 1.0, TicketStatus::Todo),
            ticket(1, 2, 1.0, TicketStatus::Done),
            ticket(2, 3, 1.0, TicketStatus::InProgress),
            ticket(1, 4, 1.0, TicketStatus::Todo),
        ];
        let report = sprint_analytics(&tickets);
        let weeks: Vec<i32> = report.weekly_breakdown.iter().map(|w| w.week).collect();
        assert_eq!(weeks, vec![1, 2, 3]);

        let week1 = &report.weekly_breakdown[0];
        assert_eq!(week1.total, 2);
        assert_eq!(week1.done, 1);
        assert_eq!(week1.total_story_points, 6);
        assert_eq!(week1.done_story_points, 2);
    }

    #[test]
    fn work_distribution_tracks_remaining() {
        let tickets = vec![
            ticket(1, 2, 1.0, TicketStatus::Done),
            ticket(1, 3, 1.0, TicketStatus::Todo),
            ticket(1, 5, 1.0, TicketStatus::Todo),
        ];
        let report = sprint_analytics(&tickets);
        let dist = &report.sprint_health.work_distribution[0];
        assert_eq!(dist.planned, 3);
        assert_eq!(dist.completed, 1);
        assert_eq!(dist.remaining, 2);
    }

    #[test]
    fn per_week_completion_rate() {
        let tickets = vec![
            ticket(1, 1, 1.0, TicketStatus::Done),
            ticket(1, 1, 1.0, TicketStatus::Done),
            ticket(1, 1, 1.0, TicketStatus::Todo),
            ticket(2, 1, 1.0, TicketStatus::Todo),
        ];
        let report = sprint_analytics(&tickets);
        assert_eq!(report.sprint_health.velocity_by_week[0].completion_rate, 67);
        assert_eq!(report.sprint_health.velocity_by_week[1].completion_rate, 0);
        assert_eq!(report.overview.completion_rate, 50);
    }
}
