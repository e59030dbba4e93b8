use crate::analytics::{lead_time_hours, percent};
use crate::domain::models::{Sprint, SprintStatus, Ticket, TicketStatus};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintVelocity {
    pub sprint_name: String,
    pub sprint_status: SprintStatus,
    /// Unix milliseconds.
    pub start_date: i64,
    /// Unix milliseconds.
    pub end_date: i64,
    pub total_weeks: i32,
    pub planned_story_points: i64,
    pub completed_story_points: i64,
    pub planned_tickets: i64,
    pub completed_tickets: i64,
    pub completion_rate: i32,
    /// Story points completed.
    pub velocity: i64,
}

/// Planned vs completed per sprint, ascending by start date.
pub fn velocity_trends(sprints: &[Sprint], tickets: &[Ticket]) -> Vec<SprintVelocity> {
    let mut by_sprint: HashMap<Uuid, Vec<&Ticket>> = HashMap::new();
    for ticket in tickets {
        by_sprint.entry(ticket.sprint_id).or_default().push(ticket);
    }

    let mut velocities: Vec<SprintVelocity> = sprints
        .iter()
        .map(|sprint| {
            let sprint_tickets = by_sprint.get(&sprint.id).map(Vec::as_slice).unwrap_or(&[]);
            let planned_tickets = sprint_tickets.len() as i64;
            let completed_tickets =
                sprint_tickets.iter().filter(|t| t.status.is_done()).count() as i64;
            let planned_story_points: i64 =
                sprint_tickets.iter().map(|t| t.story_points as i64).sum();
            let completed_story_points: i64 = sprint_tickets
                .iter()
                .filter(|t| t.status.is_done())
                .map(|t| t.story_points as i64)
                .sum();

            SprintVelocity {
                sprint_name: sprint.name.clone(),
                sprint_status: sprint.status,
                start_date: sprint.start_at.timestamp_millis(),
                end_date: sprint.end_at.timestamp_millis(),
                total_weeks: sprint.total_weeks(),
                planned_story_points,
                completed_story_points,
                planned_tickets,
                completed_tickets,
                completion_rate: percent(completed_tickets, planned_tickets),
                velocity: completed_story_points,
            }
        })
        .collect();

    velocities.sort_by_key(|v| v.start_date);
    velocities
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPattern {
    pub week: i32,
    pub total_cards: i64,
    pub completed_cards: i64,
    pub total_story_points: i64,
    pub completed_story_points: i64,
    pub completion_rate: i32,
}

/// Which week number tends to get the most done, across every sprint.
pub fn weekly_completion_patterns(tickets: &[Ticket]) -> Vec<WeekPattern> {
    let mut weeks: BTreeMap<i32, WeekPattern> = BTreeMap::new();

    for ticket in tickets {
        let pattern = weeks.entry(ticket.sprint_week).or_insert(WeekPattern {
            week: ticket.sprint_week,
            total_cards: 0,
            completed_cards: 0,
            total_story_points: 0,
            completed_story_points: 0,
            completion_rate: 0,
        });

        pattern.total_cards += 1;
        pattern.total_story_points += ticket.story_points as i64;
        if ticket.status.is_done() {
            pattern.completed_cards += 1;
            pattern.completed_story_points += ticket.story_points as i64;
        }
    }

    weeks
        .into_values()
        .map(|mut pattern| {
            pattern.completion_rate = percent(pattern.completed_cards, pattern.total_cards);
            pattern
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTiming {
    pub ticket_id: Uuid,
    pub card_id: String,
    pub sprint_week: i32,
    pub status: TicketStatus,
    pub story_points: i32,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds, absent unless the ticket is done.
    pub completed_at: Option<i64>,
    pub lead_time_hours: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingInsights {
    pub total_tickets: i64,
    pub completed_tickets: i64,
    pub average_lead_time_hours: i64,
    pub fastest_completion: Option<i64>,
    pub slowest_completion: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTimingAnalytics {
    pub ticket_timings: Vec<TicketTiming>,
    pub insights: TimingInsights,
}

pub fn ticket_timing_analytics(tickets: &[Ticket]) -> TicketTimingAnalytics {
    let ticket_timings: Vec<TicketTiming> = tickets
        .iter()
        .map(|ticket| TicketTiming {
            ticket_id: ticket.id,
            card_id: ticket.card_id.clone(),
            sprint_week: ticket.sprint_week,
            status: ticket.status,
            story_points: ticket.story_points,
            created_at: ticket.created_at.timestamp_millis(),
            completed_at: ticket.completed_at.map(|t| t.timestamp_millis()),
            lead_time_hours: ticket
                .completed_at
                .map(|done| lead_time_hours(ticket.created_at, done)),
        })
        .collect();

    let completed: Vec<i64> = ticket_timings
        .iter()
        .filter(|t| t.status.is_done())
        .map(|t| t.lead_time_hours.unwrap_or(0))
        .collect();

    let average_lead_time_hours = if completed.is_empty() {
        0
    } else {
        (completed.iter().sum::<i64>() as f64 / completed.len() as f64).round() as i64
    };

    TicketTimingAnalytics {
        insights: TimingInsights {
            total_tickets: tickets.len() as i64,
            completed_tickets: completed.len() as i64,
            average_lead_time_hours,
            fastest_completion: completed.iter().min().copied(),
            slowest_completion: completed.iter().max().copied(),
        },
        ticket_timings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sprint(name: &str, start_ms: i64) -> Sprint {
        Sprint {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: SprintStatus::Done,
            start_at: Utc.timestamp_millis_opt(start_ms).unwrap(),
            end_at: Utc.timestamp_millis_opt(start_ms + 14 * 86_400_000).unwrap(),
            sprint_week: Some(2),
            created_at: Utc::now(),
        }
    }

    fn ticket_in(sprint_id: Uuid, week: i32, points: i32, status: TicketStatus) -> Ticket {
        let created_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Ticket {
            id: Uuid::new_v4(),
            card_id: "CARD".to_string(),
            title: "Ticket".to_string(),
            story_points: points,
            estimated_days: 1.0,
            status,
            sprint_week: week,
            sprint_id,
            user_id: Uuid::new_v4(),
            created_at,
            completed_at: status
                .is_done()
                .then(|| created_at + chrono::Duration::hours(5)),
        }
    }

    #[test]
    fn velocity_trends_sorted_by_start_with_rates() {
        // Sprint B starts first but is created second; output must be
        // ascending by start date regardless.
        let sprint_a = sprint("Sprint A", 2_000_000);
        let sprint_b = sprint("Sprint B", 1_000_000);

        let mut tickets = Vec::new();
        // A: 8 of 10 points completed (4 of 5 tickets).
        for _ in 0..4 {
            tickets.push(ticket_in(sprint_a.id, 1, 2, TicketStatus::Done));
        }
        tickets.push(ticket_in(sprint_a.id, 1, 2, TicketStatus::Todo));
        // B: 5 of 5 points completed.
        tickets.push(ticket_in(sprint_b.id, 1, 5, TicketStatus::Done));

        let trends = velocity_trends(&[sprint_a, sprint_b], &tickets);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].sprint_name, "Sprint B");
        assert_eq!(trends[0].completion_rate, 100);
        assert_eq!(trends[0].velocity, 5);
        assert_eq!(trends[1].sprint_name, "Sprint A");
        assert_eq!(trends[1].completion_rate, 80);
        assert_eq!(trends[1].planned_story_points, 10);
        assert_eq!(trends[1].velocity, 8);
    }

    #[test]
    fn sprint_without_tickets_has_zero_velocity() {
        let empty = sprint("Empty", 0);
        let trends = velocity_trends(&[empty], &[]);
        assert_eq!(trends[0].planned_tickets, 0);
        assert_eq!(trends[0].completion_rate, 0);
        assert_eq!(trends[0].velocity, 0);
        assert_eq!(trends[0].total_weeks, 2);
    }

    #[test]
    fn weekly_patterns_group_across_sprints() {
        let sprint_a = sprint("A", 0);
        let sprint_b = sprint("B", 1);
        let tickets = vec![
            ticket_in(sprint_a.id, 1, 3, TicketStatus::Done),
            ticket_in(sprint_b.id, 1, 2, TicketStatus::Todo),
            ticket_in(sprint_b.id, 2, 5, TicketStatus::Done),
        ];
        let patterns = weekly_completion_patterns(&tickets);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].week, 1);
        assert_eq!(patterns[0].total_cards, 2);
        assert_eq!(patterns[0].completed_cards, 1);
        assert_eq!(patterns[0].completion_rate, 50);
        assert_eq!(patterns[1].completed_story_points, 5);
        assert_eq!(patterns[1].completion_rate, 100);
    }

    #[test]
    fn timing_lead_times_null_unless_done() {
        let sprint = sprint("A", 0);
        let tickets = vec![
            ticket_in(sprint.id, 1, 1, TicketStatus::Done),
            ticket_in(sprint.id, 1, 1, TicketStatus::Todo),
        ];
        let analytics = ticket_timing_analytics(&tickets);
        assert_eq!(analytics.ticket_timings[0].lead_time_hours, Some(5));
        assert_eq!(analytics.ticket_timings[1].lead_time_hours, None);
        assert_eq!(analytics.insights.completed_tickets, 1);
        assert_eq!(analytics.insights.average_lead_time_hours, 5);
        assert_eq!(analytics.insights.fastest_completion, Some(5));
        assert_eq!(analytics.insights.slowest_completion, Some(5));
    }

    #[test]
    fn timing_with_no_completions() {
        let sprint = sprint("A", 0);
        let tickets = vec![ticket_in(sprint.id, 1, 1, TicketStatus::InProgress)];
        let analytics = ticket_timing_analytics(&tickets);
        assert_eq!(analytics.insights.average_lead_time_hours, 0);
        assert_eq!(analytics.insights.fastest_completion, None);
        assert_eq!(analytics.insights.slowest_completion, None);
    }
}
