//! Client-held board state for drag-and-drop reassignment.
//!
//! The board renders from the last fetched ticket set with a small override
//! map layered on top, so a drop repaints immediately while the combined
//! status+week update is in flight. Overrides are keyed by ticket id: a
//! confirmed write clears the entry (the refetched data now agrees with it),
//! a failed write rolls it back and the board falls back to the last
//! known-good data. Concurrent drags on the same ticket are not coordinated;
//! the store's last write wins.

use crate::domain::models::{Ticket, TicketPatch, TicketStatus};
use std::collections::HashMap;
use uuid::Uuid;

/// Target column and week of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub status: TicketStatus,
    pub sprint_week: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TicketOverride {
    status: TicketStatus,
    sprint_week: i32,
}

#[derive(Debug, Default)]
pub struct BoardState {
    overrides: HashMap<Uuid, TicketOverride>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drop. Returns the update to send to the ticket service, or
    /// `None` when the drop lands where the ticket already is (no-op, no
    /// request issued).
    pub fn begin_drop(&mut self, ticket: &Ticket, target: DropTarget) -> Option<TicketPatch> {
        if ticket.status == target.status && ticket.sprint_week == target.sprint_week {
            return None;
        }

        self.overrides.insert(
            ticket.id,
            TicketOverride {
                status: target.status,
                sprint_week: target.sprint_week,
            },
        );

        Some(TicketPatch {
            status: Some(target.status),
            sprint_week: Some(target.sprint_week),
            ..Default::default()
        })
    }

    /// The write landed; the subscribed data is authoritative again.
    pub fn confirm(&mut self, ticket_id: Uuid) {
        self.overrides.remove(&ticket_id);
    }

    /// The write failed; discard the override so the board reverts to the
    /// last known-good data. The caller logs the failure, nothing retries.
    pub fn rollback(&mut self, ticket_id: Uuid) {
        if self.overrides.remove(&ticket_id).is_some() {
            tracing::warn!("Discarded optimistic board update for ticket {}", ticket_id);
        }
    }

    pub fn has_pending(&self, ticket_id: Uuid) -> bool {
        self.overrides.contains_key(&ticket_id)
    }

    /// Merge overrides over the authoritative ticket set for rendering.
    pub fn merged(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        tickets
            .iter()
            .map(|ticket| match self.overrides.get(&ticket.id) {
                Some(over) => {
                    let mut shown = ticket.clone();
                    shown.status = over.status;
                    shown.sprint_week = over.sprint_week;
                    shown
                }
                None => ticket.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket(status: TicketStatus, week: i32) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            card_id: "CARD-9".to_string(),
            title: "Board ticket".to_string(),
            story_points: 3,
            estimated_days: 1.0,
            status,
            sprint_week: week,
            sprint_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn drop_on_same_cell_is_a_noop() {
        let mut board = BoardState::new();
        let t = ticket(TicketStatus::Todo, 1);
        let patch = board.begin_drop(
            &t,
            DropTarget {
                status: TicketStatus::Todo,
                sprint_week: 1,
            },
        );
        assert!(patch.is_none());
        assert!(!board.has_pending(t.id));
    }

    #[test]
    fn drop_overrides_render_until_confirmed() {
        let mut board = BoardState::new();
        let t = ticket(TicketStatus::Todo, 1);
        let patch = board
            .begin_drop(
                &t,
                DropTarget {
                    status: TicketStatus::InProgress,
                    sprint_week: 2,
                },
            )
            .expect("differing target must produce an update");

        assert_eq!(patch.status, Some(TicketStatus::InProgress));
        assert_eq!(patch.sprint_week, Some(2));

        // Optimistic view shows the move before the write lands.
        let shown = board.merged(std::slice::from_ref(&t));
        assert_eq!(shown[0].status, TicketStatus::InProgress);
        assert_eq!(shown[0].sprint_week, 2);

        board.confirm(t.id);
        assert!(!board.has_pending(t.id));
        let shown = board.merged(std::slice::from_ref(&t));
        assert_eq!(shown[0].status, TicketStatus::Todo);
    }

    #[test]
    fn rollback_reverts_to_known_good_data() {
        let mut board = BoardState::new();
        let t = ticket(TicketStatus::Todo, 1);
        board.begin_drop(
            &t,
            DropTarget {
                status: TicketStatus::Done,
                sprint_week: 1,
            },
        );
        assert!(board.has_pending(t.id));

        board.rollback(t.id);
        assert!(!board.has_pending(t.id));
        let shown = board.merged(std::slice::from_ref(&t));
        assert_eq!(shown[0].status, TicketStatus::Todo);
        assert_eq!(shown[0].sprint_week, 1);
    }

    #[test]
    fn status_only_drop_keeps_week() {
        let mut board = BoardState::new();
        let t = ticket(TicketStatus::InProgress, 2);
        let patch = board
            .begin_drop(
                &t,
                DropTarget {
                    status: TicketStatus::Done,
                    sprint_week: 2,
                },
            )
            .unwrap();
        assert_eq!(patch.status, Some(TicketStatus::Done));
        assert_eq!(patch.sprint_week, Some(2));
        assert!(patch.title.is_none());
        assert!(patch.sprint_id.is_none());
    }

    #[test]
    fn last_drop_wins_for_the_same_ticket() {
        let mut board = BoardState::new();
        let t = ticket(TicketStatus::Todo, 1);
        board.begin_drop(
            &t,
            DropTarget {
                status: TicketStatus::InProgress,
                sprint_week: 1,
            },
        );
        board.begin_drop(
            &t,
            DropTarget {
                status: TicketStatus::Done,
                sprint_week: 3,
            },
        );
        let shown = board.merged(std::slice::from_ref(&t));
        assert_eq!(shown[0].status, TicketStatus::Done);
        assert_eq!(shown[0].sprint_week, 3);
    }
}
