//! Ticket search, lookup and dashboard summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sla::{compute_sla_band, SlaBand};
use super::types::{parse_ticket_ref, Priority, Ticket, TicketId, TicketStatus};
use crate::category::Category;

/// A ticket reference typed by a person: `TK000042` or `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketLookup(pub TicketId);

impl TicketLookup {
    pub fn parse(input: &str) -> Option<Self> {
        parse_ticket_ref(input).map(Self)
    }

    pub fn id(&self) -> TicketId {
        self.0
    }
}

impl std::str::FromStr for TicketLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not a ticket reference: {s}"))
    }
}

/// Filter over a ticket list. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketQuery {
    /// Case-insensitive substring of title or description
    pub text: Option<String>,
    pub statuses: Vec<TicketStatus>,
    pub categories: Vec<Category>,
    pub owner: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub created_before: Option<DateTime<Utc>>,
}

impl TicketQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the support console shows by default: work in flight, plus
    /// closed tickets when archived ones are requested.
    pub fn console_default(show_archived: bool) -> Self {
        let mut statuses = vec![TicketStatus::Open, TicketStatus::InProgress];
        if show_archived {
            statuses.push(TicketStatus::Closed);
        }
        Self {
            statuses,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TicketStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn owned_by(mut self, user_id: impl Into<String>) -> Self {
        self.owner = Some(user_id.into());
        self
    }

    /// Created within `[from, before)`.
    pub fn created_between(
        mut self,
        from: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_from = from;
        self.created_before = before;
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&ticket.status) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&ticket.category) {
            return false;
        }
        if let Some(owner) = &self.owner {
            if &ticket.user_id != owner {
                return false;
            }
        }
        if self.created_from.is_some_and(|from| ticket.created_at < from) {
            return false;
        }
        if self.created_before.is_some_and(|before| ticket.created_at >= before) {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            let hit = ticket.title.to_lowercase().contains(&needle)
                || ticket.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, tickets: impl IntoIterator<Item = Ticket>) -> Vec<Ticket> {
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Dashboard counts at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub total: usize,
    pub by_status: BTreeMap<TicketStatus, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    /// SLA bands of Open and In Progress tickets only
    pub active_by_sla: BTreeMap<SlaBand, usize>,
}

impl TicketSummary {
    pub fn compute<'a>(tickets: impl IntoIterator<Item = &'a Ticket>, now: DateTime<Utc>) -> Self {
        let mut summary = Self::default();
        for ticket in tickets {
            summary.total += 1;
            *summary.by_status.entry(ticket.status).or_insert(0) += 1;
            *summary.by_category.entry(ticket.category).or_insert(0) += 1;
            *summary.by_priority.entry(ticket.priority).or_insert(0) += 1;
            if ticket.status.is_active() {
                let band = compute_sla_band(ticket.created_at, now).band;
                *summary.active_by_sla.entry(band).or_insert(0) += 1;
            }
        }
        summary
    }

    pub fn count_status(&self, status: TicketStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn count_sla(&self, band: SlaBand) -> usize {
        self.active_by_sla.get(&band).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn ticket(
        id: TicketId,
        user: &str,
        title: &str,
        category: Category,
        status: TicketStatus,
        age_hours: i64,
    ) -> Ticket {
        Ticket {
            id,
            ticket_ref: super::super::types::ticket_ref(id),
            user_id: user.to_string(),
            user_name: user.to_uppercase(),
            title: title.to_string(),
            description: format!("{title} reported by {user}"),
            category,
            priority: Priority::Standard,
            status,
            created_at: now() - Duration::hours(age_hours),
        }
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket(1, "u1", "Printer jam", Category::Hardware, TicketStatus::Open, 1),
            ticket(2, "u2", "VPN access", Category::Access, TicketStatus::InProgress, 3),
            ticket(3, "u1", "New laptop", Category::Purchase, TicketStatus::Resolved, 10),
            ticket(4, "u3", "Disk quota", Category::Storage, TicketStatus::Closed, 50),
            ticket(5, "u2", "Payroll", Category::HrSupport, TicketStatus::Open, 8),
        ]
    }

    #[test]
    fn test_lookup() {
        assert_eq!(TicketLookup::parse("TK000012"), Some(TicketLookup(12)));
        assert_eq!("12".parse::<TicketLookup>().unwrap().id(), 12);
        assert!("ticket twelve".parse::<TicketLookup>().is_err());
    }

    #[test]
    fn test_console_default() {
        let ids = |q: TicketQuery| q.apply(sample()).iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(TicketQuery::console_default(false)), vec![1, 2, 5]);
        assert_eq!(ids(TicketQuery::console_default(true)), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_text_and_owner() {
        let q = TicketQuery::new().with_text("LAPTOP");
        assert_eq!(q.apply(sample())[0].id, 3);

        let q = TicketQuery::new().owned_by("u2").with_text("access");
        let hits = q.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        // Description is searched too.
        let q = TicketQuery::new().with_text("by u3");
        assert_eq!(q.apply(sample())[0].id, 4);
    }

    #[test]
    fn test_blank_text_matches_all() {
        let q = TicketQuery::new().with_text("   ");
        assert_eq!(q.apply(sample()).len(), 5);
    }

    #[test]
    fn test_category_and_date_range() {
        let q = TicketQuery::new()
            .with_categories([Category::Hardware, Category::Storage])
            .created_between(Some(now() - Duration::hours(20)), None);
        let ids: Vec<_> = q.apply(sample()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);

        // #5 was created exactly at the upper bound.
        let q = TicketQuery::new().created_between(None, Some(now() - Duration::hours(8)));
        let ids: Vec<_> = q.apply(sample()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 4]);

        let q = TicketQuery::new().created_between(
            Some(now() - Duration::hours(8)),
            Some(now() - Duration::hours(3)),
        );
        let ids: Vec<_> = q.apply(sample()).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn test_summary_counts() {
        let tickets = sample();
        let summary = TicketSummary::compute(&tickets, now());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.count_status(TicketStatus::Open), 2);
        assert_eq!(summary.count_status(TicketStatus::Closed), 1);
        assert_eq!(summary.by_priority[&Priority::Standard], 5);
        assert_eq!(summary.by_category[&Category::Hardware], 1);

        // Active: #1 (1h), #2 (3h), #5 (8h)
        assert_eq!(summary.count_sla(SlaBand::OnTrack), 1);
        assert_eq!(summary.count_sla(SlaBand::Warning), 1);
        assert_eq!(summary.count_sla(SlaBand::Breached), 1);
    }

    #[test]
    fn test_summary_serializes_with_labels() {
        let tickets = sample();
        let json = serde_json::to_value(TicketSummary::compute(&tickets, now())).unwrap();
        assert_eq!(json["by_status"]["In Progress"], 1);
        assert_eq!(json["active_by_sla"]["On Track"], 1);
        assert_eq!(json["by_category"]["HR Support"], 1);
    }
}
