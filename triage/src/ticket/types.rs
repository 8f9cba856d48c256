//! Core ticket types
//!
//! These types are what the store persists and what every lifecycle
//! operation reads and writes.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::ensemble::Urgency;

/// Monotonic numeric ticket identifier assigned by the store
pub type TicketId = u64;

/// Prefix of the human-readable ticket reference
pub const TICKET_REF_PREFIX: &str = "TK";

static TICKET_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:TK)?\s*#?(\d+)\s*$").expect("TICKET_REF_RE regex should compile")
});

/// Human-readable reference for a ticket id, e.g. `TK000001`.
pub fn ticket_ref(id: TicketId) -> String {
    format!("{}{:06}", TICKET_REF_PREFIX, id)
}

/// Parse `TK000042`, `tk42`, `#42` or `42` into a ticket id.
pub fn parse_ticket_ref(input: &str) -> Option<TicketId> {
    TICKET_REF_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Every status in lifecycle order.
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    /// Position in the Open → In Progress → Resolved → Closed order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::InProgress => 1,
            Self::Resolved => 2,
            Self::Closed => 3,
        }
    }

    /// Whether support still has work to do.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "open" => Ok(Self::Open),
            "in progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("unknown ticket status: {s}")),
        }
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Standard,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Standard => write!(f, "Standard"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

impl From<Urgency> for Priority {
    /// Initial priority of a freshly triaged ticket.
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::High => Self::High,
            Urgency::Standard => Self::Standard,
        }
    }
}

/// A persisted ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Store-assigned monotonic id
    pub id: TicketId,
    /// Human-readable reference (`TK000001`)
    pub ticket_ref: String,
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: TicketStatus,
    /// Creation time; never changes after insert
    pub created_at: DateTime<Utc>,
}

/// Fields for a ticket that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl NewTicket {
    /// Materialize with a store-assigned id. New tickets start `Open`.
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        Ticket {
            id,
            ticket_ref: ticket_ref(id),
            user_id: self.user_id,
            user_name: self.user_name,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            status: TicketStatus::Open,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_ref_format() {
        assert_eq!(ticket_ref(1), "TK000001");
        assert_eq!(ticket_ref(123456), "TK123456");
        assert_eq!(ticket_ref(1234567), "TK1234567");
    }

    #[test]
    fn test_parse_ticket_ref() {
        assert_eq!(parse_ticket_ref("TK000001"), Some(1));
        assert_eq!(parse_ticket_ref("tk000042"), Some(42));
        assert_eq!(parse_ticket_ref("42"), Some(42));
        assert_eq!(parse_ticket_ref(" #7 "), Some(7));
        assert_eq!(parse_ticket_ref("TKabc"), None);
        assert_eq!(parse_ticket_ref(""), None);
        assert_eq!(parse_ticket_ref("TK99999999999999999999999"), None);
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in TicketStatus::ALL {
            assert_eq!(status.to_string().parse::<TicketStatus>().unwrap(), status);
        }
        assert_eq!(
            "in_progress".parse::<TicketStatus>().unwrap(),
            TicketStatus::InProgress
        );
        assert!("pending".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_serde_label() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_priority_from_urgency() {
        assert_eq!(Priority::from(Urgency::High), Priority::High);
        assert_eq!(Priority::from(Urgency::Standard), Priority::Standard);
    }

    #[test]
    fn test_new_ticket_starts_open() {
        let t = NewTicket {
            user_id: "E100".to_string(),
            user_name: "Sam".to_string(),
            title: "VPN".to_string(),
            description: "Cannot connect to VPN".to_string(),
            category: Category::Access,
            priority: Priority::Standard,
            created_at: Utc::now(),
        }
        .into_ticket(3);
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.ticket_ref, "TK000003");
    }
}
