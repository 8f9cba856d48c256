//! Status transition policy.
//!
//! `Override` lets support staff set any status from any status, which is
//! how the desk behaves out of the box. `Guarded` is opt-in via
//! `transition_policy = "guarded"` in the triage config:
//!
//! - setting the current status again is a no-op and always allowed
//! - forward moves (Open → In Progress → Resolved → Closed) are allowed,
//!   including skips
//! - Resolved may be reopened to Open or In Progress
//! - nothing leaves Closed

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::TicketStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition: {from} -> {to}")]
pub struct IllegalTransition {
    pub from: TicketStatus,
    pub to: TicketStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    #[default]
    Override,
    Guarded,
}

impl TransitionPolicy {
    pub fn check(self, from: TicketStatus, to: TicketStatus) -> Result<(), IllegalTransition> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(IllegalTransition { from, to })
        }
    }

    pub fn allows(self, from: TicketStatus, to: TicketStatus) -> bool {
        match self {
            Self::Override => true,
            Self::Guarded => {
                if from == to {
                    return true;
                }
                match from {
                    TicketStatus::Closed => false,
                    TicketStatus::Resolved => true,
                    _ => to.rank() > from.rank(),
                }
            }
        }
    }
}

impl std::fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Guarded => write!(f, "guarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketStatus::*;

    #[test]
    fn test_override_allows_everything() {
        for from in TicketStatus::ALL {
            for to in TicketStatus::ALL {
                assert!(TransitionPolicy::Override.allows(from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_guarded_table() {
        let g = TransitionPolicy::Guarded;
        assert!(g.allows(Open, InProgress));
        assert!(g.allows(Open, Resolved));
        assert!(g.allows(Open, Closed));
        assert!(g.allows(InProgress, Resolved));
        assert!(g.allows(Resolved, Closed));
        assert!(g.allows(Resolved, Open));
        assert!(g.allows(Resolved, InProgress));
        assert!(g.allows(Closed, Closed));

        assert!(!g.allows(InProgress, Open));
        assert!(!g.allows(Closed, Open));
        assert!(!g.allows(Closed, Resolved));
    }

    #[test]
    fn test_check_reports_pair() {
        let err = TransitionPolicy::Guarded.check(Closed, Open).unwrap_err();
        assert_eq!(err.from, Closed);
        assert_eq!(err.to, Open);
        assert_eq!(err.to_string(), "illegal status transition: Closed -> Open");
    }

    #[test]
    fn test_default_is_override() {
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::Override);
    }
}
