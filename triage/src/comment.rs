//! Ticket comments.
//!
//! Internal comments are support-only notes and are hidden from the
//! ticket owner's view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ticket::TicketId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketComment {
    pub id: Uuid,
    pub ticket_id: TicketId,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    #[serde(default)]
    pub internal: bool,
    pub created_at: DateTime<Utc>,
}

impl TicketComment {
    pub fn new(
        ticket_id: TicketId,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        body: impl Into<String>,
        internal: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            author_id: author_id.into(),
            author_name: author_name.into(),
            body: body.into(),
            internal,
            created_at: Utc::now(),
        }
    }

    /// Drop internal notes unless the reader is support staff.
    pub fn visible(comments: Vec<TicketComment>, include_internal: bool) -> Vec<TicketComment> {
        if include_internal {
            comments
        } else {
            comments.into_iter().filter(|c| !c.internal).collect()
        }
    }
}
