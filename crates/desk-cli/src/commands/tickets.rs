use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use triage::{
    ServiceDesk, SlaReading, SubmissionOutcome, Ticket, TicketComment, TicketLifecycleManager,
    TicketLookup, TicketQuery, TicketStatus, TicketSubmission,
};

use super::{refresh, Output};
use crate::cli::ListArgs;

/// A ticket with its live SLA reading.
#[derive(Debug, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla: SlaReading,
}

impl TicketView {
    fn new(ticket: Ticket, now: DateTime<Utc>) -> Self {
        let sla = TicketLifecycleManager::sla_for(&ticket, now);
        Self { ticket, sla }
    }
}

#[derive(Debug, Serialize)]
struct TicketDetail {
    #[serde(flatten)]
    view: TicketView,
    comments: Vec<TicketComment>,
}

pub(super) fn submit(
    desk: &ServiceDesk,
    user_id: String,
    user_name: String,
    title: String,
    description: String,
    now: DateTime<Utc>,
    output: &mut Output<'_>,
) -> Result<()> {
    let outcome = desk
        .submit_at(
            TicketSubmission {
                user_id,
                user_name,
                title,
                description,
            },
            now,
        )
        .context("submitting ticket")?;

    if output.json {
        return output.emit_json(&outcome);
    }
    let out = &mut output.out;
    match outcome {
        SubmissionOutcome::Logged {
            ticket,
            decision,
            suggestion,
        } => {
            writeln!(out, "Logged {}", ticket.ticket_ref)?;
            writeln!(
                out,
                "  Category:   {} ({:.2}%, {})",
                ticket.category,
                decision.confidence_percent(),
                decision.processing_status
            )?;
            writeln!(out, "  Priority:   {}", ticket.priority)?;
            if !decision.urgency_keywords.is_empty() {
                writeln!(out, "  Urgent:     {}", decision.urgency_keywords.join(", "))?;
            }
            for score in decision.top_scores(3).iter().skip(1) {
                writeln!(
                    out,
                    "  Also:       {} ({:.2}%)",
                    score.category,
                    score.probability * 100.0
                )?;
            }
            writeln!(out, "  Suggestion: {suggestion}")?;
        }
        SubmissionOutcome::Rejected { reason, .. } => {
            writeln!(out, "Not logged: {reason}")?;
        }
    }
    Ok(())
}

/// With no filters at all this is the console view. Any filter turns the
/// listing into a search across every status unless `--status` narrows it.
pub(super) fn build_query(args: ListArgs) -> TicketQuery {
    let searching = args.text.is_some()
        || args.owner.is_some()
        || args.since.is_some()
        || args.until.is_some()
        || !args.categories.is_empty();
    let mut query = if !args.statuses.is_empty() {
        TicketQuery::new().with_statuses(args.statuses)
    } else if searching {
        TicketQuery::new()
    } else {
        TicketQuery::console_default(args.archived)
    };
    query = query
        .with_categories(args.categories)
        .created_between(args.since, args.until);
    if let Some(text) = args.text {
        query = query.with_text(text);
    }
    if let Some(owner) = args.owner {
        query = query.owned_by(owner);
    }
    query
}

pub(super) fn list(
    desk: &ServiceDesk,
    args: ListArgs,
    now: DateTime<Utc>,
    output: &mut Output<'_>,
) -> Result<()> {
    refresh(desk, now)?;
    let query = build_query(args);
    let views: Vec<TicketView> = desk
        .tickets(&query)?
        .into_iter()
        .map(|t| TicketView::new(t, now))
        .collect();

    if output.json {
        return output.emit_json(&views);
    }
    if views.is_empty() {
        writeln!(output.out, "No tickets")?;
        return Ok(());
    }
    for view in &views {
        let t = &view.ticket;
        writeln!(
            output.out,
            "{:<9} {:<11} {:<8} {:<21} {:<8} {:>6.1}h  {}",
            t.ticket_ref,
            t.status.to_string(),
            t.priority.to_string(),
            t.category.label(),
            view.sla.band.to_string(),
            view.sla.hours_open,
            t.title
        )?;
    }
    Ok(())
}

pub(super) fn show(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    internal: bool,
    now: DateTime<Utc>,
    output: &mut Output<'_>,
) -> Result<()> {
    let ticket = desk.ticket(lookup.id())?;
    let comments = if internal {
        desk.list_comments(ticket.id)?
    } else {
        desk.list_public_comments(ticket.id)?
    };
    let detail = TicketDetail {
        view: TicketView::new(ticket, now),
        comments,
    };

    if output.json {
        return output.emit_json(&detail);
    }
    let t = &detail.view.ticket;
    let out = &mut output.out;
    writeln!(out, "{}  {}", t.ticket_ref, t.title)?;
    writeln!(out, "  Submitted by {} ({})", t.user_name, t.user_id)?;
    writeln!(out, "  Created:  {}", t.created_at.format("%Y-%m-%d %H:%M UTC"))?;
    writeln!(out, "  Status:   {}", t.status)?;
    writeln!(out, "  Priority: {}", t.priority)?;
    writeln!(out, "  Category: {}", t.category)?;
    if t.status != TicketStatus::Closed {
        writeln!(
            out,
            "  SLA:      {} ({:.1}h open)",
            detail.view.sla.band, detail.view.sla.hours_open
        )?;
    }
    writeln!(out)?;
    writeln!(out, "{}", t.description)?;
    for c in &detail.comments {
        let marker = if c.internal { " [internal]" } else { "" };
        writeln!(out)?;
        writeln!(
            out,
            "-- {} at {}{}",
            c.author_name,
            c.created_at.format("%Y-%m-%d %H:%M"),
            marker
        )?;
        writeln!(out, "{}", c.body)?;
    }
    Ok(())
}

pub(super) fn set_status(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    status: TicketStatus,
    output: &mut Output<'_>,
) -> Result<()> {
    let change = desk.lifecycle().update_status(lookup.id(), status)?;
    if output.json {
        return output.emit_json(&change);
    }
    writeln!(
        output.out,
        "{}: {} -> {}",
        triage::ticket::ticket_ref(change.ticket_id),
        change.from,
        change.to
    )?;
    Ok(())
}

pub(super) fn set_priority(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    priority: triage::Priority,
    output: &mut Output<'_>,
) -> Result<()> {
    let change = desk.lifecycle().update_priority(lookup.id(), priority)?;
    if output.json {
        return output.emit_json(&change);
    }
    writeln!(
        output.out,
        "{}: priority {} -> {}",
        triage::ticket::ticket_ref(change.ticket_id),
        change.from,
        change.to
    )?;
    Ok(())
}

pub(super) fn delete(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    output: &mut Output<'_>,
) -> Result<()> {
    let ticket = desk.delete_ticket(lookup.id())?;
    if output.json {
        return output.emit_json(&ticket);
    }
    writeln!(output.out, "Deleted {}", ticket.ticket_ref)?;
    Ok(())
}

pub(super) fn comment(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    body: &str,
    author_id: &str,
    author_name: &str,
    internal: bool,
    output: &mut Output<'_>,
) -> Result<()> {
    let comment = desk.add_comment(lookup.id(), author_id, author_name, body, internal)?;
    if output.json {
        return output.emit_json(&comment);
    }
    writeln!(
        output.out,
        "Comment added to {}",
        triage::ticket::ticket_ref(comment.ticket_id)
    )?;
    Ok(())
}
