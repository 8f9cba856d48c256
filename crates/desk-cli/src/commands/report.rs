use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use triage::{
    Category, ExperienceFeedback, ExperienceSummary, FeedbackKind, NewExperienceFeedback,
    ServiceDesk, SlaBand, TicketLookup, TicketStatus, MAX_RATING,
};

use super::{refresh, Output};

pub(super) fn sweep(desk: &ServiceDesk, now: DateTime<Utc>, output: &mut Output<'_>) -> Result<()> {
    let report = desk.sweep(now)?;
    if output.json {
        return output.emit_json(&report);
    }
    writeln!(
        output.out,
        "Auto-close: {} closed, {} resolved examined",
        report.closed_count(),
        report.examined
    )?;
    for change in &report.closed {
        writeln!(output.out, "  Closed {}", triage::ticket::ticket_ref(change.ticket_id))?;
    }
    for failure in &report.failures {
        writeln!(
            output.out,
            "  Failed {} ({})",
            triage::ticket::ticket_ref(failure.ticket_id),
            failure.error
        )?;
    }
    Ok(())
}

pub(super) fn summary(desk: &ServiceDesk, now: DateTime<Utc>, output: &mut Output<'_>) -> Result<()> {
    refresh(desk, now)?;
    let summary = desk.summary(now)?;
    if output.json {
        return output.emit_json(&summary);
    }
    let out = &mut output.out;
    writeln!(out, "Total tickets: {}", summary.total)?;
    writeln!(out, "By status:")?;
    for status in TicketStatus::ALL {
        writeln!(out, "  {:<12} {}", status.to_string(), summary.count_status(status))?;
    }
    writeln!(out, "Active SLA:")?;
    for band in [SlaBand::OnTrack, SlaBand::Warning, SlaBand::Breached] {
        writeln!(out, "  {:<12} {}", band.to_string(), summary.count_sla(band))?;
    }
    writeln!(out, "By category:")?;
    for (category, count) in &summary.by_category {
        writeln!(out, "  {:<21} {}", category.label(), count)?;
    }
    writeln!(out, "By priority:")?;
    for (priority, count) in &summary.by_priority {
        writeln!(out, "  {:<12} {}", priority.to_string(), count)?;
    }
    Ok(())
}

pub(super) fn record_feedback(
    desk: &ServiceDesk,
    lookup: TicketLookup,
    corrected: Category,
    kind: &str,
    weight: f64,
    output: &mut Output<'_>,
) -> Result<()> {
    let ticket = desk.ticket(lookup.id())?;
    let record = desk.feedback().record(
        ticket.id,
        ticket.category,
        corrected,
        weight,
        FeedbackKind::from(kind),
    )?;
    if output.json {
        return output.emit_json(&record);
    }
    writeln!(
        output.out,
        "Feedback recorded for {}: {} -> {} ({})",
        ticket.ticket_ref, record.predicted_category, record.corrected_category, record.kind
    )?;
    Ok(())
}

pub(super) fn feedback_stats(desk: &ServiceDesk, output: &mut Output<'_>) -> Result<()> {
    let counts = desk.feedback().counts_by_kind()?;
    if output.json {
        return output.emit_json(&counts);
    }
    if counts.is_empty() {
        writeln!(output.out, "No feedback yet")?;
        return Ok(());
    }
    let total: usize = counts.values().sum();
    writeln!(output.out, "Total feedback: {total}")?;
    for (kind, count) in &counts {
        writeln!(output.out, "  {kind}: {count}")?;
    }
    Ok(())
}

pub(super) fn submit_experience(
    desk: &ServiceDesk,
    feedback: NewExperienceFeedback,
    output: &mut Output<'_>,
) -> Result<()> {
    let entry = desk.feedback().submit_experience(feedback)?;
    if output.json {
        return output.emit_json(&entry);
    }
    writeln!(
        output.out,
        "Thank you! {} saved ({}/{MAX_RATING})",
        entry.kind, entry.rating
    )?;
    Ok(())
}

#[derive(Serialize)]
struct ExperienceReport<'a> {
    #[serde(flatten)]
    summary: &'a ExperienceSummary,
    recent: &'a [ExperienceFeedback],
}

pub(super) fn experience_analytics(
    desk: &ServiceDesk,
    recent: usize,
    output: &mut Output<'_>,
) -> Result<()> {
    let summary = desk.feedback().experience_summary()?;
    let mut entries = desk.feedback().list_experience()?;
    entries.truncate(recent);
    if output.json {
        return output.emit_json(&ExperienceReport {
            summary: &summary,
            recent: &entries,
        });
    }
    let Some(average) = summary.average_rating else {
        writeln!(output.out, "No feedback yet")?;
        return Ok(());
    };
    let out = &mut output.out;
    writeln!(out, "Total feedback: {}", summary.total)?;
    writeln!(out, "Average rating: {average:.1}/{MAX_RATING}")?;
    writeln!(out, "Feedback types: {}", summary.kind_count())?;
    for (kind, count) in &summary.by_kind {
        writeln!(out, "  {kind}: {count}")?;
    }
    if !entries.is_empty() {
        writeln!(out, "Recent:")?;
    }
    for entry in &entries {
        writeln!(
            out,
            "  {} {} ({}/{MAX_RATING}) {}: {}",
            entry.submitted_at.format("%Y-%m-%d %H:%M"),
            entry.kind,
            entry.rating,
            entry.user_name,
            entry.message
        )?;
    }
    Ok(())
}
