use anyhow::Result;
use triage::{parse_identifiers, BulkOutcome, ServiceDesk, TicketStatus};

use super::Output;

pub(super) fn bulk_status(
    desk: &ServiceDesk,
    raw_ids: &str,
    status: TicketStatus,
    output: &mut Output<'_>,
) -> Result<()> {
    let parsed = parse_identifiers(raw_ids);
    let outcome = desk.bulk().bulk_update_status(parsed.ids, status);
    report(&outcome, &parsed.discarded, output)
}

pub(super) fn bulk_delete(desk: &ServiceDesk, raw_ids: &str, output: &mut Output<'_>) -> Result<()> {
    let parsed = parse_identifiers(raw_ids);
    let outcome = desk.bulk().bulk_delete(parsed.ids);
    report(&outcome, &parsed.discarded, output)
}

fn report(outcome: &BulkOutcome, discarded: &[String], output: &mut Output<'_>) -> Result<()> {
    if output.json {
        return output.emit_json(outcome);
    }
    let verb = match outcome.operation {
        triage::BulkOperation::UpdateStatus(status) => format!("Updated to {status}"),
        triage::BulkOperation::Delete => "Deleted".to_string(),
    };
    writeln!(output.out, "{verb}: {} ticket(s)", outcome.affected_count())?;
    if !outcome.missing.is_empty() {
        writeln!(output.out, "  Not found: {}", join_ids(&outcome.missing))?;
    }
    for failure in &outcome.failed {
        writeln!(
            output.out,
            "  Failed: {} ({})",
            triage::ticket::ticket_ref(failure.ticket_id),
            failure.error
        )?;
    }
    if !discarded.is_empty() {
        writeln!(output.out, "  Ignored: {}", discarded.join(", "))?;
    }
    Ok(())
}

fn join_ids(ids: &[triage::TicketId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
