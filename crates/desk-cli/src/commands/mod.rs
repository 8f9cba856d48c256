//! Subcommand handlers.
//!
//! Handlers write to the supplied writer so they can be driven from tests;
//! `main` passes stdout. Logs go to stderr through `tracing`.

mod bulk;
mod report;
mod tickets;

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use triage::{NewExperienceFeedback, ServiceDesk};

use crate::cli::{Command, FeedbackCommand};

/// Output settings shared by every handler.
pub struct Output<'a> {
    pub out: &'a mut dyn Write,
    pub json: bool,
}

impl Output<'_> {
    pub(crate) fn emit_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut *self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }
}

/// Run one subcommand against the desk at instant `now`.
pub fn execute(
    desk: &ServiceDesk,
    command: Command,
    now: DateTime<Utc>,
    output: &mut Output<'_>,
) -> Result<()> {
    match command {
        Command::Submit {
            user_id,
            user_name,
            title,
            description,
        } => tickets::submit(desk, user_id, user_name, title, description, now, output),
        Command::List(args) => tickets::list(desk, args, now, output),
        Command::Show { ticket, internal } => tickets::show(desk, ticket, internal, now, output),
        Command::Status { ticket, status } => tickets::set_status(desk, ticket, status, output),
        Command::Priority { ticket, priority } => {
            tickets::set_priority(desk, ticket, priority, output)
        }
        Command::Delete { ticket } => tickets::delete(desk, ticket, output),
        Command::Comment {
            ticket,
            body,
            author_id,
            author_name,
            internal,
        } => tickets::comment(desk, ticket, &body, &author_id, &author_name, internal, output),
        Command::BulkStatus { ids, status } => bulk::bulk_status(desk, &ids, status, output),
        Command::BulkDelete { ids } => bulk::bulk_delete(desk, &ids, output),
        Command::Sweep => report::sweep(desk, now, output),
        Command::Summary => report::summary(desk, now, output),
        Command::Feedback(FeedbackCommand::Record {
            ticket,
            corrected,
            kind,
            weight,
        }) => report::record_feedback(desk, ticket, corrected, &kind, weight, output),
        Command::Feedback(FeedbackCommand::Stats) => report::feedback_stats(desk, output),
        Command::Feedback(FeedbackCommand::Submit {
            user_id,
            user_name,
            kind,
            message,
            rating,
            email,
        }) => report::submit_experience(
            desk,
            NewExperienceFeedback {
                user_id,
                user_name,
                email,
                kind,
                message,
                rating,
            },
            output,
        ),
        Command::Feedback(FeedbackCommand::Analytics { recent }) => {
            report::experience_analytics(desk, recent, output)
        }
    }
}

/// Close due tickets before a read, like a dashboard refresh.
pub(crate) fn refresh(desk: &ServiceDesk, now: DateTime<Utc>) -> Result<()> {
    desk.sweep(now)?;
    Ok(())
}
