use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use triage::{Category, ExperienceKind, Priority, TicketLookup, TicketStatus};

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "service-desk", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON store file (overrides SERVICE_DESK_STORE)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Triage config TOML (overrides SERVICE_DESK_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Statistical classifier endpoint (overrides SERVICE_DESK_STATISTICAL_URL)
    #[arg(long, global = true)]
    pub statistical_url: Option<String>,

    /// Semantic classifier endpoint (overrides SERVICE_DESK_SEMANTIC_URL)
    #[arg(long, global = true)]
    pub semantic_url: Option<String>,

    /// Classifier request timeout in seconds (overrides SERVICE_DESK_CLASSIFIER_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            store: self.store.clone(),
            config: self.config.clone(),
            statistical_url: self.statistical_url.clone(),
            semantic_url: self.semantic_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Triage an incident report and log it as a ticket
    Submit {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },

    /// List tickets (runs the auto-close sweep first)
    List(ListArgs),

    /// Show one ticket with its SLA state and comments
    Show {
        /// TK000001 or 1
        ticket: TicketLookup,
        /// Include internal support notes
        #[arg(long, default_value_t = false)]
        internal: bool,
    },

    /// Set a ticket's status
    Status {
        ticket: TicketLookup,
        status: TicketStatus,
    },

    /// Override a ticket's priority
    Priority {
        ticket: TicketLookup,
        priority: Priority,
    },

    /// Delete a ticket
    Delete { ticket: TicketLookup },

    /// Set the status of many tickets, e.g. "1, 2, 5"
    BulkStatus { ids: String, status: TicketStatus },

    /// Delete many tickets, e.g. "1, 2, 5"
    BulkDelete { ids: String },

    /// Close Resolved tickets older than 24h
    Sweep,

    /// Triage corrections and user experience feedback
    #[command(subcommand)]
    Feedback(FeedbackCommand),

    /// Add a comment to a ticket
    Comment {
        ticket: TicketLookup,
        body: String,
        #[arg(long)]
        author_id: String,
        #[arg(long)]
        author_name: String,
        /// Visible to support staff only
        #[arg(long, default_value_t = false)]
        internal: bool,
    },

    /// Dashboard counts (runs the auto-close sweep first)
    Summary,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Include Closed tickets in the default view
    #[arg(long, default_value_t = false)]
    pub archived: bool,

    /// Only these statuses (replaces the default Open + In Progress view)
    #[arg(long = "status")]
    pub statuses: Vec<TicketStatus>,

    #[arg(long = "category")]
    pub categories: Vec<Category>,

    /// Case-insensitive text in title or description
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub owner: Option<String>,

    /// Created on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_day_start)]
    pub since: Option<DateTime<Utc>>,

    /// Created on or before this date (YYYY-MM-DD); held as the start of
    /// the following day, an exclusive bound
    #[arg(long, value_parser = parse_day_end)]
    pub until: Option<DateTime<Utc>>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FeedbackCommand {
    /// Record a corrected category for a ticket
    Record {
        ticket: TicketLookup,
        corrected: Category,
        /// Wrong Category, Misclassification, Incorrect Priority or free text
        #[arg(long, default_value = "Wrong Category")]
        kind: String,
        #[arg(long, default_value_t = triage::DEFAULT_FEEDBACK_WEIGHT)]
        weight: f64,
    },

    /// Counts by feedback kind
    Stats,

    /// Send feedback about the service desk itself
    Submit {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        user_name: String,
        /// Bug Report, Feature Request, General Feedback, AI Categorization Issue or Other
        #[arg(long, default_value = "General Feedback")]
        kind: ExperienceKind,
        message: String,
        /// 1 = poor, 5 = excellent
        #[arg(long, default_value_t = triage::DEFAULT_RATING)]
        rating: u8,
        #[arg(long)]
        email: Option<String>,
    },

    /// Experience feedback totals, average rating and recent entries
    Analytics {
        /// How many recent entries to show
        #[arg(long, default_value_t = 20)]
        recent: usize,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("{s}: {e}"))
}

pub fn parse_day_start(s: &str) -> Result<DateTime<Utc>, String> {
    let day = parse_date(s)?;
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("{s}: invalid date"))
}

/// Midnight after the given day, for use as an exclusive bound.
pub fn parse_day_end(s: &str) -> Result<DateTime<Utc>, String> {
    let day = parse_date(s)?;
    day.succ_opt()
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("{s}: invalid date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status_command() {
        let cli = Cli::try_parse_from(["service-desk", "status", "TK000004", "in_progress"]).unwrap();
        match cli.command {
            Command::Status { ticket, status } => {
                assert_eq!(ticket.id(), 4);
                assert_eq!(status, TicketStatus::InProgress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::try_parse_from([
            "service-desk",
            "list",
            "--status",
            "resolved",
            "--category",
            "hr support",
            "--since",
            "2025-01-02",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.statuses, vec![TicketStatus::Resolved]);
        assert_eq!(args.categories, vec![Category::HrSupport]);
        assert_eq!(args.since.unwrap().to_rfc3339(), "2025-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_bad_reference_rejected() {
        assert!(Cli::try_parse_from(["service-desk", "delete", "ticket-four"]).is_err());
    }

    #[test]
    fn test_parse_feedback_submit() {
        let cli = Cli::try_parse_from([
            "service-desk",
            "feedback",
            "submit",
            "--user-id",
            "emp-1",
            "--user-name",
            "Robin",
            "--kind",
            "bug report",
            "Search is slow",
        ])
        .unwrap();
        match cli.command {
            Command::Feedback(FeedbackCommand::Submit {
                kind,
                rating,
                email,
                ..
            }) => {
                assert_eq!(kind, ExperienceKind::BugReport);
                assert_eq!(rating, 3);
                assert_eq!(email, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_day_end_is_next_midnight() {
        let end = parse_day_end("2025-03-01").unwrap();
        assert_eq!(end.to_rfc3339(), "2025-03-02T00:00:00+00:00");
        let end = parse_day_end("2024-12-31").unwrap();
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert!(parse_day_start("03/01/2025").is_err());
    }
}
