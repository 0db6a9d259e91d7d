//! Command-line surface.

use std::ffi::OsString;

use clap::{ArgAction, Args, Parser, Subcommand};
use go365_core::TokenStorage;
use go365_graph::{DriveLocation, EventResponse, PageToken};

/// Microsoft 365 / Microsoft Graph CLI tool.
#[derive(Debug, Parser)]
#[command(
    name = "go365",
    version,
    about = "Microsoft 365 / Microsoft Graph CLI tool",
    long_about = "go365 is a CLI tool for accessing Microsoft 365 and Microsoft Graph functionality.\n\n\
                  Unknown commands are looked up as go365-<name> plugins on PATH.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authenticate with Microsoft 365
    Login(LoginArgs),
    /// Remove stored authentication tokens
    Logout,
    /// Show authentication status and the signed-in user
    Status,
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List go365-* plugins found in PATH
    Plugins,
    /// Read and send mail
    #[command(subcommand)]
    Mail(MailCommand),
    /// View and manage calendar events
    #[command(subcommand)]
    Calendar(CalendarCommand),
    /// Browse OneDrive and SharePoint drives
    #[command(subcommand)]
    Drive(DriveCommand),
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Sign in through the browser instead of a device code
    #[arg(long)]
    pub browser: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set configuration values
    Set(ConfigSetArgs),
    /// Show current configuration
    Show,
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Azure AD tenant ID
    #[arg(long)]
    pub tenant_id: Option<String>,
    /// Azure AD client ID
    #[arg(long)]
    pub client_id: Option<String>,
    /// Comma-separated OAuth scopes
    #[arg(long, value_delimiter = ',')]
    pub scopes: Option<Vec<String>>,
    /// Where to keep tokens: file or keyring
    #[arg(long)]
    pub token_storage: Option<TokenStorage>,
}

/// `--json` / `--markdown`, accepted by every reading command.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
    /// Convert HTML bodies to Markdown (no-op for commands without bodies)
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct PageArgs {
    /// Limit number of results
    #[arg(long, default_value_t = 0)]
    pub top: u32,
    /// Pagination token from a previous response
    #[arg(long)]
    pub page_token: Option<PageToken>,
}

#[derive(Debug, Subcommand)]
pub enum MailCommand {
    /// List messages
    List(MailListArgs),
    /// Show one message
    Get {
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Send a message
    Send(MailSendArgs),
}

#[derive(Debug, Args)]
pub struct MailListArgs {
    /// Folder ID or well-known name (inbox, sentitems, ...)
    #[arg(long)]
    pub folder_id: Option<String>,
    #[command(flatten)]
    pub page: PageArgs,
    /// Skip the first N messages (offset-based pagination)
    #[arg(long, default_value_t = 0)]
    pub skip: u64,
    /// OData $filter expression
    #[arg(long)]
    pub filter: Option<String>,
    /// OData $orderby expression, e.g. "receivedDateTime desc"
    #[arg(long)]
    pub order_by: Option<String>,
    /// Only messages received at or after this time (natural language accepted)
    #[arg(long)]
    pub since: Option<String>,
    /// Only messages received at or before this time
    #[arg(long)]
    pub until: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct MailSendArgs {
    /// Email subject
    #[arg(long)]
    pub subject: String,
    /// Recipient address(es), comma-separated
    #[arg(long)]
    pub to: String,
    /// Body content
    #[arg(long)]
    pub body: String,
    /// Body content type
    #[arg(long, default_value = "Text", value_parser = ["Text", "HTML"], ignore_case = true)]
    pub body_type: String,
    /// CC address(es), comma-separated
    #[arg(long)]
    pub cc: Option<String>,
    /// BCC address(es), comma-separated
    #[arg(long)]
    pub bcc: Option<String>,
    /// Save the message to Sent Items
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub save_to_sent_items: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Subcommand)]
pub enum CalendarCommand {
    /// List events in a time range (recurrences expanded)
    List(CalendarListArgs),
    /// Show one event
    Get(CalendarGetArgs),
    /// List available calendars
    Calendars {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List raw events, including series masters
    Events {
        /// Calendar to read (default: primary)
        #[arg(long)]
        calendar_id: Option<String>,
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Accept, decline or tentatively accept invitations
    #[command(
        override_usage = "go365 calendar respond <EVENT_ID> <accept|decline|tentative>\n       \
                          go365 calendar respond --all <accept|decline|tentative>\n       \
                          go365 calendar respond --ids <IDS> <accept|decline|tentative>"
    )]
    Respond(RespondArgs),
    /// List invitations awaiting a response
    Pending {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check free/busy status for people in your organization
    FreeBusy(FreeBusyArgs),
    /// Find meeting times that suit all attendees
    FindTime(FindTimeArgs),
    /// Create an event
    Create(CreateEventArgs),
}

#[derive(Debug, Args)]
pub struct CalendarListArgs {
    /// Start (default: today; natural language accepted)
    #[arg(long)]
    pub start: Option<String>,
    /// End (default: start + 1 day)
    #[arg(long)]
    pub end: Option<String>,
    /// Days from start; overrides --end
    #[arg(long)]
    pub days: Option<u32>,
    /// Calendar to read (default: primary)
    #[arg(long, conflicts_with = "all_calendars")]
    pub calendar_id: Option<String>,
    /// Merge events from every calendar
    #[arg(long)]
    pub all_calendars: bool,
    #[command(flatten)]
    pub page: PageArgs,
    /// Another user's calendar (email or ID)
    #[arg(long)]
    pub user: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CalendarGetArgs {
    pub event_id: String,
    /// Calendar containing the event (default: primary)
    #[arg(long)]
    pub calendar_id: Option<String>,
    /// Another user's event (email or ID)
    #[arg(long)]
    pub user: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RespondArgs {
    /// Event ID, or the response when --all or --ids is given
    pub first: String,
    /// accept, decline or tentative
    pub response: Option<EventResponse>,
    /// Respond to every pending invitation
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
    /// Comma-separated event IDs
    #[arg(long)]
    pub ids: Option<String>,
    /// Optional message to the organizer
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Debug, Args)]
pub struct FreeBusyArgs {
    /// Email addresses, separate or comma-separated
    #[arg(required = true)]
    pub emails: Vec<String>,
    /// Start (default: now)
    #[arg(long)]
    pub start: Option<String>,
    /// End (default: start + 24 hours)
    #[arg(long)]
    pub end: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct FindTimeArgs {
    /// Comma-separated attendee addresses
    #[arg(long)]
    pub attendees: String,
    /// Meeting duration (30m, 1h, ...)
    #[arg(long, default_value = "30m")]
    pub duration: String,
    /// Search window start (default: tomorrow)
    #[arg(long)]
    pub start: Option<String>,
    /// Search window end (default: start + 7 days)
    #[arg(long)]
    pub end: Option<String>,
    /// Maximum suggestions to return
    #[arg(long, default_value_t = 5)]
    pub max_results: u32,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CreateEventArgs {
    pub subject: String,
    /// Start (natural language accepted)
    #[arg(long)]
    pub start: String,
    /// End
    #[arg(long, conflicts_with = "duration")]
    pub end: Option<String>,
    /// Duration, alternative to --end (default: 30m)
    #[arg(long)]
    pub duration: Option<String>,
    /// Comma-separated attendee addresses
    #[arg(long)]
    pub attendees: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Description or agenda
    #[arg(long)]
    pub body: Option<String>,
    /// Generate a Teams meeting link
    #[arg(long)]
    pub online: bool,
    #[arg(long)]
    pub all_day: bool,
    /// Target calendar (default: primary)
    #[arg(long)]
    pub calendar_id: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// Show drive owner and quota
    Info {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the items in a folder
    Ls(DriveLsArgs),
}

/// Which drive to read; the signed-in user's by default.
#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Drive ID
    #[arg(long)]
    pub drive_id: Option<String>,
    /// Another user's drive (email or ID)
    #[arg(long)]
    pub user: Option<String>,
    /// A SharePoint site's default drive
    #[arg(long)]
    pub site: Option<String>,
}

impl From<LocationArgs> for DriveLocation {
    fn from(args: LocationArgs) -> Self {
        Self {
            drive_id: args.drive_id,
            user_id: args.user,
            site_id: args.site,
        }
    }
}

#[derive(Debug, Args)]
pub struct DriveLsArgs {
    /// Folder path relative to the drive root
    pub path: Option<String>,
    /// List items shared with you instead
    #[arg(long, conflicts_with = "path")]
    pub shared: bool,
    #[command(flatten)]
    pub location: LocationArgs,
    #[command(flatten)]
    pub page: PageArgs,
    /// OData $orderby expression
    #[arg(long)]
    pub order_by: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}
