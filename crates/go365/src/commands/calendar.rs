//! `calendar` subcommands.

use std::io::{self, Write};

use anyhow::{Context as _, Result, anyhow, bail, ensure};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use go365_core::dateparse;
use go365_graph::calendar::{
    Attendee, Calendar, DateTimeTimeZone, FindMeetingTimesResponse, GetScheduleResponse, Location,
};
use go365_graph::mail::ItemBody;
use go365_graph::{
    CalendarViewOptions, Event, EventResponse, FindTimeOptions, GetEventOptions, ListEventsOptions,
    ListResponse,
};
use tracing::{info, warn};

use super::{Session, now};
use crate::cli::{
    CalendarCommand, CalendarGetArgs, CalendarListArgs, CreateEventArgs, FindTimeArgs,
    FreeBusyArgs, OutputArgs, PageArgs, RespondArgs,
};
use crate::output::{self, split_list};

const DEFAULT_MEETING_MINUTES: i64 = 30;
const DEFAULT_MAX_SUGGESTIONS: u32 = 5;

pub async fn run(session: &Session, command: CalendarCommand) -> Result<()> {
    match command {
        CalendarCommand::List(args) => list(session, args).await,
        CalendarCommand::Get(args) => get(session, args).await,
        CalendarCommand::Calendars { output } => calendars(session, output).await,
        CalendarCommand::Events {
            calendar_id,
            page,
            output,
        } => events(session, calendar_id, page, output).await,
        CalendarCommand::Respond(args) => respond(session, args).await,
        CalendarCommand::Pending { output } => pending(session, output).await,
        CalendarCommand::FreeBusy(args) => free_busy(session, args).await,
        CalendarCommand::FindTime(args) => find_time(session, args).await,
        CalendarCommand::Create(args) => create(session, args).await,
    }
}

fn parse_date(input: &str, reference: DateTime<FixedOffset>, what: &str) -> Result<DateTime<FixedOffset>> {
    dateparse::parse(input, reference).with_context(|| format!("invalid {what}"))
}

/// Resolves `--start`, `--end` and `--days` into a window.
///
/// `--days` wins over `--end`; without either the window is one day.
fn list_window(
    args: &CalendarListArgs,
    reference: DateTime<FixedOffset>,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start = match args.start.as_deref() {
        Some(s) => parse_date(s, reference, "start date")?,
        None => dateparse::start_of_day(reference),
    };
    let end = match (args.days.filter(|d| *d > 0), args.end.as_deref()) {
        (Some(days), _) => dateparse::add_days(start, i64::from(days)),
        (None, Some(e)) => parse_date(e, reference, "end date")?,
        (None, None) => dateparse::add_days(start, 1),
    };
    Ok((start, end))
}

async fn list(session: &Session, args: CalendarListArgs) -> Result<()> {
    let (start, end) = list_window(&args, now())?;
    let options = CalendarViewOptions {
        start: dateparse::format_iso8601(start),
        end: dateparse::format_iso8601(end),
        calendar_id: args.calendar_id,
        all_calendars: args.all_calendars,
        top: args.page.top,
        page_token: args.page.page_token,
        user_id: args.user,
    };

    let client = session.graph().await?;
    let page = if options.all_calendars {
        let fan_out = client
            .calendar_view_all(&options)
            .await
            .context("failed to list events")?;
        for (source, error) in &fan_out.failed {
            warn!(calendar = %source.display_name, %error, "skipped calendar");
        }
        fan_out.into_response()
    } else {
        client
            .calendar_view(&options)
            .await
            .context("failed to list events")?
    };

    if args.output.json {
        output::print_json(&page)?;
    } else {
        render_events(&mut io::stdout().lock(), &page, true)?;
    }
    Ok(())
}

async fn events(
    session: &Session,
    calendar_id: Option<String>,
    page: PageArgs,
    opts: OutputArgs,
) -> Result<()> {
    let options = ListEventsOptions {
        calendar_id,
        top: page.top,
        page_token: page.page_token,
        filter: None,
    };
    let client = session.graph().await?;
    let page = client
        .list_events(&options)
        .await
        .context("failed to list events")?;

    if opts.json {
        output::print_json(&page)?;
    } else {
        render_events(&mut io::stdout().lock(), &page, false)?;
    }
    Ok(())
}

fn render_events<W: Write>(out: &mut W, page: &ListResponse<Event>, detailed: bool) -> io::Result<()> {
    if page.items().is_empty() {
        return writeln!(out, "No events found");
    }
    for event in page.items() {
        writeln!(out, "ID: {}", event.id.as_deref().unwrap_or_default())?;
        writeln!(out, "Subject: {}", event.subject.as_deref().unwrap_or_default())?;
        if let Some(start) = &event.start {
            writeln!(out, "Start: {}", start.date_time)?;
        }
        if let Some(end) = &event.end {
            writeln!(out, "End: {}", end.date_time)?;
        }
        if detailed {
            render_event_details(out, event)?;
            if let Some(calendar) = event.calendar_id.as_deref().filter(|c| !c.is_empty()) {
                writeln!(out, "Calendar: {calendar}")?;
            }
        }
        writeln!(out, "---")?;
    }
    output::next_page_hint(out, page.next_token())
}

/// All-day flag, location, organizer and response, whichever are present.
fn render_event_details<W: Write>(out: &mut W, event: &Event) -> io::Result<()> {
    if event.is_all_day {
        writeln!(out, "AllDay: true")?;
    }
    if let Some(location) = event
        .location
        .as_ref()
        .and_then(|l| l.display_name.as_deref())
        .filter(|l| !l.is_empty())
    {
        writeln!(out, "Location: {location}")?;
    }
    if let Some(organizer) = event.organizer.as_ref().and_then(|o| o.email_address.as_ref()) {
        writeln!(
            out,
            "Organizer: {} <{}>",
            organizer.name.as_deref().unwrap_or_default(),
            organizer.address.as_deref().unwrap_or_default()
        )?;
    }
    if let Some(response) = response_of(event) {
        writeln!(out, "Response: {response}")?;
    }
    Ok(())
}

fn response_of(event: &Event) -> Option<&str> {
    event
        .response_status
        .as_ref()
        .and_then(|s| s.response.as_deref())
        .filter(|r| !r.is_empty())
}

async fn get(session: &Session, args: CalendarGetArgs) -> Result<()> {
    let client = session.graph().await?;
    let mut event = client
        .get_event(&GetEventOptions {
            event_id: args.event_id,
            calendar_id: args.calendar_id,
            user_id: args.user,
        })
        .await
        .context("failed to get event")?;

    if args.output.markdown {
        output::markdown_body(event.body.as_mut());
    }
    if args.output.json {
        output::print_json(&event)?;
    } else {
        render_event(&mut io::stdout().lock(), &event)?;
    }
    Ok(())
}

fn render_event<W: Write>(out: &mut W, event: &Event) -> io::Result<()> {
    writeln!(out, "ID: {}", event.id.as_deref().unwrap_or_default())?;
    writeln!(out, "Subject: {}", event.subject.as_deref().unwrap_or_default())?;
    if let Some(start) = &event.start {
        writeln!(out, "Start: {} ({})", start.date_time, start.time_zone)?;
    }
    if let Some(end) = &event.end {
        writeln!(out, "End: {} ({})", end.date_time, end.time_zone)?;
    }
    render_event_details(out, event)?;

    if !event.attendees.is_empty() {
        writeln!(out, "\nAttendees:")?;
        for attendee in &event.attendees {
            let Some(email) = &attendee.email_address else {
                continue;
            };
            writeln!(
                out,
                "  - {} <{}> [{}] ({})",
                email.name.as_deref().unwrap_or_default(),
                email.address.as_deref().unwrap_or_default(),
                attendee.attendee_type.as_deref().unwrap_or_default(),
                attendee
                    .status
                    .as_ref()
                    .and_then(|s| s.response.as_deref())
                    .unwrap_or_default()
            )?;
        }
    }
    if let Some(url) = join_url(event) {
        writeln!(out, "\nOnline Meeting: {url}")?;
    }
    if let Some(body) = &event.body {
        if let Some(content) = body.content.as_deref().filter(|c| !c.is_empty()) {
            writeln!(
                out,
                "\nBody ({}):\n{content}",
                body.content_type.as_deref().unwrap_or("Text")
            )?;
        }
    }
    Ok(())
}

fn join_url(event: &Event) -> Option<&str> {
    event
        .online_meeting
        .as_ref()
        .and_then(|m| m.join_url.as_deref())
        .filter(|u| !u.is_empty())
}

async fn calendars(session: &Session, opts: OutputArgs) -> Result<()> {
    let client = session.graph().await?;
    let calendars = client
        .list_calendars()
        .await
        .context("failed to list calendars")?;

    if opts.json {
        output::print_json(&ListResponse::complete(calendars))?;
    } else {
        render_calendars(&mut io::stdout().lock(), &calendars)?;
    }
    Ok(())
}

fn render_calendars<W: Write>(out: &mut W, calendars: &[Calendar]) -> io::Result<()> {
    if calendars.is_empty() {
        return writeln!(out, "No calendars found");
    }
    writeln!(out, "Calendars:")?;
    for (i, calendar) in calendars.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, calendar.name)?;
        writeln!(out, "   ID: {}", calendar.id)?;
        if let Some(owner) = calendar.owner.as_ref().and_then(|o| o.address.as_deref()) {
            writeln!(out, "   Owner: {owner}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Event ids and the answer, from the three accepted argument shapes.
fn respond_targets(args: &RespondArgs) -> Result<(Option<Vec<String>>, EventResponse)> {
    if args.all || args.ids.is_some() {
        ensure!(
            args.response.is_none(),
            "unexpected argument; with --all or --ids give only the response"
        );
        let response = args.first.parse()?;
        let ids = args.ids.as_deref().map(split_list);
        return Ok((ids, response));
    }
    let response = args
        .response
        .ok_or_else(|| anyhow!("usage: calendar respond <event-id> <accept|decline|tentative>"))?;
    Ok((Some(vec![args.first.clone()]), response))
}

async fn respond(session: &Session, args: RespondArgs) -> Result<()> {
    let (ids, response) = respond_targets(&args)?;
    let client = session.graph().await?;

    let ids = match ids {
        Some(ids) => ids,
        None => client
            .pending_invitations()
            .await
            .context("failed to list pending events")?
            .into_items()
            .into_iter()
            .filter_map(|e| e.id)
            .collect(),
    };
    if ids.is_empty() {
        println!("No events to respond to");
        return Ok(());
    }

    let comment = args.message.as_deref();
    for id in &ids {
        match client.respond_to_event(id, response, comment).await {
            Ok(()) => {
                info!(event = %id, %response, "responded");
                println!("Responded '{response}' to event {id}");
            }
            Err(e) => println!("Failed to respond to {id}: {e}"),
        }
    }
    Ok(())
}

async fn pending(session: &Session, opts: OutputArgs) -> Result<()> {
    let client = session.graph().await?;
    let page = client
        .pending_invitations()
        .await
        .context("failed to list events")?;

    if opts.json {
        output::print_json(&page)?;
    } else {
        render_pending(&mut io::stdout().lock(), page.items())?;
    }
    Ok(())
}

fn render_pending<W: Write>(out: &mut W, events: &[Event]) -> io::Result<()> {
    if events.is_empty() {
        return writeln!(out, "No pending invitations");
    }
    writeln!(out, "{} pending invitation(s):\n", events.len())?;
    for (i, event) in events.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, event.subject.as_deref().unwrap_or_default())?;
        writeln!(out, "   ID: {}", event.id.as_deref().unwrap_or_default())?;
        if let Some(start) = &event.start {
            writeln!(out, "   When: {}", start.date_time)?;
        }
        if let Some(from) = event
            .organizer
            .as_ref()
            .and_then(|o| o.email_address.as_ref())
            .and_then(|e| e.address.as_deref())
        {
            writeln!(out, "   From: {from}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

async fn free_busy(session: &Session, args: FreeBusyArgs) -> Result<()> {
    let emails: Vec<String> = args.emails.iter().flat_map(|a| split_list(a)).collect();
    ensure!(!emails.is_empty(), "at least one email address is required");

    let reference = now();
    let start = match args.start.as_deref() {
        Some(s) => parse_date(s, reference, "start time")?,
        None => reference,
    };
    let end = match args.end.as_deref() {
        Some(e) => parse_date(e, reference, "end time")?,
        None => start + Duration::hours(24),
    };

    let client = session.graph().await?;
    let schedule = client
        .get_schedule(
            &emails,
            &dateparse::format_iso8601(start),
            &dateparse::format_iso8601(end),
        )
        .await
        .context("failed to get schedule")?;

    if args.output.json {
        output::print_json(&schedule)?;
    } else {
        render_schedule(&mut io::stdout().lock(), &schedule)?;
    }
    Ok(())
}

fn render_schedule<W: Write>(out: &mut W, schedule: &GetScheduleResponse) -> io::Result<()> {
    for info in &schedule.value {
        writeln!(out, "{}:", info.schedule_id)?;
        if let Some(error) = &info.error {
            writeln!(out, "  Error: {}", error.message)?;
            continue;
        }
        if info.schedule_items.is_empty() {
            writeln!(out, "  Free")?;
            continue;
        }
        for item in &info.schedule_items {
            writeln!(
                out,
                "  {}: {} - {}",
                capitalize(&item.status),
                item.start.date_time,
                item.end.date_time
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

async fn find_time(session: &Session, args: FindTimeArgs) -> Result<()> {
    let attendees = split_list(&args.attendees);
    ensure!(!attendees.is_empty(), "--attendees is required");

    let duration = dateparse::parse_duration(&args.duration).context("invalid duration")?;
    let duration_minutes = u32::try_from(duration.as_secs() / 60).context("duration too long")?;

    let reference = now();
    let start = match args.start.as_deref() {
        Some(s) => parse_date(s, reference, "start time")?,
        None => reference + Duration::hours(24),
    };
    let end = match args.end.as_deref() {
        Some(e) => parse_date(e, reference, "end time")?,
        None => dateparse::add_days(start, 7),
    };

    let options = FindTimeOptions {
        attendees,
        duration_minutes,
        start: Some(dateparse::format_iso8601(start)),
        end: Some(dateparse::format_iso8601(end)),
        max_candidates: if args.max_results == 0 {
            DEFAULT_MAX_SUGGESTIONS
        } else {
            args.max_results
        },
        is_organizer_optional: false,
    };

    let client = session.graph().await?;
    let suggestions = client
        .find_meeting_times(&options)
        .await
        .context("failed to find meeting times")?;

    if args.output.json {
        output::print_json(&suggestions)?;
    } else {
        render_suggestions(&mut io::stdout().lock(), &suggestions, duration_minutes)?;
    }
    Ok(())
}

fn render_suggestions<W: Write>(
    out: &mut W,
    response: &FindMeetingTimesResponse,
    duration_minutes: u32,
) -> io::Result<()> {
    if response.suggestions.is_empty() {
        writeln!(out, "No available times found")?;
        if let Some(reason) = response.empty_suggestions_reason.as_deref().filter(|r| !r.is_empty()) {
            writeln!(out, "Reason: {reason}")?;
        }
        return Ok(());
    }

    writeln!(
        out,
        "Found {} available slots for {duration_minutes}m meeting:\n",
        response.suggestions.len()
    )?;
    for (i, suggestion) in response.suggestions.iter().enumerate() {
        let Some(slot) = &suggestion.meeting_time_slot else {
            continue;
        };
        writeln!(out, "{}. {} - {}", i + 1, slot.start.date_time, slot.end.date_time)?;
        for availability in &suggestion.attendee_availability {
            let address = availability
                .attendee
                .as_ref()
                .and_then(|a| a.email_address.as_ref())
                .and_then(|e| e.address.as_deref());
            if let Some(address) = address {
                writeln!(out, "   {address}: {}", availability.availability)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Graph local-time form, always sent with the UTC zone.
fn graph_time(t: DateTime<Utc>) -> DateTimeTimeZone {
    DateTimeTimeZone::utc(t.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn build_event(args: &CreateEventArgs, reference: DateTime<FixedOffset>) -> Result<Event> {
    let start = parse_date(&args.start, reference, "start time")?;
    let end = match (args.end.as_deref(), args.duration.as_deref()) {
        (Some(_), Some(_)) => bail!("--end and --duration are mutually exclusive"),
        (Some(e), None) => parse_date(e, reference, "end time")?,
        (None, Some(d)) => {
            let d = dateparse::parse_duration(d).context("invalid duration")?;
            start + Duration::from_std(d).context("duration too long")?
        }
        (None, None) => start + Duration::minutes(DEFAULT_MEETING_MINUTES),
    };
    ensure!(end > start, "end time must be after start time");

    let (start, end) = if args.all_day {
        let first = start.date_naive();
        let last = end.date_naive().max(first + Duration::days(1));
        (
            first.and_time(NaiveTime::MIN).and_utc(),
            last.and_time(NaiveTime::MIN).and_utc(),
        )
    } else {
        (start.with_timezone(&Utc), end.with_timezone(&Utc))
    };

    Ok(Event {
        subject: Some(args.subject.clone()),
        start: Some(graph_time(start)),
        end: Some(graph_time(end)),
        is_all_day: args.all_day,
        is_online_meeting: args.online,
        location: args
            .location
            .as_ref()
            .filter(|l| !l.is_empty())
            .map(|l| Location {
                display_name: Some(l.clone()),
            }),
        body: args
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .map(|b| ItemBody::new("Text", b)),
        attendees: args
            .attendees
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(Attendee::required)
            .collect(),
        ..Event::default()
    })
}

async fn create(session: &Session, args: CreateEventArgs) -> Result<()> {
    let event = build_event(&args, now())?;
    let client = session.graph().await?;
    let created = client
        .create_event(&event, args.calendar_id.as_deref())
        .await
        .context("failed to create event")?;

    if args.output.json {
        output::print_json(&created)?;
    } else {
        render_created(&mut io::stdout().lock(), &created)?;
    }
    Ok(())
}

fn render_created<W: Write>(out: &mut W, event: &Event) -> io::Result<()> {
    writeln!(out, "Created event: {}", event.subject.as_deref().unwrap_or_default())?;
    writeln!(out, "ID: {}", event.id.as_deref().unwrap_or_default())?;
    if let Some(start) = &event.start {
        writeln!(out, "Start: {}", start.date_time)?;
    }
    if let Some(end) = &event.end {
        writeln!(out, "End: {}", end.date_time)?;
    }
    if let Some(url) = join_url(event) {
        writeln!(out, "Teams Link: {url}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use go365_graph::calendar::{ResponseStatus, ScheduleError, ScheduleInfo, ScheduleItem};
    use go365_graph::mail::{EmailAddress, Recipient};

    /// Wednesday 2025-01-15 10:00 UTC.
    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, 10, 0, 0)
            .unwrap()
    }

    fn list_args() -> CalendarListArgs {
        CalendarListArgs {
            start: None,
            end: None,
            days: None,
            calendar_id: None,
            all_calendars: false,
            page: PageArgs::default(),
            user: None,
            output: OutputArgs::default(),
        }
    }

    fn create_args(start: &str) -> CreateEventArgs {
        CreateEventArgs {
            subject: "Standup".into(),
            start: start.into(),
            end: None,
            duration: None,
            attendees: None,
            location: None,
            body: None,
            online: false,
            all_day: false,
            calendar_id: None,
            output: OutputArgs::default(),
        }
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_default_window_is_today() {
        let (start, end) = list_window(&list_args(), reference()).unwrap();
        assert_eq!(dateparse::format_iso8601(start), "2025-01-15T00:00:00Z");
        assert_eq!(dateparse::format_iso8601(end), "2025-01-16T00:00:00Z");
    }

    #[test]
    fn test_days_override_end() {
        let args = CalendarListArgs {
            start: Some("2025-01-20".into()),
            end: Some("2025-02-01".into()),
            days: Some(3),
            ..list_args()
        };
        let (start, end) = list_window(&args, reference()).unwrap();
        assert_eq!(dateparse::format_iso8601(start), "2025-01-20T00:00:00Z");
        assert_eq!(dateparse::format_iso8601(end), "2025-01-23T00:00:00Z");

        let args = CalendarListArgs {
            days: Some(0),
            ..args
        };
        let (_, end) = list_window(&args, reference()).unwrap();
        assert_eq!(dateparse::format_iso8601(end), "2025-02-01T00:00:00Z");
    }

    #[test]
    fn test_invalid_start_is_reported() {
        let args = CalendarListArgs {
            start: Some("whenever".into()),
            ..list_args()
        };
        let err = list_window(&args, reference()).unwrap_err();
        assert_eq!(err.to_string(), "invalid start date");
    }

    #[test]
    fn test_render_events_detailed() {
        let event = Event {
            id: Some("e1".into()),
            subject: Some("Planning".into()),
            start: Some(DateTimeTimeZone::utc("2025-01-15T09:00:00.0000000")),
            end: Some(DateTimeTimeZone::utc("2025-01-15T10:00:00.0000000")),
            location: Some(Location {
                display_name: Some("Room 1".into()),
            }),
            organizer: Some(Recipient {
                email_address: Some(EmailAddress {
                    name: Some("Ada".into()),
                    address: Some("ada@example.com".into()),
                }),
            }),
            response_status: Some(ResponseStatus {
                response: Some("accepted".into()),
                time: None,
            }),
            calendar_id: Some("cal-1".into()),
            ..Event::default()
        };
        let page = ListResponse::complete(vec![event]);
        assert_eq!(
            render(|w| render_events(w, &page, true)),
            "ID: e1\nSubject: Planning\nStart: 2025-01-15T09:00:00.0000000\n\
             End: 2025-01-15T10:00:00.0000000\nLocation: Room 1\n\
             Organizer: Ada <ada@example.com>\nResponse: accepted\nCalendar: cal-1\n---\n"
        );
        assert!(!render(|w| render_events(w, &page, false)).contains("Location"));
    }

    #[test]
    fn test_render_events_hint() {
        let page = ListResponse::normalize(
            vec![Event::default()],
            Some("https://graph.microsoft.com/v1.0/me/events?$skiptoken=n2"),
        );
        assert!(render(|w| render_events(w, &page, false)).ends_with("\nNext page: --page-token n2\n"));
        assert_eq!(
            render(|w| render_events(w, &ListResponse::default(), true)),
            "No events found\n"
        );
    }

    #[test]
    fn test_respond_targets() {
        let single = RespondArgs {
            first: "evt-1".into(),
            response: Some(EventResponse::Tentative),
            all: false,
            ids: None,
            message: None,
        };
        let (ids, response) = respond_targets(&single).unwrap();
        assert_eq!(ids.unwrap(), ["evt-1"]);
        assert_eq!(response, EventResponse::Tentative);

        let listed = RespondArgs {
            first: "accept".into(),
            response: None,
            ids: Some("a, b,,c".into()),
            ..single
        };
        let (ids, response) = respond_targets(&listed).unwrap();
        assert_eq!(ids.unwrap(), ["a", "b", "c"]);
        assert_eq!(response, EventResponse::Accept);

        let all = RespondArgs {
            first: "decline".into(),
            ids: None,
            all: true,
            ..listed
        };
        let (ids, response) = respond_targets(&all).unwrap();
        assert!(ids.is_none());
        assert_eq!(response, EventResponse::Decline);
    }

    #[test]
    fn test_respond_targets_errors() {
        let missing = RespondArgs {
            first: "evt-1".into(),
            response: None,
            all: false,
            ids: None,
            message: None,
        };
        assert!(respond_targets(&missing).is_err());

        let bad = RespondArgs {
            first: "maybe".into(),
            all: true,
            ..missing
        };
        assert!(respond_targets(&bad).is_err());
    }

    #[test]
    fn test_render_schedule() {
        let schedule = GetScheduleResponse {
            value: vec![
                ScheduleInfo {
                    schedule_id: "ada@example.com".into(),
                    schedule_items: vec![ScheduleItem {
                        status: "busy".into(),
                        start: DateTimeTimeZone::utc("2025-01-15T09:00:00"),
                        end: DateTimeTimeZone::utc("2025-01-15T10:00:00"),
                        subject: None,
                    }],
                    ..ScheduleInfo::default()
                },
                ScheduleInfo {
                    schedule_id: "bob@example.com".into(),
                    ..ScheduleInfo::default()
                },
                ScheduleInfo {
                    schedule_id: "nobody@example.com".into(),
                    error: Some(ScheduleError {
                        message: "not found".into(),
                    }),
                    ..ScheduleInfo::default()
                },
            ],
        };
        assert_eq!(
            render(|w| render_schedule(w, &schedule)),
            "ada@example.com:\n  Busy: 2025-01-15T09:00:00 - 2025-01-15T10:00:00\n\n\
             bob@example.com:\n  Free\n\
             nobody@example.com:\n  Error: not found\n"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("tentative"), "Tentative");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_build_event_defaults_to_half_hour() {
        let event = build_event(&create_args("2025-01-20T14:00:00Z"), reference()).unwrap();
        assert_eq!(event.start, Some(DateTimeTimeZone::utc("2025-01-20T14:00:00")));
        assert_eq!(event.end, Some(DateTimeTimeZone::utc("2025-01-20T14:30:00")));
        assert!(event.attendees.is_empty());
        assert!(event.location.is_none());
    }

    #[test]
    fn test_build_event_converts_to_utc() {
        let args = CreateEventArgs {
            duration: Some("1h".into()),
            attendees: Some("a@x.com, b@x.com".into()),
            location: Some("Room 2".into()),
            body: Some("Agenda".into()),
            online: true,
            ..create_args("2025-01-20T09:00:00+13:00")
        };
        let event = build_event(&args, reference()).unwrap();
        assert_eq!(event.start, Some(DateTimeTimeZone::utc("2025-01-19T20:00:00")));
        assert_eq!(event.end, Some(DateTimeTimeZone::utc("2025-01-19T21:00:00")));
        assert_eq!(event.attendees, [Attendee::required("a@x.com"), Attendee::required("b@x.com")]);
        assert!(event.is_online_meeting);
        assert_eq!(event.body, Some(ItemBody::new("Text", "Agenda")));
    }

    #[test]
    fn test_build_event_all_day() {
        let args = CreateEventArgs {
            all_day: true,
            ..create_args("2025-01-20")
        };
        let event = build_event(&args, reference()).unwrap();
        assert_eq!(event.start, Some(DateTimeTimeZone::utc("2025-01-20T00:00:00")));
        assert_eq!(event.end, Some(DateTimeTimeZone::utc("2025-01-21T00:00:00")));
        assert!(event.is_all_day);
    }

    #[test]
    fn test_build_event_rejects_bad_ranges() {
        let args = CreateEventArgs {
            end: Some("2025-01-20T13:00:00Z".into()),
            duration: Some("1h".into()),
            ..create_args("2025-01-20T14:00:00Z")
        };
        assert!(build_event(&args, reference()).is_err());

        let args = CreateEventArgs {
            end: Some("2025-01-20T13:00:00Z".into()),
            ..create_args("2025-01-20T14:00:00Z")
        };
        assert!(build_event(&args, reference()).is_err());
    }

    #[test]
    fn test_render_suggestions_empty() {
        let response = FindMeetingTimesResponse {
            suggestions: Vec::new(),
            empty_suggestions_reason: Some("AttendeesUnavailable".into()),
        };
        assert_eq!(
            render(|w| render_suggestions(w, &response, 30)),
            "No available times found\nReason: AttendeesUnavailable\n"
        );
    }

    #[test]
    fn test_render_pending() {
        let event = Event {
            id: Some("e9".into()),
            subject: Some("Review".into()),
            start: Some(DateTimeTimeZone::utc("2025-01-16T11:00:00")),
            organizer: Some(Recipient::new("lead@example.com")),
            ..Event::default()
        };
        assert_eq!(
            render(|w| render_pending(w, &[event])),
            "1 pending invitation(s):\n\n1. Review\n   ID: e9\n   When: 2025-01-16T11:00:00\n   From: lead@example.com\n\n"
        );
    }

    #[test]
    fn test_render_calendars() {
        let calendars = [Calendar {
            id: "c1".into(),
            name: "Work".into(),
            owner: Some(EmailAddress {
                name: None,
                address: Some("ada@example.com".into()),
            }),
        }];
        assert_eq!(
            render(|w| render_calendars(w, &calendars)),
            "Calendars:\n1. Work\n   ID: c1\n   Owner: ada@example.com\n\n"
        );
    }
}
