//! Calendars, events, scheduling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::client::{GraphClient, segment};
use crate::error::{Error, Result};
use crate::mail::{EmailAddress, ItemBody, Recipient};
use crate::pagination::aggregate::{self, FanOut, Source, SourceCollection, SourceTagged};
use crate::pagination::{ListRequest, ListResponse, PageToken};

/// OData filter matching invitations the user has not answered.
pub const PENDING_INVITATIONS_FILTER: &str =
    "responseStatus/response eq 'notResponded' or responseStatus/response eq 'none'";

/// Granularity of the `availabilityView` string returned by `getSchedule`.
pub const AVAILABILITY_INTERVAL_MINUTES: u32 = 30;

/// A calendar event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTimeTimeZone>,
    /// End time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTimeTimeZone>,
    /// All-day flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_all_day: bool,
    /// Where the event takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Recipient>,
    /// Invitees.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    /// The signed-in user's response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ItemBody>,
    /// Join details for online meetings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_meeting: Option<OnlineMeetingInfo>,
    /// Whether this is an online (Teams) meeting.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_online_meeting: bool,
    /// Link that opens the event in Outlook on the web.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,
    /// Calendar the event came from; only set in all-calendars views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

impl SourceTagged for Event {
    fn tag_source(&mut self, source_id: &str) {
        self.calendar_id = Some(source_id.to_string());
    }
}

/// Date-time with an explicit time zone name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    /// Local date-time, `YYYY-MM-DDTHH:MM:SS[.fffffff]`.
    #[serde(default)]
    pub date_time: String,
    /// Windows or IANA zone name.
    #[serde(default)]
    pub time_zone: String,
}

impl DateTimeTimeZone {
    /// Creates a date-time in the given zone.
    #[must_use]
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: time_zone.into(),
        }
    }

    /// A UTC date-time.
    #[must_use]
    pub fn utc(date_time: impl Into<String>) -> Self {
        Self::new(date_time, "UTC")
    }
}

/// Event location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Location name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Meeting attendee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Attendee address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<EmailAddress>,
    /// Attendee's response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
    /// `required`, `optional` or `resource`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub attendee_type: Option<String>,
}

impl Attendee {
    /// A required attendee.
    #[must_use]
    pub fn required(address: impl Into<String>) -> Self {
        Self {
            email_address: Some(EmailAddress {
                name: None,
                address: Some(address.into()),
            }),
            status: None,
            attendee_type: Some("required".to_string()),
        }
    }
}

/// Response to a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// `none`, `organizer`, `accepted`, `tentativelyAccepted`, `declined`,
    /// `notResponded`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// When the response was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Online meeting details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineMeetingInfo {
    /// Join link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_url: Option<String>,
}

/// A calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Calendar identifier.
    #[serde(default)]
    pub id: String,
    /// Calendar name.
    #[serde(default)]
    pub name: String,
    /// Owner of the calendar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<EmailAddress>,
}

/// A slot proposed by `findMeetingTimes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTimeSuggestion {
    /// Likelihood that everyone can attend, 0-100.
    #[serde(default)]
    pub confidence: f64,
    /// The proposed slot.
    #[serde(default)]
    pub meeting_time_slot: Option<TimeSlot>,
    /// Availability per attendee.
    #[serde(default)]
    pub attendee_availability: Vec<AttendeeAvailability>,
}

/// Start and end of a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot start.
    pub start: DateTimeTimeZone,
    /// Slot end.
    pub end: DateTimeTimeZone,
}

/// One attendee's availability for a suggested slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeAvailability {
    /// The attendee.
    #[serde(default)]
    pub attendee: Option<Recipient>,
    /// `free`, `tentative`, `busy`, `oof`, `workingElsewhere` or `unknown`.
    #[serde(default)]
    pub availability: String,
}

/// Response of `findMeetingTimes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMeetingTimesResponse {
    /// Suggested slots, best first.
    #[serde(default, rename = "meetingTimeSuggestions")]
    pub suggestions: Vec<MeetingTimeSuggestion>,
    /// Why no slot was suggested, if none was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_suggestions_reason: Option<String>,
}

/// A busy block in a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// `free`, `tentative`, `busy`, `oof`, `workingElsewhere` or `unknown`.
    #[serde(default)]
    pub status: String,
    /// Block start.
    pub start: DateTimeTimeZone,
    /// Block end.
    pub end: DateTimeTimeZone,
    /// Subject, when the caller may see it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Free/busy information for one mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInfo {
    /// Mailbox address.
    #[serde(default)]
    pub schedule_id: String,
    /// One digit per interval: 0 free, 1 tentative, 2 busy, 3 oof, 4 elsewhere.
    #[serde(default)]
    pub availability_view: String,
    /// Busy blocks.
    #[serde(default)]
    pub schedule_items: Vec<ScheduleItem>,
    /// Why the schedule could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ScheduleError>,
}

/// Error for a single mailbox in `getSchedule`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleError {
    /// Error text.
    #[serde(default)]
    pub message: String,
}

/// Response of `getSchedule`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetScheduleResponse {
    /// One entry per requested mailbox.
    #[serde(default)]
    pub value: Vec<ScheduleInfo>,
}

/// Options for [`GraphClient::calendar_view`].
#[derive(Debug, Clone, Default)]
pub struct CalendarViewOptions {
    /// Window start, ISO 8601.
    pub start: String,
    /// Window end, ISO 8601.
    pub end: String,
    /// Calendar to read; default calendar when `None`.
    pub calendar_id: Option<String>,
    /// Merge every calendar of the signed-in user (no paging).
    pub all_calendars: bool,
    /// Page size.
    pub top: u32,
    /// Token from a previous page.
    pub page_token: Option<PageToken>,
    /// Another user's mailbox (UPN or id).
    pub user_id: Option<String>,
}

impl CalendarViewOptions {
    /// Renders the single-calendar request.
    #[must_use]
    pub fn to_request(&self) -> ListRequest {
        let calendar = non_empty(self.calendar_id.as_deref());
        let path = match non_empty(self.user_id.as_deref()) {
            Some(user) => match calendar {
                Some(cal) => format!("/users/{}/calendars/{}/calendarView", segment(user), segment(cal)),
                None => format!("/users/{}/calendarView", segment(user)),
            },
            None => match calendar {
                Some(cal) => format!("/me/calendars/{}/calendarView", segment(cal)),
                None => "/me/calendarView".to_string(),
            },
        };

        ListRequest::new(path)
            .with_param("startDateTime", self.start.as_str())
            .with_param("endDateTime", self.end.as_str())
            .with_limit(self.top)
            .with_page_token(self.page_token.clone())
    }
}

/// Options for [`GraphClient::list_events`].
#[derive(Debug, Clone, Default)]
pub struct ListEventsOptions {
    /// Calendar to read; default calendar when `None`.
    pub calendar_id: Option<String>,
    /// Page size.
    pub top: u32,
    /// Token from a previous page.
    pub page_token: Option<PageToken>,
    /// OData filter.
    pub filter: Option<String>,
}

impl ListEventsOptions {
    /// Renders the request.
    #[must_use]
    pub fn to_request(&self) -> ListRequest {
        let path = match non_empty(self.calendar_id.as_deref()) {
            Some(cal) => format!("/me/calendars/{}/events", segment(cal)),
            None => "/me/events".to_string(),
        };
        let mut request = ListRequest::new(path)
            .with_limit(self.top)
            .with_page_token(self.page_token.clone());
        if let Some(filter) = &self.filter {
            request = request.with_filter(filter.as_str());
        }
        request
    }
}

/// Options for [`GraphClient::get_event`].
#[derive(Debug, Clone, Default)]
pub struct GetEventOptions {
    /// Event identifier.
    pub event_id: String,
    /// Calendar holding the event.
    pub calendar_id: Option<String>,
    /// Another user's mailbox.
    pub user_id: Option<String>,
}

/// Options for [`GraphClient::find_meeting_times`].
#[derive(Debug, Clone, Default)]
pub struct FindTimeOptions {
    /// Required attendees.
    pub attendees: Vec<String>,
    /// Meeting length in minutes.
    pub duration_minutes: u32,
    /// Search window start (UTC, ISO 8601).
    pub start: Option<String>,
    /// Search window end (UTC, ISO 8601).
    pub end: Option<String>,
    /// Maximum number of suggestions.
    pub max_candidates: u32,
    /// Whether the organizer may be left out.
    pub is_organizer_optional: bool,
}

/// Answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// Accept.
    Accept,
    /// Decline.
    Decline,
    /// Tentatively accept.
    Tentative,
}

impl EventResponse {
    /// Graph action segment for this response.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Tentative => "tentativelyAccept",
        }
    }
}

impl fmt::Display for EventResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Tentative => "tentative",
        })
    }
}

impl FromStr for EventResponse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "decline" => Ok(Self::Decline),
            "tentative" => Ok(Self::Tentative),
            other => Err(Error::invalid(format!(
                "invalid response: {other} (must be accept, decline, or tentative)"
            ))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RespondBody<'a> {
    send_response: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest<'a> {
    schedules: &'a [String],
    start_time: DateTimeTimeZone,
    end_time: DateTimeTimeZone,
    availability_view_interval: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindTimesRequest {
    attendees: Vec<Attendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_constraint: Option<TimeConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meeting_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_candidates: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_organizer_optional: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimeConstraint {
    activity_domain: &'static str,
    time_slots: Vec<TimeSlot>,
}

/// The signed-in user's calendars as fan-out sources.
#[derive(Debug, Clone, Copy)]
pub struct CalendarSources<'a> {
    client: &'a GraphClient,
}

impl<'a> CalendarSources<'a> {
    /// Wraps a client.
    #[must_use]
    pub const fn new(client: &'a GraphClient) -> Self {
        Self { client }
    }
}

impl SourceCollection for CalendarSources<'_> {
    type Item = Event;
    type Error = Error;

    async fn list_sources(&self) -> Result<Vec<Source>> {
        let calendars = self.client.list_calendars().await?;
        Ok(calendars
            .into_iter()
            .map(|cal| Source::new(cal.id, cal.name))
            .collect())
    }

    async fn list_source(
        &self,
        source: &Source,
        request: &ListRequest,
    ) -> Result<ListResponse<Event>> {
        let path = format!("/me/calendars/{}/calendarView", segment(&source.id));
        self.client.list(&request.rebased(path)).await
    }
}

impl GraphClient {
    /// Lists events in a time window, expanding recurrences.
    ///
    /// With `all_calendars` every calendar is read from its first page and
    /// the results merged without a continuation token; calendars that fail
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without both window bounds, and any
    /// error from the request (or from listing calendars in merged mode).
    pub async fn calendar_view(&self, options: &CalendarViewOptions) -> Result<ListResponse<Event>> {
        if options.all_calendars {
            let fan_out = self.calendar_view_all(options).await?;
            for (source, error) in &fan_out.failed {
                debug!(calendar = %source.display_name, id = %source.id, %error, "skipping calendar");
            }
            return Ok(fan_out.into_response());
        }

        require_window(options)?;
        self.list(&options.to_request()).await
    }

    /// Merged calendar view over every calendar, keeping per-calendar failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without both window bounds, or the
    /// error from listing calendars.
    pub async fn calendar_view_all(
        &self,
        options: &CalendarViewOptions,
    ) -> Result<FanOut<Event, Error>> {
        require_window(options)?;
        aggregate::aggregate(&CalendarSources::new(self), &options.to_request()).await
    }

    /// Lists all of the signed-in user's calendars, following continuation
    /// links until the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or cannot be decoded.
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        let mut calendars = Vec::new();
        let mut token = None;
        loop {
            let request = ListRequest::new("/me/calendars").with_page_token(token);
            let page: ListResponse<Calendar> = self.list(&request).await?;
            token = page.next_token().cloned();
            calendars.extend(page.into_items());
            if token.is_none() {
                return Ok(calendars);
            }
            debug!(fetched = calendars.len(), "more calendars to fetch");
        }
    }

    /// Lists raw events (series masters rather than occurrences).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn list_events(&self, options: &ListEventsOptions) -> Result<ListResponse<Event>> {
        self.list(&options.to_request()).await
    }

    /// Lists invitations awaiting a response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be decoded.
    pub async fn pending_invitations(&self) -> Result<ListResponse<Event>> {
        self.list_events(&ListEventsOptions {
            filter: Some(PENDING_INVITATIONS_FILTER.to_string()),
            ..ListEventsOptions::default()
        })
        .await
    }

    /// Fetches a single event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty id, otherwise any
    /// request error.
    pub async fn get_event(&self, options: &GetEventOptions) -> Result<Event> {
        if options.event_id.is_empty() {
            return Err(Error::invalid("event ID is required"));
        }
        let event = segment(&options.event_id);
        let calendar = non_empty(options.calendar_id.as_deref());
        let path = match non_empty(options.user_id.as_deref()) {
            Some(user) => match calendar {
                Some(cal) => format!("/users/{}/calendars/{}/events/{event}", segment(user), segment(cal)),
                None => format!("/users/{}/events/{event}", segment(user)),
            },
            None => match calendar {
                Some(cal) => format!("/me/calendars/{}/events/{event}", segment(cal)),
                None => format!("/me/events/{event}"),
            },
        };
        self.get_json(&path).await
    }

    /// Accepts, declines or tentatively accepts an invitation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty id, otherwise any
    /// request error.
    pub async fn respond_to_event(
        &self,
        event_id: &str,
        response: EventResponse,
        comment: Option<&str>,
    ) -> Result<()> {
        if event_id.is_empty() {
            return Err(Error::invalid("event ID is required"));
        }
        let path = format!("/me/events/{}/{}", segment(event_id), response.action());
        let body = RespondBody {
            send_response: true,
            comment: comment.filter(|c| !c.is_empty()),
        };
        self.post(&path, &body).await?;
        Ok(())
    }

    /// Free/busy for the given mailboxes in a UTC window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without addresses or window bounds,
    /// otherwise any request error.
    pub async fn get_schedule(
        &self,
        emails: &[String],
        start: &str,
        end: &str,
    ) -> Result<GetScheduleResponse> {
        if emails.is_empty() {
            return Err(Error::invalid("at least one email is required"));
        }
        if start.is_empty() || end.is_empty() {
            return Err(Error::invalid("start and end date/time are required"));
        }
        let body = ScheduleRequest {
            schedules: emails,
            start_time: DateTimeTimeZone::utc(start),
            end_time: DateTimeTimeZone::utc(end),
            availability_view_interval: AVAILABILITY_INTERVAL_MINUTES,
        };
        self.post_json("/me/calendar/getSchedule", &body).await
    }

    /// Suggests meeting slots that suit the attendees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without attendees, otherwise any
    /// request error.
    pub async fn find_meeting_times(
        &self,
        options: &FindTimeOptions,
    ) -> Result<FindMeetingTimesResponse> {
        if options.attendees.is_empty() {
            return Err(Error::invalid("at least one attendee is required"));
        }

        let time_constraint = match (non_empty(options.start.as_deref()), non_empty(options.end.as_deref())) {
            (Some(start), Some(end)) => Some(TimeConstraint {
                activity_domain: "work",
                time_slots: vec![TimeSlot {
                    start: DateTimeTimeZone::utc(start),
                    end: DateTimeTimeZone::utc(end),
                }],
            }),
            _ => None,
        };

        let body = FindTimesRequest {
            attendees: options.attendees.iter().map(Attendee::required).collect(),
            time_constraint,
            meeting_duration: (options.duration_minutes > 0)
                .then(|| format!("PT{}M", options.duration_minutes)),
            max_candidates: (options.max_candidates > 0).then_some(options.max_candidates),
            is_organizer_optional: options.is_organizer_optional,
        };
        self.post_json("/me/findMeetingTimes", &body).await
    }

    /// Creates an event in the default or the given calendar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without a subject, otherwise any
    /// request error.
    pub async fn create_event(&self, event: &Event, calendar_id: Option<&str>) -> Result<Event> {
        if event.subject.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid("event subject is required"));
        }
        let path = match non_empty(calendar_id) {
            Some(cal) => format!("/me/calendars/{}/events", segment(cal)),
            None => "/me/events".to_string(),
        };
        self.post_json(&path, event).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn require_window(options: &CalendarViewOptions) -> Result<()> {
    if options.start.is_empty() || options.end.is_empty() {
        return Err(Error::invalid("startDateTime and endDateTime are required"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> CalendarViewOptions {
        CalendarViewOptions {
            start: "2024-01-15T00:00:00Z".into(),
            end: "2024-01-16T00:00:00Z".into(),
            ..Default::default()
        }
    }

    fn event_json(id: &str, subject: &str) -> serde_json::Value {
        json!({
            "id": id,
            "subject": subject,
            "start": {"dateTime": "2024-01-15T09:00:00.0000000", "timeZone": "UTC"},
            "end": {"dateTime": "2024-01-15T10:00:00.0000000", "timeZone": "UTC"}
        })
    }

    #[test]
    fn test_calendar_view_paths() {
        let mut options = window();
        assert_eq!(options.to_request().path(), "/me/calendarView");
        options.calendar_id = Some("cal1".into());
        assert_eq!(options.to_request().path(), "/me/calendars/cal1/calendarView");
        options.user_id = Some("bob@contoso.com".into());
        assert_eq!(
            options.to_request().path(),
            "/users/bob@contoso.com/calendars/cal1/calendarView"
        );
        options.calendar_id = None;
        assert_eq!(options.to_request().path(), "/users/bob@contoso.com/calendarView");
    }

    #[test]
    fn test_event_response_parsing() {
        assert_eq!("accept".parse::<EventResponse>().unwrap(), EventResponse::Accept);
        assert_eq!(
            "Tentative".parse::<EventResponse>().unwrap().action(),
            "tentativelyAccept"
        );
        assert!("maybe".parse::<EventResponse>().is_err());
    }

    #[tokio::test]
    async fn test_calendar_view_requires_window() {
        let client = GraphClient::with_base_url("http://127.0.0.1:9", "t");
        let options = CalendarViewOptions {
            start: "2024-01-15T00:00:00Z".into(),
            ..Default::default()
        };
        assert!(matches!(
            client.calendar_view(&options).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_calendar_view_single_with_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/calendarView"))
            .and(query_param("startDateTime", "2024-01-15T00:00:00Z"))
            .and(query_param("endDateTime", "2024-01-16T00:00:00Z"))
            .and(query_param("$top", "1"))
            .and(query_param("$skip", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [event_json("e2", "Standup")],
                "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/calendarView?startDateTime=2024-01-15T00%3A00%3A00Z&%24top=1&%24skip=2"
            })))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let options = CalendarViewOptions {
            top: 1,
            page_token: Some("1".parse().unwrap()),
            ..window()
        };
        let page = client.calendar_view(&options).await.unwrap();
        assert_eq!(page.count(), 1);
        assert_eq!(page.next_token().map(ToString::to_string).as_deref(), Some("2"));
        assert!(page.items()[0].calendar_id.is_none());
    }

    #[tokio::test]
    async fn test_all_calendars_skips_failures_and_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/calendars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": "A", "name": "Calendar"},
                    {"id": "B", "name": "Shared (revoked)"},
                    {"id": "C", "name": "Birthdays"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/calendars/A/calendarView"))
            .and(query_param_is_missing("$skip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [event_json("a1", "Planning"), event_json("a2", "Review")],
                "@odata.nextLink": "https://graph.microsoft.com/v1.0/me/calendars/A/calendarView?%24skip=2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/calendars/B/calendarView"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/calendars/C/calendarView"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"value": [event_json("c1", "Ada")]})),
            )
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let options = CalendarViewOptions {
            all_calendars: true,
            page_token: Some(PageToken::Offset(40)),
            ..window()
        };

        let fan_out = client.calendar_view_all(&options).await.unwrap();
        assert_eq!(fan_out.failed.len(), 1);
        assert_eq!(fan_out.failed[0].0.id, "B");
        assert_eq!(fan_out.failed[0].1.status(), Some(403));

        let page = client.calendar_view(&options).await.unwrap();
        let ids: Vec<_> = page.items().iter().map(|e| e.id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["a1", "a2", "c1"]);
        let calendars: Vec<_> = page
            .items()
            .iter()
            .map(|e| e.calendar_id.as_deref().unwrap())
            .collect();
        assert_eq!(calendars, ["A", "A", "C"]);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_list_calendars_follows_every_page() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/me/calendars"))
            .and(query_param_is_missing("$skiptoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "A", "name": "Calendar"}, {"id": "B", "name": "Birthdays"}],
                "@odata.nextLink": format!("{base}/me/calendars?%24skiptoken=next")
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/calendars"))
            .and(query_param("$skiptoken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "C", "name": "Holidays"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(&base, "t");
        let ids: Vec<String> = client
            .list_calendars()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_all_calendars_enumeration_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/calendars"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let options = CalendarViewOptions {
            all_calendars: true,
            ..window()
        };
        let err = client.calendar_view(&options).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_pending_invitations_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/events"))
            .and(query_param("$filter", PENDING_INVITATIONS_FILTER))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"value": [event_json("p1", "Offsite")]})),
            )
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let page = client.pending_invitations().await.unwrap();
        assert_eq!(page.items()[0].subject.as_deref(), Some("Offsite"));
    }

    #[tokio::test]
    async fn test_get_event_routing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/bob@contoso.com/events/e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_json("e1", "1:1")))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let event = client
            .get_event(&GetEventOptions {
                event_id: "e1".into(),
                calendar_id: None,
                user_id: Some("bob@contoso.com".into()),
            })
            .await
            .unwrap();
        assert_eq!(event.subject.as_deref(), Some("1:1"));
    }

    #[tokio::test]
    async fn test_respond_to_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/events/e1/tentativelyAccept"))
            .and(body_json(json!({"sendResponse": true, "comment": "Might be late"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/me/events/e2/decline"))
            .and(body_json(json!({"sendResponse": true})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        client
            .respond_to_event("e1", EventResponse::Tentative, Some("Might be late"))
            .await
            .unwrap();
        client
            .respond_to_event("e2", EventResponse::Decline, Some(""))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_schedule_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/calendar/getSchedule"))
            .and(body_json(json!({
                "schedules": ["a@contoso.com"],
                "startTime": {"dateTime": "2024-01-15T00:00:00", "timeZone": "UTC"},
                "endTime": {"dateTime": "2024-01-16T00:00:00", "timeZone": "UTC"},
                "availabilityViewInterval": 30
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "scheduleId": "a@contoso.com",
                    "availabilityView": "0022",
                    "scheduleItems": [{
                        "status": "busy",
                        "start": {"dateTime": "2024-01-15T01:00:00.0000000", "timeZone": "UTC"},
                        "end": {"dateTime": "2024-01-15T02:00:00.0000000", "timeZone": "UTC"}
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let schedule = client
            .get_schedule(
                &["a@contoso.com".to_string()],
                "2024-01-15T00:00:00",
                "2024-01-16T00:00:00",
            )
            .await
            .unwrap();
        assert_eq!(schedule.value[0].availability_view, "0022");
        assert_eq!(schedule.value[0].schedule_items[0].status, "busy");
    }

    #[tokio::test]
    async fn test_find_meeting_times_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/findMeetingTimes"))
            .and(body_json(json!({
                "attendees": [{"emailAddress": {"address": "a@contoso.com"}, "type": "required"}],
                "timeConstraint": {
                    "activityDomain": "work",
                    "timeSlots": [{
                        "start": {"dateTime": "2024-01-16T00:00:00", "timeZone": "UTC"},
                        "end": {"dateTime": "2024-01-23T00:00:00", "timeZone": "UTC"}
                    }]
                },
                "meetingDuration": "PT45M",
                "maxCandidates": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "emptySuggestionsReason": "",
                "meetingTimeSuggestions": [{
                    "confidence": 100.0,
                    "meetingTimeSlot": {
                        "start": {"dateTime": "2024-01-16T09:00:00.0000000", "timeZone": "UTC"},
                        "end": {"dateTime": "2024-01-16T09:45:00.0000000", "timeZone": "UTC"}
                    },
                    "attendeeAvailability": [{
                        "attendee": {"emailAddress": {"address": "a@contoso.com"}},
                        "availability": "free"
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let found = client
            .find_meeting_times(&FindTimeOptions {
                attendees: vec!["a@contoso.com".into()],
                duration_minutes: 45,
                start: Some("2024-01-16T00:00:00".into()),
                end: Some("2024-01-23T00:00:00".into()),
                max_candidates: 5,
                is_organizer_optional: false,
            })
            .await
            .unwrap();
        assert_eq!(found.suggestions.len(), 1);
        assert_eq!(found.suggestions[0].attendee_availability[0].availability, "free");
    }

    #[tokio::test]
    async fn test_create_event_requires_subject() {
        let client = GraphClient::with_base_url("http://127.0.0.1:9", "t");
        assert!(matches!(
            client.create_event(&Event::default(), None).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_create_event_in_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/calendars/work/events"))
            .respond_with(ResponseTemplate::new(201).set_body_json(event_json("new", "Kickoff")))
            .mount(&server)
            .await;

        let client = GraphClient::with_base_url(server.uri(), "t");
        let event = Event {
            subject: Some("Kickoff".into()),
            start: Some(DateTimeTimeZone::utc("2024-01-15T09:00:00")),
            end: Some(DateTimeTimeZone::utc("2024-01-15T10:00:00")),
            attendees: vec![Attendee::required("a@contoso.com")],
            ..Default::default()
        };
        let created = client.create_event(&event, Some("work")).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("new"));
    }
}
