//! Builders for event frames used by unit tests.

use crate::types::columns;
use polars::prelude::*;

/// One raw event with every field populated by default.
#[derive(Debug, Clone)]
pub(crate) struct Event {
    user_id: Option<&'static str>,
    session_id: Option<i64>,
    ts: i64,
    page: &'static str,
    status: i64,
    level: Option<&'static str>,
    length: Option<f64>,
    artist: Option<&'static str>,
    song: Option<&'static str>,
    gender: Option<&'static str>,
    registration: Option<i64>,
    location: Option<&'static str>,
    user_agent: Option<&'static str>,
    first_name: Option<&'static str>,
    last_name: Option<&'static str>,
}

impl Event {
    pub(crate) fn new(user_id: &'static str, ts: i64, page: &'static str) -> Self {
        Self {
            user_id: Some(user_id),
            session_id: Some(1),
            ts,
            page,
            status: 200,
            level: Some("free"),
            length: None,
            artist: None,
            song: None,
            gender: Some("F"),
            registration: Some(1_538_173_362_000),
            location: Some("Bakersfield, CA"),
            user_agent: Some("Mozilla/5.0 (Windows NT 6.1) Chrome/37.0.2062.103 Safari/537.36"),
            first_name: Some("Darianna"),
            last_name: Some("Carpenter"),
        }
    }

    pub(crate) fn session(mut self, session_id: i64) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub(crate) fn status(mut self, status: i64) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn level(mut self, level: &'static str) -> Self {
        self.level = Some(level);
        self
    }

    pub(crate) fn missing_level(mut self) -> Self {
        self.level = None;
        self
    }

    pub(crate) fn missing_user_id(mut self) -> Self {
        self.user_id = None;
        self
    }

    pub(crate) fn missing_session(mut self) -> Self {
        self.session_id = None;
        self
    }

    pub(crate) fn length(mut self, length: Option<f64>) -> Self {
        self.length = length;
        self
    }

    pub(crate) fn artist(mut self, artist: Option<&'static str>) -> Self {
        self.artist = artist;
        self
    }

    pub(crate) fn song(mut self, song: Option<&'static str>) -> Self {
        self.song = song;
        self
    }

    pub(crate) fn gender(mut self, gender: Option<&'static str>) -> Self {
        self.gender = gender;
        self
    }

    pub(crate) fn registration(mut self, registration: Option<i64>) -> Self {
        self.registration = registration;
        self
    }

    pub(crate) fn location(mut self, location: Option<&'static str>) -> Self {
        self.location = location;
        self
    }

    pub(crate) fn user_agent(mut self, user_agent: Option<&'static str>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub(crate) fn first_name(mut self, first_name: Option<&'static str>) -> Self {
        self.first_name = first_name;
        self
    }

    pub(crate) fn last_name(mut self, last_name: Option<&'static str>) -> Self {
        self.last_name = last_name;
        self
    }
}

/// Build a raw event frame with canonical column types.
pub(crate) fn event_frame(events: &[Event]) -> DataFrame {
    fn pick<T>(events: &[Event], f: impl Fn(&Event) -> T) -> Vec<T> {
        events.iter().map(f).collect()
    }

    df!(
        columns::USER_ID => pick(events, |e| e.user_id),
        columns::SESSION_ID => pick(events, |e| e.session_id),
        columns::TS => pick(events, |e| e.ts),
        columns::PAGE => pick(events, |e| e.page),
        columns::STATUS => pick(events, |e| e.status),
        columns::LEVEL => pick(events, |e| e.level),
        columns::LENGTH => pick(events, |e| e.length),
        columns::ARTIST => pick(events, |e| e.artist),
        columns::SONG => pick(events, |e| e.song),
        columns::GENDER => pick(events, |e| e.gender),
        columns::REGISTRATION => pick(events, |e| e.registration),
        columns::LOCATION => pick(events, |e| e.location),
        columns::USER_AGENT => pick(events, |e| e.user_agent),
        columns::FIRST_NAME => pick(events, |e| e.first_name),
        columns::LAST_NAME => pick(events, |e| e.last_name),
    )
    .expect("valid event frame")
}
