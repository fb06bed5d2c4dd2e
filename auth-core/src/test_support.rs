//! Test doubles for the client and session tests.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::channel::oneshot;
use shared::UserProfile;

use crate::clock::Clock;
use crate::navigation::{Location, Navigation, Navigator};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

pub fn alice() -> UserProfile {
    UserProfile::new(Some(1), "alice", Some("alice@example.com".to_string()))
}

pub fn json_reply(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError>>;

/// Scripted transport that records every request.
///
/// After [`MockTransport::hold`], the next request waits until the returned
/// sender fires (or is dropped).
pub struct MockTransport {
    responder: Responder,
    requests: RefCell<Vec<ApiRequest>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: RefCell::new(Vec::new()),
            gate: RefCell::new(None),
        }
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(TransportError::Request("connection refused".to_string())))
    }

    pub fn hold(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gate.replace(Some(gate));
        release
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.borrow().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        (self.responder)(&request)
    }
}

pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Navigator that applies every navigation to an in-memory location.
pub struct RecordingNavigator {
    location: RefCell<Location>,
    history: RefCell<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn at(href: &str) -> Self {
        Self {
            location: RefCell::new(Location::parse(href)),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Move without recording, as if the user followed a link.
    pub fn visit(&self, location: Location) {
        self.location.replace(location);
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.history.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn navigate(&self, navigation: Navigation) {
        let mut next = Location::parse(&navigation.to);
        next.from = navigation.from.clone();
        next.error = navigation.error.clone();
        next.notice = navigation.notice.clone();
        self.location.replace(next);
        self.history.borrow_mut().push(navigation);
    }
}
