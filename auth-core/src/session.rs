//! Session state machine.
//!
//! [`SessionService`] is the only writer of authentication state:
//!
//! ```text
//! Unknown -> Checking -> Authenticated | Unauthenticated
//! Authenticated <-> Unauthenticated   (login / logout / 401)
//! ```
//!
//! Every write bumps a generation counter. The initial check only applies its
//! result when no other write happened while it was in flight, so a logout
//! during startup cannot be undone by a late response.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::StreamExt;
use shared::UserProfile;

use crate::client::{AuthClient, AuthEvent, AuthEvents};
use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::guard;
use crate::navigation::{Navigation, Navigator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Unknown,
    Checking,
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    /// Whether the initial check has finished.
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            SessionStatus::Authenticated | SessionStatus::Unauthenticated
        )
    }
}

/// Current belief about who is signed in.
///
/// Fields are private: user and token are present exactly when the status
/// is `Authenticated`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    user: Option<UserProfile>,
    token: Option<String>,
}

impl Session {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn checking() -> Self {
        Self {
            status: SessionStatus::Checking,
            ..Self::default()
        }
    }

    pub fn authenticated(user: UserProfile, token: String) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
            token: Some(token),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            ..Self::default()
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            user: self.user.clone(),
            is_authenticated: self.is_authenticated(),
            loading: !self.status.is_resolved(),
        }
    }
}

/// What views render from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginArgs {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

impl LoginArgs {
    pub fn new(user: UserProfile, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }
}

pub type SessionListener = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

struct SessionInner {
    client: AuthClient,
    navigator: Rc<dyn Navigator>,
    session: RefCell<Session>,
    generation: Cell<u64>,
    check_started: Cell<bool>,
    events: RefCell<Option<AuthEvents>>,
    listeners: RefCell<Vec<(ListenerId, SessionListener)>>,
    next_listener: Cell<u64>,
}

#[derive(Clone)]
pub struct SessionService {
    inner: Rc<SessionInner>,
}

impl SessionService {
    pub fn new(client: AuthClient, events: AuthEvents, navigator: Rc<dyn Navigator>) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                client,
                navigator,
                session: RefCell::new(Session::unknown()),
                generation: Cell::new(0),
                check_started: Cell::new(false),
                events: RefCell::new(Some(events)),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    pub fn client(&self) -> &AuthClient {
        &self.inner.client
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.client.config()
    }

    pub fn navigator(&self) -> Rc<dyn Navigator> {
        self.inner.navigator.clone()
    }

    pub fn navigate(&self, navigation: Navigation) {
        self.inner.navigator.navigate(navigation);
    }

    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.session.borrow().status()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.borrow().snapshot()
    }

    pub fn subscribe(&self, listener: SessionListener) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Replace the session, returning the new generation.
    fn set_session(&self, session: Session) -> u64 {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);

        tracing::debug!(status = ?session.status(), generation, "Session transition");
        let snapshot = session.snapshot();
        *self.inner.session.borrow_mut() = session;

        let listeners: Vec<SessionListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }

        generation
    }

    /// Validate the stored session once per service lifetime.
    ///
    /// A no-op once any login, logout or 401 has resolved the session.
    pub async fn initialize(&self) {
        if self.inner.check_started.replace(true) {
            tracing::debug!("Initial auth check already ran");
            return;
        }
        if self.status().is_resolved() {
            tracing::debug!(status = ?self.status(), "Session already resolved, skipping check");
            return;
        }

        let generation = self.set_session(Session::checking());
        let outcome = self.inner.client.fetch_current_user().await;

        if self.inner.generation.get() != generation {
            tracing::debug!("Initial auth check superseded, dropping its result");
            return;
        }

        let next = match (outcome, self.inner.client.stored_token()) {
            (Ok(user), Some(token)) => {
                tracing::info!(username = %user.username, "Restored stored session");
                Session::authenticated(user, token)
            }
            (Ok(_), None) => Session::unauthenticated(),
            (Err(err), _) => {
                tracing::debug!(error = %err, "No valid stored session");
                Session::unauthenticated()
            }
        };
        self.set_session(next);
        self.reconcile();
    }

    /// Mark the user as signed in with an externally obtained token.
    ///
    /// Both fields must be present and non-empty; otherwise nothing changes.
    pub fn login(&self, args: LoginArgs) -> AuthResult<()> {
        let LoginArgs { user, token } = args;

        let user = user
            .filter(|u| !u.username.trim().is_empty())
            .ok_or_else(|| AuthError::invalid_login("User and token are required"))?;
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::invalid_login("User and token are required"))?;

        self.inner.client.save_session(&user, &token)?;

        tracing::info!(username = %user.username, "Login successful");
        self.set_session(Session::authenticated(user, token));
        self.reconcile();
        Ok(())
    }

    /// Clear everything and go to the login view. Safe to call repeatedly.
    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.inner.client.clear_session();
        self.set_session(Session::unauthenticated());
        self.navigate(Navigation::replace(self.config().login_path.clone()));
    }

    /// Re-check the current location after the router moved.
    pub fn on_navigation(&self) {
        if !self.status().is_resolved() {
            tracing::trace!("Auth not resolved yet, skipping redirect check");
            return;
        }
        self.reconcile();
    }

    fn reconcile(&self) {
        let location = self.inner.navigator.location();
        if let Some(navigation) = guard::reconcile(self.status(), &location, self.config()) {
            tracing::debug!(from = %location.path, to = %navigation.to, "Redirecting");
            self.navigate(navigation);
        }
    }

    pub fn handle_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::Unauthorized { url } => {
                tracing::warn!(url = %url, "Session rejected by server");
                self.inner.client.invalidate_current_user();
                if self.status() != SessionStatus::Unauthenticated {
                    self.set_session(Session::unauthenticated());
                }

                let location = self.inner.navigator.location();
                if !self.config().is_login_view(&location.path) {
                    self.navigate(Navigation::replace(self.config().login_path.clone()));
                }
            }
        }
    }

    /// Apply every queued client event; returns how many were handled.
    pub fn drain_events(&self) -> usize {
        let mut pending = Vec::new();
        if let Some(events) = self.inner.events.borrow_mut().as_mut() {
            while let Ok(event) = events.try_recv() {
                pending.push(event);
            }
        }

        let handled = pending.len();
        for event in pending {
            self.handle_event(event);
        }
        handled
    }

    /// Consume client events until the client is dropped.
    ///
    /// Takes the receiver, so only the first call listens.
    pub async fn listen(&self) {
        let Some(mut events) = self.inner.events.borrow_mut().take() else {
            tracing::debug!("Auth event listener already running");
            return;
        };

        while let Some(event) = events.next().await {
            self.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Location;
    use crate::storage::MemoryStore;
    use crate::test_support::{alice, json_reply, ManualClock, MockTransport, RecordingNavigator};
    use crate::token_store::{StoredSession, TokenStore};

    struct Harness {
        service: SessionService,
        transport: Rc<MockTransport>,
        store: TokenStore,
        navigator: Rc<RecordingNavigator>,
    }

    fn harness(transport: MockTransport, path: &str) -> Harness {
        let transport = Rc::new(transport);
        let store = TokenStore::new(Rc::new(MemoryStore::new()));
        let navigator = Rc::new(RecordingNavigator::at(path));
        let (client, events) = AuthClient::new(
            ClientConfig::default(),
            transport.clone(),
            store.clone(),
            Rc::new(ManualClock::new()),
        );
        Harness {
            service: SessionService::new(client, events, navigator.clone()),
            transport,
            store,
            navigator,
        }
    }

    fn me_ok() -> MockTransport {
        MockTransport::new(|_| {
            Ok(json_reply(
                200,
                serde_json::json!({ "id": 1, "username": "alice", "email": "alice@example.com" }),
            ))
        })
    }

    fn unauthorized() -> MockTransport {
        MockTransport::new(|_| Ok(json_reply(401, serde_json::json!({ "message": "expired" }))))
    }

    #[test]
    fn test_starts_unknown() {
        let h = harness(me_ok(), "/login");
        let snapshot = h.service.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Unknown);
        assert!(snapshot.loading);
        assert!(!snapshot.is_authenticated);
    }

    #[tokio::test]
    async fn test_initialize_restores_stored_session() {
        let h = harness(me_ok(), "/dashboard");
        h.store.save(&alice(), "token-1").expect("should save");

        h.service.initialize().await;

        let session = h.service.session();
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.user(), Some(&alice()));
        assert_eq!(session.token(), Some("token-1"));
        assert!(h.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_without_token_is_unauthenticated() {
        let h = harness(me_ok(), "/dashboard");

        h.service.initialize().await;

        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(
            h.navigator.history(),
            vec![Navigation::replace("/login").with_from(Some("/dashboard".into()))]
        );
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let h = harness(me_ok(), "/dashboard");
        h.store.save(&alice(), "token-1").expect("should save");

        h.service.initialize().await;
        h.service.logout();
        h.service.initialize().await;

        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_checking_while_initial_fetch_in_flight() {
        let h = harness(me_ok(), "/login");
        h.store.save(&alice(), "token-1").expect("should save");
        let release = h.transport.hold();

        futures::join!(h.service.initialize(), async {
            assert_eq!(h.service.status(), SessionStatus::Checking);
            h.service.on_navigation();
            assert!(h.navigator.history().is_empty());
            let _ = release.send(());
        });

        assert_eq!(h.service.status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_logout_during_check_is_not_undone() {
        let h = harness(me_ok(), "/dashboard");
        h.store.save(&alice(), "token-1").expect("should save");
        let release = h.transport.hold();

        futures::join!(h.service.initialize(), async {
            h.service.logout();
            let _ = release.send(());
        });

        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert_eq!(h.store.read(), StoredSession::default());
    }

    #[tokio::test]
    async fn test_initialize_after_login_keeps_session() {
        let h = harness(
            MockTransport::new(|_| Ok(json_reply(500, serde_json::json!({ "message": "boom" })))),
            "/dashboard",
        );
        h.service
            .login(LoginArgs::new(alice(), "fresh"))
            .expect("should log in");

        h.service.initialize().await;

        assert_eq!(h.service.status(), SessionStatus::Authenticated);
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(h.store.session(), Some((alice(), "fresh".to_string())));
    }

    #[tokio::test]
    async fn test_initialize_after_logout_stays_unauthenticated() {
        let h = harness(me_ok(), "/login");
        h.store.save(&alice(), "token-1").expect("should save");
        h.service.logout();

        h.service.initialize().await;

        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[test]
    fn test_login_sets_authenticated_and_persists() {
        let h = harness(me_ok(), "/login");

        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");

        let session = h.service.session();
        assert!(session.is_authenticated());
        assert_eq!(session.user(), Some(&alice()));
        assert_eq!(h.store.session(), Some((alice(), "token-1".to_string())));
    }

    #[test]
    fn test_login_rejects_missing_user_or_token() {
        let h = harness(me_ok(), "/login");
        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");
        let before = h.service.session();

        let missing_user = h.service.login(LoginArgs {
            user: None,
            token: Some("x".into()),
        });
        let missing_token = h.service.login(LoginArgs {
            user: Some(UserProfile::new(Some(2), "bob", None)),
            token: None,
        });
        let blank_token = h.service.login(LoginArgs::new(alice(), "  "));

        for result in [missing_user, missing_token, blank_token] {
            assert!(matches!(result, Err(AuthError::InvalidLoginArgs(_))));
        }
        assert_eq!(h.service.session(), before);
        assert_eq!(h.store.session(), Some((alice(), "token-1".to_string())));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let h = harness(me_ok(), "/dashboard");
        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");

        h.service.logout();
        h.service.logout();

        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert!(h.service.session().user().is_none());
        assert_eq!(h.store.read(), StoredSession::default());
        assert_eq!(h.navigator.location().path, "/login");
    }

    #[tokio::test]
    async fn test_protected_visit_returns_after_login() {
        let h = harness(me_ok(), "/dashboard");
        h.service.initialize().await;

        let location = h.navigator.location();
        assert_eq!(location.path, "/login");
        assert_eq!(location.from.as_deref(), Some("/dashboard"));

        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");

        assert_eq!(
            h.navigator.history().last(),
            Some(&Navigation::replace("/dashboard"))
        );
        assert_eq!(h.navigator.location().path, "/dashboard");
    }

    #[tokio::test]
    async fn test_captured_location_beats_default_home() {
        let h = harness(me_ok(), "/settings");
        h.service.initialize().await;

        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");

        assert_eq!(h.navigator.location().path, "/settings");
    }

    #[tokio::test]
    async fn test_authenticated_visit_to_login_redirects_home() {
        let h = harness(me_ok(), "/dashboard");
        h.store.save(&alice(), "token-1").expect("should save");
        h.service.initialize().await;

        h.navigator.visit(Location::new("/login"));
        h.service.on_navigation();

        assert_eq!(h.navigator.location().path, "/dashboard");
    }

    #[tokio::test]
    async fn test_unauthorized_event_clears_and_redirects() {
        let h = harness(unauthorized(), "/dashboard");
        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");

        let err = h
            .service
            .client()
            .fetch_current_user()
            .await
            .expect_err("should fail");
        assert_eq!(err, AuthError::SessionExpired);

        assert_eq!(h.service.drain_events(), 1);
        assert_eq!(h.service.status(), SessionStatus::Unauthenticated);
        assert_eq!(h.store.read(), StoredSession::default());
        assert_eq!(h.navigator.location().path, "/login");
    }

    #[tokio::test]
    async fn test_unauthorized_on_login_view_does_not_redirect() {
        let h = harness(unauthorized(), "/login/sso");
        h.store.save(&alice(), "token-1").expect("should save");
        h.service
            .client()
            .fetch_current_user()
            .await
            .expect_err("should fail");

        assert_eq!(h.service.drain_events(), 1);
        assert!(h.navigator.history().is_empty());
    }

    #[test]
    fn test_listeners_see_transitions() {
        let h = harness(me_ok(), "/login");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = h.service.subscribe(Rc::new(move |snapshot: &SessionSnapshot| {
            sink.borrow_mut().push(snapshot.status);
        }));

        h.service
            .login(LoginArgs::new(alice(), "token-1"))
            .expect("should log in");
        h.service.unsubscribe(id);
        h.service.logout();

        assert_eq!(*seen.borrow(), vec![SessionStatus::Authenticated]);
    }
}
