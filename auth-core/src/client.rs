//! HTTP client for the remote auth API.
//!
//! Responsibilities:
//! - credential sign-in and registration
//! - single-flight lookup of the current user, reused for a short window
//! - OAuth callback completion
//! - bearer token attachment and global handling of 401 responses
//!
//! A 401 clears the token store and is reported as [`AuthEvent::Unauthorized`]
//! on the channel returned by [`AuthClient::new`]. The session service consumes
//! that channel and decides whether to redirect; the client never navigates.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use shared::api::{
    MessageResponse, OAuthSuccessResponse, SignInRequest, SignInResponse, SignUpRequest,
};
use shared::UserProfile;
use validator::Validate;

use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::navigation::Location;
use crate::token_store::{StoredSession, TokenStore};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};

pub const SIGNIN_PATH: &str = "/auth/signin";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const CURRENT_USER_PATH: &str = "/auth/me";
pub const OAUTH_SUCCESS_PATH: &str = "/oauth2/success";

/// Side effects the client reports instead of acting on them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// An API call came back 401 and the stored session was cleared
    Unauthorized { url: String },
}

pub type AuthEvents = UnboundedReceiver<AuthEvent>;

/// Token and user produced by an OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCompletion {
    pub token: String,
    pub user: UserProfile,
}

type UserFuture = Shared<LocalBoxFuture<'static, AuthResult<UserProfile>>>;

struct CachedFetch {
    id: u64,
    token: String,
    epoch: u64,
    completed_at: Rc<Cell<Option<DateTime<Utc>>>>,
    future: UserFuture,
}

/// Sends requests and applies the global 401 policy.
#[derive(Clone)]
struct Dispatcher {
    transport: Rc<dyn HttpTransport>,
    store: TokenStore,
    events: UnboundedSender<AuthEvent>,
    /// Bumped on every 401 clear; cached lookups from an older epoch are stale
    auth_epoch: Rc<Cell<u64>>,
}

impl Dispatcher {
    async fn send(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let url = request.url.clone();
        let sent_token = request.bearer_token().map(str::to_string);

        tracing::debug!(method = ?request.method, url = %url, "Sending API request");
        let response = self.transport.send(request).await?;

        if response.is_unauthorized() {
            self.on_unauthorized(url, sent_token);
        }

        Ok(response)
    }

    fn on_unauthorized(&self, url: String, sent_token: Option<String>) {
        // A 401 for a token that has since been replaced says nothing about
        // the current session.
        let stored = self.store.token();
        if sent_token.is_some() && sent_token != stored {
            tracing::debug!(url = %url, "Ignoring 401 for a superseded token");
            return;
        }

        tracing::warn!(url = %url, "Received 401, clearing stored session");
        self.store.clear();
        self.auth_epoch.set(self.auth_epoch.get() + 1);
        if self
            .events
            .unbounded_send(AuthEvent::Unauthorized { url })
            .is_err()
        {
            tracing::debug!("No session listener for auth events");
        }
    }
}

struct ClientInner {
    config: ClientConfig,
    dispatcher: Dispatcher,
    clock: Rc<dyn Clock>,
    current_user: RefCell<Option<CachedFetch>>,
    next_fetch_id: Cell<u64>,
}

#[derive(Clone)]
pub struct AuthClient {
    inner: Rc<ClientInner>,
}

impl AuthClient {
    /// Create a client and the receiving end of its event channel.
    pub fn new(
        config: ClientConfig,
        transport: Rc<dyn HttpTransport>,
        store: TokenStore,
        clock: Rc<dyn Clock>,
    ) -> (Self, AuthEvents) {
        let (events, receiver) = mpsc::unbounded();
        let client = Self {
            inner: Rc::new(ClientInner {
                config,
                dispatcher: Dispatcher {
                    transport,
                    store,
                    events,
                    auth_epoch: Rc::new(Cell::new(0)),
                },
                clock,
                current_user: RefCell::new(None),
                next_fetch_id: Cell::new(0),
            }),
        };
        (client, receiver)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    fn store(&self) -> &TokenStore {
        &self.inner.dispatcher.store
    }

    pub fn stored_session(&self) -> StoredSession {
        self.store().read()
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store().token()
    }

    /// Persist a session and drop any cached lookup made for an older token.
    pub fn save_session(&self, user: &UserProfile, token: &str) -> AuthResult<()> {
        self.store().save(user, token)?;
        self.invalidate_current_user();
        Ok(())
    }

    pub fn clear_session(&self) {
        self.store().clear();
        self.invalidate_current_user();
    }

    pub fn invalidate_current_user(&self) {
        self.inner.current_user.replace(None);
    }

    /// URL of the server endpoint that starts an identity-provider login.
    pub fn authorization_url(&self, provider: &str) -> String {
        self.inner.config.endpoint(&format!(
            "/oauth2/authorization/{}",
            urlencoding::encode(provider)
        ))
    }

    /// Attach the stored bearer token, if any.
    fn authorized(&self, request: ApiRequest) -> ApiRequest {
        match self.store().token() {
            Some(token) => request.bearer(&token),
            None => request,
        }
    }

    /// Exchange credentials for a token. The caller persists the session.
    pub async fn sign_in(&self, identifier: &str, secret: &str) -> AuthResult<SignInResponse> {
        let body = SignInRequest {
            username: identifier.trim().to_string(),
            password: secret.to_string(),
        };
        body.validate()?;

        let request = ApiRequest::post(self.inner.config.endpoint(SIGNIN_PATH), &body)?;
        let response = self.inner.dispatcher.send(request).await?;

        match response.status {
            200..=299 => {}
            400 | 401 => {
                tracing::info!(username = %body.username, "Sign-in rejected");
                return Err(AuthError::InvalidCredentials(response.error_message()));
            }
            status => {
                return Err(AuthError::Server {
                    status,
                    message: response.error_message(),
                })
            }
        }

        let signed_in: SignInResponse = response
            .json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        if signed_in.access_token.as_deref().map_or(true, str::is_empty) {
            return Err(AuthError::InvalidResponse(
                "No access token received".to_string(),
            ));
        }

        tracing::info!(username = %body.username, "Sign-in accepted");
        Ok(signed_in)
    }

    /// Register an account; server rejections pass through unchanged.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        secret: &str,
    ) -> AuthResult<MessageResponse> {
        let body = SignUpRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: secret.to_string(),
        };
        body.validate()?;

        let request = ApiRequest::post(self.inner.config.endpoint(SIGNUP_PATH), &body)?;
        let response = self.inner.dispatcher.send(request).await?;

        if !response.is_success() {
            return Err(AuthError::Server {
                status: response.status,
                message: response.error_message(),
            });
        }

        Ok(response.json().unwrap_or_else(|_| MessageResponse {
            message: "User registered successfully!".to_string(),
        }))
    }

    /// Current user for the stored token.
    ///
    /// Concurrent callers share one request, and a completed result is
    /// reused for `current_user_ttl`. Any failure clears the stored session
    /// and is reported as [`AuthError::SessionExpired`].
    pub async fn fetch_current_user(&self) -> AuthResult<UserProfile> {
        let (id, future) = self.current_user_fetch()?;
        let result = future.await;

        if result.is_err() {
            let mut cache = self.inner.current_user.borrow_mut();
            if cache.as_ref().map(|cached| cached.id) == Some(id) {
                *cache = None;
            }
        }

        result
    }

    fn current_user_fetch(&self) -> AuthResult<(u64, UserFuture)> {
        let Some(token) = self.store().token() else {
            self.clear_session();
            return Err(AuthError::NotAuthenticated);
        };

        let now = self.inner.clock.now();
        let ttl = self.inner.config.current_user_ttl();
        let epoch = self.inner.dispatcher.auth_epoch.get();

        if let Some(cached) = self.inner.current_user.borrow().as_ref() {
            let fresh = match cached.completed_at.get() {
                None => true,
                Some(completed) => now - completed < ttl,
            };
            if fresh && cached.epoch == epoch && cached.token == token {
                tracing::debug!(fetch = cached.id, "Reusing current-user request");
                return Ok((cached.id, cached.future.clone()));
            }
        }

        let id = self.inner.next_fetch_id.get() + 1;
        self.inner.next_fetch_id.set(id);

        let completed_at = Rc::new(Cell::new(None));
        let future = lookup_user(
            self.inner.dispatcher.clone(),
            self.inner.config.endpoint(CURRENT_USER_PATH),
            token.clone(),
            self.inner.clock.clone(),
            completed_at.clone(),
        )
        .boxed_local()
        .shared();

        self.inner.current_user.replace(Some(CachedFetch {
            id,
            token,
            epoch,
            completed_at,
            future: future.clone(),
        }));

        Ok((id, future))
    }

    /// Resolve the token and user an OAuth redirect delivered.
    ///
    /// The token comes from the `token` query parameter; `email`/`name`
    /// hints describe the user. Without hints the profile is fetched with
    /// that token. Without a token the server's own OAuth session is
    /// resolved through `/oauth2/success`.
    pub async fn complete_oauth_callback(&self, location: &Location) -> AuthResult<OAuthCompletion> {
        if let Some(reason) = location.query_param("error").filter(|e| !e.is_empty()) {
            return Err(AuthError::oauth(reason));
        }

        let token = location
            .query_param("token")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => {
                let hinted = location
                    .query_param("email")
                    .filter(|email| !email.is_empty())
                    .map(|email| {
                        UserProfile::from_hints(&email, location.query_param("name").as_deref())
                    });

                let user = match hinted {
                    Some(user) => user,
                    None => self.profile_for(&token).await.map_err(|err| {
                        tracing::warn!(error = %err, "Could not load profile for OAuth token");
                        AuthError::oauth("Failed to fetch user data")
                    })?,
                };

                Ok(OAuthCompletion { token, user })
            }
            None => self.resolve_server_oauth_session().await,
        }
    }

    async fn profile_for(&self, token: &str) -> AuthResult<UserProfile> {
        let request = ApiRequest::get(self.inner.config.endpoint(CURRENT_USER_PATH)).bearer(token);
        let response = self.inner.dispatcher.send(request).await?;
        if !response.is_success() {
            return Err(AuthError::Server {
                status: response.status,
                message: response.error_message(),
            });
        }
        response
            .json()
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    async fn resolve_server_oauth_session(&self) -> AuthResult<OAuthCompletion> {
        let request = self.authorized(ApiRequest::get(
            self.inner.config.endpoint(OAUTH_SUCCESS_PATH),
        ));
        let response = self
            .inner
            .dispatcher
            .send(request)
            .await
            .map_err(|err| AuthError::oauth(err.user_message()))?;

        if !response.is_success() {
            return Err(AuthError::oauth(response.error_message()));
        }

        let body: OAuthSuccessResponse = response
            .json()
            .map_err(|_| AuthError::oauth("Invalid response from server"))?;
        let token = body
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AuthError::oauth("No token received"))?;
        let user = body
            .profile()
            .ok_or_else(|| AuthError::oauth("No user details received"))?;

        Ok(OAuthCompletion { token, user })
    }
}

/// Body of the shared current-user request.
///
/// Store writes are skipped when the stored token changed while the request
/// was in flight, so a late answer never touches a newer session.
async fn lookup_user(
    dispatcher: Dispatcher,
    url: String,
    token: String,
    clock: Rc<dyn Clock>,
    completed_at: Rc<Cell<Option<DateTime<Utc>>>>,
) -> AuthResult<UserProfile> {
    let outcome = match dispatcher.send(ApiRequest::get(url).bearer(&token)).await {
        Ok(response) if response.is_success() => response
            .json::<UserProfile>()
            .map_err(|e| AuthError::InvalidResponse(e.to_string())),
        Ok(response) => Err(AuthError::Server {
            status: response.status,
            message: response.error_message(),
        }),
        Err(err) => Err(err),
    };
    completed_at.set(Some(clock.now()));

    let still_current = dispatcher.store.token().as_deref() == Some(token.as_str());
    match outcome {
        Ok(user) => {
            if still_current {
                if let Err(err) = dispatcher.store.save_user(&user) {
                    tracing::error!(error = %err, "Failed to refresh stored user profile");
                }
            }
            Ok(user)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Current user lookup failed");
            if still_current {
                dispatcher.store.clear();
            }
            Err(AuthError::SessionExpired)
        }
    }
}
