//! Session lifecycle management: login, silent refresh, logout.
//!
//! The `SessionManager` owns the access/refresh token pair and is the only
//! writer of the durable session store. It keeps the token fresh with a
//! single scheduled timer, de-duplicates concurrent refresh attempts into
//! one network call, and exposes the authentication state on watch and
//! broadcast channels.
//!
//! State machine: `Anonymous` -> `Authenticated` on login or on a
//! successful refresh of a persisted session; `Authenticated` ->
//! `Refreshing` while a refresh call is outstanding; `Refreshing` ->
//! `Authenticated` on success, `Anonymous` on failure. Explicit logout
//! reaches `Anonymous` synchronously from any state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::endpoints;
use crate::config::Config;
use crate::notify::Notifier;

use super::extract;
use super::session::{SessionData, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Safety buffer subtracted from the token lifetime when scheduling the
/// silent refresh, so the renewal lands before the server-side expiry.
const TOKEN_REFRESH_BUFFER_SECS: i64 = 30;

/// Fallback access-token lifetime when the API omits `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 1800;

/// Capacity of the session event channel.
/// Events are tiny and consumers are expected to keep up; 16 is headroom.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// User-facing fallback when the API gives no usable error message.
const LOGIN_FALLBACK_MESSAGE: &str = "Falha ao entrar. Verifique usuário e senha.";

// ============================================================================
// Types
// ============================================================================

/// Authentication state, readable synchronously and observable via watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
    Refreshing,
}

/// Navigation-level session events. `LoggedIn` signals the redirect to the
/// authenticated landing view, `LoggedOut` the redirect to the login view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
}

/// Definitive outcome of a login attempt. `Rejected` carries the
/// user-facing message already pushed through the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    Rejected(String),
}

type RefreshFuture = Shared<BoxFuture<'static, Option<String>>>;

/// One outstanding refresh attempt. The id ties the slot entry to the
/// attempt that created it, so a stale attempt settling late cannot evict
/// a newer one.
struct InflightRefresh {
    id: u64,
    future: RefreshFuture,
}

/// Owner of the session entity, its refresh schedule, and the single
/// in-flight refresh slot. Constructed once per process via `init`.
pub struct SessionManager {
    weak: Weak<SessionManager>,
    http: Client,
    base_url: String,
    store: SessionStore,
    notifier: Notifier,
    /// In-memory projection of the durable session; the interception
    /// policy reads this, never the store.
    session: RwLock<Option<SessionData>>,
    state_tx: watch::Sender<AuthState>,
    events_tx: broadcast::Sender<SessionEvent>,
    /// At most one live silent-refresh timer.
    refresh_timer: Mutex<Option<JoinHandle<()>>>,
    /// At most one outstanding refresh call; concurrent callers share it.
    inflight: Mutex<Option<InflightRefresh>>,
    /// Monotonic id source for refresh attempts.
    inflight_seq: AtomicU64,
    /// Bumped on logout so a late-arriving refresh result cannot
    /// resurrect a cleared session.
    epoch: AtomicU64,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.base_url)
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

/// Delay before the silent refresh fires for a token that lives
/// `expires_in_secs` seconds: the lifetime minus the safety buffer,
/// clamped at zero (an already-stale token refreshes immediately).
fn refresh_delay(expires_in_secs: i64) -> StdDuration {
    StdDuration::from_secs((expires_in_secs - TOKEN_REFRESH_BUFFER_SECS).max(0) as u64)
}

impl SessionManager {
    /// Create the manager, loading any persisted session from disk.
    /// Call `resume` afterwards (inside a Tokio runtime) to arm the
    /// silent-refresh schedule for a persisted session.
    pub fn init(config: &Config, notifier: Notifier) -> Result<Arc<Self>> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        let store = SessionStore::new(config.cache_dir()?);
        let session = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load persisted session; starting anonymous");
            None
        });

        let initial_state = match &session {
            Some(data) if !data.is_expired() => AuthState::Authenticated,
            _ => AuthState::Anonymous,
        };
        if let Some(ref data) = session {
            debug!(
                expires_in = data.seconds_until_expiry(),
                "Loaded persisted session"
            );
        }

        let (state_tx, _) = watch::channel(initial_state);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Arc::new_cyclic(|weak| Self {
            weak: weak.clone(),
            http,
            base_url: config.base_url(),
            store,
            notifier,
            session: RwLock::new(session),
            state_tx,
            events_tx,
            refresh_timer: Mutex::new(None),
            inflight: Mutex::new(None),
            inflight_seq: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }))
    }

    /// Arm the silent-refresh schedule for a persisted session. A session
    /// already past its buffer refreshes immediately; without a session
    /// this is a no-op.
    pub fn resume(&self) {
        let remaining = self
            .session
            .read()
            .unwrap()
            .as_ref()
            .map(SessionData::seconds_until_expiry);
        if let Some(remaining) = remaining {
            self.schedule_refresh(refresh_delay(remaining));
        }
    }

    /// Cancel the refresh schedule without touching the session, e.g. on
    /// app shutdown. The persisted session is picked up again on the next
    /// `init`/`resume`.
    pub fn shutdown(&self) {
        if let Some(timer) = self.refresh_timer.lock().unwrap().take() {
            timer.abort();
        }
        self.inflight.lock().unwrap().take();
    }

    // ===== Login =====

    /// Authenticate against the API. Always resolves to a definitive
    /// outcome; credential rejections and unrecognizable response shapes
    /// leave the session untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let url = format!("{}{}", self.base_url, endpoints::LOGIN);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Failed to send login request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read login response")?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = extract::error_message(&body)
                .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string());
            warn!(status = %status, "Login rejected");
            self.notifier.error(message.clone());
            return Ok(LoginOutcome::Rejected(message));
        }

        let Some(access_token) = extract::access_token(&body) else {
            warn!("Login response carried no recognizable token field");
            self.notifier.error(LOGIN_FALLBACK_MESSAGE);
            return Ok(LoginOutcome::Rejected(LOGIN_FALLBACK_MESSAGE.to_string()));
        };

        self.install_session(access_token, &body);
        info!("Login succeeded");
        let _ = self.events_tx.send(SessionEvent::LoggedIn);
        Ok(LoginOutcome::Authenticated)
    }

    // ===== Refresh =====

    /// Obtain a fresh access token using the stored refresh token.
    ///
    /// Returns the new access token, or `None` when there is no session to
    /// refresh or the refresh was rejected (in which case the session has
    /// been cleared). Concurrent callers share a single network call and
    /// observe the same resolved value.
    pub async fn refresh_token(&self) -> Option<String> {
        if self.refresh_credential().is_none() {
            debug!("No refresh token stored; skipping refresh");
            return None;
        }

        let pending = {
            let mut inflight = self.inflight.lock().unwrap();
            if let Some(pending) = inflight.as_ref() {
                debug!("Refresh already in flight; awaiting its result");
                pending.future.clone()
            } else {
                let Some(this) = self.weak.upgrade() else {
                    return None;
                };
                let epoch = self.epoch.load(Ordering::SeqCst);
                let id = self.inflight_seq.fetch_add(1, Ordering::SeqCst);
                let fut: RefreshFuture = async move {
                    let result = this.execute_refresh(epoch).await;
                    // Slot clears on settlement, success or failure, but
                    // only while it still belongs to this attempt: a stale
                    // attempt settling after logout and re-login must not
                    // evict the refresh that is now outstanding
                    let mut slot = this.inflight.lock().unwrap();
                    if slot.as_ref().is_some_and(|pending| pending.id == id) {
                        slot.take();
                    }
                    result
                }
                .boxed()
                .shared();
                *inflight = Some(InflightRefresh {
                    id,
                    future: fut.clone(),
                });
                // Drive the call to completion even if every caller is
                // cancelled before it settles
                tokio::spawn(fut.clone());
                fut
            }
        };

        pending.await
    }

    async fn execute_refresh(&self, epoch: u64) -> Option<String> {
        let refresh_token = self.refresh_credential()?;
        self.state_tx.send_replace(AuthState::Refreshing);
        debug!("Refreshing access token");

        let url = format!("{}{}", self.base_url, endpoints::REFRESH);
        let outcome = match self.http.put(&url).bearer_auth(&refresh_token).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(body) => extract::access_token(&body).map(|token| (token, body)),
                    Err(e) => {
                        warn!(error = %e, "Failed to parse refresh response");
                        None
                    }
                }
            }
            Ok(response) => {
                warn!(status = %response.status(), "Token refresh rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                None
            }
        };

        // A logout while the call was in flight invalidates the result
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("Session cleared while refresh was in flight; discarding result");
            return None;
        }

        match outcome {
            Some((token, body)) => {
                self.install_session(token.clone(), &body);
                info!("Access token refreshed");
                Some(token)
            }
            None => {
                // Fail closed: an unusable refresh result ends the session
                self.logout();
                None
            }
        }
    }

    // ===== Logout =====

    /// Clear the session, synchronously and unconditionally: timer and
    /// in-flight slot are dropped, memory and durable storage emptied.
    /// Idempotent.
    pub fn logout(&self) {
        if let Some(timer) = self.refresh_timer.lock().unwrap().take() {
            timer.abort();
        }
        self.inflight.lock().unwrap().take();
        self.epoch.fetch_add(1, Ordering::SeqCst);

        *self.session.write().unwrap() = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }

        self.state_tx.send_replace(AuthState::Anonymous);
        let _ = self.events_tx.send(SessionEvent::LoggedOut);
        info!("Logged out");
    }

    // ===== Accessors =====

    /// Current access token, synchronously; no network or blocking effect.
    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Whether the session currently counts as live. Derived from the
    /// state machine, so an expired persisted session reads as anonymous
    /// until a refresh revives it.
    pub fn is_authenticated(&self) -> bool {
        *self.state_tx.borrow() != AuthState::Anonymous
    }

    pub fn user_photo_url(&self) -> Option<String> {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .and_then(|s| s.user_photo_url.clone())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_credential().is_some()
    }

    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    // ===== Internals =====

    fn refresh_credential(&self) -> Option<String> {
        self.session
            .read()
            .unwrap()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    /// Store a freshly issued access token together with whatever else the
    /// response carried. A rotated refresh token or new photo replaces the
    /// stored one; otherwise the previous value is kept. Expiry is always
    /// recomputed, and the silent refresh rescheduled.
    fn install_session(&self, access_token: String, body: &Value) {
        let expires_in = extract::expires_in(body).unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if let Some(refresh_ttl) = extract::refresh_expires_in(body) {
            debug!(refresh_expires_in = refresh_ttl, "Refresh token lifetime hint");
        }

        let data = {
            let mut guard = self.session.write().unwrap();
            let previous = guard.take();
            let data = SessionData {
                access_token,
                refresh_token: extract::refresh_token(body)
                    .or_else(|| previous.as_ref().and_then(|s| s.refresh_token.clone())),
                expires_at: Utc::now() + Duration::seconds(expires_in),
                user_photo_url: extract::user_photo(body)
                    .or_else(|| previous.and_then(|s| s.user_photo_url)),
            };
            *guard = Some(data.clone());
            data
        };

        if let Err(e) = self.store.save(&data) {
            warn!(error = %e, "Failed to persist session");
        }

        self.state_tx.send_replace(AuthState::Authenticated);
        self.schedule_refresh(refresh_delay(expires_in));
    }

    /// Arm the single refresh timer, cancelling any previous one.
    fn schedule_refresh(&self, delay: StdDuration) {
        debug!(delay_secs = delay.as_secs(), "Scheduling silent refresh");
        let weak = self.weak.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(manager) = weak.upgrade() else { return };
            debug!("Silent refresh timer fired");
            // Failure already fails closed inside refresh_token
            let _ = manager.refresh_token().await;
        });

        let mut slot = self.refresh_timer.lock().unwrap();
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }
}
