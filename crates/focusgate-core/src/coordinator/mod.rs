//! The coordinator: single owner of all live state.
//!
//! Exactly one coordinator runs per profile. It owns the timer engine, the
//! unlock gate, usage stats and the settings document; UI surfaces are
//! stateless clients that talk to it through [`CoordinatorHandle`]. Ticks
//! and commands are serialized onto one `select!` loop, so no state needs
//! locking -- transitions apply strictly in arrival order.

mod messages;

pub use messages::{Request, Response};

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::blocking;
use crate::events::Event;
use crate::gate::{FeatureGate, Tier, FEATURE_SESSION_START};
use crate::quotes;
use crate::settings::Settings;
use crate::stats::UsageStats;
use crate::storage::{
    Database, SettingsStore, KV_ENGINE_SNAPSHOT, KV_FEATURE_USAGE, KV_UNLOCK_STATE,
};
use crate::timer::{TimerEngine, TimerStatus};
use crate::unlock::{PasswordVerifier, Sha256Verifier, UnlockGate};

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Client side of the coordinator channel. Cheap to clone; one per UI
/// surface.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Envelope>,
}

impl CoordinatorHandle {
    /// Send a request and await the reply. Never fails hard: when the
    /// coordinator is gone (host restarted) the caller gets a failure
    /// envelope and can fall back to cached state.
    pub async fn request(&self, request: Request) -> Response {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Envelope { request, reply }).await.is_err() {
            return Response::err("coordinator unavailable");
        }
        match rx.await {
            Ok(response) => response,
            Err(_) => Response::err("coordinator dropped the request"),
        }
    }
}

pub struct Coordinator {
    engine: TimerEngine,
    unlock: UnlockGate,
    feature_gate: FeatureGate,
    stats: UsageStats,
    settings: Settings,
    settings_store: SettingsStore,
    db: Database,
    verifier: Box<dyn PasswordVerifier + Send>,
}

impl Coordinator {
    /// Build a coordinator from persisted state: settings from the store,
    /// stats and -- when present -- a live engine snapshot from the
    /// database, so a restart resumes the session from wall-clock time
    /// instead of losing it.
    pub fn new(settings_store: SettingsStore, db: Database, tier: Tier) -> Self {
        let settings = settings_store.load();
        let stats = db.load_stats();
        let engine = match db.kv_get(KV_ENGINE_SNAPSHOT) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "engine snapshot is corrupt, starting idle");
                TimerEngine::new(settings.pomodoro.clone())
            }),
            _ => TimerEngine::new(settings.pomodoro.clone()),
        };
        let unlock = match db.kv_get(KV_UNLOCK_STATE) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_default(),
            _ => UnlockGate::new(),
        };
        let feature_gate = match db.kv_get(KV_FEATURE_USAGE) {
            Ok(Some(json)) => {
                let mut gate: FeatureGate =
                    serde_json::from_str(&json).unwrap_or_else(|_| FeatureGate::new(tier));
                // The tier always comes from the license provider, not disk.
                gate.set_tier(tier);
                gate
            }
            _ => FeatureGate::new(tier),
        };
        Self {
            engine,
            unlock,
            feature_gate,
            stats,
            settings,
            settings_store,
            db,
            verifier: Box::new(Sha256Verifier),
        }
    }

    /// Swap the password primitive. Mainly for tests.
    pub fn with_verifier(mut self, verifier: Box<dyn PasswordVerifier + Send>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Run the coordinator on its own task, driven by a 1-second tick.
    /// Missed ticks are skipped, not replayed: the engine reconciles
    /// against wall-clock time, so replaying stale ticks would be wasted
    /// work.
    pub fn spawn(mut self) -> CoordinatorHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(64);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.on_tick(Utc::now());
                    }
                    envelope = rx.recv() => {
                        let Some(Envelope { request, reply }) = envelope else {
                            break; // All handles dropped.
                        };
                        let response = self.handle(request, Utc::now());
                        let _ = reply.send(response);
                    }
                }
            }
            tracing::debug!("coordinator loop ended");
        });
        CoordinatorHandle { tx }
    }

    /// Drive pending phase transitions up to `now`.
    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        // After suspension several deadlines may have passed; drain them.
        while let Some(event) = self.engine.tick(now) {
            tracing::debug!(?event, "timer transition");
            self.absorb(&event);
        }
    }

    /// Apply one request. Synchronous and deterministic given `now`, which
    /// is what makes the transition table testable without a runtime.
    pub fn handle(&mut self, request: Request, now: DateTime<Utc>) -> Response {
        match request {
            Request::GetTimerState => Response::ok(self.engine.snapshot(now)),
            Request::StartFocus { mode, duration_min } => {
                // A start while already active returns the current state
                // untouched: idempotent, because the UI may race.
                if self.engine.status() != TimerStatus::Idle {
                    return Response::ok(self.engine.snapshot(now));
                }
                let day = self.local_day(now);
                let gate = self.feature_gate.check(FEATURE_SESSION_START, day);
                if !gate.allowed {
                    return Response::err(gate.reason.unwrap_or_else(|| "limit reached".into()));
                }
                if let Some(event) = self.engine.start_focus(mode, duration_min, now) {
                    self.feature_gate.record_usage(FEATURE_SESSION_START, day);
                    self.persist_feature_usage();
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::StopFocus => {
                if let Some(event) = self.engine.stop(now) {
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::PauseFocus => {
                if let Some(event) = self.engine.pause(now) {
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::ResumeFocus => {
                if let Some(event) = self.engine.resume(now) {
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::StartBreak => {
                if let Some(event) = self.engine.start_break(now) {
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::SkipBreak => {
                if let Some(event) = self.engine.skip_break(now) {
                    self.absorb(&event);
                }
                Response::ok(self.engine.snapshot(now))
            }
            Request::GetSettings => Response::ok(&self.settings),
            Request::UpdateSettings { patch } => {
                patch.apply(&mut self.settings);
                self.engine.set_config(self.settings.pomodoro.clone());
                self.persist_settings();
                Response::ok(&self.settings)
            }
            Request::AddToBlocklist { pattern, is_regex } => {
                match self.settings.add_block_rule(&pattern, is_regex) {
                    Ok(rule) => {
                        self.persist_settings();
                        Response::ok(rule)
                    }
                    Err(e) => Response::err(e.to_string()),
                }
            }
            Request::RemoveFromBlocklist { id } => {
                match self.settings.remove_block_rule(id) {
                    Ok(()) => {
                        self.persist_settings();
                        Response::ok_empty()
                    }
                    Err(e) => Response::err(e.to_string()),
                }
            }
            Request::AddToWhitelist { pattern, is_regex } => {
                match self.settings.add_whitelist_rule(&pattern, is_regex) {
                    Ok(rule) => {
                        self.persist_settings();
                        Response::ok(rule)
                    }
                    Err(e) => Response::err(e.to_string()),
                }
            }
            Request::RemoveFromWhitelist { id } => {
                match self.settings.remove_whitelist_rule(id) {
                    Ok(()) => {
                        self.persist_settings();
                        Response::ok_empty()
                    }
                    Err(e) => Response::err(e.to_string()),
                }
            }
            Request::GetStats => Response::ok(&self.stats),
            Request::VerifyPassword { password } => {
                let valid = if self.settings.password.password_hash.is_empty() {
                    true
                } else {
                    self.verifier
                        .verify(&password, &self.settings.password.password_hash)
                };
                Response::ok(serde_json::json!({ "valid": valid }))
            }
            Request::EmergencyUnlock { password } => {
                let outcome = self.unlock.request(
                    &self.settings,
                    now,
                    password.as_deref(),
                    self.verifier.as_ref(),
                );
                if outcome.allowed {
                    if let Some(event) = self.engine.stop(now) {
                        self.absorb(&event);
                    }
                    tracing::info!("emergency unlock granted");
                    self.persist_unlock_state();
                    self.absorb(&Event::EmergencyUnlocked { at: now });
                }
                Response::ok(outcome)
            }
            Request::CheckNavigation { url } => {
                let decision = blocking::evaluate(
                    &url,
                    &self.settings,
                    self.engine.status(),
                    self.local_naive(now),
                );
                if decision.blocked {
                    self.stats.record_blocked(self.local_day(now));
                    self.persist_stats();
                    if let Some(matched) = &decision.matched {
                        tracing::debug!(%url, pattern = %matched.pattern, "navigation blocked");
                    }
                }
                Response::ok(decision)
            }
            Request::GetQuote => Response::ok(quotes::random()),
            Request::GetTier => {
                Response::ok(serde_json::json!({ "tier": self.feature_gate.tier() }))
            }
            Request::CheckFeatureGate { feature_id } => {
                Response::ok(self.feature_gate.check(&feature_id, self.local_day(now)))
            }
            Request::RecordFeatureUsage { feature_id } => {
                self.feature_gate
                    .record_usage(&feature_id, self.local_day(now));
                self.persist_feature_usage();
                Response::ok_empty()
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Fold a timer event into stats and persistence. Sealed sessions go
    /// to the recorder; every engine mutation refreshes the snapshot.
    fn absorb(&mut self, event: &Event) {
        let sealed = match event {
            Event::FocusCompleted { session, at } | Event::SessionStopped { session, at } => {
                session.clone().map(|s| (s, *at))
            }
            _ => None,
        };
        if let Some((session, at)) = sealed {
            if let Err(e) = self.db.record_session(&session) {
                tracing::warn!(error = %e, "failed to persist session record");
            }
            self.stats.record_session(session, self.local_day(at));
            self.persist_stats();
        }
        self.persist_engine();
    }

    fn persist_engine(&self) {
        match serde_json::to_string(&self.engine) {
            Ok(json) => {
                if let Err(e) = self.db.kv_set(KV_ENGINE_SNAPSHOT, &json) {
                    tracing::warn!(error = %e, "failed to persist engine snapshot");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize engine snapshot"),
        }
    }

    fn persist_stats(&self) {
        if let Err(e) = self.db.save_stats(&self.stats) {
            tracing::warn!(error = %e, "failed to persist usage stats");
        }
    }

    fn persist_unlock_state(&self) {
        if let Ok(json) = serde_json::to_string(&self.unlock) {
            if let Err(e) = self.db.kv_set(KV_UNLOCK_STATE, &json) {
                tracing::warn!(error = %e, "failed to persist unlock state");
            }
        }
    }

    fn persist_feature_usage(&self) {
        if let Ok(json) = serde_json::to_string(&self.feature_gate) {
            if let Err(e) = self.db.kv_set(KV_FEATURE_USAGE, &json) {
                tracing::warn!(error = %e, "failed to persist feature usage");
            }
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            tracing::warn!(error = %e, "failed to persist settings");
        }
    }

    fn local_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&Local).date_naive()
    }

    fn local_naive(&self, now: DateTime<Utc>) -> chrono::NaiveDateTime {
        now.with_timezone(&Local).naive_local()
    }
}
