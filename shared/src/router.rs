//! Named-route screen registry with fade transitions.
//!
//! The router is a small state machine: `Idle`, `FadingOut` (old screen hidden, waiting for the
//! exit fade) and `FadingIn` (new screen shown, waiting for the entrance fade). Fades are timed
//! by the shell; each one carries a sequence number and completions for any other number are
//! dropped. A `go` issued mid-transition is parked in a single slot (last one wins) and replayed
//! once the entrance fade completes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("route name cannot be empty")]
    EmptyRoute,
    #[error("route '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("screen for route '{0}' has no root element")]
    MissingRoot(String),
    #[error("route '{0}' is not registered")]
    NotRegistered(String),
    #[error("there is no previous screen")]
    NoPrevious,
}

/// Whatever the screens mutate while being shown or hidden.
pub trait ScreenHost {
    /// Called on every transition, before the next screen is shown.
    fn release(&mut self);
}

pub trait Screen {
    type Context: ScreenHost;
    type Params;

    fn root(&self) -> &str;

    fn show(&mut self, _params: &Self::Params, _cx: &mut Self::Context) {}

    fn hide(&mut self, _cx: &mut Self::Context) {}
}

enum Phase<P> {
    Idle,
    FadingOut { to: String, params: P, seq: u64 },
    FadingIn { seq: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TransitionState {
    Idle,
    FadingOut { to: String },
    FadingIn,
}

/// What the caller has to do after a router call: start a fade timer, or nothing yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    FadeOut {
        from: String,
        to: String,
        seq: u64,
        millis: u64,
    },
    FadeIn {
        to: String,
        seq: u64,
        millis: u64,
    },
    Queued {
        to: String,
    },
}

impl Transition {
    /// `(seq, millis)` of the fade timer to start.
    #[must_use]
    pub fn timer(&self) -> Option<(u64, u64)> {
        match self {
            Transition::FadeOut { seq, millis, .. } | Transition::FadeIn { seq, millis, .. } => {
                Some((*seq, *millis))
            }
            Transition::Queued { .. } => None,
        }
    }
}

pub struct ScreenRouter<S: Screen + ?Sized> {
    routes: HashMap<String, Box<S>>,
    current: Option<String>,
    previous: Option<String>,
    phase: Phase<S::Params>,
    queued: Option<(String, S::Params)>,
    fade_ms: u64,
    seq: u64,
    visit: u64,
}

impl<S: Screen + ?Sized> ScreenRouter<S> {
    #[must_use]
    pub fn new(fade_ms: u64) -> Self {
        Self {
            routes: HashMap::new(),
            current: None,
            previous: None,
            phase: Phase::Idle,
            queued: None,
            fade_ms,
            seq: 0,
            visit: 0,
        }
    }

    pub fn set_fade_ms(&mut self, fade_ms: u64) {
        self.fade_ms = fade_ms;
    }

    #[must_use]
    pub fn fade_ms(&self) -> u64 {
        self.fade_ms
    }

    pub fn register(&mut self, name: &str, screen: Box<S>) -> Result<(), RouterError> {
        if name.is_empty() {
            return Err(RouterError::EmptyRoute);
        }
        if self.routes.contains_key(name) {
            return Err(RouterError::AlreadyRegistered(name.to_string()));
        }
        if screen.root().is_empty() {
            return Err(RouterError::MissingRoot(name.to_string()));
        }
        self.routes.insert(name.to_string(), screen);
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn go(
        &mut self,
        name: &str,
        params: S::Params,
        cx: &mut S::Context,
    ) -> Result<Transition, RouterError> {
        if !self.routes.contains_key(name) {
            return Err(RouterError::NotRegistered(name.to_string()));
        }

        if !matches!(self.phase, Phase::Idle) {
            debug!(route = name, "transition running, navigation queued");
            self.queued = Some((name.to_string(), params));
            return Ok(Transition::Queued {
                to: name.to_string(),
            });
        }

        self.seq += 1;
        let seq = self.seq;

        if let Some(from) = self.current.take() {
            if let Some(screen) = self.routes.get_mut(&from) {
                screen.hide(cx);
            }
            cx.release();
            info!(from = %from, to = name, "screen transition");

            self.previous = Some(from.clone());
            self.current = Some(name.to_string());
            self.phase = Phase::FadingOut {
                to: name.to_string(),
                params,
                seq,
            };
            Ok(Transition::FadeOut {
                from,
                to: name.to_string(),
                seq,
                millis: self.fade_ms,
            })
        } else {
            cx.release();
            info!(to = name, "first screen");
            if let Some(screen) = self.routes.get_mut(name) {
                screen.show(&params, cx);
            }
            self.visit += 1;
            self.current = Some(name.to_string());
            self.phase = Phase::FadingIn { seq };
            Ok(Transition::FadeIn {
                to: name.to_string(),
                seq,
                millis: self.fade_ms,
            })
        }
    }

    /// Navigates to the screen shown before the current one.
    pub fn back(&mut self, params: S::Params, cx: &mut S::Context) -> Result<Transition, RouterError> {
        let previous = self.previous.clone().ok_or(RouterError::NoPrevious)?;
        self.go(&previous, params, cx)
    }

    /// Advances the state machine when fade `seq` has elapsed.
    pub fn finish_fade(
        &mut self,
        seq: u64,
        cx: &mut S::Context,
    ) -> Result<Option<Transition>, RouterError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::FadingOut {
                to,
                params,
                seq: expected,
            } if expected == seq => {
                if let Some(screen) = self.routes.get_mut(&to) {
                    screen.show(&params, cx);
                }
                self.visit += 1;
                self.seq += 1;
                self.phase = Phase::FadingIn { seq: self.seq };
                Ok(Some(Transition::FadeIn {
                    to,
                    seq: self.seq,
                    millis: self.fade_ms,
                }))
            }
            Phase::FadingIn { seq: expected } if expected == seq => match self.queued.take() {
                Some((to, params)) => self.go(&to, params, cx).map(Some),
                None => Ok(None),
            },
            phase => {
                debug!(seq, "stale fade completion ignored");
                self.phase = phase;
                Ok(None)
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Bumped every time a screen is shown, so two visits to one route differ.
    #[must_use]
    pub fn visit(&self) -> u64 {
        self.visit
    }

    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Route on screen right now: during the exit fade that is still the old one.
    #[must_use]
    pub fn displayed(&self) -> Option<&str> {
        match self.phase {
            Phase::FadingOut { .. } => self.previous.as_deref(),
            _ => self.current.as_deref(),
        }
    }

    #[must_use]
    pub fn screen(&self, name: &str) -> Option<&S> {
        self.routes.get(name).map(|screen| &**screen)
    }

    pub fn screen_mut(&mut self, name: &str) -> Option<&mut S> {
        self.routes.get_mut(name).map(|screen| &mut **screen)
    }

    #[must_use]
    pub fn current_screen(&self) -> Option<&S> {
        self.current.as_deref().and_then(|name| self.screen(name))
    }

    pub fn current_screen_mut(&mut self) -> Option<&mut S> {
        let name = self.current.clone()?;
        self.screen_mut(&name)
    }

    #[must_use]
    pub fn queued(&self) -> Option<&str> {
        self.queued.as_ref().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn transition_state(&self) -> TransitionState {
        match &self.phase {
            Phase::Idle => TransitionState::Idle,
            Phase::FadingOut { to, .. } => TransitionState::FadingOut { to: to.clone() },
            Phase::FadingIn { .. } => TransitionState::FadingIn,
        }
    }
}
