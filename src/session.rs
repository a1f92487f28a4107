//! Client-side merge state for one streaming translation session.
//!
//! [`TranslationSession`] is owned by the consumer loop and mutated only
//! through [`TranslationSession::apply`]. After every transition it publishes
//! an immutable [`SessionSnapshot`] on a `watch` channel, which is how UI
//! code observes progress without sharing the mutable state.

use crate::bundle::TranslationBundle;
use crate::events::StreamEvent;
use crate::locale::{Locale, LocaleRegistry};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Progress of one locale within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocaleStatus {
    Pending,
    Translating,
    Done,
    Error,
}

impl LocaleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LocaleStatus::Done | LocaleStatus::Error)
    }
}

/// One locale's status, as listed in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleProgress {
    pub locale: Locale,
    pub status: LocaleStatus,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub bundle: TranslationBundle,
    /// Every canonical locale, in canonical order
    pub statuses: Vec<LocaleProgress>,
    /// Locale the dispatcher is currently working on
    pub active: Option<Locale>,
    /// Most recently completed locale, the one a UI should surface
    pub selected: Option<Locale>,
    /// Fraction of canonical locales that are done, in `0.0..=1.0`
    pub progress: f64,
    /// Set when the whole session failed
    pub failure: Option<String>,
}

#[derive(Debug)]
pub struct TranslationSession {
    locales: Vec<Locale>,
    statuses: BTreeMap<Locale, LocaleStatus>,
    bundle: TranslationBundle,
    active: Option<Locale>,
    selected: Option<Locale>,
    failure: Option<String>,
    publisher: watch::Sender<SessionSnapshot>,
}

impl TranslationSession {
    /// New session with every canonical locale pending and an empty bundle.
    pub fn new(registry: &LocaleRegistry) -> Self {
        Self::with_bundle(registry, TranslationBundle::new())
    }

    /// New session that merges into an existing bundle, e.g. the entity's
    /// stored translations.
    pub fn with_bundle(registry: &LocaleRegistry, bundle: TranslationBundle) -> Self {
        let locales = registry.locales().to_vec();
        let statuses = locales
            .iter()
            .map(|&locale| (locale, LocaleStatus::Pending))
            .collect();

        let mut session = Self {
            locales,
            statuses,
            bundle,
            active: None,
            selected: None,
            failure: None,
            publisher: watch::channel(SessionSnapshot {
                bundle: TranslationBundle::new(),
                statuses: Vec::new(),
                active: None,
                selected: None,
                progress: 0.0,
                failure: None,
            })
            .0,
        };
        session.publish();
        session
    }

    /// Receive a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.publisher.subscribe()
    }

    /// Fold one event into the session.
    ///
    /// Returns `false` when the event was ignored (a locale outside this
    /// session's canonical set).
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::Translating { locale } => {
                if !self.set_status(locale, LocaleStatus::Translating) {
                    return false;
                }
                self.active = Some(locale);
            }
            StreamEvent::LocaleDone {
                locale,
                translation,
            } => {
                if !self.set_status(locale, LocaleStatus::Done) {
                    return false;
                }
                self.bundle.merge_locale(locale, translation);
                self.selected = Some(locale);
                self.clear_active(locale);
            }
            StreamEvent::Error {
                locale: Some(locale),
                message,
            } => {
                if !self.set_status(locale, LocaleStatus::Error) {
                    return false;
                }
                debug!("Locale {} failed: {}", locale, message);
                self.clear_active(locale);
            }
            StreamEvent::Error {
                locale: None,
                message,
            } => {
                warn!("Translation session failed: {}", message);
                self.failure = Some(message);
                self.active = None;
            }
        }

        self.publish();
        true
    }

    /// Mark every locale that has not finished as failed.
    ///
    /// For callers that give up on a session (timeout, abandoned stream) and
    /// want remaining locales reported as failed. Merged translations stay.
    pub fn expire_pending(&mut self) -> Vec<Locale> {
        let expired = self.unfinished();
        for locale in &expired {
            self.statuses.insert(*locale, LocaleStatus::Error);
        }
        self.active = None;
        self.publish();
        expired
    }

    pub fn status(&self, locale: Locale) -> Option<LocaleStatus> {
        self.statuses.get(&locale).copied()
    }

    /// Status of every canonical locale, in canonical order.
    pub fn statuses(&self) -> Vec<LocaleProgress> {
        self.locales
            .iter()
            .filter_map(|&locale| {
                self.status(locale)
                    .map(|status| LocaleProgress { locale, status })
            })
            .collect()
    }

    pub fn bundle(&self) -> &TranslationBundle {
        &self.bundle
    }

    pub fn into_bundle(self) -> TranslationBundle {
        self.bundle
    }

    pub fn active(&self) -> Option<Locale> {
        self.active
    }

    pub fn selected(&self) -> Option<Locale> {
        self.selected
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Fraction of canonical locales that are done.
    pub fn progress(&self) -> f64 {
        if self.locales.is_empty() {
            return 0.0;
        }
        let done = self
            .statuses
            .values()
            .filter(|&&status| status == LocaleStatus::Done)
            .count();
        done as f64 / self.locales.len() as f64
    }

    /// Locales still pending or in progress, in canonical order.
    pub fn unfinished(&self) -> Vec<Locale> {
        self.locales
            .iter()
            .copied()
            .filter(|locale| self.status(*locale).is_some_and(|s| !s.is_terminal()))
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            bundle: self.bundle.clone(),
            statuses: self.statuses(),
            active: self.active,
            selected: self.selected,
            progress: self.progress(),
            failure: self.failure.clone(),
        }
    }

    fn set_status(&mut self, locale: Locale, status: LocaleStatus) -> bool {
        match self.statuses.get_mut(&locale) {
            Some(current) => {
                *current = status;
                true
            }
            None => {
                warn!("Ignoring event for non-canonical locale {}", locale);
                false
            }
        }
    }

    fn clear_active(&mut self, locale: Locale) {
        if self.active == Some(locale) {
            self.active = None;
        }
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.publisher.send_replace(snapshot);
    }
}
