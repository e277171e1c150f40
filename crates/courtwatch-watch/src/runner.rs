//! Run orchestrator: one bounded pass over every configured rule.
//!
//! Per kind: fetch each rule's entities under the shared deadline, filter
//! them, then diff every match against the observation store and collect
//! notification text for the ones worth announcing. A failing or
//! timed-out source contributes nothing; the rest of the run continues.

use chrono_tz::Tz;
use courtwatch_core::config::DEFAULT_TIMEZONE;
use courtwatch_core::traits::{Channel, Source};
use courtwatch_core::types::{EntityKind, TenantRule};
use std::time::Duration;
use tokio::time::Instant;

use crate::filter::{self, Matches};
use crate::format::Render;
use crate::state::ObservationStore;

/// Upper bound on delivering the notification, on top of any client timeout.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Counters for one kind's sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub kind: EntityKind,
    pub sources: usize,
    pub failed_sources: usize,
    pub skipped_sources: usize,
    pub matched: usize,
    pub notified: usize,
    pub timed_out: bool,
}

impl SweepReport {
    fn new(kind: EntityKind, sources: usize) -> Self {
        Self {
            kind,
            sources,
            failed_sources: 0,
            skipped_sources: 0,
            matched: 0,
            notified: 0,
            timed_out: false,
        }
    }
}

/// What happened to the accumulated notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing new to announce.
    Empty,
    /// No channel configured; the text was only logged.
    NoChannel,
    Sent,
    /// The channel returned an error or did not answer in time.
    Failed,
}

/// State carried across the per-kind sweeps of a single run.
pub struct Run {
    deadline: Instant,
    dispatch_timeout: Duration,
    timezone: Tz,
    message: String,
    reports: Vec<SweepReport>,
}

impl Run {
    /// Start a run whose fetches must all finish within `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            timezone: DEFAULT_TIMEZONE,
            message: String::new(),
            reports: Vec::new(),
        }
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Zone notification times are rendered in.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Accumulated notification text, empty when nothing changed.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reports(&self) -> &[SweepReport] {
        &self.reports
    }

    pub fn timed_out(&self) -> bool {
        self.reports.iter().any(|r| r.timed_out)
    }

    /// Fetch, filter and diff one kind. Returns every match in source
    /// order, whether or not it was announced.
    pub async fn sweep<E, S>(&mut self, source: &S, rules: &[E::Rule], store: &mut ObservationStore) -> Vec<E>
    where
        E: Matches + Render,
        S: Source<E> + ?Sized,
    {
        let mut report = SweepReport::new(E::KIND, rules.len());
        let matched = self.fetch_matching(source, rules, &mut report).await;
        report.matched = matched.len();
        report.notified = self.record(&matched, store);

        tracing::info!(
            kind = %E::KIND,
            matched = report.matched,
            notified = report.notified,
            failed = report.failed_sources,
            skipped = report.skipped_sources,
            "Sweep complete"
        );
        self.reports.push(report);
        matched
    }

    async fn fetch_matching<E, S>(&self, source: &S, rules: &[E::Rule], report: &mut SweepReport) -> Vec<E>
    where
        E: Matches,
        S: Source<E> + ?Sized,
    {
        let mut matched = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if report.timed_out || Instant::now() >= self.deadline {
                report.timed_out = true;
                report.skipped_sources = rules.len() - index;
                tracing::warn!(kind = %E::KIND, skipped = report.skipped_sources, "Run deadline reached, skipping remaining sources");
                break;
            }

            let tenant = rule.tenant_id();
            match tokio::time::timeout_at(self.deadline, source.fetch(rule)).await {
                Ok(Ok(entities)) => {
                    let fetched = entities.len();
                    let kept = filter::apply(entities, rule);
                    tracing::debug!(kind = %E::KIND, tenant, fetched, kept = kept.len(), "Source fetched");
                    matched.extend(kept);
                }
                Ok(Err(e)) => {
                    report.failed_sources += 1;
                    tracing::warn!(kind = %E::KIND, tenant, error = %e, "Source failed, skipping");
                }
                Err(_) => {
                    report.failed_sources += 1;
                    report.timed_out = true;
                    tracing::warn!(kind = %E::KIND, tenant, "Source timed out");
                }
            }
        }
        matched
    }

    /// Diff each match against the store. The notify decision is taken
    /// before the sighting is recorded. Returns how many were announced.
    fn record<E: Render>(&mut self, matched: &[E], store: &mut ObservationStore) -> usize {
        let mut notified = 0;
        for entity in matched {
            let id = entity.id();
            let available = entity.available_slots();
            if store.should_notify(id, available) {
                tracing::debug!(kind = %E::KIND, id, available, "Change detected");
                self.message.push_str(&entity.notification(self.timezone));
                notified += 1;
            }
            store.update(id, available);
        }
        notified
    }

    /// Send the accumulated message once, bounded by the dispatch timeout.
    /// Delivery problems are logged and never fail the run.
    pub async fn dispatch(&self, channel: Option<&dyn Channel>) -> Dispatch {
        if self.message.is_empty() {
            tracing::info!("Nothing new to notify");
            return Dispatch::Empty;
        }
        let Some(channel) = channel else {
            tracing::warn!("No notification channel configured, message not sent");
            return Dispatch::NoChannel;
        };
        match tokio::time::timeout(self.dispatch_timeout, channel.send(&self.message)).await {
            Ok(Ok(())) => {
                tracing::info!(channel = channel.name(), "Notification sent");
                Dispatch::Sent
            }
            Ok(Err(e)) => {
                tracing::error!(channel = channel.name(), error = %e, "Failed to send notification");
                Dispatch::Failed
            }
            Err(_) => {
                tracing::error!(
                    channel = channel.name(),
                    timeout_secs = self.dispatch_timeout.as_secs(),
                    "Notification timed out"
                );
                Dispatch::Failed
            }
        }
    }
}
