// ABOUTME: Candidate selector discovering and loading past events of the target's category
// ABOUTME: Bounded JoinSet fan-out that stops scheduling once enough candidates are accepted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! # Candidate Selector
//!
//! Discovery prefers the event catalog (same category, older ids, newest
//! first) and falls back to scanning the ids immediately preceding the
//! target. Loading runs on a bounded [`JoinSet`]; once `similar_count`
//! candidates are accepted no new work is scheduled, a shared stop flag tells
//! running tasks to bail out early and whatever is still in flight is drained
//! and discarded. The accepted set is returned newest first regardless of
//! completion order.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cutline_core::constants::candidates::{FALLBACK_SCAN_DEPTH, MAX_CONCURRENCY};
use cutline_core::models::{EventMeta, HistoricalCandidate};
use cutline_intelligence::speed::speed_samples;
use cutline_providers::{EventSource, PeakSpeedWindow, SourceResult};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Loads analogue events for a target
#[derive(Clone)]
pub struct CandidateSelector {
    source: Arc<dyn EventSource>,
    tier: u32,
    concurrency: usize,
    similar_count: usize,
}

impl CandidateSelector {
    /// Selector over `source`; `concurrency` is clamped into `1..=8`
    #[must_use]
    pub fn new(
        source: Arc<dyn EventSource>,
        tier: u32,
        concurrency: usize,
        similar_count: usize,
    ) -> Self {
        Self {
            source,
            tier,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
            similar_count,
        }
    }

    /// Effective concurrency
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Ids to try, in scheduling order
    pub async fn candidate_ids(&self, target: &EventMeta) -> Vec<u32> {
        let from_catalog = match self.source.catalog().await {
            Ok(Some(entries)) => {
                let mut ids: Vec<u32> = entries
                    .into_iter()
                    .filter(|e| e.event_id < target.event_id)
                    .filter(|e| {
                        e.event_type
                            .as_deref()
                            .is_some_and(|t| target.same_type_as(t))
                    })
                    .map(|e| e.event_id)
                    .collect();
                ids.sort_unstable_by_key(|id| Reverse(*id));
                ids.dedup();
                ids
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "Event catalog unavailable, scanning preceding ids");
                Vec::new()
            }
        };

        if from_catalog.is_empty() {
            fallback_ids(target.event_id)
        } else {
            debug!(
                event_id = target.event_id,
                event_type = %target.event_type,
                count = from_catalog.len(),
                "Candidates from catalog"
            );
            from_catalog
        }
    }

    /// Load up to `similar_count` candidates, newest first
    pub async fn select(&self, target: &EventMeta) -> Vec<HistoricalCandidate> {
        let ids = self.candidate_ids(target).await;
        let mut pending = ids.into_iter();
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks: JoinSet<(u32, Option<HistoricalCandidate>)> = JoinSet::new();
        let mut accepted: Vec<HistoricalCandidate> = Vec::with_capacity(self.similar_count);

        for event_id in pending.by_ref().take(self.concurrency) {
            self.spawn_load(&mut tasks, event_id, &target.event_type, &stop);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((event_id, Some(candidate))) if accepted.len() < self.similar_count => {
                    info!(event_id, scale = candidate.scale, "Candidate accepted");
                    accepted.push(candidate);
                }
                Ok((event_id, Some(_))) => {
                    debug!(event_id, "Candidate discarded after selection completed");
                }
                Ok((event_id, None)) => debug!(event_id, "Candidate rejected"),
                Err(e) => warn!(error = %e, "Candidate task failed"),
            }

            if accepted.len() >= self.similar_count {
                stop.store(true, Ordering::Relaxed);
            } else if let Some(event_id) = pending.next() {
                self.spawn_load(&mut tasks, event_id, &target.event_type, &stop);
            }
        }

        accepted.sort_by_key(|c| Reverse(c.event_id));
        info!(
            event_id = target.event_id,
            accepted = accepted.len(),
            wanted = self.similar_count,
            "Candidate selection finished"
        );
        accepted
    }

    fn spawn_load(
        &self,
        tasks: &mut JoinSet<(u32, Option<HistoricalCandidate>)>,
        event_id: u32,
        event_type: &str,
        stop: &Arc<AtomicBool>,
    ) {
        let source = Arc::clone(&self.source);
        let event_type = event_type.to_owned();
        let stop = Arc::clone(stop);
        let tier = self.tier;
        tasks.spawn(async move {
            let loaded = load_candidate(source.as_ref(), event_id, &event_type, tier, &stop).await;
            (event_id, loaded)
        });
    }
}

/// The ids immediately preceding `target_id`, newest first
#[must_use]
pub fn fallback_ids(target_id: u32) -> Vec<u32> {
    (1..=FALLBACK_SCAN_DEPTH)
        .filter_map(|back| target_id.checked_sub(back))
        .filter(|id| *id > 0)
        .collect()
}

/// Fetch and validate one candidate; `None` when it does not qualify
pub async fn load_candidate(
    source: &dyn EventSource,
    event_id: u32,
    event_type: &str,
    tier: u32,
    stop: &AtomicBool,
) -> Option<HistoricalCandidate> {
    if stop.load(Ordering::Relaxed) {
        return None;
    }
    let meta = present(source.event_meta(event_id).await, event_id, "event metadata")?;
    if !meta.same_type_as(event_type) {
        return None;
    }

    if stop.load(Ordering::Relaxed) {
        return None;
    }
    let scale = present(
        source.peak_speed(event_id, PeakSpeedWindow::candidate()).await,
        event_id,
        "peak speed",
    )?;
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    if stop.load(Ordering::Relaxed) {
        return None;
    }
    let points = present(source.score_series(event_id, tier).await, event_id, "score series")?;
    if points.is_empty() || meta.end_ts <= meta.start_ts {
        return None;
    }

    Some(HistoricalCandidate::new(
        event_id,
        scale,
        speed_samples(&points, meta.start_ts, scale),
        meta.total_hours(),
        meta.start_ts,
    ))
}

fn present<T>(outcome: SourceResult<T>, event_id: u32, what: &'static str) -> Option<T> {
    outcome
        .map_err(|e| debug!(event_id, what, error = %e, "Candidate fetch failed"))
        .ok()
        .flatten()
}
