//! Replays a recorded touch trace against a simulated page.
//!
//! A trace is JSON lines, one touch event per line plus its time `t` in
//! milliseconds. Blank lines and lines starting with `#` are skipped.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Profile;
use crate::events::{EventResponse, TouchEvent};
use crate::host::{Clock, CssTransform, ManualClock, SimulatedDom};
use crate::pinch_zoom::PinchZoom;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: time went backwards ({t} < {previous})")]
    NonMonotonic { line: usize, t: u64, previous: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceEntry {
    pub t: u64,
    #[serde(flatten)]
    pub event: TouchEvent,
}

pub fn read_trace(reader: impl BufRead) -> Result<Vec<TraceEntry>, TraceError> {
    let mut out = Vec::new();
    let mut previous = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry: TraceEntry = serde_json::from_str(trimmed).map_err(|source| TraceError::Parse {
            line: idx + 1,
            source,
        })?;
        if entry.t < previous {
            return Err(TraceError::NonMonotonic {
                line: idx + 1,
                t: entry.t,
                previous,
            });
        }
        previous = entry.t;
        out.push(entry);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayRecord {
    Event {
        t: u64,
        #[serde(flatten)]
        response: EventResponse,
        transform: Option<CssTransform>,
    },
    SingleTap {
        t: u64,
        target: Option<u32>,
    },
}

/// Drives a fresh controller through `entries`. Pending single taps fire at
/// their exact deadline, including after the last event.
pub fn replay(profile: &Profile, entries: &[TraceEntry]) -> Vec<ReplayRecord> {
    let dom = SimulatedDom::new(profile.viewport_rect(), profile.scene.content);
    let clock = Rc::new(ManualClock::new(entries.first().map_or(0, |e| e.t)));
    let records = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&records);
    let tap_clock = Rc::clone(&clock);
    let mut zoom = PinchZoom::new(
        dom,
        Rc::clone(&clock),
        profile.zoom_config(),
        Box::new(move |_ev: &TouchEvent, target| {
            sink.borrow_mut().push(ReplayRecord::SingleTap {
                t: tap_clock.now_ms(),
                target,
            });
        }),
    );

    for entry in entries {
        fire_due(&mut zoom, &clock, entry.t);
        clock.set(entry.t);
        let response = zoom.handle(&entry.event);
        debug!("t={} {:?} -> {response:?}", entry.t, entry.event.kind);
        records.borrow_mut().push(ReplayRecord::Event {
            t: entry.t,
            response,
            transform: zoom.dom().transform().copied(),
        });
    }
    fire_due(&mut zoom, &clock, u64::MAX);

    let state = zoom.state();
    info!(
        "replayed {} events: scale {:.3}, translation ({:.1}, {:.1})",
        entries.len(),
        state.scale,
        state.translation.x,
        state.translation.y
    );
    zoom.remove();
    records.take()
}

fn fire_due(zoom: &mut PinchZoom<SimulatedDom, Rc<ManualClock>>, clock: &ManualClock, until: u64) {
    while let Some(due) = zoom.next_deadline().filter(|&d| d <= until) {
        clock.set(due);
        zoom.tick();
    }
}

pub fn write_records(out: &mut impl Write, records: &[ReplayRecord]) -> anyhow::Result<()> {
    for r in records {
        writeln!(out, "{}", serde_json::to_string(r)?)?;
    }
    Ok(())
}
