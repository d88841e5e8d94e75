use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{thread, time::Duration};

use evdev::{AbsoluteAxisCode, Device, EventType, SynchronizationCode};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::config::Profile;
use crate::events::TouchEvent;
use crate::host::{MonotonicClock, SimulatedDom};
use crate::input;
use crate::pinch_zoom::PinchZoom;
use crate::tracker::Tracker;

fn install_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let flag = Arc::clone(&stop);
    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            info!("received signal {sig}, stopping");
            flag.store(true, Ordering::SeqCst);
        }
    });
    Ok(stop)
}

fn open_device(path: Option<&str>) -> Result<Device> {
    let path = match path {
        Some(p) => p.to_string(),
        None => input::discover_multitouch()
            .into_iter()
            .next()
            .map(|d| {
                info!("using {} ({})", d.name, d.path);
                d.path
            })
            .ok_or_else(|| anyhow!("no multitouch devices detected (see `pinchzoom doctor`)"))?,
    };
    let dev = Device::open(&path).with_context(|| format!("failed to open {path}"))?;
    dev.set_nonblocking(true)
        .with_context(|| format!("failed to make {path} non-blocking"))?;
    Ok(dev)
}

/// Drives a controller over the profile's scene from a real touch surface
/// until SIGINT/SIGTERM, logging every transform and tap.
pub fn run_live(profile: &Profile, device: Option<&str>) -> Result<()> {
    let stop = install_shutdown_flag()?;
    let mut dev = open_device(device)?;

    let viewport = profile.viewport_rect();
    let mut tracker = Tracker::new(viewport);
    match input::position_ranges(&dev) {
        Some((x, y)) => tracker.set_norm_ranges(x, y),
        None => warn!("device reports no position ranges; assuming 0..4096"),
    }

    let dom = SimulatedDom::new(viewport, profile.scene.content);
    let mut zoom = PinchZoom::new(
        dom,
        MonotonicClock::new(),
        profile.zoom_config(),
        Box::new(|ev: &TouchEvent, target| {
            let at = ev.changed.first().map(|t| (t.x, t.y));
            info!("single tap at {at:?} (target {target:?})");
        }),
    );
    let b = zoom.boundaries();
    info!(
        "scene {:.0}x{:.0} in {:.0}x{:.0} viewport, scale {:.3} (limits {:.3}..{:.3})",
        profile.scene.content.width,
        profile.scene.content.height,
        viewport.width(),
        viewport.height(),
        zoom.state().scale,
        b.min,
        b.max
    );

    while !stop.load(Ordering::SeqCst) {
        let mut batches: Vec<TouchEvent> = Vec::new();
        match dev.fetch_events() {
            Ok(events) => {
                for ev in events {
                    if ev.event_type() == EventType::ABSOLUTE {
                        match ev.code() {
                            c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => tracker.on_slot(ev.value()),
                            c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                                tracker.on_tracking_id(ev.value())
                            }
                            c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => {
                                tracker.on_pos_x(ev.value())
                            }
                            c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => {
                                tracker.on_pos_y(ev.value())
                            }
                            _ => {}
                        }
                    } else if ev.event_type() == EventType::SYNCHRONIZATION {
                        if ev.code() == SynchronizationCode::SYN_REPORT.0 {
                            batches.extend(tracker.on_syn_report());
                        } else if ev.code() == SynchronizationCode::SYN_DROPPED.0 {
                            warn!("input events dropped; cancelling gesture");
                            batches.extend(tracker.on_dropped());
                        }
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => {
                error!("reading touch events failed: {e}");
                break;
            }
        }

        let idle = batches.is_empty();
        for batch in &batches {
            let resp = zoom.handle(batch);
            if let (Some(g), Some(t)) = (resp.gesture, zoom.dom().transform()) {
                debug!(
                    "{:?} -> {g:?}: transform: {}; transform-origin: {}",
                    batch.kind,
                    t.transform_value(),
                    t.origin_value()
                );
            }
        }
        zoom.tick();

        if idle {
            thread::sleep(Duration::from_millis(4));
        }
    }

    let s = *zoom.state();
    zoom.remove();
    info!("live session ended at scale {:.3}", s.scale);
    Ok(())
}
