//! Input device discovery (evdev 0.13.2 compatible)

use evdev::{AbsoluteAxisCode, Device, EventType};

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

/// Raw position range a device reports on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            let is_event_node = p
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with("event"));
            if !is_event_node {
                continue;
            }
            if let Ok(dev) = Device::open(&p) {
                if is_multitouch(&dev) {
                    out.push(DeviceInfo {
                        path: p.display().to_string(),
                        name: dev.name().unwrap_or("unknown").to_string(),
                    });
                }
            }
        }
    }
    out
}

/// X and Y position ranges of a multitouch device, if it reports them.
pub fn position_ranges(dev: &Device) -> Option<(AxisRange, AxisRange)> {
    let state = dev.get_abs_state().ok()?;
    let x = state.get(AbsoluteAxisCode::ABS_MT_POSITION_X.0 as usize)?;
    let y = state.get(AbsoluteAxisCode::ABS_MT_POSITION_Y.0 as usize)?;
    if x.maximum <= x.minimum || y.maximum <= y.minimum {
        return None;
    }
    Some((
        AxisRange {
            min: x.minimum,
            max: x.maximum,
        },
        AxisRange {
            min: y.minimum,
            max: y.maximum,
        },
    ))
}
