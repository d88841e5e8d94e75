//! Touch-event batches as delivered to the zoomable.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

pub type TargetId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchKind {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub identifier: i32,
    pub x: f64,
    pub y: f64,
}

impl Touch {
    pub fn new(identifier: i32, x: f64, y: f64) -> Self {
        Self { identifier, x, y }
    }

    pub fn client(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One touch event: `touches` are the fingers still down, `changed` the
/// fingers this event is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    #[serde(rename = "type")]
    pub kind: TouchKind,
    #[serde(default)]
    pub touches: Vec<Touch>,
    #[serde(default)]
    pub changed: Vec<Touch>,
    #[serde(default = "default_cancelable")]
    pub cancelable: bool,
    #[serde(default)]
    pub target: Option<TargetId>,
}

fn default_cancelable() -> bool {
    true
}

impl TouchEvent {
    pub fn new(kind: TouchKind, touches: Vec<Touch>, changed: Vec<Touch>) -> Self {
        Self {
            kind,
            touches,
            changed,
            cancelable: true,
            target: None,
        }
    }

    #[cfg(test)]
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    #[cfg(test)]
    pub fn non_cancelable(mut self) -> Self {
        self.cancelable = false;
        self
    }
}

/// Gesture an event was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recognized {
    Pinch { new_session: bool },
    Drag,
    TapScheduled,
    DoubleTap,
}

/// What the host should do with the event after the controller saw it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub default_prevented: bool,
    pub gesture: Option<Recognized>,
}

impl EventResponse {
    pub const PASS: EventResponse = EventResponse {
        default_prevented: false,
        gesture: None,
    };

    pub fn recognized(gesture: Recognized, default_prevented: bool) -> Self {
        Self {
            default_prevented,
            gesture: Some(gesture),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_line_defaults() {
        let ev: TouchEvent = serde_json::from_str(
            r#"{"type":"move","touches":[{"identifier":3,"x":10.5,"y":4}]}"#,
        )
        .unwrap();
        assert_eq!(ev.kind, TouchKind::Move);
        assert!(ev.cancelable);
        assert!(ev.changed.is_empty());
        assert_eq!(ev.target, None);
        assert_eq!(ev.touches[0].client(), Point::new(10.5, 4.0));
    }
}
