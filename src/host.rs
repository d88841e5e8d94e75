//! Capabilities the controller borrows from its host: layout queries, a
//! render surface and a clock. `SimulatedDom` implements the first two
//! without a browser and backs replay, live preview and the tests.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use serde::Serialize;

use crate::geometry::{Point, Rect, Size, simulate_transformation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Zoomable,
    Viewport,
}

/// Read-only layout queries. Rectangles are absolute, page scroll included.
pub trait LayoutProvider {
    fn bounding_rect(&self, el: Element) -> Rect;
    /// Content size including overflow.
    fn scroll_size(&self, el: Element) -> Size;
    /// Rendered size of the box itself.
    fn offset_size(&self, el: Element) -> Size;
}

/// CSS-equivalent transform: `translate3d(translation) scale(scale)` with
/// `transform-origin: origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CssTransform {
    pub translation: Point,
    pub scale: f64,
    pub origin: Point,
}

impl CssTransform {
    pub fn transform_value(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0) scale({})",
            self.translation.x, self.translation.y, self.scale
        )
    }

    pub fn origin_value(&self) -> String {
        format!("{}px {}px", self.origin.x, self.origin.y)
    }
}

pub trait RenderSurface {
    fn apply_transform(&mut self, transform: &CssTransform);
    fn clear_transform(&mut self);
    fn set_viewport_height(&mut self, height: f64);
    /// Limits native touch handling on the zoomable to panning.
    fn restrict_touch_action(&mut self);
    fn hide_viewport_overflow(&mut self);
    fn attach_listeners(&mut self);
    fn detach_listeners(&mut self);
}

/// Everything the controller needs from the page.
pub trait Dom: LayoutProvider + RenderSurface {}

impl<T: LayoutProvider + RenderSurface> Dom for T {}

pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock driven by hand; replay and tests share it through an `Rc`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    #[cfg(test)]
    pub fn advance(&self, by: u64) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// In-memory page: a viewport and a zoomable laid out at the same spot, with
/// page scroll and the last applied transform. The zoomable's box is as large
/// as its content and its bounding rect is the simulated outcome of the
/// transform, as a browser would report it.
#[derive(Debug, Clone)]
pub struct SimulatedDom {
    viewport: Rect,
    zoomable_at: Point,
    content: Size,
    scroll: Point,
    transform: Option<CssTransform>,
    pub touch_action_restricted: bool,
    pub overflow_hidden: bool,
    pub listeners_attached: bool,
}

impl SimulatedDom {
    /// The zoomable starts at the viewport's corner with `content` as its size.
    pub fn new(viewport: Rect, content: Size) -> Self {
        Self {
            viewport,
            zoomable_at: viewport.origin(),
            content,
            scroll: Point::ZERO,
            transform: None,
            touch_action_restricted: false,
            overflow_hidden: false,
            listeners_attached: false,
        }
    }

    /// Scrolls the page; both elements move up/left on screen.
    #[cfg(test)]
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll = self.scroll.add(Point::new(dx, dy));
    }

    pub fn transform(&self) -> Option<&CssTransform> {
        self.transform.as_ref()
    }

    pub fn viewport_rect(&self) -> Rect {
        self.bounding_rect(Element::Viewport)
    }

    fn on_screen(&self, p: Point) -> Point {
        p.sub(self.scroll)
    }
}

impl LayoutProvider for SimulatedDom {
    fn bounding_rect(&self, el: Element) -> Rect {
        match el {
            Element::Viewport => {
                let at = self.on_screen(self.viewport.origin());
                Rect::from_origin_size(
                    at,
                    Size::new(self.viewport.width(), self.viewport.height()),
                )
            }
            Element::Zoomable => {
                let at = self.on_screen(self.zoomable_at);
                match &self.transform {
                    Some(t) => {
                        simulate_transformation(at, self.content, t.origin, t.translation, t.scale)
                    }
                    None => Rect::from_origin_size(at, self.content),
                }
            }
        }
    }

    fn scroll_size(&self, el: Element) -> Size {
        match el {
            Element::Zoomable => self.content,
            Element::Viewport => Size::new(
                self.viewport.width().max(self.content.width),
                self.viewport.height().max(self.content.height),
            ),
        }
    }

    fn offset_size(&self, el: Element) -> Size {
        match el {
            Element::Zoomable => self.content,
            Element::Viewport => Size::new(self.viewport.width(), self.viewport.height()),
        }
    }
}

impl RenderSurface for SimulatedDom {
    fn apply_transform(&mut self, transform: &CssTransform) {
        self.transform = Some(*transform);
    }

    fn clear_transform(&mut self) {
        self.transform = None;
    }

    fn set_viewport_height(&mut self, height: f64) {
        self.viewport.y2 = self.viewport.y + height;
    }

    fn restrict_touch_action(&mut self) {
        self.touch_action_restricted = true;
    }

    fn hide_viewport_overflow(&mut self) {
        self.overflow_hidden = true;
    }

    fn attach_listeners(&mut self) {
        self.listeners_attached = true;
    }

    fn detach_listeners(&mut self) {
        self.listeners_attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untransformed_zoomable_spans_its_content() {
        let dom = SimulatedDom::new(Rect::new(0.0, 50.0, 400.0, 650.0), Size::new(800.0, 1200.0));
        assert_eq!(
            dom.bounding_rect(Element::Zoomable),
            Rect::new(0.0, 50.0, 800.0, 1250.0)
        );
        assert_eq!(dom.scroll_size(Element::Viewport), Size::new(800.0, 1200.0));
    }

    #[test]
    fn scroll_moves_both_elements() {
        let mut dom = SimulatedDom::new(Rect::new(0.0, 50.0, 400.0, 650.0), Size::new(400.0, 600.0));
        dom.scroll_by(0.0, 30.0);
        assert_eq!(dom.viewport_rect().y, 20.0);
        assert_eq!(dom.bounding_rect(Element::Zoomable).y, 20.0);
    }

    #[test]
    fn transformed_zoomable_reports_scaled_rect() {
        let mut dom = SimulatedDom::new(Rect::new(0.0, 0.0, 400.0, 600.0), Size::new(400.0, 600.0));
        dom.apply_transform(&CssTransform {
            translation: Point::new(10.0, 0.0),
            scale: 2.0,
            origin: Point::new(200.0, 300.0),
        });
        let r = dom.bounding_rect(Element::Zoomable);
        assert_eq!(r, Rect::new(-190.0, -300.0, 610.0, 900.0));
    }

    #[test]
    fn css_values() {
        let t = CssTransform {
            translation: Point::new(1.5, -2.0),
            scale: 1.25,
            origin: Point::new(3.0, 4.0),
        };
        assert_eq!(t.transform_value(), "translate3d(1.5px, -2px, 0) scale(1.25)");
        assert_eq!(t.origin_value(), "3px 4px");
    }

    #[test]
    fn manual_clock_through_rc() {
        let clock = Rc::new(ManualClock::new(5));
        let shared = Rc::clone(&clock);
        clock.advance(10);
        assert_eq!(shared.now_ms(), 15);
    }
}
