//! Pointer input for the particle field.
//!
//! The pointer adapter is the only writer of the pointer position and the
//! render loop the only reader. They share a single-slot cell created by
//! [`latest_value`]: each write overwrites the slot, each read returns the
//! most recent value (or the initial one if nothing was written yet).
//!
//! Everything runs on the event-loop thread, so the cell is `Rc`-based.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::viewport::ViewportState;

/// Writing half of a single-slot latest-value cell.
#[derive(Debug)]
pub struct LatestWriter<T: Copy> {
    slot: Rc<Cell<T>>,
}

/// Reading half of a single-slot latest-value cell.
#[derive(Debug)]
pub struct LatestReader<T: Copy> {
    slot: Rc<Cell<T>>,
}

/// Create a connected writer/reader pair holding `initial`.
pub fn latest_value<T: Copy>(initial: T) -> (LatestWriter<T>, LatestReader<T>) {
    let slot = Rc::new(Cell::new(initial));
    (
        LatestWriter { slot: slot.clone() },
        LatestReader { slot },
    )
}

impl<T: Copy> LatestWriter<T> {
    /// Replace the stored value.
    pub fn publish(&self, value: T) {
        self.slot.set(value);
    }

    /// Whether the reader has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Rc::strong_count(&self.slot) == 1
    }
}

impl<T: Copy> LatestReader<T> {
    /// Most recently published value.
    pub fn latest(&self) -> T {
        self.slot.get()
    }
}

/// Map a surface-local pixel position to `[-1, 1]²`, +Y up.
///
/// Returns `None` when the position lies outside the surface or the surface
/// has no area.
pub fn normalize_pointer(x: f64, y: f64, viewport: &ViewportState) -> Option<Vec2> {
    if viewport.is_empty() {
        return None;
    }
    let (w, h) = (viewport.width as f64, viewport.height as f64);
    if !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
        return None;
    }
    Some(Vec2::new(
        ((x / w) * 2.0 - 1.0) as f32,
        (-((y / h) * 2.0 - 1.0)) as f32,
    ))
}

/// Turns pointer-move events into normalized positions for the render loop.
#[derive(Debug)]
pub struct PointerAdapter {
    writer: LatestWriter<Vec2>,
    viewport: ViewportState,
}

impl PointerAdapter {
    /// Create an adapter and the reader the render loop consumes.
    pub fn new(viewport: ViewportState) -> (Self, LatestReader<Vec2>) {
        let (writer, reader) = latest_value(Vec2::ZERO);
        (Self { writer, viewport }, reader)
    }

    /// Track the surface size used for normalization.
    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
    }

    /// Handle a pointer move in surface pixels. Moves outside the surface are
    /// ignored and the last position is kept.
    pub fn on_pointer_move(&self, x: f64, y: f64) -> Option<Vec2> {
        let ndc = normalize_pointer(x, y, &self.viewport)?;
        self.writer.publish(ndc);
        Some(ndc)
    }

    /// Whether the render loop stopped listening.
    pub fn is_detached(&self) -> bool {
        self.writer.is_orphaned()
    }
}
