//! Quarter-turn rotation and axis mirroring of a symbol in place.
//!
//! Only geometry moves: properties keep their names, values and
//! visibility, ports keep their order.

use crate::{metrics::TextMetrics, BoundingBox, ModelKind, Orientation, Symbol, FULL_CIRCLE};

const QUARTER_TURN: i32 = 16 * 90;
const HALF_TURN: i32 = 16 * 180;

impl Symbol {
    /// Subcircuit and HDL block symbols get their ports from another file;
    /// until then there is nothing to transform.
    fn is_placeholder(&self) -> bool {
        self.kind == ModelKind::Structural && self.ports.is_empty()
    }

    /// Rotates the symbol a quarter turn counter-clockwise (y pointing
    /// down), `(x, y) -> (y, -x)`.
    pub fn rotate90(&mut self, metrics: &dyn TextMetrics) {
        if self.is_placeholder() {
            log::trace!("Not rotating {}: no ports yet", self.model);
            return;
        }

        for l in &mut self.lines {
            (l.x1, l.y1) = (l.y1, -l.x1);
            (l.x2, l.y2) = (l.y2, -l.x2);
        }
        for p in &mut self.ports {
            (p.x, p.y) = (p.y, -p.x);
        }
        for a in &mut self.arcs {
            (a.x, a.y) = (a.y, -a.x - a.w);
            (a.w, a.h) = (a.h, a.w);
            a.angle = (a.angle + QUARTER_TURN).rem_euclid(FULL_CIRCLE);
        }
        for a in self.rects.iter_mut().chain(&mut self.ellipses) {
            (a.x, a.y) = (a.y, -a.x - a.w);
            (a.w, a.h) = (a.h, a.w);
        }
        for t in &mut self.texts {
            (t.x, t.y) = (t.y, -t.x);
            (t.cos, t.sin) = (-t.sin, t.cos);
        }

        (self.tx, self.ty) = (self.ty, -self.tx);
        if !self.bounds.is_empty() {
            let b = self.bounds;
            self.bounds = BoundingBox::new(b.y1, -b.x2, b.y2, -b.x1);
            self.relocate_label_after_rotation(metrics);
        }

        self.orientation = self.orientation.rotated();
        log::trace!("Rotated {} to {:?}", self.name, self.orientation);
    }

    /// Moves the label block back beside the symbol, depending on which
    /// side of the rotated box it ended up on.
    fn relocate_label_after_rotation(&mut self, metrics: &dyn TextMetrics) {
        let (_, dx, dy) = self.label_extent(metrics);
        let b = self.bounds;
        if self.tx > b.x2 {
            self.ty = b.y1 - self.ty + b.y2;
        } else if self.ty < b.y1 {
            self.ty -= dy;
        } else if self.tx < b.x1 {
            self.tx += dy - dx;
            self.ty = b.y1 - self.ty + b.y2;
        } else {
            self.ty -= dx;
        }
    }

    /// Mirrors the symbol about the x axis, `y -> -y`.
    pub fn mirror_x(&mut self, metrics: &dyn TextMetrics) {
        if self.is_placeholder() {
            log::trace!("Not mirroring {}: no ports yet", self.model);
            return;
        }

        for l in &mut self.lines {
            l.y1 = -l.y1;
            l.y2 = -l.y2;
        }
        for p in &mut self.ports {
            p.y = -p.y;
        }
        for a in &mut self.arcs {
            a.y = -a.y - a.h;
            // start from the other end of the arc
            a.angle = (-a.angle - a.arc_len).rem_euclid(FULL_CIRCLE);
        }
        for a in self.rects.iter_mut().chain(&mut self.ellipses) {
            a.y = -a.y - a.h;
        }
        for t in &mut self.texts {
            let (w, h) = metrics.measure(&t.text, t.size);
            t.y = -t.y - (t.cos as i32) * h + (t.sin as i32) * w;
        }

        if !self.bounds.is_empty() {
            let b = self.bounds;
            self.bounds = BoundingBox::new(b.x1, -b.y2, b.x2, -b.y1);

            let (_, _, dy) = self.label_extent(metrics);
            let b = self.bounds;
            if self.tx > b.x1 && self.tx < b.x2 {
                self.ty = -self.ty - dy;
            } else {
                self.ty = b.y1 + self.ty + b.y2;
            }
        }

        self.orientation = self.orientation.mirrored_x();
        log::trace!("Mirrored {} to {:?}", self.name, self.orientation);
    }

    /// Mirrors the symbol about the y axis, `x -> -x`.
    pub fn mirror_y(&mut self, metrics: &dyn TextMetrics) {
        if self.is_placeholder() {
            log::trace!("Not mirroring {}: no ports yet", self.model);
            return;
        }

        for l in &mut self.lines {
            l.x1 = -l.x1;
            l.x2 = -l.x2;
        }
        for p in &mut self.ports {
            p.x = -p.x;
        }
        for a in &mut self.arcs {
            a.x = -a.x - a.w;
            a.angle = (HALF_TURN - a.angle - a.arc_len).rem_euclid(FULL_CIRCLE);
        }
        for a in self.rects.iter_mut().chain(&mut self.ellipses) {
            a.x = -a.x - a.w;
        }
        for t in &mut self.texts {
            let (w, h) = metrics.measure(&t.text, t.size);
            t.x = -t.x - (t.sin as i32) * h - (t.cos as i32) * w;
        }

        if !self.bounds.is_empty() {
            let b = self.bounds;
            self.bounds = BoundingBox::new(-b.x2, b.y1, -b.x1, b.y2);

            let (_, dx, _) = self.label_extent(metrics);
            let b = self.bounds;
            if self.ty > b.y1 && self.ty < b.y2 {
                self.tx = -self.tx - dx;
            } else {
                self.tx = b.x1 + self.tx + b.x2;
            }
        }

        self.orientation = self.orientation.mirrored_y();
        log::trace!("Mirrored {} to {:?}", self.name, self.orientation);
    }

    /// Brings a freshly drawn symbol into `orientation`. A mirrored half
    /// turn is replayed as a single y mirror.
    pub(crate) fn apply_orientation(&mut self, orientation: Orientation, metrics: &dyn TextMetrics) {
        if orientation.is_mirrored_x() && orientation.rotation() == 2 {
            self.mirror_y(metrics);
            return;
        }
        if orientation.is_mirrored_x() {
            self.mirror_x(metrics);
        }
        for _ in 0..orientation.rotation() {
            self.rotate90(metrics);
        }
    }
}
