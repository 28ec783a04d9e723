//! Schematic symbol geometry and netlist generation.
//!
//! A [Symbol] is built either from its textual record description (see
//! [Symbol::parse_record]) or by the [gate] builder, transformed in place
//! by [Symbol::rotate90], [Symbol::mirror_x] and [Symbol::mirror_y], and
//! exported with [netlist::export].

mod error;
pub mod gate;
pub mod metrics;
pub mod netlist;
mod orientation;
mod parse;
mod record;
pub mod style;
mod transform;

pub use error::{ExportError, LoadError, ParseError};
pub use gate::{build_gate_symbol, GateKind, GateStyle};
pub use metrics::{MonospaceMetrics, TextMetrics};
pub use netlist::{export, ActiveState, Dialect, ExportOptions, VerilogStyle};
pub use orientation::Orientation;
pub use parse::{LoadPolicy, PrimitiveDelta};
pub use style::{Brush, BrushStyle, Color, Pen, PenStyle};

/// Full circle in arc angle units (1/16 degree)
pub const FULL_CIRCLE: i32 = 16 * 360;

/// Largest coordinate, extent or sweep magnitude accepted from a symbol
/// description. Keeps every transform well inside `i32`.
pub const COORD_LIMIT: i32 = 1 << 20;

/// A straight stroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub pen: Pen,
}

impl Line {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, pen: Pen) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            pen,
        }
    }
}

/// An elliptic arc inside the rectangle `(x, y, w, h)`
///
/// Angles are in 1/16 degree; `angle` stays within `[0, FULL_CIRCLE)`,
/// `arc_len` is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub angle: i32,
    pub arc_len: i32,
    pub pen: Pen,
}

impl Arc {
    pub fn new(x: i32, y: i32, w: i32, h: i32, angle: i32, arc_len: i32, pen: Pen) -> Self {
        Self {
            x,
            y,
            w,
            h,
            angle: angle.rem_euclid(FULL_CIRCLE),
            arc_len,
            pen,
        }
    }
}

/// A rectangle or ellipse inside `(x, y, w, h)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub pen: Pen,
    pub brush: Brush,
}

impl Area {
    pub fn new(x: i32, y: i32, w: i32, h: i32, pen: Pen, brush: Brush) -> Self {
        Self {
            x,
            y,
            w,
            h,
            pen,
            brush,
        }
    }
}

/// Text drawn as part of the symbol.
///
/// The rotation is kept as its `(cos, sin)` basis so quarter turns compose
/// exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub color: Color,
    pub size: f64,
    pub cos: f64,
    pub sin: f64,
    pub overline: bool,
    pub underline: bool,
}

impl TextLabel {
    pub fn new(x: i32, y: i32, text: impl Into<String>, color: Color, size: f64) -> Self {
        Self::rotated(x, y, text, color, size, 1.0, 0.0)
    }

    pub fn rotated(
        x: i32,
        y: i32,
        text: impl Into<String>,
        color: Color,
        size: f64,
        cos: f64,
        sin: f64,
    ) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            color,
            size,
            cos,
            sin,
            overline: false,
            underline: false,
        }
    }
}

/// A connection point. The node it is wired to is owned by the schematic
/// and supplied at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub x: i32,
    pub y: i32,
    /// False for placeholder slots without a drawn terminal
    pub available: bool,
}

impl Port {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            available: true,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            x: 0,
            y: 0,
            available: false,
        }
    }
}

/// A named, user editable component parameter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// Drawn next to the symbol
    pub display: bool,
    pub description: String,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        display: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            display,
            description: description.into(),
        }
    }
}

/// Axis aligned box in symbol-local coordinates.
///
/// A fresh box is empty (`x1 > x2`) and grows by folding points into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn empty() -> Self {
        Self::new(i32::MAX, i32::MAX, i32::MIN, i32::MIN)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    pub fn fold(&mut self, x: i32, y: i32) {
        self.x1 = self.x1.min(x);
        self.x2 = self.x2.max(x);
        self.y1 = self.y1.min(y);
        self.y2 = self.y2.max(y);
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 <= x && x <= self.x2 && self.y1 <= y && y <= self.y2
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// What a model name stands for, resolved once when the symbol is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Subcircuit or HDL block whose ports come from an external file
    Structural,
    Gate(GateKind),
    Generic,
}

impl From<&str> for ModelKind {
    fn from(model: &str) -> Self {
        match model {
            "Sub" | "VHDL" | "Verilog" => Self::Structural,
            m => GateKind::try_from(m).map_or(Self::Generic, Self::Gate),
        }
    }
}

/// The drawable symbol and metadata of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    model: String,
    kind: ModelKind,
    /// Instance name, e.g. `R1`
    pub name: String,
    pub show_name: bool,
    pub lines: Vec<Line>,
    pub arcs: Vec<Arc>,
    pub rects: Vec<Area>,
    pub ellipses: Vec<Area>,
    pub texts: Vec<TextLabel>,
    pub ports: Vec<Port>,
    pub properties: Vec<Property>,
    pub bounds: BoundingBox,
    /// Anchor of the name/property label block
    pub tx: i32,
    pub ty: i32,
    orientation: Orientation,
}

impl Symbol {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let kind = ModelKind::from(model.as_str());
        Self {
            model,
            kind,
            name: String::new(),
            show_name: true,
            lines: vec![],
            arcs: vec![],
            rects: vec![],
            ellipses: vec![],
            texts: vec![],
            ports: vec![],
            properties: vec![],
            bounds: BoundingBox::empty(),
            tx: 0,
            ty: 0,
            orientation: Orientation::R0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fixed by the model name given to [Symbol::new].
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Quarter turns applied so far, `0..=3`.
    pub fn rotation(&self) -> u8 {
        self.orientation.rotation()
    }

    pub fn is_mirrored_x(&self) -> bool {
        self.orientation.is_mirrored_x()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Lines of the label block: the name (if shown) and every displayed
    /// property as `name=value`.
    fn label_lines(&self) -> impl Iterator<Item = String> + '_ {
        let name = self.show_name.then(|| self.name.clone());
        name.into_iter().chain(
            self.properties
                .iter()
                .filter(|p| p.display)
                .map(|p| format!("{}={}", p.name, p.value)),
        )
    }

    /// Number of label lines and the `(width, height)` of the label block,
    /// each capped at [COORD_LIMIT].
    pub fn label_extent(&self, metrics: &dyn TextMetrics) -> (usize, i32, i32) {
        let (n, dx, dy) = self.label_lines().fold((0usize, 0i32, 0i32), |(n, dx, dy), line| {
            let (w, h) = metrics.label_line(&line);
            (n + 1, dx.max(w), dy.saturating_add(h))
        });
        (n, dx.clamp(0, COORD_LIMIT), dy.clamp(0, COORD_LIMIT))
    }

    /// Bounding box grown to include the label block.
    pub fn entire_bounds(&self, metrics: &dyn TextMetrics) -> BoundingBox {
        let mut b = self.bounds;
        let (_, dx, dy) = self.label_extent(metrics);
        if self.tx < b.x1 {
            b.x1 = self.tx;
        }
        if self.ty < b.y1 {
            b.y1 = self.ty;
        }
        if self.tx + dx > b.x2 {
            b.x2 = self.tx + dx;
        }
        if self.ty + dy > b.y2 {
            b.y2 = self.ty + dy;
        }
        b
    }

    /// Clears every drawn primitive and port, runs `create` to draw the
    /// symbol again and reapplies the current orientation.
    pub fn recreate<F>(&mut self, metrics: &dyn TextMetrics, create: F)
    where
        F: FnOnce(&mut Symbol),
    {
        self.lines.clear();
        self.arcs.clear();
        self.rects.clear();
        self.ellipses.clear();
        self.texts.clear();
        self.ports.clear();

        let orientation = self.orientation;
        self.orientation = Orientation::R0;
        create(self);
        self.apply_orientation(orientation, metrics);
        self.orientation = orientation;
    }
}
