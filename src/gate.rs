//! Logic gate symbols drawn from their input count and symbol style.

use std::fmt::Display;

use crate::{
    style::{Brush, Color, Pen},
    Arc, Area, BoundingBox, Line, ModelKind, Port, Property, Symbol, TextLabel, FULL_CIRCLE,
};

const MIN_INPUTS: i64 = 2;
const MAX_INPUTS: i64 = 8;

const BODY: Pen = Pen::new(Color::DARK_BLUE, 2);
const THIN: Pen = Pen::new(Color::DARK_BLUE, 1);
const HAIRLINE: Pen = Pen::new(Color::DARK_BLUE, 0);
const GLYPH_SIZE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

/// Boolean operator a gate applies before an optional output negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFamily {
    And,
    Or,
    Xor,
}

impl GateKind {
    /// Model name used in schematics and netlists
    pub fn model(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xnor => "XNOR",
        }
    }

    pub fn family(self) -> GateFamily {
        match self {
            Self::And | Self::Nand => GateFamily::And,
            Self::Or | Self::Nor => GateFamily::Or,
            Self::Xor | Self::Xnor => GateFamily::Xor,
        }
    }

    /// NAND and NOR: the output of the family operator is inverted.
    ///
    /// XNOR is not in this group; HDLs express it with its own operator.
    pub fn is_negated(self) -> bool {
        matches!(self, Self::Nand | Self::Nor)
    }
}

impl TryFrom<&str> for GateKind {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "XOR" => Ok(Self::Xor),
            "NAND" => Ok(Self::Nand),
            "NOR" => Ok(Self::Nor),
            "XNOR" => Ok(Self::Xnor),
            _ => Err(()),
        }
    }
}

/// Drawing convention of a gate symbol, stored in its `Symbol` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateStyle {
    /// Rounded body
    #[default]
    Old,
    /// Rectangular body with an operator glyph
    Din,
}

impl From<&str> for GateStyle {
    fn from(value: &str) -> Self {
        if value.starts_with('D') {
            Self::Din
        } else {
            Self::Old
        }
    }
}

impl Display for GateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::Din => write!(f, "DIN40900"),
        }
    }
}

/// Creates a gate with its default properties and draws its symbol.
///
/// `input_count` is clamped to `2..=8`.
pub fn build_gate_symbol(kind: GateKind, input_count: usize, style: GateStyle) -> Symbol {
    let inputs = input_count.clamp(MIN_INPUTS as usize, MAX_INPUTS as usize);

    let mut symbol = Symbol::new(kind.model());
    symbol.name = "Y".to_owned();
    // create_symbol relies on this order
    symbol.properties = vec![
        Property::new("in", inputs.to_string(), false, "number of input ports"),
        Property::new("V", "1 V", false, "voltage of high level"),
        Property::new("t", "0", false, "delay time"),
        Property::new("TR", "10", false, "transfer function scaling factor"),
        Property::new(
            "Symbol",
            style.to_string(),
            false,
            "schematic symbol [old, DIN40900]",
        ),
    ];
    create_symbol(&mut symbol);
    symbol
}

/// Draws a gate symbol from its `in` (first) and `Symbol` (last)
/// properties. The clamped input count is written back to `in`.
///
/// Suitable as the builder passed to [Symbol::recreate].
pub fn create_symbol(symbol: &mut Symbol) {
    let ModelKind::Gate(kind) = symbol.kind else {
        log::warn!("{} is not a gate model", symbol.model);
        return;
    };

    let inputs = match symbol.properties.first_mut() {
        Some(prop) => {
            let n = prop
                .value
                .parse::<i64>()
                .unwrap_or(0)
                .clamp(MIN_INPUTS, MAX_INPUTS) as i32;
            prop.value = n.to_string();
            n
        }
        None => MIN_INPUTS as i32,
    };
    let style = symbol
        .properties
        .last()
        .map_or(GateStyle::Old, |p| GateStyle::from(p.value.as_str()));

    let y = 10 * inputs;
    symbol.bounds = BoundingBox::new(-30, -y - 3, 30, y + 3);
    symbol.tx = symbol.bounds.x1 + 4;
    symbol.ty = symbol.bounds.y2 + 4;

    let (xl, xr) = match style {
        GateStyle::Din => draw_din_body(symbol, kind, y),
        GateStyle::Old => draw_old_body(symbol, kind, y),
    };

    if kind.is_negated() {
        symbol.ellipses.push(bubble(xr));
    }

    symbol.ports.push(Port::new(30, 0));
    let mut py = y + 10;
    for z in 0..inputs {
        py -= 20;
        symbol.ports.push(Port::new(-30, py));
        // outer inputs of the old OR body end at the curve
        let end = if xl == 10 && (z == 0 || z == inputs - 1) {
            9
        } else {
            xl
        };
        symbol.lines.push(Line::new(-30, py, end, py, BODY));
    }
    log::debug!("Drew {} with {inputs} inputs ({style})", kind.model());
}

fn bubble(x: i32) -> Area {
    Area::new(x, -4, 8, 8, HAIRLINE, Brush::solid(Color::DARK_BLUE))
}

fn glyph(x: i32, y: i32, text: &str) -> TextLabel {
    TextLabel::new(x, y, text, Color::DARK_BLUE, GLYPH_SIZE)
}

/// Returns where the input strokes end and where the output bubble sits.
fn draw_din_body(symbol: &mut Symbol, kind: GateKind, y: i32) -> (i32, i32) {
    let (xl, xr) = (-15, 15);
    symbol.lines.extend([
        Line::new(15, -y, 15, y, BODY),
        Line::new(-15, -y, 15, -y, BODY),
        Line::new(-15, y, 15, y, BODY),
        Line::new(-15, -y, -15, y, BODY),
        Line::new(15, 0, 30, 0, BODY),
    ]);

    match kind.family() {
        GateFamily::Or => {
            // ">=" drawn by hand in front of the "1"
            symbol.lines.extend([
                Line::new(-11, 6 - y, -6, 9 - y, HAIRLINE),
                Line::new(-11, 12 - y, -6, 9 - y, HAIRLINE),
                Line::new(-11, 14 - y, -6, 14 - y, HAIRLINE),
                Line::new(-11, 16 - y, -6, 16 - y, HAIRLINE),
            ]);
            symbol.texts.push(glyph(-4, 3 - y, "1"));
        }
        GateFamily::And => symbol.texts.push(glyph(-10, 3 - y, "&")),
        GateFamily::Xor => {
            if kind == GateKind::Xnor {
                symbol.ellipses.push(bubble(xr));
            }
            symbol.texts.push(glyph(-11, 3 - y, "=1"));
        }
    }
    (xl, xr)
}

fn draw_old_body(symbol: &mut Symbol, kind: GateKind, y: i32) -> (i32, i32) {
    let xl = if kind.family() == GateFamily::Or { 10 } else { -10 };
    let xr = 10;
    symbol.lines.extend([
        Line::new(-10, -y, -10, y, BODY),
        Line::new(10, 0, 30, 0, BODY),
    ]);
    symbol.arcs.extend([
        Arc::new(-30, -y, 40, 30, 0, 16 * 90, BODY),
        Arc::new(-30, y - 30, 40, 30, 0, -16 * 90, BODY),
    ]);
    symbol.lines.push(Line::new(10, 15 - y, 10, y - 15, BODY));

    if kind.family() == GateFamily::Xor {
        symbol.lines.push(Line::new(-5, 0, 5, 0, THIN));
        if kind == GateKind::Xnor {
            symbol.lines.extend([
                Line::new(-5, -3, 5, -3, THIN),
                Line::new(-5, 3, 5, 3, THIN),
            ]);
        } else {
            symbol
                .arcs
                .push(Arc::new(-5, -5, 10, 10, 0, FULL_CIRCLE, THIN));
            symbol.lines.push(Line::new(0, -5, 0, 5, THIN));
        }
    }
    (xl, xr)
}
