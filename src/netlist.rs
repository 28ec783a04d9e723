//! Netlist and HDL text for one component.
//!
//! Every dialect has its own netlister; [export] resolves the port bindings and
//! picks the netlister for the requested dialect and activity state.

use std::fmt::Write;

use serde::Deserialize;

use crate::{
    error::ExportError,
    gate::{GateFamily, GateKind},
    ModelKind, Symbol,
};

mod delay;

pub use delay::{verilog_delay, vhdl_delay};

/// Index of the delay property of a gate
const GATE_DELAY: usize = 2;

/// Simulation state of a component in its schematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveState {
    #[default]
    Active,
    /// Left out of the simulation
    Open,
    /// Replaced by shorts between its first port and all others
    Shorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Analog,
    Verilog,
    Vhdl,
}

/// How gates are written in Verilog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerilogStyle {
    /// Continuous assignment, `assign y = a & b;`
    #[default]
    Assign,
    /// Gate primitive instance, `and g (y, a, b);`
    Primitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Truth-table simulation; gate delays are left out
    pub truth_table: bool,
    pub verilog_style: VerilogStyle,
}

/// Writes the text of one component in a netlist dialect. `nodes` holds
/// one node name per port, in port order.
trait Netlister {
    fn generic(&self, symbol: &Symbol, nodes: &[&str]) -> String;

    fn gate(&self, symbol: &Symbol, kind: GateKind, nodes: &[&str]) -> Result<String, ExportError>;

    fn shorted(&self, symbol: &Symbol, nodes: &[&str]) -> String;
}

struct Analog;

struct Verilog {
    options: ExportOptions,
}

struct Vhdl {
    options: ExportOptions,
}

/// Writes `symbol` in `dialect`, with `nodes[i]` the node port `i` is
/// connected to.
///
/// An [Open](ActiveState::Open) component and a component without a
/// digital model yield an empty string.
pub fn export<S: AsRef<str>>(
    symbol: &Symbol,
    nodes: &[S],
    state: ActiveState,
    dialect: Dialect,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    if state == ActiveState::Open {
        return Ok(String::new());
    }
    let nodes = bind(symbol, nodes)?;

    let netlister: Box<dyn Netlister> = match dialect {
        Dialect::Analog => Box::new(Analog),
        Dialect::Verilog => Box::new(Verilog { options: *options }),
        Dialect::Vhdl => Box::new(Vhdl { options: *options }),
    };
    let text = match (state, symbol.kind) {
        (ActiveState::Shorted, _) => netlister.shorted(symbol, &nodes),
        (_, ModelKind::Gate(kind)) => netlister.gate(symbol, kind, &nodes)?,
        _ => netlister.generic(symbol, &nodes),
    };
    log::debug!("Exported {} as {dialect:?} ({state:?})", symbol.name);
    Ok(text)
}

/// Node name of every port; each port must be connected.
fn bind<'a, S: AsRef<str>>(symbol: &Symbol, nodes: &'a [S]) -> Result<Vec<&'a str>, ExportError> {
    (0..symbol.ports.len())
        .map(|i| {
            nodes
                .get(i)
                .map(AsRef::as_ref)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ExportError::UnboundPort {
                    component: symbol.name.clone(),
                    index: i + 1,
                })
        })
        .collect()
}

/// Delay property of a gate, or nothing in truth-table mode
fn gate_delay<'a>(symbol: &'a Symbol, options: &ExportOptions) -> Option<&'a str> {
    if options.truth_table {
        return None;
    }
    Some(
        symbol
            .properties
            .get(GATE_DELAY)
            .map_or("", |p| p.value.as_str()),
    )
}

impl Netlister for Analog {
    fn generic(&self, symbol: &Symbol, nodes: &[&str]) -> String {
        let mut s = format!("{}:{}", symbol.model, symbol.name);
        for node in nodes {
            let _ = write!(s, " {node}");
        }
        for p in symbol.properties.iter().filter(|p| p.name != "Symbol") {
            let _ = write!(s, " {}=\"{}\"", p.name, p.value);
        }
        s.push('\n');
        s
    }

    /// Gate models take the level, delay and transfer scale properties.
    fn gate(&self, symbol: &Symbol, _: GateKind, nodes: &[&str]) -> Result<String, ExportError> {
        let mut s = format!("{}:{}", symbol.model, symbol.name);
        for node in nodes {
            let _ = write!(s, " {node}");
        }
        for p in symbol.properties.iter().skip(1).take(3) {
            let _ = write!(s, " {}=\"{}\"", p.name, p.value);
        }
        s.push('\n');
        Ok(s)
    }

    fn shorted(&self, symbol: &Symbol, nodes: &[&str]) -> String {
        let Some((first, rest)) = nodes.split_first() else {
            return String::new();
        };
        rest.iter().enumerate().fold(String::new(), |mut s, (k, node)| {
            let _ = writeln!(s, "R:{}.{k} {first} {node} R=\"0\"", symbol.name);
            s
        })
    }
}

impl Verilog {
    fn operator(kind: GateKind) -> &'static str {
        match (kind.family(), kind) {
            (_, GateKind::Xnor) => "^~",
            (GateFamily::And, _) => "&",
            (GateFamily::Or, _) => "|",
            (GateFamily::Xor, _) => "^",
        }
    }
}

impl Netlister for Verilog {
    fn generic(&self, _: &Symbol, _: &[&str]) -> String {
        String::new()
    }

    fn gate(&self, symbol: &Symbol, kind: GateKind, nodes: &[&str]) -> Result<String, ExportError> {
        let Some((out, inputs)) = nodes.split_first() else {
            return Ok(String::new());
        };
        let delay = match gate_delay(symbol, &self.options) {
            Some(value) => verilog_delay(value, &symbol.name)?,
            None => String::new(),
        };

        let s = match self.options.verilog_style {
            VerilogStyle::Assign => {
                let op = format!(" {} ", Self::operator(kind));
                let mut expr = inputs.join(op.as_str());
                if kind.is_negated() {
                    expr = format!("~({expr})");
                }
                format!("  assign{delay} {out} = {expr};\n")
            }
            VerilogStyle::Primitive => {
                let primitive = kind.model().to_lowercase();
                format!(
                    "  {primitive}{delay} {} ({out}, {});\n",
                    symbol.name,
                    inputs.join(", ")
                )
            }
        };
        Ok(s)
    }

    fn shorted(&self, _: &Symbol, nodes: &[&str]) -> String {
        let Some((first, rest)) = nodes.split_first() else {
            return String::new();
        };
        rest.iter().fold(String::new(), |mut s, node| {
            let _ = writeln!(s, "  assign {node} = {first};");
            s
        })
    }
}

impl Netlister for Vhdl {
    fn generic(&self, _: &Symbol, _: &[&str]) -> String {
        String::new()
    }

    fn gate(&self, symbol: &Symbol, kind: GateKind, nodes: &[&str]) -> Result<String, ExportError> {
        let Some((out, inputs)) = nodes.split_first() else {
            return Ok(String::new());
        };

        let expr = match kind {
            // std_logic has no xnor; xnor is associative so it nests
            GateKind::Xnor => {
                let mut inputs = inputs.iter();
                let first = inputs.next().map_or(String::new(), |n| (*n).to_owned());
                inputs.fold(first, |rhs, node| format!("not (({rhs}) xor {node})"))
            }
            _ => {
                let op = match kind.family() {
                    GateFamily::And => " and ",
                    GateFamily::Or => " or ",
                    GateFamily::Xor => " xor ",
                };
                let expr = inputs.join(op);
                if kind.is_negated() {
                    format!("not ({expr})")
                } else {
                    expr
                }
            }
        };

        let delay = match gate_delay(symbol, &self.options) {
            Some(value) => vhdl_delay(value, &symbol.name)?,
            None => String::new(),
        };
        Ok(format!("  {out} <= {expr}{delay};\n"))
    }

    /// Only the first two ports are tied together.
    fn shorted(&self, _: &Symbol, nodes: &[&str]) -> String {
        match nodes {
            [first, second, ..] => format!("  {first} <= {second};\n"),
            _ => String::new(),
        }
    }
}
