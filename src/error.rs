use thiserror::Error;

/// Symbol record parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Field {field} is not a valid integer: {value:?}")]
    MalformedField { field: usize, value: String },
    #[error("Invalid color {0:?}")]
    InvalidColor(String),
    #[error("Field {field} is not a valid style: {value}")]
    InvalidStyle { field: usize, value: i32 },
    #[error("Text record has no text")]
    EmptyText,
}

/// A record that failed while loading a whole symbol description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Line {line}: {source} in record {record:?}")]
pub struct LoadError {
    /// 1-based line number of the failing record
    pub line: usize,
    pub record: String,
    #[source]
    pub source: ParseError,
}

/// Netlist and HDL export errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Port {index} of {component} is not connected to a node")]
    UnboundPort { component: String, index: usize },
    #[error(
        "Wrong time format in \"{component}\". Use positive number with units {units}"
    )]
    InvalidDelay {
        component: String,
        units: &'static str,
    },
}
