//! Gate delay values as written in the `t` property.

use crate::error::ExportError;

/// Units accepted for Verilog delays, with their factor to picoseconds
const VERILOG_UNITS: [(&str, f64); 6] = [
    ("fs", 1e-3),
    ("ps", 1.0),
    ("ns", 1e3),
    ("us", 1e6),
    ("ms", 1e9),
    ("s", 1e12),
];
const VERILOG_UNIT_LIST: &str = "fs, ps, ns, us, ms, s";

const VHDL_UNITS: [&str; 8] = ["fs", "ps", "ns", "us", "ms", "sec", "min", "hr"];
const VHDL_UNIT_LIST: &str = "fs, ps, ns, us, ms, sec, min, hr";

#[derive(Debug, PartialEq)]
enum Delay<'a> {
    None,
    /// Names a parameter; emitted verbatim
    Parameter,
    Time(f64, &'a str),
}

impl<'a> From<&'a str> for Delay<'a> {
    fn from(value: &'a str) -> Self {
        match split_number(value) {
            Some((time, unit)) if time != 0.0 => Delay::Time(time, unit.trim_start_matches(' ')),
            _ if value.starts_with(|c: char| c.is_ascii_alphabetic()) => Delay::Parameter,
            _ => Delay::None,
        }
    }
}

/// Splits the longest decimal number off the front of `input`, after
/// leading whitespace. A dangling exponent marker is left in the rest.
fn split_number(input: &str) -> Option<(f64, &str)> {
    let s = input.trim_start();
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(b.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - end - 1;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(b.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Formats like printf's `%g`: six significant digits, no trailing zeros,
/// exponent form outside `1e-4 ..= 1e6`.
fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let sci = format!("{value:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or_default();
    if (-4..6).contains(&exp) {
        let fixed = format!("{:.*}", (5 - exp) as usize, value);
        trim_fraction(&fixed).to_owned()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Verilog delay prefix for a gate, e.g. ` #10000` for `10 ns`, or the
/// empty string for no delay. Times are converted to picoseconds.
pub fn verilog_delay(value: &str, component: &str) -> Result<String, ExportError> {
    match Delay::from(value) {
        Delay::None => Ok(String::new()),
        Delay::Parameter => Ok(format!(" #{value}")),
        Delay::Time(time, unit) => VERILOG_UNITS
            .iter()
            .find(|(u, _)| *u == unit)
            .filter(|_| time > 0.0)
            .map(|(_, factor)| format!(" #{}", format_number(time * factor)))
            .ok_or_else(|| ExportError::InvalidDelay {
                component: component.to_owned(),
                units: VERILOG_UNIT_LIST,
            }),
    }
}

/// VHDL delay suffix for a gate, e.g. ` after 10 ns`, or the empty string
/// for no delay.
pub fn vhdl_delay(value: &str, component: &str) -> Result<String, ExportError> {
    match Delay::from(value) {
        Delay::None => Ok(String::new()),
        Delay::Parameter => Ok(format!(" after {value}")),
        Delay::Time(time, unit) if time > 0.0 && VHDL_UNITS.contains(&unit) => {
            Ok(format!(" after {} {unit}", format_number(time)))
        }
        Delay::Time(..) => Err(ExportError::InvalidDelay {
            component: component.to_owned(),
            units: VHDL_UNIT_LIST,
        }),
    }
}
