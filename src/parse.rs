use serde::Deserialize;

use crate::{
    error::{LoadError, ParseError},
    metrics::TextMetrics,
    record::Record,
    style::{Brush, BrushStyle, Color, Pen, PenStyle},
    Arc, Area, Line, Port, Property, Symbol, TextLabel, COORD_LIMIT,
};

/// Highest port index a `PortSym` record may use
const MAX_PORTS: usize = u16::MAX as usize;

/// Number of drawable primitives a record added. Ports and the `.ID`
/// block do not count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrimitiveDelta(pub usize);

impl PrimitiveDelta {
    pub const NONE: PrimitiveDelta = PrimitiveDelta(0);
    pub const ONE: PrimitiveDelta = PrimitiveDelta(1);
}

/// What [Symbol::load] does with a record that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Stop at the first bad record
    #[default]
    Abort,
    /// Log the bad record and continue with the next one
    Skip,
}

fn style<T: TryFrom<i32, Error = i32>>(record: &Record, field: usize) -> Result<T, ParseError> {
    T::try_from(record.int(field)?).map_err(|value| ParseError::InvalidStyle { field, value })
}

fn color(record: &Record, field: usize) -> Result<Color, ParseError> {
    Color::try_from(record.field(field).unwrap_or(""))
}

/// Color, width and line style starting at `field`.
fn pen(record: &Record, field: usize) -> Result<Pen, ParseError> {
    Ok(Pen {
        color: color(record, field)?,
        width: record.int(field + 1)?,
        style: style::<PenStyle>(record, field + 2)?,
    })
}

/// Fill color, fill style and filled flag starting at `field`.
fn brush(record: &Record, field: usize) -> Result<Brush, ParseError> {
    let color = color(record, field)?;
    let mut style = style::<BrushStyle>(record, field + 1)?;
    if record.int(field + 2)? == 0 {
        style = BrushStyle::NoBrush;
    }
    Ok(Brush { color, style })
}

/// Decodes `\xHHHH` code points, `\n` and `\\` in symbol text.
fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find("\\x") {
        out.push_str(&rest[..i]);
        let code = rest
            .get(i + 2..i + 6)
            .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32);
        match code {
            Some(c) => {
                out.push(c);
                rest = &rest[i + 6..];
            }
            None => {
                out.push_str("\\x");
                rest = &rest[i + 2..];
            }
        }
    }
    out.push_str(rest);
    out.replace("\\n", "\n").replace("\\\\", "\\")
}

impl Symbol {
    /// Parses one symbol record and appends the primitive it describes,
    /// growing the bounding box to include it.
    ///
    /// `existing_property_count` is the number of properties the component
    /// defines itself; properties from a `.ID` record follow them. A count
    /// beyond the current property list is cut back to its length.
    ///
    /// Coordinates, extents and sweeps beyond [COORD_LIMIT](crate::COORD_LIMIT)
    /// and text measuring larger than that are rejected as malformed.
    pub fn parse_record(
        &mut self,
        record: &str,
        existing_property_count: usize,
        metrics: &dyn TextMetrics,
    ) -> Result<PrimitiveDelta, ParseError> {
        let record = Record::from(record);
        match record.keyword() {
            "PortSym" | ".PortSym" => self.parse_port(&record),
            "Line" => self.parse_line(&record),
            "EArc" => self.parse_arc(&record),
            ".ID" => self.parse_id(&record, existing_property_count),
            "Arrow" => self.parse_arrow(&record),
            "Ellipse" => {
                let area = parse_area(&record)?;
                self.fold_area(&area);
                self.ellipses.push(area);
                Ok(PrimitiveDelta::ONE)
            }
            "Rectangle" => {
                let area = parse_area(&record)?;
                self.fold_area(&area);
                self.rects.push(area);
                Ok(PrimitiveDelta::ONE)
            }
            "Text" => self.parse_text(&record, metrics),
            "" => Ok(PrimitiveDelta::NONE),
            keyword => {
                log::debug!("Ignoring symbol record {keyword}");
                Ok(PrimitiveDelta::NONE)
            }
        }
    }

    /// Parses a symbol description, one record per line. Records may be
    /// wrapped in `<` `>` as in schematic files.
    pub fn load(
        &mut self,
        text: &str,
        existing_property_count: usize,
        metrics: &dyn TextMetrics,
        policy: LoadPolicy,
    ) -> Result<PrimitiveDelta, LoadError> {
        let mut added = 0;
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            let record = line
                .strip_prefix('<')
                .and_then(|l| l.strip_suffix('>'))
                .unwrap_or(line);
            match self.parse_record(record, existing_property_count, metrics) {
                Ok(PrimitiveDelta(n)) => added += n,
                Err(source) => {
                    let err = LoadError {
                        line: i + 1,
                        record: record.to_owned(),
                        source,
                    };
                    match policy {
                        LoadPolicy::Abort => return Err(err),
                        LoadPolicy::Skip => log::warn!("Skipping symbol record: {err}"),
                    }
                }
            }
        }
        log::debug!("Loaded {added} primitives for {}", self.model);
        Ok(PrimitiveDelta(added))
    }

    fn fold_area(&mut self, area: &Area) {
        self.bounds.fold(area.x, area.y);
        self.bounds.fold(area.x + area.w, area.y + area.h);
    }

    fn parse_port(&mut self, record: &Record) -> Result<PrimitiveDelta, ParseError> {
        let x = record.coord(1)?;
        let y = record.coord(2)?;
        let index = record.int(3)?;
        let index = usize::try_from(index)
            .ok()
            .filter(|&i| i > 0 && i <= MAX_PORTS)
            .ok_or_else(|| ParseError::MalformedField {
                field: 3,
                value: index.to_string(),
            })?;

        // ports may be listed out of order
        if self.ports.len() < index {
            self.ports.resize(index, Port::placeholder());
        }
        self.ports[index - 1] = Port::new(x, y);
        self.bounds.fold(x, y);
        Ok(PrimitiveDelta::NONE)
    }

    fn parse_line(&mut self, record: &Record) -> Result<PrimitiveDelta, ParseError> {
        let x = record.coord(1)?;
        let y = record.coord(2)?;
        let dx = record.coord(3)?;
        let dy = record.coord(4)?;
        let pen = pen(record, 5)?;

        self.bounds.fold(x, y);
        self.bounds.fold(x + dx, y + dy);
        self.lines.push(Line::new(x, y, x + dx, y + dy, pen));
        Ok(PrimitiveDelta::ONE)
    }

    fn parse_arc(&mut self, record: &Record) -> Result<PrimitiveDelta, ParseError> {
        let x = record.coord(1)?;
        let y = record.coord(2)?;
        let w = record.coord(3)?;
        let h = record.coord(4)?;
        let angle = record.int(5)?;
        let arc_len = record.coord(6)?;
        let pen = pen(record, 7)?;

        self.bounds.fold(x, y);
        self.bounds.fold(x + w, y + h);
        self.arcs.push(Arc::new(x, y, w, h, angle, arc_len, pen));
        Ok(PrimitiveDelta::ONE)
    }

    fn parse_arrow(&mut self, record: &Record) -> Result<PrimitiveDelta, ParseError> {
        let x = record.coord(1)?;
        let y = record.coord(2)?;
        let dx = record.coord(3)?;
        let dy = record.coord(4)?;
        let hx = record.coord(5)?;
        let hy = record.coord(6)?;
        let pen = pen(record, 7)?;

        let (hx, hy) = (f64::from(hx), f64::from(hy));
        let beta = hy.atan2(hx);
        let phi = f64::from(dy).atan2(f64::from(dx));
        let len = (hx * hx + hy * hy).sqrt();

        let (tip_x, tip_y) = (x + dx, y + dy);
        self.bounds.fold(x, y);
        self.bounds.fold(tip_x, tip_y);
        self.lines.push(Line::new(x, y, tip_x, tip_y, pen));

        for w in [phi + beta, phi - beta] {
            let hx = tip_x - (len * w.cos()) as i32;
            let hy = tip_y - (len * w.sin()) as i32;
            self.bounds.fold(hx, hy);
            self.lines.push(Line::new(tip_x, tip_y, hx, hy, pen));
        }
        Ok(PrimitiveDelta::ONE)
    }

    fn parse_id(
        &mut self,
        record: &Record,
        existing_property_count: usize,
    ) -> Result<PrimitiveDelta, ParseError> {
        let tx = record.coord(1)?;
        let ty = record.coord(2)?;
        (self.tx, self.ty) = (tx, ty);
        self.name = record.field(3).unwrap_or("SUB").to_owned();

        let mut slot = existing_property_count;
        if slot > self.properties.len() {
            log::warn!(
                "{} has {} properties, not {existing_property_count}",
                self.model,
                self.properties.len()
            );
            slot = self.properties.len();
        }
        for group in record.quoted_groups() {
            let mut parts = group.split('=');
            let flag = parts.next().unwrap_or("");
            let name = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");
            let description = parts.next().filter(|d| !d.is_empty()).unwrap_or(" ");

            // an existing property keeps its value and visibility
            match self.properties.get_mut(slot) {
                Some(prop) => {
                    prop.name = name.to_owned();
                    prop.description = description.to_owned();
                }
                None => self.properties.push(Property::new(
                    name,
                    value,
                    flag.starts_with('1'),
                    description,
                )),
            }
            slot += 1;
        }
        self.properties.truncate(slot);
        Ok(PrimitiveDelta::NONE)
    }

    fn parse_text(
        &mut self,
        record: &Record,
        metrics: &dyn TextMetrics,
    ) -> Result<PrimitiveDelta, ParseError> {
        let x = record.coord(1)?;
        let y = record.coord(2)?;
        let size = record.int(3)?;
        let angle = f64::from(record.int(5)?).to_radians();
        let color = color(record, 4)?;

        let text = record
            .text()
            .filter(|t| !t.is_empty())
            .ok_or(ParseError::EmptyText)?;
        let text = decode_escapes(text);

        let (w, h) = metrics.measure(&text, f64::from(size));
        if !(0..=COORD_LIMIT).contains(&w) || !(0..=COORD_LIMIT).contains(&h) {
            return Err(ParseError::MalformedField {
                field: 3,
                value: size.to_string(),
            });
        }
        let size = f64::from(size);

        let (cos, sin) = (angle.cos(), angle.sin());
        let (w, h) = (f64::from(w), f64::from(h));
        let far_x = x + (w * cos) as i32 + (h * sin) as i32;
        let far_y = y + (w * -sin) as i32 + (h * cos) as i32;

        self.bounds.fold(x, y);
        self.bounds.fold(far_x, far_y);
        self.texts
            .push(TextLabel::rotated(x, y, text, color, size, cos, sin));
        Ok(PrimitiveDelta::ONE)
    }
}

fn parse_area(record: &Record) -> Result<Area, ParseError> {
    Ok(Area::new(
        record.coord(1)?,
        record.coord(2)?,
        record.coord(3)?,
        record.coord(4)?,
        pen(record, 5)?,
        brush(record, 8)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metrics::MonospaceMetrics, BoundingBox};
    use rstest::*;

    macro_rules! test_data {
        ($fname:expr) => {
            std::fs::read_to_string(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/resources/test/",
                $fname
            ))
            .unwrap()
        };
    }

    const METRICS: MonospaceMetrics = MonospaceMetrics {
        advance: 0.6,
        line_height: 1.2,
    };

    fn parse(records: &[&str]) -> Symbol {
        let mut s = Symbol::new("Sub");
        for r in records {
            s.parse_record(r, 0, &METRICS).unwrap();
        }
        s
    }

    /// Envelope of every primitive, recomputed from scratch.
    fn envelope(s: &Symbol) -> BoundingBox {
        let mut b = BoundingBox::empty();
        for l in &s.lines {
            b.fold(l.x1, l.y1);
            b.fold(l.x2, l.y2);
        }
        for a in &s.arcs {
            b.fold(a.x, a.y);
            b.fold(a.x + a.w, a.y + a.h);
        }
        for a in s.rects.iter().chain(&s.ellipses) {
            b.fold(a.x, a.y);
            b.fold(a.x + a.w, a.y + a.h);
        }
        for p in s.ports.iter().filter(|p| p.available) {
            b.fold(p.x, p.y);
        }
        for t in &s.texts {
            let (w, h) = METRICS.measure(&t.text, t.size);
            let (w, h) = (f64::from(w), f64::from(h));
            b.fold(t.x, t.y);
            b.fold(
                t.x + (w * t.cos) as i32 + (h * t.sin) as i32,
                t.y + (w * -t.sin) as i32 + (h * t.cos) as i32,
            );
        }
        b
    }

    #[test]
    fn parses_line() {
        let s = parse(&["Line -30 0 20 -5 #000080 2 1"]);
        assert_eq!(
            s.lines,
            vec![Line::new(-30, 0, -10, -5, Pen::new(Color::DARK_BLUE, 2))]
        );
        assert_eq!(s.bounds, BoundingBox::new(-30, -5, -10, 0));
    }

    #[test]
    fn parses_arc_and_normalizes_angle() {
        let s = parse(&["EArc -5 -5 10 10 -1440 2880 #000000 1 1"]);
        assert_eq!(s.arcs[0].angle, 4320);
        assert_eq!(s.arcs[0].arc_len, 2880);
        assert_eq!(s.bounds, BoundingBox::new(-5, -5, 5, 5));
    }

    #[test]
    fn parses_areas() {
        let s = parse(&[
            "Rectangle -20 -10 40 20 #000000 1 2 #c0c0c0 1 1",
            "Ellipse 30 0 8 8 #000080 0 1 #000080 1 0",
        ]);
        assert_eq!(s.rects[0].pen.style, PenStyle::Dash);
        assert_eq!(s.rects[0].brush, Brush::solid(Color::rgb(192, 192, 192)));
        assert!(!s.ellipses[0].brush.is_filled());
        assert_eq!(s.bounds, BoundingBox::new(-20, -10, 38, 10));
    }

    #[test]
    fn ports_are_backfilled() {
        let mut s = Symbol::new("Sub");
        let delta = s.parse_record("PortSym 40 20 3", 0, &METRICS).unwrap();
        assert_eq!(delta, PrimitiveDelta::NONE);
        assert_eq!(s.ports.len(), 3);
        assert!(!s.ports[0].available);
        assert!(!s.ports[1].available);
        assert_eq!(s.ports[2], Port::new(40, 20));

        s.parse_record(".PortSym -40 20 1", 0, &METRICS).unwrap();
        assert_eq!(s.ports.len(), 3);
        assert_eq!(s.ports[0], Port::new(-40, 20));
        assert_eq!(s.bounds, BoundingBox::new(-40, 20, 40, 20));
    }

    #[rstest]
    #[case("PortSym 0 0 0", 3, "0")]
    #[case("PortSym 0 0 -1", 3, "-1")]
    #[case("PortSym 0 0 65536", 3, "65536")]
    #[case("PortSym 0 0 2000000000", 3, "2000000000")]
    #[case("PortSym -2147483648 0 1", 1, "-2147483648")]
    #[case("PortSym 0 1048577 1", 2, "1048577")]
    fn bad_ports_are_rejected(#[case] input: &str, #[case] field: usize, #[case] value: &str) {
        let mut s = Symbol::new("Sub");
        assert_eq!(
            s.parse_record(input, 0, &METRICS),
            Err(ParseError::MalformedField {
                field,
                value: value.to_owned()
            })
        );
        assert!(s.ports.is_empty());
        assert!(s.bounds.is_empty());
    }

    #[test]
    fn arrow_synthesizes_three_lines() {
        let s = parse(&["Arrow 0 0 30 30 10 5 #000000 1 1"]);
        assert_eq!(s.lines.len(), 3);
        assert_eq!((s.lines[0].x2, s.lines[0].y2), (30, 30));
        // head strokes mirror each other about the shaft
        assert_eq!((s.lines[1].x1, s.lines[1].y1), (30, 30));
        assert_eq!((s.lines[1].x2, s.lines[1].y2), (27, 20));
        assert_eq!((s.lines[2].x2, s.lines[2].y2), (20, 27));
        assert_eq!(s.bounds, BoundingBox::new(0, 0, 30, 30));
    }

    #[test]
    fn parses_text_with_quotes_and_escapes() {
        let s = parse(&[r#"Text -10 5 10 #ff0000 0 "say "\x03A9"\nnow""#]);
        let t = &s.texts[0];
        assert_eq!(t.text, "say \"\u{3a9}\"\nnow");
        assert_eq!(t.color, Color::rgb(255, 0, 0));
        assert_eq!((t.cos, t.sin), (1.0, 0.0));
        // widest line "say "Ω"" is 7 chars at 6 each, two 12 high lines
        assert_eq!(s.bounds, BoundingBox::new(-10, 5, 32, 29));
    }

    #[test]
    fn rotated_text_extends_box_along_basis() {
        let s = parse(&[r#"Text 0 0 10 #000000 90 "abcd""#]);
        // width 24 runs up, height 12 runs right
        assert_eq!(s.bounds, BoundingBox::new(0, -24, 12, 0));
    }

    #[rstest]
    #[case("Line 0 0 x 0 #000000 1 1", ParseError::MalformedField { field: 3, value: "x".into() })]
    #[case("Line 0 0 10 0 #000000 1", ParseError::MalformedField { field: 7, value: "".into() })]
    #[case("Line 0 0 10 0 nocolor 1 1", ParseError::InvalidColor("nocolor".into()))]
    #[case("Line 0 0 10 0 #000000 1 9", ParseError::InvalidStyle { field: 7, value: 9 })]
    #[case("Rectangle 0 0 1 1 #000000 1 1 #000000 20 1", ParseError::InvalidStyle { field: 9, value: 20 })]
    #[case("Ellipse 0 0 1 1 #000000 1 1 bad 1 1", ParseError::InvalidColor("bad".into()))]
    #[case(r#"Text 0 0 10 nocolor 0 "a""#, ParseError::InvalidColor("nocolor".into()))]
    #[case(r#"Text 0 0 10 #000000 0 """#, ParseError::EmptyText)]
    #[case("Text 0 0 10 #000000 0", ParseError::EmptyText)]
    #[case("EArc 0 0 10 10 0 5760.0 #000000 1 1", ParseError::MalformedField { field: 6, value: "5760.0".into() })]
    #[case("Line 2147483647 0 1 0 #000000 1 1", ParseError::MalformedField { field: 1, value: "2147483647".into() })]
    #[case("Line 0 0 0 -1048577 #000000 1 1", ParseError::MalformedField { field: 4, value: "-1048577".into() })]
    #[case("EArc 0 0 10 10 0 -2147483648 #000000 1 1", ParseError::MalformedField { field: 6, value: "-2147483648".into() })]
    #[case("Rectangle 0 0 2000000 1 #000000 1 1 #000000 1 1", ParseError::MalformedField { field: 3, value: "2000000".into() })]
    #[case("Ellipse 0 -2000000 1 1 #000000 1 1 #000000 1 1", ParseError::MalformedField { field: 2, value: "-2000000".into() })]
    #[case("Arrow 0 0 10 10 3000000 1 #000000 1 1", ParseError::MalformedField { field: 5, value: "3000000".into() })]
    #[case(r#"Text 0 0 2000000 #000000 0 "abc""#, ParseError::MalformedField { field: 3, value: "2000000".into() })]
    #[case(r#"Text 0 0 -10 #000000 0 "abc""#, ParseError::MalformedField { field: 3, value: "-10".into() })]
    #[case(r#".ID 2147483647 0 U"#, ParseError::MalformedField { field: 1, value: "2147483647".into() })]
    fn rejects_bad_records(#[case] input: &str, #[case] expected: ParseError) {
        let mut s = Symbol::new("Sub");
        assert_eq!(s.parse_record(input, 0, &METRICS), Err(expected));
        assert!(s.lines.is_empty() && s.rects.is_empty() && s.texts.is_empty());
        assert!(s.bounds.is_empty());
    }

    #[test]
    fn unknown_records_are_ignored() {
        let mut s = Symbol::new("Sub");
        assert_eq!(
            s.parse_record("Symbol", 0, &METRICS),
            Ok(PrimitiveDelta::NONE)
        );
        assert_eq!(s.parse_record("", 0, &METRICS), Ok(PrimitiveDelta::NONE));
    }

    #[test]
    fn id_record_sets_anchor_and_properties() {
        let s = parse(&[r#".ID -20 14 OP "1=Gain=100=open loop gain" "0=Ri=1M=""#]);
        assert_eq!((s.tx, s.ty), (-20, 14));
        assert_eq!(s.name, "OP");
        assert_eq!(
            s.properties,
            vec![
                Property::new("Gain", "100", true, "open loop gain"),
                Property::new("Ri", "1M", false, " "),
            ]
        );
    }

    #[test]
    fn id_record_defaults_name() {
        let s = parse(&[".ID 0 0"]);
        assert_eq!(s.name, "SUB");
        assert!(s.properties.is_empty());
    }

    #[test]
    fn id_record_reparse_keeps_user_state() {
        let mut s = Symbol::new("Sub");
        let first = r#".ID 0 0 SUB "1=A=1=first" "0=B=2=second""#;
        s.parse_record(first, 0, &METRICS).unwrap();
        s.properties[0].display = false;
        s.properties[1].value = "edited".into();

        let second = r#".ID 0 0 SUB "1=A=1=first" "0=B=2=second" "1=C=3=third""#;
        s.parse_record(second, 0, &METRICS).unwrap();
        assert_eq!(s.properties.len(), 3);
        assert!(!s.properties[0].display);
        assert!(!s.properties[1].display);
        assert_eq!(s.properties[1].value, "edited");
        assert_eq!(s.properties[2], Property::new("C", "3", true, "third"));

        s.parse_record(r#".ID 0 0 SUB "1=A=1=first""#, 0, &METRICS)
            .unwrap();
        assert_eq!(s.properties.len(), 1);
    }

    #[test]
    fn id_record_follows_existing_properties() {
        let mut s = Symbol::new("Sub");
        s.properties.push(Property::new("File", "opamp.sch", false, ""));
        s.parse_record(r#".ID 0 0 SUB "1=G=1=gain""#, 1, &METRICS)
            .unwrap();
        assert_eq!(s.properties.len(), 2);
        assert_eq!(s.properties[0].name, "File");
        assert_eq!(s.properties[1].name, "G");
    }

    #[test]
    fn id_record_clamps_existing_count_to_property_list() {
        let mut s = Symbol::new("Sub");
        s.parse_record(r#".ID 0 0 SUB "1=G=1=gain" "0=H=2=""#, 2, &METRICS)
            .unwrap();
        let names: Vec<_> = s.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["G", "H"]);

        // a count past the end appends after the last property
        s.parse_record(r#".ID 0 0 SUB "1=G=1=gain""#, 5, &METRICS)
            .unwrap();
        let names: Vec<_> = s.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["G", "H", "G"]);
        s.parse_record(r#".ID 0 0 SUB "1=G=1=gain""#, 0, &METRICS)
            .unwrap();
        assert_eq!(s.properties.len(), 1);
    }

    #[test]
    fn box_grows_monotonically() {
        let records = [
            "Line 0 0 10 10 #000000 1 1",
            "PortSym -20 0 1",
            "EArc 5 5 30 2 0 1440 #000000 1 1",
            "Rectangle -3 -40 6 2 #000000 1 1 #000000 1 1",
            r#"Text 0 0 10 #000000 180 "xyz""#,
        ];
        let mut s = Symbol::new("Sub");
        let mut prev = s.bounds;
        for r in records {
            s.parse_record(r, 0, &METRICS).unwrap();
            let b = s.bounds;
            assert!(b.x1 <= prev.x1 && b.y1 <= prev.y1 && b.x2 >= prev.x2 && b.y2 >= prev.y2);
            prev = b;
        }
    }

    #[test]
    fn box_is_exact_envelope_of_random_records() {
        // xorshift keeps the record sets reproducible
        let mut state = 0x2545_f491_u32;
        let mut next = |range: i32| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % (2 * range as u32 + 1)) as i32 - range
        };
        for _ in 0..50 {
            let mut s = Symbol::new("Sub");
            let mut port = 0;
            for _ in 0..12 {
                let record = match next(3) {
                    -3 => format!("Line {} {} {} {} #000000 1 1", next(80), next(80), next(40), next(40)),
                    -2 => format!("EArc {} {} {} {} {} {} #000000 1 1", next(80), next(80), next(20).abs(), next(20).abs(), next(5760), next(5760)),
                    -1 => format!("Rectangle {} {} {} {} #000000 1 1 #000000 1 1", next(80), next(80), next(30), next(30)),
                    0 => format!("Ellipse {} {} {} {} #000000 1 1 #000000 1 0", next(80), next(80), next(30).abs(), next(30).abs()),
                    1 => {
                        port += 1;
                        format!("PortSym {} {} {}", next(80), next(80), port)
                    }
                    2 => format!("Arrow {} {} {} {} {} {} #000000 1 1", next(80), next(80), next(40), next(40), next(10), next(10)),
                    _ => format!(r#"Text {} {} {} #000000 {} "t{}""#, next(80), next(80), next(4) + 10, next(4) * 90, next(99)),
                };
                s.parse_record(&record, 0, &METRICS).unwrap();
            }
            assert_eq!(s.bounds, envelope(&s));
        }
    }

    #[test]
    fn loads_symbol_file() {
        let text = test_data!("opamp.sym");
        let mut s = Symbol::new("Sub");
        let added = s.load(&text, 0, &METRICS, LoadPolicy::Abort).unwrap();
        assert_eq!(added, PrimitiveDelta(8));
        assert_eq!(s.ports.len(), 3);
        assert!(s.ports.iter().all(|p| p.available));
        assert_eq!(s.lines.len(), 6);
        assert_eq!(s.texts.len(), 2);
        assert_eq!(s.name, "OP");
        assert_eq!(s.properties.len(), 2);
        assert_eq!(s.bounds, envelope(&s));
    }

    #[test]
    fn load_reports_failing_line() {
        let text = "<Line 0 0 10 0 #000000 1 1>\n<Line 0 0 x 0 #000000 1 1>\n<Line 0 0 0 10 #000000 1 1>";
        let mut s = Symbol::new("Sub");
        let err = s.load(text, 0, &METRICS, LoadPolicy::Abort).unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.record, "Line 0 0 x 0 #000000 1 1");
        assert_eq!(s.lines.len(), 1);

        let mut s = Symbol::new("Sub");
        let added = s.load(text, 0, &METRICS, LoadPolicy::Skip).unwrap();
        assert_eq!(added, PrimitiveDelta(2));
    }

    #[test]
    fn load_policy_deserializes() {
        let p: LoadPolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(p, LoadPolicy::Skip);
    }

    #[rstest]
    #[case(r"a\x0041b", "aAb")]
    #[case(r"\x00", r"\x00")]
    #[case(r"one\ntwo", "one\ntwo")]
    #[case(r"back\\slash", r"back\slash")]
    fn decodes_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode_escapes(input), expected);
    }
}
