//! JSON serializer (§4.3): compact and 4-space pretty output, with the
//! documented lossy substitutions for values JSON can't represent exactly.

use crate::arena::{Arena, NodeData, Simple, ValueId};

pub(crate) fn serialize(arena: &Arena, id: ValueId, pretty: bool) -> String {
    let mut out = String::new();
    let mut w = Writer { out: &mut out, pretty, indent: 0 };
    w.value(arena, id);
    out
}

struct Writer<'a> {
    out: &'a mut String,
    pretty: bool,
    indent: usize,
}

impl<'a> Writer<'a> {
    fn newline_indent(&mut self) {
        if self.pretty {
            self.out.push('\n');
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
        }
    }

    fn value(&mut self, arena: &Arena, id: ValueId) {
        match &arena.node(id).data {
            NodeData::Uint(u) => self.out.push_str(&u.to_string()),
            NodeData::NegInt(m) => self.out.push_str(&((-1i64).wrapping_sub(*m as i64)).to_string()),
            NodeData::Text(t) => self.string(t),
            NodeData::Array(children) => self.array(arena, children),
            NodeData::Map(pairs) => self.object(arena, pairs),
            NodeData::Simple(simple) => self.simple(*simple),
            NodeData::Bytes(_) => {
                tracing::warn!("skipping Bytes value: unsupported for JSON");
            }
            NodeData::Tag { .. } => {
                tracing::warn!("skipping Tag value: unsupported for JSON");
            }
            NodeData::Pair { .. } => {
                tracing::warn!("skipping bare Pair value: unsupported for JSON");
            }
        }
    }

    fn simple(&mut self, simple: Simple) {
        match simple {
            Simple::True => self.out.push_str("true"),
            Simple::False => self.out.push_str("false"),
            Simple::Null => self.out.push_str("null"),
            Simple::Real(f) => {
                if f.is_finite() {
                    self.out.push_str(&format_real(f));
                } else {
                    // Inf/NaN have no JSON representation; emitted as 0.0
                    // to keep strict-mode output valid RFC 7159 (§4.3).
                    self.out.push_str("0.0");
                }
            }
            Simple::None | Simple::Undef | Simple::Extension(_) => {
                tracing::warn!("skipping Simple value: unsupported for JSON");
            }
        }
    }

    fn array(&mut self, arena: &Arena, children: &[ValueId]) {
        self.out.push('[');
        self.indent += 1;
        for (i, &child) in children.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline_indent();
            self.value(arena, child);
        }
        self.indent -= 1;
        if !children.is_empty() {
            self.newline_indent();
        }
        self.out.push(']');
    }

    fn object(&mut self, arena: &Arena, pairs: &[ValueId]) {
        self.out.push('{');
        self.indent += 1;
        let mut wrote = false;
        for &pair in pairs {
            let (key, value) = match arena.node(pair).data {
                NodeData::Pair { key, value } => (key, value),
                _ => continue,
            };
            let NodeData::Text(text) = &arena.node(key).data else {
                tracing::warn!("skipping map entry with non-Text key: unsupported for JSON");
                continue;
            };
            if wrote {
                self.out.push(',');
            }
            self.newline_indent();
            self.string(text);
            self.out.push(':');
            if self.pretty {
                self.out.push(' ');
            }
            self.value(arena, value);
            wrote = true;
        }
        self.indent -= 1;
        if wrote {
            self.newline_indent();
        }
        self.out.push('}');
    }

    fn string(&mut self, bytes: &[u8]) {
        self.out.push('"');
        match std::str::from_utf8(bytes) {
            Ok(text) => {
                for c in text.chars() {
                    self.escape_char(c);
                }
            }
            Err(_) => {
                tracing::warn!("skipping malformed UTF-8 byte(s) in Text value during JSON serialization");
                for c in String::from_utf8_lossy(bytes).chars() {
                    if c != '\u{FFFD}' {
                        self.escape_char(c);
                    }
                }
            }
        }
        self.out.push('"');
    }

    fn escape_char(&mut self, c: char) {
        match c {
            '\n' => self.out.push_str("\\n"),
            '\t' => self.out.push_str("\\t"),
            '\r' => self.out.push_str("\\r"),
            '\u{000C}' => self.out.push_str("\\f"),
            '\\' => self.out.push_str("\\\\"),
            '"' => self.out.push_str("\\\""),
            c if (c as u32) < 0x20 => {
                self.out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if c.is_ascii() => self.out.push(c),
            c if (c as u32) <= 0xFFFF => {
                self.out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => {
                let v = c as u32 - 0x10000;
                let hi = 0xD800 + (v >> 10);
                let lo = 0xDC00 + (v & 0x3FF);
                self.out.push_str(&format!("\\u{:04x}\\u{:04x}", hi, lo));
            }
        }
    }
}

fn format_real(f: f64) -> String {
    if f == f.trunc() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}
