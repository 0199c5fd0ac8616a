//! Dictionary text codec.
//!
//! Emits the solver's dictionary syntax: a `FoamFile` header, `key value;`
//! entries and `name { ... }` sections, indented four spaces per level.
//! Output depends only on the calls made, so rendering the same model twice
//! yields identical bytes.

use std::fmt::Write as _;

/// Column at which entry values start, counted from the indentation.
const KEY_WIDTH: usize = 16;

/// Format a number with the shortest text that reads back to the same `f64`.
pub fn number(v: f64) -> String {
    // `-0.0` prints as "-0" which some readers reject.
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

/// Format an ordered triple as `(x y z)`.
pub fn vector(v: [f64; 3]) -> String {
    format!("({} {} {})", number(v[0]), number(v[1]), number(v[2]))
}

/// The canonical boolean tokens.
pub fn boolean(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

/// A double-quoted string with `"` and `\` escaped.
pub fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// A parenthesised list of quoted words: `("a" "b")`.
pub fn word_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let words: Vec<_> = items.into_iter().map(quoted).collect();
    format!("({})", words.join(" "))
}

/// Incremental builder of one dictionary file.
///
/// # Examples
///
/// ```
/// use cfdcase_writer::dict::DictWriter;
///
/// let mut w = DictWriter::new("system", "example");
/// w.begin("inlet");
/// w.entry("type", "velocity");
/// w.end();
/// let text = w.finish();
/// assert!(text.contains("inlet\n{\n    type            velocity;\n}\n"));
/// ```
#[derive(Debug)]
pub struct DictWriter {
    out: String,
    depth: usize,
}

impl DictWriter {
    /// Start a file with a `FoamFile` header naming its location and object.
    pub fn new(location: &str, object: &str) -> Self {
        let mut w = Self {
            out: String::new(),
            depth: 0,
        };
        w.begin("FoamFile");
        w.entry("version", "2.0");
        w.entry("format", "ascii");
        w.entry("class", "dictionary");
        w.entry("location", &quoted(location));
        w.entry("object", object);
        w.end();
        w.out.push('\n');
        w
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
    }

    /// Write `key value;`.
    pub fn entry(&mut self, key: &str, value: &str) {
        self.indent();
        let pad = KEY_WIDTH.saturating_sub(key.len()).max(1);
        // Writing into a String cannot fail.
        let _ = writeln!(self.out, "{key}{:pad$}{value};", "");
    }

    /// Open a `name { ... }` section.
    pub fn begin(&mut self, name: &str) {
        self.indent();
        self.out.push_str(name);
        self.out.push('\n');
        self.indent();
        self.out.push_str("{\n");
        self.depth += 1;
    }

    /// Close the innermost section.
    pub fn end(&mut self) {
        debug_assert!(self.depth > 0, "end() without begin()");
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("}\n");
    }

    /// Insert a blank line between top-level sections.
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// The finished text.
    pub fn finish(self) -> String {
        debug_assert_eq!(self.depth, 0, "unclosed section");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_shortest_round_trip_form() {
        assert_eq!(number(290.0), "290");
        assert_eq!(number(0.1), "0.1");
        assert_eq!(number(-9.81), "-9.81");
        assert_eq!(number(1e-5), "0.00001");
        assert_eq!(number(-0.0), "0");
        let v = 0.1 + 0.2;
        assert_eq!(number(v).parse::<f64>().unwrap(), v);
    }

    #[test]
    fn vectors_are_triples() {
        assert_eq!(vector([0.0, -9.81, 0.0]), "(0 -9.81 0)");
    }

    #[test]
    fn quoting_escapes() {
        assert_eq!(quoted(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(word_list(["x", "y"]), r#"("x" "y")"#);
        assert_eq!(word_list(Vec::<&str>::new()), "()");
    }

    #[test]
    fn nested_sections_indent_four_spaces() {
        let mut w = DictWriter::new("system", "t");
        w.begin("outer");
        w.begin("inner");
        w.entry("k", "1");
        w.end();
        w.end();
        let text = w.finish();
        assert!(text.starts_with("FoamFile\n{\n    version         2.0;\n"));
        assert!(text.contains("outer\n{\n    inner\n    {\n        k               1;\n    }\n}\n"));
    }

    #[test]
    fn long_keys_still_separate_from_values() {
        let mut w = DictWriter::new("system", "t");
        w.entry("a_key_longer_than_sixteen", "1");
        assert!(w.finish().contains("a_key_longer_than_sixteen 1;"));
    }
}
