//! Output formatting (JSON/text).
//!
//! Renderers never write text directly. They hand named fields to a
//! [`FieldSink`], and the sink decides what the field looks like: a
//! `label value` token on a line of text, or a member of a JSON object.

use std::io::Write;

use serde_json::{Map, Value};

use crate::netlink::error::Result;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Show detailed statistics.
    pub stats: bool,
    /// Show extra details.
    pub details: bool,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Value of one output field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Uint(u64),
    Int(i64),
    /// Printed as `0x..` in both formats.
    Hex(u64),
    Bool(bool),
    /// `on`/`off` in text, a boolean in JSON.
    OnOff(bool),
    /// Label only in text, `null` in JSON.
    Flag,
    /// Hundredths of a second, printed as `S.CC`.
    Centiseconds(u64),
}

impl FieldValue {
    fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Uint(n) => Some(n.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Hex(n) => Some(format!("{n:#x}")),
            Self::Bool(b) => Some(b.to_string()),
            Self::OnOff(b) => Some(if *b { "on" } else { "off" }.to_string()),
            Self::Flag => None,
            Self::Centiseconds(c) => Some(format!("{:4}.{:02}", c / 100, c % 100)),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Uint(n) => Value::from(*n),
            Self::Int(n) => Value::from(*n),
            Self::Hex(n) => Value::String(format!("{n:#x}")),
            Self::Bool(b) | Self::OnOff(b) => Value::Bool(*b),
            Self::Flag => Value::Null,
            Self::Centiseconds(c) => Value::from(*c as f64 / 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Show {
    Any,
    Text,
    Json,
}

/// One named value handed to a sink.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    key: &'a str,
    label: Option<&'a str>,
    value: FieldValue,
    show: Show,
}

impl<'a> Field<'a> {
    /// Field shown in both formats, labelled by its key in text.
    pub fn any(key: &'a str, value: FieldValue) -> Self {
        Self {
            key,
            label: Some(key),
            value,
            show: Show::Any,
        }
    }

    /// Field whose text label differs from its JSON key.
    pub fn new(key: &'a str, label: &'a str, value: FieldValue) -> Self {
        Self {
            key,
            label: Some(label),
            value,
            show: Show::Any,
        }
    }

    /// Text-only field.
    pub fn text(label: &'a str, value: FieldValue) -> Self {
        Self {
            key: label,
            label: Some(label),
            value,
            show: Show::Text,
        }
    }

    /// Text-only value printed without a label.
    pub fn bare(value: FieldValue) -> Self {
        Self {
            key: "",
            label: None,
            value,
            show: Show::Text,
        }
    }

    /// JSON-only field.
    pub fn json(key: &'a str, value: FieldValue) -> Self {
        Self {
            key,
            label: None,
            value,
            show: Show::Json,
        }
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// Destination for rendered objects.
pub trait FieldSink {
    /// Format this sink produces.
    fn format(&self) -> OutputFormat;

    /// Start an object. `None` starts a top-level record (or an anonymous
    /// member when nested).
    fn open_object(&mut self, key: Option<&str>) -> Result<()>;

    /// Close the innermost open object.
    fn close_object(&mut self) -> Result<()>;

    /// Emit one field into the innermost open object.
    fn field(&mut self, field: Field<'_>) -> Result<()>;

    /// Continue the current text record on an indented line.
    fn line_break(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flush everything still buffered.
    fn finish(&mut self) -> Result<()>;

    fn is_json(&self) -> bool {
        self.format() == OutputFormat::Json
    }
}

/// Create the sink matching `format`.
pub fn sink<'w, W: Write + 'w>(
    writer: W,
    format: OutputFormat,
    opts: &OutputOptions,
) -> Box<dyn FieldSink + 'w> {
    match format {
        OutputFormat::Text => Box::new(TextSink::new(writer)),
        OutputFormat::Json => {
            let sink = JsonSink::new(writer);
            Box::new(if opts.pretty { sink.pretty() } else { sink })
        }
    }
}

/// Space separated text, one line per top-level object.
pub struct TextSink<W: Write> {
    writer: W,
    tokens: Vec<String>,
    depth: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tokens: Vec::new(),
            depth: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn flush_line(&mut self) -> Result<()> {
        if !self.tokens.is_empty() {
            writeln!(self.writer, "{}", self.tokens.join(" "))?;
            self.tokens.clear();
        }
        Ok(())
    }
}

impl<W: Write> FieldSink for TextSink<W> {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn open_object(&mut self, _key: Option<&str>) -> Result<()> {
        self.depth += 1;
        Ok(())
    }

    fn close_object(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.flush_line()?;
        }
        Ok(())
    }

    fn field(&mut self, field: Field<'_>) -> Result<()> {
        if field.show == Show::Json {
            return Ok(());
        }
        let token = match (field.label, field.value.to_text()) {
            (Some(label), Some(value)) => format!("{label} {}", value.trim_start()),
            (Some(label), None) => label.to_string(),
            (None, Some(value)) => value,
            (None, None) => return Ok(()),
        };
        self.tokens.push(token);
        Ok(())
    }

    fn line_break(&mut self) -> Result<()> {
        if !self.tokens.is_empty() {
            writeln!(self.writer, "{}", self.tokens.join(" "))?;
            self.tokens.clear();
            self.tokens.push("   ".to_string());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.flush_line()?;
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON array of objects, written once on [`finish`](FieldSink::finish).
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
    records: Vec<Value>,
    /// Open objects with the key each will be stored under in its parent.
    stack: Vec<(Option<String>, Map<String, Value>)>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: false,
            records: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Enable pretty printing.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FieldSink for JsonSink<W> {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn open_object(&mut self, key: Option<&str>) -> Result<()> {
        self.stack.push((key.map(str::to_string), Map::new()));
        Ok(())
    }

    fn close_object(&mut self) -> Result<()> {
        let Some((key, map)) = self.stack.pop() else {
            return Ok(());
        };
        match (self.stack.last_mut(), key) {
            (Some((_, parent)), Some(key)) => {
                parent.insert(key, Value::Object(map));
            }
            // Anonymous objects inside an object are merged into it.
            (Some((_, parent)), None) => parent.extend(map),
            (None, _) => self.records.push(Value::Object(map)),
        }
        Ok(())
    }

    fn field(&mut self, field: Field<'_>) -> Result<()> {
        if field.show == Show::Text {
            return Ok(());
        }
        if self.stack.is_empty() {
            self.stack.push((None, Map::new()));
        }
        if let Some((_, map)) = self.stack.last_mut() {
            map.insert(field.key.to_string(), field.value.to_json());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        while !self.stack.is_empty() {
            self.close_object()?;
        }
        let records = Value::Array(std::mem::take(&mut self.records));
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &records)?;
        } else {
            serde_json::to_writer(&mut self.writer, &records)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
