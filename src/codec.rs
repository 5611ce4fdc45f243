//! XLIFF 1.2 reading and writing for [`Document`].
//!
//! Only the subset of XLIFF used by generated translation files is handled:
//! one `<file>`, an optional `<header><tool>`, and trans-units inside
//! `<body><group id="body">`. Inline markup inside text elements is dropped,
//! its text kept.

use std::{
    fs,
    io::{BufRead, Cursor, Write},
    path::Path,
};

use quick_xml::{
    Reader, Writer,
    escape::partial_escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use serde::Deserialize;

use crate::{
    error::Error,
    traits::Parser,
    types::{Document, LineEnding, Note, NoteFrom, Target, Tool, Unit},
};

pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "urn:oasis:names:tc:xliff:document:1.2 xliff-core-1.2-transitional.xsd";

/// A literal search/replace pass applied to the serialized text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchReplace {
    pub search: String,
    pub replace: String,
}

/// Serialization options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write `<target></target>` instead of `<target/>`.
    pub replace_self_closing: bool,
    /// Overrides the line ending detected on parse.
    pub line_ending: Option<LineEnding>,
    /// Applied in order to the final text.
    pub search_replace: Vec<SearchReplace>,
    pub utf8_bom: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            replace_self_closing: true,
            line_ending: None,
            search_replace: Vec::new(),
            utf8_bom: false,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace_self_closing(mut self, replace_self_closing: bool) -> Self {
        self.replace_self_closing = replace_self_closing;
        self
    }

    pub fn with_line_ending(mut self, line_ending: Option<LineEnding>) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_search_replace(mut self, search_replace: Vec<SearchReplace>) -> Self {
        self.search_replace = search_replace;
        self
    }

    pub fn with_utf8_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }
}

impl Parser for Document {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        parse(&text)
    }

    /// Write to any writer with default [`WriteOptions`].
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let text = serialize(self, &WriteOptions::default())?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Decodes by byte order mark, UTF-8 otherwise.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (text, _) = match encoding_rs::Encoding::for_bom(bytes) {
            Some((encoding, bom_length)) => {
                encoding.decode_without_bom_handling(&bytes[bom_length..])
            }
            None => encoding_rs::UTF_8.decode_without_bom_handling(bytes),
        };
        parse(&text)
    }
}

/// Parses XLIFF text. A leading byte order mark is ignored.
pub fn parse(text: &str) -> Result<Document, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut document: Option<Document> = None;
    let mut current: Option<Unit> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"file" => document = Some(parse_file(e)?),
                    b"tool" => {
                        if let Some(doc) = document.as_mut() {
                            doc.tool = Some(parse_tool(e)?);
                        }
                    }
                    b"trans-unit" => {
                        let unit = parse_unit(e)?;
                        if is_empty {
                            push_unit(&mut document, unit)?;
                        } else {
                            current = Some(unit);
                        }
                    }
                    b"source" => {
                        let text = element_text(&mut reader, b"source", is_empty)?;
                        if let Some(unit) = current.as_mut() {
                            unit.source = text;
                        }
                    }
                    b"target" => {
                        let attrs = Attrs::read(e)?;
                        let text = element_text(&mut reader, b"target", is_empty)?;
                        if let Some(unit) = current.as_mut() {
                            let target = parse_target(&attrs, &text)
                                .map_err(|msg| unit_error(&unit.id, msg))?;
                            unit.targets.push(target);
                        }
                    }
                    b"note" => {
                        let attrs = Attrs::read(e)?;
                        let text = element_text(&mut reader, b"note", is_empty)?;
                        if let Some(unit) = current.as_mut() {
                            let note = parse_note(&attrs, &text)
                                .map_err(|msg| unit_error(&unit.id, msg))?;
                            unit.notes.push(note);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"trans-unit" => {
                if let Some(unit) = current.take() {
                    push_unit(&mut document, unit)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut document =
        document.ok_or_else(|| Error::invalid_resource("no <file> element found"))?;
    document.line_ending = LineEnding::detect(text);
    Ok(document)
}

/// Serializes a document to XLIFF text.
pub fn serialize(document: &Document, options: &WriteOptions) -> Result<String, Error> {
    let newline = options.line_ending.unwrap_or(document.line_ending).as_str();
    let mut out = XmlOut {
        writer: Writer::new(Cursor::new(Vec::new())),
        newline,
        replace_self_closing: options.replace_self_closing,
    };

    out.writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    out.indent(0)?;

    let mut xliff = BytesStart::new("xliff");
    xliff.push_attribute(("version", "1.2"));
    xliff.push_attribute(("xmlns", XLIFF_NAMESPACE));
    xliff.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    xliff.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    out.writer.write_event(Event::Start(xliff))?;
    out.indent(1)?;

    out.writer.write_event(Event::Start(file_start(document)))?;

    if let Some(tool) = &document.tool {
        out.indent(2)?;
        out.writer.write_event(Event::Start(BytesStart::new("header")))?;
        out.indent(3)?;
        out.empty_element(tool_start(tool), "tool")?;
        out.indent(2)?;
        out.writer.write_event(Event::End(BytesEnd::new("header")))?;
    }

    out.indent(2)?;
    out.writer.write_event(Event::Start(BytesStart::new("body")))?;
    out.indent(3)?;
    let mut group = BytesStart::new("group");
    group.push_attribute(("id", "body"));
    out.writer.write_event(Event::Start(group))?;

    for unit in &document.units {
        out.indent(4)?;
        write_unit(&mut out, unit)?;
    }

    out.indent(3)?;
    out.writer.write_event(Event::End(BytesEnd::new("group")))?;
    out.indent(2)?;
    out.writer.write_event(Event::End(BytesEnd::new("body")))?;
    out.indent(1)?;
    out.writer.write_event(Event::End(BytesEnd::new("file")))?;
    out.indent(0)?;
    out.writer.write_event(Event::End(BytesEnd::new("xliff")))?;

    let bytes = out.writer.into_inner().into_inner();
    let mut text = String::from_utf8(bytes).map_err(|e| Error::invalid_resource(e.to_string()))?;
    for pass in &options.search_replace {
        text = text.replace(&pass.search, &pass.replace);
    }
    if options.utf8_bom {
        text.insert(0, '\u{feff}');
    }
    Ok(text)
}

/// Serializes and writes a document to `path`.
pub fn write_document<P: AsRef<Path>>(
    document: &Document,
    path: P,
    options: &WriteOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    let text = serialize(document, options)?;
    fs::write(path, text).map_err(|e| Error::Io(e).in_file(path))
}

struct XmlOut {
    writer: Writer<Cursor<Vec<u8>>>,
    newline: &'static str,
    replace_self_closing: bool,
}

impl XmlOut {
    fn indent(&mut self, level: usize) -> Result<(), Error> {
        let text = format!("{}{}", self.newline, "  ".repeat(level));
        self.writer.write_event(Event::Text(BytesText::new(&text)))?;
        Ok(())
    }

    fn empty_element(&mut self, start: BytesStart, name: &str) -> Result<(), Error> {
        if self.replace_self_closing {
            self.writer.write_event(Event::Start(start))?;
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        } else {
            self.writer.write_event(Event::Empty(start))?;
        }
        Ok(())
    }

    fn text_element(&mut self, start: BytesStart, name: &str, text: &str) -> Result<(), Error> {
        if text.is_empty() {
            return self.empty_element(start, name);
        }
        self.writer.write_event(Event::Start(start))?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

fn write_unit(out: &mut XmlOut, unit: &Unit) -> Result<(), Error> {
    let mut start = BytesStart::new("trans-unit");
    start.push_attribute(("id", unit.id.as_str()));
    let max_width = unit.max_width.map(|w| w.to_string());
    if let Some(max_width) = &max_width {
        start.push_attribute(("maxwidth", max_width.as_str()));
    }
    if let Some(size_unit) = unit.size_unit {
        start.push_attribute(("size-unit", size_unit.as_str()));
    }
    start.push_attribute(("translate", if unit.translate { "yes" } else { "no" }));
    start.push_attribute(("xml:space", unit.xml_space.as_str()));
    if let Some(al_object_target) = &unit.al_object_target {
        start.push_attribute(("al-object-target", al_object_target.as_str()));
    }
    out.writer.write_event(Event::Start(start))?;

    out.indent(5)?;
    out.text_element(BytesStart::new("source"), "source", &unit.source)?;

    for target in &unit.targets {
        out.indent(5)?;
        let mut start = BytesStart::new("target");
        if let Some(state) = target.state {
            start.push_attribute(("state", state.as_str()));
        }
        if let Some(qualifier) = target.state_qualifier {
            start.push_attribute(("state-qualifier", qualifier.as_str()));
        }
        out.text_element(start, "target", &target.raw_text())?;
    }

    let mut notes: Vec<&Note> = unit.notes.iter().collect();
    notes.sort_by_key(|n| n.priority);
    for note in notes {
        out.indent(5)?;
        let priority = note.priority.to_string();
        let mut start = BytesStart::new("note");
        start.push_attribute(("from", note.from.as_str()));
        start.push_attribute(("annotates", note.annotates.as_str()));
        start.push_attribute(("priority", priority.as_str()));
        out.text_element(start, "note", &note.text)?;
    }

    out.indent(4)?;
    out.writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
    Ok(())
}

fn file_start(document: &Document) -> BytesStart<'_> {
    let mut start = BytesStart::new("file");
    start.push_attribute(("datatype", document.datatype.as_str()));
    start.push_attribute(("source-language", document.source_language.as_str()));
    start.push_attribute(("target-language", document.target_language.as_str()));
    start.push_attribute(("original", document.original.as_str()));
    let optional = [
        ("tool-id", &document.tool_id),
        ("product-name", &document.product_name),
        ("product-version", &document.product_version),
        ("build-num", &document.build_num),
        ("request-id", &document.request_id),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            start.push_attribute((key, value.as_str()));
        }
    }
    start
}

fn tool_start(tool: &Tool) -> BytesStart<'_> {
    let mut start = BytesStart::new("tool");
    start.push_attribute(("tool-id", tool.tool_id.as_str()));
    start.push_attribute(("tool-name", tool.tool_name.as_str()));
    if let Some(version) = &tool.tool_version {
        start.push_attribute(("tool-version", version.as_str()));
    }
    if let Some(company) = &tool.tool_company {
        start.push_attribute(("tool-company", company.as_str()));
    }
    start
}

/// Attributes of one element, unescaped.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(e: &BytesStart) -> Result<Self, Error> {
        let mut attrs = Vec::new();
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|e| Error::InvalidResource(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            attrs.push((key, value));
        }
        Ok(Attrs(attrs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

fn unit_error(id: &str, message: String) -> Error {
    Error::InvalidResource(format!("trans-unit '{}': {}", id, message))
}

fn parse_file(e: &BytesStart) -> Result<Document, Error> {
    let attrs = Attrs::read(e)?;
    let mut document = Document::new(
        attrs.get("source-language").unwrap_or(""),
        attrs.get("target-language").unwrap_or(""),
        attrs.get("original").unwrap_or(""),
    );
    document.datatype = attrs.owned("datatype").unwrap_or_default();
    document.tool_id = attrs.owned("tool-id");
    document.product_name = attrs.owned("product-name");
    document.product_version = attrs.owned("product-version");
    document.build_num = attrs.owned("build-num");
    document.request_id = attrs.owned("request-id");
    Ok(document)
}

fn parse_tool(e: &BytesStart) -> Result<Tool, Error> {
    let attrs = Attrs::read(e)?;
    Ok(Tool {
        tool_id: attrs.owned("tool-id").unwrap_or_default(),
        tool_name: attrs.owned("tool-name").unwrap_or_default(),
        tool_version: attrs.owned("tool-version"),
        tool_company: attrs.owned("tool-company"),
    })
}

fn parse_unit(e: &BytesStart) -> Result<Unit, Error> {
    let attrs = Attrs::read(e)?;
    let id = attrs
        .get("id")
        .ok_or_else(|| Error::invalid_resource("trans-unit missing 'id'"))?;
    let mut unit = Unit::new(id, "");
    unit.translate = attrs
        .get("translate")
        .is_some_and(|t| !t.eq_ignore_ascii_case("no"));
    unit.max_width = match attrs.get("maxwidth") {
        Some(value) => Some(
            value
                .trim()
                .parse::<u32>()
                .map_err(|_| unit_error(id, format!("invalid maxwidth '{}'", value)))?,
        ),
        None => None,
    };
    unit.size_unit = match attrs.get("size-unit") {
        Some(value) => Some(value.parse().map_err(|msg| unit_error(id, msg))?),
        None => None,
    };
    if let Some(space) = attrs.get("xml:space") {
        unit.xml_space = space.to_string();
    }
    unit.al_object_target = attrs.owned("al-object-target");
    Ok(unit)
}

fn parse_target(attrs: &Attrs, text: &str) -> Result<Target, String> {
    let state = attrs.get("state").map(str::parse).transpose()?;
    let state_qualifier = attrs.get("state-qualifier").map(str::parse).transpose()?;
    Ok(Target::from_text(text)
        .with_state(state)
        .with_qualifier(state_qualifier))
}

fn parse_note(attrs: &Attrs, text: &str) -> Result<Note, String> {
    let priority = match attrs.get("priority") {
        Some(value) => value
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid note priority '{}'", value))?,
        None => 0,
    };
    Ok(Note {
        from: NoteFrom::from(attrs.get("from").unwrap_or("")),
        annotates: attrs.owned("annotates").unwrap_or_default(),
        priority,
        text: text.to_string(),
    })
}

fn push_unit(document: &mut Option<Document>, unit: Unit) -> Result<(), Error> {
    match document.as_mut() {
        Some(doc) => {
            doc.units.push(unit);
            Ok(())
        }
        None => Err(unit_error(&unit.id, "trans-unit outside <file>".to_string())),
    }
}

/// Collects the text of the element just opened, up to its end tag.
fn element_text(reader: &mut Reader<&[u8]>, name: &[u8], is_empty: bool) -> Result<String, Error> {
    let mut text = String::new();
    if is_empty {
        return Ok(text);
    }
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Start(_) => depth += 1,
            Event::End(e) if depth == 0 && e.local_name().as_ref() == name => return Ok(text),
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => {
                return Err(Error::invalid_resource(format!(
                    "unexpected end of file inside <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            _ => {}
        }
    }
}
