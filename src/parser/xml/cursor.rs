use super::attributes::{RawValue, TagAttributes, XmlAttribute};
use super::resources::{Resolved, ResourceTable};
use crate::parser::result::{ParseError, ParseResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEvent {
    StartTag,
    EndTag,
    Text,
    EndDocument,
}

/// Depth-tracked pull interface over a manifest's tags.
///
/// `depth()` follows pull-parser conventions: the root start tag is at depth
/// 1, and an end tag reports the depth of its matching start tag.
pub trait TagCursor {
    fn advance(&mut self) -> ParseResult<XmlEvent>;

    fn depth(&self) -> usize;

    /// Name of the current start or end tag
    fn name(&self) -> &str;

    fn attribute_value(&self, namespace: Option<&str>, local: &str) -> Option<&str>;

    /// Attributes of the current start tag
    fn attributes(&self) -> &TagAttributes;

    /// Human-readable location of the current event
    fn position(&self) -> String;

    /// Move to the next child start tag of the element opened at `depth`.
    ///
    /// Returns `None` once that element's end tag (or the end of the
    /// document) is reached.
    fn next_child(&mut self, depth: usize) -> ParseResult<Option<String>> {
        loop {
            match self.advance()? {
                XmlEvent::EndDocument => return Ok(None),
                XmlEvent::EndTag if self.depth() <= depth => return Ok(None),
                XmlEvent::StartTag if self.depth() == depth + 1 => {
                    return Ok(Some(self.name().to_string()))
                }
                _ => {}
            }
        }
    }

    /// Consume the current element, children included
    fn skip_current_tag(&mut self) -> ParseResult<()> {
        let depth = self.depth();
        loop {
            match self.advance()? {
                XmlEvent::EndDocument => return Ok(()),
                XmlEvent::EndTag if self.depth() == depth => return Ok(()),
                _ => {}
            }
        }
    }

    /// Advance to the next start tag at any depth; `false` at end of document
    fn advance_to_start_tag(&mut self) -> ParseResult<bool> {
        loop {
            match self.advance()? {
                XmlEvent::StartTag => return Ok(true),
                XmlEvent::EndDocument => return Ok(false),
                _ => {}
            }
        }
    }
}

/// [`TagCursor`] over a text manifest, backed by quick-xml
pub struct XmlCursor<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    resources: ResourceTable,
    depth: usize,
    pending_pop: bool,
    pending_end: bool,
    name: String,
    text: String,
    attributes: TagAttributes,
    /// Namespace declarations per open element
    scopes: Vec<Vec<(String, String)>>,
}

impl<'a> XmlCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_resources(input, ResourceTable::new())
    }

    pub fn with_resources(input: &'a str, resources: ResourceTable) -> Self {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);
        Self {
            input,
            reader,
            buf: Vec::new(),
            resources,
            depth: 0,
            pending_pop: false,
            pending_end: false,
            name: String::new(),
            text: String::new(),
            attributes: TagAttributes::new(),
            scopes: Vec::new(),
        }
    }

    /// Text of the current text event
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_resources(self) -> ResourceTable {
        self.resources
    }

    fn xml_error(&self, error: impl std::fmt::Display) -> ParseError {
        ParseError::Xml {
            message: error.to_string(),
            position: self.reader.buffer_position(),
        }
    }

    fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn start_tag(&mut self, start: &BytesStart<'_>) -> ParseResult<()> {
        self.name = String::from_utf8_lossy(start.name().as_ref()).to_string();

        let mut declared = Vec::new();
        let mut pending = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.xml_error(e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| self.xml_error(e))?
                .to_string();

            if key == "xmlns" {
                declared.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push((prefix.to_string(), value));
            } else {
                pending.push((key, value));
            }
        }
        self.scopes.push(declared);

        // Attributes may use prefixes declared later on the same tag
        let mut attributes = TagAttributes::new();
        for (key, value) in pending {
            let (namespace, local) = match key.split_once(':') {
                Some((prefix, local)) => (
                    Some(
                        self.namespace_uri(prefix)
                            .map(str::to_string)
                            .unwrap_or_else(|| prefix.to_string()),
                    ),
                    local.to_string(),
                ),
                // Unprefixed attributes carry no namespace
                None => (None, key),
            };

            if namespace.as_deref() == Some(ANDROID_NAMESPACE) {
                attributes.insert(local.clone(), self.typed_value(&value));
            }
            attributes.push_raw(XmlAttribute {
                namespace,
                local,
                value,
            });
        }

        self.attributes = attributes;
        self.depth += 1;
        Ok(())
    }

    fn typed_value(&mut self, text: &str) -> RawValue {
        if !(text.starts_with('@') || text.starts_with('?')) {
            return RawValue::Literal(text.to_string());
        }
        match self.resources.resolve(text) {
            Some(Resolved::Null) => RawValue::Null,
            Some(Resolved::Reference { id, name, value }) => RawValue::Reference {
                id,
                name,
                resolved: value,
            },
            None => RawValue::Literal(text.to_string()),
        }
    }

    fn end_tag(&mut self, name: &[u8]) {
        self.name = String::from_utf8_lossy(name).to_string();
        self.attributes = TagAttributes::new();
        self.pending_pop = true;
    }
}

impl<'a> TagCursor for XmlCursor<'a> {
    fn advance(&mut self) -> ParseResult<XmlEvent> {
        if self.pending_pop {
            self.pending_pop = false;
            self.depth = self.depth.saturating_sub(1);
            self.scopes.pop();
        }

        if self.pending_end {
            self.pending_end = false;
            self.attributes = TagAttributes::new();
            self.pending_pop = true;
            return Ok(XmlEvent::EndTag);
        }

        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| ParseError::Xml {
                    message: e.to_string(),
                    position: self.reader.buffer_position(),
                })?
                .into_owned();

            match event {
                Event::Start(start) => {
                    self.start_tag(&start)?;
                    return Ok(XmlEvent::StartTag);
                }
                Event::Empty(start) => {
                    self.start_tag(&start)?;
                    self.pending_end = true;
                    return Ok(XmlEvent::StartTag);
                }
                Event::End(end) => {
                    self.end_tag(end.name().as_ref());
                    return Ok(XmlEvent::EndTag);
                }
                Event::Text(text) => {
                    self.text = text.unescape().map_err(|e| self.xml_error(e))?.to_string();
                    return Ok(XmlEvent::Text);
                }
                Event::CData(data) => {
                    self.text = String::from_utf8_lossy(&data.into_inner()).to_string();
                    return Ok(XmlEvent::Text);
                }
                Event::Eof => return Ok(XmlEvent::EndDocument),
                // Comments, declarations, processing instructions, doctype
                _ => {}
            }
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute_value(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes.raw_value(namespace, local)
    }

    fn attributes(&self) -> &TagAttributes {
        &self.attributes
    }

    fn position(&self) -> String {
        let offset = self.reader.buffer_position().min(self.input.len());
        let line = self.input.as_bytes()[..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1;
        format!("line {}", line)
    }
}
