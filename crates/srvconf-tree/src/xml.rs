//! XML codec for configuration documents.
//!
//! Reading keeps elements, attributes (in order), non-whitespace text,
//! comments and processing instructions, including those around the root
//! element. The XML declaration is dropped and rewritten on render.
//! Rendering re-indents the document.

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::node::{ConfigNode, NodeId, NodeKind, OuterMarkup};

const INDENT_WIDTH: usize = 4;

pub(crate) fn parse(source: &str) -> Result<Document> {
    TreeBuilder::new(source).build()
}

/// Parser state: the arena under construction plus the open-element stack.
struct TreeBuilder<'a> {
    reader: Reader<&'a [u8]>,
    nodes: Vec<ConfigNode>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    prolog: Vec<OuterMarkup>,
    epilogue: Vec<OuterMarkup>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            nodes: Vec::new(),
            stack: Vec::new(),
            root: None,
            prolog: Vec::new(),
            epilogue: Vec::new(),
        }
    }

    fn build(mut self) -> Result<Document> {
        loop {
            let event_start = self.reader.buffer_position();

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = self.open_element(&e, event_start)?;
                    self.stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    self.open_element(&e, event_start)?;
                }
                Ok(Event::End(e)) => self.close_element(&e)?,
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::syntax(err, event_start))?;
                    self.push_text(&text);
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    self.push_text(&text);
                }
                Ok(Event::Comment(e)) => {
                    let body = String::from_utf8_lossy(&e).into_owned();
                    self.push_leaf(
                        body,
                        |body, open| ConfigNode::comment(body, open),
                        OuterMarkup::Comment,
                    );
                }
                Ok(Event::PI(e)) => {
                    let body = String::from_utf8_lossy(&e).into_owned();
                    self.push_leaf(
                        body,
                        |body, open| ConfigNode::instruction(body, open),
                        OuterMarkup::Instruction,
                    );
                }
                Ok(Event::DocType(e)) => {
                    let body = String::from_utf8_lossy(&e).trim_start().to_string();
                    self.push_outer(OuterMarkup::DocType(body));
                }
                Ok(Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(err) => return Err(Error::syntax(err, self.reader.error_position())),
            }
        }

        if let Some(&open) = self.stack.last() {
            return Err(Error::Unclosed {
                tag: self.nodes[open.0].tag().to_string(),
            });
        }

        let root = self.root.ok_or(Error::EmptyDocument)?;
        Ok(Document::from_parts(
            self.nodes,
            root,
            self.prolog,
            self.epilogue,
        ))
    }

    fn open_element(&mut self, e: &BytesStart<'_>, event_start: u64) -> Result<NodeId> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let parent = self.stack.last().copied();

        if parent.is_none() && self.root.is_some() {
            return Err(Error::MultipleRoots { tag });
        }

        let mut node = ConfigNode::element(tag, parent);
        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::syntax(err, event_start))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| Error::syntax(err, event_start))?;
            node.set_attribute(&key, &value);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match parent {
            Some(parent) => self.nodes[parent.0].push_child(id),
            None => self.root = Some(id),
        }
        Ok(id)
    }

    fn close_element(&mut self, e: &BytesEnd<'_>) -> Result<()> {
        let found = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let open = self.stack.pop().ok_or_else(|| {
            Error::syntax(
                format!("unexpected closing tag </{found}>"),
                self.reader.buffer_position(),
            )
        })?;

        let expected = self.nodes[open.0].tag();
        if expected != found {
            return Err(Error::MismatchedEndTag {
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        // Indentation between elements is layout, not content.
        if text.trim().is_empty() {
            return;
        }
        if let Some(&open) = self.stack.last() {
            self.nodes[open.0].push_text(text);
        }
    }

    /// Comments and instructions hang from the open element, or sit around
    /// the root when no element is open.
    fn push_leaf(
        &mut self,
        body: String,
        node: fn(String, NodeId) -> ConfigNode,
        outer: fn(String) -> OuterMarkup,
    ) {
        match self.stack.last() {
            Some(&open) => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(node(body, open));
                self.nodes[open.0].push_child(id);
            }
            None => self.push_outer(outer(body)),
        }
    }

    fn push_outer(&mut self, markup: OuterMarkup) {
        if self.root.is_none() {
            self.prolog.push(markup);
        } else {
            self.epilogue.push(markup);
        }
    }
}

pub(crate) fn render(doc: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(render_error)?;
    for markup in doc.prolog() {
        write_outer(&mut writer, markup)?;
    }
    write_node(&mut writer, doc, doc.root())?;
    for markup in doc.epilogue() {
        write_outer(&mut writer, markup)?;
    }

    let mut out = String::from_utf8(writer.into_inner()).map_err(render_error)?;
    out.push('\n');
    Ok(out)
}

fn write_outer(writer: &mut Writer<Vec<u8>>, markup: &OuterMarkup) -> Result<()> {
    let event = match markup {
        OuterMarkup::Comment(body) => Event::Comment(BytesText::from_escaped(body.as_str())),
        OuterMarkup::Instruction(body) => Event::PI(BytesPI::new(body.as_str())),
        OuterMarkup::DocType(body) => Event::DocType(BytesText::from_escaped(body.as_str())),
    };
    writer.write_event(event).map_err(render_error)
}

fn write_node(writer: &mut Writer<Vec<u8>>, doc: &Document, id: NodeId) -> Result<()> {
    let node = doc.node(id);
    let body = node.text().unwrap_or_default();

    match node.kind() {
        NodeKind::Comment => {
            return writer
                .write_event(Event::Comment(BytesText::from_escaped(body)))
                .map_err(render_error);
        }
        NodeKind::Instruction => {
            return writer
                .write_event(Event::PI(BytesPI::new(body)))
                .map_err(render_error);
        }
        NodeKind::Element => {}
    }

    let mut start = BytesStart::new(node.tag());
    for (key, value) in node.attributes() {
        start.push_attribute((key, value));
    }

    if node.children().is_empty() && node.text().is_none() {
        return writer.write_event(Event::Empty(start)).map_err(render_error);
    }

    writer.write_event(Event::Start(start)).map_err(render_error)?;
    if let Some(text) = node.text() {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(render_error)?;
    }
    for &child in node.children() {
        write_node(writer, doc, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.tag())))
        .map_err(render_error)
}

fn render_error(err: impl std::fmt::Display) -> Error {
    Error::Render {
        message: err.to_string(),
    }
}
