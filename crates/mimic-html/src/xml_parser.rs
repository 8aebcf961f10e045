//! XML parser
//!
//! Feeds the input to xml5ever's tokenizer one character at a time, so every
//! token arrives together with the line and column of the character that
//! completed it. xml5ever is deliberately forgiving; the tree builder on
//! the receiving end restores XML well-formedness (tag nesting, namespace
//! bindings, declared entities, root-level content) and appends nodes to a
//! fresh document in the caller's [`DomTree`]. Parsing never fails: the
//! first error is rendered into the document as a `parsererror` banner and
//! the partial tree is kept.

use std::cell::RefCell;
use std::collections::HashMap;

use mimic_dom::validation::{self, ProcessingInstructionError};
use mimic_dom::{DomTree, NodeId, ShadowRootInit, ShadowRootMode, namespace};
use xml5ever::buffer_queue::BufferQueue;
use xml5ever::tendril::StrTendril;
use xml5ever::tokenizer::{
    Doctype, Pi, ProcessResult, TagKind, Token, TokenSink, XmlTokenizer, XmlTokenizerOpts,
};
use xml5ever::{Attribute, QualName, TokenizerResult};

const BANNER_STYLE: &str = "display: block; white-space: pre; border: 2px solid #c77; padding: 0 1em 0 1em; margin: 1em; background-color: #fdd; color: black";

/// Entities every XML document knows without a DTD
const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Content type of the produced document
    pub content_type: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            content_type: "application/xml".to_string(),
        }
    }
}

/// First well-formedness error of a parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for XmlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error on line {} at column {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// Result of [`XmlParser::parse_with_error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub document: NodeId,
    pub error: Option<XmlParseError>,
}

/// XML document parser
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    options: ParserOptions,
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `markup` into a new document
    pub fn parse(&self, tree: &mut DomTree, markup: &str) -> NodeId {
        self.parse_with_error(tree, markup).document
    }

    /// Parse `markup` and also report the error rendered into the document
    pub fn parse_with_error(&self, tree: &mut DomTree, markup: &str) -> ParseOutcome {
        tracing::debug!(
            "Parsing XML document ({} bytes, {})",
            markup.len(),
            self.options.content_type
        );
        let markup = markup.strip_prefix('\u{feff}').unwrap_or(markup);
        let document = tree.create_document(&self.options.content_type);

        let sink = BuilderSink {
            builder: RefCell::new(TreeBuilder::new(tree, document, markup)),
        };
        // The byte order mark is gone already; any later U+FEFF is content
        let opts = XmlTokenizerOpts {
            discard_bom: false,
            ..Default::default()
        };
        let tokenizer = XmlTokenizer::new(sink, opts);
        let queue = BufferQueue::default();

        for (offset, c) in markup.char_indices() {
            if tokenizer.sink.failed() {
                break;
            }
            if !tokenizer.sink.advance(offset, c) {
                continue;
            }
            queue.push_back(StrTendril::from_char(c));
            let TokenizerResult::Done = tokenizer.feed(&queue) else {
                break;
            };
            tokenizer.sink.settle();
        }
        tokenizer.end();

        tokenizer.sink.builder.borrow_mut().finish()
    }
}

/// Line and column (both 1-based) in the normalized input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Position {
    line: u32,
    column: u32,
}

/// Where the feed loop stands in the raw input
struct Cursor {
    /// Position of the character fed last
    position: Position,
    /// Byte offset just past the character fed last
    end: usize,
    saw_cr: bool,
    /// Byte offset just past the last token; the raw text of the token being
    /// assembled starts here
    gap_start: usize,
    gap_line: u32,
}

/// Internal DTD subsets are skipped before they reach the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subset {
    Outside,
    Inside,
    Quoted(char),
}

/// Pseudo-attributes of `<?xml ...?>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct XmlDeclaration {
    version: Option<String>,
    encoding: Option<String>,
    standalone: Option<String>,
}

/// Prefix bindings declared on one element; `""` is the default namespace
type Scope = HashMap<String, Option<String>>;

struct InsertionPoint {
    /// Node receiving children: the element, a template's content, or a
    /// declarative shadow root
    target: NodeId,
    name: String,
    line: u32,
    scope: Scope,
}

struct ResolvedAttribute {
    name: String,
    namespace: Option<String>,
    value: String,
}

/// Start tag with its namespaces resolved
struct ResolvedTag {
    name: String,
    local_name: String,
    namespace: Option<String>,
    attributes: Vec<ResolvedAttribute>,
    self_closing: bool,
}

impl ResolvedTag {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

struct PendingText {
    data: String,
    position: Position,
}

struct PendingCData {
    /// Byte offset just past `<![CDATA[`
    start: usize,
    data: String,
}

/// xml5ever sink; the tokenizer only lends it out by shared reference
struct BuilderSink<'a, 't> {
    builder: RefCell<TreeBuilder<'a, 't>>,
}

impl BuilderSink<'_, '_> {
    fn failed(&self) -> bool {
        self.builder.borrow().error.is_some()
    }

    fn advance(&self, offset: usize, c: char) -> bool {
        self.builder.borrow_mut().advance(offset, c)
    }

    fn settle(&self) {
        self.builder.borrow_mut().settle();
    }
}

impl TokenSink for BuilderSink<'_, '_> {
    type Handle = ();

    fn process_token(&self, token: Token) -> ProcessResult<()> {
        self.builder.borrow_mut().process(token);
        ProcessResult::Continue
    }

    fn end(&self) {
        self.builder.borrow_mut().end();
    }
}

/// Token consumer that builds the tree
struct TreeBuilder<'a, 't> {
    tree: &'t mut DomTree,
    document: NodeId,
    input: &'a str,
    cursor: Cursor,
    subset: Subset,
    stack: Vec<InsertionPoint>,
    document_element: Option<NodeId>,
    declaration: Option<XmlDeclaration>,
    error: Option<XmlParseError>,
    tokens_seen: usize,
    text: Option<PendingText>,
    cdata: Option<PendingCData>,
}

fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

impl<'a, 't> TreeBuilder<'a, 't> {
    fn new(tree: &'t mut DomTree, document: NodeId, input: &'a str) -> Self {
        Self {
            tree,
            document,
            input,
            cursor: Cursor {
                position: Position { line: 1, column: 0 },
                end: 0,
                saw_cr: false,
                gap_start: 0,
                gap_line: 1,
            },
            subset: Subset::Outside,
            stack: Vec::new(),
            document_element: None,
            declaration: None,
            error: None,
            tokens_seen: 0,
            text: None,
            cdata: None,
        }
    }

    /// Track the position of the next character; false when it must not be
    /// fed to the tokenizer
    fn advance(&mut self, offset: usize, c: char) -> bool {
        let position = &mut self.cursor.position;
        match c {
            '\n' if self.cursor.saw_cr => self.cursor.saw_cr = false,
            '\r' | '\n' => {
                position.line += 1;
                position.column = 0;
                self.cursor.saw_cr = c == '\r';
            }
            _ => {
                position.column += 1;
                self.cursor.saw_cr = false;
            }
        }
        self.cursor.end = offset + c.len_utf8();
        !self.skip_internal_subset(offset, c)
    }

    fn skip_internal_subset(&mut self, offset: usize, c: char) -> bool {
        self.subset = match (self.subset, c) {
            (Subset::Outside, '[') if self.in_doctype(offset) => Subset::Inside,
            (Subset::Outside, _) => return false,
            (Subset::Inside, ']') => Subset::Outside,
            (Subset::Inside, '"' | '\'') => Subset::Quoted(c),
            (Subset::Quoted(quote), _) if c == quote => Subset::Inside,
            (state, _) => state,
        };
        true
    }

    /// The raw text since the last token is an open `<!DOCTYPE`, outside
    /// any quoted identifier
    fn in_doctype(&self, offset: usize) -> bool {
        let raw = &self.input[self.cursor.gap_start..offset];
        if !raw.get(..9).is_some_and(|head| head.eq_ignore_ascii_case("<!DOCTYPE")) {
            return false;
        }
        let mut quote = None;
        for c in raw.chars() {
            match quote {
                Some(q) if c == q => quote = None,
                None if c == '"' || c == '\'' => quote = Some(c),
                _ => {}
            }
        }
        quote.is_none()
    }

    /// Raw text of the token being assembled, up to the last fed character
    fn gap(&self) -> &'a str {
        &self.input[self.cursor.gap_start..self.cursor.end]
    }

    fn close_gap(&mut self) {
        self.cursor.gap_start = self.cursor.end;
        self.cursor.gap_line = self.cursor.position.line;
    }

    /// CDATA content reaches the sink as plain characters; section bounds
    /// are read off the raw input after each character
    fn settle(&mut self) {
        let end = self.cursor.end;
        let finished = match &self.cdata {
            Some(cdata) => self.input[cdata.start..end].ends_with("]]>"),
            None => {
                if self.gap().eq_ignore_ascii_case("<![CDATA[") {
                    self.flush_text();
                    self.cdata = Some(PendingCData {
                        start: end,
                        data: String::new(),
                    });
                }
                false
            }
        };
        if finished && let Some(cdata) = self.cdata.take() {
            let position = self.cursor.position;
            self.close_gap();
            self.cdata_section(&cdata.data, position);
        }
    }

    fn process(&mut self, token: Token) {
        if self.error.is_some() {
            return;
        }
        let position = self.cursor.position;
        let first_token = self.tokens_seen == 0;
        match token {
            Token::ParseError(message) => {
                self.flush_text();
                let message = self.describe_error(&message);
                self.record_error(message, position);
                return;
            }
            Token::EndOfFile | Token::NullCharacter => return,
            Token::Characters(chars) => self.characters(&chars, position),
            token => {
                self.flush_text();
                if self.error.is_some() {
                    return;
                }
                self.markup(token, first_token, position);
            }
        }
        self.tokens_seen += 1;
        self.close_gap();
    }

    fn markup(&mut self, token: Token, first_token: bool, position: Position) {
        match token {
            Token::Tag(tag) => {
                match tag.kind {
                    TagKind::StartTag | TagKind::EmptyTag => {
                        let self_closing = tag.kind == TagKind::EmptyTag;
                        self.start_tag(&tag.name, tag.attrs, self_closing, position);
                    }
                    TagKind::EndTag => self.end_tag(&qualified_name(&tag.name), position),
                    // `</>` closes nothing in XML
                    TagKind::ShortTag => self.end_tag("", position),
                }
            }
            Token::Comment(data) => self.comment(&data, position),
            Token::ProcessingInstruction(pi) => {
                self.processing_instruction(pi, first_token, position)
            }
            Token::Doctype(doctype) => self.doctype(doctype, position),
            Token::Characters(_) | Token::EndOfFile | Token::NullCharacter | Token::ParseError(_) => {}
        }
    }

    fn end(&mut self) {
        self.flush_text();
        if self.error.is_some() {
            return;
        }
        let position = self.cursor.position;
        if let Some(open) = self.stack.last() {
            let message = format!("Premature end of data in tag {} line {}", open.name, open.line);
            self.record_error(message, position);
        } else if self.document_element.is_none() {
            self.record_error("Start tag expected, '<' not found", position);
        }
    }

    /// Reword xml5ever's generic errors where the raw input tells us more
    fn describe_error(&self, message: &str) -> String {
        let raw = self.gap();
        match message {
            "Unexpected EOF" => self.describe_eof(raw),
            "Invalid character reference" => match undeclared_entity(raw) {
                Some(name) => format!("Entity '{}' not defined", name),
                None => "EntityRef: expecting ';'".to_string(),
            },
            "Character reference does not end with semicolon"
            | "Semicolon missing after numeric character reference"
            | "EOF in numeric character reference"
            | "EOF after '#' in character reference" => "EntityRef: expecting ';'".to_string(),
            other => other.to_string(),
        }
    }

    fn describe_eof(&self, raw: &str) -> String {
        if self.cdata.is_some() {
            return "CData section not finished".to_string();
        }
        let head = |prefix: &str| {
            raw.get(..prefix.len())
                .is_some_and(|h| h.eq_ignore_ascii_case(prefix))
        };
        if head("<!--") {
            "Comment not terminated".to_string()
        } else if head("<!DOCTYPE") {
            "DOCTYPE improperly terminated".to_string()
        } else if head("<?") {
            "ParsePI: PI was not finished".to_string()
        } else if head("</") {
            format!("expected '>' in end tag {}", leading_name(&raw[2..]))
        } else if head("<") {
            format!("Couldn't find end of Start Tag {}", leading_name(&raw[1..]))
        } else if head("&") {
            "EntityRef: expecting ';'".to_string()
        } else {
            "Premature end of data".to_string()
        }
    }

    fn insertion_point(&self) -> NodeId {
        self.stack.last().map_or(self.document, |p| p.target)
    }

    fn at_root(&self) -> bool {
        self.stack.is_empty()
    }

    fn record_error(&mut self, message: impl Into<String>, position: Position) {
        if self.error.is_none() {
            let message = message.into();
            tracing::trace!(line = position.line, column = position.column, "{}", message);
            self.error = Some(XmlParseError {
                message,
                line: position.line,
                column: position.column,
            });
        }
    }

    fn append(&mut self, node: NodeId, position: Position) -> bool {
        let parent = self.insertion_point();
        match self.tree.append_child(parent, node) {
            Ok(_) => true,
            Err(err) => {
                self.record_error(err.message().to_string(), position);
                false
            }
        }
    }

    fn characters(&mut self, chars: &str, position: Position) {
        if let Some(cdata) = &mut self.cdata {
            cdata.data.push_str(chars);
            return;
        }
        let raw = self.gap();
        if raw.starts_with('&') {
            // A reference that resolved to nothing comes back as a bare `&`
            let message = match undeclared_entity(raw) {
                Some(name) => Some(format!("Entity '{}' not defined", name)),
                None if chars == "&" && !raw.ends_with(';') => {
                    Some("xmlParseEntityRef: no name".to_string())
                }
                None => None,
            };
            if let Some(message) = message {
                self.flush_text();
                self.record_error(message, position);
                return;
            }
        }
        match &mut self.text {
            Some(pending) => pending.data.push_str(chars),
            None => {
                self.text = Some(PendingText {
                    data: chars.to_string(),
                    position,
                })
            }
        }
    }

    fn flush_text(&mut self) {
        let Some(PendingText { data, position }) = self.text.take() else {
            return;
        };
        if self.error.is_some() {
            return;
        }
        if self.at_root() {
            if !is_xml_whitespace(&data) {
                let message = if self.document_element.is_some() {
                    "Extra content at the end of the document"
                } else {
                    "Start tag expected, '<' not found"
                };
                self.record_error(message, position);
            }
            return;
        }
        let node = self.tree.create_text_node(self.document, &data);
        self.append(node, position);
    }

    fn start_tag(
        &mut self,
        name: &QualName,
        attrs: Vec<Attribute>,
        self_closing: bool,
        position: Position,
    ) {
        if self.at_root() && self.document_element.is_some() {
            self.record_error("Extra content at the end of the document", position);
            return;
        }
        if let Some(entity) = undeclared_entity(self.gap()) {
            self.record_error(format!("Entity '{}' not defined", entity), position);
            return;
        }

        let attrs = declarations_in_order(attrs);
        let scope = declared_namespaces(&attrs);
        let tag = match self.resolve_tag(name, &attrs, &scope, self_closing) {
            Ok(tag) => tag,
            Err(message) => {
                self.record_error(message, position);
                return;
            }
        };
        let line = self.cursor.gap_line;

        if let Some(host) = self.declarative_shadow_host(&tag) {
            if let Some(mode) = tag
                .attribute("shadowrootmode")
                .and_then(ShadowRootMode::from_keyword)
            {
                let init = ShadowRootInit {
                    mode,
                    delegates_focus: tag.attribute("shadowrootdelegatesfocus").is_some(),
                };
                // Hosts that cannot take a shadow root keep a plain template
                if let Ok(shadow) = self.tree.attach_shadow(host, init) {
                    if !tag.self_closing {
                        self.stack.push(InsertionPoint {
                            target: shadow,
                            name: tag.name,
                            line,
                            scope,
                        });
                    }
                    return;
                }
            }
        }

        let element =
            match self
                .tree
                .create_element_ns(self.document, tag.namespace.as_deref(), &tag.name)
            {
                Ok(element) => element,
                Err(err) => {
                    self.record_error(err.message().to_string(), position);
                    return;
                }
            };

        for attribute in &tag.attributes {
            if let Err(err) = self.tree.set_attribute_ns(
                element,
                attribute.namespace.as_deref(),
                &attribute.name,
                &attribute.value,
            ) {
                self.record_error(err.message().to_string(), position);
                return;
            }
        }

        let at_root = self.at_root();
        if !self.append(element, position) {
            return;
        }
        if at_root {
            self.document_element = Some(element);
        }
        if !tag.self_closing {
            let target = self.tree.template_content(element).unwrap_or(element);
            self.stack.push(InsertionPoint {
                target,
                name: tag.name,
                line,
                scope,
            });
        }
    }

    /// Namespace bound to `prefix` for an element declaring `own`
    fn lookup(&self, prefix: &str, own: &Scope) -> Option<String> {
        let binding = own
            .get(prefix)
            .or_else(|| self.stack.iter().rev().find_map(|p| p.scope.get(prefix)));
        match binding {
            Some(uri) => uri.clone(),
            None => implicit_namespace(prefix).map(str::to_string),
        }
    }

    fn resolve_tag(
        &self,
        name: &QualName,
        attrs: &[Attribute],
        scope: &Scope,
        self_closing: bool,
    ) -> Result<ResolvedTag, String> {
        let (prefix, local_name) = split_name(name)?;
        let namespace = match &prefix {
            Some(p) => Some(self.lookup(p, scope).ok_or_else(|| {
                format!("Namespace prefix {} on {} is not defined", p, local_name)
            })?),
            None => self.lookup("", scope),
        };
        let qualified = qualified_name(name);

        let mut attributes = Vec::with_capacity(attrs.len());
        for attr in attrs {
            let (attr_prefix, attr_local) = split_name(&attr.name)?;
            let attr_namespace = match attr_prefix.as_deref() {
                None if attr_local == "xmlns" => Some(namespace::XMLNS.to_string()),
                None => None,
                Some("xmlns") => Some(namespace::XMLNS.to_string()),
                Some("xlink") => Some(namespace::XLINK.to_string()),
                Some(p) => Some(self.lookup(p, scope).ok_or_else(|| {
                    format!(
                        "Namespace prefix {} for {} on {} is not defined",
                        p, attr_local, qualified
                    )
                })?),
            };
            attributes.push(ResolvedAttribute {
                name: qualified_name(&attr.name),
                namespace: attr_namespace,
                // Attribute value normalization
                value: attr.value.replace(['\t', '\n'], " "),
            });
        }

        Ok(ResolvedTag {
            name: qualified,
            local_name,
            namespace,
            attributes,
            self_closing,
        })
    }

    /// Element that a `<template shadowrootmode>` at the insertion point
    /// would attach to
    fn declarative_shadow_host(&self, tag: &ResolvedTag) -> Option<NodeId> {
        if tag.local_name != "template" || tag.namespace.as_deref() != Some(namespace::HTML) {
            return None;
        }
        tag.attribute("shadowrootmode")?;
        let parent = self.insertion_point();
        self.tree.is_element(parent).then_some(parent)
    }

    fn end_tag(&mut self, name: &str, position: Position) {
        let Some(open) = self.stack.last() else {
            self.record_error(format!("Unexpected end tag : {}", name), position);
            return;
        };
        if open.name != name {
            let message = format!(
                "Opening and ending tag mismatch: {} line {} and {}",
                open.name, open.line, name
            );
            self.record_error(message, position);
            return;
        }
        self.stack.pop();
    }

    fn comment(&mut self, data: &str, position: Position) {
        if data.contains("--") || data.ends_with('-') {
            self.record_error("Double hyphen within comment", position);
            return;
        }
        if self.at_root() {
            return;
        }
        let node = self.tree.create_comment(self.document, data);
        self.append(node, position);
    }

    fn cdata_section(&mut self, data: &str, position: Position) {
        if self.error.is_some() || self.at_root() {
            return;
        }
        match self.tree.create_cdata_section(self.document, data) {
            Ok(node) => {
                self.append(node, position);
            }
            Err(err) => self.record_error(err.message().to_string(), position),
        }
    }

    fn processing_instruction(&mut self, pi: Pi, first_token: bool, position: Position) {
        let target = pi.target.to_string();
        let data = pi.data.trim_end();

        if target == "xml" {
            if first_token && !self.tree.has_child_nodes(self.document) {
                self.declaration = Some(parse_xml_declaration(data));
            } else {
                self.record_error(
                    "XML declaration allowed only at the start of the document",
                    position,
                );
            }
            return;
        }
        if target.eq_ignore_ascii_case("xml") {
            let message = format!("xmlParsePITarget: invalid name prefix '{}'", target);
            self.record_error(message, position);
            return;
        }
        match validation::validate_processing_instruction(&target, data) {
            Ok(()) => match self
                .tree
                .create_processing_instruction(self.document, &target, data)
            {
                Ok(node) => {
                    self.append(node, position);
                }
                Err(err) => self.record_error(err.message().to_string(), position),
            },
            Err(ProcessingInstructionError::InvalidTarget) => {
                self.record_error(format!("ParsePI: PI {} invalid target name", target), position)
            }
            Err(ProcessingInstructionError::ContainsClose) => {
                self.record_error("ParsePI: PI was not finished", position)
            }
        }
    }

    fn doctype(&mut self, doctype: Doctype, position: Position) {
        if !self.at_root() || self.tree.has_child_nodes(self.document) {
            self.record_error("Misplaced DOCTYPE declaration", position);
            return;
        }
        let field = |value: &Option<StrTendril>| value.as_deref().unwrap_or_default().to_string();
        let node = self.tree.create_document_type(
            self.document,
            &field(&doctype.name),
            &field(&doctype.public_id),
            &field(&doctype.system_id),
        );
        self.append(node, position);
    }

    /// Render any error, insert the XML declaration and hand back the document
    fn finish(&mut self) -> ParseOutcome {
        if let Some(error) = self.error.clone() {
            tracing::warn!("XML parse error: {}", error);
            self.render_error(&error);
        } else if let Some(declaration) = self.declaration.take() {
            self.insert_declaration(&declaration);
        }
        ParseOutcome {
            document: self.document,
            error: self.error.clone(),
        }
    }

    fn insert_declaration(&mut self, declaration: &XmlDeclaration) {
        let data = [
            ("version", &declaration.version),
            ("encoding", &declaration.encoding),
            ("standalone", &declaration.standalone),
        ]
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}=\"{}\"", key, v)))
        .collect::<Vec<_>>()
        .join(" ");
        let pi = match self
            .tree
            .create_processing_instruction(self.document, "xml", &data)
        {
            Ok(pi) => pi,
            Err(err) => {
                tracing::warn!("Dropping XML declaration: {}", err);
                return;
            }
        };
        let first = self.tree.first_child(self.document);
        if let Err(err) = self.tree.insert_before(self.document, pi, first) {
            tracing::warn!("Dropping XML declaration: {}", err);
        }
    }

    /// Insert the error banner as the first child of the body, building an
    /// `html`/`body` skeleton around the partial tree when there is none
    fn render_error(&mut self, error: &XmlParseError) {
        let body = match self.existing_body() {
            Some(body) => body,
            None => match self.build_skeleton() {
                Some(body) => body,
                None => {
                    tracing::warn!("No body to render the parse error into");
                    return;
                }
            },
        };
        let Some(banner) = self.build_banner(error) else {
            tracing::warn!("Failed to build the parse error banner");
            return;
        };
        let first = self.tree.first_child(body);
        if let Err(err) = self.tree.insert_before(body, banner, first) {
            tracing::warn!("Failed to insert the parse error banner: {}", err);
        }
    }

    fn existing_body(&self) -> Option<NodeId> {
        let html = self.tree.document_element(self.document)?;
        if !self.tree.is_html_element(html, "html") {
            return None;
        }
        self.tree
            .child_nodes(html)
            .iter()
            .copied()
            .find(|&child| self.tree.is_html_element(child, "body"))
    }

    fn build_skeleton(&mut self) -> Option<NodeId> {
        let html = self.create_html("html")?;
        let body = self.create_html("body")?;
        self.tree.append_child(html, body).ok()?;
        if let Some(existing) = self.tree.document_element(self.document) {
            self.tree.append_child(body, existing).ok()?;
        }
        self.tree.append_child(self.document, html).ok()?;
        Some(body)
    }

    fn create_html(&mut self, name: &str) -> Option<NodeId> {
        self.tree
            .create_element_ns(self.document, Some(namespace::HTML), name)
            .ok()
    }

    fn build_banner(&mut self, error: &XmlParseError) -> Option<NodeId> {
        let banner = self.create_html("parsererror")?;
        self.tree
            .set_attribute_ns(banner, Some(namespace::XMLNS), "xmlns", namespace::HTML)
            .ok()?;
        self.tree.set_attribute(banner, "style", BANNER_STYLE).ok()?;

        let heading = self.create_html("h3")?;
        let text = self
            .tree
            .create_text_node(self.document, "This page contains the following errors:");
        self.tree.append_child(heading, text).ok()?;
        self.tree.append_child(banner, heading).ok()?;

        let details = self.create_html("div")?;
        self.tree
            .set_attribute(details, "style", "font-family:monospace;font-size:12px")
            .ok()?;
        let text = self
            .tree
            .create_text_node(self.document, &format!("{}\n", error));
        self.tree.append_child(details, text).ok()?;
        self.tree.append_child(banner, details).ok()?;

        let footer = self.create_html("h3")?;
        let text = self
            .tree
            .create_text_node(self.document, "Below is a rendering of the page up to the first error.");
        self.tree.append_child(footer, text).ok()?;
        self.tree.append_child(banner, footer).ok()?;
        Some(banner)
    }
}

fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", &**prefix, &*name.local),
        None => name.local.to_string(),
    }
}

/// xml5ever leaves names with stray colons unsplit
fn split_name(name: &QualName) -> Result<(Option<String>, String), String> {
    match &name.prefix {
        Some(prefix) => Ok((Some(prefix.to_string()), name.local.to_string())),
        None if name.local.contains(':') => {
            Err(format!("Failed to parse QName '{}'", &*name.local))
        }
        None => Ok((None, name.local.to_string())),
    }
}

fn is_declaration(name: &QualName) -> bool {
    match name.prefix.as_deref() {
        Some(prefix) => prefix == "xmlns",
        None => &*name.local == "xmlns",
    }
}

/// xml5ever moves namespace declarations to the front in reverse order; keep
/// them in front but in document order
fn declarations_in_order(mut attrs: Vec<Attribute>) -> Vec<Attribute> {
    let declarations = attrs.iter().take_while(|a| is_declaration(&a.name)).count();
    attrs[..declarations].reverse();
    attrs
}

fn declared_namespaces(attrs: &[Attribute]) -> Scope {
    let mut scope = Scope::new();
    for attr in attrs.iter().filter(|a| is_declaration(&a.name)) {
        let uri = (!attr.value.is_empty()).then(|| attr.value.to_string());
        let prefix = match attr.name.prefix {
            Some(_) => attr.name.local.to_string(),
            None => String::new(),
        };
        scope.insert(prefix, uri);
    }
    scope
}

fn implicit_namespace(prefix: &str) -> Option<&'static str> {
    match prefix {
        "xml" => Some(namespace::XML),
        "xmlns" => Some(namespace::XMLNS),
        "xlink" => Some(namespace::XLINK),
        _ => None,
    }
}

/// First `&name;` in `raw` naming anything but the predefined entities.
/// xml5ever resolves the whole HTML entity table, XML only knows five.
fn undeclared_entity(raw: &str) -> Option<&str> {
    raw.match_indices('&').find_map(|(at, _)| {
        let rest = &raw[at + 1..];
        let name = &rest[..rest.find(';')?];
        let is_name = !name.is_empty()
            && !name.starts_with('#')
            && name.chars().all(validation::is_name_char);
        (is_name && !PREDEFINED_ENTITIES.contains(&name)).then_some(name)
    })
}

fn leading_name(raw: &str) -> &str {
    let end = raw
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(raw.len());
    &raw[..end]
}

/// Read `version`, `encoding` and `standalone` out of an XML declaration body
fn parse_xml_declaration(data: &str) -> XmlDeclaration {
    let mut declaration = XmlDeclaration::default();
    let mut rest = data;
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(end) = after[1..].find(quote) else {
            break;
        };
        let value = after[1..1 + end].to_string();
        match key {
            "version" => declaration.version = Some(value),
            "encoding" => declaration.encoding = Some(value),
            "standalone" => declaration.standalone = Some(value),
            _ => {}
        }
        rest = &after[end + 2..];
    }
    declaration
}
