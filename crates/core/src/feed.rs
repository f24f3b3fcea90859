//! Feed document parsing.
//!
//! Both syndication dialects are accepted. The dialect is decided once from
//! the root element and fixes which nodes are entries and which child fields
//! hold the title, body, link, and date:
//!
//! | dialect | root               | entry node | body fields, in priority order      |
//! |---------|--------------------|------------|-------------------------------------|
//! | RSS     | `rss`, `rdf:RDF`   | `item`     | `content:encoded`, `description`    |
//! | Atom    | `feed`             | `entry`    | `content`, `summary`                |
//!
//! The first body field with non-blank text wins. Field lookups go through
//! XPath over an `sxd_document` tree and match both local name and namespace,
//! so extension elements such as `media:content` never stand in for a field.
//!
//! Atom text constructs carry a `type`: `html` bodies are escaped markup,
//! `xhtml` bodies are inline elements serialized back to markup here, and
//! `text` (the default) is plain text that must not be read as markup again.

use serde::Serialize;
use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::fetch::FeedDocument;
use crate::{Result, VoiceprintError};

const CONTENT_MODULE_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const DUBLIN_CORE_NS: &str = "http://purl.org/dc/elements/1.1/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Namespaces RSS core elements appear in: none (0.9x/2.0), RSS 1.0, and RSS 0.90.
const RSS_NAMESPACES: [&str; 3] = ["", "http://purl.org/rss/1.0/", "http://my.netscape.com/rdf/simple/0.9/"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 10] = ["area", "br", "col", "embed", "hr", "img", "input", "source", "track", "wbr"];

/// The two accepted entry shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedDialect {
    /// Item-style feeds: RSS 0.9x, 1.0 (RDF), and 2.0.
    Rss,
    /// Entry-style feeds: Atom 1.0.
    Atom,
}

/// How a title or body field is encoded once read out of the XML tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// HTML markup.
    #[default]
    Html,
    /// Plain text; any `<` in it is literal.
    Text,
}

impl FeedDialect {
    /// Resolves the dialect from the local name of the document element.
    pub fn from_root(local_name: &str) -> Option<Self> {
        match local_name {
            "rss" | "RDF" => Some(Self::Rss),
            "feed" => Some(Self::Atom),
            _ => None,
        }
    }

    fn namespaces(self) -> &'static [&'static str] {
        match self {
            Self::Rss => &RSS_NAMESPACES,
            Self::Atom => &[ATOM_NS],
        }
    }

    fn entry_xpath(self) -> String {
        match self {
            Self::Rss => format!("//{}", child_element("item", self.namespaces())),
            Self::Atom => format!("//{}", child_element("entry", self.namespaces())),
        }
    }

    fn title_xpath(self) -> String {
        format!("{}[1]", child_element("title", self.namespaces()))
    }

    fn body_xpaths(self) -> Vec<String> {
        match self {
            Self::Rss => vec![
                format!("{}[1]", child_element("encoded", &[CONTENT_MODULE_NS])),
                format!("{}[1]", child_element("description", self.namespaces())),
            ],
            Self::Atom => vec![
                format!("{}[1]", child_element("content", self.namespaces())),
                format!("{}[1]", child_element("summary", self.namespaces())),
            ],
        }
    }

    fn link_xpath(self) -> String {
        match self {
            Self::Rss => format!("string({}[1])", child_element("link", self.namespaces())),
            Self::Atom => format!(
                "string({}[not(@rel) or @rel='alternate'][1]/@href)",
                child_element("link", self.namespaces())
            ),
        }
    }

    fn published_xpaths(self) -> Vec<String> {
        match self {
            Self::Rss => vec![
                format!("string({}[1])", child_element("pubDate", self.namespaces())),
                format!("string({}[1])", child_element("date", &[DUBLIN_CORE_NS])),
            ],
            Self::Atom => vec![
                format!("string({}[1])", child_element("published", self.namespaces())),
                format!("string({}[1])", child_element("updated", self.namespaces())),
            ],
        }
    }

    /// Reads a title or body node, resolving how its text is encoded.
    fn read_content(self, node: Node<'_>) -> (String, ContentKind) {
        let element = match (self, node) {
            (Self::Atom, Node::Element(element)) => element,
            _ => return (node.string_value(), ContentKind::Html),
        };

        let content_type = element.attribute_value("type").unwrap_or("text").trim().to_ascii_lowercase();
        match content_type.as_str() {
            "xhtml" | "application/xhtml+xml" => {
                let mut markup = String::new();
                serialize_children(element, &mut markup);
                (markup, ContentKind::Html)
            }
            "html" | "text/html" => (node.string_value(), ContentKind::Html),
            _ => (node.string_value(), ContentKind::Text),
        }
    }
}

/// Child-axis step matching `local` in any of `namespaces`.
fn child_element(local: &str, namespaces: &[&str]) -> String {
    let namespace_test = namespaces
        .iter()
        .map(|ns| format!("namespace-uri()='{}'", ns))
        .collect::<Vec<_>>()
        .join(" or ");
    format!("*[local-name()='{}' and ({})]", local, namespace_test)
}

/// Writes the children of an inline XHTML element back out as HTML markup.
fn serialize_children(element: Element<'_>, out: &mut String) {
    for child in element.children() {
        match child {
            ChildOfElement::Element(child) => {
                let name = child.name().local_part();
                out.push('<');
                out.push_str(name);
                for attribute in child.attributes() {
                    out.push_str(&format!(
                        " {}=\"{}\"",
                        attribute.name().local_part(),
                        escape_markup(attribute.value())
                    ));
                }
                out.push('>');

                if !VOID_ELEMENTS.contains(&name) {
                    serialize_children(child, out);
                    out.push_str(&format!("</{}>", name));
                }
            }
            ChildOfElement::Text(text) => out.push_str(&escape_markup(text.text())),
            _ => {}
        }
    }
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// One post as it appears in the feed, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    /// Zero-based position in the feed document.
    pub position: usize,
    pub title: String,
    pub title_kind: ContentKind,
    /// Body from the highest-priority non-blank body field.
    pub raw_body: String,
    pub body_kind: ContentKind,
    pub link: Option<String>,
    /// Publication date exactly as written in the feed.
    pub published: Option<String>,
}

/// Compiled lookups for one dialect.
struct EntryQueries {
    entries: XPath,
    title: XPath,
    bodies: Vec<XPath>,
    link: XPath,
    published: Vec<XPath>,
}

/// Parser turning feed documents into ordered [`FeedEntry`] lists.
pub struct FeedParser {
    factory: Factory,
}

impl FeedParser {
    pub fn new() -> Self {
        Self { factory: Factory::new() }
    }

    /// Parses a document into its entries, preserving document order.
    ///
    /// A well-formed feed with no entries yields an empty list. A document that
    /// is not well-formed XML, or whose root is not a known feed element, fails
    /// with [`VoiceprintError::FeedMalformed`].
    pub fn parse(&self, document: &FeedDocument) -> Result<Vec<FeedEntry>> {
        self.parse_with_dialect(document).map(|(_, entries)| entries)
    }

    /// Same as [`FeedParser::parse`], also reporting the resolved dialect.
    pub fn parse_with_dialect(&self, document: &FeedDocument) -> Result<(FeedDialect, Vec<FeedEntry>)> {
        let malformed = |reason: String| VoiceprintError::FeedMalformed { url: document.url.clone(), reason };

        let xml = document.body.trim_start_matches('\u{feff}').trim_start();
        if xml.is_empty() {
            return Err(malformed("document is empty".to_string()));
        }

        let package = parser::parse(xml).map_err(|e| malformed(format!("not well-formed XML: {}", e)))?;
        let doc = package.as_document();
        let context = Context::new();

        let root_name = self.evaluate_string(&context, doc.root(), &self.compile("local-name(/*)")?, &malformed)?;
        let dialect = FeedDialect::from_root(&root_name)
            .ok_or_else(|| malformed(format!("unrecognized root element <{}>", root_name)))?;
        let queries = self.queries(dialect)?;

        let nodes = match queries.entries.evaluate(&context, doc.root()) {
            Ok(Value::Nodeset(nodeset)) => nodeset.document_order(),
            Ok(_) => Vec::new(),
            Err(e) => return Err(malformed(e.to_string())),
        };

        let mut entries = Vec::with_capacity(nodes.len());
        for (position, node) in nodes.into_iter().enumerate() {
            let (title, title_kind) =
                self.read_field(&context, node, &queries.title, dialect, &malformed)?.unwrap_or_default();

            let mut body = None;
            for xpath in &queries.bodies {
                body = self.read_field(&context, node, xpath, dialect, &malformed)?;
                if body.is_some() {
                    break;
                }
            }
            let (raw_body, body_kind) = body.unwrap_or_default();

            let link = non_blank(self.evaluate_string(&context, node, &queries.link, &malformed)?);
            let published = self.first_non_blank(&context, node, &queries.published, &malformed)?;

            entries.push(FeedEntry { position, title, title_kind, raw_body, body_kind, link, published });
        }

        tracing::debug!(url = %document.url, ?dialect, entries = entries.len(), "parsed feed");

        Ok((dialect, entries))
    }

    fn queries(&self, dialect: FeedDialect) -> Result<EntryQueries> {
        Ok(EntryQueries {
            entries: self.compile(&dialect.entry_xpath())?,
            title: self.compile(&dialect.title_xpath())?,
            bodies: dialect.body_xpaths().iter().map(|x| self.compile(x)).collect::<Result<_>>()?,
            link: self.compile(&dialect.link_xpath())?,
            published: dialect.published_xpaths().iter().map(|x| self.compile(x)).collect::<Result<_>>()?,
        })
    }

    fn compile(&self, xpath: &str) -> Result<XPath> {
        self.factory
            .build(xpath)
            .map_err(|e| VoiceprintError::ConfigError(format!("Invalid XPath '{}': {}", xpath, e)))?
            .ok_or_else(|| VoiceprintError::ConfigError(format!("Invalid XPath: {}", xpath)))
    }

    /// Reads the first node selected by `xpath`, if it holds non-blank text.
    fn read_field<'d>(
        &self, context: &Context<'d>, node: Node<'d>, xpath: &XPath, dialect: FeedDialect,
        malformed: &impl Fn(String) -> VoiceprintError,
    ) -> Result<Option<(String, ContentKind)>> {
        let found = match xpath.evaluate(context, node) {
            Ok(Value::Nodeset(nodeset)) => nodeset.document_order().into_iter().next(),
            Ok(_) => None,
            Err(e) => return Err(malformed(e.to_string())),
        };

        Ok(found.and_then(|field| {
            let (text, kind) = dialect.read_content(field);
            non_blank(text).map(|text| (text, kind))
        }))
    }

    fn evaluate_string<'d>(
        &self, context: &Context<'d>, node: impl Into<Node<'d>>, xpath: &XPath,
        malformed: &impl Fn(String) -> VoiceprintError,
    ) -> Result<String> {
        match xpath.evaluate(context, node) {
            Ok(Value::String(s)) => Ok(s),
            Ok(Value::Nodeset(nodeset)) => {
                Ok(nodeset.document_order().first().map(|n| n.string_value()).unwrap_or_default())
            }
            Ok(_) => Ok(String::new()),
            Err(e) => Err(malformed(e.to_string())),
        }
    }

    fn first_non_blank<'d>(
        &self, context: &Context<'d>, node: Node<'d>, xpaths: &[XPath], malformed: &impl Fn(String) -> VoiceprintError,
    ) -> Result<Option<String>> {
        for xpath in xpaths {
            if let Some(value) = non_blank(self.evaluate_string(context, node, xpath, malformed)?) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value.trim().to_string()) }
}

/// Parses a feed document with a fresh [`FeedParser`].
pub fn parse_feed(document: &FeedDocument) -> Result<Vec<FeedEntry>> {
    FeedParser::new().parse(document)
}
