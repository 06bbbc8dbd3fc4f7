//! The link list in `index.html`.
//!
//! The page is parsed with html5ever into an `RcDom`. Entries are the
//! element children of the list reached through `html > body > div > ul`,
//! each `<li><a href="/NAME">NAME</a></li>` keyed by its anchor text.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{local_name, namespace_url, ns, parse_document, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

use crate::editor::{insert_sorted, EntryList, Insertion};
use crate::error::{IndexError, Result};
use crate::writer;

/// Element path from the document root to the link list.
pub const LIST_PATH: [&str; 4] = ["html", "body", "div", "ul"];

/// Whitespace placed next to a new item when the list has none to copy.
pub const DEFAULT_INDENT: &str = "\n            ";

/// A parsed `index.html` together with its link list.
pub struct IndexPage {
    dom: RcDom,
    list: LinkList,
}

impl IndexPage {
    /// Reads and parses the page at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the file cannot be read and
    /// [`IndexError::Parse`] if the link list is missing or an entry has no
    /// anchor.
    pub fn load(path: &Path) -> Result<Self> {
        let source = writer::read(path)?;
        Self::parse(path, &source)
    }

    /// Parses page source; `path` is used in error messages only.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Parse`] if the link list is missing or an entry
    /// has no anchor.
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
        let ul = find_path(&dom.document, &LIST_PATH).map_err(|missing| {
            IndexError::parse(
                path,
                format!("no <{}> on the path {}", missing, LIST_PATH.join(" > ")),
            )
        })?;
        let list = LinkList::new(path, ul)?;
        Ok(Self { dom, list })
    }

    /// The link list inside the page.
    pub fn list(&self) -> &LinkList {
        &self.list
    }

    /// Inserts a link for `name` in ascending order.
    pub fn insert(&mut self, name: &str) -> Insertion {
        insert_sorted(&mut self.list, name)
    }

    /// Serializes the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if serialization fails.
    pub fn render(&self, path: &Path) -> Result<String> {
        let mut out = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut out, &document, SerializeOpts::default())
            .map_err(|e| IndexError::io(path, e))?;
        String::from_utf8(out).map_err(|e| {
            IndexError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    /// Writes the page back to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the page cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let html = self.render(path)?;
        writer::write_atomic(path, html.as_bytes())
    }
}

/// The `<ul>` node and the keys of its entries.
pub struct LinkList {
    ul: Handle,
    entries: Vec<(String, Handle)>,
    indent: String,
}

impl LinkList {
    fn new(path: &Path, ul: Handle) -> Result<Self> {
        let mut entries = Vec::new();
        let mut indent = None;
        for child in ul.children.borrow().iter() {
            match &child.data {
                NodeData::Element { .. } => {
                    let anchor = find_descendant(child, "a").ok_or_else(|| {
                        IndexError::parse(path, "list entry without an <a> link")
                    })?;
                    entries.push((text_content(&anchor), child.clone()));
                }
                NodeData::Text { contents } if entries.is_empty() && indent.is_none() => {
                    let text = contents.borrow();
                    if !text.is_empty() && text.trim().is_empty() {
                        indent = Some(text.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(Self {
            ul,
            entries,
            indent: indent.unwrap_or_else(|| DEFAULT_INDENT.to_string()),
        })
    }

    /// Anchor texts in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Position of `node` among the `<ul>` children.
    fn child_index(&self, node: &Handle) -> usize {
        let children = self.ul.children.borrow();
        children
            .iter()
            .position(|child| Rc::ptr_eq(child, node))
            .unwrap_or(children.len())
    }

    fn splice(&self, at: usize, nodes: Vec<Handle>) {
        for node in &nodes {
            node.parent.set(Some(Rc::downgrade(&self.ul)));
        }
        let mut children = self.ul.children.borrow_mut();
        let at = at.min(children.len());
        for (offset, node) in nodes.into_iter().enumerate() {
            children.insert(at + offset, node);
        }
    }
}

impl EntryList for LinkList {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn key(&self, index: usize) -> &str {
        &self.entries[index].0
    }

    fn insert(&mut self, index: usize, key: &str) {
        let item = new_list_item(key);
        let space = new_text(&self.indent);
        if let Some((_, before)) = self.entries.get(index) {
            let at = self.child_index(before);
            self.splice(at, vec![item.clone(), space]);
        } else if let Some((_, last)) = self.entries.last() {
            let at = self.child_index(last) + 1;
            self.splice(at, vec![space, item.clone()]);
        } else {
            let at = self.ul.children.borrow().len();
            self.splice(at, vec![space, item.clone()]);
        }
        self.entries.insert(index, (key.to_string(), item));
    }
}

/// Inserts a link for `name` into the page at `path`, saving it only when
/// it changed.
///
/// # Errors
///
/// Returns an error if the page cannot be loaded, parsed or written.
pub fn update_index(path: &Path, name: &str) -> Result<Insertion> {
    let mut page = IndexPage::load(path)?;
    let outcome = page.insert(name);
    if outcome.is_inserted() {
        page.save(path)?;
    }
    Ok(outcome)
}

/// Follows `steps` from `root`, picking the first element child with each
/// name. Returns the name of the first step that cannot be found.
fn find_path<'a>(root: &Handle, steps: &[&'a str]) -> std::result::Result<Handle, &'a str> {
    let mut node = root.clone();
    for step in steps {
        let next = node
            .children
            .borrow()
            .iter()
            .find(|child| is_element(child, step))
            .cloned();
        node = next.ok_or(*step)?;
    }
    Ok(node)
}

fn is_element(node: &Handle, tag: &str) -> bool {
    matches!(&node.data, NodeData::Element { name, .. } if &*name.local == tag)
}

fn find_descendant(node: &Handle, tag: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if is_element(child, tag) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, tag) {
            return Some(found);
        }
    }
    None
}

fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

fn new_element(tag: LocalName, attrs: Vec<Attribute>) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), tag),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Builds `<li><a href="/NAME">NAME</a></li>`.
fn new_list_item(name: &str) -> Handle {
    let href = Attribute {
        name: QualName::new(None, ns!(), local_name!("href")),
        value: StrTendril::from(format!("/{}", name)),
    };
    let anchor = new_element(local_name!("a"), vec![href]);
    adopt(&anchor, new_text(name));
    let item = new_element(local_name!("li"), Vec::new());
    adopt(&item, anchor);
    item
}

fn adopt(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>
<html>
    <head><title>Index</title></head>
    <body>
        <div>
            <h1>Repositories</h1>
            <ul>
            <li><a href=\"/alpha\">alpha</a></li>
            <li><a href=\"/gamma\">gamma</a></li>
        </ul>
        </div>
    </body>
</html>
";

    fn page(source: &str) -> IndexPage {
        IndexPage::parse(Path::new("index.html"), source).unwrap()
    }

    #[test]
    fn reads_existing_keys() {
        assert_eq!(page(PAGE).list().keys(), ["alpha", "gamma"]);
    }

    #[test]
    fn inserts_between_existing_links() {
        let mut page = page(PAGE);
        assert_eq!(page.insert("beta"), Insertion::Inserted { index: 1 });
        let html = page.render(Path::new("index.html")).unwrap();
        assert!(html.contains(
            "<li><a href=\"/alpha\">alpha</a></li>\n            \
             <li><a href=\"/beta\">beta</a></li>\n            \
             <li><a href=\"/gamma\">gamma</a></li>"
        ));
    }

    #[test]
    fn appends_after_the_last_link() {
        let mut page = page(PAGE);
        assert_eq!(page.insert("zeta"), Insertion::Inserted { index: 2 });
        let html = page.render(Path::new("index.html")).unwrap();
        assert!(html.contains(
            "<li><a href=\"/gamma\">gamma</a></li>\n            \
             <li><a href=\"/zeta\">zeta</a></li>\n        </ul>"
        ));
    }

    #[test]
    fn prepends_before_the_first_link() {
        let mut page = page(PAGE);
        page.insert("_first");
        let reparsed = IndexPage::parse(
            Path::new("index.html"),
            &page.render(Path::new("index.html")).unwrap(),
        )
        .unwrap();
        assert_eq!(reparsed.list().keys(), ["_first", "alpha", "gamma"]);
    }

    #[test]
    fn existing_name_is_skipped() {
        let mut page = page(PAGE);
        let before = page.render(Path::new("index.html")).unwrap();
        assert_eq!(page.insert("gamma"), Insertion::Duplicate);
        assert_eq!(page.render(Path::new("index.html")).unwrap(), before);
    }

    #[test]
    fn names_are_escaped_on_output() {
        let mut page = page(PAGE);
        page.insert("b&b");
        let html = page.render(Path::new("index.html")).unwrap();
        assert!(html.contains("<a href=\"/b&amp;b\">b&amp;b</a>"));
    }

    #[test]
    fn empty_list_receives_its_first_link() {
        let mut page = page("<html><body><div><ul></ul></div></body></html>");
        assert_eq!(page.insert("solo"), Insertion::Inserted { index: 0 });
        assert_eq!(page.list().keys(), ["solo"]);
    }

    #[test]
    fn missing_list_is_a_parse_error() {
        let err = IndexPage::parse(
            Path::new("index.html"),
            "<html><body><p>nothing here</p></body></html>",
        )
        .err()
        .unwrap();
        assert_eq!(
            err.to_string(),
            "index.html: no <div> on the path html > body > div > ul"
        );
    }

    #[test]
    fn entry_without_anchor_is_a_parse_error() {
        let err = IndexPage::parse(
            Path::new("index.html"),
            "<html><body><div><ul><li>plain</li></ul></div></body></html>",
        )
        .err()
        .unwrap();
        assert!(matches!(err, IndexError::Parse { .. }));
    }
}
