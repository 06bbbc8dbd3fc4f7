//! The bullet list of links in `README.md`.
//!
//! The second top-level block of the README must be a bullet list whose
//! items each hold a `[NAME](/NAME)` link. The document is split into the
//! text before the list, the list items and the text after the list, so
//! everything outside the list is written back untouched.
//!
//! Each item carries beginning-of-list / end-of-list flags. The renderer
//! uses them to decide where the list opens and closes, so they must move
//! whenever an item is added at either end.
//!
//! New items escape Markdown punctuation in their link text, so a name such
//! as `x*y*z` reads back as itself rather than as emphasis.

use std::ops::Range;
use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::editor::{insert_sorted, Boundary, EntryList, Insertion};
use crate::error::{IndexError, Result};
use crate::writer;

/// Position of the link list among the top-level blocks (zero-based).
pub const LIST_BLOCK: usize = 1;

/// Characters backslash-escaped in the link text of new items.
const TEXT_ESCAPES: &str = "\\`*_[]()<>&~^";

/// One bullet of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    key: String,
    text: String,
    /// Source between the previous item and this one, if it came from the
    /// document and was not the first item.
    gap: Option<String>,
    beginning_of_list: bool,
    end_of_list: bool,
}

impl ListItem {
    /// The link text used as the sort key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Source of the item without its trailing newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for the item that opens the list.
    pub fn is_beginning_of_list(&self) -> bool {
        self.beginning_of_list
    }

    /// True for the item that closes the list.
    pub fn is_end_of_list(&self) -> bool {
        self.end_of_list
    }
}

/// The items of the README link list.
#[derive(Debug, Clone)]
pub struct BulletList {
    items: Vec<ListItem>,
    lead: String,
    separator: String,
    newline: String,
}

impl BulletList {
    /// Items in document order.
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Link texts in document order.
    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.key.as_str()).collect()
    }

    fn render_into(&self, out: &mut String) {
        for item in &self.items {
            if !item.beginning_of_list {
                out.push_str(item.gap.as_deref().unwrap_or(&self.separator));
            }
            out.push_str(&item.text);
            if item.end_of_list {
                out.push_str(&self.newline);
            }
        }
    }
}

impl EntryList for BulletList {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn key(&self, index: usize) -> &str {
        &self.items[index].key
    }

    fn insert(&mut self, index: usize, key: &str) {
        let item = ListItem {
            key: key.to_string(),
            text: format!("{}{}", self.lead, link_markup(key)),
            gap: None,
            beginning_of_list: false,
            end_of_list: false,
        };
        self.items.insert(index, item);
    }

    fn set_boundary(&mut self, index: usize, boundary: Boundary, on: bool) {
        let item = &mut self.items[index];
        match boundary {
            Boundary::First => item.beginning_of_list = on,
            Boundary::Last => item.end_of_list = on,
        }
    }
}

/// A parsed README split around its link list.
#[derive(Debug, Clone)]
pub struct Readme {
    prefix: String,
    list: BulletList,
    suffix: String,
}

impl Readme {
    /// Reads and parses the README at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the file cannot be read and
    /// [`IndexError::Parse`] if it has no link list in the expected place.
    pub fn load(path: &Path) -> Result<Self> {
        let source = writer::read(path)?;
        Self::parse(path, &source)
    }

    /// Parses README source; `path` is used in error messages only.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Parse`] if the second top-level block is not a
    /// bullet list or one of its items has no link.
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        let raw = scan_list(source).map_err(|reason| IndexError::parse(path, reason))?;

        let (Some(first), Some(last)) = (raw.first(), raw.last()) else {
            return Err(IndexError::parse(path, "link list has no items"));
        };
        let list_start = line_start(source, first.range.start);
        let lead = bullet_lead(&source[list_start..first.range.end]);

        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };

        let count = raw.len();
        let mut items = Vec::with_capacity(count);
        let mut previous_end: Option<usize> = None;
        for (i, item) in raw.iter().enumerate() {
            let key = item
                .key
                .clone()
                .ok_or_else(|| IndexError::parse(path, format!("list item {} has no link", i + 1)))?;
            let start = line_start(source, item.range.start);
            let end = start + source[start..item.range.end].trim_end().len();
            items.push(ListItem {
                key,
                text: source[start..end].to_string(),
                gap: previous_end
                    .and_then(|previous| source.get(previous..start))
                    .map(str::to_string),
                beginning_of_list: i == 0,
                end_of_list: i + 1 == count,
            });
            previous_end = Some(end);
        }

        // New items are joined like the first two existing ones, minus any
        // trailing blanks left on the first item's line.
        let separator = items
            .get(1)
            .and_then(|item| item.gap.as_deref())
            .map(|gap| gap.trim_start_matches([' ', '\t']))
            .filter(|gap| !gap.is_empty())
            .unwrap_or(newline)
            .to_string();

        let last_start = line_start(source, last.range.start);
        let list_end = last_start + source[last_start..last.range.end].trim_end().len();
        let rest = source[list_end..].trim_start_matches([' ', '\t']);
        let suffix = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        Ok(Self {
            prefix: source[..list_start].to_string(),
            list: BulletList {
                items,
                lead,
                separator,
                newline: newline.to_string(),
            },
            suffix: suffix.to_string(),
        })
    }

    /// The link list.
    pub fn list(&self) -> &BulletList {
        &self.list
    }

    /// Inserts a link for `name` in ascending order.
    pub fn insert(&mut self, name: &str) -> Insertion {
        insert_sorted(&mut self.list, name)
    }

    /// Renders the document.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.prefix.len() + self.suffix.len() + 64);
        out.push_str(&self.prefix);
        self.list.render_into(&mut out);
        out.push_str(&self.suffix);
        out
    }

    /// Writes the README back to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        writer::write_atomic(path, self.render().as_bytes())
    }
}

/// Inserts a link for `name` into the README at `path`, saving it only when
/// it changed.
///
/// # Errors
///
/// Returns an error if the README cannot be loaded, parsed or written.
pub fn update_readme(path: &Path, name: &str) -> Result<Insertion> {
    let mut readme = Readme::load(path)?;
    let outcome = readme.insert(name);
    if outcome.is_inserted() {
        readme.save(path)?;
    }
    Ok(outcome)
}

/// A list item as found by the scanner.
#[derive(Debug)]
struct RawItem {
    range: Range<usize>,
    key: Option<String>,
}

fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_FOOTNOTES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts
}

/// Collects the items of the bullet list that forms the second top-level
/// block, keyed by the text of each item's first link.
fn scan_list(source: &str) -> std::result::Result<Vec<RawItem>, String> {
    let mut depth = 0usize;
    let mut blocks = 0usize;
    let mut in_list = false;
    let mut items: Vec<RawItem> = Vec::new();
    let mut link_text: Option<String> = None;

    for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    if blocks == LIST_BLOCK {
                        if !matches!(tag, Tag::List(None)) {
                            return Err("second block is not a bullet list".to_string());
                        }
                        in_list = true;
                    }
                    blocks += 1;
                } else if in_list {
                    match tag {
                        Tag::Item if depth == 1 => items.push(RawItem { range, key: None }),
                        Tag::Link { .. } if link_text.is_none() => {
                            if items.last().is_some_and(|item| item.key.is_none()) {
                                link_text = Some(String::new());
                            }
                        }
                        _ => {}
                    }
                }
                depth += 1;
            }
            Event::End(tag) => {
                depth = depth.saturating_sub(1);
                if !in_list {
                    continue;
                }
                match tag {
                    TagEnd::Link => {
                        if let (Some(text), Some(item)) = (link_text.take(), items.last_mut()) {
                            item.key = Some(text);
                        }
                    }
                    TagEnd::Item if depth == 1 => {
                        if let Some(item) = items.last_mut() {
                            item.range.end = range.end;
                        }
                    }
                    _ => {}
                }
                if depth == 0 {
                    return Ok(items);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(link) = link_text.as_mut() {
                    link.push_str(&text);
                }
            }
            Event::Rule if depth == 0 => {
                if blocks == LIST_BLOCK {
                    return Err("second block is not a bullet list".to_string());
                }
                blocks += 1;
            }
            _ => {}
        }
    }

    Err(format!("expected a link list as block {}, found {} block(s)", LIST_BLOCK + 1, blocks))
}

/// Byte offset of the start of the line containing `pos`.
fn line_start(source: &str, pos: usize) -> usize {
    source[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// Link markup for `name` whose text reads back as exactly `name`.
///
/// Destinations that CommonMark would end early (spaces, parentheses) are
/// wrapped in angle brackets.
fn link_markup(name: &str) -> String {
    let mut text = String::with_capacity(name.len());
    for c in name.chars() {
        if TEXT_ESCAPES.contains(c) {
            text.push('\\');
        }
        text.push(c);
    }

    let bare = !name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>' | '\\'));
    if bare {
        return format!("[{}](/{})", text, name);
    }
    let mut destination = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '\\' | '<' | '>') {
            destination.push('\\');
        }
        destination.push(c);
    }
    format!("[{}](</{}>)", text, destination)
}

/// Indentation and bullet of the first item's line, reused for new items.
fn bullet_lead(line: &str) -> String {
    let marker = line.trim_start();
    let indent = &line[..line.len() - marker.len()];
    let bullet = marker
        .chars()
        .next()
        .filter(|c| matches!(c, '-' | '*' | '+'))
        .unwrap_or('-');
    format!("{}{} ", indent, bullet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const README: &str = "# Projects\n\n- [alpha](/alpha)\n- [gamma](/gamma)\n\nMaintained by hand.\n";

    fn readme(source: &str) -> Readme {
        Readme::parse(Path::new("README.md"), source).unwrap()
    }

    fn markers(readme: &Readme) -> Vec<(&str, bool, bool)> {
        readme
            .list()
            .items()
            .iter()
            .map(|i| (i.key(), i.is_beginning_of_list(), i.is_end_of_list()))
            .collect()
    }

    #[test]
    fn unchanged_document_renders_identically() {
        assert_eq!(readme(README).render(), README);
    }

    #[test]
    fn inserts_in_the_middle() {
        let mut doc = readme(README);
        assert_eq!(doc.insert("beta"), Insertion::Inserted { index: 1 });
        assert_eq!(
            doc.render(),
            "# Projects\n\n- [alpha](/alpha)\n- [beta](/beta)\n- [gamma](/gamma)\n\nMaintained by hand.\n"
        );
        assert_eq!(
            markers(&doc),
            [("alpha", true, false), ("beta", false, false), ("gamma", false, true)]
        );
    }

    #[test]
    fn head_insertion_takes_the_beginning_marker() {
        let mut doc = readme("# Projects\n\n- [beta](/beta)\n");
        assert_eq!(doc.insert("alpha"), Insertion::Inserted { index: 0 });
        assert_eq!(markers(&doc), [("alpha", true, false), ("beta", false, true)]);
        assert_eq!(doc.render(), "# Projects\n\n- [alpha](/alpha)\n- [beta](/beta)\n");
    }

    #[test]
    fn tail_insertion_takes_the_end_marker() {
        let mut doc = readme(README);
        doc.insert("omega");
        assert_eq!(
            markers(&doc),
            [("alpha", true, false), ("gamma", false, false), ("omega", false, true)]
        );
        assert!(doc
            .render()
            .ends_with("- [gamma](/gamma)\n- [omega](/omega)\n\nMaintained by hand.\n"));
    }

    #[test]
    fn existing_name_is_skipped() {
        let mut doc = readme(README);
        assert_eq!(doc.insert("alpha"), Insertion::Duplicate);
        assert_eq!(doc.render(), README);
    }

    #[test]
    fn reuses_the_bullet_style() {
        let mut doc = readme("Intro\n\n* [b](/b)\n");
        doc.insert("a");
        assert_eq!(doc.render(), "Intro\n\n* [a](/a)\n* [b](/b)\n");
    }

    #[test]
    fn missing_trailing_newline_is_added() {
        let mut doc = readme("Intro\n\n- [b](/b)");
        doc.insert("c");
        assert_eq!(doc.render(), "Intro\n\n- [b](/b)\n- [c](/c)\n");
    }

    #[test]
    fn keys_span_formatted_link_text() {
        let doc = readme("Intro\n\n- [my_repo](/my_repo)\n- [`code`](/code)\n");
        assert_eq!(doc.list().keys(), ["my_repo", "code"]);
    }

    #[test]
    fn second_block_must_be_a_bullet_list() {
        let err = Readme::parse(Path::new("README.md"), "# T\n\n1. [a](/a)\n").unwrap_err();
        assert_eq!(err.to_string(), "README.md: second block is not a bullet list");

        let err = Readme::parse(Path::new("README.md"), "# T\n\n---\n\n- [a](/a)\n").unwrap_err();
        assert!(matches!(err, IndexError::Parse { .. }));
    }

    #[test]
    fn single_block_document_is_rejected() {
        let err = Readme::parse(Path::new("README.md"), "# Only a title\n").unwrap_err();
        assert!(err.to_string().contains("found 1 block(s)"));
    }

    #[test]
    fn item_without_link_is_rejected() {
        let err = Readme::parse(Path::new("README.md"), "# T\n\n- [a](/a)\n- plain\n").unwrap_err();
        assert_eq!(err.to_string(), "README.md: list item 2 has no link");
    }

    #[test]
    fn markdown_syntax_in_a_name_reads_back_as_the_name() {
        let mut doc = readme("Intro\n\n- [beta](/beta)\n");
        assert_eq!(doc.insert("x*y*z"), Insertion::Inserted { index: 1 });
        let rendered = doc.render();
        assert_eq!(rendered, "Intro\n\n- [beta](/beta)\n- [x\\*y\\*z](/x*y*z)\n");

        let mut again = readme(&rendered);
        assert_eq!(again.list().keys(), ["beta", "x*y*z"]);
        assert_eq!(again.insert("x*y*z"), Insertion::Duplicate);
    }

    #[test]
    fn spaces_and_parentheses_use_an_angle_destination() {
        let mut doc = readme("Intro\n\n- [beta](/beta)\n");
        doc.insert("my repo");
        doc.insert("a_(b)");
        let rendered = doc.render();
        assert_eq!(
            rendered,
            "Intro\n\n- [a\\_\\(b\\)](</a_(b)>)\n- [beta](/beta)\n- [my repo](</my repo>)\n"
        );

        let mut again = readme(&rendered);
        assert_eq!(again.list().keys(), ["a_(b)", "beta", "my repo"]);
        assert_eq!(again.insert("my repo"), Insertion::Duplicate);
        assert_eq!(again.insert("a_(b)"), Insertion::Duplicate);
    }

    #[test]
    fn entities_and_code_spans_are_escaped() {
        let mut doc = readme("Intro\n\n- [beta](/beta)\n");
        doc.insert("a&amp;`b`");
        let again = readme(&doc.render());
        assert_eq!(again.list().keys(), ["a&amp;`b`", "beta"]);
    }

    #[test]
    fn loose_list_stays_loose() {
        let source = "# T\n\n- [a](/a)\n\n- [c](/c)\n\nEnd\n";
        assert_eq!(readme(source).render(), source);

        let mut doc = readme(source);
        doc.insert("b");
        doc.insert("d");
        assert_eq!(
            doc.render(),
            "# T\n\n- [a](/a)\n\n- [b](/b)\n\n- [c](/c)\n\n- [d](/d)\n\nEnd\n"
        );
    }

    #[test]
    fn crlf_line_endings_are_kept() {
        let mut doc = readme("# T\r\n\r\n- [a](/a)\r\n- [c](/c)\r\n");
        doc.insert("b");
        doc.insert("0");
        assert_eq!(
            doc.render(),
            "# T\r\n\r\n- [0](/0)\r\n- [a](/a)\r\n- [b](/b)\r\n- [c](/c)\r\n"
        );
    }

    #[test]
    fn trailing_blanks_after_the_last_item_are_dropped() {
        let mut doc = readme("Intro\n\n- [b](/b)  \n\nEnd\n");
        doc.insert("c");
        assert_eq!(doc.render(), "Intro\n\n- [b](/b)\n- [c](/c)\n\nEnd\n");
    }
}
