//! Atom feed parsing.
//!
//! The catalog feed is an Atom document whose entries describe available
//! archive versions. Parsing is strict: an entry missing any required field
//! fails the whole parse rather than being dropped, so a truncated or
//! renamed feed is noticed instead of producing an empty-looking result.

use chrono::{DateTime, SubsecRound, Utc};
use roxmltree::{Document, Node};

use super::{CatalogError, CatalogResult};
use crate::archive::ArchiveEntry;

/// Link type identifying the per-file manifest.
const META_LINK_TYPE: &str = "application/x-zim";

/// Parse a feed document into entries.
///
/// `url` is used only for error context.
pub(crate) fn parse_feed(xml: &str, url: &str) -> CatalogResult<Vec<ArchiveEntry>> {
    let doc = Document::parse(xml).map_err(|e| malformed(url, e.to_string()))?;
    let root = doc.root_element();

    let mut entries = Vec::new();
    for node in root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "entry")
    {
        entries.push(parse_entry(node, url)?);
    }
    Ok(entries)
}

fn parse_entry(entry: Node<'_, '_>, url: &str) -> CatalogResult<ArchiveEntry> {
    let updated_raw = required_text(entry, "updated", url)?;
    // Truncated to the microsecond precision the installed-state store keeps,
    // so a recorded version compares equal to the same feed entry later.
    let updated: DateTime<Utc> = DateTime::parse_from_rfc3339(updated_raw)
        .map_err(|e| malformed(url, format!("bad <updated> timestamp {:?}: {}", updated_raw, e)))?
        .with_timezone(&Utc)
        .trunc_subsecs(6);

    let meta_link = entry
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "link")
        .find(|n| n.attribute("type") == Some(META_LINK_TYPE))
        .and_then(|n| n.attribute("href"))
        .ok_or_else(|| malformed(url, "entry has no meta link".to_string()))?;

    Ok(ArchiveEntry {
        id: required_text(entry, "id", url)?.to_string(),
        title: required_text(entry, "title", url)?.to_string(),
        updated,
        summary: required_text(entry, "summary", url)?.to_string(),
        language: required_text(entry, "language", url)?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        name: required_text(entry, "name", url)?.to_string(),
        flavour: optional_text(entry, "flavour").map(|s| s.to_string()),
        category: optional_text(entry, "category").map(|s| s.to_string()),
        tags: required_text(entry, "tags", url)?
            .split(';')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        article_count: required_number(entry, "articleCount", url)?,
        media_count: required_number(entry, "mediaCount", url)?,
        author_name: nested_name(entry, "author", url)?,
        publisher_name: nested_name(entry, "publisher", url)?,
        meta_link: meta_link.to_string(),
    })
}

fn child<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn optional_text<'a>(node: Node<'a, 'a>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|n| n.text())
        .filter(|s| !s.is_empty())
}

fn required_text<'a>(node: Node<'a, 'a>, name: &str, url: &str) -> CatalogResult<&'a str> {
    child(node, name)
        .and_then(|n| n.text())
        .ok_or_else(|| malformed(url, format!("entry missing <{}>", name)))
}

fn required_number(node: Node<'_, '_>, name: &str, url: &str) -> CatalogResult<u64> {
    let raw = required_text(node, name, url)?;
    raw.parse()
        .map_err(|_| malformed(url, format!("non-numeric <{}>: {:?}", name, raw)))
}

/// Author and publisher carry their name in a nested `<name>` element.
fn nested_name(node: Node<'_, '_>, name: &str, url: &str) -> CatalogResult<String> {
    child(node, name)
        .and_then(|n| child(n, "name"))
        .and_then(|n| n.text())
        .map(|s| s.to_string())
        .ok_or_else(|| malformed(url, format!("entry missing <{}><name>", name)))
}

fn malformed(url: &str, reason: String) -> CatalogError {
    CatalogError::Malformed {
        url: url.to_string(),
        reason,
    }
}
