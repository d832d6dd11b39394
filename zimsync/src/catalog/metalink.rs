//! Metalink manifest parsing.
//!
//! The per-file manifest is a metalink-style XML document with one `file`
//! element carrying the declared size, content hashes, and the prioritized
//! mirror list.

use roxmltree::{Document, Node};

use super::{CatalogError, CatalogResult};
use crate::archive::{ArchiveMeta, Mirror};

/// Parse a manifest document.
///
/// `url` is used only for error context.
pub(crate) fn parse_metalink(xml: &str, url: &str) -> CatalogResult<ArchiveMeta> {
    let doc = Document::parse(xml).map_err(|e| malformed(url, e.to_string()))?;

    let file = doc
        .root_element()
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "file")
        .ok_or_else(|| malformed(url, "manifest has no <file> element".to_string()))?;

    let file_name = file
        .attribute("name")
        .ok_or_else(|| malformed(url, "<file> missing name attribute".to_string()))?;

    let size_raw = file
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "size")
        .and_then(|n| n.text())
        .ok_or_else(|| malformed(url, "manifest missing <size>".to_string()))?;
    let size: u64 = size_raw
        .parse()
        .map_err(|_| malformed(url, format!("non-numeric <size>: {:?}", size_raw)))?;

    let mut hashes = std::collections::BTreeMap::new();
    for hash in elements(file, "hash") {
        let algorithm = hash
            .attribute("type")
            .ok_or_else(|| malformed(url, "<hash> missing type attribute".to_string()))?;
        let digest = hash
            .text()
            .ok_or_else(|| malformed(url, format!("<hash type={:?}> has no digest", algorithm)))?;
        hashes.insert(algorithm.to_string(), digest.to_string());
    }

    let mut mirrors = Vec::new();
    for node in elements(file, "url") {
        let location = node
            .attribute("location")
            .ok_or_else(|| malformed(url, "<url> missing location attribute".to_string()))?;
        let priority_raw = node
            .attribute("priority")
            .ok_or_else(|| malformed(url, "<url> missing priority attribute".to_string()))?;
        let priority: i64 = priority_raw
            .parse()
            .map_err(|_| malformed(url, format!("non-numeric priority: {:?}", priority_raw)))?;
        let mirror_url = node
            .text()
            .ok_or_else(|| malformed(url, "<url> element has no URL text".to_string()))?;

        mirrors.push(Mirror {
            location: location.to_string(),
            priority,
            url: mirror_url.to_string(),
        });
    }

    Ok(ArchiveMeta {
        file_name: file_name.to_string(),
        size,
        hashes,
        mirrors,
    })
}

fn elements<'a>(node: Node<'a, 'a>, name: &'a str) -> impl Iterator<Item = Node<'a, 'a>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn malformed(url: &str, reason: String) -> CatalogError {
    CatalogError::Malformed {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_URL: &str = "https://example.org/wikipedia.zim.meta4";

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metalink xmlns="urn:ietf:params:xml:ns:metalink">
  <file name="wikipedia_en_all_maxi_2024-01.zim">
    <size>98304</size>
    <hash type="md5">0123456789abcdef0123456789abcdef</hash>
    <hash type="sha-256">b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9</hash>
    <url location="us" priority="2">https://mirror-us.example.org/wikipedia.zim</url>
    <url location="de" priority="1">https://mirror-de.example.org/wikipedia.zim</url>
  </file>
</metalink>"#;

    #[test]
    fn test_parse_complete_manifest() {
        let meta = parse_metalink(MANIFEST, META_URL).unwrap();

        assert_eq!(meta.file_name, "wikipedia_en_all_maxi_2024-01.zim");
        assert_eq!(meta.size, 98304);
        assert_eq!(meta.hashes.len(), 2);
        assert_eq!(
            meta.hashes.get("sha-256").map(String::as_str),
            Some("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
        );
        assert_eq!(meta.mirrors.len(), 2);
        // Document order is preserved; prioritization happens at fetch time.
        assert_eq!(meta.mirrors[0].location, "us");
        assert_eq!(meta.mirrors[1].priority, 1);
    }

    #[test]
    fn test_missing_size_fails() {
        let xml = MANIFEST.replace("<size>98304</size>", "");
        assert!(parse_metalink(&xml, META_URL).is_err());
    }

    #[test]
    fn test_non_numeric_size_fails() {
        let xml = MANIFEST.replace("<size>98304</size>", "<size>big</size>");
        let err = parse_metalink(&xml, META_URL).unwrap_err();
        match err {
            CatalogError::Malformed { reason, .. } => assert!(reason.contains("size")),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_priority_fails() {
        let xml = MANIFEST.replace("priority=\"2\"", "priority=\"high\"");
        assert!(parse_metalink(&xml, META_URL).is_err());
    }

    #[test]
    fn test_manifest_without_mirrors_parses() {
        let xml = MANIFEST
            .replace(
                "<url location=\"us\" priority=\"2\">https://mirror-us.example.org/wikipedia.zim</url>",
                "",
            )
            .replace(
                "<url location=\"de\" priority=\"1\">https://mirror-de.example.org/wikipedia.zim</url>",
                "",
            );
        let meta = parse_metalink(&xml, META_URL).unwrap();
        assert!(meta.mirrors.is_empty());
    }
}
