//! Small helpers over `roxmltree`
//!
//! OFD descriptors use a namespace prefix (`ofd:`) inconsistently across
//! producers, so all lookups here match on local names only. Namespace
//! declarations are carried by roxmltree and otherwise ignored.

use roxmltree::Node;

use crate::error::{Error, Result};

/// An attribute value by local name.
pub fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes().find(|a| a.name() == name).map(|a| a.value())
}

/// A required attribute value by local name.
pub fn req_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    attr(node, name).ok_or_else(|| {
        Error::Parse(format!("<{}> missing attribute {name}", node.tag_name().name()))
    })
}

/// A float attribute, defaulting to `default` when absent.
pub fn attr_f64(node: Node, name: &str, default: f64) -> Result<f64> {
    match attr(node, name) {
        Some(v) => v.parse::<f64>().map_err(|e| {
            Error::Parse(format!("<{}> {name}='{v}': {e}", node.tag_name().name()))
        }),
        None => Ok(default),
    }
}

/// An unsigned integer attribute, defaulting to `default` when absent.
pub fn attr_u64(node: Node, name: &str, default: u64) -> Result<u64> {
    match attr(node, name) {
        Some(v) => v.parse::<u64>().map_err(|e| {
            Error::Parse(format!("<{}> {name}='{v}': {e}", node.tag_name().name()))
        }),
        None => Ok(default),
    }
}

/// A signed integer attribute, defaulting to `default` when absent.
pub fn attr_i64(node: Node, name: &str, default: i64) -> Result<i64> {
    match attr(node, name) {
        Some(v) => v.parse::<i64>().map_err(|e| {
            Error::Parse(format!("<{}> {name}='{v}': {e}", node.tag_name().name()))
        }),
        None => Ok(default),
    }
}

/// A boolean attribute; accepts `true`/`false`/`1`/`0`.
pub fn attr_bool(node: Node, name: &str, default: bool) -> bool {
    match attr(node, name) {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

/// First child element with the given local name.
pub fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All child elements with the given local name, in document order.
pub fn children<'a, 'i>(
    node: Node<'a, 'i>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children().filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Trimmed text content of the node.
pub fn text(node: Node) -> String {
    node.text().unwrap_or("").trim().to_string()
}

/// Trimmed text of the first child element with the given name.
pub fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_lookup_ignores_prefix() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:OFD xmlns:ofd="http://www.ofdspec.org/2016" Version="1.0">
                 <ofd:DocBody><ofd:DocRoot>Doc_0/Document.xml</ofd:DocRoot></ofd:DocBody>
               </ofd:OFD>"#,
        )
        .unwrap();
        let root = doc.root_element();
        assert_eq!(attr(root, "Version"), Some("1.0"));
        let body = child(root, "DocBody").unwrap();
        assert_eq!(child_text(body, "DocRoot").as_deref(), Some("Doc_0/Document.xml"));
    }

    #[test]
    fn test_typed_attrs() {
        let doc = roxmltree::Document::parse(r#"<E A="4.5" B="7" C="true"/>"#).unwrap();
        let e = doc.root_element();
        assert_eq!(attr_f64(e, "A", 0.0).unwrap(), 4.5);
        assert_eq!(attr_u64(e, "B", 0).unwrap(), 7);
        assert!(attr_bool(e, "C", false));
        assert_eq!(attr_f64(e, "Missing", 1.25).unwrap(), 1.25);
        assert!(req_attr(e, "Missing").is_err());
    }
}
