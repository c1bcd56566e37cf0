//! Seal payload extraction from DER signature containers
//!
//! A seal payload is a SEQUENCE of exactly four members: an IA5String file
//! type, an OCTET STRING with the image or nested OFD bytes, and two
//! INTEGER dimensions. The container is searched depth-first in document
//! order and the first qualifying sequence wins.

use crate::error::{Error, Result};
use crate::parse::der::{
    self, DerNode, TAG_IA5_STRING, TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE,
};

/// The extracted visual seal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealData {
    /// Lowercased file type: `png`, `jpg`, `jpeg` or `ofd`.
    pub file_type: String,
    pub data: Vec<u8>,
}

const SUPPORTED_TYPES: [&str; 4] = ["png", "jpg", "jpeg", "ofd"];
const MAX_PAYLOAD: usize = 50 * 1024 * 1024;

/// Extract the first qualifying seal payload from a DER blob.
pub fn extract_seal(data: &[u8]) -> Result<SealData> {
    let (root, _) = der::parse_node(data)?;
    walk(&root, &mut |payload| Some(payload)).ok_or(Error::NoSealFound)
}

/// Every qualifying seal payload, in depth-first preorder.
pub fn find_all_seals(data: &[u8]) -> Result<Vec<SealData>> {
    let (root, _) = der::parse_node(data)?;
    let mut found = Vec::new();
    walk::<()>(&root, &mut |payload| {
        found.push(payload);
        None
    });
    Ok(found)
}

/// Depth-first preorder over SEQUENCE/SET nodes; `visit` may short-circuit
/// by returning `Some`.
fn walk<T>(root: &DerNode, visit: &mut impl FnMut(SealData) -> Option<T>) -> Option<T> {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.constructed && node.is_universal(TAG_SEQUENCE) {
            let children = node.children();
            if children.len() == 4 && matches_payload_shape(&children) {
                if let Some(payload) = payload_from(&children) {
                    if let Some(result) = visit(payload) {
                        return Some(result);
                    }
                }
            }
        }
        if node.is_container() {
            for child in node.children().into_iter().rev() {
                stack.push(child);
            }
        }
    }
    None
}

fn matches_payload_shape(children: &[DerNode]) -> bool {
    children.len() == 4
        && children[0].is_universal(TAG_IA5_STRING)
        && children[1].is_universal(TAG_OCTET_STRING)
        && children[2].is_universal(TAG_INTEGER)
        && children[3].is_universal(TAG_INTEGER)
}

fn payload_from(children: &[DerNode]) -> Option<SealData> {
    let file_type = std::str::from_utf8(children[0].content).ok()?.to_lowercase();
    if !SUPPORTED_TYPES.contains(&file_type.as_str()) {
        return None;
    }
    if children[1].content.len() > MAX_PAYLOAD {
        return None;
    }
    Some(SealData { file_type, data: children[1].content.to_vec() })
}
