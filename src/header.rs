//! Tree header
//!
//! The header is a pre-order listing of the tree.  A branch is the single byte
//! `0x80` followed by its left and right subtrees.  A leaf is a length byte
//! (0 to 127) followed by that many bytes of the symbol's raw representation.
//!
//! Weights are not stored.  Leaves read back from a header get weight 1, which
//! is enough to reproduce the codes but not the original statistics.
//!
//! A header nested deeper than `MAX_DEPTH` is rejected.  Huffman trees built from
//! 64-bit counts never get near that depth, and the limit keeps the recursive
//! tree walks (and the drop of the tree) within the call stack.  Repeated leaf
//! symbols are rejected too, since the codes would no longer map one-to-one.

use std::collections::HashSet;
use crate::tree::Node;
use crate::{Error,Symbol};

/// marks a branch, cannot be a leaf length
pub const BRANCH_TAG: u8 = 0x80;
/// longest raw symbol that fits in a leaf
pub const MAX_SYMBOL_LEN: usize = 127;
/// deepest branch nesting accepted when reading a header
pub const MAX_DEPTH: usize = 1024;

/// Write the tree shape and symbols into a byte header
pub fn serialize_header<S: Symbol>(tree: &Node<S>) -> Result<Vec<u8>,Error> {
    let mut ans = Vec::new();
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        match node {
            Node::Branch { left, right, .. } => {
                ans.push(BRANCH_TAG);
                stack.push(right);
                stack.push(left);
            },
            Node::Leaf { symbol, .. } => {
                let raw = symbol.to_raw();
                if raw.len() > MAX_SYMBOL_LEN {
                    log::error!("symbol {} needs {} bytes",symbol.label(),raw.len());
                    return Err(Error::AmbiguousTag(raw.len()));
                }
                ans.push(raw.len() as u8);
                ans.extend_from_slice(&raw);
            }
        }
    }
    log::debug!("header is {} bytes",ans.len());
    Ok(ans)
}

/// Read a tree from the start of `bytes`, anything after the tree is left alone.
/// Returns the tree and the number of bytes it took up.
pub fn read_header<S: Symbol>(bytes: &[u8]) -> Result<(Node<S>,usize),Error> {
    // each entry is a branch waiting for children, holding the left child once it is done
    let mut open: Vec<Option<Node<S>>> = Vec::new();
    let mut seen: HashSet<S> = HashSet::new();
    let mut ptr = 0;
    loop {
        let tag = match bytes.get(ptr) {
            Some(b) => *b,
            None => {
                log::error!("header ended at {} while expecting a tag",ptr);
                return Err(Error::MalformedHeader);
            }
        };
        ptr += 1;
        if tag == BRANCH_TAG {
            if open.len() >= MAX_DEPTH {
                log::error!("header nested deeper than {} at {}",MAX_DEPTH,ptr-1);
                return Err(Error::MalformedHeader);
            }
            open.push(None);
            continue;
        }
        let len = tag as usize;
        if len > MAX_SYMBOL_LEN {
            log::error!("bad leaf length {} at {}",len,ptr-1);
            return Err(Error::MalformedHeader);
        }
        let raw = match bytes.get(ptr..ptr+len) {
            Some(raw) => raw,
            None => {
                log::error!("leaf at {} claims {} bytes, only {} remain",ptr-1,len,bytes.len()-ptr);
                return Err(Error::MalformedHeader);
            }
        };
        ptr += len;
        let symbol = S::from_raw(raw)?;
        if !seen.insert(symbol.clone()) {
            log::error!("symbol {} repeated at {}",symbol.label(),ptr-len-1);
            return Err(Error::MalformedHeader);
        }
        let mut node = Node::leaf(symbol,1);
        // attach the finished node, closing every branch it completes
        loop {
            match open.pop() {
                None => return Ok((node,ptr)),
                Some(None) => {
                    open.push(Some(node));
                    break;
                },
                Some(Some(left)) => {
                    node = Node::branch(left,node);
                }
            }
        }
    }
}

/// Rebuild a tree from a header, the buffer must hold exactly one tree
pub fn deserialize_header<S: Symbol>(bytes: &[u8]) -> Result<Node<S>,Error> {
    let (tree,len) = read_header(bytes)?;
    if len != bytes.len() {
        log::error!("{} extra bytes after header",bytes.len()-len);
        return Err(Error::MalformedHeader);
    }
    Ok(tree)
}

#[cfg(test)]
use crate::tree::build_tree;

#[test]
fn header_bytes() {
    let tree = build_tree(&"aaabbc".chars().collect::<Vec<char>>()).expect("build failed");
    let header = serialize_header(&tree).expect("serialize failed");
    assert_eq!(header,hex::decode("80016180016301 62".replace(" ","")).unwrap());
    let leaf = serialize_header(&Node::leaf('é',9)).expect("serialize failed");
    assert_eq!(leaf,vec![2,0xC3,0xA9]);
}

#[test]
fn header_round_trip() {
    let texts = [
        "I am Sam. Sam I am. I do not like this Sam I am.\n",
        "a",
        "ab",
        "añ€𝄞 mixed widths ñ€"
    ];
    for text in texts {
        let tree = build_tree(&text.chars().collect::<Vec<char>>()).expect("build failed");
        let header = serialize_header(&tree).expect("serialize failed");
        let back: Node<char> = deserialize_header(&header).expect("deserialize failed");
        assert!(back.same_shape(&tree));
        assert_eq!(back.weight(),tree.leaf_count());
    }
    let bytes: Vec<u8> = (0..=255).chain(0..100).collect();
    let tree = build_tree(&bytes).expect("build failed");
    let header = serialize_header(&tree).expect("serialize failed");
    let back: Node<u8> = deserialize_header(&header).expect("deserialize failed");
    assert!(back.same_shape(&tree));
}

#[test]
fn truncated_header() {
    // leaf claims 3 bytes but only 1 follows
    assert_eq!(deserialize_header::<char>(&[0x80,0x01,0x61,0x03,0x62]),Err(Error::MalformedHeader));
    // branch with one child
    assert_eq!(deserialize_header::<char>(&[0x80,0x01,0x61]),Err(Error::MalformedHeader));
    assert_eq!(deserialize_header::<char>(&[]),Err(Error::MalformedHeader));
    assert_eq!(deserialize_header::<u8>(&vec![0x80;10000]),Err(Error::MalformedHeader));
}

#[test]
fn bad_length_and_trailing_bytes() {
    assert_eq!(deserialize_header::<u8>(&[0x81,0x00]),Err(Error::MalformedHeader));
    assert_eq!(deserialize_header::<u8>(&[0x01,0x41,0x00]),Err(Error::MalformedHeader));
    assert_eq!(read_header::<u8>(&[0x01,0x41,0x00]),Ok((Node::leaf(0x41,1),2)));
    // same symbol on both sides
    assert_eq!(deserialize_header::<char>(&[0x80,0x01,0x61,0x01,0x61]),Err(Error::MalformedHeader));
}

/// chain of `levels` branches, each with a leaf on the left, all leaves distinct
#[cfg(test)]
fn chain_header(levels: usize) -> Vec<u8> {
    let mut ans = Vec::new();
    for c in (0x100..).filter_map(char::from_u32).take(levels) {
        let raw = c.to_raw();
        ans.push(BRANCH_TAG);
        ans.push(raw.len() as u8);
        ans.extend_from_slice(&raw);
    }
    ans.extend_from_slice(&[1,b'z']);
    ans
}

#[test]
fn nesting_limit() {
    let ok: Node<char> = deserialize_header(&chain_header(300)).expect("deserialize failed");
    assert_eq!(ok.depth(),300);
    assert_eq!(ok.leaf_count(),301);
    let deepest: Node<char> = deserialize_header(&chain_header(MAX_DEPTH)).expect("deserialize failed");
    assert_eq!(deepest.depth(),MAX_DEPTH);
    assert_eq!(deserialize_header::<char>(&chain_header(MAX_DEPTH + 1)),Err(Error::MalformedHeader));
    assert_eq!(deserialize_header::<char>(&chain_header(200_000)),Err(Error::MalformedHeader));
}

#[cfg(test)]
#[derive(Clone,Debug,PartialEq,Eq,Hash)]
struct Wide(usize);

#[cfg(test)]
impl Symbol for Wide {
    fn to_raw(&self) -> Vec<u8> {
        vec![b'w';self.0]
    }
    fn from_raw(raw: &[u8]) -> Result<Self,Error> {
        Ok(Wide(raw.len()))
    }
    fn split(_buf: &[u8]) -> Result<Vec<Self>,Error> {
        Err(Error::InvalidInput)
    }
    fn join(_symbols: &[Self]) -> Vec<u8> {
        Vec::new()
    }
    fn label(&self) -> String {
        format!("w{}",self.0)
    }
}

#[test]
fn wide_symbols() {
    let ok = Node::branch(Node::leaf(Wide(127),1),Node::leaf(Wide(0),1));
    let header = serialize_header(&ok).expect("serialize failed");
    assert_eq!(header.len(),1 + 128 + 1);
    assert!(deserialize_header::<Wide>(&header).expect("deserialize failed").same_shape(&ok));
    let bad = Node::branch(Node::leaf(Wide(1),1),Node::leaf(Wide(200),1));
    assert_eq!(serialize_header(&bad),Err(Error::AmbiguousTag(200)));
}
