//! Code tables derived from a Huffman tree.
//!
//! A code is the path from the root to a leaf, written as binary digits,
//! `0` for a left turn and `1` for a right turn.  The table can be keyed
//! either way, see `Mode`.

use std::collections::HashMap;
use crate::tree::Node;
use crate::{Mode,Symbol};

/// Bijective mapping between symbols and codes
#[derive(Clone,Debug,PartialEq)]
pub enum CodeTable<S: Symbol> {
    Encode(HashMap<S,String>),
    Decode(HashMap<String,S>)
}

impl <S: Symbol> CodeTable<S> {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Encode(_) => Mode::Encode,
            Self::Decode(_) => Mode::Decode
        }
    }
    pub fn len(&self) -> usize {
        match self {
            Self::Encode(map) => map.len(),
            Self::Decode(map) => map.len()
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// code for a symbol, either direction works
    pub fn code(&self,symbol: &S) -> Option<&str> {
        match self {
            Self::Encode(map) => map.get(symbol).map(|s| s.as_str()),
            Self::Decode(map) => map.iter().find(|(_,v)| *v == symbol).map(|(k,_)| k.as_str())
        }
    }
    /// symbol for a code, either direction works
    pub fn symbol(&self,code: &str) -> Option<&S> {
        match self {
            Self::Encode(map) => map.iter().find(|(_,v)| v.as_str() == code).map(|(k,_)| k),
            Self::Decode(map) => map.get(code)
        }
    }
    /// (symbol,code) pairs sorted by code length, then by code
    pub fn entries(&self) -> Vec<(S,String)> {
        let mut ans: Vec<(S,String)> = match self {
            Self::Encode(map) => map.iter().map(|(k,v)| (k.clone(),v.clone())).collect(),
            Self::Decode(map) => map.iter().map(|(k,v)| (v.clone(),k.clone())).collect()
        };
        ans.sort_by(|a,b| a.1.len().cmp(&b.1.len()).then_with(|| a.1.cmp(&b.1)));
        ans
    }
    /// true if no code is a prefix of another code
    pub fn is_prefix_free(&self) -> bool {
        let codes = self.entries();
        for (i,(_,a)) in codes.iter().enumerate() {
            for (_,b) in &codes[i+1..] {
                // sorted by length, so only `a` can be the prefix
                if b.starts_with(a.as_str()) {
                    return false;
                }
            }
        }
        true
    }
}

fn walk<S: Symbol>(node: &Node<S>,path: &mut String,table: &mut CodeTable<S>) {
    match node {
        Node::Leaf { symbol, .. } => {
            log::trace!("{} -> {}",symbol.label(),path);
            match table {
                CodeTable::Encode(map) => { map.insert(symbol.clone(),path.clone()); },
                CodeTable::Decode(map) => { map.insert(path.clone(),symbol.clone()); }
            }
        },
        Node::Branch { left, right, .. } => {
            path.push('0');
            walk(left,path,table);
            path.pop();
            path.push('1');
            walk(right,path,table);
            path.pop();
        }
    }
}

/// Walk the tree to get every leaf's code.
/// A tree that is a bare leaf gives the empty code.
pub fn derive_code_table<S: Symbol>(tree: &Node<S>,mode: Mode) -> CodeTable<S> {
    let mut table = match mode {
        Mode::Encode => CodeTable::Encode(HashMap::new()),
        Mode::Decode => CodeTable::Decode(HashMap::new())
    };
    let mut path = String::with_capacity(tree.depth());
    walk(tree,&mut path,&mut table);
    table
}

#[cfg(test)]
use crate::tree::build_tree;

#[test]
fn codes_follow_the_path() {
    let tree = build_tree(&"aaabbc".chars().collect::<Vec<char>>()).expect("build failed");
    let enc = derive_code_table(&tree,Mode::Encode);
    assert_eq!(enc.mode(),Mode::Encode);
    assert_eq!(enc.code(&'a'),Some("0"));
    assert_eq!(enc.code(&'c'),Some("10"));
    assert_eq!(enc.code(&'b'),Some("11"));
    let dec = derive_code_table(&tree,Mode::Decode);
    assert_eq!(dec.mode(),Mode::Decode);
    assert_eq!(dec.symbol("0"),Some(&'a'));
    assert_eq!(dec.symbol("10"),Some(&'c'));
    assert_eq!(dec.symbol("1"),None);
    assert_eq!(enc.entries(),dec.entries());
}

#[test]
fn lengths_follow_frequency() {
    let tree = build_tree(&"aaaabbbccd".chars().collect::<Vec<char>>()).expect("build failed");
    let enc = derive_code_table(&tree,Mode::Encode);
    let len = |c: char| enc.code(&c).map(|s| s.len()).unwrap_or(usize::MAX);
    assert!(len('a') <= len('b'));
    assert!(len('b') <= len('c'));
    assert!(len('c') <= len('d'));
}

#[test]
fn prefix_free() {
    let texts = [
        "I am Sam. Sam I am. I do not like this Sam I am.\n",
        "abracadabra",
        "ab",
        "the quick brown fox jumps over the lazy dog"
    ];
    for text in texts {
        let tree = build_tree(&text.chars().collect::<Vec<char>>()).expect("build failed");
        let dec = derive_code_table(&tree,Mode::Decode);
        assert!(dec.is_prefix_free());
        assert_eq!(dec.len(),tree.leaf_count());
    }
    let bad: CodeTable<char> = CodeTable::Encode(HashMap::from([('a',"0".to_string()),('b',"01".to_string())]));
    assert!(!bad.is_prefix_free());
}

#[test]
fn single_leaf_gives_empty_code() {
    let tree = Node::leaf('a',4);
    let enc = derive_code_table(&tree,Mode::Encode);
    assert_eq!(enc,CodeTable::Encode(HashMap::from([('a',String::new())])));
    let dec = derive_code_table(&tree,Mode::Decode);
    assert_eq!(dec,CodeTable::Decode(HashMap::from([(String::new(),'a')])));
}

#[test]
fn one_entry_per_leaf() {
    let tree = build_tree(&"abracadabra".chars().collect::<Vec<char>>()).expect("build failed");
    let enc = derive_code_table(&tree,Mode::Encode);
    let dec = derive_code_table(&tree,Mode::Decode);
    assert_eq!(enc.len(),tree.leaf_count());
    assert_eq!(dec.len(),tree.leaf_count());
    for (symbol,code) in enc.entries() {
        assert_eq!(dec.symbol(&code),Some(&symbol));
    }
}
