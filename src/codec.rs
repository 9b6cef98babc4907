//! Encoding and decoding of symbol sequences.
//!
//! The coded stream is a `String` of `0` and `1` digits.  Decoding can be done
//! by walking the tree (`decode`), or by accumulating digits until they match a
//! key in a decode table (`decode_with_table`).  The two give the same answer
//! because the codes are prefix free.
//!
//! A tree that is a bare leaf assigns the empty code to its only symbol, so the
//! coded stream is empty no matter how many symbols went in.  Such a stream can
//! only be decoded if the symbol count is known, use `decode_counted`.

use crate::code_table::{CodeTable,derive_code_table};
use crate::tree::{Node,build_tree};
use crate::{Error,Mode,Symbol};

/// Concatenate the codes of `symbols`, the table must be in encode mode
pub fn encode<S: Symbol>(symbols: &[S],table: &CodeTable<S>) -> Result<String,Error> {
    let map = match table {
        CodeTable::Encode(map) => map,
        CodeTable::Decode(_) => {
            log::error!("encoding requires an encode table");
            return Err(Error::InvalidInput);
        }
    };
    let mut ans = String::new();
    for symbol in symbols {
        match map.get(symbol) {
            Some(code) => ans.push_str(code),
            None => return Err(Error::UnknownSymbol(symbol.label()))
        }
    }
    log::debug!("encoded {} symbols in {} bits",symbols.len(),ans.len());
    Ok(ans)
}

/// Decode by walking the tree, starting over at the root after each leaf.
/// A tree that is a bare leaf cannot be decoded this way.
pub fn decode<S: Symbol>(bits: &str,tree: &Node<S>) -> Result<Vec<S>,Error> {
    if tree.is_leaf() {
        log::error!("tree has a single symbol, count is needed");
        return Err(Error::CountRequired);
    }
    let mut ans = Vec::new();
    let mut curs = tree;
    for digit in bits.chars() {
        let next = match (curs,digit) {
            (Node::Branch { left, .. },'0') => left,
            (Node::Branch { right, .. },'1') => right,
            (_,c) => return Err(Error::InvalidDigit(c))
        };
        curs = match next.as_ref() {
            Node::Leaf { symbol, .. } => {
                ans.push(symbol.clone());
                tree
            },
            branch => branch
        };
    }
    if !std::ptr::eq(curs,tree) {
        log::error!("bit stream ended inside a code");
        return Err(Error::TruncatedStream);
    }
    log::debug!("decoded {} bits into {} symbols",bits.len(),ans.len());
    Ok(ans)
}

/// Decode with a known symbol count.  This works for any tree, including a bare leaf,
/// and fails if the stream does not hold exactly `count` symbols.
pub fn decode_counted<S: Symbol>(bits: &str,tree: &Node<S>,count: usize) -> Result<Vec<S>,Error> {
    match tree {
        Node::Leaf { symbol, .. } => {
            if let Some(c) = bits.chars().next() {
                log::error!("single symbol tree has no codes, got {:?}",c);
                return Err(Error::TruncatedStream);
            }
            Ok(vec![symbol.clone();count])
        },
        Node::Branch { .. } => {
            // every symbol takes at least one digit
            if count > bits.len() {
                log::error!("{} symbols cannot fit in {} digits",count,bits.len());
                return Err(Error::TruncatedStream);
            }
            let ans = decode(bits,tree)?;
            if ans.len() != count {
                log::error!("expected {} symbols, found {}",count,ans.len());
                return Err(Error::TruncatedStream);
            }
            Ok(ans)
        }
    }
}

/// Decode by accumulating digits until they match a code.
/// The table must be in decode mode.  If the table is for a single symbol
/// the empty code would match forever, so that case needs `decode_counted`.
pub fn decode_with_table<S: Symbol>(bits: &str,table: &CodeTable<S>) -> Result<Vec<S>,Error> {
    let map = match table {
        CodeTable::Decode(map) => map,
        CodeTable::Encode(_) => {
            log::error!("decoding requires a decode table");
            return Err(Error::InvalidInput);
        }
    };
    if map.contains_key("") {
        return Err(Error::CountRequired);
    }
    let mut ans = Vec::new();
    let mut prefix = String::new();
    for digit in bits.chars() {
        if digit != '0' && digit != '1' {
            return Err(Error::InvalidDigit(digit));
        }
        prefix.push(digit);
        if let Some(symbol) = map.get(&prefix) {
            ans.push(symbol.clone());
            prefix.clear();
        }
    }
    if !prefix.is_empty() {
        log::error!("{} digits left over",prefix.len());
        return Err(Error::TruncatedStream);
    }
    Ok(ans)
}

/// Build a tree for `text` and encode it, the tree is needed to decode.
pub fn encode_text(text: &str) -> Result<(Node<char>,String),Error> {
    let symbols: Vec<char> = text.chars().collect();
    let tree = build_tree(&symbols)?;
    let bits = encode(&symbols,&derive_code_table(&tree,Mode::Encode))?;
    Ok((tree,bits))
}

/// Decode bits produced by `encode_text`
pub fn decode_text(bits: &str,tree: &Node<char>) -> Result<String,Error> {
    Ok(decode(bits,tree)?.into_iter().collect())
}

#[test]
fn encode_known_codes() {
    let syms: Vec<char> = "aaabbc".chars().collect();
    let tree = build_tree(&syms).expect("build failed");
    let table = derive_code_table(&tree,Mode::Encode);
    assert_eq!(encode(&syms,&table),Ok("000111110".to_string()));
    assert_eq!(decode("000111110",&tree),Ok(syms));
}

#[test]
fn invertibility() {
    let texts = [
        "I am Sam. Sam I am. I do not like this Sam I am.\n",
        "ab",
        "abracadabra",
        "añ€𝄞 mixed widths ñ€"
    ];
    for text in texts {
        let syms: Vec<char> = text.chars().collect();
        let tree = build_tree(&syms).expect("build failed");
        let bits = encode(&syms,&derive_code_table(&tree,Mode::Encode)).expect("encode failed");
        assert_eq!(decode(&bits,&tree).expect("decode failed"),syms);
        let dec = derive_code_table(&tree,Mode::Decode);
        assert_eq!(decode_with_table(&bits,&dec).expect("decode failed"),syms);
        assert_eq!(decode_counted(&bits,&tree,syms.len()).expect("decode failed"),syms);
    }
}

#[test]
fn text_helpers() {
    let text = "to be or not to be";
    let (tree,bits) = encode_text(text).expect("encode failed");
    assert!(bits.len() < 8*text.len());
    assert_eq!(decode_text(&bits,&tree),Ok(text.to_string()));
    assert_eq!(encode_text(""),Err(Error::InvalidInput));
}

#[test]
fn decode_through_header() {
    let text = "I am Sam. Sam I am. I do not like this Sam I am.\n";
    let (tree,bits) = encode_text(text).expect("encode failed");
    let header = crate::header::serialize_header(&tree).expect("serialize failed");
    let remote: Node<char> = crate::header::deserialize_header(&header).expect("deserialize failed");
    assert_eq!(decode_text(&bits,&remote),Ok(text.to_string()));
}

#[test]
fn unknown_symbol() {
    let tree = build_tree(&"abc".chars().collect::<Vec<char>>()).expect("build failed");
    let table = derive_code_table(&tree,Mode::Encode);
    assert_eq!(encode(&['a','z'],&table),Err(Error::UnknownSymbol("'z'".to_string())));
}

#[test]
fn wrong_table_direction() {
    let tree = build_tree(&"abc".chars().collect::<Vec<char>>()).expect("build failed");
    let enc = derive_code_table(&tree,Mode::Encode);
    let dec = derive_code_table(&tree,Mode::Decode);
    assert_eq!(encode(&['a'],&dec),Err(Error::InvalidInput));
    assert_eq!(decode_with_table("0",&enc),Err(Error::InvalidInput));
}

#[test]
fn truncated_and_bad_digits() {
    // a=0, c=10, b=11
    let tree = build_tree(&"aaabbc".chars().collect::<Vec<char>>()).expect("build failed");
    let dec = derive_code_table(&tree,Mode::Decode);
    assert_eq!(decode("0001",&tree),Err(Error::TruncatedStream));
    assert_eq!(decode_with_table("0001",&dec),Err(Error::TruncatedStream));
    assert_eq!(decode("00x",&tree),Err(Error::InvalidDigit('x')));
    assert_eq!(decode_with_table("00x",&dec),Err(Error::InvalidDigit('x')));
    assert_eq!(decode("",&tree),Ok(Vec::new()));
    assert_eq!(decode_counted("0010",&tree,4),Err(Error::TruncatedStream));
    assert_eq!(decode_counted("0010",&tree,5),Err(Error::TruncatedStream));
}

#[test]
fn single_symbol_needs_count() {
    let syms: Vec<char> = "aaaa".chars().collect();
    let tree = build_tree(&syms).expect("build failed");
    let bits = encode(&syms,&derive_code_table(&tree,Mode::Encode)).expect("encode failed");
    assert_eq!(bits,"");
    assert_eq!(decode(&bits,&tree),Err(Error::CountRequired));
    assert_eq!(decode_with_table(&bits,&derive_code_table(&tree,Mode::Decode)),Err(Error::CountRequired));
    assert_eq!(decode_counted(&bits,&tree,4),Ok(syms));
    assert_eq!(decode_counted("0",&tree,1),Err(Error::TruncatedStream));
}
