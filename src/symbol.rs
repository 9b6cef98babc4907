//! Symbols are the atomic units being coded.
//!
//! Anything that can be compared, hashed, and written as a short run of raw bytes
//! can be a symbol.  The raw bytes are what goes into the tree header, so they must
//! not exceed 127 bytes, see the `header` module.

use std::fmt::Debug;
use std::hash::Hash;
use crate::Error;

pub trait Symbol: Clone + Eq + Hash + Debug {
    /// raw representation stored in the tree header
    fn to_raw(&self) -> Vec<u8>;
    /// rebuild the symbol from its raw representation
    fn from_raw(raw: &[u8]) -> Result<Self,Error>;
    /// break an input buffer into symbols
    fn split(buf: &[u8]) -> Result<Vec<Self>,Error>;
    /// inverse of `split`
    fn join(symbols: &[Self]) -> Vec<u8>;
    /// printable form for listings
    fn label(&self) -> String;
}

impl Symbol for char {
    fn to_raw(&self) -> Vec<u8> {
        let mut buf = [0;4];
        self.encode_utf8(&mut buf).as_bytes().to_vec()
    }
    fn from_raw(raw: &[u8]) -> Result<Self,Error> {
        let s = std::str::from_utf8(raw).map_err(|_| Error::MalformedHeader)?;
        let mut chars = s.chars();
        match (chars.next(),chars.next()) {
            (Some(c),None) => Ok(c),
            _ => Err(Error::MalformedHeader)
        }
    }
    fn split(buf: &[u8]) -> Result<Vec<Self>,Error> {
        match std::str::from_utf8(buf) {
            Ok(s) => Ok(s.chars().collect()),
            Err(e) => {
                log::error!("input is not UTF-8: {}",e);
                Err(Error::InvalidInput)
            }
        }
    }
    fn join(symbols: &[Self]) -> Vec<u8> {
        symbols.iter().collect::<String>().into_bytes()
    }
    fn label(&self) -> String {
        format!("{:?}",self)
    }
}

impl Symbol for u8 {
    fn to_raw(&self) -> Vec<u8> {
        vec![*self]
    }
    fn from_raw(raw: &[u8]) -> Result<Self,Error> {
        match raw {
            [b] => Ok(*b),
            _ => Err(Error::MalformedHeader)
        }
    }
    fn split(buf: &[u8]) -> Result<Vec<Self>,Error> {
        Ok(buf.to_vec())
    }
    fn join(symbols: &[Self]) -> Vec<u8> {
        symbols.to_vec()
    }
    fn label(&self) -> String {
        format!("{:02X}",self)
    }
}

#[test]
fn char_raw_is_utf8() {
    assert_eq!('a'.to_raw(),vec![0x61]);
    assert_eq!('é'.to_raw(),vec![0xC3,0xA9]);
    assert_eq!(char::from_raw(&[0xE2,0x82,0xAC]),Ok('€'));
}

#[test]
fn bad_raw_symbols() {
    assert_eq!(char::from_raw(&[]),Err(Error::MalformedHeader));
    assert_eq!(char::from_raw(&[0xFF]),Err(Error::MalformedHeader));
    assert_eq!(char::from_raw("ab".as_bytes()),Err(Error::MalformedHeader));
    assert_eq!(u8::from_raw(&[1,2]),Err(Error::MalformedHeader));
}

#[test]
fn split_and_join() {
    let syms = char::split("añb".as_bytes()).expect("split failed");
    assert_eq!(syms,vec!['a','ñ','b']);
    assert_eq!(char::join(&syms),"añb".as_bytes().to_vec());
    assert_eq!(char::split(&[0x61,0xFF]),Err(Error::InvalidInput));
    assert_eq!(u8::split(&[0,255]),Ok(vec![0,255]));
}
