//! # treehuff
//!
//! Static Huffman coding of character or byte streams.
//!
//! * `tree` counts symbols and builds the code tree
//! * `code_table` walks the tree to get the symbol/code mapping
//! * `codec` turns symbols into binary digits and back
//! * `header` writes the tree shape into a compact byte header
//! * `container` ties these together for whole files
//!
//! The coded stream is a string of ASCII `0` and `1` digits, one per bit.
//! No attempt is made to pack the digits into bytes.

pub mod symbol;
pub mod tree;
pub mod code_table;
pub mod codec;
pub mod header;
pub mod container;

pub use symbol::Symbol;
pub use tree::{Node,build_tree,build_tree_from_nodes,count_frequencies};
pub use code_table::{CodeTable,derive_code_table};
pub use codec::{encode,decode,decode_counted,decode_with_table,encode_text,decode_text};
pub use header::{serialize_header,deserialize_header,read_header};

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Coding Errors
#[derive(thiserror::Error,Debug,PartialEq)]
pub enum Error {
    #[error("no symbols to encode")]
    InvalidInput,
    #[error("symbol {0} is not in the code table")]
    UnknownSymbol(String),
    #[error("tree header is malformed")]
    MalformedHeader,
    #[error("symbol length {0} collides with the branch tag")]
    AmbiguousTag(usize),
    #[error("bit stream ended inside a code")]
    TruncatedStream,
    #[error("bit stream contains {0:?}, expected binary digit")]
    InvalidDigit(char),
    #[error("single symbol tree cannot be decoded without a symbol count")]
    CountRequired,
    #[error("file too large")]
    FileTooLarge
}

/// Direction of a code table.
/// `Encode` maps symbols to codes, `Decode` maps codes to symbols.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Mode {
    Encode,
    Decode
}

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    in_offset: 0,
    out_offset: 0,
    max_file_size: u32::MAX as u64
};
