//! File container
//!
//! Puts everything needed to expand a file into one stream:
//!
//! * symbol count, 4 bytes, always little endian
//! * tree header, see the `header` module
//! * coded digits, one ASCII `0` or `1` per bit, to end of stream
//!
//! The count is what allows a single-symbol file to be expanded, since in that
//! case there are no coded digits at all.  An empty file compresses to an empty file.

use std::fmt;
use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufWriter};
use crate::code_table::derive_code_table;
use crate::codec::{encode,decode_counted};
use crate::header::{serialize_header,read_header};
use crate::tree::{build_tree,count_frequencies};
use crate::{DYNERR,Error,Mode,Options,Symbol};

/// Size of the symbol count field
const COUNT_BYTES: usize = 4;

/// Read the input starting at the offset, checking the size limit
fn read_input<R: Read + Seek>(input: &mut R,opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let size = input.seek(SeekFrom::End(0))?.saturating_sub(opt.in_offset);
    if size > opt.max_file_size {
        log::error!("input is {} bytes, limit is {}",size,opt.max_file_size);
        return Err(Box::new(Error::FileTooLarge));
    }
    input.seek(SeekFrom::Start(opt.in_offset))?;
    let mut buf = Vec::with_capacity(size as usize);
    input.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Compress `expanded_in` into `compressed_out`, returns (input size, output size)
pub fn compress<S,R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where S: Symbol, R: Read + Seek, W: Write + Seek {
    let buf = read_input(expanded_in,opt)?;
    compressed_out.seek(SeekFrom::Start(opt.out_offset))?;
    if buf.is_empty() {
        log::warn!("empty input, nothing to write");
        return Ok((0,0));
    }
    let symbols = S::split(&buf)?;
    if symbols.len() > u32::MAX as usize {
        return Err(Box::new(Error::FileTooLarge));
    }
    log::debug!("build tree");
    let tree = build_tree(&symbols)?;
    let header = serialize_header(&tree)?;
    log::debug!("encode {} symbols",symbols.len());
    let bits = encode(&symbols,&derive_code_table(&tree,Mode::Encode))?;
    let mut writer = BufWriter::new(compressed_out);
    writer.write_all(&u32::to_le_bytes(symbols.len() as u32))?;
    writer.write_all(&header)?;
    writer.write_all(bits.as_bytes())?;
    writer.flush()?;
    Ok((buf.len() as u64,writer.stream_position()? - opt.out_offset))
}

/// Expand `compressed_in` into `expanded_out`, returns (input size, output size)
pub fn expand<S,R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where S: Symbol, R: Read + Seek, W: Write + Seek {
    let buf = read_input(compressed_in,opt)?;
    expanded_out.seek(SeekFrom::Start(opt.out_offset))?;
    if buf.is_empty() {
        log::warn!("empty input, nothing to write");
        return Ok((0,0));
    }
    if buf.len() < COUNT_BYTES {
        log::error!("stream too short for symbol count");
        return Err(Box::new(Error::MalformedHeader));
    }
    let count = u32::from_le_bytes([buf[0],buf[1],buf[2],buf[3]]) as usize;
    if count as u64 > opt.max_file_size {
        log::error!("stream claims {} symbols, limit is {}",count,opt.max_file_size);
        return Err(Box::new(Error::FileTooLarge));
    }
    log::debug!("read tree header");
    let (tree,header_len) = read_header::<S>(&buf[COUNT_BYTES..])?;
    let digits = &buf[COUNT_BYTES+header_len..];
    if let Some(b) = digits.iter().find(|b| **b != b'0' && **b != b'1') {
        return Err(Box::new(Error::InvalidDigit(*b as char)));
    }
    let bits = std::str::from_utf8(digits)?;
    log::debug!("decode {} bits into {} symbols",bits.len(),count);
    let symbols = decode_counted(bits,&tree,count)?;
    let mut writer = BufWriter::new(expanded_out);
    writer.write_all(&S::join(&symbols))?;
    writer.flush()?;
    Ok((buf.len() as u64,writer.stream_position()? - opt.out_offset))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice<S: Symbol>(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress::<S,_,_>(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice<S: Symbol>(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand::<S,_,_>(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Compression statistics for a buffer
#[derive(Clone,Debug,PartialEq)]
pub struct Stats {
    /// number of symbols in the input
    pub symbols: usize,
    /// number of distinct symbols
    pub distinct: usize,
    /// size of the input in bits
    pub raw_bits: u64,
    /// number of coded digits
    pub coded_bits: u64,
    pub header_bytes: usize
}

impl Stats {
    pub fn measure<S: Symbol>(buf: &[u8]) -> Result<Self,Error> {
        let symbols = S::split(buf)?;
        if symbols.is_empty() {
            return Ok(Self { symbols: 0, distinct: 0, raw_bits: 0, coded_bits: 0, header_bytes: 0 });
        }
        let tree = build_tree(&symbols)?;
        let bits = encode(&symbols,&derive_code_table(&tree,Mode::Encode))?;
        Ok(Self {
            symbols: symbols.len(),
            distinct: count_frequencies(&symbols).len(),
            raw_bits: buf.len() as u64 * 8,
            coded_bits: bits.len() as u64,
            header_bytes: serialize_header(&tree)?.len()
        })
    }
    /// percentage of bits saved by the coding, header not included
    pub fn savings(&self) -> f64 {
        if self.raw_bits == 0 {
            return 0.0;
        }
        100.0 - 100.0 * self.coded_bits as f64 / self.raw_bits as f64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"{} bits to {} bits ({:.2}%), {} symbols, {} distinct, header {} bytes",
            self.raw_bits,self.coded_bits,self.savings(),self.symbols,self.distinct,self.header_bytes)
    }
}

#[cfg(test)]
use crate::{STDRESULT,STD_OPTIONS};

#[test]
fn container_layout() -> STDRESULT {
    let compressed = compress_slice::<char>("aaabbc".as_bytes(),&STD_OPTIONS)?;
    let expected = [
        vec![6,0,0,0],
        hex::decode("8001618001630162")?,
        "000111110".as_bytes().to_vec()
    ].concat();
    assert_eq!(compressed,expected);
    Ok(())
}

#[test]
fn invertibility() -> STDRESULT {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice::<char>(test_data,&STD_OPTIONS)?;
    assert_eq!(expand_slice::<char>(&compressed,&STD_OPTIONS)?,test_data.to_vec());
    let binary: Vec<u8> = (0..=255).chain(0..64).chain([0xFF;32]).collect();
    let compressed = compress_slice::<u8>(&binary,&STD_OPTIONS)?;
    assert_eq!(expand_slice::<u8>(&compressed,&STD_OPTIONS)?,binary);
    Ok(())
}

#[test]
fn single_symbol_file() -> STDRESULT {
    let compressed = compress_slice::<char>("aaaa".as_bytes(),&STD_OPTIONS)?;
    assert_eq!(compressed,vec![4,0,0,0,1,0x61]);
    assert_eq!(expand_slice::<char>(&compressed,&STD_OPTIONS)?,"aaaa".as_bytes().to_vec());
    Ok(())
}

#[test]
fn empty_file() -> STDRESULT {
    assert!(compress_slice::<u8>(&[],&STD_OPTIONS)?.is_empty());
    assert!(expand_slice::<u8>(&[],&STD_OPTIONS)?.is_empty());
    Ok(())
}

#[test]
fn offsets() -> STDRESULT {
    let mut opt = STD_OPTIONS;
    opt.in_offset = 3;
    let compressed = compress_slice::<char>("XYZhello".as_bytes(),&opt)?;
    assert_eq!(expand_slice::<char>(&compressed,&STD_OPTIONS)?,"hello".as_bytes().to_vec());
    Ok(())
}

#[test]
fn corrupt_streams() -> STDRESULT {
    let compressed = compress_slice::<char>("aaabbc".as_bytes(),&STD_OPTIONS)?;
    // chop the last digit
    let err = expand_slice::<char>(&compressed[..compressed.len()-1],&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::TruncatedStream));
    // chop inside the header
    let err = expand_slice::<char>(&compressed[..7],&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::MalformedHeader));
    let err = expand_slice::<char>(&compressed[..2],&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::MalformedHeader));
    let mut bad = compressed.clone();
    bad.push(b'2');
    let err = expand_slice::<char>(&bad,&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::InvalidDigit('2')));
    Ok(())
}

#[test]
fn stored_count_is_checked() {
    // single symbol tree asking for 100 million copies
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 1000;
    let err = expand_slice::<char>(&[0x00,0xE1,0xF5,0x05,0x01,0x61],&opt).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::FileTooLarge));
    // more symbols than digits
    let mut bad = vec![100,0,0,0];
    bad.extend_from_slice(&[0x80,0x01,0x61,0x01,0x62]);
    bad.extend_from_slice("0101".as_bytes());
    let err = expand_slice::<char>(&bad,&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::TruncatedStream));
}

#[test]
fn deep_header_is_an_error() {
    let mut bad = vec![1,0,0,0];
    for _i in 0..200_000 {
        bad.extend_from_slice(&[0x80,0x01,0x41]);
    }
    bad.extend_from_slice(&[0x01,0x42]);
    let err = expand_slice::<u8>(&bad,&STD_OPTIONS).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::MalformedHeader));
}

#[test]
fn size_limit() {
    let mut opt = STD_OPTIONS;
    opt.max_file_size = 4;
    let err = compress_slice::<u8>(&[1,2,3,4,5],&opt).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(),Some(&Error::FileTooLarge));
}

#[test]
fn stats() -> STDRESULT {
    let stats = Stats::measure::<char>("aaabbc".as_bytes())?;
    assert_eq!(stats,Stats { symbols: 6, distinct: 3, raw_bits: 48, coded_bits: 9, header_bytes: 8 });
    assert_eq!(stats.to_string(),"48 bits to 9 bits (81.25%), 6 symbols, 3 distinct, header 8 bytes");
    assert_eq!(Stats::measure::<u8>(&[])?.savings(),0.0);
    Ok(())
}
