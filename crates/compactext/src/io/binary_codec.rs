//! # Binary Vocabulary / Stream Codec
//!
//! Both artifacts are flat sequences of host-native `u32`s and raw bytes, with
//! no padding and no byte-order mark. Files written on a big-endian host do
//! not load on a little-endian one.
//!
//! ```text
//! vocabulary: vocab_size:u32 { id:u32 token_len:u32 token_bytes[token_len] } * vocab_size
//! stream:     count:u32      { id:u32 sep_len:u32   sep_bytes[sep_len]     } * count
//! ```

use crate::encoders::{EncodedStream, StreamRecord};
use crate::errors::{CompactError, Result};
use crate::types::TokenId;
use crate::vocab::{TokenTable, Vocabulary};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Write a host-native `u32`.
pub fn write_u32<W: Write>(
    writer: &mut W,
    value: u32,
) -> Result<()> {
    writer.write_all(&value.to_ne_bytes())?;
    Ok(())
}

/// Write a length, failing if it does not fit in a `u32`.
pub fn write_len<W: Write>(
    writer: &mut W,
    len: usize,
) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| CompactError::InvalidConfig(format!("length {len} exceeds u32")))?;
    write_u32(writer, len)
}

/// Write a `u32` length prefix followed by the bytes.
pub fn write_prefixed<W: Write>(
    writer: &mut W,
    bytes: &[u8],
) -> Result<()> {
    write_len(writer, bytes.len())?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Cap on records preallocated from an unverified header.
const PREALLOC_LIMIT: usize = 1 << 16;

fn truncated(what: &str) -> CompactError {
    CompactError::Corrupt(format!("truncated {what}"))
}

/// Read a host-native `u32`.
///
/// # Errors
/// [`CompactError::Corrupt`] on end of input.
pub fn read_u32<R: Read>(
    reader: &mut R,
    what: &str,
) -> Result<u32> {
    let mut buf = [0u8; 4];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(u32::from_ne_bytes(buf)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(truncated(what)),
        Err(e) => Err(e.into()),
    }
}

/// Read a `u32` length prefix followed by that many bytes.
pub fn read_prefixed<R: Read>(
    reader: &mut R,
    what: &str,
) -> Result<Vec<u8>> {
    let len = read_u32(reader, what)? as usize;
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(truncated(what));
    }
    Ok(bytes)
}

/// Write a vocabulary, records in ascending id order.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(vocab, writer)))]
pub fn write_vocabulary<W: Write>(
    vocab: &Vocabulary,
    writer: &mut W,
) -> Result<()> {
    write_len(writer, vocab.len())?;
    for (id, word) in vocab.iter() {
        write_u32(writer, id)?;
        write_prefixed(writer, word)?;
    }
    Ok(())
}

/// Serialize a vocabulary to bytes.
pub fn vocabulary_to_bytes(vocab: &Vocabulary) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_vocabulary(vocab, &mut buf)?;
    Ok(buf)
}

/// Read a vocabulary into a [`TokenTable`].
///
/// Records may appear in any order, but their ids must cover `1..=vocab_size`
/// exactly once.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(reader)))]
pub fn read_token_table<R: Read>(reader: &mut R) -> Result<TokenTable> {
    let vocab_size = read_u32(reader, "vocabulary header")? as usize;

    // The header is untrusted until every record has been read.
    let mut records = Vec::new();
    for _ in 0..vocab_size {
        let id = read_u32(reader, "vocabulary record")?;
        let word = read_prefixed(reader, "vocabulary token")?;
        records.push((id, word));
    }

    let mut table = TokenTable::with_size(vocab_size);
    for (id, word) in records {
        table.set(id, word)?;
    }
    Ok(table)
}

/// Read a vocabulary and rebuild the ``{ word <-> id }`` bijection.
pub fn read_vocabulary<R: Read>(reader: &mut R) -> Result<Vocabulary> {
    Vocabulary::try_from(read_token_table(reader)?)
}

/// Write an encoded stream.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(stream, writer)))]
pub fn write_stream<W: Write>(
    stream: &EncodedStream,
    writer: &mut W,
) -> Result<()> {
    write_len(writer, stream.len())?;
    for record in stream {
        write_u32(writer, record.id)?;
        write_prefixed(writer, &record.separator)?;
    }
    Ok(())
}

/// Record-at-a-time reader over an encoded stream.
pub struct StreamReader<R: Read> {
    reader: R,
    remaining: u32,
}

impl<R: Read> StreamReader<R> {
    /// Read the stream header.
    pub fn new(mut reader: R) -> Result<Self> {
        let remaining = read_u32(&mut reader, "stream header")?;
        Ok(Self { reader, remaining })
    }

    /// Records not yet read.
    pub fn remaining(&self) -> usize {
        self.remaining as usize
    }

    fn read_record(&mut self) -> Result<StreamRecord> {
        let id: TokenId = read_u32(&mut self.reader, "stream record")?;
        let separator = read_prefixed(&mut self.reader, "stream separator")?;
        Ok(StreamRecord { id, separator })
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<StreamRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let record = self.read_record();
        if record.is_err() {
            self.remaining = 0;
        }
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

/// Read a whole encoded stream.
pub fn read_stream<R: Read>(reader: &mut R) -> Result<EncodedStream> {
    let records = StreamReader::new(reader)?;
    let mut stream = EncodedStream::with_capacity(records.remaining().min(PREALLOC_LIMIT));
    for record in records {
        stream.records.push(record?);
    }
    Ok(stream)
}

/// Save a vocabulary file.
pub fn save_vocabulary_path<P: AsRef<Path>>(
    vocab: &Vocabulary,
    path: P,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_vocabulary(vocab, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Load a vocabulary file into a [`TokenTable`].
///
/// # Errors
/// [`CompactError::VocabularyMissing`] if the file does not exist.
pub fn load_token_table_path<P: AsRef<Path>>(path: P) -> Result<TokenTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CompactError::VocabularyMissing(path.to_path_buf()),
        _ => e.into(),
    })?;
    read_token_table(&mut BufReader::new(file))
}

/// Save an encoded stream file.
pub fn save_stream_path<P: AsRef<Path>>(
    stream: &EncodedStream,
    path: P,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_stream(stream, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Open an encoded stream file for record-at-a-time reading.
///
/// # Errors
/// [`CompactError::StreamMissing`] if the file does not exist.
pub fn open_stream_path<P: AsRef<Path>>(path: P) -> Result<StreamReader<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CompactError::StreamMissing(path.to_path_buf()),
        _ => e.into(),
    })?;
    StreamReader::new(BufReader::new(file))
}

/// Load a whole encoded stream file.
pub fn load_stream_path<P: AsRef<Path>>(path: P) -> Result<EncodedStream> {
    let records = open_stream_path(path)?;
    let mut stream = EncodedStream::with_capacity(records.remaining().min(PREALLOC_LIMIT));
    for record in records {
        stream.records.push(record?);
    }
    Ok(stream)
}
