//! # Collective Wire Blobs
//!
//! ```text
//! word list: count:u32 { len:u32 bytes[len] } * count
//! positions: { position:u64 } *
//! ids:       { id:u32 } *
//! ```
//!
//! All integers are host-native, like the artifact files.

use crate::errors::{CompactError, Result};
use crate::io::binary_codec::{read_prefixed, read_u32, write_len, write_prefixed};
use crate::types::{Position, TokenId};

/// Serialize a list of words.
pub fn encode_word_list<W: AsRef<[u8]>>(words: &[W]) -> Result<Vec<u8>> {
    let mut blob = Vec::with_capacity(
        4 + words
            .iter()
            .map(|w| 4 + w.as_ref().len())
            .sum::<usize>(),
    );
    write_len(&mut blob, words.len())?;
    for word in words {
        write_prefixed(&mut blob, word.as_ref())?;
    }
    Ok(blob)
}

/// Deserialize a list of words.
///
/// # Errors
/// [`CompactError::Corrupt`] on truncation or trailing bytes.
pub fn decode_word_list(blob: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut reader = blob;
    let count = read_u32(&mut reader, "word list header")? as usize;

    let mut words = Vec::with_capacity(count.min(reader.len() / 4));
    for _ in 0..count {
        words.push(read_prefixed(&mut reader, "word list entry")?);
    }
    if !reader.is_empty() {
        return Err(CompactError::Corrupt(format!(
            "{} trailing bytes after word list",
            reader.len()
        )));
    }
    Ok(words)
}

/// Serialize positions as `u64`s.
pub fn encode_positions(positions: &[Position]) -> Vec<u8> {
    positions
        .iter()
        .flat_map(|&p| (p as u64).to_ne_bytes())
        .collect()
}

/// Deserialize positions.
pub fn decode_positions(blob: &[u8]) -> Result<Vec<Position>> {
    if blob.len() % 8 != 0 {
        return Err(CompactError::Corrupt(format!(
            "position blob of {} bytes",
            blob.len()
        )));
    }
    blob.chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            let value = u64::from_ne_bytes(buf);
            Position::try_from(value)
                .map_err(|_| CompactError::Corrupt(format!("position {value} overflows")))
        })
        .collect()
}

/// Serialize token ids.
pub fn encode_ids(ids: &[TokenId]) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_ne_bytes()).collect()
}

/// Deserialize token ids.
pub fn decode_ids(blob: &[u8]) -> Result<Vec<TokenId>> {
    if blob.len() % 4 != 0 {
        return Err(CompactError::Corrupt(format!(
            "id blob of {} bytes",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(chunk);
            TokenId::from_ne_bytes(buf)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_list() {
        let words = [&b"foo"[..], b"", "café".as_bytes()];
        let blob = encode_word_list(&words).unwrap();
        assert_eq!(&blob[..4], &3u32.to_ne_bytes());
        assert_eq!(blob.len(), 4 + 3 * 4 + 3 + 5);
        assert_eq!(decode_word_list(&blob).unwrap(), words.map(<[u8]>::to_vec));

        let empty: [&[u8]; 0] = [];
        assert_eq!(
            decode_word_list(&encode_word_list(&empty).unwrap()).unwrap(),
            Vec::<Vec<u8>>::new()
        );
    }

    #[test]
    fn test_malformed_word_list() {
        let mut blob = encode_word_list(&[b"abc"]).unwrap();
        blob.push(0);
        assert!(matches!(
            decode_word_list(&blob),
            Err(CompactError::Corrupt(_))
        ));

        blob.truncate(blob.len() - 3);
        assert!(matches!(
            decode_word_list(&blob),
            Err(CompactError::Corrupt(_))
        ));
    }

    #[test]
    fn test_positions_and_ids() {
        let positions = vec![0, 5, 10, 1 << 40];
        let blob = encode_positions(&positions);
        assert_eq!(blob.len(), 32);
        assert_eq!(decode_positions(&blob).unwrap(), positions);
        assert!(decode_positions(&blob[1..]).is_err());

        let ids = vec![1, 2, TokenId::MAX];
        let blob = encode_ids(&ids);
        assert_eq!(decode_ids(&blob).unwrap(), ids);
        assert!(decode_ids(&blob[..5]).is_err());
    }
}
