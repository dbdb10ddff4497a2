use log::{debug, info};

use super::decompress::decompress_blocks;
use super::header::pack_header;
use crate::error::{HuffmunchError, Result};
use crate::huffman_coding::huffman::{huffman_encode, SymbolId, SPLIT};
use crate::muncher::munch::{munch, state_tree};
use crate::tools::options::CodecOpts;

/// Filler for the header until its values are known.
const HEADER_MARK: u8 = 44;

/// The whole input as a single split.
const SPLITS_DEFAULT: [usize; 1] = [0];

/// Splits must start at 0, never decrease, and stay within the data. Repeated values
/// give empty splits.
pub fn validate_splits(splits: &[usize], data_len: usize) -> Result<()> {
    match splits.first() {
        None => return Err(HuffmunchError::InvalidSplits("no splits given".to_string())),
        Some(&first) if first != 0 => {
            return Err(HuffmunchError::InvalidSplits(format!(
                "splits must begin with 0, not {}",
                first
            )))
        }
        _ => {}
    }
    if let Some(w) = splits.windows(2).find(|w| w[1] < w[0]) {
        return Err(HuffmunchError::InvalidSplits(format!(
            "splits must only increase, {} follows {}",
            w[1], w[0]
        )));
    }
    if let Some(&last) = splits.last().filter(|&&last| last > data_len) {
        return Err(HuffmunchError::InvalidSplits(format!(
            "split at {} is past the end of {} bytes",
            last, data_len
        )));
    }
    Ok(())
}

/// The input as a symbol stream, with a split marker in front of every split.
fn insert_splits(data: &[u8], splits: &[usize]) -> Vec<SymbolId> {
    let mut stream = Vec::with_capacity(data.len() + splits.len());
    let mut s = 0;
    for (i, &b) in data.iter().enumerate() {
        while s < splits.len() && splits[s] == i {
            stream.push(SPLIT);
            s += 1;
        }
        stream.push(b as SymbolId);
    }
    // splits at the very end are empty
    stream.extend(std::iter::repeat(SPLIT).take(splits.len() - s));
    stream
}

/// End of split i in the unpacked data.
fn split_end(splits: &[usize], i: usize, data_len: usize) -> usize {
    splits.get(i + 1).copied().unwrap_or(data_len)
}

/// Compress data. With no splits given the whole input is one split.
pub fn compress(data: &[u8], splits: Option<&[usize]>, opts: &CodecOpts) -> Result<Vec<u8>> {
    opts.validate()?;
    let splits = splits.unwrap_or(&SPLITS_DEFAULT);
    validate_splits(splits, data.len())?;

    let best = munch(insert_splits(data, splits), opts)?;
    let tree = state_tree(&best, opts)?;

    // header containing:
    // 1 x split count
    // split_count x split data offset
    // split_count x split data size
    let width = opts.header_width;
    let mut packed = vec![HEADER_MARK; opts.header_bytes(splits.len())];

    let codes = opts
        .tree_format
        .codec()
        .build(&tree, &best.symbols, &mut packed)?;
    let table_end = packed.len();
    let starts = huffman_encode(&codes, &best.data, &mut packed)?;
    if starts.len() != splits.len() {
        return Err(HuffmunchError::Internal(format!(
            "{} splits encoded, {} expected",
            starts.len(),
            splits.len()
        )));
    }

    let count = splits.len();
    pack_header(count, 0, &mut packed, width)?;
    for (i, &start) in starts.iter().enumerate() {
        let size = split_end(splits, i, data.len()) - splits[i];
        debug!("split {}: packed at {:#X}, {} bytes", i, start, size);
        pack_header(start, 1 + i, &mut packed, width)?;
        pack_header(size, 1 + count + i, &mut packed, width)?;
    }

    if opts.verify {
        verify(&packed, data, splits, opts)?;
    }

    info!(
        "{} bytes packed to {} ({} table bytes, {} symbols, {:.2}%)",
        data.len(),
        packed.len(),
        table_end - opts.header_bytes(count),
        tree.visit_count(),
        100.0 * packed.len() as f64 / data.len().max(1) as f64
    );
    Ok(packed)
}

/// Compress into output. With no output buffer only the packed size is computed.
/// Returns the packed size.
pub fn compress_into(
    data: &[u8],
    splits: Option<&[usize]>,
    output: Option<&mut [u8]>,
    opts: &CodecOpts,
) -> Result<usize> {
    let packed = compress(data, splits, opts)?;
    match output {
        None => Ok(packed.len()),
        Some(buf) if buf.len() < packed.len() => Err(HuffmunchError::OutputOverflow {
            required: packed.len(),
            provided: buf.len(),
        }),
        Some(buf) => {
            buf[..packed.len()].copy_from_slice(&packed);
            Ok(packed.len())
        }
    }
}

/// Decode packed again and compare every split to the input.
fn verify(packed: &[u8], data: &[u8], splits: &[usize], opts: &CodecOpts) -> Result<()> {
    let blocks = decompress_blocks(packed, opts)
        .map_err(|e| HuffmunchError::VerifyFailed(format!("unable to decode: {}", e)))?;
    if blocks.len() != splits.len() {
        return Err(HuffmunchError::VerifyFailed(format!(
            "{} splits decoded, {} expected",
            blocks.len(),
            splits.len()
        )));
    }
    for (i, block) in blocks.iter().enumerate() {
        let expected = &data[splits[i]..split_end(splits, i, data.len())];
        if block.as_slice() != expected {
            return Err(HuffmunchError::VerifyFailed(format!(
                "split {} decoded to {} bytes that do not match the input",
                i,
                block.len()
            )));
        }
    }
    debug!("Verified {} splits", blocks.len());
    Ok(())
}
