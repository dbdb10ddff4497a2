//! Bank packing: spread a list of sources over fixed size banks.
//!
//! Sources are added to the current bank one at a time and the bank is recompressed
//! each time, until it overflows and a new bank is started with the source that did not
//! fit. Searching for the split point would be faster, but compressing is deterministic
//! and the linear search is simple.

use log::{debug, info};

use crate::compression::compress::compress;
use crate::compression::header::pack_header;
use crate::error::{HuffmunchError, Result};
use crate::tools::options::CodecOpts;

/// A compressed bank holding entries first..end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    pub first: usize,
    pub end: usize,
    pub packed: Vec<u8>,
}

/// Compress entries first..=last of data together, each entry as its own split.
fn compress_range(
    data: &[u8],
    splits: &[usize],
    first: usize,
    last: usize,
    opts: &CodecOpts,
) -> Result<Vec<u8>> {
    let start = splits[first];
    let end = splits.get(last + 1).copied().unwrap_or(data.len());
    let local: Vec<usize> = splits[first..=last].iter().map(|&s| s - start).collect();
    compress(&data[start..end], Some(local.as_slice()), opts)
}

fn too_big(entry: usize, bank_size: usize) -> HuffmunchError {
    HuffmunchError::BankOverflow(format!(
        "entry {} does not fit in an empty bank of {} bytes",
        entry, bank_size
    ))
}

/// Pack the entries of data (starting at each of splits) into at most bank_max banks of
/// bank_size bytes.
pub fn pack_banks(
    data: &[u8],
    splits: &[usize],
    bank_max: usize,
    bank_size: usize,
    opts: &CodecOpts,
) -> Result<Vec<Bank>> {
    let n = splits.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    if bank_max == 1 {
        // everything has to fit one bank, no need to grow it
        let packed = compress_range(data, splits, 0, n - 1, opts)?;
        if packed.len() > bank_size {
            return Err(HuffmunchError::BankOverflow(format!(
                "{} bytes do not fit in a single bank of {} bytes",
                packed.len(),
                bank_size
            )));
        }
        return Ok(vec![Bank { first: 0, end: n, packed }]);
    }

    let mut banks = Vec::new();
    let mut first = 0;
    let mut current: Option<Vec<u8>> = None;
    for i in 0..n {
        let packed = compress_range(data, splits, first, i, opts)?;
        if packed.len() <= bank_size {
            current = Some(packed);
            continue;
        }

        // start a new bank if it doesn't fit
        let full = current.take().ok_or_else(|| too_big(i, bank_size))?;
        debug!("bank {}: entries {} - {} ({} bytes)", banks.len(), first, i - 1, full.len());
        banks.push(Bank { first, end: i, packed: full });
        if banks.len() >= bank_max {
            return Err(HuffmunchError::BankOverflow(format!(
                "out of available banks ({})",
                bank_max
            )));
        }
        first = i;
        let packed = compress_range(data, splits, i, i, opts)?;
        if packed.len() > bank_size {
            return Err(too_big(i, bank_size));
        }
        current = Some(packed);
    }
    if let Some(packed) = current {
        debug!("bank {}: entries {} - {} ({} bytes)", banks.len(), first, n - 1, packed.len());
        banks.push(Bank { first, end: n, packed });
    }

    let used: usize = banks.iter().map(|b| b.packed.len()).sum();
    info!(
        "{} banks, {} bytes used, {} bytes unused",
        banks.len(),
        used,
        banks.len() * bank_size - used
    );
    Ok(banks)
}

/// The bank end table: for every bank the index of the entry after its last one, as a
/// little endian integer of header_width bytes.
pub fn bank_table(banks: &[Bank], opts: &CodecOpts) -> Result<Vec<u8>> {
    let width = opts.header_width;
    let mut table = vec![0; banks.len() * width];
    for (i, bank) in banks.iter().enumerate() {
        pack_header(bank.end, i, &mut table, width)?;
    }
    Ok(table)
}

/// Name of bank index for the output file name: the index is put in front of the
/// extension, so out.hfm gives out0000.hfm, out0001.hfm...
pub fn bank_file_name(out_file: &str, index: usize) -> String {
    let name_start = out_file.rfind(|c: char| c == '/' || c == '\\').map_or(0, |p| p + 1);
    let ext = out_file[name_start..]
        .rfind('.')
        .map_or(out_file.len(), |p| name_start + p);
    format!("{}{:04}{}", &out_file[..ext], index, &out_file[ext..])
}
