use log::debug;

use super::stream_decoder::StreamDecoder;
use crate::error::{HuffmunchError, Result};
use crate::tools::options::CodecOpts;

/// Decode every split of packed separately.
pub fn decompress_blocks(packed: &[u8], opts: &CodecOpts) -> Result<Vec<Vec<u8>>> {
    let mut decoder = StreamDecoder::new(packed, opts)?;
    let blocks = (0..decoder.block_count())
        .map(|i| decoder.read_block(i))
        .collect::<Result<Vec<_>>>()?;
    debug!("Decoded {} blocks from {} bytes", blocks.len(), packed.len());
    Ok(blocks)
}

/// Decode all splits of packed, one after another.
pub fn decompress(packed: &[u8], opts: &CodecOpts) -> Result<Vec<u8>> {
    Ok(decompress_blocks(packed, opts)?.concat())
}

/// Decode packed into output. With no output buffer only the unpacked size is computed,
/// which needs just the header. Returns the unpacked size.
pub fn decompress_into(packed: &[u8], output: Option<&mut [u8]>, opts: &CodecOpts) -> Result<usize> {
    let mut decoder = StreamDecoder::new(packed, opts)?;
    let required = decoder.header().total_length();
    let buf = match output {
        None => return Ok(required),
        Some(buf) if buf.len() < required => {
            return Err(HuffmunchError::OutputOverflow {
                required,
                provided: buf.len(),
            })
        }
        Some(buf) => buf,
    };
    let mut pos = 0;
    for i in 0..decoder.block_count() {
        let block = decoder.read_block(i)?;
        buf[pos..pos + block.len()].copy_from_slice(&block);
        pos += block.len();
    }
    Ok(pos)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress::compress;
    use crate::dictionary::TreeFormat;

    #[test]
    fn blocks_test() {
        for format in [TreeFormat::Direct, TreeFormat::Canonical] {
            let opts = CodecOpts { tree_format: format, ..CodecOpts::default() };
            let packed = compress(b"AAAABBBB", Some(&[0, 4][..]), &opts).unwrap();
            let blocks = decompress_blocks(&packed, &opts).unwrap();
            assert_eq!(blocks, vec![b"AAAA".to_vec(), b"BBBB".to_vec()]);
            assert_eq!(decompress(&packed, &opts).unwrap(), b"AAAABBBB");
        }
    }

    #[test]
    fn empty_blocks_test() {
        let opts = CodecOpts::default();
        let packed = compress(b"xyz", Some(&[0, 0, 2, 3][..]), &opts).unwrap();
        let blocks = decompress_blocks(&packed, &opts).unwrap();
        assert_eq!(blocks, vec![vec![], b"xy".to_vec(), b"z".to_vec(), vec![]]);
    }

    #[test]
    fn into_buffer_test() {
        let opts = CodecOpts::default();
        let packed = compress(b"hello hello hello", None, &opts).unwrap();
        assert_eq!(decompress_into(&packed, None, &opts).unwrap(), 17);
        let mut small = [0_u8; 4];
        assert!(matches!(
            decompress_into(&packed, Some(&mut small), &opts),
            Err(HuffmunchError::OutputOverflow { required: 17, provided: 4 })
        ));
        let mut buf = [0_u8; 20];
        assert_eq!(decompress_into(&packed, Some(&mut buf), &opts).unwrap(), 17);
        assert_eq!(&buf[..17], b"hello hello hello");
    }

    #[test]
    fn size_from_header_test() {
        let opts = CodecOpts::default();
        let packed = compress(b"abcabcabc", Some(&[0, 3, 9][..]), &opts).unwrap();
        // the size query only reads the header, so a damaged stream still reports it
        let mut damaged = packed.clone();
        damaged.truncate(opts.header_bytes(3));
        assert_eq!(decompress_into(&damaged, None, &opts).unwrap(), 9);
        assert!(decompress_into(&damaged, Some(&mut [0_u8; 9][..]), &opts).is_err());
        let mut buf = [0_u8; 9];
        assert_eq!(decompress_into(&packed, Some(&mut buf), &opts).unwrap(), 9);
        assert_eq!(&buf, b"abcabcabc");
    }

    #[test]
    fn truncated_input_test() {
        let opts = CodecOpts::default();
        let packed = compress(b"truncate me, truncate me", None, &opts).unwrap();
        assert!(decompress(&packed[..8], &opts).is_err());
    }
}
