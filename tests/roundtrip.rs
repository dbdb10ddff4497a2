//! Round trip tests for huffmunch compression, in both table formats.
//!
//! Run with: cargo test --test roundtrip

use proptest::prelude::*;

use huffmunch::{
    compress, compress_into, decompress, decompress_blocks, CodecOpts, HuffmunchError,
    StreamDecoder, TreeFormat,
};

fn opts(format: TreeFormat) -> CodecOpts {
    CodecOpts {
        tree_format: format,
        ..CodecOpts::default()
    }
}

const FORMATS: [TreeFormat; 2] = [TreeFormat::Direct, TreeFormat::Canonical];

/// Strategy for data with plenty of repeats: a small alphabet.
fn repetitive_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), Just(b' ')], 0..160)
}

/// Strategy for data plus valid splits of it.
fn split_data_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<usize>)> {
    prop::collection::vec(0u8..8, 0..120).prop_flat_map(|data| {
        let len = data.len();
        (
            Just(data),
            prop::collection::vec(0..=len, 0..5).prop_map(|mut cuts| {
                cuts.push(0);
                cuts.sort_unstable();
                cuts
            }),
        )
    })
}

/// Deterministic pseudo-random bytes.
fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (x >> 16) as u8
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        max_shrink_iters: 50,
        ..ProptestConfig::default()
    })]

    /// Property: decompress(compress(x)) == x for repetitive data.
    #[test]
    fn prop_roundtrip(data in repetitive_strategy()) {
        for format in FORMATS {
            let opts = opts(format);
            let packed = compress(&data, None, &opts).unwrap();
            prop_assert_eq!(decompress(&packed, &opts).unwrap(), data.clone());
        }
    }

    /// Property: every block decodes to its own slice of the input.
    #[test]
    fn prop_split_roundtrip((data, splits) in split_data_strategy()) {
        for format in FORMATS {
            let opts = opts(format);
            let packed = compress(&data, Some(splits.as_slice()), &opts).unwrap();
            let blocks = decompress_blocks(&packed, &opts).unwrap();
            prop_assert_eq!(blocks.len(), splits.len());
            for (i, block) in blocks.iter().enumerate() {
                let end = splits.get(i + 1).copied().unwrap_or(data.len());
                prop_assert_eq!(block.as_slice(), &data[splits[i]..end]);
            }
        }
    }

    /// Property: the size query agrees with the real compression.
    #[test]
    fn prop_size_query(data in repetitive_strategy()) {
        let opts = CodecOpts::default();
        let size = compress_into(&data, None, None, &opts).unwrap();
        prop_assert_eq!(size, compress(&data, None, &opts).unwrap().len());
    }
}

#[test]
fn small_inputs_test() {
    for format in FORMATS {
        let opts = opts(format);
        for data in [&b""[..], b"x", b"xx", b"\0", b"\xFF\x00\xFF"] {
            let packed = compress(data, None, &opts).unwrap();
            assert_eq!(decompress(&packed, &opts).unwrap(), data, "{:?}", data);
        }
    }
}

#[test]
fn per_block_test() {
    for format in FORMATS {
        let opts = opts(format);
        let packed = compress(b"AAAABBBB", Some(&[0, 4][..]), &opts).unwrap();
        let mut decoder = StreamDecoder::new(&packed, &opts).unwrap();
        assert_eq!(decoder.read_block(0).unwrap(), b"AAAA");
        assert_eq!(decoder.read_block(1).unwrap(), b"BBBB");
    }
}

#[test]
fn repeated_pair_test() {
    for format in FORMATS {
        let opts = opts(format);
        let packed = compress(b"ababababab", None, &opts).unwrap();
        assert_eq!(decompress(&packed, &opts).unwrap(), b"ababababab");
        // a dictionary string of several bytes beats ten single byte codes
        assert!(packed.len() < 6 + 10);
    }
}

#[test]
fn noise_test() {
    let data = noise(1000, 7);
    for format in FORMATS {
        let opts = opts(format);
        let packed = compress(&data, None, &opts).unwrap();
        assert_eq!(decompress(&packed, &opts).unwrap(), data);
    }
}

#[test]
fn text_compresses_test() {
    let text = "It was the best of times, it was the worst of times, it was the age of \
        wisdom, it was the age of foolishness, it was the epoch of belief, it was the \
        epoch of incredulity, it was the season of Light, it was the season of Darkness.";
    for format in FORMATS {
        let opts = opts(format);
        let packed = compress(text.as_bytes(), None, &opts).unwrap();
        assert!(packed.len() < text.len());
        assert_eq!(decompress(&packed, &opts).unwrap(), text.as_bytes());
    }
}

#[test]
fn invalid_splits_test() {
    let opts = CodecOpts::default();
    let bad: [&[usize]; 3] = [&[], &[5, 0], &[0, 3, 2]];
    for splits in bad {
        let result = compress(b"abcdefgh", Some(splits), &opts);
        assert!(matches!(result, Err(HuffmunchError::InvalidSplits(_))));
        assert_eq!(result.unwrap_err().status().code(), 4);
    }
}

#[test]
fn wider_search_test() {
    let data = b"abcdefabcdefabcdefabcdef-abcdef".repeat(3);
    let opts = CodecOpts {
        search_width: 6,
        cutoff: 0,
        ..CodecOpts::default()
    };
    let packed = compress(&data, None, &opts).unwrap();
    assert_eq!(decompress(&packed, &opts).unwrap(), data);
}
