use clap::{ArgGroup, Parser};
use log::LevelFilter;
use std::{fmt::Display, fmt::Formatter};

use crate::dictionary::TreeFormat;
use crate::tools::options::CodecOpts;

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Dictionary compression for small playback decoders",
    long_about = "Dictionary compression for small playback decoders.\n\n\
List files are a simple text format:\n\
  Line 1: (banks) (size)\n\
    banks - maximum number of banks to split output into, 0 for unlimited,\n\
            1 if multiple banks are not needed (faster)\n\
    size - how many bytes allowed in each bank\n\
  Lines 2+: (start) (end) (file)\n\
    start - first byte to read from file\n\
    end - last byte to read from file + 1, -1 to read the whole file\n\
    file - name of file, extends to end of line\n\
Integers can be decimal, hexadecimal (0x prefix), or octal (0 prefix).\n\
Output: out.hfm is a table of header width integers giving the end index of each\n\
bank, out0000.hfm is the first bank, out0001.hfm the second..."
)]
#[clap(group(ArgGroup::new("mode").required(true).args(&["binary", "list", "unpack"])))]
pub struct Args {
    /// Compress a single file
    #[clap(short = 'B', value_name = "IN")]
    pub binary: Option<String>,

    /// Compress a set of files together from a list file
    #[clap(short = 'L', value_name = "LIST")]
    pub list: Option<String>,

    /// Unpack a compressed file
    #[clap(short = 'U', value_name = "IN")]
    pub unpack: Option<String>,

    /// Output file
    pub output: String,

    /// Canonical tree format, slightly smaller, much slower to decompress
    #[clap(short = 'C')]
    pub canonical: bool,

    /// Wider search is slower, but marginally increases compression (2-16)
    #[clap(short = 'S', default_value_t = 3)]
    pub search_width: usize,

    /// Number of missed attempts before halting compression, 0 for unlimited
    #[clap(short = 'X', default_value_t = 100)]
    pub cutoff: usize,

    /// Bytes per integer entry in output header (1-4)
    #[clap(short = 'H', default_value_t = 2)]
    pub header_width: usize,

    /// Maximum allowed depth of canonical tree (1-32)
    #[clap(short = 'T', default_value_t = 24)]
    pub depth: usize,

    /// Skip decoding the result to check it
    #[clap(long = "no-verify")]
    pub no_verify: bool,

    /// Sets verbosity. 0 is silent, 5 traces every symbol. Release builds only log up to
    /// warnings (2), levels 3-5 need a debug build
    #[clap(short = 'v', default_value_t = 2)]
    pub verbose: u8,
}

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl From<u8> for Verbosity {
    fn from(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }

    /// True when this build was compiled without the log levels this verbosity asks for.
    pub fn is_capped(self) -> bool {
        self.level_filter() > log::STATIC_MAX_LEVEL
    }
}

/// What the command line asked for, with its input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Binary(String),
    List(String),
    Unpack(String),
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Binary(file) => write!(f, "compress {}", file),
            Mode::List(file) => write!(f, "compress list {}", file),
            Mode::Unpack(file) => write!(f, "unpack {}", file),
        }
    }
}

impl Args {
    pub fn mode(&self) -> Mode {
        // clap makes sure exactly one of these is given
        match (&self.binary, &self.list, &self.unpack) {
            (Some(file), _, _) => Mode::Binary(file.clone()),
            (_, Some(file), _) => Mode::List(file.clone()),
            (_, _, Some(file)) => Mode::Unpack(file.clone()),
            _ => Mode::Binary(String::new()),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from(self.verbose)
    }

    /// Codec options from the command line. Ranges are checked by `CodecOpts::validate`.
    pub fn codec_opts(&self) -> CodecOpts {
        CodecOpts {
            tree_format: if self.canonical {
                TreeFormat::Canonical
            } else {
                TreeFormat::Direct
            },
            header_width: self.header_width,
            search_width: self.search_width,
            cutoff: self.cutoff,
            canonical_depth: self.depth,
            verify: !self.no_verify,
            ..CodecOpts::default()
        }
    }
}
