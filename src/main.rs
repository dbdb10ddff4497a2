//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use huffmunch::tools::bank::{bank_file_name, bank_table, pack_banks};
use huffmunch::tools::cli::{Args, Mode};
use huffmunch::tools::list_file::ListFile;
use huffmunch::{compress, decompress, CodecOpts, Result};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let args = Args::parse();

    // Available log levels are Error, Warn, Info, Debug, Trace
    if TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stdout,
        ColorChoice::Auto,
    )
    .is_err()
    {
        eprintln!("Unable to start the logger");
    }
    let verbosity = args.verbosity();
    log::set_max_level(verbosity.level_filter());
    if verbosity.is_capped() {
        warn!(
            "Verbosity {} needs a debug build, this build logs up to {}",
            args.verbose,
            log::STATIC_MAX_LEVEL
        );
    }

    let opts = args.codec_opts();
    let mode = args.mode();
    info!(
        "huffmunch {}: {}, {} tree",
        env!("CARGO_PKG_VERSION"),
        mode,
        opts.tree_format
    );

    //----- Figure how what we need to do and go do it
    let result = match &mode {
        Mode::Binary(input) => compress_file(input, &args.output, &opts),
        Mode::List(list) => compress_list(list, &args.output, &opts),
        Mode::Unpack(input) => unpack_file(input, &args.output, &opts),
    };

    if let Err(e) = result {
        error!("{}", e);
        let status = e.status();
        eprintln!("error {}: {}", status.code(), status.description());
        exit(status.code());
    }
    info!("Done.");
}

/// Compress a single file.
fn compress_file(input: &str, output: &str, opts: &CodecOpts) -> Result<()> {
    let data = fs::read(input)?;
    println!("{:6} bytes read from {}", data.len(), input);

    let packed = compress(&data, None, opts)?;
    println!(
        "{:6} bytes compressed: {:6.2}%",
        packed.len(),
        100.0 * packed.len() as f64 / data.len().max(1) as f64
    );

    fs::write(output, &packed)?;
    println!("{:6} bytes written to {}", packed.len(), output);
    Ok(())
}

/// Unpack a file made with the same options.
fn unpack_file(input: &str, output: &str, opts: &CodecOpts) -> Result<()> {
    let packed = fs::read(input)?;
    let data = decompress(&packed, opts)?;
    fs::write(output, &data)?;
    println!("{:6} bytes unpacked from {} to {}", data.len(), input, output);
    Ok(())
}

/// Compress the sources of a list file together into banks, plus the bank end table.
fn compress_list(list_file: &str, output: &str, opts: &CodecOpts) -> Result<()> {
    let list = ListFile::read(Path::new(list_file))?;
    println!("bank size: {}", list.bank_size);
    let (data, splits) = list.gather()?;
    println!("{} bytes read from {} source entries", data.len(), splits.len());

    let banks = pack_banks(&data, &splits, list.bank_max, list.bank_size, opts)?;
    let mut used = 0;
    for (i, bank) in banks.iter().enumerate() {
        let name = bank_file_name(output, i);
        fs::write(&name, &bank.packed)?;
        println!(
            "{}: {} - {} ({} bytes)",
            name,
            bank.first,
            bank.end - 1,
            bank.packed.len()
        );
        used += bank.packed.len();
    }
    println!("{} banks output", banks.len());

    fs::write(output, bank_table(&banks, opts)?)?;
    println!("bank end table written to {}", output);

    let total = banks.len() * list.bank_size;
    let percent = |n: usize| 100.0 * n as f64 / data.len().max(1) as f64;
    println!("{:7} bytes input", data.len());
    println!("{:7} bytes output   {:6.2}%", used, percent(used));
    println!(
        "{:7} bytes in banks {:6.2}% ({} unused in {} banks)",
        total,
        percent(total),
        total - used,
        banks.len()
    );
    Ok(())
}
