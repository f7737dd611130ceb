#![forbid(unsafe_code)]
use std::fs;
use std::io;
use std::io::prelude::*;
use std::process;

use clap::Parser;
use qips::{infer_output_size, records, verify_header, Ipspatch};

#[derive(Parser, Debug)]
#[clap(
name = "qips",
version = "0.1.0",
about = "small and strict IPS patcher",
long_about = None,
)]
struct IpspatchArgs {
    /// source file
    #[clap(value_name = "SOURCE")]
    source_path: String,

    /// target file
    #[clap(value_name = "TARGET")]
    target_path: String,

    /// patch file
    #[clap(value_name = "PATCH")]
    patch_path: String,

    /// target size, inferred from source and patch if not given
    #[clap(short = 's', value_name = "SIZE")]
    target_size: Option<usize>,

    /// print patch info instead of patching
    #[clap(short = 'i')]
    info: bool,
}

fn main() {
    let args = IpspatchArgs::parse();
    if let Err(e) = execute(args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn execute(args: IpspatchArgs) -> io::Result<()> {
    // setup input
    let mut source;
    let patch;
    if args.source_path == "-" {
        source = Vec::new();
        io::stdin().read_to_end(&mut source)?;
    } else {
        source = fs::read(&args.source_path)?;
    }
    source.shrink_to_fit();
    if args.patch_path == "-" {
        if args.source_path == "-" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source and patch both read from stdin",
            ));
        }
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        patch = buf;
    } else {
        patch = fs::read(&args.patch_path)?;
    }

    if args.info {
        println!("valid header: {}", verify_header(&patch[..]));
        println!("records: {}", records(&patch[..]).count());
        println!("inferred size: {}", infer_output_size(&patch[..]));
        return Ok(());
    }

    // setup patcher
    let ipspatch = Ipspatch::new(&patch[..])?;

    // execute patcher
    let target = match args.target_size {
        Some(size) => {
            let mut target = vec![0; size];
            ipspatch.apply(&mut target[..], &source[..])?;
            target
        }
        None => ipspatch.apply_to_vec(&source[..])?,
    };

    // write output
    if args.target_path == "-" {
        let mut stdout = io::stdout();
        stdout.write_all(&target[..])?;
        stdout.flush()?;
    } else {
        fs::write(&args.target_path, &target[..])?;
    }
    Ok(())
}
