use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use virtio_probe::{build_image, GenError, ProbeConfig};

#[derive(clap::Parser, Debug)]
#[command(
    name = "gen-virtio-probe",
    about = "Generate a RISC-V image that checks a VirtIO MMIO device and reports over UART"
)]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "virtio_test.bin")]
    output: PathBuf,

    /// Expected magic value (hex, with or without 0x)
    #[arg(long, value_parser = parse_hex)]
    magic: Option<u32>,

    /// Log every emitted instruction with its address
    #[arg(long)]
    listing: bool,
}

fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{}': {}", s, e))
}

fn run(args: &Args) -> Result<usize, GenError> {
    let mut cfg = ProbeConfig::default();
    if let Some(magic) = args.magic {
        cfg = cfg.with_expected_magic(magic);
    }

    let image = build_image(&cfg)?;

    if args.listing {
        for (i, (inst, word)) in image.text.insts.iter().zip(&image.text.words).enumerate() {
            let addr = cfg.load_origin + (i * 4) as u32;
            log::info!("0x{:08x}: {:08x}  {:?}", addr, word, inst);
        }
    }

    std::fs::write(&args.output, &image.bytes)?;
    Ok(image.bytes.len())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(size) => {
            log::info!("wrote {} bytes to {}", size, args.output.display());
            println!("Generated {}, size {}", args.output.display(), size);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
