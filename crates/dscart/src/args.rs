use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Path to a raw SD card image (FAT-formatted, 512-byte sectors)
    pub image: PathBuf,

    /// Open the image read-only; guest writes are silently dropped
    #[arg(long)]
    pub read_only: bool,

    /// Flash-cart bridge variant to drive the image through
    #[arg(long, value_enum, default_value = "sdio")]
    pub bridge: BridgeKind,

    /// Optional cartridge ROM image served for baseline ROM reads
    #[arg(long)]
    pub rom: Option<PathBuf>,

    /// Read this sector through the bridge and hex-dump it
    /// (hex: 0x1234 or decimal: 1234)
    #[arg(long, value_parser = parse_hex_or_dec)]
    pub sector: Option<u32>,

    /// List this directory inside the image's FAT filesystem
    /// (e.g., "/" or "DCIM/100NIKON")
    #[arg(long)]
    pub list: Option<String>,
}

/// Which emulated bridge answers the slot commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeKind {
    /// Minimal sector-addressable bridge
    Sector,
    /// SDIO host emulation
    Sdio,
}

impl Args {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.sector.is_some() && self.list.is_some() {
            return Err("--sector and --list cannot be combined".to_string());
        }
        Ok(())
    }
}

pub fn parse_hex_or_dec(s: &str) -> Result<u32, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

/// Load the optional cartridge ROM image named by the arguments.
pub fn load_rom(args: &Args) -> Result<crate::RomImage, Box<dyn std::error::Error>> {
    match &args.rom {
        Some(path) => {
            let data = std::fs::read(path)?;
            tracing::info!("Loaded ROM image {:?} ({} bytes)", path, data.len());
            Ok(crate::RomImage::new(data))
        }
        None => Ok(crate::RomImage::empty()),
    }
}
