use clap::Parser;
use dscart::{
    Args, BridgeKind, CartCommand, CartSlot, FileVolume, SdioBridge, SectorBridge, StorageVolume,
    load_rom,
};
use dscart_hw::opcodes::{sector_bridge, sdio_bridge};
use dscart_hw::specs::card::{SECTOR_SHIFT, SECTOR_SIZE};
use tracing::info;

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &args.list {
        return list_directory(args, path);
    }

    let volume = FileVolume::open(&args.image, args.read_only)?;
    info!(
        "Image: {} sectors ({} bytes)",
        volume.sector_count(),
        volume.sector_count() * SECTOR_SIZE as u64
    );
    let rom = load_rom(args)?;

    match args.bridge {
        BridgeKind::Sector => {
            let mut bridge = SectorBridge::new(rom, Some(Box::new(volume)));
            bridge.set_protocol_active(true);
            if let Some(sector) = args.sector {
                let mut slot = CartSlot::new(Box::new(bridge));
                dump_sector(read_sector_simple(&mut slot, sector)?, sector);
            }
        }
        BridgeKind::Sdio => {
            let mut bridge = SdioBridge::new(rom, Some(Box::new(volume)));
            bridge.set_protocol_active(true);
            let geometry = *bridge.geometry();
            info!(
                "Geometry: {} bytes/sector, {} sectors/cluster, {} FAT tables, {}",
                geometry.bytes_per_sector,
                geometry.sectors_per_cluster,
                geometry.fat_table_count,
                if geometry.is_fat32 { "FAT32" } else { "FAT12/16" }
            );
            if let Some(sector) = args.sector {
                // A standard-capacity card is byte-addressed on the bus,
                // so address it the way a guest driver would.
                let address = if geometry.is_fat32 {
                    sector
                } else {
                    sector << SECTOR_SHIFT
                };
                let mut slot = CartSlot::new(Box::new(bridge));
                dump_sector(read_sector_sdio(&mut slot, address)?, sector);
            }
        }
    }
    Ok(())
}

/// Read one sector through the minimal sector bridge.
fn read_sector_simple(
    slot: &mut CartSlot,
    sector: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let addr = sector.to_be_bytes();
    let set: CartCommand = [
        sector_bridge::SET_SECTOR,
        0,
        0,
        0,
        addr[0],
        addr[1],
        addr[2],
        addr[3],
    ];
    slot.read_command(&set, 0)?;
    let read: CartCommand = [sector_bridge::READ_SECTOR, 0, 0, 0, 0, 0, 0, 0];
    Ok(slot.read_command(&read, SECTOR_SIZE)?)
}

/// Read one sector through the SDIO bridge's FIFO.
fn read_sector_sdio(
    slot: &mut CartSlot,
    address: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let addr = address.to_be_bytes();
    let request: CartCommand = [
        sdio_bridge::READ_SINGLE_BLOCK,
        addr[0],
        addr[1],
        addr[2],
        addr[3],
        0,
        0,
        0,
    ];
    slot.read_command(&request, 1)?;
    let read: CartCommand = [sdio_bridge::FIFO_READ, 0, 0, 0, 0, 0, 0, 0];
    Ok(slot.read_command(&read, SECTOR_SIZE)?)
}

fn dump_sector(data: Vec<u8>, sector: u32) {
    println!("Sector {:#X}:", sector);
    for (line, chunk) in data.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if (0x20..0x7F).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{:08X}  {:<47}  {}", line * 16, hex.join(" "), ascii);
    }
}

/// List a directory inside the image's FAT filesystem.
fn list_directory(args: &Args, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    use fscommon::BufStream;

    let img_file = std::fs::File::open(&args.image)?;
    let buf_stream = BufStream::new(img_file);
    let fs = fatfs::FileSystem::new(buf_stream, fatfs::FsOptions::new())?;
    let root_dir = fs.root_dir();

    let dir = if path == "/" || path.is_empty() {
        root_dir
    } else {
        root_dir.open_dir(path)?
    };

    for entry in dir.iter() {
        let entry = entry?;
        if entry.is_dir() {
            println!("{:>10}  {}/", "<dir>", entry.file_name());
        } else {
            println!("{:>10}  {}", entry.len(), entry.file_name());
        }
    }
    Ok(())
}
