//! Sector-addressable backing storage for the emulated SD card.
//!
//! A cartridge owns at most one volume; a missing volume is a valid,
//! degraded state where reads come back zeroed and writes are dropped.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

use dscart_hw::specs::card::SECTOR_SIZE;

/// Sector-addressable backing store with a read-only flag.
///
/// Sector addresses at or past `sector_count()` are refused: reads zero-fill
/// and writes are dropped, both with a warning. Nothing clamps or wraps.
pub trait StorageVolume {
    /// Read `count` sectors starting at `start` into `buf`.
    /// Returns false (with `buf` zeroed) if the range is unreadable.
    fn read_sectors(&mut self, start: u32, count: u32, buf: &mut [u8]) -> bool;

    /// Write `count` sectors starting at `start` from `buf`.
    /// Returns false if the range was not written.
    fn write_sectors(&mut self, start: u32, count: u32, buf: &[u8]) -> bool;

    /// Total number of sectors in the volume.
    fn sector_count(&self) -> u64;

    /// Whether writes must be dropped.
    fn is_read_only(&self) -> bool;
}

fn range_in_bounds(start: u32, count: u32, total: u64) -> bool {
    (start as u64).saturating_add(count as u64) <= total
}

/// Raw-image volume backed by a file on the host filesystem.
pub struct FileVolume {
    file: std::fs::File,
    sector_count: u64,
    read_only: bool,
}

impl FileVolume {
    /// Open a raw sector image. The sector count is derived from the file
    /// size; a trailing partial sector is not addressable.
    pub fn open(path: &Path, read_only: bool) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(!read_only)
            .open(path)?;
        let sector_count = file.metadata()?.len() / SECTOR_SIZE as u64;
        debug!(
            "Opened SD card image {:?}: {} sectors{}",
            path,
            sector_count,
            if read_only { " (read-only)" } else { "" }
        );
        Ok(Self {
            file,
            sector_count,
            read_only,
        })
    }
}

impl StorageVolume for FileVolume {
    fn read_sectors(&mut self, start: u32, count: u32, buf: &mut [u8]) -> bool {
        let len = count as usize * SECTOR_SIZE;
        if !range_in_bounds(start, count, self.sector_count) {
            warn!(
                "Read of sectors {}..{} past end of volume ({} sectors)",
                start,
                start as u64 + count as u64,
                self.sector_count
            );
            buf[..len].fill(0);
            return false;
        }
        let offset = start as u64 * SECTOR_SIZE as u64;
        if let Err(e) = self.file.seek(SeekFrom::Start(offset)) {
            warn!("Failed to seek SD image to sector {}: {}", start, e);
            buf[..len].fill(0);
            return false;
        }
        if let Err(e) = self.file.read_exact(&mut buf[..len]) {
            warn!("Failed to read SD image sector {}: {}", start, e);
            buf[..len].fill(0);
            return false;
        }
        true
    }

    fn write_sectors(&mut self, start: u32, count: u32, buf: &[u8]) -> bool {
        if self.read_only {
            return false;
        }
        let len = count as usize * SECTOR_SIZE;
        if !range_in_bounds(start, count, self.sector_count) {
            warn!(
                "Write of sectors {}..{} past end of volume ({} sectors), dropped",
                start,
                start as u64 + count as u64,
                self.sector_count
            );
            return false;
        }
        let offset = start as u64 * SECTOR_SIZE as u64;
        if let Err(e) = self.file.seek(SeekFrom::Start(offset)) {
            warn!("Failed to seek SD image to sector {}: {}", start, e);
            return false;
        }
        if let Err(e) = self.file.write_all(&buf[..len]) {
            warn!("Failed to write SD image sector {}: {}", start, e);
            return false;
        }
        let _ = self.file.flush();
        true
    }

    fn sector_count(&self) -> u64 {
        self.sector_count
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// In-memory volume, used by tests and tooling.
pub struct MemVolume {
    data: Vec<u8>,
    read_only: bool,
}

impl MemVolume {
    /// Wrap raw image bytes; the length is rounded down to whole sectors.
    pub fn new(data: Vec<u8>, read_only: bool) -> Self {
        Self { data, read_only }
    }

    /// A zeroed volume of `sectors` sectors.
    pub fn zeroed(sectors: u32, read_only: bool) -> Self {
        Self::new(vec![0u8; sectors as usize * SECTOR_SIZE], read_only)
    }

    /// Raw image contents, for inspection.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl StorageVolume for MemVolume {
    fn read_sectors(&mut self, start: u32, count: u32, buf: &mut [u8]) -> bool {
        let len = count as usize * SECTOR_SIZE;
        if !range_in_bounds(start, count, self.sector_count()) {
            warn!(
                "Read of sectors {}..{} past end of volume ({} sectors)",
                start,
                start as u64 + count as u64,
                self.sector_count()
            );
            buf[..len].fill(0);
            return false;
        }
        let offset = start as usize * SECTOR_SIZE;
        buf[..len].copy_from_slice(&self.data[offset..offset + len]);
        true
    }

    fn write_sectors(&mut self, start: u32, count: u32, buf: &[u8]) -> bool {
        if self.read_only {
            return false;
        }
        let len = count as usize * SECTOR_SIZE;
        if !range_in_bounds(start, count, self.sector_count()) {
            warn!(
                "Write of sectors {}..{} past end of volume ({} sectors), dropped",
                start,
                start as u64 + count as u64,
                self.sector_count()
            );
            return false;
        }
        let offset = start as usize * SECTOR_SIZE;
        self.data[offset..offset + len].copy_from_slice(&buf[..len]);
        true
    }

    fn sector_count(&self) -> u64 {
        (self.data.len() / SECTOR_SIZE) as u64
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// Stage one sector (zeros when no volume is attached) and fill `response`
/// by indexing the staging buffer modulo the sector size.
///
/// This serves response lengths both smaller and larger than one sector
/// without a bounds check: short reads take a prefix, long reads wrap.
pub(crate) fn copy_staged_sector(
    volume: Option<&mut Box<dyn StorageVolume>>,
    sector: u32,
    response: &mut [u8],
) {
    let mut staging = [0u8; SECTOR_SIZE];
    if let Some(volume) = volume {
        volume.read_sectors(sector, 1, &mut staging);
    }
    for (pos, byte) in response.iter_mut().enumerate() {
        *byte = staging[pos % SECTOR_SIZE];
    }
}

/// Commit one sector of accumulated transaction data, padding a short
/// payload with zeros. Dropped silently when the volume is absent or
/// read-only.
pub(crate) fn commit_sector(
    volume: Option<&mut Box<dyn StorageVolume>>,
    sector: u32,
    data: &[u8],
) {
    let Some(volume) = volume else { return };
    if volume.is_read_only() {
        return;
    }
    let mut staging = [0u8; SECTOR_SIZE];
    let len = data.len().min(SECTOR_SIZE);
    staging[..len].copy_from_slice(&data[..len]);
    volume.write_sectors(sector, 1, &staging);
}
