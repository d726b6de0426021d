//! Protocol-address to volume-sector translation.
//!
//! High-capacity cards are sector-addressed on the SD bus, so the address
//! in an SDIO parameter maps straight onto the volume. Standard-capacity
//! cards are byte-addressed: guest drivers multiply the sector by 512
//! before issuing the command, and the bridge has to divide it back out.
//! Which convention the guest uses follows from the capacity class the
//! bridge itself reports in the synthetic OCR.

use dscart_hw::specs::card::SECTOR_SHIFT;

use crate::geometry::VolumeGeometry;

/// Maps a protocol-layer address to the backing volume's sector space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorTranslator {
    /// The protocol address is already a sector index.
    Identity,
    /// The protocol address is a byte offset; divide by the sector size.
    ByteAddressed,
}

impl SectorTranslator {
    /// Pick the translator matching the capacity class derived from the
    /// volume geometry. FAT32 volumes are reported as high-capacity and
    /// therefore sector-addressed.
    pub fn for_geometry(geometry: &VolumeGeometry) -> Self {
        if geometry.is_fat32 {
            Self::Identity
        } else {
            Self::ByteAddressed
        }
    }

    /// Translate a protocol address to a volume sector index.
    pub fn translate(&self, address: u32) -> u32 {
        match self {
            Self::Identity => address,
            Self::ByteAddressed => address >> SECTOR_SHIFT,
        }
    }
}
