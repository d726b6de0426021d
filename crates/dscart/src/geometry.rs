//! FAT boot-sector geometry, derived once per cartridge.
//!
//! The only geometry fact the SDIO bridge consumes afterwards is the FAT32
//! classification (it gates the high-capacity bit in the synthetic OCR);
//! the other parsed fields are retained to keep the boot-sector model whole.
//!
//! # References
//! - <https://en.wikipedia.org/wiki/BIOS_parameter_block>

use dscart_hw::specs::card::{FAT32_MIN_CLUSTERS, SECTOR_SIZE};
use tracing::debug;

/// Geometry facts parsed from the volume's boot sector.
///
/// Computed once at cartridge construction and immutable thereafter; a
/// device reset does not re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeGeometry {
    /// Bytes per logical sector (BPB bytes 11-12, little-endian)
    pub bytes_per_sector: u16,
    /// Sectors per allocation cluster (BPB byte 13)
    pub sectors_per_cluster: u8,
    /// First FAT sector, i.e. the reserved sector count (BPB bytes 14-15)
    pub first_fat_sector: u16,
    /// Number of FAT tables (BPB byte 16)
    pub fat_table_count: u8,
    /// True when the total cluster count classifies the volume as FAT32
    pub is_fat32: bool,
}

impl VolumeGeometry {
    /// Parse geometry from a raw boot sector and the volume's sector count.
    ///
    /// Pure derivation, no I/O. A cluster size of zero (garbage boot
    /// sector) classifies as not-FAT32.
    pub fn parse(boot: &[u8; SECTOR_SIZE], sector_count: u64) -> Self {
        let bytes_per_sector = u16::from_le_bytes([boot[11], boot[12]]);
        let sectors_per_cluster = boot[13];
        let first_fat_sector = u16::from_le_bytes([boot[14], boot[15]]);
        let fat_table_count = boot[16];

        let total_clusters = if sectors_per_cluster > 0 {
            sector_count / sectors_per_cluster as u64
        } else {
            0
        };
        let is_fat32 = total_clusters >= FAT32_MIN_CLUSTERS as u64;

        let geometry = Self {
            bytes_per_sector,
            sectors_per_cluster,
            first_fat_sector,
            fat_table_count,
            is_fat32,
        };
        debug!(
            "Boot sector geometry: {} bytes/sector, {} sectors/cluster, \
             first FAT sector {}, {} FAT tables, {} clusters ({})",
            bytes_per_sector,
            sectors_per_cluster,
            first_fat_sector,
            fat_table_count,
            total_clusters,
            if is_fat32 { "FAT32" } else { "FAT12/16" }
        );
        geometry
    }
}

impl Default for VolumeGeometry {
    /// Geometry for a cartridge with no volume attached: everything zero,
    /// not FAT32.
    fn default() -> Self {
        Self {
            bytes_per_sector: 0,
            sectors_per_cluster: 0,
            first_fat_sector: 0,
            fat_table_count: 0,
            is_fat32: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boot_sector(sectors_per_cluster: u8) -> [u8; SECTOR_SIZE] {
        let mut boot = [0u8; SECTOR_SIZE];
        boot[11] = 0x00; // 512 bytes per sector, little-endian
        boot[12] = 0x02;
        boot[13] = sectors_per_cluster;
        boot[14] = 0x20; // 32 reserved sectors
        boot[15] = 0x00;
        boot[16] = 2;
        boot
    }

    #[test]
    fn parses_bpb_fields() {
        let geometry = VolumeGeometry::parse(&boot_sector(8), 1024);
        assert_eq!(geometry.bytes_per_sector, 512);
        assert_eq!(geometry.sectors_per_cluster, 8);
        assert_eq!(geometry.first_fat_sector, 32);
        assert_eq!(geometry.fat_table_count, 2);
    }

    #[test]
    fn classifies_large_volume_as_fat32() {
        // 65526 clusters of 8 sectors is exactly the FAT32 threshold
        let geometry = VolumeGeometry::parse(&boot_sector(8), 65526 * 8);
        assert!(geometry.is_fat32);
    }

    #[test]
    fn classifies_small_volume_as_fat16() {
        let geometry = VolumeGeometry::parse(&boot_sector(8), 65525 * 8);
        assert!(!geometry.is_fat32);
    }

    #[test]
    fn zero_cluster_size_is_not_fat32() {
        let geometry = VolumeGeometry::parse(&boot_sector(0), u64::MAX);
        assert!(!geometry.is_fat32);
    }
}
