/// Storage card specifications
pub mod card {
    /// Sector size in bytes (fixed for every supported card)
    pub const SECTOR_SIZE: usize = 512;

    /// Shift converting a byte address to a sector address
    pub const SECTOR_SHIFT: u32 = 9;

    /// Minimum total cluster count for a volume to be FAT32
    ///
    /// Below this count the FAT format is FAT12/FAT16 by definition;
    /// see the Microsoft FAT specification's cluster-count thresholds.
    pub const FAT32_MIN_CLUSTERS: u32 = 65526;
}

/// Cartridge command channel specifications
pub mod slot {
    /// Every slot command is exactly 8 bytes
    pub const COMMAND_SIZE: usize = 8;
}
