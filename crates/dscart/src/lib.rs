pub mod args;
pub mod device;
pub mod geometry;
pub mod passthrough;
pub mod rom;
pub mod sdio;
pub mod sector;
pub mod slot;
pub mod storage;
pub mod translate;

// Re-export commonly used types
pub use args::{Args, BridgeKind, load_rom};
pub use device::{CartCommand, CartError, CartResponder, CommandStatus};
pub use geometry::VolumeGeometry;
pub use passthrough::{HidTransport, PassthroughBridge};
pub use rom::RomImage;
pub use sdio::SdioBridge;
pub use sector::SectorBridge;
pub use slot::CartSlot;
pub use storage::{FileVolume, MemVolume, StorageVolume};
pub use translate::SectorTranslator;
