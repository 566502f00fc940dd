//! Error types for partition driver operations

use crate::device::TileType;
use thiserror::Error;

/// Result type alias for partition driver operations
pub type Result<T> = std::result::Result<T, AieError>;

/// Errors that can occur while driving a tile-array partition
#[derive(Debug, Error)]
pub enum AieError {
    /// A caller-supplied value failed validation
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// A tile coordinate lies outside the partition
    #[error("Invalid tile location ({col}, {row})")]
    InvalidLocation {
        /// Partition-relative column
        col: u32,
        /// Row index
        row: u32,
    },

    /// The operation is not valid for the tile type at the given location
    #[error("Operation not valid for {tile_type:?} tile at ({col}, {row})")]
    InvalidTileType {
        /// Resolved tile type
        tile_type: TileType,
        /// Partition-relative column
        col: u32,
        /// Row index
        row: u32,
    },

    /// The operation is not meaningful on the current silicon generation
    #[error("Feature not supported on this generation: {feature}")]
    UnsupportedFeature {
        /// Name of the missing capability
        feature: &'static str,
    },

    /// An underlying register or NPI access failed
    #[error("Hardware access failed: {reason}")]
    HardwareError {
        /// Reason for failure
        reason: String,
    },

    /// I/O error while reading a program image or mapping a region
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// A program image could not be parsed or does not fit the tile
    #[error("Invalid ELF image: {reason}")]
    InvalidElf {
        /// Reason for rejection
        reason: String,
    },
}

impl AieError {
    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a hardware access error
    pub fn hardware_error(reason: impl Into<String>) -> Self {
        Self::HardwareError {
            reason: reason.into(),
        }
    }

    /// Create an invalid ELF error
    pub fn invalid_elf(reason: impl Into<String>) -> Self {
        Self::InvalidElf {
            reason: reason.into(),
        }
    }
}
