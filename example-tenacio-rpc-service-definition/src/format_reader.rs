//! Operations of a remote image format reader.
//!
//! A reader is pointed at a file with `SetId`, after which the dimension
//! getters describe the current series. Pixel data comes back from
//! `OpenBytes` as raw plane bytes.

use tenacio_rpc_service::{ServiceType, rpc_operations};

/// Marker for the reader interface, used with `ServiceProxy`.
pub struct FormatReader;

impl ServiceType for FormatReader {
    const TYPE_ID: &'static str = "::formats::IFormatReader";
}

rpc_operations! {
    /// Opens the file with the given id (usually a path).
    pub SetId => "setId" (id: String);
    /// Closes the current file.
    pub Close => "close" ();
    /// Toggles metadata parsing for the next `SetId`. Safe to send one-way.
    pub SetMetadataCollected => "setMetadataCollected" (collect: bool);

    pub GetSizeX => "getSizeX" () -> i32 [idempotent];
    pub GetSizeY => "getSizeY" () -> i32 [idempotent];
    pub GetSizeZ => "getSizeZ" () -> i32 [idempotent];
    pub GetSizeC => "getSizeC" () -> i32 [idempotent];
    pub GetSizeT => "getSizeT" () -> i32 [idempotent];
    pub GetImageCount => "getImageCount" () -> i32 [idempotent];
    pub GetPixelType => "getPixelType" () -> i32 [idempotent];
    pub GetDimensionOrder => "getDimensionOrder" () -> String [idempotent];
    pub IsRgb => "isRGB" () -> bool [idempotent];
    pub GetFormat => "getFormat" () -> String [idempotent];
    pub GetCurrentFile => "getCurrentFile" () -> String [idempotent];

    pub GetSeriesCount => "getSeriesCount" () -> i32 [idempotent];
    pub SetSeries => "setSeries" (series: i32);
    pub GetSeries => "getSeries" () -> i32 [idempotent];

    /// Rasterized index of the plane at the given Z, C and T coordinates.
    pub GetIndex => "getIndex" (z: i32, c: i32, t: i32) -> i32 [idempotent];
    pub GetZctCoords => "getZCTCoords" (index: i32) -> Vec<i32> [idempotent];
    /// Raw bytes of plane `no` of the current series.
    pub OpenBytes => "openBytes" (no: i32) -> Vec<u8> [idempotent];
}

/// Pixel type codes returned by `GetPixelType`.
pub mod pixel_type {
    pub const INT8: i32 = 0;
    pub const UINT8: i32 = 1;
    pub const INT16: i32 = 2;
    pub const UINT16: i32 = 3;
    pub const INT32: i32 = 4;
    pub const UINT32: i32 = 5;
    pub const FLOAT: i32 = 6;
    pub const DOUBLE: i32 = 7;

    /// Bytes per pixel for a pixel type code.
    pub fn bytes_per_pixel(pixel_type: i32) -> Option<usize> {
        match pixel_type {
            INT8 | UINT8 => Some(1),
            INT16 | UINT16 => Some(2),
            INT32 | UINT32 | FLOAT => Some(4),
            DOUBLE => Some(8),
            _ => None,
        }
    }
}
