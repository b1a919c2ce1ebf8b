
//! The compression methods an exr file can declare,
//! and decompression of the one method this crate supports.

use crate::io::*;
use crate::error::{Error, Result, UnitResult};


/// Specifies how the pixel data of a file is compressed.
/// Files store this as a single byte inside the `compression` attribute.
/// This crate can only decode uncompressed pixel data,
/// but recognizes all methods defined by the standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {

    /// Store uncompressed values.
    /// Produces large files that can be read and written very quickly.
    Uncompressed,

    /// Run-length encoding of each block. Lossless.
    RLE,

    /// ZIP compression of each line individually. Lossless.
    ZIP1,

    /// ZIP compression of blocks of 16 lines. Lossless.
    ZIP16,

    /// Wavelet transform followed by Huffman encoding,
    /// in blocks of 32 lines. Lossless.
    PIZ,

    /// Lossy compression that truncates each `f32` to 24 bits
    /// before deflating blocks of 16 lines.
    PXR24,

    /// Lossy 4x4 block compression with a fixed compression rate,
    /// in blocks of 32 lines.
    B44,

    /// Like `B44`, but flat areas compress to even smaller data.
    B44A,
}

impl std::fmt::Display for Compression {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} compression", match self {
            Compression::Uncompressed => "no",
            Compression::RLE => "rle",
            Compression::ZIP1 => "zip line",
            Compression::ZIP16 => "zip block",
            Compression::PIZ => "piz",
            Compression::PXR24 => "pxr24",
            Compression::B44 => "b44",
            Compression::B44A => "b44a",
        })
    }
}

impl Compression {

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize { u8::BYTE_SIZE }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(self, write: &mut W) -> UnitResult {
        use self::Compression::*;
        match self {
            Uncompressed => 0_u8,
            RLE => 1_u8,
            ZIP1 => 2_u8,
            ZIP16 => 3_u8,
            PIZ => 4_u8,
            PXR24 => 5_u8,
            B44 => 6_u8,
            B44A => 7_u8,
        }.write(write)?;
        Ok(())
    }

    /// Read the value without validating whether this crate can decompress it.
    pub fn read<R: Read>(read: &mut R) -> Result<Self> {
        use self::Compression::*;
        Ok(match u8::read(read)? {
            0 => Uncompressed,
            1 => RLE,
            2 => ZIP1,
            3 => ZIP16,
            4 => PIZ,
            5 => PXR24,
            6 => B44,
            7 => B44A,
            _ => return Err(Error::unsupported_compression("unknown compression method")),
        })
    }

    /// Number of scan lines that one compressed block of this method contains.
    /// The block at the bottom of the image may contain fewer lines.
    pub fn scan_lines_per_block(self) -> usize {
        use self::Compression::*;
        match self {
            Uncompressed | RLE | ZIP1 => 1,
            ZIP16 | PXR24             => 16,
            PIZ   | B44  | B44A       => 32,
        }
    }

    /// Decompress the pixel bytes of a single scan line block.
    ///
    /// Only succeeds for uncompressed data, where the payload already is the
    /// little-endian pixel data and must exactly match the expected size.
    /// Declaring any other method fails with `Error::UnsupportedCompression`.
    pub fn decompress_scan_line_block(self, compressed: Vec<u8>, expected_byte_size: usize) -> Result<Vec<u8>> {
        match self {
            Compression::Uncompressed => {
                if compressed.len() != expected_byte_size {
                    return Err(Error::corrupt_pixels(format!(
                        "scan line block contains {} bytes where {} were declared by the header",
                        compressed.len(), expected_byte_size
                    )));
                }

                Ok(compressed)
            },

            other => Err(Error::unsupported_compression(format!("{}", other))),
        }
    }
}
