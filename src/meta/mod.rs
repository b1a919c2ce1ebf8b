
//! Describes all meta data possible in an exr file.

pub mod attribute;
pub mod header;


use crate::io::*;
use self::header::Header;
use crate::error::*;


/// Contains the complete meta data of an exr image.
/// Defines the size and channels of the image,
/// how its pixel blocks are laid out in the file,
/// and various other attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData {

    /// Some flags summarizing the features that must be supported to decode the file.
    pub requirements: Requirements,

    /// The header describing the single image in this file.
    pub header: Header,
}


/// The offset table is an ordered list of indices referencing pixel data in the exr file.
/// For each scan line block in the image, an index exists, which points to the byte-location
/// of the corresponding pixel data in the file. That index can be used to load specific
/// portions of an image without processing all bytes in a file.
pub type OffsetTable = Vec<u64>;


/// A summary of the requirements that must be met to read this exr file.
/// Attempting to read a file with unmet requirements will return an error.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Requirements {

    /// This library supports only version 2.
    pub file_format_version: u8,

    /// If true, this image has tiled blocks instead of scan line blocks.
    pub is_single_layer_and_tiled: bool,

    /// Whether this file has strings with a length greater than 31.
    /// Strings can never be longer than 255.
    pub has_long_names: bool,

    /// This image contains at least one layer with deep data.
    pub has_deep_data: bool,

    /// Whether this file contains multiple parts.
    pub has_multiple_layers: bool,
}


/// The first four bytes of each exr file.
/// Used to abort reading non-exr files.
pub mod magic_number {
    use super::*;

    /// The first four bytes of each exr file.
    pub const BYTES: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

    /// Without validation, write this instance to the byte stream.
    pub fn write(write: &mut impl Write) -> UnitResult {
        u8::write_slice(write, &self::BYTES)
    }

    /// Consumes four bytes from the reader and returns whether the file may be an exr file.
    pub fn is_exr(read: &mut impl Read) -> Result<bool> {
        let mut magic_num = [0; 4];
        u8::read_slice(read, &mut magic_num)?;
        Ok(magic_num == self::BYTES)
    }

    /// Validate this image. If it is an exr file, return `Ok(())`.
    pub fn validate_exr(read: &mut impl Read) -> UnitResult {
        if self::is_exr(read)? {
            Ok(())

        } else {
            Err(Error::format("file identifier missing"))
        }
    }
}

/// A `0_u8` at the end of a sequence.
pub mod sequence_end {
    use super::*;

    /// Number of bytes this would consume in an exr file.
    pub fn byte_size() -> usize {
        1
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(write: &mut W) -> UnitResult {
        0_u8.write(write)
    }

    /// Peeks the next byte. If it is zero, consumes the byte and returns true.
    pub fn has_come(read: &mut PeekRead<impl Read>) -> Result<bool> {
        Ok(read.skip_if_eq(0)?)
    }
}


impl MetaData {

    /// Read the exr meta data from a reader.
    /// Use `read_from_unbuffered` if this is not an in-memory reader.
    /// Validates the meta data.
    #[must_use]
    pub fn read_from_buffered(buffered: impl Read) -> Result<Self> {
        let mut read = PeekRead::new(buffered);
        MetaData::read_from_buffered_peekable(&mut read)
    }

    /// Buffer the reader and then read the exr meta data from it.
    /// Use `read_from_buffered` if your reader is an in-memory reader.
    /// Validates the meta data.
    #[must_use]
    pub fn read_from_unbuffered(unbuffered: impl Read) -> Result<Self> {
        Self::read_from_buffered(std::io::BufReader::new(unbuffered))
    }

    /// Validates the meta data.
    #[must_use]
    pub(crate) fn read_from_buffered_peekable(read: &mut PeekRead<impl Read>) -> Result<Self> {
        magic_number::validate_exr(read)?;

        let requirements = Requirements::read(read)?;
        requirements.validate()?;

        let header = Header::read(read, &requirements)?;
        header.validate()?;

        Ok(MetaData { requirements, header })
    }

    /// Read the offset table for the single header from the reader.
    /// The offset table immediately follows the header in the file.
    pub fn read_offset_table(read: &mut impl Read, header: &Header) -> Result<OffsetTable> {
        u64::read_vec(read, header.chunk_count, std::u16::MAX as usize, None, "offset table size")
    }
}


impl Requirements {

    /// The flags of a plain single-part scan line file, as written by this crate.
    pub fn default_scan_line_file() -> Self {
        Requirements {
            file_format_version: 2,
            is_single_layer_and_tiled: false,
            has_long_names: false,
            has_deep_data: false,
            has_multiple_layers: false,
        }
    }

    /// Read the value without validating.
    pub fn read<R: Read>(read: &mut R) -> Result<Self> {
        use ::bit_field::BitField;

        let version_and_flags = u32::read(read)?;

        // take the 8 least significant bits, they contain the file format version number
        let version = (version_and_flags & 0x00FF) as u8;

        // the 24 most significant bits are treated as a set of boolean flags
        let is_single_tile = version_and_flags.get_bit(9);
        let has_long_names = version_and_flags.get_bit(10);
        let has_deep_data = version_and_flags.get_bit(11);
        let has_multiple_layers = version_and_flags.get_bit(12);

        // all remaining bits except the version byte and bits 9, 10, 11 and 12
        // are reserved and should be 0. if a file has any of these bits set to 1,
        // it contains a feature that this crate does not support
        let has_unknown_flags = version_and_flags.get_bit(8)
            || version_and_flags >> 13 != 0;

        if has_unknown_flags {
            return Err(Error::unsupported("too new file feature flags"));
        }

        Ok(Requirements {
            file_format_version: version,
            is_single_layer_and_tiled: is_single_tile, has_long_names,
            has_deep_data, has_multiple_layers,
        })
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(self, write: &mut W) -> UnitResult {
        use ::bit_field::BitField;

        // the 8 least significant bits contain the file format version number
        // and the flags are set to 0
        let mut version_and_flags = self.file_format_version as u32;

        // the 24 most significant bits are treated as a set of boolean flags
        version_and_flags.set_bit(9, self.is_single_layer_and_tiled);
        version_and_flags.set_bit(10, self.has_long_names);
        version_and_flags.set_bit(11, self.has_deep_data);
        version_and_flags.set_bit(12, self.has_multiple_layers);
        // all remaining bits except 9, 10, 11 and 12 are reserved and should be 0

        version_and_flags.write(write)?;
        Ok(())
    }

    /// Returns an error for all files that this crate cannot decode:
    /// anything that is not a single-part scan line file of version 2.
    pub fn validate(&self) -> UnitResult {
        if self.file_format_version != 2 {
            return Err(Error::format("file versions other than `2.0`"));
        }

        if self.is_single_layer_and_tiled {
            return Err(Error::unsupported("tiled images"));
        }

        if self.has_deep_data {
            return Err(Error::unsupported("deep data"));
        }

        if self.has_multiple_layers {
            return Err(Error::unsupported("multi-part files"));
        }

        Ok(())
    }
}
