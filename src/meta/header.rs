
//! Describes the header of a single-part exr file,
//! which contains all attributes of the image.

use crate::io::*;
use crate::error::*;
use crate::math::{RoundingMode, Vec2};
use crate::meta::{sequence_end, Requirements};
use crate::meta::attribute::{self, *};
use std::collections::HashMap;


/// Describes the single image of a scan line file.
/// Contains the required attributes, with all
/// remaining attributes collected in a map.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {

    /// List of channels in this image.
    pub channels: ChannelList,

    /// How the pixel data of all channels in this image is compressed. May be `Compression::Uncompressed`.
    pub compression: Compression,

    /// The rectangle that positions this image within the infinite 2D space.
    /// Its size is the resolution of the image.
    pub data_window: IntegerBounds,

    /// In what order the scan line blocks of this image occur in the file.
    pub line_order: LineOrder,

    /// Number of scan line blocks that this image has been divided into.
    /// Computed from the data window height and the compression method.
    pub chunk_count: usize,

    /// All attributes that are not required for decoding,
    /// such as the display window or the pixel aspect ratio.
    /// If an attribute appears twice in the file, the latter occurrence wins.
    pub custom_attributes: HashMap<Text, AttributeValue>,
}


/// The names of the attributes that a header is required to contain.
pub mod standard_names {
    macro_rules! define_required_attribute_names {
        ( $($name: ident : $value: expr),* ) => {
            $(
                /// The byte-string name of this required attribute as it appears in an exr file.
                pub const $name: &'static [u8] = $value;
            )*
        };
    }

    define_required_attribute_names! {
        CHANNELS:       b"channels",
        COMPRESSION:    b"compression",
        DATA_WINDOW:    b"dataWindow",
        LINE_ORDER:     b"lineOrder"
    }
}


impl Header {

    /// Read the value without validating.
    pub fn read(read: &mut PeekRead<impl Read>, requirements: &Requirements) -> Result<Self> {
        let max_string_len = if requirements.has_long_names { 256 } else { 32 };

        // these required attributes will be filled when encountered while parsing
        let mut channels = None;
        let mut compression = None;
        let mut data_window = None;
        let mut line_order = None;
        let mut custom_attributes = HashMap::new();

        // read each attribute in this header
        while !sequence_end::has_come(read)? {
            let (attribute_name, value) = attribute::read(read, max_string_len)?;

            use self::standard_names as name;
            use crate::meta::attribute::AttributeValue::*;

            // if the attribute is a required attribute, set the corresponding variable directly.
            // otherwise, add the attribute to the map of custom attributes.
            // the required variables are only set if the type matches the required type for that attribute
            match (attribute_name.bytes(), value) {
                (name::CHANNELS, ChannelList(value)) => channels = Some(value),
                (name::COMPRESSION, Compression(value)) => compression = Some(value),
                (name::DATA_WINDOW, IntegerBounds(value)) => data_window = Some(value),
                (name::LINE_ORDER, LineOrder(value)) => line_order = Some(value),

                // a duplicate attribute overwrites the previous occurrence
                (_, value) => {
                    custom_attributes.insert(attribute_name, value);
                },
            }
        }

        let channels = channels.ok_or(Error::MissingAttribute("channels"))?;
        let compression = compression.ok_or(Error::MissingAttribute("compression"))?;
        let data_window = data_window.ok_or(Error::MissingAttribute("dataWindow"))?;

        // check size now to prevent panics while computing the chunk count
        data_window.validate(None)?;

        let chunk_count = compute_chunk_count(compression, data_window.size);

        Ok(Header {
            channels, compression, data_window,
            line_order: line_order.unwrap_or(LineOrder::Unspecified),
            chunk_count, custom_attributes,
        })
    }

    /// Without validation, write this instance to the byte stream.
    pub fn write(&self, write: &mut impl Write) -> UnitResult {
        use crate::meta::attribute::AttributeValue::*;
        use self::standard_names as name;

        attribute::write(name::CHANNELS, &ChannelList(self.channels.clone()), write)?;
        attribute::write(name::COMPRESSION, &Compression(self.compression), write)?;
        attribute::write(name::DATA_WINDOW, &IntegerBounds(self.data_window), write)?;
        attribute::write(name::LINE_ORDER, &LineOrder(self.line_order), write)?;

        for (attribute_name, value) in &self.custom_attributes {
            attribute::write(attribute_name.as_slice(), value, write)?;
        }

        sequence_end::write(write)?;
        Ok(())
    }

    /// The resolution of this image, equal to the size of the data window.
    pub fn data_size(&self) -> Vec2<usize> {
        self.data_window.size
    }

    /// Number of uncompressed bytes in a single full scan line of this image.
    pub fn scan_line_byte_size(&self) -> usize {
        self.channels.bytes_per_pixel * self.data_size().width()
    }

    /// Maximum byte length of an uncompressed scan line block, used for validation.
    pub fn max_block_byte_size(&self) -> usize {
        self.scan_line_byte_size() * self.compression.scan_lines_per_block()
    }

    /// Validate this instance.
    pub fn validate(&self) -> UnitResult {
        self.data_window.validate(None)?;

        if self.data_size() == Vec2(0, 0) {
            return Err(Error::invalid("empty data window"));
        }

        // the decoded image must fit into a single in-memory array,
        // and a malicious header must not demand a giant allocation
        let sample_count = self.data_size().width()
            .checked_mul(self.data_size().height())
            .and_then(|pixels| pixels.checked_mul(self.channels.list.len()));

        match sample_count {
            Some(count) if count <= MAX_SAMPLE_COUNT => {},
            _ => return Err(Error::unsupported("image larger than the in-memory sample limit")),
        }

        self.channels.validate(self.data_window)?;

        // only `f32` samples can be decoded into the pixel array
        if self.channels.uniform_sample_type != Some(SampleType::F32) {
            return Err(Error::unsupported("channels with sample types other than f32"));
        }

        for value in self.custom_attributes.values() {
            value.validate(self.data_window)?;
        }

        Ok(())
    }
}


/// Largest number of `f32` samples a single decoded image may contain (4 GiB of pixel memory).
const MAX_SAMPLE_COUNT: usize = 1024 * 1024 * 1024;


/// Compute the number of scan line blocks required to contain all lines of the image.
pub fn compute_chunk_count(compression: Compression, data_size: Vec2<usize>) -> usize {
    // round up, because the last block of the image may contain fewer scan lines
    RoundingMode::Up.divide(data_size.height(), compression.scan_lines_per_block())
}
