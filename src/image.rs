
//! Decode the pixels of an uncompressed scan line file
//! into one flat array of `f32` samples.

use crate::io::*;
use crate::chunk::ScanLineChunk;
use crate::error::*;
use crate::math::Vec2;
use crate::meta::MetaData;
use crate::meta::attribute::ChannelList;
use std::fs::File;
use std::io::{BufReader, Seek};


/// The decoded contents of an exr file:
/// the resolution, the channel descriptions, and all pixel values.
///
/// The samples are laid out as `[height][width][channel]`,
/// with the channels ordered alphabetically by name, as they appear in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatImage {

    /// The width and height of this image.
    pub resolution: Vec2<usize>,

    /// The channels that each pixel is composed of, sorted alphabetically.
    pub channels: ChannelList,

    /// One `f32` value per channel per pixel.
    /// Indexed by `(y * width + x) * channel_count + channel`.
    /// Scan lines that the file does not reference remain zero.
    pub samples: Vec<f32>,

    /// The complete meta data of the file that this image was decoded from.
    pub meta_data: MetaData,
}

impl FlatImage {

    /// Number of channels in each pixel of this image.
    pub fn channel_count(&self) -> usize {
        self.channels.list.len()
    }

    /// The value of the specified channel at the specified pixel location.
    pub fn sample(&self, position: Vec2<usize>, channel: usize) -> f32 {
        debug_assert!(position.x() < self.resolution.width(), "x coordinate out of bounds");
        debug_assert!(channel < self.channel_count(), "channel index out of bounds");

        self.samples[
            (position.y() * self.resolution.width() + position.x()) * self.channel_count()
                + channel
        ]
    }
}


/// Read an image from the exr file at the specified path.
/// Use `read_from_buffered` instead if you do not have a file path.
#[must_use]
pub fn read_from_file(path: impl AsRef<std::path::Path>) -> Result<FlatImage> {
    read_from_buffered(BufReader::new(File::open(path)?))
}

/// Read an image from any seekable byte source, for example an in-memory cursor.
/// If your reader is a file, wrap it into a `BufReader` first, or use `read_from_file`.
#[must_use]
pub fn read_from_buffered(buffered: impl Read + Seek) -> Result<FlatImage> {
    let mut read = PeekRead::new(Tracking::new(buffered));

    let meta_data = MetaData::read_from_buffered_peekable(&mut read)?;
    let offset_table = MetaData::read_offset_table(&mut read, &meta_data.header)?;

    let header = &meta_data.header;
    let resolution = header.data_size();
    let channel_count = header.channels.list.len();
    let lines_per_block = header.compression.scan_lines_per_block();

    // scan lines not referenced by the offset table remain zero
    let mut samples = vec![ 0.0_f32; resolution.area() * channel_count ];

    // the offsets may appear in any order in the table,
    // so the blocks are located by seeking, not by reading consecutively
    for offset in offset_table {
        read.skip_to(u64_to_usize(offset, "chunk offset")?)?;
        let chunk = ScanLineChunk::read(&mut read, header.max_block_byte_size())?;

        // the file stores absolute coordinates, but we need index into the pixel array
        let block_start_y = chunk.y_coordinate - header.data_window.position.y();
        if block_start_y < 0 { return Err(Error::invalid("scan block y coordinate")); }

        let block_start_y = block_start_y as usize;
        if block_start_y >= resolution.height() { return Err(Error::invalid("scan block y coordinate")); }

        // the last block of the image may contain fewer scan lines
        let block_height = lines_per_block.min(resolution.height() - block_start_y);
        let expected_byte_size = block_height * header.scan_line_byte_size();

        let pixel_bytes = header.compression
            .decompress_scan_line_block(chunk.compressed_pixels, expected_byte_size)?;

        // each scan line stores all samples of the first channel,
        // then all samples of the next channel, and so on
        let mut pixel_bytes = pixel_bytes.as_slice();
        let mut line_samples = vec![ 0.0_f32; resolution.width() ];

        for line_index in 0 .. block_height {
            let y = block_start_y + line_index;

            for channel_index in 0 .. channel_count {
                f32::read_slice(&mut pixel_bytes, &mut line_samples)?;

                for (x, &sample) in line_samples.iter().enumerate() {
                    samples[(y * resolution.width() + x) * channel_count + channel_index] = sample;
                }
            }
        }
    }

    Ok(FlatImage {
        resolution,
        channels: meta_data.header.channels.clone(),
        samples,
        meta_data,
    })
}
