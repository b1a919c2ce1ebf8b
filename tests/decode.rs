
//! Decode complete files that are composed byte by byte in memory.

use std::collections::HashMap;
use std::io::Cursor;

use flatexr::prelude::*;
use flatexr::chunk::ScanLineChunk;
use flatexr::error::Error;
use flatexr::io::Data;
use flatexr::meta::{magic_number, sequence_end, Requirements};
use flatexr::meta::attribute::{
    self, AttributeValue, ChannelDescription, ChannelList, IntegerBounds,
    LineOrder, SampleType, Text,
};
use flatexr::meta::header::Header;

use smallvec::smallvec;


fn rgb_channels() -> ChannelList {
    ChannelList::new(smallvec![
        ChannelDescription::new(Text::from("B"), SampleType::F32, false),
        ChannelDescription::new(Text::from("G"), SampleType::F32, false),
        ChannelDescription::new(Text::from("R"), SampleType::F32, false),
    ])
}

fn example_header(data_window: IntegerBounds, compression: Compression) -> Header {
    Header {
        channels: rgb_channels(),
        compression,
        data_window,
        line_order: LineOrder::Increasing,
        chunk_count: flatexr::meta::header::compute_chunk_count(compression, data_window.size),
        custom_attributes: HashMap::new(),
    }
}

/// Serialize a complete scan line file. Each block contains
/// one scan line of `width * channel_count` samples, stored channel-major.
fn write_file(header: &Header, blocks: &[(i32, Vec<f32>)]) -> Vec<u8> {
    let mut bytes = Vec::new();

    magic_number::write(&mut bytes).unwrap();
    Requirements::default_scan_line_file().write(&mut bytes).unwrap();
    header.write(&mut bytes).unwrap();

    // serialize all chunks first to know their byte positions
    let chunks: Vec<Vec<u8>> = blocks.iter()
        .map(|(y_coordinate, samples)| {
            let mut pixel_bytes = Vec::new();
            f32::write_slice(&mut pixel_bytes, samples).unwrap();

            let mut chunk_bytes = Vec::new();
            ScanLineChunk { y_coordinate: *y_coordinate, compressed_pixels: pixel_bytes }
                .write(&mut chunk_bytes).unwrap();

            chunk_bytes
        })
        .collect();

    // the offset table references the chunks by absolute byte position
    let mut offset = bytes.len() + chunks.len() * u64::BYTE_SIZE;
    for chunk_bytes in &chunks {
        (offset as u64).write(&mut bytes).unwrap();
        offset += chunk_bytes.len();
    }

    for chunk_bytes in &chunks {
        bytes.extend_from_slice(chunk_bytes);
    }

    bytes
}


#[test]
fn decode_tiny_image(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 2)),
        Compression::Uncompressed
    );

    let bytes = write_file(&header, &[
        //  [B0, B1,   G0, G1,   R0, R1]
        (0, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
        (1, vec![ 5.5, 6.6,  3.3, 4.4,  1.1, 2.2 ]),
    ]);

    let image = read_from_buffered(Cursor::new(bytes)).unwrap();

    assert_eq!(image.resolution, Vec2(2, 2));
    assert_eq!(image.channel_count(), 3);

    // channels are ordered alphabetically: B, G, R
    assert_eq!(image.channels.list[0].name, Text::from("B"));
    assert_eq!(image.channels.list[2].name, Text::from("R"));

    assert_eq!(image.sample(Vec2(0, 0), 0), 0.5); // B
    assert_eq!(image.sample(Vec2(1, 0), 1), 0.4); // G
    assert_eq!(image.sample(Vec2(0, 1), 2), 1.1); // R
    assert_eq!(image.sample(Vec2(1, 1), 0), 6.6); // B

    assert_eq!(image.samples, vec![
        0.5, 0.3, 0.1,   0.6, 0.4, 0.2,
        5.5, 3.3, 1.1,   6.6, 4.4, 2.2,
    ]);
}

#[test]
fn decode_single_channel_image(){
    let header = Header {
        channels: ChannelList::new(smallvec![
            ChannelDescription::new(Text::from("Y"), SampleType::F32, false),
        ]),
        compression: Compression::Uncompressed,
        data_window: IntegerBounds::new(Vec2(0, 0), Vec2(2, 2)),
        line_order: LineOrder::Increasing,
        chunk_count: 2,
        custom_attributes: HashMap::new(),
    };

    let bytes = write_file(&header, &[
        (0, vec![ 1.0, 2.0 ]),
        (1, vec![ 3.0, 4.0 ]),
    ]);

    let image = read_from_buffered(Cursor::new(bytes)).unwrap();
    assert_eq!(image.resolution, Vec2(2, 2));
    assert_eq!(image.samples, vec![ 1.0, 2.0, 3.0, 4.0 ]);
}

#[test]
fn offset_order_is_irrelevant(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 2)),
        Compression::Uncompressed
    );

    let lines = [
        (0, vec![ 0.5_f32, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
        (1, vec![ 5.5_f32, 6.6,  3.3, 4.4,  1.1, 2.2 ]),
    ];

    // store the bottom scan line before the top scan line.
    // the offset table still references each block correctly
    let reversed = [ lines[1].clone(), lines[0].clone() ];

    let straight = read_from_buffered(Cursor::new(write_file(&header, &lines))).unwrap();
    let shuffled = read_from_buffered(Cursor::new(write_file(&header, &reversed))).unwrap();

    assert_eq!(straight.samples, shuffled.samples);
}

#[test]
fn decode_positioned_data_window(){
    // a data window that does not start at the origin.
    // chunk coordinates are absolute, not zero-based
    let header = example_header(
        IntegerBounds::new(Vec2(-2, 10), Vec2(2, 2)),
        Compression::Uncompressed
    );

    let bytes = write_file(&header, &[
        (10, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
        (11, vec![ 5.5, 6.6,  3.3, 4.4,  1.1, 2.2 ]),
    ]);

    let image = read_from_buffered(Cursor::new(bytes)).unwrap();
    assert_eq!(image.sample(Vec2(0, 1), 0), 5.5);
}

#[test]
fn rejects_block_above_data_window(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 10), Vec2(2, 2)),
        Compression::Uncompressed
    );

    let bytes = write_file(&header, &[
        (9, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
        (11, vec![ 5.5, 6.6,  3.3, 4.4,  1.1, 2.2 ]),
    ]);

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::Invalid(_))));
}

#[test]
fn rejects_wrong_magic_number(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 1)),
        Compression::Uncompressed
    );

    let mut bytes = write_file(&header, &[
        (0, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
    ]);

    bytes[..4].copy_from_slice(&[0, 0, 0, 0]);

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::Format(_))));
}

#[test]
fn rejects_wrong_version_byte(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 1)),
        Compression::Uncompressed
    );

    let mut bytes = write_file(&header, &[
        (0, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
    ]);

    // version 0x12 shares its low bits with version 2,
    // but is a different version number
    bytes[4] = 0x12;

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::Format(_))));
}

#[test]
fn rejects_compressed_pixel_data(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 2)),
        Compression::PIZ
    );

    // one block contains the whole image for piz compression.
    // the payload is nonsense, but must not even be inspected
    let bytes = write_file(&header, &[
        (0, vec![ 0.0; 12 ]),
    ]);

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::UnsupportedCompression(_))));
}

#[test]
fn rejects_short_pixel_payload(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 2)),
        Compression::Uncompressed
    );

    // the second block contains fewer bytes than one scan line requires
    let bytes = write_file(&header, &[
        (0, vec![ 0.5, 0.6,  0.3, 0.4,  0.1, 0.2 ]),
        (1, vec![ 5.5, 6.6,  3.3 ]),
    ]);

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::CorruptPixelData(_))));
}

#[test]
fn rejects_tiled_files(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(2, 1)),
        Compression::Uncompressed
    );

    let mut bytes = Vec::new();
    magic_number::write(&mut bytes).unwrap();

    let requirements = Requirements {
        is_single_layer_and_tiled: true,
        .. Requirements::default_scan_line_file()
    };

    requirements.write(&mut bytes).unwrap();
    header.write(&mut bytes).unwrap();

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::NotSupported(_))));
}

#[test]
fn rejects_missing_required_attribute(){
    let mut bytes = Vec::new();
    magic_number::write(&mut bytes).unwrap();
    Requirements::default_scan_line_file().write(&mut bytes).unwrap();

    // a header without the data window
    let channels = AttributeValue::ChannelList(rgb_channels());
    attribute::write(b"channels", &channels, &mut bytes).unwrap();
    attribute::write(b"compression", &AttributeValue::Compression(Compression::Uncompressed), &mut bytes).unwrap();
    sequence_end::write(&mut bytes).unwrap();

    let result = read_from_buffered(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::MissingAttribute("dataWindow"))));
}

#[test]
fn rejects_string_vector_attribute(){
    let mut bytes = Vec::new();
    magic_number::write(&mut bytes).unwrap();
    Requirements::default_scan_line_file().write(&mut bytes).unwrap();

    Text::from("multiView").write_null_terminated(&mut bytes).unwrap();
    Text::from("stringvector").write_null_terminated(&mut bytes).unwrap();
    9_i32.write(&mut bytes).unwrap();
    5_i32.write(&mut bytes).unwrap();
    u8::write_slice(&mut bytes, b"right").unwrap();

    let result = read_from_buffered(Cursor::new(bytes));
    match result {
        Err(Error::UnsupportedAttributeType(kind)) => assert_eq!(kind, "stringvector"),
        other => panic!("expected unsupported attribute type error, found {:?}", other),
    }
}

#[test]
fn meta_data_only(){
    let header = example_header(
        IntegerBounds::new(Vec2(0, 0), Vec2(7, 3)),
        Compression::Uncompressed
    );

    let mut bytes = Vec::new();
    magic_number::write(&mut bytes).unwrap();
    Requirements::default_scan_line_file().write(&mut bytes).unwrap();
    header.write(&mut bytes).unwrap();

    let meta_data = MetaData::read_from_buffered(bytes.as_slice()).unwrap();
    assert_eq!(meta_data.header, header);
    assert_eq!(meta_data.header.chunk_count, 3);
}
