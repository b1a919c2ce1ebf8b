
//! A scan line chunk is a compressed batch of scan lines,
//! stored somewhere in the file and referenced by the offset table.

use crate::io::*;
use crate::error::{Error, Result, UnitResult};


/// One scan line block of pixel data, possibly compressed.
/// Does not contain the decoded values,
/// but the raw bytes as they appear in the file.
#[derive(Debug, Clone)]
pub struct ScanLineChunk {

    /// The y coordinate of the first scan line in this block,
    /// in the coordinate system of the data window.
    pub y_coordinate: i32,

    /// The possibly compressed pixel data of all scan lines in this block.
    pub compressed_pixels: Vec<u8>,
}

impl ScanLineChunk {

    /// Without validation, write this instance to the byte stream.
    pub fn write<W: Write>(&self, write: &mut W) -> UnitResult {
        self.y_coordinate.write(write)?;
        u8::write_i32_sized_slice(write, &self.compressed_pixels)?;
        Ok(())
    }

    /// Read the chunk, without validating the contained pixel bytes.
    /// A declared payload size larger than `max_block_byte_size` is
    /// treated as a sign of file corruption.
    pub fn read(read: &mut impl Read, max_block_byte_size: usize) -> Result<Self> {
        let y_coordinate = i32::read(read)?;

        let compressed_pixels = u8::read_i32_sized_vec(
            read, max_block_byte_size, Some(max_block_byte_size),
            "scan line block size"
        ).map_err(|error| match error {
            Error::Invalid(_) => Error::corrupt_pixels("scan line block size"),
            other => other,
        })?;

        Ok(ScanLineChunk { y_coordinate, compressed_pixels })
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chunk_write_read_roundtrip(){
        let chunk = ScanLineChunk {
            y_coordinate: -3,
            compressed_pixels: (0..48).collect(),
        };

        let mut bytes = Vec::new();
        chunk.write(&mut bytes).unwrap();

        let decoded = ScanLineChunk::read(&mut bytes.as_slice(), 64).unwrap();
        assert_eq!(decoded.y_coordinate, -3);
        assert_eq!(decoded.compressed_pixels, chunk.compressed_pixels);
    }

    #[test]
    fn oversized_chunk_is_rejected(){
        let chunk = ScanLineChunk {
            y_coordinate: 0,
            compressed_pixels: vec![0; 128],
        };

        let mut bytes = Vec::new();
        chunk.write(&mut bytes).unwrap();

        let result = ScanLineChunk::read(&mut bytes.as_slice(), 64);
        assert!(matches!(result, Err(Error::CorruptPixelData(_))));
    }

    #[test]
    fn truncated_chunk_is_rejected(){
        let chunk = ScanLineChunk {
            y_coordinate: 0,
            compressed_pixels: vec![0; 48],
        };

        let mut bytes = Vec::new();
        chunk.write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 10);

        assert!(ScanLineChunk::read(&mut bytes.as_slice(), 64).is_err());
    }
}
