
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Decode simple scan line based OpenEXR files
//! into a flat array of `f32` pixel samples.

pub mod io;
pub mod math;
pub mod chunk;
pub mod compression;
pub mod meta;
pub mod image;
pub mod error;

#[macro_use]
extern crate smallvec;


/// Exports of the most commonly used items of this crate.
pub mod prelude {

    // main exports
    pub use crate::image::{FlatImage, read_from_file, read_from_buffered};
    pub use crate::meta::MetaData;

    // secondary data types
    pub use crate::meta;
    pub use crate::meta::attribute;
    pub use crate::compression::Compression;
    pub use crate::error::{Error, Result};
    pub use crate::math::Vec2;
}
