
//! Error type definitions.

use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::ErrorKind;

/// A result that may contain a decoding error.
pub type Result<T> = std::result::Result<T, Error>;

/// A result that, if ok, contains nothing, and otherwise contains a decoding error.
pub type UnitResult = Result<()>;

/// An error that occurred while reading or writing raw bytes.
pub type IoResult<T> = std::io::Result<T>;

/// An error that may happen while decoding an exr file.
/// Distinguishes between three types of errors:
/// unsupported features, invalid data, and file system errors.
#[derive(Debug)]
pub enum Error {

    /// The bytes are not an exr file of a supported version:
    /// the magic number or the format version byte did not match.
    Format(Cow<'static, str>),

    /// The header contains an attribute with a type tag
    /// that this crate cannot decode. Contains the type tag.
    /// As the byte layout of an unknown attribute cannot be known,
    /// the rest of the header cannot be located, and parsing must stop.
    UnsupportedAttributeType(String),

    /// The header does not contain one of the attributes
    /// that are required for decoding pixel data.
    MissingAttribute(&'static str),

    /// The compression is not a known method,
    /// or a known method without an implemented decompressor.
    UnsupportedCompression(Cow<'static, str>),

    /// A decompressed scan-line block does not contain
    /// the byte count implied by the channel list and image width.
    CorruptPixelData(Cow<'static, str>),

    /// The contents of the file are not supported by
    /// this specific implementation of open exr,
    /// even though the data may be valid.
    NotSupported(Cow<'static, str>),

    /// The contents of the file are contradicting or insufficient.
    /// Also returned for `ErrorKind::UnexpectedEof` errors.
    Invalid(Cow<'static, str>),

    /// The underlying byte stream could not be read successfully,
    /// probably due to file system related errors.
    Io(std::io::Error),
}


impl Error {

    /// Create an error of the variant `Format`.
    pub(crate) fn format(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Format(message.into())
    }

    /// Create an error of the variant `Invalid`.
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Invalid(message.into())
    }

    /// Create an error of the variant `NotSupported`.
    pub(crate) fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Error::NotSupported(message.into())
    }

    /// Create an error of the variant `UnsupportedCompression`.
    pub(crate) fn unsupported_compression(message: impl Into<Cow<'static, str>>) -> Self {
        Error::UnsupportedCompression(message.into())
    }

    /// Create an error of the variant `CorruptPixelData`.
    pub(crate) fn corrupt_pixels(message: impl Into<Cow<'static, str>>) -> Self {
        Error::CorruptPixelData(message.into())
    }
}

/// Enable using the `?` operator on `std::io::Result`.
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == ErrorKind::UnexpectedEof {
            Error::invalid("reference to missing bytes")
        }
        else {
            Error::Io(error)
        }
    }
}

/// Enable using the `?` operator on `TryFrom` integer conversions.
impl From<std::num::TryFromIntError> for Error {
    fn from(_: std::num::TryFromIntError) -> Self {
        Error::invalid("invalid size")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref error) => Some(error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Error::Format(ref message) => write!(formatter, "invalid exr file: {}", message),
            Error::UnsupportedAttributeType(ref kind) => write!(formatter, "unsupported attribute type `{}`", kind),
            Error::MissingAttribute(name) => write!(formatter, "missing or invalid `{}` attribute", name),
            Error::UnsupportedCompression(ref message) => write!(formatter, "unsupported compression: {}", message),
            Error::CorruptPixelData(ref message) => write!(formatter, "corrupt pixel data: {}", message),
            Error::NotSupported(ref message) => write!(formatter, "not supported: {}", message),
            Error::Invalid(ref message) => write!(formatter, "invalid content: {}", message),
            Error::Io(ref error) => write!(formatter, "io error: {}", error),
        }
    }
}


/// Convert a `u64` to a `usize`, returning `Error::Invalid` where it does not fit.
pub(crate) fn u64_to_usize(value: u64, error_message: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::invalid(error_message))
}

/// Convert an `i32` to a `usize`, returning `Error::Invalid` for negative numbers.
pub(crate) fn i32_to_usize(value: i32, error_message: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::invalid(error_message))
}

/// Convert a `usize` to an `i32`, returning `Error::Invalid` where it does not fit.
pub(crate) fn usize_to_i32(value: usize, error_message: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::invalid(error_message))
}
