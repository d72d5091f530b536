//! Error types for DVB subtitle decoding.

use core::fmt;

/// The main error type for DVB subtitle decoding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// First three bytes of the input were not the PES start code `00 00 01`.
    NotPes,
    /// `stream_id` was not `0xBD` (private_stream_1).
    WrongStreamId,
    /// The buffer is shorter than the declared `PES_packet_length`; the
    /// caller should retry after supplying more bytes.
    NeedMoreData,
    /// Data-identifier or subtitle-stream-id did not match the expected
    /// constants (`0x20`, `0x00`).
    NotDvbSubtitle,
    /// A segment's declared length runs past the end of the buffer.
    TruncatedSegment,
    /// A segment type outside the accepted set (logged and skipped by the
    /// caller, not necessarily fatal).
    UnknownSegment(u8),
    /// A pixel-data block or region parameter was malformed.
    MalformedPixelStream(PixelError),
}

/// Specific ways a pixel-data block or region definition can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelError {
    /// A run-length code declared more pixels than remain on the row.
    RunExceedsRow,
    /// `depth_flags` in a CLUT entry had no bits set.
    EmptyDepthFlags,
    /// `coding_method` was `1` (character strings), which this decoder
    /// does not implement.
    UnsupportedCoding,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPes => write!(f, "not a PES packet (missing 00 00 01 start code)"),
            Self::WrongStreamId => write!(f, "stream_id is not 0xBD (private_stream_1)"),
            Self::NeedMoreData => write!(f, "buffer shorter than declared PES_packet_length"),
            Self::NotDvbSubtitle => write!(f, "data-identifier/subtitle-stream-id mismatch"),
            Self::TruncatedSegment => write!(f, "segment length runs past end of buffer"),
            Self::UnknownSegment(ty) => write!(f, "unknown segment type 0x{ty:02x}"),
            Self::MalformedPixelStream(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunExceedsRow => write!(f, "pixel run exceeds remaining row length"),
            Self::EmptyDepthFlags => write!(f, "CLUT entry depth_flags has no bits set"),
            Self::UnsupportedCoding => write!(f, "coding_method 1 (character strings) unsupported"),
        }
    }
}

impl core::error::Error for DecodeError {}
impl core::error::Error for PixelError {}

impl From<PixelError> for DecodeError {
    fn from(e: PixelError) -> Self {
        Self::MalformedPixelStream(e)
    }
}

/// Result type for DVB subtitle decoding operations.
pub type Result<T> = core::result::Result<T, DecodeError>;

macro_rules! bail {
    ($err:expr) => {
        return Err($err.into())
    };
}

macro_rules! err {
    ($err:expr) => {
        Err($err.into())
    };
}

pub(crate) use bail;
pub(crate) use err;
