//! Segment framing and dispatch (clause 7.2: "PES data field").
//!
//! Every segment is `sync_byte(0x0F) segment_type(8) page_id(16) length(16)
//! data[length]`. Segment-body errors are logged and the segment is
//! skipped; only framing errors (bad sync, declared length overruns the
//! buffer) abort the enclosing PES packet.

pub(crate) mod clut;
pub(crate) mod display_definition;
pub(crate) mod object;
pub(crate) mod page;
pub(crate) mod region;

use crate::error::{bail, DecodeError, Result};
use crate::model::DecoderState;
use crate::reader::BitReader;

const SYNC_BYTE: u8 = 0x0F;

const PAGE_COMPOSITION: u8 = 0x10;
const REGION_COMPOSITION: u8 = 0x11;
const CLUT_DEFINITION: u8 = 0x12;
const OBJECT_DATA: u8 = 0x13;
const DISPLAY_DEFINITION: u8 = 0x14;
const END_OF_DISPLAY_SET: u8 = 0x80;
const STUFFING: u8 = 0xFF;

/// What the caller (the stream demux loop) should do after one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentOutcome {
    Continue,
    EndOfDisplaySet,
}

/// Parse one segment's framing and dispatch its body, advancing `reader`
/// past the whole segment (header + declared-length data) regardless of
/// whether the body parsed cleanly.
pub(crate) fn parse_and_dispatch(
    reader: &mut BitReader<'_>,
    state: &mut DecoderState,
) -> Result<SegmentOutcome> {
    debug_assert_eq!(reader.position_bits() % 8, 0);

    let sync = reader.read_u8();
    if sync != SYNC_BYTE {
        bail!(DecodeError::TruncatedSegment);
    }

    let segment_type = reader.read_u8();
    let _page_id = reader.read_u16();
    let length = usize::from(reader.read_u16());

    if reader.tail().len() < length {
        bail!(DecodeError::TruncatedSegment);
    }
    let body = reader.read_bytes(length);

    let result = match segment_type {
        PAGE_COMPOSITION => page::parse(body, state),
        REGION_COMPOSITION => region::parse(body, state),
        CLUT_DEFINITION => clut::parse(body, state),
        OBJECT_DATA => object::parse(body, state),
        DISPLAY_DEFINITION => display_definition::parse(body, state),
        END_OF_DISPLAY_SET => return Ok(SegmentOutcome::EndOfDisplaySet),
        STUFFING => Ok(()),
        other => Err(DecodeError::UnknownSegment(other)),
    };

    if let Err(_e) = result {
        #[cfg(feature = "logging")]
        match _e {
            DecodeError::UnknownSegment(_) => {
                log::warn!(target: "dvbsub::segment", "{_e}");
            }
            _ => {
                log::warn!(target: "dvbsub::segment", "segment type 0x{segment_type:02x} malformed: {_e}");
            }
        }
    }

    Ok(SegmentOutcome::Continue)
}
