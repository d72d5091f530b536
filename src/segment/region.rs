//! Region composition segment (clause 7.2.1, segment type `0x11`).

use crate::error::{bail, DecodeError, Result};
use crate::model::{DecoderState, ObjectKind};
use crate::reader::BitReader;

/// Parse a region composition segment body: region geometry/fill, then a
/// run of 6- or 8-byte object-display records.
pub(crate) fn parse(data: &[u8], state: &mut DecoderState) -> Result<()> {
    if data.len() < 9 {
        bail!(DecodeError::TruncatedSegment);
    }

    let region_id = data[0];
    let fill_flag = (data[1] >> 3) & 1 != 0;
    let width = u16::from_be_bytes([data[2], data[3]]);
    let height = u16::from_be_bytes([data[4], data[5]]);
    let depth_enc = (data[6] >> 2) & 0b111;
    let depth = match 1_u8.checked_shl(u32::from(depth_enc)) {
        Some(d @ (2 | 4 | 8)) => d,
        _ => {
            #[cfg(feature = "logging")]
            log::warn!(target: "dvbsub::region", "region {region_id} depth_enc {depth_enc} invalid, clamping to 4");
            4
        }
    };
    let clut_id = data[7];
    let bgcolor_byte = data[8];
    let bgcolor = match depth {
        8 => bgcolor_byte,
        4 => (bgcolor_byte >> 4) & 0x0F,
        _ => (bgcolor_byte >> 6) & 0x03,
    };

    let (region, resized) =
        state.region_for_composition(region_id, width, height, depth, clut_id, bgcolor);

    if fill_flag || resized {
        region.fill(bgcolor);
    }

    state.teardown_region_displays(region_id);

    let mut rest = &data[9..];
    while rest.len() >= 6 {
        let object_id = u16::from_be_bytes([rest[0], rest[1]]);

        let mut reader = BitReader::new(&rest[2..4]);
        let kind = ObjectKind::from_bits(reader.take(2) as u8);
        let x_pos = reader.take(12) as u16;

        let y_pos = u16::from_be_bytes([rest[4], rest[5]]) & 0x0FFF;

        let needs_colors = matches!(kind, ObjectKind::String | ObjectKind::StringWithBgcolor);
        let (fgcolor, bgcolor, consumed) = if needs_colors && rest.len() >= 8 {
            (Some(rest[6]), Some(rest[7]), 8)
        } else {
            (None, None, 6)
        };

        state.link_object_display(region_id, object_id, kind, x_pos, y_pos, fgcolor, bgcolor);
        rest = &rest[consumed..];
    }

    Ok(())
}
