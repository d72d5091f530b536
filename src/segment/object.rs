//! Object data segment (clause 7.2.1, segment type `0x13`).

use crate::error::{bail, DecodeError, PixelError, Result};
use crate::model::DecoderState;
use crate::pixel_block::{self, Field};
use crate::reader::BitReader;

/// Parse an object data segment body and render its pixel-data subblocks
/// into every region that displays this object.
pub(crate) fn parse(data: &[u8], state: &mut DecoderState) -> Result<()> {
    if data.len() < 3 {
        bail!(DecodeError::TruncatedSegment);
    }

    let object_id = u16::from_be_bytes([data[0], data[1]]);

    let Some(object) = state.get_object(object_id) else {
        #[cfg(feature = "logging")]
        log::debug!(target: "dvbsub::object", "object data for unknown object {object_id}");
        return Ok(());
    };
    let display_ids = object.display_list.clone();

    let mut reader = BitReader::new(&data[2..3]);
    let coding_method = reader.take(2) as u8;
    let non_modifying_color = reader.take_bit() != 0;

    if coding_method != 0 {
        bail!(DecodeError::MalformedPixelStream(PixelError::UnsupportedCoding));
    }

    if data.len() < 7 {
        bail!(DecodeError::TruncatedSegment);
    }

    let top_field_len = u16::from_be_bytes([data[3], data[4]]) as usize;
    let bottom_field_len = u16::from_be_bytes([data[5], data[6]]) as usize;

    let fields_start = 7;
    let top = data.get(fields_start..fields_start + top_field_len).unwrap_or(&[]);
    // No bottom field: reuse the top slice (the documented optimization for
    // progressive content carried as a single field).
    let bottom = if bottom_field_len > 0 {
        let start = fields_start + top_field_len;
        data.get(start..start + bottom_field_len).unwrap_or(&[])
    } else {
        top
    };

    for display_id in display_ids {
        let Some(display) = state.get_display(display_id).copied() else {
            continue;
        };
        let Some(region) = state.get_region_mut(display.region_id) else {
            continue;
        };

        pixel_block::interpret(
            top,
            region,
            display.x_pos,
            display.y_pos,
            Field::Top,
            non_modifying_color,
        )?;
        pixel_block::interpret(
            bottom,
            region,
            display.x_pos,
            display.y_pos,
            Field::Bottom,
            non_modifying_color,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectKind;

    #[test]
    fn unknown_object_is_a_no_op() {
        let mut state = DecoderState::default();
        let data = [0x00, 0x01, 0b000_00000, 0x00, 0x00, 0x00, 0x00];
        assert!(parse(&data, &mut state).is_ok());
    }

    #[test]
    fn known_object_renders_into_linked_region() {
        let mut state = DecoderState::default();
        state.region_for_composition(0, 4, 4, 2, 0, 0);
        state.link_object_display(0, 1, ObjectKind::Bitmap, 0, 0, None, None);

        // object_id=1, coding_method=0, non_mod=0; top_field_len=1, bottom=0
        // (reuse top); pixel subblock: opcode 0x10, then a 2-bit string "01".
        let data = [
            0x00, 0x01, 0b000_00000, 0x00, 0x02, 0x00, 0x00, 0x10, 0b01_00_00_00,
        ];
        parse(&data, &mut state).unwrap();

        let region = state.get_region(0).unwrap();
        // top field at y=0, bottom field reused at y=1 (top_bottom adjust).
        assert_eq!(region.pbuf[0], 1);
        assert_eq!(region.pbuf[4], 1);
    }

    #[test]
    fn unsupported_coding_method_is_an_error() {
        let mut state = DecoderState::default();
        state.region_for_composition(0, 2, 2, 2, 0, 0);
        state.link_object_display(0, 1, ObjectKind::Bitmap, 0, 0, None, None);

        let data = [0x00, 0x01, 0b010_00000, 0x00, 0x00, 0x00, 0x00];
        assert!(parse(&data, &mut state).is_err());
    }

    #[test]
    fn unknown_object_with_unsupported_coding_is_a_no_op() {
        // object_id=1 was never registered: the existence check must win
        // over the coding_method check, per clause 7.2.1's "if object is
        // unknown, log and skip" ordering.
        let mut state = DecoderState::default();
        let data = [0x00, 0x01, 0b010_00000, 0x00, 0x00, 0x00, 0x00];
        assert!(parse(&data, &mut state).is_ok());
    }
}
