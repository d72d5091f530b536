//! Display definition segment (clause 7.2.1, segment type `0x14`).

use crate::error::{bail, DecodeError, Result};
use crate::model::{DecoderState, DisplayDefinition, Window};

/// Parse a display definition segment body. A no-op if `version` matches
/// the currently stored definition (bytewise dedup, ETSI clause 7.2.1).
pub(crate) fn parse(data: &[u8], state: &mut DecoderState) -> Result<()> {
    if data.len() < 5 {
        bail!(DecodeError::TruncatedSegment);
    }

    let info_byte = data[0];
    let version = i16::from(info_byte >> 4);

    if version == state.display_def.version {
        return Ok(());
    }

    let width = u16::from_be_bytes([data[1], data[2]]) + 1;
    let height = u16::from_be_bytes([data[3], data[4]]) + 1;

    let window = if info_byte & 0x08 != 0 && data.len() >= 13 {
        let x = u16::from_be_bytes([data[5], data[6]]);
        let y = u16::from_be_bytes([data[7], data[8]]);
        let end_x = u16::from_be_bytes([data[9], data[10]]);
        let end_y = u16::from_be_bytes([data[11], data[12]]);
        Some(Window {
            x,
            y,
            width: end_x - x + 1,
            height: end_y - y + 1,
        })
    } else {
        None
    };

    state.display_def = DisplayDefinition {
        version,
        width,
        height,
        window,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_definition_is_applied() {
        let mut state = DecoderState::default();
        let data = [0x00, 0x02, 0xCF, 0x02, 0x3F]; // 719+1=720, 575+1=576
        parse(&data, &mut state).unwrap();
        assert_eq!(state.display_def.version, 0);
        assert_eq!(state.display_def.width, 720);
        assert_eq!(state.display_def.height, 576);
    }

    #[test]
    fn repeated_version_is_a_no_op() {
        let mut state = DecoderState::default();
        let data = [0x00, 0x02, 0xCF, 0x02, 0x3F];
        parse(&data, &mut state).unwrap();
        parse(&[0x00, 0x00, 0x00, 0x00, 0x00], &mut state).unwrap();
        assert_eq!(state.display_def.width, 720);
    }

    #[test]
    fn window_flag_adds_window() {
        let mut state = DecoderState::default();
        let data = [
            0x08, 0x02, 0xCF, 0x02, 0x3F, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x63, 0x00, 0x4D,
        ];
        parse(&data, &mut state).unwrap();
        let window = state.display_def.window.unwrap();
        assert_eq!(window.x, 10);
        assert_eq!(window.y, 10);
        assert_eq!(window.width, 90);
        assert_eq!(window.height, 68);
    }
}
