//! Page composition segment (clause 7.2.1, segment type `0x10`).

use crate::error::{bail, DecodeError, Result};
use crate::model::{DecoderState, RegionDisplay};

/// Parse a page composition segment body and rebuild `state.region_displays`.
///
/// `page_state == 2` ("mode change") wipes regions, objects and CLUTs
/// before the new display list is built; `display_def` and
/// `page_time_out` survive the wipe.
pub(crate) fn parse(data: &[u8], state: &mut DecoderState) -> Result<()> {
    if data.len() < 2 {
        bail!(DecodeError::TruncatedSegment);
    }

    state.page_time_out = data[0];
    let page_state = (data[1] >> 2) & 0b11;

    if page_state == 2 {
        #[cfg(feature = "logging")]
        log::debug!(target: "dvbsub::page", "mode change: resetting regions, objects, CLUTs");
        state.mode_change_reset();
    }

    let mut region_displays = Vec::new();
    let mut rest = &data[2..];

    while rest.len() >= 6 {
        let region_id = rest[0];
        let x_pos = u16::from_be_bytes([rest[2], rest[3]]);
        let y_pos = u16::from_be_bytes([rest[4], rest[5]]);
        region_displays.push(RegionDisplay {
            region_id,
            x_pos,
            y_pos,
        });
        rest = &rest[6..];
    }

    state.region_displays = region_displays;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_page_sets_timeout_and_empty_regions() {
        let mut state = DecoderState::default();
        // page_time_out=5, page_state=0
        parse(&[0x05, 0x00], &mut state).unwrap();
        assert_eq!(state.page_time_out, 5);
        assert!(state.region_displays.is_empty());
    }

    #[test]
    fn mode_change_wipes_prior_regions() {
        let mut state = DecoderState::default();
        state.region_for_composition(0, 4, 4, 2, 0, 0);
        parse(&[0x05, 0b1000], &mut state).unwrap();
        assert!(state.get_region(0).is_none());
    }

    #[test]
    fn one_region_display_record() {
        let mut state = DecoderState::default();
        let data = [0x05, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x14];
        parse(&data, &mut state).unwrap();
        assert_eq!(state.region_displays.len(), 1);
        assert_eq!(state.region_displays[0].region_id, 0);
        assert_eq!(state.region_displays[0].x_pos, 10);
        assert_eq!(state.region_displays[0].y_pos, 20);
    }
}
