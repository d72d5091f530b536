//! Pixel-data subblock opcode dispatch (clause 7.2.5.1, "2-bit/4-bit/8-bit
//! pixel-data sub-block").
//!
//! A pixel-data subblock is a sequence of opcodes interleaved with the
//! run-length strings and map-table updates they introduce. Fields are
//! rendered top-to-bottom, two at a time (interlaced), which is why a
//! single subblock only ever writes either the even or the odd rows of
//! its object's bounding box.

use crate::error::{PixelError, Result};
use crate::model::Region;
use crate::pixel_run;
use crate::reader::BitReader;

pub(crate) const MAP_2TO4_DEFAULT: [u8; 4] = [0x0, 0x7, 0x8, 0xF];
pub(crate) const MAP_2TO8_DEFAULT: [u8; 4] = [0x00, 0x77, 0x88, 0xFF];

const fn build_map4to8_default() -> [u8; 16] {
    let mut table = [0_u8; 16];
    let mut i = 0;
    while i < 16 {
        table[i] = (i as u8) * 0x11;
        i += 1;
    }
    table
}

pub(crate) const MAP_4TO8_DEFAULT: [u8; 16] = build_map4to8_default();

#[derive(Debug, Clone, Copy)]
pub(crate) enum Field {
    Top,
    Bottom,
}

/// Interpret one pixel-data subblock, writing into `region.pbuf` at the
/// position given by `(x_pos, y_pos)`.
pub(crate) fn interpret(
    data: &[u8],
    region: &mut Region,
    x_pos: u16,
    y_pos: u16,
    field: Field,
    non_modifying_color: bool,
) -> Result<()> {
    let top_bottom = match field {
        Field::Top => 0_u16,
        Field::Bottom => 1_u16,
    };

    let mut x = x_pos;
    let mut y = y_pos;
    if (y & 1) != top_bottom {
        y += 1;
    }

    let mut map2to4 = MAP_2TO4_DEFAULT;
    let mut map2to8 = MAP_2TO8_DEFAULT;
    let mut map4to8 = MAP_4TO8_DEFAULT;

    let mut reader = BitReader::new(data);

    while !reader.at_end() {
        let opcode = reader.read_u8();

        let map_table: Option<&[u8]> = match opcode {
            0x10 => match region.depth {
                8 => Some(&map2to8),
                4 => Some(&map2to4),
                _ => None,
            },
            0x11 if region.depth >= 4 => {
                if region.depth == 8 {
                    Some(&map4to8)
                } else {
                    None
                }
            }
            0x12 if region.depth >= 8 => None,
            _ => {
                if !handle_control_opcode(opcode, &mut reader, &mut x, x_pos, &mut y, &mut map2to4, &mut map2to8, &mut map4to8) {
                    break;
                }
                continue;
            }
        };

        let decode_fn: fn(&mut BitReader<'_>, &mut [u8], bool, Option<&[u8]>) -> Result<usize> =
            match opcode {
                0x10 => pixel_run::decode_2bit,
                0x11 => pixel_run::decode_4bit,
                _ => pixel_run::decode_8bit,
            };

        if !write_string(&mut reader, region, &mut x, y, non_modifying_color, map_table, decode_fn)? {
            break;
        }
    }

    Ok(())
}

/// Handle a non-pixel-string opcode. Returns `false` if the subblock must
/// stop here (clause 7.2.5.1: a depth-mismatched pixel-string opcode aborts
/// the rest of the pixel-data block, not just this opcode), `true` to keep
/// reading.
#[allow(clippy::too_many_arguments)]
fn handle_control_opcode(
    opcode: u8,
    reader: &mut BitReader<'_>,
    x: &mut u16,
    x_pos: u16,
    y: &mut u16,
    map2to4: &mut [u8; 4],
    map2to8: &mut [u8; 4],
    map4to8: &mut [u8; 16],
) -> bool {
    match opcode {
        0x20 => {
            let a = reader.read_u8();
            map2to4[0] = a >> 4;
            map2to4[1] = a & 0x0F;
            let b = reader.read_u8();
            map2to4[2] = b >> 4;
            map2to4[3] = b & 0x0F;
        }
        0x21 => {
            let bytes = reader.read_bytes(4);
            map2to8[..bytes.len()].copy_from_slice(bytes);
        }
        0x22 => {
            let bytes = reader.read_bytes(16);
            map4to8[..bytes.len()].copy_from_slice(bytes);
        }
        0xF0 => {
            *x = x_pos;
            *y += 2;
        }
        0x11 | 0x12 => {
            // depth requirement not met: the reference decoder aborts the
            // whole pixel-data block here, the same severity as an invalid
            // object location.
            #[cfg(feature = "logging")]
            log::debug!(target: "dvbsub::pixel", "pixel string opcode 0x{opcode:02x} unsupported at this region depth");
            return false;
        }
        other => {
            #[cfg(feature = "logging")]
            log::debug!(target: "dvbsub::pixel", "unknown pixel-data subblock opcode 0x{other:02x}");
            let _ = other;
        }
    }
    true
}

/// Decode one run-length string at `(x, y)` and advance `x` by the pixel
/// count returned. Returns `false` if `y` is already past the region's
/// bounds, in which case the caller should stop processing the subblock
/// (clause 7.2.5.1: "invalid object location").
fn write_string(
    reader: &mut BitReader<'_>,
    region: &mut Region,
    x: &mut u16,
    y: u16,
    non_modifying_color: bool,
    map_table: Option<&[u8]>,
    decode: fn(&mut BitReader<'_>, &mut [u8], bool, Option<&[u8]>) -> Result<usize>,
) -> Result<bool> {
    if usize::from(y) >= usize::from(region.height) {
        #[cfg(feature = "logging")]
        log::debug!(
            target: "dvbsub::pixel",
            "invalid object location: y={y} past region height {h}",
            h = region.height
        );
        return Ok(false);
    }

    let width = usize::from(region.width);
    let row_start = (usize::from(y) * width + usize::from(*x)).min(width * (usize::from(y) + 1));
    let row_end = width * (usize::from(y) + 1);
    let dest = region
        .pbuf
        .get_mut(row_start..row_end)
        .ok_or(PixelError::RunExceedsRow)?;

    let written = decode(reader, dest, non_modifying_color, map_table)?;
    *x = x.saturating_add(written as u16);
    Ok(true)
}
