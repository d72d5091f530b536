//! 2-bit/pixel, 4-bit/pixel and 8-bit/pixel run-length pixel-code strings
//! (clauses 7.2.5.2, 7.2.5.3 and 7.2.5.4).
//!
//! All three grammars share the same post-processing once a `(run, color)`
//! pair has been decoded: the run is clamped to what remains of the
//! destination row, an optional `map_table` remaps the color, a
//! non-modifying color of index 1 is skipped without being written (but
//! still advances the cursor), and the cursor always advances by the full
//! run length regardless of how much was actually written.

use crate::error::{bail, PixelError, Result};
use crate::reader::BitReader;

fn apply_run(
    dest: &mut [u8],
    pos: &mut usize,
    run: u32,
    color: u8,
    non_modifying: bool,
    map_table: Option<&[u8]>,
) -> Result<()> {
    if *pos > dest.len() {
        bail!(PixelError::RunExceedsRow);
    }

    let run = run as usize;
    let remaining = dest.len() - *pos;
    let clamped = run.min(remaining);

    if !(non_modifying && color == 1) {
        let mapped = match map_table {
            Some(table) => *table.get(color as usize).unwrap_or(&color),
            None => color,
        };
        dest[*pos..*pos + clamped].fill(mapped);
    }

    *pos += run;
    Ok(())
}

/// Decode a 2-bit/pixel run-length string (clause 7.2.5.2) into `dest`.
/// Returns the number of pixel positions advanced, which may exceed
/// `dest.len()` if the final run overran the row.
pub(crate) fn decode_2bit(
    reader: &mut BitReader<'_>,
    dest: &mut [u8],
    non_modifying: bool,
    map_table: Option<&[u8]>,
) -> Result<usize> {
    let mut pos = 0_usize;

    while pos < dest.len() {
        let code = reader.take(2) as u8;

        if code != 0 {
            apply_run(dest, &mut pos, 1, code, non_modifying, map_table)?;
            continue;
        }

        if reader.take_bit() == 1 {
            let run = reader.take(3) + 3;
            let color = reader.take(2) as u8;
            apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
        } else if reader.take_bit() == 1 {
            apply_run(dest, &mut pos, 1, 0, non_modifying, map_table)?;
        } else {
            match reader.take(2) {
                0 => break, // end of string
                1 => apply_run(dest, &mut pos, 2, 0, non_modifying, map_table)?,
                2 => {
                    let run = reader.take(4) + 12;
                    let color = reader.take(2) as u8;
                    apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
                }
                _ => {
                    let run = reader.take(8) + 29;
                    let color = reader.take(2) as u8;
                    apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
                }
            }
        }
    }

    reader.skip_to_next_byte();
    Ok(pos)
}

/// Decode a 4-bit/pixel run-length string (clause 7.2.5.3).
pub(crate) fn decode_4bit(
    reader: &mut BitReader<'_>,
    dest: &mut [u8],
    non_modifying: bool,
    map_table: Option<&[u8]>,
) -> Result<usize> {
    let mut pos = 0_usize;

    while pos < dest.len() {
        let code = reader.take(4) as u8;

        if code != 0 {
            apply_run(dest, &mut pos, 1, code, non_modifying, map_table)?;
            continue;
        }

        if reader.take_bit() == 0 {
            let r = reader.take(3);
            if r == 0 {
                break; // end of string
            }
            apply_run(dest, &mut pos, r + 2, 0, non_modifying, map_table)?;
        } else if reader.take_bit() == 0 {
            let run = reader.take(2) + 4;
            let color = reader.take(4) as u8;
            apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
        } else {
            match reader.take(2) {
                0 => apply_run(dest, &mut pos, 1, 0, non_modifying, map_table)?,
                1 => apply_run(dest, &mut pos, 2, 0, non_modifying, map_table)?,
                2 => {
                    let run = reader.take(4) + 9;
                    let color = reader.take(4) as u8;
                    apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
                }
                _ => {
                    let run = reader.take(8) + 25;
                    let color = reader.take(4) as u8;
                    apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
                }
            }
        }
    }

    reader.skip_to_next_byte();
    Ok(pos)
}

/// Decode an 8-bit/pixel run-length string (clause 7.2.5.4).
pub(crate) fn decode_8bit(
    reader: &mut BitReader<'_>,
    dest: &mut [u8],
    non_modifying: bool,
    map_table: Option<&[u8]>,
) -> Result<usize> {
    let mut pos = 0_usize;

    while pos < dest.len() {
        let code = reader.take(8) as u8;

        if code != 0 {
            apply_run(dest, &mut pos, 1, code, non_modifying, map_table)?;
            continue;
        }

        if reader.take_bit() == 0 {
            let r = reader.take(7);
            if r == 0 {
                break; // end of string
            }
            apply_run(dest, &mut pos, r, 0, non_modifying, map_table)?;
        } else {
            // run >= 3 required by the format; run < 3 is malformed but
            // accepted (treated as a very short, possibly zero-length run).
            let run = reader.take(7);
            let color = reader.take(8) as u8;
            apply_run(dest, &mut pos, run, color, non_modifying, map_table)?;
        }
    }

    reader.skip_to_next_byte();
    Ok(pos)
}
