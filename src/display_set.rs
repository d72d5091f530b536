//! Snapshotting live decoder state into an immutable, owned [`DisplaySet`]
//! for delivery to a [`crate::callback::CallbackSink`].
//!
//! Building a display set never mutates [`DecoderState`]; the same state
//! can be snapshotted again (e.g. after a later object update) without
//! losing anything.

use crate::model::{DecoderState, DisplayDefinition};
use crate::palette::Argb;

/// One on-screen rectangle: a region's pixel buffer, positioned on the
/// page and carrying its own resolved palette.
#[derive(Debug, Clone)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    /// Bits per pixel index (2, 4 or 8), matching `palette.len()`'s depth class.
    pub palette_bits_count: u8,
    pub palette: Vec<Argb>,
    /// One palette index per pixel, row-major, length `width * height`.
    pub data: Vec<u8>,
}

#[cfg(feature = "image")]
impl Rect {
    /// Resolve this rect's indexed `data`/`palette` pair into a standalone
    /// RGBA image, one pixel per palette lookup.
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let width = self.width.max(0) as u32;
        let height = self.height.max(0) as u32;
        let mut image = image::RgbaImage::new(width, height);

        for (pixel, &index) in image.pixels_mut().zip(self.data.iter()) {
            let argb = self.palette.get(index as usize).copied().unwrap_or(0);
            let [a, r, g, b] = argb.to_be_bytes();
            *pixel = image::Rgba([r, g, b, a]);
        }

        image
    }
}

/// A complete, self-contained snapshot of everything visible at one point
/// in time, ready to hand to application code.
#[derive(Debug, Clone)]
pub struct DisplaySet {
    pub pts: u64,
    pub page_time_out_seconds: u8,
    pub display_def: DisplayDefinition,
    pub rects: Vec<Rect>,
}

/// Build a [`DisplaySet`] from the current decoder state, in page
/// composition order. Region displays referencing a region that no
/// longer exists are silently dropped.
pub(crate) fn build(state: &DecoderState, pts: u64) -> DisplaySet {
    let mut rects = Vec::with_capacity(state.region_displays.len());

    for display in &state.region_displays {
        let Some(region) = state.get_region(display.region_id) else {
            continue;
        };

        let clut = state.get_clut(region.clut_id);
        let palette = match clut {
            Some(clut) => clut.slice_for_depth(region.depth).to_vec(),
            None => crate::palette::Clut::default_clut()
                .slice_for_depth(region.depth)
                .to_vec(),
        };

        rects.push(Rect {
            x: i32::from(display.x_pos),
            y: i32::from(display.y_pos),
            width: i32::from(region.width),
            height: i32::from(region.height),
            rowstride: i32::from(region.width),
            palette_bits_count: region.depth,
            palette,
            data: region.pbuf.clone(),
        });
    }

    DisplaySet {
        pts,
        page_time_out_seconds: state.page_time_out,
        display_def: state.display_def,
        rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_produces_no_rects() {
        let state = DecoderState::default();
        let set = build(&state, 42);
        assert_eq!(set.pts, 42);
        assert!(set.rects.is_empty());
    }

    #[test]
    fn one_region_produces_one_rect_with_default_clut() {
        let mut state = DecoderState::default();
        state.region_for_composition(0, 4, 2, 2, 0, 1);
        state.region_displays.push(crate::model::RegionDisplay {
            region_id: 0,
            x_pos: 10,
            y_pos: 20,
        });

        let set = build(&state, 7);
        assert_eq!(set.rects.len(), 1);
        let rect = &set.rects[0];
        assert_eq!((rect.x, rect.y), (10, 20));
        assert_eq!((rect.width, rect.height), (4, 2));
        assert_eq!(rect.palette.len(), 4);
        assert_eq!(rect.data, vec![1; 8]);
    }

    #[test]
    fn missing_region_is_dropped() {
        let mut state = DecoderState::default();
        state.region_displays.push(crate::model::RegionDisplay {
            region_id: 5,
            x_pos: 0,
            y_pos: 0,
        });
        let set = build(&state, 0);
        assert!(set.rects.is_empty());
    }
}
