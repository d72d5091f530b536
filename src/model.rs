//! The in-memory page model: regions, objects, CLUTs and their cross-links.
//!
//! Regions, Objects and CLUTs persist across display sets and are mutated
//! in place by segment parsers; see the module-level docs on [`crate`] for
//! the overall control flow. `ObjectDisplay` values live in a small slab
//! (`displays`) and are referenced by handle from both the owning
//! `Region` and the owning `Object`, replacing the two interlocked
//! singly-linked lists a C implementation would use with an index that's
//! trivial to remove in O(1).

use crate::palette::Clut;

/// Handle into [`DecoderState::displays`].
pub(crate) type DisplayId = u32;

/// A rectangular raster surface on the page (clause 7.2.1, "Region
/// composition segment").
#[derive(Debug, Clone)]
pub(crate) struct Region {
    pub(crate) id: u8,
    pub(crate) width: u16,
    pub(crate) height: u16,
    /// Bits per pixel; always one of `{2, 4, 8}`.
    pub(crate) depth: u8,
    pub(crate) clut_id: u8,
    pub(crate) bgcolor: u8,
    /// One palette index per pixel, row-major, length `width * height`.
    pub(crate) pbuf: Vec<u8>,
    /// Object displays anchored in this region, head-insert order (the
    /// most recently linked display is at index 0).
    pub(crate) display_list: Vec<DisplayId>,
}

impl Region {
    fn new(id: u8, width: u16, height: u16, depth: u8, clut_id: u8, bgcolor: u8) -> Self {
        let pbuf = vec![bgcolor; usize::from(width) * usize::from(height)];
        Self {
            id,
            width,
            height,
            depth,
            clut_id,
            bgcolor,
            pbuf,
            display_list: Vec::new(),
        }
    }

    pub(crate) fn fill(&mut self, color: u8) {
        self.pbuf.fill(color);
    }

    #[cfg(test)]
    pub(crate) fn for_test(width: u16, height: u16, depth: u8) -> Self {
        Self::new(0, width, height, depth, 0, 0)
    }
}

/// The interpretation of an [`Object`]'s pixel data (clause 7.2.3 table 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    Bitmap,
    String,
    StringWithBgcolor,
    Reserved,
}

impl ObjectKind {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Bitmap,
            1 => Self::String,
            2 => Self::StringWithBgcolor,
            _ => Self::Reserved,
        }
    }
}

/// A logical bitmap (or string) referenced by one or more regions.
#[derive(Debug, Clone)]
pub(crate) struct Object {
    pub(crate) id: u16,
    pub(crate) kind: ObjectKind,
    /// Displays that embed this object, head-insert order.
    pub(crate) display_list: Vec<DisplayId>,
}

/// The placement of one [`Object`] inside one [`Region`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ObjectDisplay {
    pub(crate) object_id: u16,
    pub(crate) region_id: u8,
    pub(crate) x_pos: u16,
    pub(crate) y_pos: u16,
    /// Only meaningful for [`ObjectKind::String`]/[`ObjectKind::StringWithBgcolor`].
    pub(crate) fgcolor: Option<u8>,
    pub(crate) bgcolor: Option<u8>,
}

/// The placement of a [`Region`] on the page (clause 7.2.2, "Page
/// composition segment").
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegionDisplay {
    pub(crate) region_id: u8,
    pub(crate) x_pos: u16,
    pub(crate) y_pos: u16,
}

/// Optional page-wide window (clause 7.2.1, "Display definition segment").
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// The page-wide display geometry. `version` starts at `-1` so the first
/// display definition segment is never treated as a no-op duplicate.
#[derive(Debug, Clone, Copy)]
pub struct DisplayDefinition {
    pub version: i16,
    pub width: u16,
    pub height: u16,
    pub window: Option<Window>,
}

impl Default for DisplayDefinition {
    fn default() -> Self {
        Self {
            version: -1,
            width: 720,
            height: 576,
            window: None,
        }
    }
}

/// The full live decoder state: every region, object, and CLUT, plus the
/// current page-level display list. Owned by [`crate::decoder::Decoder`]
/// and mutated by the segment parsers in `crate::segment`.
#[derive(Debug, Default)]
pub(crate) struct DecoderState {
    pub(crate) page_time_out: u8,
    pub(crate) display_def: DisplayDefinition,
    pub(crate) region_displays: Vec<RegionDisplay>,
    regions: Vec<(u8, Region)>,
    objects: Vec<(u16, Object)>,
    cluts: Vec<(u8, Clut)>,
    displays: Vec<Option<ObjectDisplay>>,
    free_displays: Vec<DisplayId>,
}

impl DecoderState {
    pub(crate) fn get_region(&self, id: u8) -> Option<&Region> {
        self.find_region(id).map(|i| &self.regions[i].1)
    }

    pub(crate) fn get_region_mut(&mut self, id: u8) -> Option<&mut Region> {
        self.find_region(id).map(move |i| &mut self.regions[i].1)
    }

    fn find_region(&self, id: u8) -> Option<usize> {
        self.regions
            .binary_search_by_key(&id, |(k, _)| *k)
            .ok()
    }

    /// Create a region (or return the existing one with matching `id`
    /// unchanged) and report whether it is new or was resized — the
    /// region composition parser uses this to decide whether to force a
    /// background fill.
    pub(crate) fn region_for_composition(
        &mut self,
        id: u8,
        width: u16,
        height: u16,
        depth: u8,
        clut_id: u8,
        bgcolor: u8,
    ) -> (&mut Region, bool) {
        match self.regions.binary_search_by_key(&id, |(k, _)| *k) {
            Ok(idx) => {
                let resized =
                    self.regions[idx].1.width != width || self.regions[idx].1.height != height;
                let region = &mut self.regions[idx].1;
                region.depth = depth;
                region.clut_id = clut_id;
                region.bgcolor = bgcolor;
                if resized {
                    region.width = width;
                    region.height = height;
                    region.pbuf = vec![bgcolor; usize::from(width) * usize::from(height)];
                }
                (region, resized)
            }
            Err(idx) => {
                self.regions.insert(
                    idx,
                    (id, Region::new(id, width, height, depth, clut_id, bgcolor)),
                );
                (&mut self.regions[idx].1, true)
            }
        }
    }

    pub(crate) fn regions_iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().map(|(_, r)| r)
    }

    fn find_object(&self, id: u16) -> Option<usize> {
        self.objects.binary_search_by_key(&id, |(k, _)| *k).ok()
    }

    pub(crate) fn get_object(&self, id: u16) -> Option<&Object> {
        self.find_object(id).map(|i| &self.objects[i].1)
    }

    fn object_for_display(&mut self, id: u16, kind: ObjectKind) -> usize {
        match self.objects.binary_search_by_key(&id, |(k, _)| *k) {
            Ok(idx) => {
                self.objects[idx].1.kind = kind;
                idx
            }
            Err(idx) => {
                self.objects.insert(
                    idx,
                    (
                        id,
                        Object {
                            id,
                            kind,
                            display_list: Vec::new(),
                        },
                    ),
                );
                idx
            }
        }
    }

    pub(crate) fn get_display(&self, id: DisplayId) -> Option<&ObjectDisplay> {
        self.displays.get(id as usize).and_then(|d| d.as_ref())
    }

    /// Link a new `ObjectDisplay` into both its region's and object's
    /// display lists (head-insert, matching wire-visible traversal order).
    pub(crate) fn link_object_display(
        &mut self,
        region_id: u8,
        object_id: u16,
        kind: ObjectKind,
        x_pos: u16,
        y_pos: u16,
        fgcolor: Option<u8>,
        bgcolor: Option<u8>,
    ) {
        let display = ObjectDisplay {
            object_id,
            region_id,
            x_pos,
            y_pos,
            fgcolor,
            bgcolor,
        };

        let id = match self.free_displays.pop() {
            Some(id) => {
                self.displays[id as usize] = Some(display);
                id
            }
            None => {
                self.displays.push(Some(display));
                (self.displays.len() - 1) as DisplayId
            }
        };

        let object_idx = self.object_for_display(object_id, kind);
        self.objects[object_idx].1.display_list.insert(0, id);

        if let Some(region_idx) = self.find_region(region_id) {
            self.regions[region_idx].1.display_list.insert(0, id);
        }
    }

    /// Clear a region's object-display list, unlinking every display from
    /// its owning object and destroying objects whose display list
    /// becomes empty as a result. Called at the start of every region
    /// composition segment and as part of a full mode-change reset.
    pub(crate) fn teardown_region_displays(&mut self, region_id: u8) {
        let Some(region_idx) = self.find_region(region_id) else {
            return;
        };

        let removed = core::mem::take(&mut self.regions[region_idx].1.display_list);

        for display_id in removed {
            let Some(display) = self.displays[display_id as usize].take() else {
                continue;
            };
            self.free_displays.push(display_id);

            if let Some(object_idx) = self.find_object(display.object_id) {
                let list = &mut self.objects[object_idx].1.display_list;
                list.retain(|&d| d != display_id);
                if list.is_empty() {
                    self.objects.remove(object_idx);
                }
            }
        }
    }

    pub(crate) fn get_clut(&self, id: u8) -> Option<&Clut> {
        self.cluts
            .binary_search_by_key(&id, |(k, _)| *k)
            .ok()
            .map(|i| &self.cluts[i].1)
    }

    /// Return the CLUT for `id`, creating it as a copy of the default
    /// table on first reference (clause 7.2.4: "any non-existent CLUT is
    /// created as the default CLUT before it is first modified").
    pub(crate) fn clut_mut_or_default(&mut self, id: u8) -> &mut Clut {
        match self.cluts.binary_search_by_key(&id, |(k, _)| *k) {
            Ok(idx) => &mut self.cluts[idx].1,
            Err(idx) => {
                self.cluts.insert(idx, (id, Clut::default_clut()));
                &mut self.cluts[idx].1
            }
        }
    }

    /// Full reset on Mode Change (page_state == 2): regions, objects and
    /// CLUTs are destroyed; `display_def` and `page_time_out` persist.
    pub(crate) fn mode_change_reset(&mut self) {
        self.regions.clear();
        self.objects.clear();
        self.cluts.clear();
        self.displays.clear();
        self.free_displays.clear();
        self.region_displays.clear();
    }
}
