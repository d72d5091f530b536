//! The top-level streaming [`Decoder`]: wires PES/segment framing, the
//! live page model and display-set delivery into one persistent object.

use crate::callback::CallbackSink;
use crate::demux;
use crate::display_set::DisplaySet;
use crate::error::Result;
use crate::model::DecoderState;
use crate::reader::BitReader;
use crate::segment::{self, SegmentOutcome};

/// A persistent DVB subtitle decoder.
///
/// Feed it PES-wrapped elementary stream bytes (or pre-demuxed segment
/// bytes plus an out-of-band PTS) via [`Decoder::feed`] /
/// [`Decoder::feed_with_pts`]. Every time an end-of-display-set segment
/// is parsed, the current page model is snapshotted into a
/// [`DisplaySet`] and handed to the registered callback, if any. Regions,
/// objects and CLUTs persist across calls until a mode-change page
/// segment or [`Decoder::reset`] clears them.
#[derive(Default)]
pub struct Decoder {
    state: DecoderState,
    sink: CallbackSink,
}

impl Decoder {
    /// Construct a decoder with empty page state and no callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the sink invoked for every completed display set.
    /// Replaces any previously registered callback.
    pub fn set_callback(&mut self, callback: impl FnMut(&DisplaySet) + Send + 'static) {
        self.sink.set(Box::new(callback));
    }

    /// Remove any registered callback.
    pub fn clear_callback(&mut self) {
        self.sink.clear();
    }

    /// Drop all regions, objects and CLUTs, and the current page display
    /// list, as if a mode-change page composition segment had just been
    /// parsed. `display_def` and `page_time_out` are preserved.
    pub fn reset(&mut self) {
        self.state.mode_change_reset();
    }

    /// Feed PES-wrapped elementary stream bytes. Consumes as many
    /// complete PES packets as `data` holds; a trailing, incomplete
    /// packet is left unconsumed and silently dropped (this decoder does
    /// not buffer partial input across calls — callers streaming from a
    /// demuxer should present whole PES packets).
    ///
    /// Returns an error only for a framing failure on the *first*
    /// packet in `data` (missing start code). Packets that are present
    /// but not DVB subtitle private data (wrong `stream_id`, wrong
    /// data-identifier) are skipped.
    pub fn feed(&mut self, data: &[u8]) -> Result<()> {
        let mut offset = 0;

        while offset < data.len() {
            let remaining = &data[offset..];

            match demux::parse_pes(remaining) {
                Ok(pes) => {
                    self.feed_segments(pes.pts, pes.body);
                    offset += pes.consumed;
                }
                Err(crate::error::DecodeError::NeedMoreData) => break,
                Err(crate::error::DecodeError::WrongStreamId)
                | Err(crate::error::DecodeError::NotDvbSubtitle) => {
                    match demux::packet_total_len(remaining) {
                        Some(len) if len > 0 => offset += len,
                        _ => break,
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Feed raw segment bytes (sync byte onward, no PES/PTS framing)
    /// alongside an externally supplied presentation timestamp.
    pub fn feed_with_pts(&mut self, pts: u64, data: &[u8]) {
        self.feed_segments(pts, data);
    }

    fn feed_segments(&mut self, pts: u64, body: &[u8]) {
        let mut reader = BitReader::new(body);

        while !reader.at_end() {
            match segment::parse_and_dispatch(&mut reader, &mut self.state) {
                Ok(SegmentOutcome::Continue) => {}
                Ok(SegmentOutcome::EndOfDisplaySet) => {
                    let set = crate::display_set::build(&self.state, pts);
                    self.sink.emit(&set);
                }
                Err(_framing_error) => {
                    #[cfg(feature = "logging")]
                    log::warn!(target: "dvbsub::decoder", "segment framing error: {_framing_error}");
                    break;
                }
            }
        }
    }
}
