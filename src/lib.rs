/*!
A memory-safe, pure-Rust DVB subtitle decoder.

`dvbsub` decodes the subtitling bitstream defined by ETSI EN 300 743
("Digital Video Broadcasting (DVB); Subtitling systems") as carried in
MPEG-2 transport/program streams: PES framing, page/region/object/CLUT
segments, and the three run-length pixel-code grammars, into owned,
positioned RGBA bitmaps ready to composite over video.

# Example
```rust,no_run
use dvbsub::Decoder;

let mut decoder = Decoder::new();
decoder.set_callback(|set| {
    println!("display set at pts {}: {} rect(s)", set.pts, set.rects.len());
});

let pes_packet = std::fs::read("subtitle.pes").unwrap();
decoder.feed(&pes_packet).unwrap();
```

# Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]
#![allow(missing_docs)]

mod callback;
mod decoder;
mod demux;
mod display_set;
mod error;
mod model;
mod palette;
mod pixel_block;
mod pixel_run;
mod reader;
mod segment;

pub use decoder::Decoder;
pub use display_set::{DisplaySet, Rect};
pub use error::{DecodeError, PixelError, Result};
pub use model::{DisplayDefinition, Window};
pub use palette::Argb;
