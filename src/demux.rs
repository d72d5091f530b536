//! PES packet framing and PTS extraction (ISO/IEC 13818-1, table 2-21).
//!
//! A DVB subtitle elementary stream is carried as `private_stream_1`
//! (`stream_id = 0xBD`) PES packets; each packet's payload begins with
//! `data_identifier = 0x20`, `subtitle_stream_id = 0x00`, then one or
//! more segments (see [`crate::segment`]).

use crate::error::{bail, DecodeError, Result};
use crate::reader::BitReader;

const STREAM_ID_PRIVATE_1: u8 = 0xBD;
const DATA_IDENTIFIER: u8 = 0x20;
const SUBTITLE_STREAM_ID: u8 = 0x00;

/// One parsed PES packet's subtitle payload, ready for the segment loop.
pub(crate) struct PesPayload<'a> {
    pub(crate) pts: u64,
    pub(crate) body: &'a [u8],
    /// Total bytes consumed from the input, including the 6-byte PES
    /// prefix (start code + stream_id + PES_packet_length).
    pub(crate) consumed: usize,
}

/// Total byte length of the PES packet starting at `data`, if `data`
/// carries a big enough prefix to read `PES_packet_length`. Lets a caller
/// skip an uninteresting packet (wrong `stream_id`, non-subtitle payload)
/// without re-parsing its body.
pub(crate) fn packet_total_len(data: &[u8]) -> Option<usize> {
    if data.len() < 6 || data[0] != 0x00 || data[1] != 0x00 || data[2] != 0x01 {
        return None;
    }
    Some(6 + usize::from(u16::from_be_bytes([data[4], data[5]])))
}

/// Frame one PES packet out of `data` and validate it carries a DVB
/// subtitle payload. On success, `body` is positioned just after the
/// data-identifier/subtitle-stream-id pair, at the first segment's sync
/// byte.
pub(crate) fn parse_pes(data: &[u8]) -> Result<PesPayload<'_>> {
    if data.len() < 6 || data[0] != 0x00 || data[1] != 0x00 || data[2] != 0x01 {
        bail!(DecodeError::NotPes);
    }

    let stream_id = data[3];
    let pes_packet_length = usize::from(u16::from_be_bytes([data[4], data[5]]));
    let total_len = 6 + pes_packet_length;

    if stream_id != STREAM_ID_PRIVATE_1 {
        bail!(DecodeError::WrongStreamId);
    }

    if data.len() < total_len {
        bail!(DecodeError::NeedMoreData);
    }

    let packet = &data[..total_len];
    let mut reader = BitReader::new(&packet[6..]);

    if reader.remaining_bits() < 2 * 8 {
        bail!(DecodeError::NeedMoreData);
    }
    let _marker_and_scrambling = reader.read_u8();
    let flags = reader.read_u8();
    let pts_flag = flags & 0x80 != 0;
    let header_len = usize::from(reader.read_u8());

    let header_start = reader.byte_pos();
    let pts = if pts_flag {
        read_pts(reader.tail())?
    } else {
        0
    };

    let after_optional_header = header_start + header_len;
    let Some(subtitle_payload) = packet.get(6 + after_optional_header..) else {
        bail!(DecodeError::NeedMoreData);
    };

    if subtitle_payload.len() < 2
        || subtitle_payload[0] != DATA_IDENTIFIER
        || subtitle_payload[1] != SUBTITLE_STREAM_ID
    {
        bail!(DecodeError::NotDvbSubtitle);
    }

    Ok(PesPayload {
        pts,
        body: &subtitle_payload[2..],
        consumed: total_len,
    })
}

/// Reassemble a 5-byte PTS (`0010 xxx1 | 15 bits | 1 | 15 bits | 1`) into
/// its 33-bit value.
fn read_pts(bytes: &[u8]) -> Result<u64> {
    let Some(b) = bytes.get(..5) else {
        bail!(DecodeError::NeedMoreData);
    };

    let pts_32_30 = u64::from((b[0] >> 1) & 0x07);
    let pts_29_15 = u64::from(u16::from_be_bytes([b[1], b[2]]) >> 1);
    let pts_14_0 = u64::from(u16::from_be_bytes([b[3], b[4]]) >> 1);

    Ok((pts_32_30 << 30) | (pts_29_15 << 15) | pts_14_0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pes_header(pts: Option<u64>, body: &[u8]) -> Vec<u8> {
        let mut optional = Vec::new();
        let pts_flag = if pts.is_some() { 0x80 } else { 0x00 };

        if let Some(pts) = pts {
            let b0 = 0x21 | (((pts >> 30) & 0x07) as u8) << 1;
            let w1 = (((pts >> 15) & 0x7FFF) as u16) << 1 | 1;
            let w2 = ((pts & 0x7FFF) as u16) << 1 | 1;
            optional.push(b0);
            optional.extend_from_slice(&w1.to_be_bytes());
            optional.extend_from_slice(&w2.to_be_bytes());
        }

        let mut payload = Vec::new();
        payload.push(0x80); // marker bits
        payload.push(pts_flag);
        payload.push(optional.len() as u8);
        payload.extend_from_slice(&optional);
        payload.extend_from_slice(body);

        let pes_packet_length = payload.len() as u16;
        let mut packet = vec![0x00, 0x00, 0x01, 0xBD];
        packet.extend_from_slice(&pes_packet_length.to_be_bytes());
        packet.extend_from_slice(&payload);
        packet
    }

    #[test]
    fn parses_subtitle_payload_without_pts() {
        let body = [DATA_IDENTIFIER, SUBTITLE_STREAM_ID, 0x0F, 0x80];
        let packet = pes_header(None, &body);
        let pes = parse_pes(&packet).unwrap();
        assert_eq!(pes.pts, 0);
        assert_eq!(pes.body, &[0x0F, 0x80]);
        assert_eq!(pes.consumed, packet.len());
    }

    #[test]
    fn parses_pts_and_body() {
        let body = [DATA_IDENTIFIER, SUBTITLE_STREAM_ID, 0x0F, 0x80];
        let packet = pes_header(Some(123_456_789), &body);
        let pes = parse_pes(&packet).unwrap();
        assert_eq!(pes.pts, 123_456_789);
        assert_eq!(pes.body, &[0x0F, 0x80]);
    }

    #[test]
    fn short_buffer_is_need_more_data() {
        let body = [DATA_IDENTIFIER, SUBTITLE_STREAM_ID, 0x0F, 0x80];
        let packet = pes_header(None, &body);
        let err = parse_pes(&packet[..packet.len() - 2]).unwrap_err();
        assert_eq!(err, DecodeError::NeedMoreData);
    }

    #[test]
    fn wrong_stream_id_is_rejected() {
        let mut packet = pes_header(None, &[DATA_IDENTIFIER, SUBTITLE_STREAM_ID]);
        packet[3] = 0xC0;
        assert_eq!(parse_pes(&packet).unwrap_err(), DecodeError::WrongStreamId);
    }

    #[test]
    fn missing_start_code_is_not_pes() {
        assert_eq!(parse_pes(&[0x01, 0x02, 0x03, 0x04]).unwrap_err(), DecodeError::NotPes);
    }
}
