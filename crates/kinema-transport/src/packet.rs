//! Face tracker datagram codec
//!
//! Text datagrams of `|`-separated entries:
//!
//! ```text
//! head#<pitch>,<yaw>,<roll>,<x>,<y>,<z>|jawOpen-35|eyeBlinkLeft-100
//! ```
//!
//! Angles are degrees, head position is meters from the calibrated
//! center, blendshape weights are 0-100 on the wire and 0-1 in a
//! `FaceSample`. A datagram without a `head#` entry means the tracker is
//! running but sees no face.

use std::collections::HashMap;
use std::fmt::Write as _;

use glam::Vec3;
use kinema_core::{FaceSample, KinemaError, KinemaResult};

/// Largest datagram the receiver accepts
pub const MAX_PACKET_SIZE: usize = 4096;

const ENTRY_SEPARATOR: char = '|';
const HEAD_PREFIX: &str = "head#";

fn decode_error(message: impl Into<String>) -> KinemaError {
    KinemaError::DecodeError(message.into())
}

fn parse_number(text: &str) -> KinemaResult<f32> {
    let value: f32 = text
        .trim()
        .parse()
        .map_err(|_| decode_error(format!("invalid number {text:?}")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(decode_error(format!("non-finite number {text:?}")))
    }
}

fn parse_head(fields: &str) -> KinemaResult<(Vec3, Vec3)> {
    let values = fields
        .split(',')
        .map(parse_number)
        .collect::<KinemaResult<Vec<f32>>>()?;
    match values.as_slice() {
        [pitch, yaw, roll, x, y, z] => Ok((Vec3::new(*pitch, *yaw, *roll), Vec3::new(*x, *y, *z))),
        _ => Err(decode_error(format!(
            "head entry needs 6 values, got {}",
            values.len()
        ))),
    }
}

/// Decode one datagram
pub fn decode_face_packet(bytes: &[u8]) -> KinemaResult<FaceSample> {
    if bytes.len() > MAX_PACKET_SIZE {
        return Err(decode_error(format!("packet too large: {} bytes", bytes.len())));
    }
    let text = std::str::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;

    let mut sample = FaceSample::lost();
    let mut blendshapes = HashMap::new();
    for entry in text.trim().split(ENTRY_SEPARATOR) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if let Some(fields) = entry.strip_prefix(HEAD_PREFIX) {
            let (angles, position) = parse_head(fields)?;
            sample.detected = true;
            sample.head_angles = angles;
            sample.head_position = position;
            continue;
        }
        let (name, value) = entry
            .rsplit_once('-')
            .ok_or_else(|| decode_error(format!("malformed entry {entry:?}")))?;
        if name.is_empty() {
            return Err(decode_error(format!("unnamed blendshape {entry:?}")));
        }
        let weight = parse_number(value)?.clamp(0.0, 100.0) / 100.0;
        blendshapes.insert(name.to_string(), weight);
    }
    sample.blendshapes = blendshapes;
    Ok(sample)
}

/// Encode a sample in the wire format
pub fn encode_face_packet(sample: &FaceSample) -> String {
    let mut out = String::new();
    if sample.detected {
        let a = sample.head_angles;
        let p = sample.head_position;
        let _ = write!(out, "{HEAD_PREFIX}{},{},{},{},{},{}", a.x, a.y, a.z, p.x, p.y, p.z);
    }
    let mut names: Vec<&String> = sample.blendshapes.keys().collect();
    names.sort();
    for name in names {
        if !out.is_empty() {
            out.push(ENTRY_SEPARATOR);
        }
        let weight = sample.blendshapes[name].clamp(0.0, 1.0) * 100.0;
        let _ = write!(out, "{name}-{weight}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_head_and_blendshapes() {
        let sample =
            decode_face_packet(b"head#5,-20,2.5,0.01,0,-0.02|jawOpen-50|eyeBlinkLeft-100").unwrap();
        assert!(sample.detected);
        assert_eq!(sample.head_angles, Vec3::new(5.0, -20.0, 2.5));
        assert_eq!(sample.head_position, Vec3::new(0.01, 0.0, -0.02));
        assert_eq!(sample.blendshapes["jawOpen"], 0.5);
        assert_eq!(sample.blendshapes["eyeBlinkLeft"], 1.0);
    }

    #[test]
    fn test_no_head_means_no_face() {
        let sample = decode_face_packet(b"jawOpen-10").unwrap();
        assert!(!sample.detected);
        assert_eq!(sample.blendshapes.len(), 1);

        let empty = decode_face_packet(b"").unwrap();
        assert!(!empty.detected);
        assert!(empty.blendshapes.is_empty());
    }

    #[test]
    fn test_malformed_packets_rejected() {
        for bad in [
            &b"head#1,2,3"[..],
            b"head#1,2,3,4,5,x",
            b"head#NaN,0,0,0,0,0",
            b"jawOpen",
            b"-40",
            b"jawOpen-inf",
            &[0xff, 0xfe],
        ] {
            assert!(
                matches!(decode_face_packet(bad), Err(KinemaError::DecodeError(_))),
                "{bad:?}"
            );
        }
        assert!(decode_face_packet(&vec![b'a'; MAX_PACKET_SIZE + 1]).is_err());
    }

    #[test]
    fn test_weights_are_clamped() {
        let sample = decode_face_packet(b"mouthSmile-250").unwrap();
        assert_eq!(sample.blendshapes["mouthSmile"], 1.0);
    }

    #[test]
    fn test_encode_matches_wire_format() {
        let mut sample = FaceSample::detected(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.0, 0.0));
        sample.blendshapes.insert("jawOpen".into(), 0.25);
        assert_eq!(encode_face_packet(&sample), "head#1,2,3,0.5,0,0|jawOpen-25");
        assert_eq!(encode_face_packet(&FaceSample::lost()), "");
    }

    proptest! {
        #[test]
        fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_face_packet(&bytes);
        }

        #[test]
        fn prop_decoded_samples_are_finite(text in "[a-z#|,0-9.\\-]{0,64}") {
            if let Ok(sample) = decode_face_packet(text.as_bytes()) {
                prop_assert!(sample.ensure_finite().is_ok());
                prop_assert!(sample.blendshapes.values().all(|w| (0.0..=1.0).contains(w)));
            }
        }
    }
}
