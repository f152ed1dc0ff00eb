//! Decoder for the compact ASCII polyline encoding used by the route API.
//!
//! The format packs successive (Δlat, Δlng) pairs as zig-zag signed
//! integers, split into 5-bit groups with 0x20 as the continuation bit and
//! every byte offset by 63, at a fixed-point scale of 1e5.
//!
//! Decoding is best-effort by contract: a truncated continuation sequence
//! produces an undefined trailing coordinate rather than an error, and
//! downstream code already tolerates degenerate (too short) output.

use geo::{Coord, LineString};

const SCALE: f64 = 1e-5;

/// Decode an encoded polyline into absolute coordinates, in input order.
/// Pure and deterministic; same input always yields identical output.
pub fn decode(encoded: &str) -> LineString {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();

    let mut cursor = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while cursor < bytes.len() {
        let (dlat, next) = next_delta(bytes, cursor);
        lat += dlat;
        let (dlng, next) = next_delta(bytes, next);
        lng += dlng;
        cursor = next;

        coords.push(Coord {
            x: lng as f64 * SCALE,
            y: lat as f64 * SCALE,
        });
    }

    LineString::new(coords)
}

/// Read one zig-zag varint starting at `cursor`. Running off the end of the
/// input terminates the group early (best-effort semantics).
fn next_delta(bytes: &[u8], mut cursor: usize) -> (i64, usize) {
    let mut accumulated = 0i64;
    let mut shift = 0;

    while cursor < bytes.len() {
        let chunk = i64::from(bytes[cursor]) - 63;
        cursor += 1;
        if shift < 64 {
            accumulated |= (chunk & 0x1f) << shift;
            shift += 5;
        }
        if chunk & 0x20 == 0 {
            break;
        }
    }

    let delta = if accumulated & 1 != 0 {
        !(accumulated >> 1)
    } else {
        accumulated >> 1
    };
    (delta, cursor)
}
