//! The persisted run configuration.  A store file begins with a fixed
//! 64-byte header holding the run's progress counter and its immutable
//! geometry: image size, plane corners, iteration budget, and the
//! overall point target.  Every field sits little-endian at a fixed
//! offset; the final eight bytes are reserved padding.

use error::Error;
use num::Complex;
use planes::BoundingBox;

/// Size of the on-disk header in bytes, padding included.
pub const HEADER_SIZE: usize = 64;

/// The decoded header of a store file.
///
/// | offset | size | field         |
/// |--------|------|---------------|
/// | 0      | 8    | progress      |
/// | 8      | 2    | width         |
/// | 10     | 2    | height        |
/// | 12     | 8    | target_points |
/// | 20     | 4    | iterations    |
/// | 24     | 8    | a.re          |
/// | 32     | 8    | a.im          |
/// | 40     | 8    | b.re          |
/// | 48     | 8    | b.im          |
/// | 56     | 8    | reserved      |
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Header {
    /// Points processed so far.  Monotonic over the life of the file;
    /// only the round orchestrator advances it.
    pub progress: u64,
    /// Histogram width in pixels.  Fixed at creation.
    pub width: u16,
    /// Histogram height in pixels.  Fixed at creation.
    pub height: u16,
    /// The overall point target.  Zero means farm until stopped.
    pub target_points: u64,
    /// Maximum recurrence steps per sample.
    pub iterations: u32,
    /// The rectangle of the complex plane under study.
    pub bounds: BoundingBox,
}

impl Header {
    /// Decodes a header from the front of `bytes`.  Anything shorter
    /// than the fixed layout is rejected; the field values themselves
    /// are taken as they come, since the operator supplied them in the
    /// first place.
    pub fn decode(bytes: &[u8]) -> Result<Header, Error> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader {
                got: bytes.len(),
                need: HEADER_SIZE,
            });
        }
        Ok(Header {
            progress: read_u64(bytes, 0),
            width: read_u16(bytes, 8),
            height: read_u16(bytes, 10),
            target_points: read_u64(bytes, 12),
            iterations: read_u32(bytes, 20),
            bounds: BoundingBox {
                a: Complex::new(read_f64(bytes, 24), read_f64(bytes, 32)),
                b: Complex::new(read_f64(bytes, 40), read_f64(bytes, 48)),
            },
        })
    }

    /// Encodes the header into its fixed 64-byte form, padding zeroed.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0_u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&self.progress.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.width.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.target_points.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.iterations.to_le_bytes());
        bytes[24..32].copy_from_slice(&self.bounds.a.re.to_le_bytes());
        bytes[32..40].copy_from_slice(&self.bounds.a.im.to_le_bytes());
        bytes[40..48].copy_from_slice(&self.bounds.b.re.to_le_bytes());
        bytes[48..56].copy_from_slice(&self.bounds.b.im.to_le_bytes());
        bytes
    }

    /// The number of histogram cells that follow the header on disk.
    pub fn cell_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    let mut raw = [0_u8; 2];
    raw.copy_from_slice(&bytes[at..at + 2]);
    u16::from_le_bytes(raw)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0_u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0_u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}

fn read_f64(bytes: &[u8], at: usize) -> f64 {
    let mut raw = [0_u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    f64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            progress: 123_456_789,
            width: 640,
            height: 480,
            target_points: 10_000_000,
            iterations: 2_000,
            bounds: BoundingBox {
                a: Complex::new(-2.0, 1.5),
                b: Complex::new(1.0, -1.5),
            },
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let header = sample_header();
        assert_eq!(Header::decode(&header.encode()).unwrap(), header);
    }

    #[test]
    fn decode_encode_round_trips_the_bytes() {
        let bytes = sample_header().encode();
        let again = Header::decode(&bytes).unwrap().encode();
        assert_eq!(&bytes[..], &again[..]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        match Header::decode(&[0_u8; 63]) {
            Err(Error::TruncatedHeader { got, need }) => {
                assert_eq!(got, 63);
                assert_eq!(need, HEADER_SIZE);
            }
            other => panic!("expected a truncation error, got {:?}", other),
        }
    }

    #[test]
    fn fields_land_at_their_documented_offsets() {
        let bytes = sample_header().encode();
        assert_eq!(&bytes[0..8], &123_456_789_u64.to_le_bytes()[..]);
        assert_eq!(&bytes[8..10], &640_u16.to_le_bytes()[..]);
        assert_eq!(&bytes[10..12], &480_u16.to_le_bytes()[..]);
        assert_eq!(&bytes[12..20], &10_000_000_u64.to_le_bytes()[..]);
        assert_eq!(&bytes[20..24], &2_000_u32.to_le_bytes()[..]);
        assert_eq!(&bytes[24..32], &(-2.0_f64).to_le_bytes()[..]);
        assert_eq!(&bytes[48..56], &(-1.5_f64).to_le_bytes()[..]);
        assert_eq!(&bytes[56..64], &[0_u8; 8][..]);
    }

    #[test]
    fn cell_count_is_the_grid_area() {
        assert_eq!(sample_header().cell_count(), 640 * 480);
    }
}
