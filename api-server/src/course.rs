// api-server/src/course.rs
//
// Structural check for uploaded course files. Uploads are accepted only if
// the blob parses as a course; the content actor itself never inspects the
// bytes.

/// File magic at offset 0
pub const MAGIC: [u8; 4] = *b"CRSE";
/// Only format version currently emitted by the editor
pub const VERSION: u8 = 1;
/// Header: magic (4) + version (1) + width (2) + height (2) + object count (4)
const HEADER_LEN: usize = 13;
/// Serialized size of one placed object
const OBJECT_LEN: usize = 8;
/// Grid bounds accepted by the player
const MAX_DIMENSION: u16 = 4096;

/// Does the blob parse as a course file?
pub fn is_course(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_LEN {
        return false;
    }
    if bytes[0..4] != MAGIC || bytes[4] != VERSION {
        return false;
    }

    let width = u16::from_le_bytes([bytes[5], bytes[6]]);
    let height = u16::from_le_bytes([bytes[7], bytes[8]]);
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return false;
    }

    let objects = u32::from_le_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]) as usize;
    // The object table must account for the entire remainder of the file
    match objects.checked_mul(OBJECT_LEN) {
        Some(table) => bytes.len() - HEADER_LEN == table,
        None => false,
    }
}

/// Build a minimal well-formed course file; used by tests and tooling
pub fn sample_course(objects: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&MAGIC);
    bytes.push(VERSION);
    bytes.extend_from_slice(&64u16.to_le_bytes());
    bytes.extend_from_slice(&32u16.to_le_bytes());
    bytes.extend_from_slice(&objects.to_le_bytes());
    bytes.extend(std::iter::repeat(0u8).take(objects as usize * OBJECT_LEN));
    bytes
}
