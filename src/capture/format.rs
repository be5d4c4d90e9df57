pub(crate) const MAGIC: &[u8; 4] = b"RBLK";
pub(crate) const VERSION: u32 = 1;
pub(crate) const HEADER_SIZE: usize = 8; // magic (4) + version (4)
pub(crate) const FRAME_HEADER_SIZE: usize = 8; // row_count (4) + payload_len (4)

/// Read a little-endian u32 from `data` at `offset`.
/// Returns `None` if fewer than 4 bytes remain.
pub(crate) fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}
