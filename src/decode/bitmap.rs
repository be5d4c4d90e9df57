/// Single-bit marker that walks bit positions 0..8 as rows advance.
///
/// One marker is shared by every column of a row, so setting a validity bit
/// is a single OR at byte `row / 8`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotatingMask {
    mask: u8,
}

impl RotatingMask {
    pub fn new() -> Self {
        Self { mask: 0 }
    }

    /// Move to the next row's bit. The first call yields `0x01`.
    #[inline]
    pub fn advance(&mut self) -> u8 {
        self.mask <<= 1;
        if self.mask == 0 {
            self.mask = 0x01;
        }
        self.mask
    }

    #[inline]
    pub fn get(&self) -> u8 {
        self.mask
    }
}

/// Packed LSB-first bitmap of `len` bits, one byte per 8 rows.
///
/// Used both as a validity buffer (1 = present) and as the value buffer of
/// boolean columns. Bits past `len` in the last byte stay 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    bytes: Vec<u8>,
    len: usize,
}

impl Bitmap {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len.div_ceil(8)],
            len,
        }
    }

    /// OR `mask` into byte `byte_idx`. The mask comes from [`RotatingMask`].
    #[inline]
    pub fn or_mask(&mut self, byte_idx: usize, mask: u8) {
        self.bytes[byte_idx] |= mask;
    }

    pub fn is_set(&self, idx: usize) -> bool {
        (self.bytes[idx / 8] >> (idx % 8)) & 1 == 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count_set(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
