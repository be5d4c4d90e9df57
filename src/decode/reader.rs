use crate::core::RowblockError;

/// Forward-only read position over one block's payload.
///
/// Every read either consumes exactly the bytes of one value or fails with
/// [`RowblockError::TruncatedInput`], leaving the block unusable.
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[inline]
    fn take(&mut self, needed: usize) -> Result<&'a [u8], RowblockError> {
        if needed > self.remaining() {
            return Err(RowblockError::TruncatedInput {
                position: self.position,
                needed,
                len: self.data.len(),
            });
        }
        let bytes = &self.data[self.position..self.position + needed];
        self.position += needed;
        Ok(bytes)
    }

    /// Zigzag varint, used for Avro `int`, `long`, union tags and lengths.
    #[inline]
    pub fn read_long(&mut self) -> Result<i64, RowblockError> {
        let mut n: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let b = self.take(1)?[0];
            // Overlong encodings keep reading until the terminator; bits past 64 are dropped.
            if shift < u64::BITS {
                n |= ((b & 0x7F) as u64) << shift;
            }
            if b & 0x80 == 0 {
                break;
            }
            shift = shift.saturating_add(7);
        }
        Ok((n >> 1) as i64 ^ -((n & 1) as i64))
    }

    /// Little-endian IEEE-754 binary64.
    #[inline]
    pub fn read_double(&mut self) -> Result<f64, RowblockError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_le_bytes(raw))
    }

    /// Single byte, any nonzero value is `true`.
    #[inline]
    pub fn read_boolean(&mut self) -> Result<bool, RowblockError> {
        Ok(self.take(1)?[0] != 0)
    }

    /// Length-prefixed byte run, returned as `(start, len)` into the payload
    /// without copying.
    #[inline]
    pub fn read_bytes_range(&mut self) -> Result<(usize, usize), RowblockError> {
        let position = self.position;
        let length = self.read_long()?;
        if length < 0 {
            return Err(RowblockError::MalformedLength { position, length });
        }
        let start = self.position;
        self.take(length as usize)?;
        Ok((start, length as usize))
    }

    /// Length-prefixed byte run, borrowed from the payload.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], RowblockError> {
        let (start, len) = self.read_bytes_range()?;
        Ok(&self.data[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{encode_double, encode_long};
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(1)]
    #[case(63)]
    #[case(-64)]
    #[case(64)]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    #[case(0x5555_5555_5555_5555)]
    #[case(-0x5555_5555_5555_5556)]
    #[case(0x0AAA_AAAA_AAAA_AAAA)]
    fn test_zigzag_round_trip(#[case] value: i64) {
        let mut buf = Vec::new();
        encode_long(&mut buf, value);
        let mut cursor = Cursor::new(&buf);
        assert_eq!(cursor.read_long().unwrap(), value);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_zigzag_known_bytes() {
        // 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 64 -> [0x80, 0x01]
        let data = [0x00, 0x01, 0x02, 0x03, 0x80, 0x01];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_long().unwrap(), 0);
        assert_eq!(cursor.read_long().unwrap(), -1);
        assert_eq!(cursor.read_long().unwrap(), 1);
        assert_eq!(cursor.read_long().unwrap(), -2);
        assert_eq!(cursor.read_long().unwrap(), 64);
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_varint_truncated_mid_value() {
        let data = [0x80, 0x80];
        let mut cursor = Cursor::new(&data);
        assert_eq!(
            cursor.read_long(),
            Err(RowblockError::TruncatedInput {
                position: 2,
                needed: 1,
                len: 2
            })
        );
    }

    #[test]
    fn test_overlong_varint_terminates() {
        let mut data = vec![0x80u8; 12];
        data.push(0x00);
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_long().unwrap(), 0);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_overlong_varint_drops_high_bits() {
        // 2 in the first group, zeros up to bit 63, then a long run of set
        // bits far past 64 that must not leak back into the value.
        let mut data = vec![0x82u8];
        data.extend(std::iter::repeat_n(0x80u8, 9));
        data.extend(std::iter::repeat_n(0xFFu8, 4096));
        data.push(0x7F);
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_long().unwrap(), 1);
        assert_eq!(cursor.remaining(), 0);
    }

    #[rstest]
    #[case(0x3FF0_0000_0000_0000)]
    #[case(0x7FF8_0000_0000_0000)]
    #[case(0x8000_0000_0000_0000)]
    #[case(0x7FF0_0000_0000_0000)]
    #[case(0x0000_0000_0000_0001)]
    fn test_double_bit_pattern(#[case] bits: u64) {
        let data = bits.to_le_bytes();
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_double().unwrap().to_bits(), bits);
    }

    #[test]
    fn test_double_one() {
        let mut buf = Vec::new();
        encode_double(&mut buf, 1.0);
        assert_eq!(buf, vec![0, 0, 0, 0, 0, 0, 0xF0, 0x3F]);
        assert_eq!(Cursor::new(&buf).read_double().unwrap(), 1.0);
    }

    #[test]
    fn test_double_truncated() {
        let data = [0u8; 7];
        let mut cursor = Cursor::new(&data);
        assert!(matches!(
            cursor.read_double(),
            Err(RowblockError::TruncatedInput { needed: 8, .. })
        ));
    }

    #[test]
    fn test_boolean() {
        let data = [0x00, 0x01, 0x02, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert!(!cursor.read_boolean().unwrap());
        assert!(cursor.read_boolean().unwrap());
        assert!(cursor.read_boolean().unwrap());
        assert!(cursor.read_boolean().unwrap());
        assert!(cursor.read_boolean().is_err());
    }

    #[test]
    fn test_bytes() {
        let data = [0x04, b'h', b'i', 0x00];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_bytes().unwrap(), b"hi");
        assert_eq!(cursor.read_bytes_range().unwrap(), (4, 0));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_bytes_negative_length() {
        // zigzag 0x03 -> -2
        let data = [0x03, 0x00, 0x00];
        let mut cursor = Cursor::new(&data);
        assert_eq!(
            cursor.read_bytes(),
            Err(RowblockError::MalformedLength {
                position: 0,
                length: -2
            })
        );
    }

    #[test]
    fn test_bytes_past_end() {
        let data = [0x06, b'a', b'b'];
        let mut cursor = Cursor::new(&data);
        assert_eq!(
            cursor.read_bytes_range(),
            Err(RowblockError::TruncatedInput {
                position: 1,
                needed: 3,
                len: 3
            })
        );
    }
}
