/// Bit-level reader over the corrected data codewords
pub struct BitSource<'a> {
    bytes: &'a [u8],
    byte_offset: usize,
    bit_offset: usize,
}

impl<'a> BitSource<'a> {
    /// Start reading at the first bit of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Index of the next byte being read
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Bits already consumed from the current byte
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    /// Bits left to read
    pub fn available(&self) -> usize {
        8 * (self.bytes.len() - self.byte_offset) - self.bit_offset
    }

    /// Read `count` (1..=32) bits MSB first; `None` if not enough remain
    pub fn read_bits(&mut self, count: usize) -> Option<u32> {
        if count == 0 || count > 32 || count > self.available() {
            return None;
        }

        let mut result: u32 = 0;
        let mut remaining = count;
        while remaining > 0 {
            let left_in_byte = 8 - self.bit_offset;
            let take = remaining.min(left_in_byte);
            let shift = left_in_byte - take;
            let mask = ((1u32 << take) - 1) << shift;
            let bits = (self.bytes[self.byte_offset] as u32 & mask) >> shift;
            result = (result << take) | bits;

            remaining -= take;
            self.bit_offset += take;
            if self.bit_offset == 8 {
                self.bit_offset = 0;
                self.byte_offset += 1;
            }
        }
        Some(result)
    }

    /// Read one whole codeword
    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    /// Skip to the next byte boundary
    pub fn align(&mut self) {
        if self.bit_offset != 0 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_across_bytes() {
        let data = [0b1010_1100, 0b0101_0011];
        let mut source = BitSource::new(&data);
        assert_eq!(source.available(), 16);
        assert_eq!(source.read_bits(3), Some(0b101));
        assert_eq!(source.read_bits(6), Some(0b01100_0));
        assert_eq!((source.byte_offset(), source.bit_offset()), (1, 1));
        assert_eq!(source.available(), 7);
        assert_eq!(source.read_bits(8), None);
        assert_eq!(source.read_bits(7), Some(0b101_0011));
        assert_eq!(source.available(), 0);
    }

    #[test]
    fn test_align() {
        let data = [0xFF, 0x42];
        let mut source = BitSource::new(&data);
        source.read_bits(6);
        source.align();
        assert_eq!(source.read_u8(), Some(0x42));
        source.align();
        assert_eq!(source.available(), 0);
    }
}
