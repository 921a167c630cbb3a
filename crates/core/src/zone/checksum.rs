//! Fletcher-32 checksum
//!
//! Used both for whole directory slots and for individual resource payloads.
//! Input is consumed as little-endian 16-bit words; an odd trailing byte is
//! folded in as a final word.

const MODULUS: u32 = 0xFFFF;

/// Calculate the Fletcher-32 checksum of `data`
///
/// Returns `(sum2 << 16) | sum1`. Byte order matters: callers must checksum
/// the exact on-flash layout.
pub fn checksum(data: &[u8]) -> u32 {
    let mut sum1: u32 = 0;
    let mut sum2: u32 = 0;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        let value = u16::from_le_bytes([word[0], word[1]]) as u32;
        sum1 = (sum1 + value) % MODULUS;
        sum2 = (sum2 + sum1) % MODULUS;
    }

    if let [last] = words.remainder() {
        sum1 = (sum1 + *last as u32) % MODULUS;
        sum2 = (sum2 + sum1) % MODULUS;
    }

    (sum2 << 16) | sum1
}

/// Validate data against an expected checksum
pub fn validate_checksum(data: &[u8], expected: u32) -> bool {
    checksum(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(checksum(b"abcde"), 0xF04F_C729);
        assert_eq!(checksum(b"abcdef"), 0x5650_2D2A);
        assert_eq!(checksum(b"abcdefgh"), 0xEBE1_9591);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(checksum(&[1, 2, 3, 4]), checksum(&[3, 4, 1, 2]));
        assert_ne!(checksum(&[1, 2]), checksum(&[2, 1]));
    }

    #[test]
    fn test_single_bit_flips_detected() {
        let data: [u8; 32] = core::array::from_fn(|i| (i * 7 + 3) as u8);
        let reference = checksum(&data);

        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data;
                flipped[byte] ^= 1 << bit;
                assert_ne!(checksum(&flipped), reference, "byte {} bit {}", byte, bit);
            }
        }
    }

    #[test]
    fn test_validate_checksum() {
        let data = b"certificate";
        let sum = checksum(data);
        assert!(validate_checksum(data, sum));
        assert!(!validate_checksum(data, sum ^ 1));
    }
}
