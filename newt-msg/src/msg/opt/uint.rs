//! Options like Content-Format, Max-Age, Observe and Block2 carry a
//! non-negative integer in network byte order, using as few bytes as
//! possible. Zero is represented by an empty value.

use tinyvec::ArrayVec;

/// Encode an integer using the fewest big-endian bytes that can represent it.
///
/// ```
/// use newt_msg::uint;
///
/// assert!(uint::encode(0).is_empty());
/// assert_eq!(uint::encode(40).as_slice(), &[40]);
/// assert_eq!(uint::encode(0x0100).as_slice(), &[0x01, 0x00]);
/// assert_eq!(uint::encode(0x12345678).as_slice(), &[0x12, 0x34, 0x56, 0x78]);
/// ```
pub fn encode(n: u32) -> ArrayVec<[u8; 4]> {
  let bytes = n.to_be_bytes();
  let skip = (n.leading_zeros() / 8) as usize;

  let mut out = ArrayVec::new();
  out.extend(bytes.into_iter().skip(skip));
  out
}

/// Decode a big-endian integer option value.
///
/// Values longer than 4 bytes keep only their last 4 bytes.
///
/// ```
/// use newt_msg::uint;
///
/// assert_eq!(uint::decode(&[]), 0);
/// assert_eq!(uint::decode(&[0x01, 0x00]), 256);
/// assert_eq!(uint::decode(&[0xff, 0x00, 0x00, 0x00, 0x01]), 1);
/// ```
pub fn decode(bytes: &[u8]) -> u32 {
  bytes.iter().fold(0u32, |n, b| (n << 8) | u32::from(*b))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_is_minimal() {
    for (n, len) in [(0u32, 0usize), (1, 1), (255, 1), (256, 2), (65535, 2), (65536, 3), (u32::MAX, 4)] {
      let enc = encode(n);
      assert_eq!(enc.len(), len, "{}", n);
      assert_eq!(decode(&enc), n);
    }
  }

  #[test]
  fn long_values_keep_last_four_bytes() {
    assert_eq!(decode(&[0x01, 0x12, 0x34, 0x56, 0x78]), 0x12345678);
    assert_eq!(decode(&[0xaa; 8]), 0xaaaaaaaa);
  }
}
