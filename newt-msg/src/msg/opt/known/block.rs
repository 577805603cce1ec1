use tinyvec::ArrayVec;

use crate::uint;

/// Three items of information may need to be transferred in a
/// Block (Block1 or Block2) option:
/// * the size of the block ([`Block::size`])
/// * whether more blocks are following ([`Block::more`])
/// * the relative number of the block ([`Block::num`]) within a sequence of blocks with the given size.
///
/// On the wire these are packed into a single unsigned integer
/// `num << 4 | more << 3 | szx`, where the block size is `2 ^ (szx + 4)`.
///
/// ```
/// use newt_msg::known::Block;
///
/// let b = Block::decode(&[0x2a]);
/// assert_eq!(b, Block { num: 2, more: true, szx: 2 });
/// assert_eq!(b.size(), 64);
/// assert_eq!(b.offset(), 128);
/// assert_eq!(b.encode().as_slice(), &[0x2a]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Block {
  /// Relative number of the block within the sequence
  pub num: u32,
  /// Whether more blocks follow this one
  pub more: bool,
  /// Block size exponent; 0 through 6 are valid and 7 is reserved
  pub szx: u8,
}

impl Block {
  /// Largest valid `szx` (1024-byte blocks)
  pub const MAX_SZX: u8 = 6;

  /// Largest block number that fits in the 3-byte option value
  pub const MAX_NUM: u32 = 0x000f_ffff;

  /// Size of the block in bytes
  pub fn size(&self) -> usize {
    1 << (usize::from(self.szx & 0b111) + 4)
  }

  /// Offset in bytes of this block's first byte within the whole body
  pub fn offset(&self) -> usize {
    (self.num as usize) << (usize::from(self.szx & 0b111) + 4)
  }

  /// The option value as an integer
  pub fn to_value(&self) -> u32 {
    (self.num << 4) | (u32::from(self.more) << 3) | u32::from(self.szx & 0b111)
  }

  /// Parse from an option value
  pub fn decode(value: &[u8]) -> Self {
    let n = uint::decode(value);
    Block { num: n >> 4,
            more: n & 0b1000 != 0,
            szx: (n & 0b111) as u8 }
  }

  /// Encode as a minimal option value
  pub fn encode(&self) -> ArrayVec<[u8; 4]> {
    uint::encode(self.to_value())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn block() {
    let b = Block::decode(&[33]);
    assert_eq!(b.size(), 32);
    assert_eq!(b.num, 2);
    assert!(!b.more);

    let b = Block::decode(&[59]);
    assert_eq!(b.size(), 128);
    assert_eq!(b.num, 3);
    assert!(b.more);

    assert_eq!(Block { num: 2,
                       more: false,
                       szx: 1 }.to_value(),
               33);
  }

  #[test]
  fn first_block_is_one_byte_or_less() {
    let b = Block { num: 0,
                    more: false,
                    szx: 0 };
    assert!(b.encode().is_empty());
    assert_eq!(Block::decode(&[]), b);

    let b = Block { num: Block::MAX_NUM,
                    more: true,
                    szx: 6 };
    assert_eq!(b.encode().as_slice(), &[0xff, 0xff, 0xfe]);
    assert_eq!(Block::decode(&b.encode()), b);
  }
}
