use tinyvec::ArrayVec;

use crate::*;

/// Errors encounterable while building a [`Pdu`].
///
/// A [`Pdu`] is never partially written; if any of these are
/// returned, the message is exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildError {
  /// Reserved capacity was not enough for size of message
  TooLong {
    /// The maximum size of the message
    capacity: usize,
    /// The size the message would have been
    size: usize,
  },
  /// Tokens may be at most 8 bytes long
  TokenTooLong(usize),
  /// The token must be added before any options or payload
  TokenAfterOptions,
  /// Options must be added in non-decreasing order of option number
  OptionOutOfOrder {
    /// The last option number written to the message
    last: OptNumber,
    /// The option number that was rejected
    next: OptNumber,
  },
  /// Option values may be at most 65535 bytes long
  OptionValueTooLong(usize),
  /// The message already has a payload; nothing may follow it
  PayloadAlreadyAdded,
}

/// Get the nibble & extended bytes needed to represent an option
/// delta or value length.
///
/// ```text
/// 0..=12     => literal nibble
/// 13..=268   => nibble 13, 1 byte of (n - 13)
/// 269..      => nibble 14, 2 bytes of (n - 269)
/// ```
pub(crate) fn opt_len_or_delta(val: u16) -> (u8, ArrayVec<[u8; 2]>) {
  match val {
    | n if n >= 269 => {
      let mut bytes = ArrayVec::new();
      bytes.extend((n - 269).to_be_bytes());
      (14, bytes)
    },
    | n if n >= 13 => {
      let mut bytes = ArrayVec::new();
      bytes.push((n - 13) as u8);
      (13, bytes)
    },
    | n => (n as u8, ArrayVec::new()),
  }
}

impl From<Id> for [u8; 2] {
  fn from(id: Id) -> [u8; 2] {
    id.0.to_be_bytes()
  }
}

impl From<Type> for u8 {
  fn from(t: Type) -> u8 {
    use Type::*;

    match t {
      | Con => 0,
      | Non => 1,
      | Ack => 2,
      | Reset => 3,
    }
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}
