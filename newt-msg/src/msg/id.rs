use super::MessageParseError;
use crate::from_bytes::TryConsumeBytes;
use crate::Cursor;

/// # Message ID
///
/// 16-bit unsigned integer in network byte order, used to
/// detect duplicates and to match [`Ack`](crate::Type::Ack)s and
/// [`Reset`](crate::Type::Reset)s to the message they answer.
///
/// Message IDs are only unique per peer, so anything matching on an `Id`
/// must also match on the address it was exchanged with.
#[derive(Copy, Clone, Hash, PartialEq, PartialOrd, Debug, Eq, Ord, Default)]
pub struct Id(pub u16);

impl Id {
  /// Create an Id from a big-endian 2-byte unsigned int
  pub fn from_be_bytes(bs: [u8; 2]) -> Self {
    Self(u16::from_be_bytes(bs))
  }

  /// The Id following this one, wrapping around at `u16::MAX`
  ///
  /// ```
  /// use newt_msg::Id;
  ///
  /// assert_eq!(Id(1).next(), Id(2));
  /// assert_eq!(Id(u16::MAX).next(), Id(0));
  /// ```
  pub fn next(&self) -> Self {
    Self(self.0.wrapping_add(1))
  }
}

impl<Bytes: AsRef<[u8]>> TryConsumeBytes<Bytes> for Id {
  type Error = MessageParseError;

  fn try_consume_bytes(bytes: &mut Cursor<Bytes>) -> Result<Self, Self::Error> {
    match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(Id::from_be_bytes([a, b])),
      | _ => Err(MessageParseError::eof()),
    }
  }
}
