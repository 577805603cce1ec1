use super::MessageParseError;

/// Message type; the 2 bits after the version in the first byte of a message.
///
/// See [RFC7252 - Message Details](https://datatracker.ietf.org/doc/html/rfc7252#section-3) for context
#[derive(Copy, Clone, Hash, Eq, Ord, PartialEq, PartialOrd, Debug)]
pub enum Type {
  /// Confirmable (0).
  ///
  /// Must be answered with exactly one [`Type::Ack`] or [`Type::Reset`],
  /// and is retransmitted with exponential backoff until it is.
  Con,
  /// Non-confirmable (1).
  ///
  /// Fire-and-forget; never acknowledged and never retransmitted.
  Non,
  /// Acknowledgement (2).
  ///
  /// Acknowledges that a specific [`Type::Con`] message arrived, and
  /// may carry a piggybacked response.
  Ack,
  /// Reset (3).
  ///
  /// Indicates that a message arrived but the receiver lacks the
  /// context to process it. An Empty CON provoking a Reset is a "CoAP ping".
  Reset,
}

impl Type {
  /// The type a response to a message of this type should have.
  ///
  /// ```
  /// use newt_msg::Type;
  ///
  /// assert_eq!(Type::Con.response_type(), Type::Ack);
  /// assert_eq!(Type::Non.response_type(), Type::Non);
  /// ```
  pub fn response_type(&self) -> Type {
    match self {
      | Type::Con => Type::Ack,
      | _ => Type::Non,
    }
  }

  /// Read the type from the low 2 bits of a byte
  pub(crate) fn from_bits(b: u8) -> Type {
    match b & 0b11 {
      | 0 => Type::Con,
      | 1 => Type::Non,
      | 2 => Type::Ack,
      | _ => Type::Reset,
    }
  }
}

impl TryFrom<u8> for Type {
  type Error = MessageParseError;

  fn try_from(b: u8) -> Result<Self, Self::Error> {
    match b {
      | 0..=3 => Ok(Type::from_bits(b)),
      | _ => Err(MessageParseError::InvalidType(b)),
    }
  }
}
