use tinyvec::ArrayVec;

use crate::BuildError;

/// # Token
///
/// 0 to 8 opaque bytes used to correlate a response with the request
/// that caused it, independent of the [`Id`](crate::Id)s of the
/// messages that carried them.
///
/// Observers are identified by the token of their registering request,
/// so every notification they receive echoes it.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// The token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Whether this is the zero-length token
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl TryFrom<&[u8]> for Token {
  type Error = BuildError;

  /// ```
  /// use newt_msg::{BuildError, Token};
  ///
  /// assert_eq!(Token::try_from(b"abc".as_ref()).unwrap().as_bytes(), b"abc");
  /// assert_eq!(Token::try_from([0u8; 9].as_ref()),
  ///            Err(BuildError::TokenTooLong(9)));
  /// ```
  fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
    ArrayVec::try_from(bytes).map(Token)
                             .map_err(|_| BuildError::TokenTooLong(bytes.len()))
  }
}
