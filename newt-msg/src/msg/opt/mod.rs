use core::fmt;

use crate::from_bytes::TryConsumeBytes;
use crate::to_bytes::opt_len_or_delta;
use crate::{BuildError, Cursor};

/// Errors encountered while parsing options
pub mod parse_error;
pub use parse_error::*;

/// Lazy iteration over the options in a message
pub mod iter;
pub use iter::OptIter;

/// Bitset restricting which option numbers an [`OptIter`] yields
pub mod filter;
pub use filter::OptFilter;

/// Option numbers and values defined by RFC7252, RFC7641 and RFC7959
pub mod known;

/// Variable-length unsigned integer option values
pub mod uint;

pub(crate) fn parse_opt_len_or_delta<A: AsRef<[u8]>>(head: u8,
                                                     bytes: &mut Cursor<A>,
                                                     reserved_err: OptParseError,
                                                     overflow_err: OptParseError)
                                                     -> Result<u16, OptParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or_else(OptParseError::eof)?;
      Ok(u16::from(n) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => u16::from_be_bytes([a, b]).checked_add(269)
                                                   .ok_or(overflow_err),
      | _ => Err(OptParseError::eof()),
    },
    | 15 => Err(reserved_err),
    | _ => Ok(u16::from(head)),
  }
}

/// # `Opt` struct
/// Low-level representation of a single option as it appears on the wire;
/// a 4-bit delta & 4-bit length header, optional extended delta & length bytes,
/// then the value.
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---------------+---------------+
/// |  Option Delta | Option Length |   1 byte
/// +---------------+---------------+
/// /         Option Delta          /   0-2 bytes
/// \          (extended)           \
/// +-------------------------------+
/// /         Option Length         /   0-2 bytes
/// \          (extended)           \
/// +-------------------------------+
/// /         Option Value          /   0 or more bytes
/// +-------------------------------+
/// ```
///
/// ## Option Numbers
/// An `Opt` does not know its own number; the number is the running sum of the
/// deltas of every option before it. [`OptIter`] tracks this sum for you.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Opt<'a> {
  /// See [`OptDelta`]
  pub delta: OptDelta,
  /// The option's value, borrowed from the buffer it was parsed from
  pub value: &'a [u8],
}

impl<'a> Opt<'a> {
  /// Parse a single option from the start of `bytes`, yielding the option and the
  /// number of bytes it occupied.
  ///
  /// A first byte of `0xFF` (the payload marker) yields [`OptParseError::OptionsExhausted`].
  ///
  /// ```
  /// use newt_msg::{Opt, OptDelta, OptParseError};
  ///
  /// let (opt, consumed) = Opt::parse(&[0xd1, 0x03, 0x12, 0xff]).unwrap();
  /// assert_eq!(opt, Opt { delta: OptDelta(16), value: &[0x12] });
  /// assert_eq!(consumed, 3);
  ///
  /// assert_eq!(Opt::parse(&[0xff, 0x00]), Err(OptParseError::OptionsExhausted));
  /// assert_eq!(Opt::parse(&[0xf0]), Err(OptParseError::OptionDeltaReservedValue(15)));
  /// ```
  pub fn parse(bytes: &'a [u8]) -> Result<(Opt<'a>, usize), OptParseError> {
    let mut cursor = Cursor::new(bytes);
    Opt::try_consume_bytes(&mut cursor).map(|opt| (opt, cursor.position()))
  }

  /// Number of bytes this option occupies on the wire
  pub fn get_size(&self) -> usize {
    let ext_size = |n: usize| match n {
      | n if n >= 269 => 2,
      | n if n >= 13 => 1,
      | _ => 0,
    };

    1 + ext_size(self.delta.0 as usize) + ext_size(self.value.len()) + self.value.len()
  }

  /// Write this option's bytes to a collection, refusing to write
  /// anything if the option would be larger than `max_len`.
  ///
  /// Returns the number of bytes written.
  ///
  /// ```
  /// use newt_msg::{BuildError, Opt, OptDelta};
  ///
  /// let opt = Opt { delta: OptDelta(4),
  ///                 value: b"path" };
  ///
  /// let mut bytes = Vec::new();
  /// assert_eq!(opt.encode(&mut bytes, 64), Ok(5));
  /// assert_eq!(bytes, vec![0x44, b'p', b'a', b't', b'h']);
  ///
  /// let mut bytes = Vec::new();
  /// assert_eq!(opt.encode(&mut bytes, 4),
  ///            Err(BuildError::TooLong { capacity: 4,
  ///                                      size: 5 }));
  /// assert!(bytes.is_empty());
  /// ```
  pub fn encode(&self, bytes: &mut impl Extend<u8>, max_len: usize) -> Result<usize, BuildError> {
    let len = u16::try_from(self.value.len()).map_err(|_| {
                                                BuildError::OptionValueTooLong(self.value.len())
                                              })?;

    let size = self.get_size();
    if size > max_len {
      return Err(BuildError::TooLong { capacity: max_len,
                                       size });
    }

    let (del, del_bytes) = opt_len_or_delta(self.delta.0);
    let (len, len_bytes) = opt_len_or_delta(len);

    bytes.extend(Some((del << 4) | len));
    bytes.extend(del_bytes);
    bytes.extend(len_bytes);
    bytes.extend(self.value.iter().copied());

    Ok(size)
  }
}

impl<'a> TryConsumeBytes<&'a [u8]> for Opt<'a> {
  type Error = OptParseError;

  fn try_consume_bytes(bytes: &mut Cursor<&'a [u8]>) -> Result<Self, Self::Error> {
    let byte1 = bytes.next()
                     .ok_or(OptParseError::OptionsExhausted)
                     .and_then(|b| {
                       if b == 0b11111111 {
                         Err(OptParseError::OptionsExhausted)
                       } else {
                         Ok(b)
                       }
                     })?;

    // delta's extended bytes come before length's
    let delta = parse_opt_len_or_delta(byte1 >> 4,
                                       bytes,
                                       OptParseError::OptionDeltaReservedValue(15),
                                       OptParseError::OptionNumberOverflow)?;

    let len = parse_opt_len_or_delta(byte1 & 0b00001111,
                                     bytes,
                                     OptParseError::ValueLengthReservedValue(15),
                                     OptParseError::ValueLengthOverflow)?;

    let value = bytes.take_slice(len as usize)
                     .ok_or(OptParseError::UnexpectedEndOfStream)?;

    Ok(Opt { delta: OptDelta(delta),
             value })
  }
}

/// The "Option Delta" is the difference between this Option's Number
/// and the previous Option's number.
///
/// # Related
/// - [RFC7252#section-3.1 Option Format](https://datatracker.ietf.org/doc/html/rfc7252#section-3.1)
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptDelta(pub u16);

/// # Option Number
/// Identifies which option is being set (e.g. Content-Format has a Number of 12).
///
/// The low bits of the number encode how a recipient that does not
/// recognize the option must treat it:
///
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// |           | NoCacheKey| U | C |
/// +---+---+---+---+---+---+---+---+
/// ```
///
/// See [`known`] for the numbers defined by the CoAP RFCs.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u16);

/// Whether an unrecognized option may be ignored
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OptionMustBeProcessed {
  /// This option must be processed,
  /// and a message that ignores it
  /// will be rejected.
  ///
  /// Corresponds to the option being "critical"
  /// in strict CoAP terms
  Yes,
  /// This option does not _need_ to
  /// be processed,
  /// and a message that ignores it
  /// will be processed anyway.
  ///
  /// Corresponds to the option being "elective"
  /// in strict CoAP terms
  No,
}

/// Whether a proxy may forward an option it does not recognize
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WhenOptionUnsupportedByProxy {
  /// This option /must be/ processed & understood by proxies
  /// and may not be forwarded blindly to their destination.
  ///
  /// Corresponds to the option being "UnSafe" to forward
  /// in strict CoAP terms
  Error,
  /// This option may not be processed & understood by proxies
  /// and may be forwarded blindly to their destination.
  ///
  /// Corresponds to the option being "SafeToForward"
  /// in strict CoAP terms
  Forward,
}

/// Whether an option is part of a proxy's cache key
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum WhenOptionChanges {
  /// Different values for this option should yield different
  /// cached responses.
  ///
  /// Corresponds to the option being not "NoCacheKey"
  /// in strict CoAP terms
  ResponseChanges,
  /// Different values for this option should yield the
  /// same cached response.
  ///
  /// Corresponds to the option being "NoCacheKey"
  /// in strict CoAP terms
  ResponseDoesNotChange,
}

impl OptNumber {
  /// Whether or not this option may be ignored by a server
  pub fn must_be_processed(&self) -> OptionMustBeProcessed {
    match self.0 & 0b1 {
      | 1 => OptionMustBeProcessed::Yes,
      | _ => OptionMustBeProcessed::No,
    }
  }

  /// Shorthand for `must_be_processed() == Yes`
  pub fn is_critical(&self) -> bool {
    self.must_be_processed() == OptionMustBeProcessed::Yes
  }

  /// Whether or not this option may be forwarded blindly by
  /// a proxy that does not support processing it
  pub fn when_unsupported_by_proxy(&self) -> WhenOptionUnsupportedByProxy {
    match (self.0 & 0b10) >> 1 {
      | 1 => WhenOptionUnsupportedByProxy::Error,
      | _ => WhenOptionUnsupportedByProxy::Forward,
    }
  }

  /// Whether or not different values for this option should
  /// yield proxies' cached response
  ///
  /// _(only meaningful when the option is safe to forward)_
  pub fn when_option_changes(&self) -> WhenOptionChanges {
    match self.0 & 0b11110 {
      | 0b11100 => WhenOptionChanges::ResponseDoesNotChange,
      | _ => WhenOptionChanges::ResponseChanges,
    }
  }
}

impl fmt::Display for OptNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn consume(bytes: &[u8]) -> Result<Opt<'_>, OptParseError> {
    Opt::try_consume_bytes(&mut Cursor::new(bytes))
  }

  #[test]
  fn parse_opt() {
    let opt = consume(&[0b00010001, 0b00000001]).unwrap();
    assert_eq!(opt,
               Opt { delta: OptDelta(1),
                     value: &[1] });

    let opt = consume(&[0b11010001, 0b00000001, 0b00000001]).unwrap();
    assert_eq!(opt,
               Opt { delta: OptDelta(14),
                     value: &[1] });

    let opt = consume(&[0b11100001, 0b00000000, 0b00000001, 0b00000001]).unwrap();
    assert_eq!(opt,
               Opt { delta: OptDelta(270),
                     value: &[1] });

    let opt = consume(&[0b00000001, 0b00000001]).unwrap();
    assert_eq!(opt,
               Opt { delta: OptDelta(0),
                     value: &[1] });
  }

  #[test]
  fn parse_malformed() {
    // length says 14 bytes, only 1 present
    assert_eq!(consume(&[0xae, 0xf0, 0x03]),
               Err(OptParseError::UnexpectedEndOfStream));

    // missing extended delta byte
    assert_eq!(consume(&[0xd0]), Err(OptParseError::UnexpectedEndOfStream));

    // missing one of two extended length bytes
    assert_eq!(consume(&[0x0e, 0x01]),
               Err(OptParseError::UnexpectedEndOfStream));

    assert_eq!(consume(&[0x1f]),
               Err(OptParseError::ValueLengthReservedValue(15)));
    assert_eq!(consume(&[]), Err(OptParseError::OptionsExhausted));
  }

  #[test]
  fn parse_overflow() {
    // 0xffff + 269 does not fit in a u16
    assert_eq!(consume(&[0xe0, 0xff, 0xff]),
               Err(OptParseError::OptionNumberOverflow));
    assert_eq!(consume(&[0x0e, 0xff, 0xff]),
               Err(OptParseError::ValueLengthOverflow));
  }

  #[test]
  fn encode_boundaries() {
    let cases: [(u16, &[u8]); 4] = [(12, &[0xc0]),
                                    (13, &[0xd0, 0x00]),
                                    (268, &[0xd0, 0xff]),
                                    (269, &[0xe0, 0x00, 0x00])];

    for (delta, expected) in cases {
      let opt = Opt { delta: OptDelta(delta),
                      value: &[] };
      let mut bytes = Vec::new();
      assert_eq!(opt.encode(&mut bytes, 8), Ok(expected.len()));
      assert_eq!(bytes, expected);
      assert_eq!(opt.get_size(), expected.len());
      assert_eq!(Opt::parse(&bytes), Ok((opt, expected.len())));
    }
  }

  #[test]
  fn delta_and_length_boundaries_survive_parse() {
    use itertools::Itertools;

    let value = [0u8; 270];
    let sizes = [0usize, 12, 13, 268, 269, 270];

    sizes.iter()
         .cartesian_product(sizes.iter())
         .for_each(|(&delta, &len)| {
           let opt = Opt { delta: OptDelta(delta as u16),
                           value: &value[..len] };
           let mut bytes = Vec::new();
           let written = opt.encode(&mut bytes, usize::MAX).unwrap();
           assert_eq!(Opt::parse(&bytes), Ok((opt, written)), "delta {} len {}", delta, len);
         });
  }

  #[test]
  fn encode_long_value() {
    let value = [7u8; 300];
    let opt = Opt { delta: OptDelta(35),
                    value: &value };

    let mut bytes = Vec::new();
    assert_eq!(opt.encode(&mut bytes, 1024), Ok(304));
    assert_eq!(&bytes[..4], &[0xde, 35 - 13, 0x00, 31]);
    assert_eq!(Opt::parse(&bytes), Ok((opt, 304)));
  }

  #[test]
  fn opt_number_qualities() {
    // critical, safe-to-fwd, cache-key
    let if_match = OptNumber(1);

    // critical, unsafe-to-fwd, cache-key
    let uri_host = OptNumber(3);

    // elective, safe-to-fwd, cache-key
    let etag = OptNumber(4);

    // elective, safe-to-fwd, no-cache-key
    let size1 = OptNumber(60);

    // elective, unsafe-to-fwd, cache-key (0x1e masked bits are 0b11110, not NoCacheKey)
    let unsafe_30 = OptNumber(30);

    [&if_match, &uri_host].into_iter()
                          .for_each(|num| assert!(num.is_critical()));

    [&etag, &size1].into_iter()
                   .for_each(|num| assert!(!num.is_critical()));

    [&if_match, &etag, &size1].into_iter().for_each(|num| {
                                            assert_eq!(num.when_unsupported_by_proxy(),
                                                       WhenOptionUnsupportedByProxy::Forward)
                                          });

    assert_eq!(uri_host.when_unsupported_by_proxy(),
               WhenOptionUnsupportedByProxy::Error);

    [&if_match, &uri_host, &etag, &unsafe_30].into_iter().for_each(|num| {
                                                           assert_eq!(num.when_option_changes(),
                                                                      WhenOptionChanges::ResponseChanges)
                                                         });

    assert_eq!(size1.when_option_changes(),
               WhenOptionChanges::ResponseDoesNotChange);
  }
}
