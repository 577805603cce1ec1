use std_alloc::vec::Vec;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::known::Block;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::from_bytes::TryConsumeBytes;
use crate::{BuildError, Cursor, TryFromBytes};

/// Size of the fixed message header: version, type, token length, code & id
pub const HEADER_SIZE: usize = 4;

/// Byte separating the options from the payload
pub const PAYLOAD_MARKER: u8 = 0xff;

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl From<u8> for Byte1 {
  fn from(b: u8) -> Self {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Byte1 { ver: Version(ver),
            ty: Type::from_bits(ty),
            tkl }
  }
}

/// # `Pdu` struct
/// A CoAP message, stored in its wire format.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |Ver| T |  TKL  |      Code     |          Message ID           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Token (if any, TKL bytes) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Options (if any) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |1 1 1 1 1 1 1 1|    Payload (if any) ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// ## Building
/// A `Pdu` is built front to back: [`Pdu::init`] writes the header,
/// then [`Pdu::add_token`], then [`Pdu::add_option`] in non-decreasing
/// option number order, then at most one [`Pdu::add_payload`].
///
/// A `Pdu` never grows past its `max_size`, and a failed `add_*`
/// leaves the message exactly as it was.
///
/// ## Parsing
/// [`TryFromBytes`] validates a whole datagram up front, so accessors on a
/// parsed `Pdu` never fail. The parsed `Pdu`'s `max_size` is the datagram's length.
///
/// ```
/// use newt_msg::{Code, Id, Pdu, TryFromBytes, Type};
///
/// let msg = Pdu::try_from_bytes([0x55, 0x69, 0x12, 0x34, b't', b'o', b'k', b'e', b'n']).unwrap();
/// assert_eq!(msg.ty(), Type::Non);
/// assert_eq!(msg.code(), Code::new(3, 9));
/// assert_eq!(msg.id(), Id(0x1234));
/// assert_eq!(msg.token(), b"token");
/// assert_eq!(msg.payload(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pdu {
  bytes: Vec<u8>,
  max_size: usize,
  last_opt: OptNumber,
  payload_at: Option<usize>,
}

impl Pdu {
  /// Create a message containing only a header.
  ///
  /// `max_size` is the largest the message is allowed to grow, and is never
  /// less than the 4-byte header.
  pub fn init(ty: Type, code: Code, id: Id, max_size: usize) -> Self {
    let max_size = max_size.max(HEADER_SIZE);
    let mut bytes = Vec::with_capacity(max_size);

    let byte1 = Byte1 { ver: Version::default(),
                        ty,
                        tkl: 0 };
    bytes.push(byte1.into());
    bytes.push(code.into());
    bytes.extend(<[u8; 2]>::from(id));

    Self { bytes,
           max_size,
           last_opt: OptNumber(0),
           payload_at: None }
  }

  /// Set the token. Must be done before any options or payload are added.
  ///
  /// Adding an empty token does nothing.
  ///
  /// ```
  /// use newt_msg::{known, BuildError, Code, Id, Pdu, Type};
  ///
  /// let mut msg = Pdu::init(Type::Con, Code::GET, Id(1), 16);
  /// assert_eq!(msg.add_token(&[0; 9]), Err(BuildError::TokenTooLong(9)));
  /// msg.add_token(b"abc").unwrap();
  /// msg.add_option(known::URI_PATH, b"a").unwrap();
  /// assert_eq!(msg.add_token(b"def"), Err(BuildError::TokenAfterOptions));
  /// assert_eq!(msg.token(), b"abc");
  /// ```
  pub fn add_token(&mut self, token: &[u8]) -> Result<(), BuildError> {
    if token.len() > 8 {
      return Err(BuildError::TokenTooLong(token.len()));
    }

    if token.is_empty() {
      return Ok(());
    }

    if self.bytes.len() > HEADER_SIZE {
      return Err(BuildError::TokenAfterOptions);
    }

    let size = HEADER_SIZE + token.len();
    if size > self.max_size {
      return Err(BuildError::TooLong { capacity: self.max_size,
                                       size });
    }

    self.bytes[0] = (self.bytes[0] & 0xf0) | token.len() as u8;
    self.bytes.extend_from_slice(token);
    Ok(())
  }

  /// Append an option, returning the number of bytes written.
  ///
  /// Options must be added in non-decreasing order of number; the
  /// option's delta is computed from the last option added.
  ///
  /// ```
  /// use newt_msg::{known, BuildError, Code, Id, Pdu, Type};
  ///
  /// let mut msg = Pdu::init(Type::Con, Code::GET, Id(1), 64);
  /// assert_eq!(msg.add_option(known::URI_PATH, b"path"), Ok(5));
  /// assert_eq!(msg.add_option(known::URI_HOST, b"host"),
  ///            Err(BuildError::OptionOutOfOrder { last: known::URI_PATH,
  ///                                               next: known::URI_HOST }));
  /// ```
  pub fn add_option(&mut self, number: OptNumber, value: &[u8]) -> Result<usize, BuildError> {
    if self.payload_at.is_some() {
      return Err(BuildError::PayloadAlreadyAdded);
    }

    if number < self.last_opt {
      return Err(BuildError::OptionOutOfOrder { last: self.last_opt,
                                                next: number });
    }

    let len = self.bytes.len();
    let capacity = self.max_size;
    let opt = Opt { delta: OptDelta(number.0 - self.last_opt.0),
                    value };

    let written = opt.encode(&mut self.bytes, capacity - len)
                     .map_err(|e| match e {
                       | BuildError::TooLong { size, .. } => BuildError::TooLong { capacity,
                                                                                  size: len + size },
                       | e => e,
                     })?;

    self.last_opt = number;
    Ok(written)
  }

  /// Append a payload. A message may have at most one.
  ///
  /// Adding an empty payload does nothing, since a payload marker must
  /// always be followed by at least one byte.
  ///
  /// ```
  /// use newt_msg::{BuildError, Code, Id, Pdu, Type};
  ///
  /// let mut msg = Pdu::init(Type::Non, Code::CONTENT, Id(1), 8);
  /// assert_eq!(msg.add_payload(b"too long"),
  ///            Err(BuildError::TooLong { capacity: 8,
  ///                                      size: 13 }));
  /// assert_eq!(msg.payload(), None);
  ///
  /// msg.add_payload(b"hi").unwrap();
  /// assert_eq!(msg.payload(), Some(b"hi".as_ref()));
  /// ```
  pub fn add_payload(&mut self, data: &[u8]) -> Result<(), BuildError> {
    if data.is_empty() {
      return Ok(());
    }

    if self.payload_at.is_some() {
      return Err(BuildError::PayloadAlreadyAdded);
    }

    let size = self.bytes.len() + 1 + data.len();
    if size > self.max_size {
      return Err(BuildError::TooLong { capacity: self.max_size,
                                       size });
    }

    self.bytes.push(PAYLOAD_MARKER);
    self.payload_at = Some(self.bytes.len());
    self.bytes.extend_from_slice(data);
    Ok(())
  }

  /// Remove all options and the payload, keeping the header and token
  pub fn clear(&mut self) {
    self.bytes.truncate(HEADER_SIZE + self.tkl());
    self.last_opt = OptNumber(0);
    self.payload_at = None;
  }

  fn tkl(&self) -> usize {
    usize::from(self.bytes[0] & 0b1111)
  }

  fn opts_bytes(&self) -> &[u8] {
    let start = HEADER_SIZE + self.tkl();
    let end = self.payload_at
                  .map(|p| p - 1)
                  .unwrap_or_else(|| self.bytes.len());
    &self.bytes[start..end]
  }

  /// see [`Version`]
  pub fn ver(&self) -> Version {
    Byte1::from(self.bytes[0]).ver
  }

  /// see [`Type`]
  pub fn ty(&self) -> Type {
    Byte1::from(self.bytes[0]).ty
  }

  /// see [`Code`]
  pub fn code(&self) -> Code {
    Code::from(self.bytes[1])
  }

  /// see [`Id`]
  pub fn id(&self) -> Id {
    Id::from_be_bytes([self.bytes[2], self.bytes[3]])
  }

  /// see [`Token`]
  pub fn token(&self) -> &[u8] {
    &self.bytes[HEADER_SIZE..HEADER_SIZE + self.tkl()]
  }

  /// Copy the token out of the message
  pub fn token_owned(&self) -> Token {
    Token(self.token().iter().copied().take(8).collect())
  }

  /// The payload, if there is one
  pub fn payload(&self) -> Option<&[u8]> {
    self.payload_at.map(|p| &self.bytes[p..])
  }

  /// The number of the last option added
  pub fn last_opt(&self) -> OptNumber {
    self.last_opt
  }

  /// Overwrite the message type
  pub fn set_ty(&mut self, ty: Type) {
    self.bytes[0] = (self.bytes[0] & 0b1100_1111) | (u8::from(ty) << 4);
  }

  /// Overwrite the message code
  pub fn set_code(&mut self, code: Code) {
    self.bytes[1] = code.into();
  }

  /// Overwrite the message id
  pub fn set_id(&mut self, id: Id) {
    let [a, b] = <[u8; 2]>::from(id);
    self.bytes[2] = a;
    self.bytes[3] = b;
  }

  /// Current size of the message in bytes
  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  /// Whether the message is just a header; no token, options or payload
  pub fn is_empty(&self) -> bool {
    self.bytes.len() == HEADER_SIZE
  }

  /// The size this message may not grow past
  pub fn max_size(&self) -> usize {
    self.max_size
  }

  /// The message's wire format
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  /// Iterate over every option in the message
  pub fn opts(&self) -> OptIter<'_> {
    OptIter::new(self.opts_bytes(), None)
  }

  /// Iterate over the options in the message that pass `filter`.
  ///
  /// Since [`OptFilter`] may yield false positives for large option numbers,
  /// callers that need an exact match should also compare the yielded number.
  pub fn opts_filtered(&self, filter: OptFilter) -> OptIter<'_> {
    OptIter::new(self.opts_bytes(), Some(filter))
  }

  /// The value of the first option with a given number
  ///
  /// ```
  /// use newt_msg::{known, Code, Id, Pdu, Type};
  ///
  /// let mut msg = Pdu::init(Type::Con, Code::GET, Id(1), 64);
  /// msg.add_option(known::URI_PATH, b"a").unwrap();
  /// msg.add_option(known::URI_PATH, b"b").unwrap();
  ///
  /// assert_eq!(msg.opt(known::URI_PATH), Some(b"a".as_ref()));
  /// assert_eq!(msg.opt(known::URI_QUERY), None);
  /// ```
  pub fn opt(&self, number: OptNumber) -> Option<&[u8]> {
    self.opts_filtered(OptFilter::from_iter([number]))
        .find(|(n, _)| *n == number)
        .map(|(_, v)| v)
  }

  /// Read a [`Block`] option ([`known::BLOCK1`] or [`known::BLOCK2`])
  pub fn block(&self, number: OptNumber) -> Option<Block> {
    self.opt(number).map(Block::decode)
  }
}

impl<Bytes: AsRef<[u8]>> TryFromBytes<Bytes> for Pdu {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: Bytes) -> Result<Self, Self::Error> {
    let bytes = bytes.as_ref();
    let mut cursor = Cursor::new(bytes);

    let Byte1 { ver, tkl, .. } = cursor.next().ok_or_else(MessageParseError::eof)?.into();

    if ver != Version(1) {
      return Err(Self::Error::InvalidVersion(ver.0));
    }

    if tkl > 8 {
      return Err(Self::Error::InvalidTokenLength(tkl));
    }

    let code: Code = cursor.next().ok_or_else(MessageParseError::eof)?.into();
    Id::try_consume_bytes(&mut cursor)?;

    if code == Code::EMPTY && bytes.len() != HEADER_SIZE {
      return Err(Self::Error::EmptyMessageNotEmpty);
    }

    cursor.take_exact(tkl as usize)
          .ok_or_else(MessageParseError::eof)?;

    let mut at = cursor.position();
    let mut number = 0u16;
    let payload_at = loop {
      match Opt::parse(&bytes[at..]) {
        | Ok((opt, size)) => {
          number = number.checked_add(opt.delta.0)
                         .ok_or(OptParseError::OptionNumberOverflow)?;
          at += size;
        },
        | Err(OptParseError::OptionsExhausted) if at < bytes.len() => break Some(at + 1),
        | Err(OptParseError::OptionsExhausted) => break None,
        | Err(e) => return Err(e.into()),
      }
    };

    if payload_at == Some(bytes.len()) {
      return Err(Self::Error::PayloadMarkerWithoutPayload);
    }

    Ok(Pdu { bytes: bytes.to_vec(),
             max_size: bytes.len(),
             last_opt: OptNumber(number),
             payload_at })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_eqb_iter;

  fn parse(bytes: &[u8]) -> Result<Pdu, MessageParseError> {
    Pdu::try_from_bytes(bytes)
  }

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    let parsed = Pdu::try_from_bytes(&msg).unwrap();
    assert_eq!(parsed, expect);
    assert_eq!(parsed.opt(known::CONTENT_FORMAT),
               Some(b"application/json".as_ref()));
    assert_eq!(parsed.payload(), Some(b"hello, world!".as_ref()));
  }

  #[test]
  fn build_msg() {
    let (msg, expect) = crate::test_msg();
    assert_eqb_iter!(msg.as_bytes(), expect);
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::from(byte);
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn parse_id() {
    let mut id_bytes = Cursor::new(34u16.to_be_bytes());
    let id = Id::try_consume_bytes(&mut id_bytes).unwrap();
    assert_eq!(id, Id(34));
  }

  #[test]
  fn parse_header_only() {
    let msg = parse(&[0x40, 0x01, 0x93, 0x34]).unwrap();
    assert_eq!(msg.ty(), Type::Con);
    assert_eq!(msg.code(), Code::GET);
    assert_eq!(msg.id(), Id(0x9334));
    assert!(msg.is_empty());
    assert_eq!(msg.opts().count(), 0);
  }

  #[test]
  fn parse_truncated_token() {
    assert_eq!(parse(&[0x55, 0x69, 0x12, 0x34, b't', b'o', b'k', b'e']),
               Err(MessageParseError::UnexpectedEndOfStream));
  }

  #[test]
  fn parse_token_too_long() {
    assert_eq!(parse(&[0x59, 0x69, 0x12, 0x34, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
               Err(MessageParseError::InvalidTokenLength(9)));
  }

  #[test]
  fn parse_bad_version() {
    assert_eq!(parse(&[0x80, 0x01, 0x12, 0x34]),
               Err(MessageParseError::InvalidVersion(2)));
  }

  #[test]
  fn parse_opts() {
    let msg = parse(&[0x55, 0x73, 0x12, 0x34, b't', b'o', b'k', b'e', b'n', 0x00, 0xc1, 0x00]).unwrap();
    assert_eq!(msg.opts().collect::<Vec<_>>(),
               vec![(OptNumber(0), b"".as_ref()), (OptNumber(12), [0u8].as_ref())]);
    assert_eq!(msg.last_opt(), OptNumber(12));
  }

  #[test]
  fn parse_opt_overruns_message() {
    assert_eq!(parse(&[0x55, 0x73, 0x12, 0x34, b't', b'o', b'k', b'e', b'n', 0x00, 0xae, 0xf0, 0x03]),
               Err(MessageParseError::OptParseError(OptParseError::UnexpectedEndOfStream)));
  }

  #[test]
  fn parse_marker_without_payload() {
    assert_eq!(parse(&[0x50, 0x73, 0x12, 0x34, 0xff]),
               Err(MessageParseError::PayloadMarkerWithoutPayload));
  }

  #[test]
  fn parse_payload() {
    let msg = parse(&[0x50, 0x73, 0x12, 0x34, 0xff, b'p', b'a', b'y', b'l', b'o', b'a', b'd']).unwrap();
    assert_eq!(msg.payload(), Some(b"payload".as_ref()));
    assert_eq!(msg.opts().count(), 0);
  }

  #[test]
  fn parse_empty_ack_and_reset() {
    for ty in [0x60, 0x70] {
      assert!(parse(&[ty, 0x00, 0x12, 0x34]).is_ok());
      assert_eq!(parse(&[ty, 0x00, 0x12, 0x34, 0xff, 0x01]),
                 Err(MessageParseError::EmptyMessageNotEmpty));
      assert_eq!(parse(&[ty | 1, 0x00, 0x12, 0x34, 0x01]),
                 Err(MessageParseError::EmptyMessageNotEmpty));
    }
  }

  #[test]
  fn parse_opt_number_overflow() {
    let bytes = [0x40, 0x01, 0x12, 0x34, 0xe0, 0xfe, 0xf2, 0xe0, 0x00, 0x00];
    assert_eq!(parse(&bytes),
               Err(MessageParseError::OptParseError(OptParseError::OptionNumberOverflow)));
  }

  #[test]
  fn encode_token() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 16);
    msg.add_token(b"token").unwrap();
    assert_eq!(msg.as_bytes(),
               &[0x45, 0x01, 0x12, 0x34, b't', b'o', b'k', b'e', b'n']);
    assert_eq!(msg.len(), 9);
  }

  #[test]
  fn encode_token_too_big_for_max_size() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 6);
    assert_eq!(msg.add_token(b"token"),
               Err(BuildError::TooLong { capacity: 6,
                                         size: 9 }));
    assert!(msg.is_empty());
  }

  #[test]
  fn encode_options() {
    let mut msg = Pdu::init(Type::Ack, Code::new(4, 25), Id(0x1234), 64);

    assert_eq!(msg.add_option(known::URI_HOST, b"fancyproxy.coap.me"), Ok(20));
    assert_eq!(msg.add_option(known::URI_PATH, b"path"), Ok(5));
    assert_eq!(msg.add_option(known::URI_PATH, b""), Ok(1));
    assert_eq!(msg.add_option(OptNumber(8000), b"fancyopt"), Ok(11));

    let expect = [&[0x60, 0x99, 0x12, 0x34, 0x3d, 0x05][..],
                  b"fancyproxy.coap.me",
                  &[0x84],
                  b"path",
                  &[0x00, 0xe8, 0x1e, 0x28],
                  b"fancyopt"].concat();

    assert_eq!(msg.len(), 41);
    assert_eqb_iter!(msg.as_bytes(), expect);
  }

  #[test]
  fn encode_token_options_payload_marker() {
    let mut msg = Pdu::init(Type::Ack, Code::NOT_FOUND, Id(0x1234), 40);
    msg.add_token(b"12345678").unwrap();
    assert_eq!(msg.add_option(known::IF_MATCH, b"ABCDEFGH"), Ok(9));
    assert_eq!(msg.add_option(known::ACCEPT, &[0x12]), Ok(3));

    let expect = [&[0x68, 0x84, 0x12, 0x34][..],
                  b"12345678",
                  &[0x18],
                  b"ABCDEFGH",
                  &[0xd1, 0x03, 0x12]].concat();
    assert_eqb_iter!(msg.as_bytes(), expect);
  }

  #[test]
  fn encode_payload() {
    let mut msg = Pdu::init(Type::Non, Code::POST, Id(0x1234), 16);
    msg.add_payload(b"12345678").unwrap();
    assert_eq!(msg.as_bytes(),
               &[0x50, 0x02, 0x12, 0x34, 0xff, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8']);
    assert_eq!(msg.add_payload(b"9"), Err(BuildError::PayloadAlreadyAdded));
    assert_eq!(msg.add_option(known::URI_PATH, b"a"),
               Err(BuildError::PayloadAlreadyAdded));
  }

  #[test]
  fn encode_one_byte_payload() {
    let mut msg = Pdu::init(Type::Con, Code::new(2, 3), Id(0x1234), 8);
    msg.add_token(&[0x00, 0x01]).unwrap();
    msg.add_payload(&[0x00]).unwrap();
    assert_eq!(msg.as_bytes(), &[0x42, 0x43, 0x12, 0x34, 0x00, 0x01, 0xff, 0x00]);
  }

  #[test]
  fn encode_extended_delta_and_length() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 64);
    msg.add_option(known::IF_NONE_MATCH, b"").unwrap();
    msg.add_option(known::PROXY_URI, b"coap://example.com").unwrap();

    assert_eq!(&msg.as_bytes()[4..8], &[0x50, 0xdd, 0x11, 0x05]);
    assert_eq!(msg.opt(known::PROXY_URI), Some(b"coap://example.com".as_ref()));
  }

  #[test]
  fn encode_payload_too_long() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 12);
    assert_eq!(msg.add_payload(b"0123456789"),
               Err(BuildError::TooLong { capacity: 12,
                                         size: 15 }));
    assert_eq!(msg.payload(), None);
    assert_eq!(msg.len(), 4);
  }

  #[test]
  fn encode_option_too_long() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 8);
    assert_eq!(msg.add_option(known::URI_PATH, b"toolong"),
               Err(BuildError::TooLong { capacity: 8,
                                         size: 12 }));
    assert!(msg.is_empty());
    assert_eq!(msg.last_opt(), OptNumber(0));
  }

  #[test]
  fn encode_out_of_order_is_unchanged() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 64);
    msg.add_option(known::URI_PATH, b"a").unwrap();
    let before = msg.clone();
    assert!(msg.add_option(known::URI_HOST, b"b").is_err());
    assert_eq!(msg, before);

    assert_eq!(msg.add_option(OptNumber(18), b"12345678"), Ok(9));
    assert_eq!(msg.as_bytes()[6], 0x78);
  }

  #[test]
  fn empty_token_and_payload_are_noops() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(0x1234), 4);
    msg.add_token(&[]).unwrap();
    msg.add_payload(&[]).unwrap();
    assert!(msg.is_empty());
    assert_eq!(msg.payload(), None);
  }

  #[test]
  fn rewrite_header() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(1), 32);
    msg.add_token(b"tok").unwrap();
    msg.add_option(known::URI_PATH, b"a").unwrap();
    msg.add_payload(b"body").unwrap();

    msg.set_ty(Type::Ack);
    msg.set_code(Code::CONTENT);
    msg.set_id(Id(0xbeef));
    assert_eq!(msg.ty(), Type::Ack);
    assert_eq!(msg.code(), Code::CONTENT);
    assert_eq!(msg.id(), Id(0xbeef));
    assert_eq!(msg.token(), b"tok");

    msg.clear();
    assert_eq!(msg.opts().count(), 0);
    assert_eq!(msg.payload(), None);
    assert_eq!(msg.token(), b"tok");
    msg.add_option(known::URI_HOST, b"h").unwrap();
  }

  #[test]
  fn block2() {
    let mut msg = Pdu::init(Type::Con, Code::GET, Id(1), 32);
    msg.add_option(known::BLOCK2, &Block { num: 3,
                                           more: false,
                                           szx: 2 }.encode())
       .unwrap();
    assert_eq!(msg.block(known::BLOCK2),
               Some(Block { num: 3,
                            more: false,
                            szx: 2 }));
    assert_eq!(msg.block(known::BLOCK1), None);
  }
}
