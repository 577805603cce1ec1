use core::fmt;

/// # Message Code
/// 8-bit unsigned integer, split into a 3-bit class (most
/// significant bits) and a 5-bit detail (least significant bits),
/// documented as `c.dd` where `c` is 0 to 7 and `dd` is 00 to 31.
///
/// |class|meaning|
/// |---|---|
/// |`0`|Request (or Empty when `0.00`)|
/// |`2`|Success response|
/// |`4`|Client error response|
/// |`5`|Server error response|
///
/// ```
/// use newt_msg::Code;
///
/// assert_eq!(Code::new(2, 5).to_string(), "2.05");
/// assert_eq!(u8::from(Code::new(2, 5)), 0x45);
/// assert_eq!(Code::from(0x84), Code::NOT_FOUND);
/// ```
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Code {
  /// The "class" of message codes identify it as a request or response, and provides the class of response status
  pub class: u8,

  /// 2-digit integer (range `[0, 32)`) that provides granular information about the response status.
  pub detail: u8,
}

/// Whether a code is a request, response or empty
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum CodeKind {
  /// `0.00`
  Empty,
  /// `0.01` to `0.31`
  Request,
  /// `2.00` to `5.31`
  Response,
  /// Classes 1, 6 and 7 are reserved
  Reserved,
}

macro_rules! code {
  ($(#[$doc:meta])* $name:ident = $c:literal . $d:literal) => {
    $(#[$doc])*
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: Code = Code::new($c, $d);
  };
}

impl Code {
  code!(
    /// `0.00`
    EMPTY = 0 . 00
  );
  code!(
    /// `0.01`
    GET = 0 . 01
  );
  code!(
    /// `0.02`
    POST = 0 . 02
  );
  code!(
    /// `0.03`
    PUT = 0 . 03
  );
  code!(
    /// `0.04`
    DELETE = 0 . 04
  );
  code!(
    /// `2.01`
    CREATED = 2 . 01
  );
  code!(
    /// `2.02`
    DELETED = 2 . 02
  );
  code!(
    /// `2.03`
    VALID = 2 . 03
  );
  code!(
    /// `2.04`
    CHANGED = 2 . 04
  );
  code!(
    /// `2.05`
    CONTENT = 2 . 05
  );
  code!(
    /// `4.00`
    BAD_REQUEST = 4 . 00
  );
  code!(
    /// `4.02`, sent when a request carries critical options we do not understand
    BAD_OPTION = 4 . 02
  );
  code!(
    /// `4.04`
    NOT_FOUND = 4 . 04
  );
  code!(
    /// `4.05`
    METHOD_NOT_ALLOWED = 4 . 05
  );
  code!(
    /// `5.00`
    INTERNAL_SERVER_ERROR = 5 . 00
  );
  code!(
    /// `5.03`
    SERVICE_UNAVAILABLE = 5 . 03
  );

  /// Create a new Code
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// Is this code Empty, a request or a response?
  ///
  /// ```
  /// use newt_msg::{Code, CodeKind};
  ///
  /// assert_eq!(Code::EMPTY.kind(), CodeKind::Empty);
  /// assert_eq!(Code::GET.kind(), CodeKind::Request);
  /// assert_eq!(Code::NOT_FOUND.kind(), CodeKind::Response);
  /// assert_eq!(Code::new(7, 0).kind(), CodeKind::Reserved);
  /// ```
  pub fn kind(&self) -> CodeKind {
    match (self.class, self.detail) {
      | (0, 0) => CodeKind::Empty,
      | (0, _) => CodeKind::Request,
      | (2..=5, _) => CodeKind::Response,
      | _ => CodeKind::Reserved,
    }
  }

  /// Get the human string representation of a message code
  ///
  /// Returns a `char` array to avoid allocating; see the [`fmt::Display`] impl
  /// if you want a string.
  pub fn to_human(&self) -> [char; 4] {
    let to_char = |d: u8| char::from_digit(d.into(), 10).unwrap_or('?');
    [to_char(self.class),
     '.',
     to_char(self.detail / 10),
     to_char(self.detail % 10)]
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.to_human().iter().try_for_each(|c| fmt::Write::write_char(f, *c))
  }
}

impl From<u8> for Code {
  fn from(b: u8) -> Self {
    let class = b >> 5;
    let detail = b & 0b0011111;

    Code { class, detail }
  }
}

impl From<Code> for u8 {
  fn from(code: Code) -> u8 {
    let class = code.class << 5;
    let detail = code.detail;

    class | detail
  }
}
