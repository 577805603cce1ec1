use blake2::digest::typenum::U4;
use blake2::{Blake2b, Digest};
use newt_msg::{known, OptFilter, Pdu};

/// The path of the resource that answers discovery requests
pub const WELL_KNOWN_CORE: &str = ".well-known/core";

/// # Resource Key
/// 4-byte digest of a resource's path, used to find the resource
/// a request is addressed to without comparing strings.
///
/// Path segments are digested one at a time, each prefixed by its length,
/// so `a/bc` and `ab/c` have different keys.
///
/// ```
/// use newt::hash::Key;
///
/// assert_eq!(Key::from_uri("/sensors/temp"), Key::from_uri("sensors/temp"));
/// assert_eq!(Key::from_uri("sensors/temp"), Key::from_uri("sensors//./temp?unit=c"));
/// assert_ne!(Key::from_uri("a/bc"), Key::from_uri("ab/c"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Key(pub [u8; 4]);

impl Key {
  /// Digest a sequence of path segments
  ///
  /// Empty segments and dot-segments (`.` & `..`) are skipped.
  pub fn from_segments<'a, I>(segments: I) -> Self
    where I: IntoIterator<Item = &'a [u8]>
  {
    let mut hasher = Blake2b::<U4>::new();

    segments.into_iter()
            .filter(|seg| is_segment(seg))
            .for_each(|seg| {
              hasher.update((seg.len() as u16).to_be_bytes());
              hasher.update(seg);
            });

    let mut key = [0u8; 4];
    key.copy_from_slice(&hasher.finalize());
    Key(key)
  }

  /// Digest the path of a URI; anything after `?` or `#` is ignored.
  pub fn from_uri(uri: &str) -> Self {
    Self::from_segments(segments(uri).map(str::as_bytes))
  }

  /// The key of the resource a request is addressed to,
  /// computed from its Uri-Path options.
  ///
  /// ```
  /// use newt::hash::Key;
  /// use newt_msg::{known, Code, Id, Pdu, Type};
  ///
  /// let mut req = Pdu::init(Type::Con, Code::GET, Id(1), 64);
  /// req.add_option(known::URI_PATH, b"sensors").unwrap();
  /// req.add_option(known::URI_PATH, b"temp").unwrap();
  ///
  /// assert_eq!(Key::of_request(&req), Key::from_uri("/sensors/temp"));
  /// ```
  pub fn of_request(req: &Pdu) -> Self {
    Self::from_segments(req.opts_filtered(OptFilter::from_iter([known::URI_PATH]))
                           .filter(|(n, _)| *n == known::URI_PATH)
                           .map(|(_, v)| v))
  }

  /// The key of `/.well-known/core`
  pub fn well_known() -> Self {
    Self::from_uri(WELL_KNOWN_CORE)
  }

  /// Whether this is the key of `/.well-known/core`
  pub fn is_well_known(&self) -> bool {
    *self == Self::well_known()
  }
}

/// The path of a URI, without a leading `/`, query or fragment
///
/// ```
/// use newt::hash::path;
///
/// assert_eq!(path("/a/b?c=d"), "a/b");
/// assert_eq!(path("a#frag"), "a");
/// ```
pub fn path(uri: &str) -> &str {
  let uri = uri.strip_prefix('/').unwrap_or(uri);
  uri.split(|c| c == '?' || c == '#').next().unwrap_or(uri)
}

/// The `/`-delimited segments of a URI's path
pub fn segments(uri: &str) -> impl Iterator<Item = &str> {
  path(uri).split('/')
}

fn is_segment(seg: &[u8]) -> bool {
  !matches!(seg, b"" | b"." | b"..")
}
