use crate::uint;

/// When included in a GET request, the Observe Option extends the GET
/// method so it does not only retrieve a current representation of the
/// target resource, but also requests the server to add or remove an
/// entry in the list of observers of the resource depending on the
/// option value.  The list entry consists of the client endpoint and the
/// token specified by the client in the request.  Possible values are:
///
///    `0` (register) adds the entry to the list, if not present;
///
///    `1` (deregister) removes the entry from the list, if present
#[derive(Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Action {
  /// Tells the resource owner we would like to observe updates to
  /// the resource we've issued a GET request for.
  Register,
  /// Tells the resource owner we would no longer like to observe updates to
  /// the resource we've issued a GET request for.
  Deregister,
}

impl Action {
  /// Try to parse from an option value
  ///
  /// ```
  /// use newt_msg::known::observe::Action;
  ///
  /// assert_eq!(Action::from_value(&[]), Some(Action::Register));
  /// assert_eq!(Action::from_value(&[1]), Some(Action::Deregister));
  /// assert_eq!(Action::from_value(&[2]), None);
  /// ```
  pub fn from_value(value: &[u8]) -> Option<Self> {
    match uint::decode(value) {
      | 0 => Some(Action::Register),
      | 1 => Some(Action::Deregister),
      | _ => None,
    }
  }
}

impl From<Action> for u8 {
  fn from(a: Action) -> Self {
    match a {
      | Action::Register => 0,
      | Action::Deregister => 1,
    }
  }
}

/// Observe sequence numbers in notifications are 24 bits wide
pub const SEQ_MASK: u32 = 0x00ff_ffff;
