/// Version of the CoAP protocol that the message adheres to.
///
/// RFC7252 only defines version 1; [`crate::Pdu`] rejects anything else
/// when parsing.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Debug)]
pub struct Version(pub u8);

impl Default for Version {
  fn default() -> Self {
    Version(1)
  }
}
