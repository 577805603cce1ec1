use core::fmt;

use newt_msg::Pdu;

/// One-line description of a message for log lines,
/// e.g. `Con 0.01 id=4660 token=0a0b opts=12b payload=0b`
pub(crate) struct Summary<'a>(pub &'a Pdu);

impl<'a> fmt::Display for Summary<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let pdu = self.0;
    let payload = pdu.payload().map(|p| p.len()).unwrap_or(0);
    let marker = if payload > 0 { 1 } else { 0 };
    let opts = pdu.len()
                 .saturating_sub(newt_msg::HEADER_SIZE + pdu.token().len() + payload + marker);

    write!(f, "{:?} {} id={} token=", pdu.ty(), pdu.code(), pdu.id().0)?;
    pdu.token().iter().try_for_each(|b| write!(f, "{:02x}", b))?;
    write!(f, " opts={}b payload={}b", opts, payload)
  }
}
