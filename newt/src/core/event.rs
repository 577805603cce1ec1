use newt_msg::{Pdu, Token};
use no_std_net::SocketAddr;

use crate::hash::Key;
use crate::net::Addrd;
use crate::observe::Removed;

/// Something that happened while handling a message
/// (or while retransmitting) that the application may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
  /// A CON message was retransmitted as many times as
  /// [`Con::max_retransmit`](crate::config::Con::max_retransmit) allows
  /// without being acknowledged, and was given up on.
  MessageDropped(Addrd<Pdu>),
  /// An observer was removed because they reset a notification,
  /// or stopped acknowledging them.
  ObserverRemoved {
    /// Key of the resource they were observing
    resource: Key,
    /// Who was observing
    peer: SocketAddr,
    /// The token of their subscription
    token: Token,
  },
  /// A response to one of our requests arrived
  Response(Addrd<Pdu>),
}

impl From<Removed> for Event {
  fn from(r: Removed) -> Self {
    Event::ObserverRemoved { resource: r.resource,
                             peer: r.subscription.peer,
                             token: r.subscription.token }
  }
}
