use newt_msg::{BuildError, Id, Token};
use no_std_net::SocketAddr;

/// An error encounterable from within Core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error<E> {
  /// The error that occurred
  pub what: What<E>,
  /// What were we doing when it happened?
  pub when: When,
}

/// The context that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// Receiving a datagram
  Polling,
  /// Sending a message to a peer
  SendingMessage(Option<SocketAddr>, Id, Token),
  /// Retransmitting unacknowledged CON messages
  Retransmitting,
  /// Notifying observers of changed resources
  Notifying,
  /// Anything else
  None,
}

impl When {
  /// Construct a specific error from the context an error occurred in
  ///
  /// ```
  /// use newt::core::{What, When};
  ///
  /// let err = When::Polling.what(What::<()>::ClockError);
  /// assert_eq!(err.when, When::Polling);
  /// ```
  pub fn what<E>(self, what: What<E>) -> Error<E> {
    Error { what, when: self }
  }
}

/// A contextless error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum What<E> {
  /// Some socket operation failed
  SockError(E),
  /// Building a message failed
  ToBytes(BuildError),
  /// The clock failed to provide timing.
  ///
  /// See [`embedded_time::clock::Error`]
  ClockError,
}
