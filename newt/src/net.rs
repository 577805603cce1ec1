use no_std_net::SocketAddr;

/// Data that came from (or is going to) a network socket
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Addrd<T>(pub T, pub SocketAddr);

impl<T> Addrd<T> {
  /// Borrow the contents of this Addressed
  pub fn as_ref(&self) -> Addrd<&T> {
    Addrd(self.data(), self.addr())
  }

  /// Map the data contained in this Addressed
  pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Addrd<R> {
    Addrd(f(self.0), self.1)
  }

  /// Map the data contained in this Addressed (with a copy of the address)
  pub fn map_with_addr<R>(self, f: impl FnOnce(T, SocketAddr) -> R) -> Addrd<R> {
    Addrd(f(self.0, self.1), self.1)
  }

  /// Borrow the contents of the addressed item
  pub fn data(&self) -> &T {
    &self.0
  }

  /// Copy the socket address for the data
  pub fn addr(&self) -> SocketAddr {
    self.1
  }

  /// Turn the entire structure into something else
  pub fn fold<R>(self, f: impl FnOnce(T, SocketAddr) -> R) -> R {
    f(self.0, self.1)
  }
}

/// The local network interface a datagram arrived on,
/// and that responses to it should leave from.
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Interface {
  /// OS interface index; 0 when unknown
  pub index: u32,
  /// Local address of the endpoint on this interface
  pub addr: SocketAddr,
}

/// A datagram received by a [`Socket`]
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Dgram {
  /// Number of bytes written to the receive buffer
  pub len: usize,
  /// The sender
  pub src: SocketAddr,
  /// The local address the datagram was sent to
  pub dst: SocketAddr,
  /// The interface it arrived on; 0 when unknown
  pub ifindex: u32,
}

impl Dgram {
  /// The [`Interface`] responses to this datagram should be sent from
  pub fn interface(&self) -> Interface {
    Interface { index: self.ifindex,
                addr: self.dst }
  }
}

/// A CoAP network socket
///
/// Sockets are expected to be non-blocking; operations that
/// cannot complete yet yield [`nb::Error::WouldBlock`].
///
/// Anything that moves datagrams can be a socket,
/// including a DTLS session layered on top of UDP.
pub trait Socket {
  /// The error yielded by socket operations
  type Error: core::fmt::Debug;

  /// Send a datagram to a remote address, from a local interface
  ///
  /// Yields the number of bytes sent.
  fn send(&self, iface: &Interface, msg: Addrd<&[u8]>) -> nb::Result<usize, Self::Error>;

  /// Pull a buffered datagram from the socket, along with the address to the sender.
  ///
  /// It is expected that (like [`std::net::UdpSocket`]) if the message is larger
  /// than the buffer, those bytes are dropped and not considered an error condition.
  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Dgram, Self::Error>;
}
