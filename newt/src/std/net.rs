use std::io;
use std::net::UdpSocket;

use crate::net::{Addrd, Dgram, Interface, Socket};

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// Convert a `no_std_net` address to a `std` one
pub fn to_std(addr: no_std_net::SocketAddr) -> std::net::SocketAddr {
  match addr {
    | no_std_net::SocketAddr::V4(a) => {
      let ip = std::net::Ipv4Addr::from(a.ip().octets());
      std::net::SocketAddr::V4(std::net::SocketAddrV4::new(ip, a.port()))
    },
    | no_std_net::SocketAddr::V6(a) => {
      let ip = std::net::Ipv6Addr::from(a.ip().octets());
      std::net::SocketAddr::V6(std::net::SocketAddrV6::new(ip, a.port(), a.flowinfo(), a.scope_id()))
    },
  }
}

/// Convert a `std` address to a `no_std_net` one
pub fn from_std(addr: std::net::SocketAddr) -> no_std_net::SocketAddr {
  match addr {
    | std::net::SocketAddr::V4(a) => {
      let ip = no_std_net::Ipv4Addr::from(a.ip().octets());
      no_std_net::SocketAddr::V4(no_std_net::SocketAddrV4::new(ip, a.port()))
    },
    | std::net::SocketAddr::V6(a) => {
      let ip = no_std_net::Ipv6Addr::from(a.ip().octets());
      no_std_net::SocketAddr::V6(no_std_net::SocketAddrV6::new(ip,
                                                               a.port(),
                                                               a.flowinfo(),
                                                               a.scope_id()))
    },
  }
}

/// A `UdpSocket` only knows the address it is bound to, so every
/// datagram is reported as arriving on interface 0 at that address.
/// The socket should be non-blocking.
impl Socket for UdpSocket {
  type Error = io::Error;

  fn send(&self, _: &Interface, msg: Addrd<&[u8]>) -> nb::Result<usize, Self::Error> {
    UdpSocket::send_to(self, msg.data(), to_std(msg.addr())).map_err(io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Dgram, Self::Error> {
    let (len, src) = self.recv_from(buffer).map_err(io_to_nb)?;
    let dst = self.local_addr().map_err(nb::Error::Other)?;

    Ok(Dgram { len,
               src: from_std(src),
               dst: from_std(dst),
               ifindex: 0 })
  }
}
