#![allow(dead_code)]

use core::cell::Cell;
use std::sync::{Mutex, Once};

use embedded_time::rate::Fraction;
use embedded_time::Instant;
use std_alloc::sync::Arc;
use std_alloc::vec::Vec;

use crate::net::{Addrd, Dgram, Interface, Socket};

static INIT_LOGGING: Once = Once::new();

/// Log to stdout (filtered by `RUST_LOG`), once per process
pub fn init_logging() {
  INIT_LOGGING.call_once(|| {
                let _ = simple_logger::init_with_env();
              });
}

/// The interface mocked sockets pretend to be bound to
pub fn iface() -> Interface {
  Interface { index: 1,
              addr: "192.168.0.100:5683".parse().unwrap() }
}

/// A clock that only moves when told to, in milliseconds
#[derive(Debug)]
pub struct ClockMock(pub Cell<u64>);

impl ClockMock {
  pub fn new() -> Self {
    Self(Cell::new(0))
  }

  pub fn set(&self, to: u64) {
    self.0.set(to);
  }

  pub fn advance(&self, by: u64) {
    self.0.set(self.0.get() + by);
  }
}

impl embedded_time::Clock for ClockMock {
  type T = u64;

  // milliseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000);

  fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
    Ok(Instant::new(self.0.get()))
  }
}

/// A mocked socket
#[derive(Debug, Default)]
pub struct SockMock {
  /// Inbound bytes from remote sockets. Address represents the sender
  pub rx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
  /// Outbound bytes to remote sockets. Address represents the destination
  pub tx: Arc<Mutex<Vec<Addrd<Vec<u8>>>>>,
}

impl SockMock {
  pub fn new() -> Self {
    Default::default()
  }

  /// Queue a datagram to be received
  pub fn push_rx(&self, dgram: Addrd<Vec<u8>>) {
    self.rx.lock().unwrap().push(dgram);
  }

  /// Take every datagram sent so far
  pub fn take_tx(&self) -> Vec<Addrd<Vec<u8>>> {
    self.tx.lock().unwrap().drain(..).collect()
  }
}

impl Socket for SockMock {
  type Error = ();

  fn send(&self, _: &Interface, msg: Addrd<&[u8]>) -> nb::Result<usize, Self::Error> {
    self.tx.lock().unwrap().push(msg.map(|bytes| bytes.to_vec()));
    Ok(msg.data().len())
  }

  fn recv(&self, buf: &mut [u8]) -> nb::Result<Dgram, Self::Error> {
    let mut rx = self.rx.lock().unwrap();

    if rx.is_empty() {
      return Err(nb::Error::WouldBlock);
    }

    let Addrd(bytes, src): Addrd<Vec<u8>> = rx.remove(0);
    let len = bytes.len().min(buf.len());
    buf[..len].copy_from_slice(&bytes[..len]);

    Ok(Dgram { len,
               src,
               dst: iface().addr,
               ifindex: iface().index })
  }
}

