//! `newt` is the message layer of a CoAP endpoint.
//!
//! It sits between a datagram transport and your application, and owns:
//! - a [`Registry`](resource::Registry) of resources, with `/.well-known/core` discovery
//! - observers of those resources, and the notifications sent to them
//! - retransmission of confirmable messages until they are acknowledged
//!
//! The wire format lives in [`newt_msg`]; `newt` is the state machine
//! on top of it, driven by a [`Core`](core::Core).
//!
//! ## Driving a `Core`
//! A `Core` never blocks and never spawns anything. You feed it datagrams
//! with [`Core::poll_req`](core::Core::poll_req) (or [`Core::handle`](core::Core::handle)
//! if you read from the socket yourself), and call [`Core::tick`](core::Core::tick)
//! at least as often as [`Core::next_timeout`](core::Core::next_timeout) asks you to.
//!
//! ```no_run
//! use newt::core::Core;
//! use newt::net::Interface;
//! use newt::resource::{Flags, Method};
//! use newt_msg::Code;
//! use no_std_net::SocketAddr;
//!
//! let addr: SocketAddr = "0.0.0.0:5683".parse().unwrap();
//! let sock = std::net::UdpSocket::bind("0.0.0.0:5683").unwrap();
//! sock.set_nonblocking(true).unwrap();
//!
//! let mut core = Core::new(Default::default(),
//!                          sock,
//!                          newt::std::Clock::new(),
//!                          Interface { index: 0, addr });
//!
//! let id = core.register("time", Flags::OBSERVABLE);
//! core.registry_mut()
//!     .get_mut(id)
//!     .unwrap()
//!     .set_handler(Method::Get, |_, rep| {
//!       rep.set_code(Code::CONTENT);
//!       rep.add_payload(b"12:00").ok();
//!     });
//!
//! loop {
//!   match core.poll_req() {
//!     | Ok(_events) => (),
//!     | Err(nb::Error::WouldBlock) => (),
//!     | Err(nb::Error::Other(e)) => panic!("{:?}", e),
//!   }
//!
//!   core.tick().unwrap();
//! }
//! ```

// docs
#![doc(html_root_url = "https://docs.rs/newt/0.1.0")]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;

#[cfg(test)]
pub(crate) mod test;

pub(crate) mod logging;

/// configuring runtime behavior
pub mod config;

/// low-level coap behavior
pub mod core;

/// resource keys
pub mod hash;

/// network abstractions
pub mod net;

/// observers & notifications
pub mod observe;

/// pending confirmable messages
pub mod queue;

/// resources & link-format discovery
pub mod resource;

/// customizable retrying of unacknowledged messages
pub mod retry;

/// time abstractions
pub mod time;

/// `std`-only newt stuff
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod std;
