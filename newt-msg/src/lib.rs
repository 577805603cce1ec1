//! Low-level representation of CoAP messages.
//!
//! The most notable item in `newt_msg` is [`Pdu`]; a CoAP message
//! held in its wire format, built up piece by piece
//! (header, token, options, payload) or parsed from a datagram.
//!
//! ```
//! use newt_msg::{known, Code, Id, Pdu, TryFromBytes, Type};
//!
//! let mut req = Pdu::init(Type::Con, Code::GET, Id(0x1234), 64);
//! req.add_token(b"token").unwrap();
//! req.add_option(known::URI_PATH, b"sensors").unwrap();
//! req.add_option(known::URI_PATH, b"temp").unwrap();
//!
//! let parsed = Pdu::try_from_bytes(req.as_bytes()).unwrap();
//! let path = parsed.opts()
//!                  .filter(|(n, _)| *n == known::URI_PATH)
//!                  .map(|(_, v)| v)
//!                  .collect::<Vec<_>>();
//!
//! assert_eq!(path, vec![b"sensors".as_ref(), b"temp".as_ref()]);
//! assert_eq!(parsed.token(), b"token");
//! ```

// docs
#![doc(html_root_url = "https://docs.rs/newt-msg/0.1.0")]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![cfg_attr(not(test), deny(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;

/// Byte cursor used by the parsers
pub mod cursor;

/// Parsing from bytes
pub mod from_bytes;

/// Message structs
pub mod msg;

/// Serializing to bytes
pub mod to_bytes;

#[doc(inline)]
pub use cursor::Cursor;
#[doc(inline)]
pub use from_bytes::TryFromBytes;
#[doc(inline)]
pub use msg::*;
#[doc(inline)]
pub use to_bytes::BuildError;

#[cfg(test)]
pub(crate) fn test_msg() -> (Pdu, Vec<u8>) {
  let header: [u8; 4] = 0b0100_0001_0100_0101_0000_0000_0000_0001_u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let content_format: &[u8] = b"application/json";
  let options: [&[u8]; 2] = [&[0b_1100_1101u8, 0b00000011u8], content_format];
  let payload: [&[u8]; 2] = [&[0b1111_1111_u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               payload.concat().as_ref()].concat();

  let mut msg = Pdu::init(Type::Con, Code::new(2, 5), Id(1), bytes.len());
  msg.add_token(&token).unwrap();
  msg.add_option(known::CONTENT_FORMAT, content_format).unwrap();
  msg.add_payload(b"hello, world!").unwrap();

  (msg, bytes)
}

#[cfg(test)]
pub(crate) mod tests {
  /// Assert that two bytes are equal, printing them in binary if they are not
  #[macro_export]
  macro_rules! assert_eqb {
    ($actual:expr, $expected:expr) => {
      if $actual != $expected {
        panic!("expected {:08b} to equal {:08b}", $actual, $expected)
      }
    };
  }

  /// [`assert_eqb`] for collections of bytes
  #[macro_export]
  macro_rules! assert_eqb_iter {
    ($actual:expr, $expected:expr) => {
      if $actual.iter().ne($expected.iter()) {
        panic!("expected {:?} to equal {:?}",
               $actual.into_iter()
                      .map(|b| format!("{:08b}", b))
                      .collect::<Vec<_>>(),
               $expected.into_iter()
                        .map(|b| format!("{:08b}", b))
                        .collect::<Vec<_>>())
      }
    };
  }
}
