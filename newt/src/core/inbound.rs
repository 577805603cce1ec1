use newt_msg::known::observe::{Action, SEQ_MASK};
use newt_msg::known::{Block, ContentFormat};
use newt_msg::{known, uint, BuildError, Code, CodeKind, OptNumber, Pdu, TryFromBytes, Type};
use std_alloc::vec;
use std_alloc::vec::Vec;

use super::{Core, Error, Event, What, When};
use crate::hash::Key;
use crate::logging::Summary;
use crate::net::{Addrd, Interface, Socket};
use crate::observe;
use crate::resource::{Method, Request};
use crate::time::Clock;

/// What a request's No-Response option asks of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoResponse {
  /// No opinion
  Default,
  /// The client wants this class of response
  Send,
  /// The client is not interested in this class of response
  Drop,
}

fn no_response(req: &Pdu, rep: &Pdu) -> NoResponse {
  let class = rep.code().class;

  match req.opt(known::NO_RESPONSE) {
    | Some(suppress) if class > 0 => {
      if (1u32 << (class - 1)) & uint::decode(suppress) != 0 {
        NoResponse::Drop
      } else {
        NoResponse::Send
      }
    },
    | _ => NoResponse::Default,
  }
}

fn when_responding(msg: Addrd<&Pdu>) -> When {
  When::SendingMessage(Some(msg.addr()), msg.data().id(), msg.data().token_owned())
}

/// A response to `req` carrying no payload, and copies of
/// any of the request's options that are in `copy`
fn error_response(req: &Pdu, code: Code, copy: &[OptNumber], max_size: usize) -> Result<Pdu, BuildError> {
  let mut rep = Pdu::init(req.ty().response_type(), code, req.id(), max_size);
  rep.add_token(req.token())?;

  req.opts()
     .filter(|(n, _)| *n != known::CONTENT_FORMAT && copy.contains(n))
     .try_for_each(|(n, v)| rep.add_option(n, v).map(|_| ()))?;

  Ok(rep)
}

impl<S: Socket, C: Clock> Core<S, C> {
  /// Handle a datagram that arrived on `iface`.
  ///
  /// Malformed datagrams are dropped.
  pub fn handle(&mut self, iface: Interface, dgram: Addrd<&[u8]>) -> Result<Vec<Event>, Error<S::Error>> {
    let Addrd(bytes, src) = dgram;

    let pdu = match Pdu::try_from_bytes(bytes) {
      | Ok(pdu) => pdu,
      | Err(e) => {
        log::debug!("dropping malformed datagram from {}: {:?}", src, e);
        return Ok(Vec::new());
      },
    };

    log::trace!("recvd {} <- {}", Summary(&pdu), src);

    match pdu.ty() {
      | Type::Ack => self.handle_ack(iface, Addrd(pdu, src)),
      | Type::Reset => Ok(self.handle_reset(Addrd(pdu, src))),
      | Type::Con | Type::Non => self.handle_con_non(iface, Addrd(pdu, src)),
    }
  }

  fn handle_ack(&mut self, iface: Interface, msg: Addrd<Pdu>) -> Result<Vec<Event>, Error<S::Error>> {
    let Addrd(ack, peer) = &msg;

    match self.queue.match_and_remove(ack.id(), *peer) {
      | Some(sent) if sent.pdu.code().class == 2 => {
        observe::touch(&mut self.registry, *peer, sent.pdu.token())
      },
      | Some(_) => (),
      | None => log::debug!("{} from {} matches nothing we sent", Summary(ack), peer),
    }

    match ack.code().kind() {
      | CodeKind::Empty => Ok(Vec::new()),
      | CodeKind::Response => self.handle_response(iface, msg),
      | _ => {
        log::debug!("ignoring {} from {}", Summary(ack), peer);
        Ok(Vec::new())
      },
    }
  }

  fn handle_reset(&mut self, msg: Addrd<Pdu>) -> Vec<Event> {
    let Addrd(rst, peer) = msg;

    match self.queue.match_and_remove(rst.id(), peer) {
      | Some(sent) => {
        let token = sent.pdu.token();
        self.queue.cancel_all(peer, token);
        observe::cancel_all(&mut self.registry, peer, token).into_iter()
                                                            .map(Event::from)
                                                            .collect()
      },
      | None => {
        log::debug!("{} from {} matches nothing we sent", Summary(&rst), peer);
        Vec::new()
      },
    }
  }

  fn handle_con_non(&mut self, iface: Interface, msg: Addrd<Pdu>) -> Result<Vec<Event>, Error<S::Error>> {
    let Addrd(pdu, peer) = &msg;

    let unknown = pdu.opts()
                     .map(|(n, _)| n)
                     .filter(|n| n.is_critical() && !self.known_opts.contains(*n))
                     .collect::<Vec<_>>();

    if !unknown.is_empty() {
      log::debug!("{} from {} has unrecognized critical options {:?}",
                  Summary(pdu),
                  peer,
                  unknown);

      if pdu.ty() == Type::Con {
        self.respond_error(&iface, msg.as_ref(), Code::BAD_OPTION, &unknown)?;
      }

      return Ok(Vec::new());
    }

    match pdu.code().kind() {
      | CodeKind::Request => self.handle_request(iface, msg).map(|_| Vec::new()),
      | CodeKind::Response => self.handle_response(iface, msg),
      | CodeKind::Empty | CodeKind::Reserved => {
        self.send_empty(&iface, *peer, Type::Reset, pdu.id())?;
        Ok(Vec::new())
      },
    }
  }

  fn handle_response(&mut self, iface: Interface, msg: Addrd<Pdu>) -> Result<Vec<Event>, Error<S::Error>> {
    let Addrd(rep, peer) = &msg;

    if rep.ty() == Type::Con {
      self.send_empty(&iface, *peer, Type::Ack, rep.id())?;
    }

    self.queue.cancel_all(*peer, rep.token());
    Ok(vec![Event::Response(msg)])
  }

  fn handle_request(&mut self, iface: Interface, msg: Addrd<Pdu>) -> Result<(), Error<S::Error>> {
    let Addrd(req, peer) = msg.as_ref();
    let key = Key::of_request(req);
    let method = Method::from_code(req.code());
    let when = when_responding(msg.as_ref());

    let id = match self.registry.find(key) {
      | Some(id) => id,
      | None if key.is_well_known() && method == Some(Method::Get) => {
        return self.respond_well_known(&iface, msg.as_ref());
      },
      | None if key.is_well_known() => {
        return self.respond_error(&iface, msg.as_ref(), Code::METHOD_NOT_ALLOWED, &[]);
      },
      | None => {
        log::debug!("{} from {}: no such resource", Summary(req), peer);
        return self.respond_error(&iface, msg.as_ref(), Code::NOT_FOUND, &[]);
      },
    };

    let has_handler = self.registry
                          .get(id)
                          .zip(method)
                          .and_then(|(r, m)| r.handler(m))
                          .is_some();

    if !has_handler {
      return match method {
        | Some(Method::Get) if key.is_well_known() => self.respond_well_known(&iface, msg.as_ref()),
        | _ => self.respond_error(&iface, msg.as_ref(), Code::METHOD_NOT_ALLOWED, &[]),
      };
    }

    let mut rep = Pdu::init(req.ty().response_type(),
                            Code::EMPTY,
                            req.id(),
                            self.config.max_pdu_size);
    rep.add_token(req.token())
       .map_err(|e| when.what(What::ToBytes(e)))?;

    let observable = self.registry.get(id).map(|r| r.is_observable()).unwrap_or(false);
    let action = req.opt(known::OBSERVE)
                    .and_then(Action::from_value)
                    .filter(|_| observable && method == Some(Method::Get));

    match action {
      | Some(Action::Register) => {
        if let Some(r) = self.registry.get_mut(id) {
          r.subscribe(iface, peer, req.token_owned());
        }
        observe::touch(&mut self.registry, peer, req.token());

        let seq = self.registry.observe_seq() & SEQ_MASK;
        rep.add_option(known::OBSERVE, &uint::encode(seq))
           .map_err(|e| when.what(What::ToBytes(e)))?;
      },
      | Some(Action::Deregister) => {
        if let Some(r) = self.registry.get_mut(id) {
          r.cancel(peer, req.token());
        }
      },
      | None => (),
    }

    if let Some(res) = self.registry.get(id) {
      let request = Request { key,
                              uri: res.uri(),
                              iface,
                              peer,
                              token: req.token(),
                              pdu: Some(req) };

      if let Some(handler) = method.and_then(|m| res.handler(m)) {
        handler(&request, &mut rep);
      }
    }

    if action == Some(Action::Register) && rep.code().class > 2 {
      if let Some(r) = self.registry.get_mut(id) {
        r.cancel(peer, req.token());
      }
    }

    if rep.ty() == Type::Ack && rep.code() == Code::EMPTY {
      rep = Pdu::init(Type::Ack, Code::EMPTY, req.id(), newt_msg::HEADER_SIZE);
    }

    let send = rep.ty() != Type::Non || rep.code().class >= 2;
    match no_response(req, &rep) {
      | NoResponse::Drop => {
        log::debug!("{} not sent: suppressed by No-Response", Summary(&rep));
        Ok(())
      },
      | NoResponse::Send => self.send_from(&iface, Addrd(&rep, peer)),
      | NoResponse::Default if send => self.send_from(&iface, Addrd(&rep, peer)),
      | NoResponse::Default => Ok(()),
    }
  }

  fn respond_error(&self,
                   iface: &Interface,
                   req: Addrd<&Pdu>,
                   code: Code,
                   copy: &[OptNumber])
                   -> Result<(), Error<S::Error>> {
    let rep = error_response(req.data(), code, copy, self.config.max_pdu_size)
              .map_err(|e| when_responding(req).what(What::ToBytes(e)))?;
    self.respond(iface, req, &rep)
  }

  fn respond_well_known(&self, iface: &Interface, req: Addrd<&Pdu>) -> Result<(), Error<S::Error>> {
    let rep = match self.well_known_response(req.data()) {
      | Ok(rep) => rep,
      | Err(e) => {
        log::warn!("could not build /{} listing: {:?}", crate::hash::WELL_KNOWN_CORE, e);
        error_response(req.data(), Code::SERVICE_UNAVAILABLE, &[], self.config.max_pdu_size)
          .map_err(|e| when_responding(req).what(What::ToBytes(e)))?
      },
    };

    self.respond(iface, req, &rep)
  }

  /// Send an error or discovery response, unless the request asked not to
  fn respond(&self, iface: &Interface, req: Addrd<&Pdu>, rep: &Pdu) -> Result<(), Error<S::Error>> {
    match no_response(req.data(), rep) {
      | NoResponse::Drop => Ok(()),
      | _ => self.send_from(iface, Addrd(rep, req.addr())),
    }
  }

  /// Build the `/.well-known/core` response, choosing a block of the
  /// listing that fits in a message.
  ///
  /// Yields a 4.00 response when the request asked for a block that doesn't exist,
  /// or when nothing matched the query.
  fn well_known_response(&self, req: &Pdu) -> Result<Pdu, BuildError> {
    let max = self.config.max_pdu_size;
    let query = req.opt(known::URI_QUERY);
    let requested = req.block(known::BLOCK2);
    let total = self.registry.well_known_len(query);

    let bad_request = || error_response(req, Code::BAD_REQUEST, &[], max);

    if total == 0 {
      return bad_request();
    }

    let offset = match requested {
      | Some(b) if b.szx > Block::MAX_SZX => return bad_request(),
      | Some(b) if b.offset() >= total => return bad_request(),
      | Some(b) => b.offset(),
      | None => 0,
    };

    let mut rep = Pdu::init(req.ty().response_type(), Code::CONTENT, req.id(), max);
    rep.add_token(req.token())?;
    rep.add_option(known::CONTENT_FORMAT, &ContentFormat::LinkFormat.bytes())?;

    // payload marker
    let room = max.saturating_sub(rep.len() + 1);

    let block = if requested.is_some() || total > room {
      // Block2 option: 1 header byte & up to 3 value bytes
      let room = room.saturating_sub(4);
      let mut szx = requested.map(|b| b.szx)
                             .unwrap_or(self.config.max_block_szx)
                             .min(self.config.max_block_szx)
                             .min(Block::MAX_SZX);

      while szx > 0 && (1usize << (szx + 4)) > room {
        szx -= 1;
      }

      let size = 1usize << (szx + 4);
      if size > room {
        return Err(BuildError::TooLong { capacity: max,
                                         size: max - room + size });
      }

      let num = (offset >> (szx + 4)) as u32;
      if num > Block::MAX_NUM {
        return bad_request();
      }

      let block = Block { num,
                          more: offset + size < total,
                          szx };
      rep.add_option(known::BLOCK2, &block.encode())?;
      Some(block)
    } else {
      None
    };

    let budget = block.map(|b| b.size()).unwrap_or(total);
    let mut listing = Vec::with_capacity(budget);
    self.registry
        .print_well_known(&mut listing, offset, budget, query);
    rep.add_payload(&listing)?;

    Ok(rep)
  }
}

#[cfg(test)]
mod tests {
  use newt_msg::Id;

  use super::*;

  fn req() -> Pdu {
    let mut req = Pdu::init(Type::Non, Code::GET, Id(1), 64);
    req.add_token(b"t").unwrap();
    req
  }

  #[test]
  fn no_response_classes() {
    let mut req = req();
    req.add_option(known::NO_RESPONSE, &uint::encode(2 | 16)).unwrap();

    let rep = |code| Pdu::init(Type::Non, code, Id(1), 4);
    assert_eq!(no_response(&req, &rep(Code::CONTENT)), NoResponse::Drop);
    assert_eq!(no_response(&req, &rep(Code::NOT_FOUND)), NoResponse::Send);
    assert_eq!(no_response(&req, &rep(Code::SERVICE_UNAVAILABLE)), NoResponse::Drop);
    assert_eq!(no_response(&req, &rep(Code::EMPTY)), NoResponse::Default);
    assert_eq!(no_response(&self::req(), &rep(Code::CONTENT)), NoResponse::Default);
  }

  #[test]
  fn error_response_copies_only_listed_options() {
    let mut req = req();
    req.add_option(known::URI_PATH, b"a").unwrap();
    req.add_option(known::CONTENT_FORMAT, &[]).unwrap();
    req.add_option(OptNumber(65), b"x").unwrap();
    req.add_payload(b"body").unwrap();

    let rep = error_response(&req,
                             Code::BAD_OPTION,
                             &[known::CONTENT_FORMAT, OptNumber(65)],
                             64).unwrap();
    assert_eq!(rep.ty(), Type::Non);
    assert_eq!(rep.code(), Code::BAD_OPTION);
    assert_eq!(rep.token(), b"t");
    assert_eq!(rep.opts().collect::<Vec<_>>(), vec![(OptNumber(65), b"x".as_ref())]);
    assert_eq!(rep.payload(), None);
  }
}
