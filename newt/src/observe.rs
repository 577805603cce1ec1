use newt_msg::known::observe::SEQ_MASK;
use newt_msg::{known, uint, BuildError, Code, Id, Pdu, Token, Type};
use no_std_net::SocketAddr;
use std_alloc::vec::Vec;

use crate::config::{self, Config};
use crate::hash::Key;
use crate::net::{Addrd, Interface};
use crate::resource::{Registry, Request, Resource};

/// A peer observing a resource, identified by
/// their address and the token of their GET request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
  pub(crate) iface: Interface,
  pub(crate) peer: SocketAddr,
  pub(crate) token: Token,
  pub(crate) non_cnt: u8,
  pub(crate) fail_cnt: u8,
  pub(crate) dirty: bool,
}

impl Subscription {
  /// Create a subscription that has not been notified yet
  pub fn new(iface: Interface, peer: SocketAddr, token: Token) -> Self {
    Self { iface,
           peer,
           token,
           non_cnt: 0,
           fail_cnt: 0,
           dirty: false }
  }

  /// Interface notifications are sent from
  pub fn iface(&self) -> Interface {
    self.iface
  }

  /// Who is observing
  pub fn peer(&self) -> SocketAddr {
    self.peer
  }

  /// Token every notification carries
  pub fn token(&self) -> &[u8] {
    self.token.as_bytes()
  }

  /// NON notifications sent since the last CON notification
  pub fn non_cnt(&self) -> u8 {
    self.non_cnt
  }

  /// CON notifications that went unacknowledged since the peer was last heard from
  pub fn fail_cnt(&self) -> u8 {
    self.fail_cnt
  }

  /// Did the last notification to this observer fail to send?
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  fn is(&self, peer: SocketAddr, token: &[u8]) -> bool {
    self.peer == peer && self.token.as_bytes() == token
  }
}

/// A subscription that was removed from a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Removed {
  /// Key of the resource that was being observed
  pub resource: Key,
  /// The removed subscription
  pub subscription: Subscription,
}

impl Resource {
  /// Add an observer, yielding their subscription.
  ///
  /// If `peer` is already observing with `token`, nothing is added
  /// and the existing subscription is yielded.
  ///
  /// ```
  /// use newt::net::Interface;
  /// use newt::resource::{Flags, Resource};
  /// use newt_msg::Token;
  ///
  /// let iface = Interface { index: 0,
  ///                         addr: "0.0.0.0:5683".parse().unwrap() };
  /// let peer = "10.0.0.1:1234".parse().unwrap();
  /// let token = Token::try_from(b"ab".as_ref()).unwrap();
  ///
  /// let mut r = Resource::new("temp", Flags::OBSERVABLE);
  /// let first = *r.subscribe(iface, peer, token);
  /// assert_eq!(first.peer(), peer);
  ///
  /// let again = *r.subscribe(iface, peer, token);
  /// assert_eq!(first, again);
  /// assert_eq!(r.subscriptions().len(), 1);
  /// ```
  pub fn subscribe(&mut self, iface: Interface, peer: SocketAddr, token: Token) -> &Subscription {
    let ix = match self.subscriptions.iter().position(|s| s.is(peer, token.as_bytes())) {
      | Some(ix) => ix,
      | None => {
        log::debug!("</{}> observed by {} ({:02x?})",
                    self.uri(),
                    peer,
                    token.as_bytes());
        self.subscriptions
            .insert(0, Subscription::new(iface, peer, token));
        0
      },
    };

    &self.subscriptions[ix]
  }

  /// Find the subscription of `peer` with `token`
  pub fn subscription(&self, peer: SocketAddr, token: &[u8]) -> Option<&Subscription> {
    self.subscriptions.iter().find(|s| s.is(peer, token))
  }

  /// Remove the subscription of `peer` with `token`, yielding whether it existed
  pub fn cancel(&mut self, peer: SocketAddr, token: &[u8]) -> bool {
    self.unsubscribe(peer, token).is_some()
  }

  pub(crate) fn unsubscribe(&mut self, peer: SocketAddr, token: &[u8]) -> Option<Subscription> {
    let ix = self.subscriptions.iter().position(|s| s.is(peer, token))?;
    log::debug!("</{}> no longer observed by {}", self.uri(), peer);
    Some(self.subscriptions.remove(ix))
  }
}

/// We heard from `peer`; reset the failure count of all their subscriptions with `token`.
pub fn touch(registry: &mut Registry, peer: SocketAddr, token: &[u8]) {
  registry.iter_mut()
          .flat_map(|r| r.subscriptions.iter_mut())
          .filter(|s| s.is(peer, token))
          .for_each(|s| s.fail_cnt = 0);
}

/// Remove every subscription of `peer` with `token`, from every resource.
pub fn cancel_all(registry: &mut Registry, peer: SocketAddr, token: &[u8]) -> Vec<Removed> {
  registry.iter_mut()
          .filter_map(|r| {
            r.unsubscribe(peer, token)
             .map(|subscription| Removed { resource: r.key(),
                                           subscription })
          })
          .collect()
}

/// A CON notification to `peer` with `token` was never acknowledged.
///
/// The subscription's failure count goes up, and once it has failed
/// more than [`config::Observe::max_fail`] times it is removed.
///
/// Yields the subscriptions that were removed, so that retransmissions
/// to them can be cancelled.
pub fn record_failed_ack(registry: &mut Registry,
                         cfg: &config::Observe,
                         peer: SocketAddr,
                         token: &[u8])
                         -> Vec<Removed> {
  let max_fail = cfg.clamped().max_fail;
  let mut removed = Vec::new();

  registry.iter_mut().for_each(|r| {
                       let fail_cnt = match r.subscription(peer, token) {
                         | Some(s) => s.fail_cnt,
                         | None => return,
                       };

                       if fail_cnt < max_fail {
                         r.subscriptions
                          .iter_mut()
                          .filter(|s| s.is(peer, token))
                          .take(1)
                          .for_each(|s| s.fail_cnt += 1);
                       } else if let Some(subscription) = r.unsubscribe(peer, token) {
                         log::warn!("{} stopped acknowledging notifications from </{}>",
                                    peer,
                                    r.uri());
                         removed.push(Removed { resource: r.key(),
                                                subscription });
                       }
                     });

  removed
}

/// Where notifications go
pub trait Notifier {
  /// The error yielded when a notification cannot be sent
  type Error: core::fmt::Debug;

  /// Get a fresh message id
  fn next_id(&mut self) -> Id;

  /// Send a notification.
  ///
  /// CON notifications should be retransmitted until acknowledged.
  fn send(&mut self, iface: &Interface, msg: Addrd<Pdu>) -> Result<(), Self::Error>;
}

fn notification(ty: Type,
                id: Id,
                token: &Token,
                seq: u32,
                max_size: usize)
                -> Result<Pdu, BuildError> {
  let mut pdu = Pdu::init(ty, Code::CONTENT, id, max_size);
  pdu.add_token(token.as_bytes())?;
  pdu.add_option(known::OBSERVE, &uint::encode(seq & SEQ_MASK))?;
  Ok(pdu)
}

/// Notify the observers of every observable resource that has changed
/// (or that some observers could not be notified of last time).
///
/// Notifications are sent NON, unless the resource asks for CON
/// notifications or the observer has been sent
/// [`config::Observe::max_non`] NON notifications in a row.
///
/// Yields the number of notifications sent.
pub fn notify_all<N: Notifier>(registry: &mut Registry, config: &Config, notifier: &mut N) -> usize {
  let cfg = config.observe.clamped();
  let seq = registry.observe_seq();
  let mut any_dirty = false;
  let mut sent = 0;

  registry.iter_mut().for_each(|r| {
    if r.is_observable() && (r.is_dirty() || r.is_partially_dirty()) {
      any_dirty = true;
      r.partially_dirty = false;

      let dirty = r.is_dirty();
      let notify_con = r.notify_con();
      let key = r.key();
      let mut failed = false;

      let (uri, handler, subs) = r.split_for_notify();
      let handler = match handler {
        | Some(h) => h,
        | None => {
          log::warn!("observable resource </{}> has no GET handler", uri);
          r.clear_dirty();
          return;
        },
      };

      subs.iter_mut()
          .filter(|sub| dirty || sub.dirty)
          .for_each(|sub| {
            sub.dirty = false;

            let ty = if !notify_con && sub.non_cnt < cfg.max_non {
              Type::Non
            } else {
              Type::Con
            };

            let mut pdu = match notification(ty, notifier.next_id(), &sub.token, seq, config.max_pdu_size) {
              | Ok(pdu) => pdu,
              | Err(e) => {
                log::warn!("could not build notification for </{}>: {:?}", uri, e);
                sub.dirty = true;
                failed = true;
                return;
              },
            };

            let req = Request { key,
                                uri,
                                iface: sub.iface,
                                peer: sub.peer,
                                token: sub.token.as_bytes(),
                                pdu: None };
            handler(&req, &mut pdu);

            let ty = pdu.ty();
            match notifier.send(&sub.iface, Addrd(pdu, sub.peer)) {
              | Ok(()) => {
                sent += 1;
                sub.non_cnt = match ty {
                  | Type::Con => 0,
                  | _ => (sub.non_cnt + 1).min(config::Observe::MAX_NON_LIMIT),
                };
              },
              | Err(e) => {
                log::warn!("could not notify {} of </{}>: {:?}", sub.peer, uri, e);
                sub.dirty = true;
                failed = true;
              },
            }
          });

      if failed {
        r.partially_dirty = true;
      }
    }

    r.clear_dirty();
  });

  if any_dirty {
    registry.bump_observe_seq();
  }

  sent
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resource::{Flags, Method};

  #[derive(Default)]
  struct Outbox {
    id: u16,
    fail: bool,
    sent: Vec<Addrd<Pdu>>,
  }

  impl Notifier for Outbox {
    type Error = ();

    fn next_id(&mut self) -> Id {
      self.id += 1;
      Id(self.id)
    }

    fn send(&mut self, _: &Interface, msg: Addrd<Pdu>) -> Result<(), ()> {
      if self.fail {
        Err(())
      } else {
        self.sent.push(msg);
        Ok(())
      }
    }
  }

  fn iface() -> Interface {
    Interface { index: 0,
                addr: "0.0.0.0:5683".parse().unwrap() }
  }

  fn peer(n: u8) -> SocketAddr {
    format!("10.0.0.{}:1234", n).parse().unwrap()
  }

  fn token(t: &[u8]) -> Token {
    Token::try_from(t).unwrap()
  }

  fn observed(reg: &mut Registry, flags: Flags) -> Key {
    let id = reg.register("temp", Flags::OBSERVABLE | flags);
    let r = reg.get_mut(id).unwrap();
    r.set_handler(Method::Get, |req, rep| {
       assert!(req.pdu.is_none());
       rep.add_payload(b"21C").unwrap();
     });
    r.subscribe(iface(), peer(1), token(b"a"));
    r.key()
  }

  #[test]
  fn subscriptions_most_recent_first() {
    let mut r = Resource::new("temp", Flags::OBSERVABLE);
    r.subscribe(iface(), peer(1), token(b"a"));
    r.subscribe(iface(), peer(2), token(b"a"));
    r.subscribe(iface(), peer(1), token(b"b"));

    r.subscriptions[2].fail_cnt = 2;
    let again = *r.subscribe(iface(), peer(1), token(b"a"));
    assert_eq!(again.fail_cnt(), 2);
    assert_eq!(again.token(), b"a");
    assert_eq!(r.subscriptions().len(), 3);

    let order = r.subscriptions()
                 .iter()
                 .map(|s| (s.peer(), s.token().to_vec()))
                 .collect::<Vec<_>>();
    assert_eq!(order,
               vec![(peer(1), b"b".to_vec()),
                    (peer(2), b"a".to_vec()),
                    (peer(1), b"a".to_vec())]);
  }

  #[test]
  fn cancel() {
    let mut r = Resource::new("temp", Flags::OBSERVABLE);
    r.subscribe(iface(), peer(1), token(b"a"));
    assert!(!r.cancel(peer(1), b"b"));
    assert!(!r.cancel(peer(2), b"a"));
    assert!(r.cancel(peer(1), b"a"));
    assert!(r.subscriptions().is_empty());
  }

  #[test]
  fn fail_cnt_eviction() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    let cfg = config::Observe::default();

    for n in 1..=cfg.max_fail {
      assert!(record_failed_ack(&mut reg, &cfg, peer(1), b"a").is_empty());
      assert_eq!(reg.by_key(key).unwrap().subscriptions()[0].fail_cnt(), n);
    }

    let removed = record_failed_ack(&mut reg, &cfg, peer(1), b"a");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].resource, key);
    assert_eq!(removed[0].subscription.peer(), peer(1));
    assert!(reg.by_key(key).unwrap().subscriptions().is_empty());
  }

  #[test]
  fn touch_resets_fail_cnt() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    let cfg = config::Observe::default();

    record_failed_ack(&mut reg, &cfg, peer(1), b"a");
    record_failed_ack(&mut reg, &cfg, peer(1), b"a");
    touch(&mut reg, peer(1), b"a");
    assert_eq!(reg.by_key(key).unwrap().subscriptions()[0].fail_cnt(), 0);
  }

  #[test]
  fn cancel_all_across_resources() {
    let mut reg = Registry::new();
    observed(&mut reg, Flags::NONE);
    let other = reg.register("other", Flags::OBSERVABLE);
    reg.get_mut(other)
       .unwrap()
       .subscribe(iface(), peer(1), token(b"a"));

    assert_eq!(cancel_all(&mut reg, peer(1), b"a").len(), 2);
    assert!(reg.iter().all(|r| r.subscriptions().is_empty()));
  }

  #[test]
  fn notify_only_when_dirty() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    let mut out = Outbox::default();

    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 0);
    assert_eq!(reg.observe_seq(), 0);

    reg.by_key_mut(key).unwrap().mark_dirty();
    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 1);
    assert_eq!(reg.observe_seq(), 1);
    assert!(!reg.by_key(key).unwrap().is_dirty());

    let Addrd(note, addr) = &out.sent[0];
    assert_eq!(*addr, peer(1));
    assert_eq!(note.ty(), Type::Non);
    assert_eq!(note.code(), Code::CONTENT);
    assert_eq!(note.token(), b"a");
    assert_eq!(note.opt(known::OBSERVE), Some(&[] as &[u8]));
    assert_eq!(note.payload(), Some(b"21C".as_ref()));

    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 0);
  }

  #[test]
  fn every_nth_notification_is_con() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    let mut out = Outbox::default();
    let cfg = Config::default();

    for _ in 0..=cfg.observe.max_non {
      reg.by_key_mut(key).unwrap().mark_dirty();
      notify_all(&mut reg, &cfg, &mut out);
    }

    let types = out.sent.iter().map(|m| m.data().ty()).collect::<Vec<_>>();
    let mut expected = vec![Type::Non; cfg.observe.max_non as usize];
    expected.push(Type::Con);
    assert_eq!(types, expected);
    assert_eq!(reg.by_key(key).unwrap().subscriptions()[0].non_cnt(), 0);

    let seqs = out.sent
                  .iter()
                  .map(|m| uint::decode(m.data().opt(known::OBSERVE).unwrap()))
                  .collect::<Vec<_>>();
    assert_eq!(seqs, (0..=cfg.observe.max_non as u32).collect::<Vec<_>>());
  }

  #[test]
  fn notify_con_resources() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NOTIFY_CON);
    let mut out = Outbox::default();

    reg.by_key_mut(key).unwrap().mark_dirty();
    notify_all(&mut reg, &Config::default(), &mut out);
    assert_eq!(out.sent[0].data().ty(), Type::Con);
  }

  #[test]
  fn failed_send_retried_next_sweep() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    reg.by_key_mut(key)
       .unwrap()
       .subscribe(iface(), peer(2), token(b"b"));
    let mut out = Outbox { fail: true,
                           ..Default::default() };

    reg.by_key_mut(key).unwrap().mark_dirty();
    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 0);

    let r = reg.by_key(key).unwrap();
    assert!(!r.is_dirty());
    assert!(r.is_partially_dirty());
    assert!(r.subscriptions().iter().all(|s| s.is_dirty()));

    out.fail = false;
    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 2);
    assert!(!reg.by_key(key).unwrap().is_partially_dirty());
    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 0);
  }

  #[test]
  fn unobservable_not_notified() {
    let mut reg = Registry::new();
    let key = observed(&mut reg, Flags::NONE);
    let mut out = Outbox::default();

    let r = reg.by_key_mut(key).unwrap();
    r.set_observable(false);
    r.mark_dirty();

    assert_eq!(notify_all(&mut reg, &Config::default(), &mut out), 0);
    assert!(!reg.by_key(key).unwrap().is_dirty());
  }
}
