use embedded_time::duration::Milliseconds;
use newt_msg::{CodeKind, Id, Pdu, Type};
use std_alloc::vec::Vec;

use super::{Core, Error, Event, What, When};
use crate::logging::Summary;
use crate::net::{Addrd, Interface, Socket};
use crate::observe::{self, Notifier};
use crate::queue::{EntryId, Queue};
use crate::retry::{Attempts, Strategy, YouShould};
use crate::time::{Clock, Millis};

fn when_sending(msg: Addrd<&Pdu>) -> When {
  When::SendingMessage(Some(msg.addr()), msg.data().id(), msg.data().token_owned())
}

/// Send a message from `iface`, blocking until the socket accepts it
pub(super) fn send_pdu<S: Socket>(sock: &S,
                                  iface: &Interface,
                                  msg: Addrd<&Pdu>)
                                  -> Result<(), Error<S::Error>> {
  log::trace!("sending {} -> {}", Summary(msg.data()), msg.addr());

  nb::block!(sock.send(iface, msg.map(|pdu| pdu.as_bytes()))).map(|_| ())
                                                            .map_err(|e| {
                                                              when_sending(msg).what(What::SockError(e))
                                                            })
}

/// Sends notifications through the core's socket,
/// queueing CON notifications for retransmission
struct CoreNotifier<'a, S: Socket> {
  sock: &'a S,
  queue: &'a mut Queue,
  next_id: &'a mut Id,
  now: Millis,
  strategy: Strategy,
}

impl<'a, S: Socket> Notifier for CoreNotifier<'a, S> {
  type Error = Error<S::Error>;

  fn next_id(&mut self) -> Id {
    let id = *self.next_id;
    *self.next_id = id.next();
    id
  }

  fn send(&mut self, iface: &Interface, msg: Addrd<Pdu>) -> Result<(), Self::Error> {
    send_pdu(self.sock, iface, msg.as_ref())?;

    let Addrd(pdu, peer) = msg;
    let seed = self.now.0 ^ u64::from(pdu.id().0);
    let timeout = self.strategy.initial_timeout(seed);
    self.queue.enqueue(pdu, peer, *iface, timeout, self.now);
    Ok(())
  }
}

impl<S: Socket, C: Clock> Core<S, C> {
  /// Send a message without retransmitting it
  pub fn send(&self, msg: Addrd<&Pdu>) -> Result<(), Error<S::Error>> {
    send_pdu(&self.sock, &self.iface, msg)
  }

  pub(super) fn send_from(&self, iface: &Interface, msg: Addrd<&Pdu>) -> Result<(), Error<S::Error>> {
    send_pdu(&self.sock, iface, msg)
  }

  /// Send a message, and retransmit it until it is acknowledged
  /// (or until [`Con::max_retransmit`](crate::config::Con::max_retransmit)
  /// retransmissions go unacknowledged).
  ///
  /// Messages that are not CON are sent once and yield `None`.
  /// Messages that cannot be sent are not retransmitted.
  pub fn send_confirmed(&mut self, msg: Addrd<Pdu>) -> Result<Option<EntryId>, Error<S::Error>> {
    self.send(msg.as_ref())?;

    let now = self.now(when_sending(msg.as_ref()))?;
    let Addrd(pdu, peer) = msg;
    let seed = now.0 ^ u64::from(pdu.id().0);
    let timeout = self.config.con.retry_strategy.initial_timeout(seed);

    Ok(self.queue.enqueue(pdu, peer, self.iface, timeout, now))
  }

  /// Send an empty ACK or RST
  pub(super) fn send_empty(&self,
                           iface: &Interface,
                           peer: no_std_net::SocketAddr,
                           ty: Type,
                           id: Id)
                           -> Result<(), Error<S::Error>> {
    let msg = Pdu::init(ty, newt_msg::Code::EMPTY, id, newt_msg::HEADER_SIZE);
    self.send_from(iface, Addrd(&msg, peer))
  }

  /// Retransmit every CON message that is due, and give up on
  /// those that have been retransmitted too many times.
  ///
  /// When an unacknowledged message was a notification, the observer's
  /// failure count goes up and they may be removed.
  pub fn retransmit(&mut self) -> Result<Vec<Event>, Error<S::Error>> {
    let now = self.now(When::Retransmitting)?;
    let strategy = self.config.con.retry_strategy;
    let max_retransmit = self.config.con.max_retransmit;
    let mut events = Vec::new();

    while let Some(mut entry) = self.queue.pop_due(now) {
      match strategy.what_should_i_do(entry.retransmits, max_retransmit) {
        | YouShould::Retry => {
          if let Err(e) = send_pdu(&self.sock, &entry.iface, Addrd(&entry.pdu, entry.peer)) {
            log::warn!("retransmitting {} failed: {:?}", Summary(&entry.pdu), e.what);
          }

          entry.retransmits = Attempts(entry.retransmits.0 + 1);
          let Milliseconds(delay) = strategy.delay(entry.timeout, entry.retransmits);
          entry.due = Milliseconds(now.0.saturating_add(delay.max(1)));
          self.queue.requeue(entry);
        },
        | YouShould::Cry => {
          log::warn!("giving up on {} -> {}: never acknowledged",
                     Summary(&entry.pdu),
                     entry.peer);

          if entry.pdu.code().kind() == CodeKind::Response {
            let removed = observe::record_failed_ack(&mut self.registry,
                                                     &self.config.observe,
                                                     entry.peer,
                                                     entry.pdu.token());
            removed.into_iter().for_each(|r| {
                                 self.queue.cancel_all(r.subscription.peer(), r.subscription.token());
                                 events.push(Event::from(r));
                               });
          }

          events.push(Event::MessageDropped(Addrd(entry.pdu, entry.peer)));
        },
      }
    }

    Ok(events)
  }

  /// Notify the observers of changed resources; CON notifications
  /// are retransmitted until acknowledged.
  ///
  /// Yields the number of notifications sent.
  pub fn notify(&mut self) -> Result<usize, Error<S::Error>> {
    let now = self.now(When::Notifying)?;
    let mut notifier = CoreNotifier { sock: &self.sock,
                                      queue: &mut self.queue,
                                      next_id: &mut self.next_id,
                                      now,
                                      strategy: self.config.con.retry_strategy };

    Ok(observe::notify_all(&mut self.registry, &self.config, &mut notifier))
  }
}
