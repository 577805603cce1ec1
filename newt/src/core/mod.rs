use embedded_time::duration::Milliseconds;
use newt_msg::{known, Id, OptFilter, OptNumber};
use no_std_net::SocketAddr;
use std_alloc::borrow::Cow;
use std_alloc::vec;
use std_alloc::vec::Vec;

mod error;
mod event;
/// Core methods that manage inbound messages.
///
/// For core methods that manage outbound messages, see [`outbound`].
mod inbound;
/// Core methods that manage outbound messages.
///
/// For core methods that manage inbound messages, see [`inbound`].
mod outbound;

#[doc(inline)]
pub use error::*;
#[doc(inline)]
pub use event::*;

use crate::config::Config;
use crate::hash::Key;
use crate::net::{Addrd, Interface, Socket};
use crate::queue::Queue;
use crate::resource::{Flags, Registry, Resource, ResourceId};
use crate::time::{self, Clock, Millis};

/// The CoAP message layer of an endpoint.
///
/// Owns the resources being served (and their observers), along with the
/// CON messages awaiting acknowledgement, and drives them from datagrams
/// pulled off a [`Socket`] and the passage of time measured by a [`Clock`].
#[allow(missing_debug_implementations)]
pub struct Core<S: Socket, C: Clock> {
  /// Networking socket that the CoAP runtime uses
  sock: S,
  /// Clock used for timing
  clock: C,
  /// Interface our own messages are sent from
  iface: Interface,
  config: Config,
  registry: Registry,
  /// CON messages that have not been acknowledged yet
  queue: Queue,
  /// Critical options we know how to process
  known_opts: OptFilter,
  next_id: Id,
  /// When resources were last checked for changes
  last_check: Option<Millis>,
}

impl<S: Socket, C: Clock> Core<S, C> {
  /// Create a new Core with no resources
  pub fn new(config: Config, sock: S, clock: C, iface: Interface) -> Self {
    Self { sock,
           clock,
           iface,
           next_id: Id(config.msg_id_seed),
           config,
           registry: Registry::new(),
           queue: Queue::new(),
           known_opts: OptFilter::from_iter(known::ALL),
           last_check: None }
  }

  /// See [`Config`]
  pub fn config(&self) -> &Config {
    &self.config
  }

  /// The resources being served
  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  /// Mutably borrow the resources being served.
  ///
  /// Resources removed or replaced through this keep their notifications
  /// retransmitting; prefer [`Core::register`], [`Core::add_resource`]
  /// and [`Core::delete_resource`].
  pub fn registry_mut(&mut self) -> &mut Registry {
    &mut self.registry
  }

  /// CON messages that have not been acknowledged yet
  pub fn queue(&self) -> &Queue {
    &self.queue
  }

  /// The socket messages are sent & received with
  pub fn socket(&self) -> &S {
    &self.sock
  }

  /// The clock used for timing
  pub fn clock(&self) -> &C {
    &self.clock
  }

  /// The interface our own messages are sent from
  pub fn interface(&self) -> Interface {
    self.iface
  }

  /// Get a message id that has not been used recently
  pub fn next_id(&mut self) -> Id {
    let id = self.next_id;
    self.next_id = id.next();
    id
  }

  /// Accept requests carrying a critical option that is not
  /// one of [`known::ALL`], rather than rejecting them with 4.02.
  ///
  /// Options numbered 64 and above share a small number of slots,
  /// so registering one may cause others to be accepted too.
  pub fn register_option(&mut self, number: OptNumber) {
    self.known_opts.insert(number);
  }

  pub(crate) fn now(&self, when: When) -> Result<Millis, Error<S::Error>> {
    time::now(&self.clock).map_err(|_| when.what(What::ClockError))
  }

  /// Receive a single datagram and handle it.
  ///
  /// Malformed datagrams are dropped.
  pub fn poll_req(&mut self) -> nb::Result<Vec<Event>, Error<S::Error>> {
    let mut buf = vec![0u8; self.config.max_pdu_size];
    let dgram = self.sock
                    .recv(&mut buf)
                    .map_err(|e| e.map(|e| When::Polling.what(What::SockError(e))))?;

    let len = dgram.len.min(buf.len());
    self.handle(dgram.interface(), Addrd(&buf[..len], dgram.src))
        .map_err(nb::Error::Other)
  }

  /// Retransmit CON messages that are due, and notify observers
  /// of changed resources if it is time to check for changes.
  pub fn tick(&mut self) -> Result<Vec<Event>, Error<S::Error>> {
    let events = self.retransmit()?;

    let now = self.now(When::Notifying)?;
    let check_due = match self.last_check {
      | Some(last) => now.0 >= last.0.saturating_add(self.config.resource_check_interval.0),
      | None => true,
    };

    if check_due {
      self.last_check = Some(now);
      self.notify()?;
    }

    Ok(events)
  }

  /// How long until [`Core::tick`] has something to do;
  /// `None` if nothing is scheduled.
  pub fn next_timeout(&mut self) -> Result<Option<Millis>, Error<S::Error>> {
    let now = self.now(When::None)?;

    let check = self.registry
                    .iter()
                    .any(|r| r.is_observable() && (r.is_dirty() || r.is_partially_dirty()))
                    .then(|| match self.last_check {
                      | Some(last) => last.0.saturating_add(self.config.resource_check_interval.0),
                      | None => now.0,
                    });

    let due = match (self.queue.next_due().map(|d| d.0), check) {
      | (Some(a), Some(b)) => Some(a.min(b)),
      | (a, b) => a.or(b),
    };

    Ok(due.map(|due| Milliseconds(due.saturating_sub(now.0))))
  }

  /// Whether there is nothing left to retransmit
  pub fn can_exit(&self) -> bool {
    self.queue.is_empty()
  }

  /// Create a resource at `uri` and serve it, yielding its handle.
  ///
  /// See [`Core::add_resource`].
  pub fn register(&mut self, uri: impl Into<Cow<'static, str>>, flags: Flags) -> ResourceId {
    self.add_resource(Resource::new(uri, flags))
  }

  /// Serve a resource, yielding its handle.
  ///
  /// A resource already served at the same path is replaced,
  /// and notifications to its observers are no longer retransmitted.
  pub fn add_resource(&mut self, res: Resource) -> ResourceId {
    let (id, replaced) = self.registry.insert(res);
    if let Some(old) = replaced {
      self.forget_observers(&old);
    }
    id
  }

  /// Remove a resource, and stop retransmitting notifications to its observers.
  ///
  /// Yields whether the resource existed.
  pub fn delete_resource(&mut self, key: Key) -> bool {
    match self.registry.remove(key) {
      | Some(res) => {
        self.forget_observers(&res);
        true
      },
      | None => false,
    }
  }

  fn forget_observers(&mut self, res: &Resource) {
    res.subscriptions().iter().for_each(|s| {
                                self.queue.cancel_all(s.peer(), s.token());
                              });
  }

  /// Stop retransmitting every message to `peer` carrying `token`,
  /// yielding how many were cancelled.
  pub fn cancel_all_messages(&mut self, peer: SocketAddr, token: &[u8]) -> usize {
    self.queue.cancel_all(peer, token)
  }
}
