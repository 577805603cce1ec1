use core::cmp::Reverse;

use embedded_time::duration::Milliseconds;
use newt_msg::{Id, Pdu, Type};
use no_std_net::SocketAddr;
use std_alloc::collections::{BTreeMap, BinaryHeap};
use std_alloc::vec::Vec;

use crate::net::Interface;
use crate::retry::Attempts;
use crate::time::Millis;

/// Handle to a message waiting in a [`Queue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

/// A CON message waiting to be acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  /// The message
  pub pdu: Pdu,
  /// Where it was sent
  pub peer: SocketAddr,
  /// Where it was sent from
  pub iface: Interface,
  /// Delay before the first retransmission
  pub timeout: Millis,
  /// When the next retransmission is due, in milliseconds since the clock's epoch
  pub due: Millis,
  /// Number of retransmissions so far
  pub retransmits: Attempts,
}

/// CON messages that have been sent but not acknowledged,
/// ordered by when they are next due to be retransmitted.
///
/// ```
/// use embedded_time::duration::Milliseconds;
/// use newt::net::Interface;
/// use newt::queue::Queue;
/// use newt_msg::{Code, Id, Pdu, Type};
///
/// let iface = Interface { index: 0,
///                         addr: "0.0.0.0:5683".parse().unwrap() };
/// let peer = "10.0.0.1:5683".parse().unwrap();
/// let mut q = Queue::new();
///
/// let msg = Pdu::init(Type::Con, Code::GET, Id(1), 16);
/// q.enqueue(msg, peer, iface, Milliseconds(2_000), Milliseconds(0));
///
/// assert!(q.pop_due(Milliseconds(1_999)).is_none());
/// assert_eq!(q.next_due(), Some(Milliseconds(2_000u64)));
/// assert!(q.match_and_remove(Id(1), peer).is_some());
/// assert!(q.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Queue {
  next: u64,
  entries: BTreeMap<EntryId, Entry>,
  heap: BinaryHeap<Reverse<(u64, EntryId)>>,
  index: BTreeMap<(SocketAddr, Id), EntryId>,
}

impl Queue {
  /// Create an empty queue
  pub fn new() -> Self {
    Default::default()
  }

  /// Wait for an acknowledgement of a message sent at `now`,
  /// retransmitting it `timeout` from now if none arrives.
  ///
  /// Only CON messages are retained; anything else yields `None`.
  pub fn enqueue(&mut self,
                 pdu: Pdu,
                 peer: SocketAddr,
                 iface: Interface,
                 timeout: Millis,
                 now: Millis)
                 -> Option<EntryId> {
    if pdu.ty() != Type::Con {
      return None;
    }

    let due = Milliseconds(now.0.saturating_add(timeout.0));
    Some(self.requeue(Entry { pdu,
                              peer,
                              iface,
                              timeout,
                              due,
                              retransmits: Attempts(0) }))
  }

  /// Put an entry (usually one that was just popped) back in the queue,
  /// due at `entry.due`.
  pub fn requeue(&mut self, entry: Entry) -> EntryId {
    let id = EntryId(self.next);
    self.next += 1;

    self.heap.push(Reverse((entry.due.0, id)));
    self.index.insert((entry.peer, entry.pdu.id()), id);
    self.entries.insert(id, entry);
    id
  }

  /// Get an entry
  pub fn get(&self, id: EntryId) -> Option<&Entry> {
    self.entries.get(&id)
  }

  /// Remove the entry due soonest, if it is due at or before `now`.
  pub fn pop_due(&mut self, now: Millis) -> Option<Entry> {
    self.discard_stale();

    match self.heap.peek() {
      | Some(Reverse((due, _))) if *due <= now.0 => (),
      | _ => return None,
    }

    let Reverse((_, id)) = self.heap.pop()?;
    self.remove(id)
  }

  /// When the entry due soonest is due
  pub fn next_due(&mut self) -> Option<Millis> {
    self.discard_stale();
    self.heap.peek().map(|Reverse((due, _))| Milliseconds(*due))
  }

  /// Remove the message with id `id` sent to `peer`; it was acknowledged or reset.
  pub fn match_and_remove(&mut self, id: Id, peer: SocketAddr) -> Option<Entry> {
    let entry = *self.index.get(&(peer, id))?;
    self.remove(entry)
  }

  /// Remove every message to `peer` carrying `token`, yielding how many were removed.
  pub fn cancel_all(&mut self, peer: SocketAddr, token: &[u8]) -> usize {
    let ids = self.entries
                  .iter()
                  .filter(|(_, e)| e.peer == peer && e.pdu.token() == token)
                  .map(|(id, _)| *id)
                  .collect::<Vec<_>>();

    ids.iter().filter_map(|id| self.remove(*id)).count()
  }

  /// Iterate over the waiting messages in no particular order
  pub fn iter(&self) -> impl Iterator<Item = &Entry> {
    self.entries.values()
  }

  /// Number of waiting messages
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Are there no waiting messages?
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn remove(&mut self, id: EntryId) -> Option<Entry> {
    let entry = self.entries.remove(&id)?;
    let key = (entry.peer, entry.pdu.id());

    if self.index.get(&key) == Some(&id) {
      self.index.remove(&key);
    }

    Some(entry)
  }

  /// Heap items of removed entries are dropped lazily
  fn discard_stale(&mut self) {
    while let Some(Reverse((_, id))) = self.heap.peek() {
      if self.entries.contains_key(id) {
        break;
      }

      self.heap.pop();
    }
  }
}
