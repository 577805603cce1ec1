use core::fmt;
use core::ops::BitOr;

use newt_msg::{Code, Pdu};
use no_std_net::SocketAddr;
use std_alloc::borrow::Cow;
use std_alloc::boxed::Box;
use std_alloc::collections::BTreeMap;
use std_alloc::vec::Vec;

use crate::hash::{self, Key};
use crate::net::Interface;
use crate::observe::Subscription;

/// Link-format serialization of resources & `/.well-known/core`
pub mod link;

/// Request methods a resource may handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
  /// `0.01`
  Get,
  /// `0.02`
  Post,
  /// `0.03`
  Put,
  /// `0.04`
  Delete,
}

impl Method {
  /// The method of a request code, if it is one we know.
  ///
  /// ```
  /// use newt::resource::Method;
  /// use newt_msg::Code;
  ///
  /// assert_eq!(Method::from_code(Code::PUT), Some(Method::Put));
  /// assert_eq!(Method::from_code(Code::new(0, 5)), None);
  /// assert_eq!(Method::from_code(Code::CONTENT), None);
  /// ```
  pub fn from_code(code: Code) -> Option<Self> {
    match (code.class, code.detail) {
      | (0, 1) => Some(Method::Get),
      | (0, 2) => Some(Method::Post),
      | (0, 3) => Some(Method::Put),
      | (0, 4) => Some(Method::Delete),
      | _ => None,
    }
  }

  fn index(&self) -> usize {
    match self {
      | Method::Get => 0,
      | Method::Post => 1,
      | Method::Put => 2,
      | Method::Delete => 3,
    }
  }
}

/// Behavior flags of a [`Resource`]
///
/// ```
/// use newt::resource::Flags;
///
/// let flags = Flags::OBSERVABLE | Flags::NOTIFY_CON;
/// assert!(flags.contains(Flags::OBSERVABLE));
/// assert!(!Flags::NONE.contains(Flags::NOTIFY_CON));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Flags(u8);

impl Flags {
  /// No flags set
  pub const NONE: Flags = Flags(0);
  /// Clients may observe the resource
  pub const OBSERVABLE: Flags = Flags(0b01);
  /// Notifications are always sent confirmable
  pub const NOTIFY_CON: Flags = Flags(0b10);

  /// Whether every flag in `other` is set in `self`
  pub fn contains(&self, other: Flags) -> bool {
    self.0 & other.0 == other.0
  }

  fn set(&mut self, other: Flags, on: bool) {
    if on {
      self.0 |= other.0;
    } else {
      self.0 &= !other.0;
    }
  }
}

impl BitOr for Flags {
  type Output = Flags;

  fn bitor(self, rhs: Flags) -> Flags {
    Flags(self.0 | rhs.0)
  }
}

/// A link-format attribute of a resource, e.g. `rt="temperature"` or `obs`
///
/// Values are stored as they will be printed, quotes included.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attr {
  /// Attribute name
  pub name: Cow<'static, str>,
  /// Attribute value, if any
  pub value: Option<Cow<'static, str>>,
}

/// What a handler is being asked to respond to
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
  /// Key of the resource being requested
  pub key: Key,
  /// Path of the resource being requested
  pub uri: &'a str,
  /// Interface the response will be sent from
  pub iface: Interface,
  /// Who the response will be sent to
  pub peer: SocketAddr,
  /// Token the response will carry
  pub token: &'a [u8],
  /// The request that was received.
  ///
  /// `None` when the handler is building a notification for an observer.
  pub pdu: Option<&'a Pdu>,
}

/// Fills in a response, which arrives with its type, id, token
/// (and Observe option, for observers) already set.
///
/// Options must be added in order, so options numbered below
/// Observe (6) cannot be added to notifications.
pub type Handler = Box<dyn Fn(&Request<'_>, &mut Pdu)>;

/// A resource that may be requested, observed and discovered
pub struct Resource {
  uri: Cow<'static, str>,
  key: Key,
  attrs: Vec<Attr>,
  handlers: [Option<Handler>; 4],
  flags: Flags,
  dirty: bool,
  pub(crate) partially_dirty: bool,
  pub(crate) subscriptions: Vec<Subscription>,
  serial: u64,
}

impl fmt::Debug for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let methods = [Method::Get, Method::Post, Method::Put, Method::Delete];

    f.debug_struct("Resource")
     .field("uri", &self.uri)
     .field("key", &self.key)
     .field("attrs", &self.attrs)
     .field("handlers",
            &methods.iter()
                    .filter(|m| self.handler(**m).is_some())
                    .collect::<Vec<_>>())
     .field("flags", &self.flags)
     .field("dirty", &self.dirty)
     .field("partially_dirty", &self.partially_dirty)
     .field("subscriptions", &self.subscriptions)
     .finish()
  }
}

impl Resource {
  /// Create a resource at `uri`.
  ///
  /// A leading `/` is dropped from the uri; the key is computed from its path.
  ///
  /// ```
  /// use newt::hash::Key;
  /// use newt::resource::{Flags, Resource};
  ///
  /// let r = Resource::new("/sensors/temp", Flags::OBSERVABLE);
  /// assert_eq!(r.uri(), "sensors/temp");
  /// assert_eq!(r.key(), Key::from_uri("sensors/temp"));
  /// assert!(r.is_observable());
  /// ```
  pub fn new(uri: impl Into<Cow<'static, str>>, flags: Flags) -> Self {
    let uri = match uri.into() {
      | Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('/').unwrap_or(s)),
      | Cow::Owned(s) if s.starts_with('/') => Cow::Owned(s[1..].into()),
      | owned => owned,
    };

    Self { key: Key::from_uri(&uri),
           uri,
           attrs: Vec::new(),
           handlers: [None, None, None, None],
           flags,
           dirty: false,
           partially_dirty: false,
           subscriptions: Vec::new(),
           serial: 0 }
  }

  /// Path of this resource, without a leading `/`
  pub fn uri(&self) -> &str {
    &self.uri
  }

  /// Key of this resource
  pub fn key(&self) -> Key {
    self.key
  }

  /// See [`Flags`]
  pub fn flags(&self) -> Flags {
    self.flags
  }

  /// May clients observe this resource?
  pub fn is_observable(&self) -> bool {
    self.flags.contains(Flags::OBSERVABLE)
  }

  /// Allow or disallow observing this resource
  ///
  /// Existing observers are kept, but are not notified while
  /// the resource is not observable.
  pub fn set_observable(&mut self, observable: bool) {
    self.flags.set(Flags::OBSERVABLE, observable);
  }

  /// Are notifications always confirmable?
  pub fn notify_con(&self) -> bool {
    self.flags.contains(Flags::NOTIFY_CON)
  }

  /// Make all notifications confirmable (or not)
  pub fn set_notify_con(&mut self, con: bool) {
    self.flags.set(Flags::NOTIFY_CON, con);
  }

  /// Attributes, most recently added first
  pub fn attrs(&self) -> &[Attr] {
    &self.attrs
  }

  /// The most recently added attribute named `name`
  pub fn attr(&self, name: &str) -> Option<&Attr> {
    self.attrs.iter().find(|a| a.name == name)
  }

  /// Add a link-format attribute.
  ///
  /// Borrowed (`'static`) names and values are kept as references,
  /// owned ones are dropped with the resource.
  ///
  /// ```
  /// use newt::resource::{Flags, Resource};
  ///
  /// let mut r = Resource::new("temp", Flags::NONE);
  /// r.add_attribute("ct", Some("0".into()));
  /// r.add_attribute("rt", Some(format!("\"{}\"", "temperature").into()));
  ///
  /// assert_eq!(r.attrs()[0].name, "rt");
  /// assert_eq!(r.attr("ct").unwrap().value.as_deref(), Some("0"));
  /// ```
  pub fn add_attribute(&mut self,
                       name: impl Into<Cow<'static, str>>,
                       value: Option<Cow<'static, str>>) {
    self.attrs.insert(0,
                      Attr { name: name.into(),
                             value });
  }

  /// Respond to requests with `method` using `handler`
  pub fn set_handler<F>(&mut self, method: Method, handler: F)
    where F: Fn(&Request<'_>, &mut Pdu) + 'static
  {
    self.handlers[method.index()] = Some(Box::new(handler));
  }

  /// Stop handling requests with `method`
  pub fn remove_handler(&mut self, method: Method) {
    self.handlers[method.index()] = None;
  }

  /// The handler for `method`, if any
  pub fn handler(&self, method: Method) -> Option<&Handler> {
    self.handlers[method.index()].as_ref()
  }

  /// Note that the resource has changed, so that every
  /// observer is notified on the next check.
  pub fn mark_dirty(&mut self) {
    self.dirty = true;
  }

  /// Has the resource changed since observers were last notified?
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Did notifying some observers fail last time?
  pub fn is_partially_dirty(&self) -> bool {
    self.partially_dirty
  }

  pub(crate) fn clear_dirty(&mut self) {
    self.dirty = false;
  }

  /// Observers of this resource, most recent first
  pub fn subscriptions(&self) -> &[Subscription] {
    &self.subscriptions
  }

  /// Borrow the path & GET handler alongside the subscriptions
  pub(crate) fn split_for_notify(&mut self) -> (&str, Option<&Handler>, &mut Vec<Subscription>) {
    (&self.uri, self.handlers[Method::Get.index()].as_ref(), &mut self.subscriptions)
  }
}

/// Handle to a resource in a [`Registry`]
///
/// Handles of removed resources are never reused for other resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId {
  index: u32,
  gen: u32,
}

#[derive(Debug)]
struct Slot {
  gen: u32,
  res: Option<Resource>,
}

/// The resources this endpoint serves, keyed by path
#[derive(Debug, Default)]
pub struct Registry {
  slots: Vec<Slot>,
  free: Vec<u32>,
  by_key: BTreeMap<Key, ResourceId>,
  next_serial: u64,
  observe_seq: u32,
}

impl Registry {
  /// Create an empty registry
  pub fn new() -> Self {
    Default::default()
  }

  /// Create a resource at `uri` and add it to the registry.
  ///
  /// A resource already registered at the same path is replaced.
  ///
  /// ```
  /// use newt::resource::{Flags, Registry};
  ///
  /// let mut reg = Registry::new();
  /// let id = reg.register("/a", Flags::NONE);
  /// assert_eq!(reg.get(id).unwrap().uri(), "a");
  ///
  /// let id2 = reg.register("a", Flags::OBSERVABLE);
  /// assert!(reg.get(id).is_none());
  /// assert!(reg.get(id2).unwrap().is_observable());
  /// assert_eq!(reg.len(), 1);
  /// ```
  pub fn register(&mut self, uri: impl Into<Cow<'static, str>>, flags: Flags) -> ResourceId {
    self.insert(Resource::new(uri, flags)).0
  }

  /// Add a resource, yielding its handle and the resource it replaced (if any)
  pub fn insert(&mut self, mut res: Resource) -> (ResourceId, Option<Resource>) {
    let key = res.key();
    let replaced = self.remove(key);

    if let Some(old) = replaced.as_ref() {
      log::warn!("resource </{}> replaced by </{}>", old.uri(), res.uri());
    }

    res.serial = self.next_serial;
    self.next_serial += 1;

    let id = match self.free.pop() {
      | Some(index) => {
        let slot = &mut self.slots[index as usize];
        slot.res = Some(res);
        ResourceId { index,
                     gen: slot.gen }
      },
      | None => {
        self.slots.push(Slot { gen: 0,
                               res: Some(res) });
        ResourceId { index: (self.slots.len() - 1) as u32,
                     gen: 0 }
      },
    };

    self.by_key.insert(key, id);
    (id, replaced)
  }

  /// Find the handle of the resource with a given key
  pub fn find(&self, key: Key) -> Option<ResourceId> {
    self.by_key.get(&key).copied()
  }

  /// Find the handle of the resource at a uri
  pub fn find_uri(&self, uri: &str) -> Option<ResourceId> {
    self.find(Key::from_uri(uri))
  }

  /// Get a resource by handle
  pub fn get(&self, id: ResourceId) -> Option<&Resource> {
    self.slots
        .get(id.index as usize)
        .filter(|slot| slot.gen == id.gen)
        .and_then(|slot| slot.res.as_ref())
  }

  /// Mutably get a resource by handle
  pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
    self.slots
        .get_mut(id.index as usize)
        .filter(|slot| slot.gen == id.gen)
        .and_then(|slot| slot.res.as_mut())
  }

  /// Get a resource by key
  pub fn by_key(&self, key: Key) -> Option<&Resource> {
    self.find(key).and_then(|id| self.get(id))
  }

  /// Mutably get a resource by key
  pub fn by_key_mut(&mut self, key: Key) -> Option<&mut Resource> {
    let id = self.find(key)?;
    self.get_mut(id)
  }

  /// Remove a resource, yielding it so that the caller can clean up
  /// after its observers.
  pub fn remove(&mut self, key: Key) -> Option<Resource> {
    let id = self.by_key.remove(&key)?;
    let slot = self.slots.get_mut(id.index as usize)?;

    slot.gen = slot.gen.wrapping_add(1);
    self.free.push(id.index);
    slot.res.take()
  }

  /// Remove a resource, yielding whether it existed
  pub fn delete(&mut self, key: Key) -> bool {
    self.remove(key).is_some()
  }

  /// Iterate over the resources in no particular order
  pub fn iter(&self) -> impl Iterator<Item = &Resource> {
    self.slots.iter().filter_map(|slot| slot.res.as_ref())
  }

  /// Mutably iterate over the resources in no particular order
  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
    self.slots.iter_mut().filter_map(|slot| slot.res.as_mut())
  }

  /// The resources, oldest first
  pub fn in_registration_order(&self) -> Vec<&Resource> {
    let mut all = self.iter().collect::<Vec<_>>();
    all.sort_by_key(|r| r.serial);
    all
  }

  /// Number of resources
  pub fn len(&self) -> usize {
    self.by_key.len()
  }

  /// Are there no resources?
  pub fn is_empty(&self) -> bool {
    self.by_key.is_empty()
  }

  /// Whether a resource is registered at `/.well-known/core`,
  /// overriding the generated listing.
  pub fn has_well_known(&self) -> bool {
    self.find(Key::from_uri(hash::WELL_KNOWN_CORE)).is_some()
  }

  /// The value of the Observe option in the next round of notifications
  pub fn observe_seq(&self) -> u32 {
    self.observe_seq
  }

  pub(crate) fn bump_observe_seq(&mut self) {
    self.observe_seq = self.observe_seq.wrapping_add(1);
  }
}
