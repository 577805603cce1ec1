use std_alloc::vec::Vec;

use super::{Registry, Resource};

/// The outcome of printing link-format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Printed {
  /// Bytes appended to the output buffer
  pub written: usize,
  /// Length of the entire representation, ignoring offset and budget
  pub total: usize,
  /// Whether the budget ran out before the end of the representation
  pub truncated: bool,
}

/// Appends to a buffer, skipping the first `offset` bytes
/// and dropping anything past `budget`, while counting the total.
struct LinkWriter<'a> {
  out: &'a mut Vec<u8>,
  budget: usize,
  written: usize,
  offset: &'a mut usize,
  skipped: usize,
  total: usize,
}

impl<'a> LinkWriter<'a> {
  fn new(out: &'a mut Vec<u8>, offset: &'a mut usize, budget: usize) -> Self {
    Self { out,
           budget,
           written: 0,
           offset,
           skipped: 0,
           total: 0 }
  }

  fn byte(&mut self, b: u8) {
    if self.written < self.budget {
      if *self.offset > 0 {
        *self.offset -= 1;
        self.skipped += 1;
      } else {
        self.out.push(b);
        self.written += 1;
      }
    }

    self.total += 1;
  }

  fn bytes(&mut self, bs: &[u8]) {
    bs.iter().for_each(|b| self.byte(*b));
  }

  fn link(&mut self, res: &Resource) {
    self.bytes(b"</");
    self.bytes(res.uri().as_bytes());
    self.byte(b'>');

    res.attrs().iter().for_each(|attr| {
                        self.byte(b';');
                        self.bytes(attr.name.as_bytes());
                        if let Some(v) = attr.value.as_ref() {
                          self.byte(b'=');
                          self.bytes(v.as_bytes());
                        }
                      });

    if res.is_observable() {
      self.bytes(b";obs");
    }
  }

  fn finish(self) -> Printed {
    Printed { written: self.written,
              total: self.total,
              truncated: self.written + self.skipped < self.total }
  }
}

/// A `/.well-known/core` query filter, e.g. `rt=temp*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Query<'a> {
  name: &'a [u8],
  pattern: &'a [u8],
  prefix: bool,
}

impl<'a> Query<'a> {
  fn parse(q: &'a [u8]) -> Self {
    let (name, pattern) = match q.iter().position(|b| *b == b'=') {
      | Some(eq) => (&q[..eq], &q[eq + 1..]),
      | None => (q, &[] as &[u8]),
    };

    let pattern = match name {
      | b"href" => pattern.strip_prefix(b"/").unwrap_or(pattern),
      | _ => pattern,
    };

    match pattern.strip_suffix(b"*") {
      | Some(pattern) => Query { name,
                                 pattern,
                                 prefix: true },
      | None => Query { name,
                        pattern,
                        prefix: false },
    }
  }

  /// Whether the value is a space-separated list of tokens to match individually
  fn tokenized(&self) -> bool {
    matches!(self.name, b"rt" | b"if" | b"rel")
  }

  fn matches(&self, res: &Resource) -> bool {
    match self.name {
      | b"href" => self.matches_text(res.uri().as_bytes()),
      | name => res.attrs()
                   .iter()
                   .find(|a| a.name.as_bytes() == name)
                   .map(|a| a.value.as_deref().unwrap_or(""))
                   .map(|v| self.matches_text(unquote(v).as_bytes()))
                   .unwrap_or(false),
    }
  }

  fn matches_text(&self, text: &[u8]) -> bool {
    if text.len() < self.pattern.len() {
      return false;
    }

    let matches_one = |text: &[u8]| match self.prefix {
      | true => text.starts_with(self.pattern),
      | false => text == self.pattern,
    };

    if self.tokenized() {
      text.split(|b| *b == b' ').any(matches_one)
    } else {
      matches_one(text)
    }
  }
}

fn unquote(v: &str) -> &str {
  match v.strip_prefix('"') {
    | Some(v) => v.strip_suffix('"').unwrap_or(v),
    | None => v,
  }
}

impl Resource {
  /// Append this resource's link-format representation (`</uri>;attr=value;obs`)
  /// to `out`.
  ///
  /// The first `offset` bytes of the representation are skipped (and `offset`
  /// is reduced by the number of bytes skipped), and at most `budget` bytes
  /// are written.
  ///
  /// ```
  /// use newt::resource::{Flags, Resource};
  ///
  /// let mut r = Resource::new("temp", Flags::OBSERVABLE);
  /// r.add_attribute("ct", Some("0".into()));
  /// r.add_attribute("rt", Some("\"temperature\"".into()));
  ///
  /// let mut out = vec![];
  /// let printed = r.print_link(&mut out, &mut 0, 100);
  /// assert_eq!(out, b"</temp>;rt=\"temperature\";ct=0;obs");
  /// assert_eq!(printed.written, out.len());
  /// assert!(!printed.truncated);
  ///
  /// let mut out = vec![];
  /// let printed = r.print_link(&mut out, &mut 2, 5);
  /// assert_eq!(out, b"temp>");
  /// assert!(printed.truncated);
  /// ```
  pub fn print_link(&self, out: &mut Vec<u8>, offset: &mut usize, budget: usize) -> Printed {
    let mut w = LinkWriter::new(out, offset, budget);
    w.link(self);
    w.finish()
  }
}

impl Registry {
  /// Append the `/.well-known/core` listing to `out`: the link-format
  /// representations of every resource matching `query`, oldest first,
  /// separated by `,`.
  ///
  /// `offset` and `budget` are shared by the whole listing;
  /// see [`Resource::print_link`].
  ///
  /// Queries look like `name=value`, where a `value` ending in `*` matches
  /// by prefix. `href` is matched against resource uris,
  /// `rt`, `if` and `rel` against any space-separated token in the attribute,
  /// and any other name against the whole (unquoted) attribute.
  ///
  /// ```
  /// use newt::resource::{Flags, Registry};
  ///
  /// let mut reg = Registry::new();
  /// reg.register("a", Flags::NONE);
  /// let b = reg.register("b", Flags::NONE);
  /// reg.get_mut(b).unwrap().add_attribute("rt", Some("\"light dimmer\"".into()));
  ///
  /// let mut out = vec![];
  /// reg.print_well_known(&mut out, 0, 100, None);
  /// assert_eq!(out, b"</a>,</b>;rt=\"light dimmer\"");
  ///
  /// let mut out = vec![];
  /// reg.print_well_known(&mut out, 0, 100, Some(b"rt=dim*".as_ref()));
  /// assert_eq!(out, b"</b>;rt=\"light dimmer\"");
  /// ```
  pub fn print_well_known(&self,
                          out: &mut Vec<u8>,
                          mut offset: usize,
                          budget: usize,
                          query: Option<&[u8]>)
                          -> Printed {
    let query = query.map(Query::parse);
    let mut w = LinkWriter::new(out, &mut offset, budget);

    self.in_registration_order()
        .into_iter()
        .filter(|r| query.map(|q| q.matches(r)).unwrap_or(true))
        .enumerate()
        .for_each(|(ix, r)| {
          if ix > 0 {
            w.byte(b',');
          }
          w.link(r);
        });

    w.finish()
  }

  /// The length of the entire `/.well-known/core` listing matching `query`
  pub fn well_known_len(&self, query: Option<&[u8]>) -> usize {
    self.print_well_known(&mut Vec::new(), 0, 0, query).total
  }
}
