use super::{Opt, OptFilter, OptNumber, OptParseError};
use crate::from_bytes::TryConsumeBytes;
use crate::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State<'a> {
  Reading { bytes: Cursor<&'a [u8]>, number: u16 },
  Done,
  Poisoned(OptParseError),
}

/// Iterator over the options in a message, yielding each option's
/// number alongside its value.
///
/// Options are parsed lazily, one per call to `next`. Iteration ends
/// at the payload marker or the end of the buffer. The first malformed
/// option poisons the iterator; it yields nothing afterwards, and
/// [`OptIter::poison`] reports what went wrong.
///
/// ```
/// use newt_msg::{known, OptFilter, OptIter, OptNumber};
///
/// // Uri-Path "a", Uri-Path "b", Content-Format 0, payload marker
/// let opts = [0xb1, b'a', 0x01, b'b', 0x10, 0xff];
///
/// let all = OptIter::new(&opts, None).collect::<Vec<_>>();
/// assert_eq!(all,
///            vec![(known::URI_PATH, b"a".as_ref()),
///                 (known::URI_PATH, b"b".as_ref()),
///                 (known::CONTENT_FORMAT, b"".as_ref())]);
///
/// let filter = OptFilter::from_iter([known::CONTENT_FORMAT]);
/// let cf = OptIter::new(&opts, Some(filter)).collect::<Vec<_>>();
/// assert_eq!(cf, vec![(known::CONTENT_FORMAT, b"".as_ref())]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptIter<'a> {
  bytes: &'a [u8],
  filter: Option<OptFilter>,
  state: State<'a>,
}

impl<'a> OptIter<'a> {
  /// Iterate over the options at the start of `bytes`, yielding only those
  /// in `filter` (or every option, if `filter` is `None`).
  pub fn new(bytes: &'a [u8], filter: Option<OptFilter>) -> Self {
    Self { bytes,
           filter,
           state: State::Reading { bytes: Cursor::new(bytes),
                                   number: 0 } }
  }

  /// Rewind to the first option
  pub fn restart(&mut self) {
    *self = Self::new(self.bytes, self.filter);
  }

  /// Whether a malformed option has been encountered
  pub fn is_poisoned(&self) -> bool {
    matches!(self.state, State::Poisoned(_))
  }

  /// The error that poisoned this iterator, if any
  pub fn poison(&self) -> Option<OptParseError> {
    match self.state {
      | State::Poisoned(e) => Some(e),
      | _ => None,
    }
  }

  /// Whether this iterator has reached the end of the options without error
  pub fn is_done(&self) -> bool {
    self.state == State::Done
  }

  /// Byte offset of the next unread option, relative to the start of the buffer.
  ///
  /// `None` once iteration has finished.
  pub fn position(&self) -> Option<usize> {
    match &self.state {
      | State::Reading { bytes, .. } => Some(bytes.position()),
      | _ => None,
    }
  }

  fn step(&mut self) -> Option<(OptNumber, &'a [u8])> {
    let (bytes, number) = match &mut self.state {
      | State::Reading { bytes, number } => (bytes, number),
      | _ => return None,
    };

    let next = match Opt::try_consume_bytes(bytes) {
      | Ok(opt) => number.checked_add(opt.delta.0)
                         .map(|n| (n, opt.value))
                         .ok_or(OptParseError::OptionNumberOverflow),
      | Err(e) => Err(e),
    };

    match next {
      | Ok((n, value)) => {
        *number = n;
        Some((OptNumber(n), value))
      },
      | Err(OptParseError::OptionsExhausted) => {
        self.state = State::Done;
        None
      },
      | Err(e) => {
        self.state = State::Poisoned(e);
        None
      },
    }
  }
}

impl<'a> Iterator for OptIter<'a> {
  type Item = (OptNumber, &'a [u8]);

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let (n, value) = self.step()?;
      match self.filter {
        | Some(f) if !f.contains(n) => continue,
        | _ => return Some((n, value)),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stops_at_payload_marker() {
    let bytes = [0x11, 0x01, 0xff, 0x11, 0x02];
    let mut iter = OptIter::new(&bytes, None);
    assert_eq!(iter.next(), Some((OptNumber(1), [1u8].as_ref())));
    assert_eq!(iter.next(), None);
    assert!(iter.is_done());
    assert!(!iter.is_poisoned());
  }

  #[test]
  fn poisoned_forever() {
    // second option claims 14 bytes that are not there
    let bytes = [0x11, 0x01, 0xae, 0xf0, 0x03, 0x11, 0x01];
    let mut iter = OptIter::new(&bytes, None);
    assert_eq!(iter.next(), Some((OptNumber(1), [1u8].as_ref())));
    assert_eq!(iter.next(), None);
    assert!(iter.is_poisoned());
    assert_eq!(iter.poison(), Some(OptParseError::UnexpectedEndOfStream));
    assert_eq!(iter.next(), None);
    assert!(iter.is_poisoned());
  }

  #[test]
  fn number_overflow_poisons() {
    // delta 65535, then delta 269
    let bytes = [0xe0, 0xfe, 0xf2, 0xe0, 0x00, 0x00];
    let mut iter = OptIter::new(&bytes, None);
    assert_eq!(iter.next(), Some((OptNumber(u16::MAX), &[] as &[u8])));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.poison(), Some(OptParseError::OptionNumberOverflow));
  }

  #[test]
  fn restart() {
    let bytes = [0x11, 0x01, 0x11, 0x02];
    let mut iter = OptIter::new(&bytes, None);
    assert_eq!(iter.by_ref().count(), 2);
    assert_eq!(iter.position(), None);

    iter.restart();
    assert_eq!(iter.position(), Some(0));
    assert_eq!(iter.map(|(n, _)| n.0).collect::<Vec<_>>(), vec![1, 2]);
  }

  #[test]
  fn filtered_skips_without_poisoning() {
    let bytes = [0x11, 0x01, 0xa1, 0x02, 0x11, 0x03];
    let filter = OptFilter::from_iter([OptNumber(12)]);
    let iter = OptIter::new(&bytes, Some(filter));
    assert_eq!(iter.collect::<Vec<_>>(),
               vec![(OptNumber(12), [3u8].as_ref())]);
  }
}
