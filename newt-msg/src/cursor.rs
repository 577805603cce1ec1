/// A cursor over a byte slice (std- and alloc-less port of [`std::io::Cursor`])
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor<T> {
  t: T,
  cursor: usize,
  len: usize,
}

impl<T: AsRef<[u8]>> Cursor<T> {
  /// Creates a new cursor
  pub fn new(t: T) -> Cursor<T> {
    let len = t.as_ref().len();
    Cursor { t, cursor: 0, len }
  }

  /// Unwraps the cursor, discarding its internal position
  pub fn into_inner(self) -> T {
    self.t
  }

  fn peek_(len: usize, cursor: usize, t: &T, n: usize) -> Option<&[u8]> {
    if n > len - cursor {
      None
    } else {
      Some(&t.as_ref()[cursor..cursor + n])
    }
  }

  /// Take the next byte in the cursor, returning None
  /// if the cursor is exhausted.
  ///
  /// Runs in O(1) time.
  pub fn next(&mut self) -> Option<u8> {
    self.take_exact(1).and_then(|a| match a {
                        | &[a] => Some(a),
                        | _ => None,
                      })
  }

  /// Take `n` bytes from the cursor, returning None if
  /// the end of the buffer is encountered.
  ///
  /// Runs in O(1) time.
  pub fn take_exact(&mut self, n: usize) -> Option<&[u8]> {
    Self::peek_(self.len, self.cursor, &self.t, n).map(|a| {
                                                    self.cursor += n;
                                                    a
                                                  })
  }

  /// Without advancing the position, look at the next
  /// `n` bytes, returning None if there are less than `n` bytes
  /// remaining.
  ///
  /// Runs in O(1) time.
  pub fn peek_exact(&self, n: usize) -> Option<&[u8]> {
    Self::peek_(self.len, self.cursor, &self.t, n)
  }

  /// Advance the position by up to `n` bytes
  pub fn skip(&mut self, n: usize) -> usize {
    let n = n.min(self.remaining());
    self.cursor += n;
    n
  }

  /// Whether the cursor has reached the end
  /// of the buffer.
  ///
  /// Runs in O(1) time.
  pub fn is_exhausted(&self) -> bool {
    self.cursor >= self.len
  }

  /// Number of bytes that have not been consumed yet
  pub fn remaining(&self) -> usize {
    self.len - self.cursor
  }

  /// Get the bytes remaining in the buffer without consuming them
  ///
  /// Runs in O(1) time.
  pub fn until_end(&self) -> &[u8] {
    &self.t.as_ref()[self.cursor..]
  }

  /// Get the position the cursor points to within
  /// the buffer
  pub fn position(&self) -> usize {
    self.cursor
  }
}

impl<'a> Cursor<&'a [u8]> {
  /// [`Cursor::take_exact`] that yields slices borrowed
  /// for the lifetime of the underlying buffer, rather than the cursor.
  pub fn take_slice(&mut self, n: usize) -> Option<&'a [u8]> {
    let t: &'a [u8] = self.t;
    if n > self.len - self.cursor {
      None
    } else {
      let out = &t[self.cursor..self.cursor + n];
      self.cursor += n;
      Some(out)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  pub fn next() {
    let mut cur = Cursor::new(vec![1]);
    assert_eq!(cur.next(), Some(1));
    assert_eq!(cur.next(), None);
    assert_eq!(cur.next(), None);
  }

  #[test]
  pub fn take_exact() {
    let mut cur = Cursor::new(vec![1, 2, 3]);
    assert_eq!(cur.take_exact(2), Some([1, 2].as_ref()));
    assert_eq!(cur.take_exact(2), None);
    assert_eq!(cur.take_exact(1), Some([3].as_ref()));
    assert!(cur.is_exhausted());
  }

  #[test]
  pub fn peek_exact() {
    let mut cur = Cursor::new(vec![1, 2, 3]);
    assert_eq!(cur.peek_exact(3), Some([1, 2, 3].as_ref()));
    assert_eq!(cur.peek_exact(1), Some([1].as_ref()));
    assert_eq!(cur.take_exact(4), None);
    assert_eq!(cur.position(), 0);
  }

  #[test]
  pub fn skip_and_remaining() {
    let mut cur = Cursor::new([1u8, 2, 3, 4]);
    assert_eq!(cur.skip(1), 1);
    assert_eq!(cur.remaining(), 3);
    assert_eq!(cur.until_end(), &[2, 3, 4]);
    assert_eq!(cur.skip(10), 3);
    assert_eq!(cur.until_end(), &[] as &[u8]);
  }

  #[test]
  pub fn take_slice_outlives_cursor() {
    let buf = [9u8, 8, 7];
    let taken = {
      let mut cur = Cursor::new(&buf[..]);
      cur.next();
      cur.take_slice(2)
    };
    assert_eq!(taken, Some([8u8, 7].as_ref()));
  }
}
