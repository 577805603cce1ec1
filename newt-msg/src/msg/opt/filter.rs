use super::OptNumber;

/// A set of option numbers, used to restrict which options an
/// [`OptIter`](super::OptIter) yields.
///
/// Numbers below 64 are tracked exactly. Larger numbers share one
/// of 16 buckets (`n % 16`), so [`OptFilter::contains`] may report a
/// number that was never added if another number in its bucket was.
/// Removing a large number clears its whole bucket.
///
/// ```
/// use newt_msg::{known, OptFilter, OptNumber};
///
/// let mut filter = OptFilter::empty();
/// filter.insert(known::URI_PATH);
/// filter.insert(known::NO_RESPONSE);
///
/// assert!(filter.contains(known::URI_PATH));
/// assert!(!filter.contains(known::URI_QUERY));
/// assert!(filter.contains(known::NO_RESPONSE));
///
/// // 258 and 274 share a bucket
/// assert!(filter.contains(OptNumber(274)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct OptFilter {
  exact: u64,
  buckets: u16,
}

enum Bit {
  Exact(u64),
  Bucket(u16),
}

impl Bit {
  fn of(n: OptNumber) -> Self {
    match n.0 {
      | n if n < 64 => Bit::Exact(1 << n),
      | n => Bit::Bucket(1 << (n % 16)),
    }
  }
}

impl OptFilter {
  /// A filter that matches no options
  pub const fn empty() -> Self {
    Self { exact: 0,
           buckets: 0 }
  }

  /// A filter that matches every option
  pub const fn all() -> Self {
    Self { exact: u64::MAX,
           buckets: u16::MAX }
  }

  /// Add an option number to the filter
  pub fn insert(&mut self, n: OptNumber) {
    match Bit::of(n) {
      | Bit::Exact(b) => self.exact |= b,
      | Bit::Bucket(b) => self.buckets |= b,
    }
  }

  /// Remove an option number from the filter.
  ///
  /// For numbers 64 and above, this removes every number sharing its bucket.
  pub fn remove(&mut self, n: OptNumber) {
    match Bit::of(n) {
      | Bit::Exact(b) => self.exact &= !b,
      | Bit::Bucket(b) => self.buckets &= !b,
    }
  }

  /// Whether the filter (possibly) contains an option number
  pub fn contains(&self, n: OptNumber) -> bool {
    match Bit::of(n) {
      | Bit::Exact(b) => self.exact & b != 0,
      | Bit::Bucket(b) => self.buckets & b != 0,
    }
  }

  /// Whether nothing has been added to the filter
  pub fn is_empty(&self) -> bool {
    self.exact == 0 && self.buckets == 0
  }
}

impl FromIterator<OptNumber> for OptFilter {
  fn from_iter<I: IntoIterator<Item = OptNumber>>(iter: I) -> Self {
    let mut filter = Self::empty();
    iter.into_iter().for_each(|n| filter.insert(n));
    filter
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_numbers() {
    let mut f = [OptNumber(0), OptNumber(11), OptNumber(63)].into_iter()
                                                             .collect::<OptFilter>();
    assert!(f.contains(OptNumber(0)));
    assert!(f.contains(OptNumber(63)));
    assert!(!f.contains(OptNumber(12)));

    f.remove(OptNumber(11));
    assert!(!f.contains(OptNumber(11)));
    assert!(f.contains(OptNumber(0)));
  }

  #[test]
  fn bucketed_numbers() {
    let mut f = OptFilter::empty();
    f.insert(OptNumber(64));
    assert!(f.contains(OptNumber(64)));
    assert!(f.contains(OptNumber(80)));
    assert!(!f.contains(OptNumber(65)));
    assert!(!f.contains(OptNumber(0)));

    f.insert(OptNumber(96));
    f.remove(OptNumber(80));
    assert!(!f.contains(OptNumber(64)));
    assert!(!f.contains(OptNumber(96)));
    assert!(f.is_empty());
  }

  #[test]
  fn all_and_empty() {
    assert!(OptFilter::all().contains(OptNumber(u16::MAX)));
    assert!(!OptFilter::empty().contains(OptNumber(1)));
  }
}
