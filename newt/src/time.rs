use embedded_time::duration::Milliseconds;
use embedded_time::Instant;

/// A duration, in milliseconds
pub type Millis = Milliseconds<u64>;

/// Supertrait of [`embedded_time::Clock`] pinning the
/// type of "ticks" to u64
pub trait Clock: embedded_time::Clock<T = u64> {}
impl<C: embedded_time::Clock<T = u64>> Clock for C {}

/// Convert an instant to the number of milliseconds since the clock's epoch
///
/// ```
/// use embedded_time::rate::Fraction;
/// use embedded_time::Instant;
/// use newt::time::{since_epoch, Millis};
///
/// #[derive(Debug)]
/// struct Micros;
///
/// impl embedded_time::Clock for Micros {
///   type T = u64;
///   const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);
///
///   fn try_now(&self) -> Result<Instant<Self>, embedded_time::clock::Error> {
///     Ok(Instant::new(0))
///   }
/// }
///
/// assert_eq!(since_epoch(Instant::<Micros>::new(2_500_000)), Some(Millis::new(2_500u64)));
/// ```
pub fn since_epoch<C: Clock>(now: Instant<C>) -> Option<Millis> {
  Millis::try_from(now.duration_since_epoch()).ok()
}

/// Read the clock, in milliseconds since its epoch
pub fn now<C: Clock>(clock: &C) -> Result<Millis, embedded_time::clock::Error> {
  clock.try_now()
       .and_then(|now| since_epoch(now).ok_or(embedded_time::clock::Error::Unspecified))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test::ClockMock;

  #[test]
  fn now_reads_millis() {
    let clock = ClockMock::new();
    clock.set(1234);
    assert_eq!(now(&clock).unwrap(), Milliseconds(1234u64));
  }
}
