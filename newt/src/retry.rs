use core::ops::RangeInclusive;

use embedded_time::duration::Milliseconds;
use rand::{Rng, SeedableRng};

use crate::time::Millis;

/// A number of attempts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempts(pub u16);

/// Result of [`Strategy::what_should_i_do`].
///
/// This tells you if a retransmission should be attempted or not.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum YouShould {
  /// Attempts have been exhausted and the message that is
  /// being retransmitted should be given up on.
  Cry,
  /// A retransmission should be performed
  Retry,
}

/// Strategy to employ when retransmitting a confirmable message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
  /// Generate a random delay between `init_min` and `init_max`,
  /// and wait until this delay has passed before the first retransmission.
  ///
  /// After each retransmission, double the delay before retransmitting again.
  Exponential {
    /// Minimum (inclusive) delay for the first retransmission
    init_min: Milliseconds<u64>,
    /// Maximum (inclusive) delay for the first retransmission
    init_max: Milliseconds<u64>,
  },
  /// Generate a random delay between `min` and `max`,
  /// and wait until this delay has passed between retransmissions.
  Delay {
    /// Minimum (inclusive) delay between retransmissions
    min: Milliseconds<u64>,
    /// Maximum (inclusive) delay between retransmissions
    max: Milliseconds<u64>,
  },
}

impl Strategy {
  /// Are min & max delays the same? if so, we should probably skip the random number generation.
  pub fn has_jitter(&self) -> bool {
    let rng = self.range();
    rng.start() != rng.end()
  }

  /// Get the min & max durations as an inclusive range
  pub fn range(&self) -> RangeInclusive<u64> {
    match self {
      | &Self::Delay { min: Milliseconds(min),
                       max: Milliseconds(max), } => (min..=max),

      | &Self::Exponential { init_min: Milliseconds(min),
                             init_max: Milliseconds(max), } => (min..=max),
    }
  }

  /// Pick the delay before the first retransmission,
  /// using `seed` (usually the current time) to pick a point in [`Strategy::range`].
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::retry::Strategy;
  ///
  /// let exp = Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                   init_max: Milliseconds(3_000) };
  /// let Milliseconds(init) = exp.initial_timeout(1234);
  /// assert!((2_000..=3_000).contains(&init));
  /// assert_eq!(exp.initial_timeout(1234), Milliseconds(init));
  ///
  /// let fixed = Strategy::Delay { min: Milliseconds(500),
  ///                               max: Milliseconds(500) };
  /// assert_eq!(fixed.initial_timeout(1234), Milliseconds(500u64));
  /// ```
  pub fn initial_timeout(&self, seed: u64) -> Millis {
    if self.has_jitter() {
      let mut rand = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
      Milliseconds(rand.gen_range(self.range()))
    } else {
      Milliseconds(*self.range().start())
    }
  }

  /// Given the initial delay and the number of retransmissions that have been performed,
  /// yields the delay until the next retransmission should be attempted.
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::retry::{Attempts, Strategy};
  ///
  /// let exp = Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                   init_max: Milliseconds(3_000) };
  /// assert_eq!(exp.delay(Milliseconds(2_500u64), Attempts(0)), Milliseconds(2_500u64));
  /// assert_eq!(exp.delay(Milliseconds(2_500u64), Attempts(3)), Milliseconds(20_000u64));
  ///
  /// let linear = Strategy::Delay { min: Milliseconds(100),
  ///                                max: Milliseconds(200) };
  /// assert_eq!(linear.delay(Milliseconds(150u64), Attempts(3)), Milliseconds(150u64));
  /// ```
  pub fn delay(&self, Milliseconds(init): Millis, retransmits: Attempts) -> Millis {
    Milliseconds(match self {
                   | Self::Exponential { .. } => Self::delay_exp(init, retransmits.0),
                   | Self::Delay { .. } => init,
                 })
  }

  /// Given the number of retransmissions already performed, should we retransmit again?
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::retry::{Attempts, Strategy, YouShould};
  ///
  /// let exp = Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                   init_max: Milliseconds(3_000) };
  /// assert_eq!(exp.what_should_i_do(Attempts(3), Attempts(4)), YouShould::Retry);
  /// assert_eq!(exp.what_should_i_do(Attempts(4), Attempts(4)), YouShould::Cry);
  /// ```
  pub fn what_should_i_do(&self, retransmits: Attempts, max_retransmit: Attempts) -> YouShould {
    if retransmits >= max_retransmit {
      YouShould::Cry
    } else {
      YouShould::Retry
    }
  }

  /// Get the amount of time this strategy will take if all retransmissions go unacknowledged
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::retry::{Attempts, Strategy};
  ///
  /// // MAX_TRANSMIT_WAIT
  /// let exp = Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                   init_max: Milliseconds(3_000) };
  /// assert_eq!(exp.max_time(Attempts(4)), Milliseconds(93_000u64));
  /// ```
  pub fn max_time(&self, max_retransmit: Attempts) -> Millis {
    Milliseconds(match self {
                   | Self::Exponential { init_max: Milliseconds(max),
                                         .. } => {
                     (0..=max_retransmit.0).map(|n| Self::delay_exp(*max, n))
                                           .fold(0u64, u64::saturating_add)
                   },
                   | Self::Delay { max: Milliseconds(max),
                                   .. } => max.saturating_mul(max_retransmit.0 as u64 + 1),
                 })
  }

  // | retransmits | delay      |
  // | 0           | init       |
  // | 1           | init * 2   |
  // | 2           | init * 4   |
  // | n           | init * 2^n |
  fn delay_exp(init: u64, retransmits: u16) -> u64 {
    init.saturating_mul(2u64.saturating_pow(retransmits as u32))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn initial_timeout_in_range() {
    let strat = Strategy::Exponential { init_min: Milliseconds(2_000),
                                        init_max: Milliseconds(3_000) };

    (0..100u64).map(|seed| strat.initial_timeout(seed).0)
               .for_each(|init| assert!(strat.range().contains(&init), "{}", init));
  }

  #[test]
  fn initial_timeout_varies_with_seed() {
    let strat = Strategy::Exponential { init_min: Milliseconds(0),
                                        init_max: Milliseconds(u64::MAX / 2) };

    assert_ne!(strat.initial_timeout(1), strat.initial_timeout(2));
  }

  #[test]
  fn delay_saturates() {
    let strat = Strategy::Exponential { init_min: Milliseconds(1),
                                        init_max: Milliseconds(2) };

    assert_eq!(strat.delay(Milliseconds(u64::MAX / 2), Attempts(10)),
               Milliseconds(u64::MAX));
    assert_eq!(strat.delay(Milliseconds(1u64), Attempts(u16::MAX)),
               Milliseconds(u64::MAX));
  }

  #[test]
  fn linear_max_time() {
    let strat = Strategy::Delay { min: Milliseconds(100),
                                  max: Milliseconds(200) };

    assert_eq!(strat.max_time(Attempts(4)), Milliseconds(1_000u64));
  }
}
