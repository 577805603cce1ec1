use embedded_time::duration::Milliseconds;

use crate::retry::{Attempts, Strategy};
use crate::time::Millis;

/// Configuration options related to outbound CON messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Con {
  /// Retry strategy for CON messages that
  /// have not yet been ACKed.
  ///
  /// Defaults to an exponential retry strategy, with an initial
  /// timeout between `ACK_TIMEOUT` and `ACK_TIMEOUT * ACK_RANDOM_FACTOR`:
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::config::Con;
  /// use newt::retry::Strategy;
  ///
  /// assert_eq!(Con::default().retry_strategy,
  ///            Strategy::Exponential { init_min: Milliseconds(2_000),
  ///                                    init_max: Milliseconds(3_000) });
  /// ```
  pub retry_strategy: Strategy,
  /// Number of times we are allowed to resend a CON message
  /// before giving up on it.
  ///
  /// Defaults to 4 retransmissions.
  /// ```
  /// use newt::config::Con;
  /// use newt::retry::Attempts;
  ///
  /// assert_eq!(Con::default().max_retransmit, Attempts(4));
  /// ```
  pub max_retransmit: Attempts,
}

impl Default for Con {
  fn default() -> Self {
    Con { retry_strategy: Strategy::Exponential { init_min: Milliseconds(2_000),
                                                  init_max: Milliseconds(3_000) },
          max_retransmit: Attempts(4) }
  }
}

/// Configuration options related to notifying observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Observe {
  /// Number of NON notifications an observer may be sent in a row
  /// before one is sent as CON, to check that they are still listening.
  ///
  /// Never more than 15.
  ///
  /// ```
  /// use newt::config::Observe;
  ///
  /// assert_eq!(Observe::default().max_non, 5);
  /// ```
  pub max_non: u8,
  /// Number of CON notifications an observer may leave unacknowledged
  /// before they are forgotten.
  ///
  /// Never more than 3.
  ///
  /// ```
  /// use newt::config::Observe;
  ///
  /// assert_eq!(Observe::default().max_fail, 3);
  /// ```
  pub max_fail: u8,
}

impl Observe {
  /// The largest `max_non` that subscriptions can count to
  pub const MAX_NON_LIMIT: u8 = 15;

  /// The largest `max_fail` that subscriptions can count to
  pub const MAX_FAIL_LIMIT: u8 = 3;

  /// Clamp `max_non` and `max_fail` to their limits
  ///
  /// ```
  /// use newt::config::Observe;
  ///
  /// let obs = Observe { max_non: 200,
  ///                     max_fail: 200 }.clamped();
  /// assert_eq!(obs, Observe { max_non: 15,
  ///                           max_fail: 3 });
  /// ```
  pub fn clamped(self) -> Self {
    Observe { max_non: self.max_non.min(Self::MAX_NON_LIMIT),
              max_fail: self.max_fail.min(Self::MAX_FAIL_LIMIT) }
  }
}

impl Default for Observe {
  fn default() -> Self {
    Observe { max_non: 5,
              max_fail: 3 }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Con`]
  pub con: Con,
  /// See [`Observe`]
  pub observe: Observe,
  /// The largest message we will build, in bytes.
  ///
  /// Defaults to 1152, the largest message that fits in
  /// an IPv6 datagram without fragmentation.
  ///
  /// ```
  /// use newt::config::Config;
  ///
  /// assert_eq!(Config::default().max_pdu_size, 1152);
  /// ```
  pub max_pdu_size: usize,
  /// The largest Block2 size exponent we will respond with;
  /// blocks are `2 ^ (max_block_szx + 4)` bytes.
  ///
  /// Defaults to 6 (1024 byte blocks)
  ///
  /// ```
  /// use newt::config::Config;
  ///
  /// assert_eq!(Config::default().max_block_szx, 6);
  /// ```
  pub max_block_szx: u8,
  /// How often resources are checked for changes
  /// that observers should be notified of.
  ///
  /// Defaults to 2 seconds.
  ///
  /// ```
  /// use embedded_time::duration::Milliseconds;
  /// use newt::config::Config;
  ///
  /// assert_eq!(Config::default().resource_check_interval,
  ///            Milliseconds(2_000u64));
  /// ```
  pub resource_check_interval: Millis,
  /// The first message [`Id`](newt_msg::Id) we will send.
  ///
  /// The default value is 0, although it is
  /// best practice to set this to something random.
  ///
  /// ```
  /// use newt::config::Config;
  ///
  /// assert_eq!(Config::default().msg_id_seed, 0);
  /// ```
  pub msg_id_seed: u16,
}

impl Default for Config {
  fn default() -> Self {
    Config { con: Con::default(),
             observe: Observe::default(),
             max_pdu_size: 1152,
             max_block_szx: 6,
             resource_check_interval: Milliseconds(2_000),
             msg_id_seed: 0 }
  }
}
