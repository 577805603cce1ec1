use embedded_time::rate::Fraction;

/// [`Socket`](crate::net::Socket) implementation for [`std::net::UdpSocket`]
pub mod net;

/// Implement [`embedded_time::Clock`] using [`std::time`] primitives
///
/// The clock's epoch is the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct Clock(::std::time::Instant);

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock {
  /// Create a new clock
  pub fn new() -> Self {
    Self(::std::time::Instant::now())
  }
}

impl embedded_time::Clock for Clock {
  type T = u64;

  // microseconds
  const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

  fn try_now(&self) -> Result<embedded_time::Instant<Self>, embedded_time::clock::Error> {
    let elapsed = ::std::time::Instant::now().duration_since(self.0);
    u64::try_from(elapsed.as_micros()).map(embedded_time::Instant::new)
                                      .map_err(|_| embedded_time::clock::Error::Unspecified)
  }
}
