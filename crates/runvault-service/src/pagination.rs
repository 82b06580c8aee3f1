//! Adaptive batch sizing for filtered list scans.
//!
//! A list call cannot know up front how many physical rows it must scan
//! to fill one page: a selective filter may discard almost everything.
//! The batcher projects the next fetch size from the yield of the
//! previous round so low-selectivity filters converge on the ceiling in
//! a handful of rounds instead of crawling.

/// Decides how many physical rows each scan round should fetch.
#[derive(Debug)]
pub struct Batcher {
  requested: usize,
  min: usize,
  max: usize,
  next: usize,
}

impl Batcher {
  /// Create a batcher for a page of `requested` records, with server
  /// floor `min` and ceiling `max` on any single fetch.
  pub fn new(requested: usize, min: usize, max: usize) -> Self {
    Self {
      requested,
      min,
      max,
      next: requested.clamp(min, max),
    }
  }

  /// How many rows the upcoming round should fetch.
  pub fn next(&self) -> usize {
    self.next
  }

  /// Record that the previous round fetched `fetched` rows of which
  /// `produced` passed the filter, and project the next fetch size:
  /// `clamp(ceil(requested / yield_ratio), min, max)`. An empty round
  /// counts as full yield so the size does not run away, and a round
  /// with zero yield jumps straight to the ceiling.
  pub fn update(&mut self, produced: usize, fetched: usize) {
    let ratio = if fetched == 0 {
      1.0
    } else {
      produced as f64 / fetched as f64
    };
    self.next = if ratio <= 0.0 {
      self.max
    } else {
      let projected = (self.requested as f64 / ratio).ceil() as usize;
      projected.clamp(self.min, self.max)
    };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Round {
    // What we expect from this call to next().
    want: usize,
    // Simulated number of surviving rows to feed into update().
    produced: usize,
  }

  fn run(requested: usize, rounds: &[Round]) {
    let mut batcher = Batcher::new(requested, 10, 1000);
    for (i, round) in rounds.iter().enumerate() {
      let got = batcher.next();
      assert_eq!(got, round.want, "round {i}");
      batcher.update(round.produced, got);
    }
  }

  #[test]
  fn low_yield_doubles_then_saturates_at_max() {
    run(
      100,
      &[
        Round { want: 100, produced: 50 },
        Round { want: 200, produced: 10 },
        Round { want: 1000, produced: 10 },
        Round { want: 1000, produced: 0 },
      ],
    );
  }

  #[test]
  fn moderate_yield_grows_proportionally() {
    run(
      100,
      &[
        Round { want: 100, produced: 80 },
        Round { want: 125, produced: 20 },
        Round { want: 625, produced: 0 },
      ],
    );
  }

  #[test]
  fn tiny_pages_stay_on_the_floor() {
    run(
      1,
      &[
        Round { want: 10, produced: 5 },
        Round { want: 10, produced: 1 },
        Round { want: 10, produced: 0 },
      ],
    );
  }

  #[test]
  fn zero_yield_jumps_to_max() {
    let mut batcher = Batcher::new(100, 10, 1000);
    batcher.update(0, 100);
    assert_eq!(batcher.next(), 1000);
  }

  #[test]
  fn empty_round_counts_as_full_yield() {
    let mut batcher = Batcher::new(100, 10, 1000);
    batcher.update(0, 0);
    assert_eq!(batcher.next(), 100);
  }

  #[test]
  fn requested_above_max_is_capped() {
    let batcher = Batcher::new(5000, 10, 1000);
    assert_eq!(batcher.next(), 1000);
  }
}
