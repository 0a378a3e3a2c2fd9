//! Deterministic pseudo-random number generator used by the combat engine.
//!
//! Every roll the engine makes comes from a single instance of this
//! generator, so a turn resolved twice from the same seed and the same
//! galaxy state produces byte-identical reports. The generator keeps a
//! 32-bit state and combines a multiply-with-carry style congruential
//! step with a xorshift step each draw.

/// Seed used when the host supplies zero. A zero state would be a fixed
/// point of the update function, so it is never allowed to occur.
pub const DEFAULT_SEED: u32 = 1_924_085_713;

/// The engine-wide dice generator.
///
/// [`CombatRng::roll`] maps the low sixteen bits of the state onto
/// `1..=max`, so callers subtract one when they need a zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatRng {
    state: u32,
}

impl CombatRng {
    /// Creates a generator from a host-supplied seed and burns the
    /// customary warm-up draws so that adjacent seeds do not start
    /// with correlated sequences.
    pub fn new(seed: u32) -> Self {
        let mut rng = CombatRng {
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        };
        let _ = rng.roll(100) + rng.roll(200) + rng.roll(300);
        rng
    }

    /// Advances the state one draw. The congruential half multiplies by
    /// 16417 via shift-adds; the xorshift half folds the high bits back
    /// down. Both halves are combined with xor.
    fn step(&mut self) {
        let s = self.state;
        let cong = s.wrapping_add(s << 5).wrapping_add(s << 14);
        let mut shift = s ^ (s >> 15);
        shift ^= shift << 17;
        self.state = cong ^ shift;
    }

    /// Rolls a die with `max` faces, returning a value in `1..=max`.
    ///
    /// `roll(0)` returns 1: the state still advances, so call sites do
    /// not have to special-case empty ranges when burning a draw.
    pub fn roll(&mut self, max: u32) -> u32 {
        self.step();
        ((u64::from(self.state & 0xFFFF) * u64::from(max)) >> 16) as u32 + 1
    }

    /// Current raw state, exposed for diagnostics and tests.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for CombatRng {
    fn default() -> Self {
        CombatRng::new(DEFAULT_SEED)
    }
}
