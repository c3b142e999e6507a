//! Coil energization patterns for full- and half-stepping.

use crate::config::{MotorConfig, NUM_PHASE_PINS};
use crate::error::BuildError;

/// Cyclic table of phase bit masks over the four coil drive lines.
///
/// Full stepping energizes one coil per phase (4 entries); half stepping
/// interleaves blended two-coil patterns between them (8 entries). Advancing
/// through the table in index order produces clockwise motion.
#[derive(Debug, Clone)]
pub struct PhaseSequence {
    masks: [u32; 2 * NUM_PHASE_PINS],
    len: usize,
    clear_mask: u32,
}

impl PhaseSequence {
    /// Build the table from the configured pins, validating that they fit a
    /// 32-bit output bank and do not collide.
    pub fn from_config(cfg: &MotorConfig) -> std::result::Result<Self, BuildError> {
        let mut pins = cfg.phase_pins;
        if cfg.reversed {
            pins.reverse();
        }

        for (i, pin) in pins.iter().enumerate() {
            if *pin >= 32 {
                return Err(BuildError::InvalidConfig(
                    "phase pins must be output lines 0..=31",
                ));
            }
            if pins[..i].contains(pin) {
                return Err(BuildError::InvalidConfig("phase pins must be distinct"));
            }
        }

        let bp = |i: usize| 1u32 << pins[i];
        let clear_mask = bp(0) | bp(1) | bp(2) | bp(3);

        let mut masks = [0u32; 2 * NUM_PHASE_PINS];
        let len = if cfg.half_stepping {
            for i in 0..NUM_PHASE_PINS {
                masks[2 * i] = bp(i);
                masks[2 * i + 1] = bp(i) | bp((i + 1) % NUM_PHASE_PINS);
            }
            2 * NUM_PHASE_PINS
        } else {
            for i in 0..NUM_PHASE_PINS {
                masks[i] = bp(i);
            }
            NUM_PHASE_PINS
        };

        Ok(Self {
            masks,
            len,
            clear_mask,
        })
    }

    /// Number of phases in the cycle (4 or 8).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bit mask for the given phase index. `phase` must be `< len()`.
    #[inline]
    pub fn mask(&self, phase: usize) -> u32 {
        debug_assert!(phase < self.len);
        self.masks[phase]
    }

    /// Mask covering every phase pin, used to de-energize the motor.
    #[inline]
    pub fn clear_mask(&self) -> u32 {
        self.clear_mask
    }

    /// Phase index whose mask equals `mask`, if any. Used by the simulated
    /// mechanism to decode motion from emitted patterns.
    pub fn position_of(&self, mask: u32) -> Option<usize> {
        self.masks[..self.len].iter().position(|&m| m == mask)
    }
}
