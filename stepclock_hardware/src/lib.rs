//! GPIO-backed and simulated implementations of the motion traits.
//!
//! The `hardware` feature gates everything that touches `rppal`; the default
//! build carries only the simulated bank and input so the rest of the
//! workspace compiles and tests on any host.
pub mod error;

use std::cell::Cell;
use std::rc::Rc;

use stepclock_traits::{DigitalInput, PhaseOutputs};

/// Simulated phase output bank. Tracks which lines are currently energized
/// and logs transitions at trace level.
#[derive(Debug, Default)]
pub struct SimulatedBank {
    lines: u32,
}

impl SimulatedBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently energized lines as a bit mask.
    pub fn lines(&self) -> u32 {
        self.lines
    }
}

impl PhaseOutputs for SimulatedBank {
    fn energize(&mut self, mask: u32) {
        self.lines |= mask;
        tracing::trace!(mask = format_args!("{mask:#034b}"), "energize (simulated)");
    }

    fn clear(&mut self, mask: u32) {
        self.lines &= !mask;
        tracing::trace!(mask = format_args!("{mask:#034b}"), "clear (simulated)");
    }
}

/// Simulated digital input with an externally settable level.
#[derive(Debug, Clone)]
pub struct SimulatedInput {
    level: Rc<Cell<bool>>,
}

impl SimulatedInput {
    pub fn new(level: bool) -> Self {
        Self {
            level: Rc::new(Cell::new(level)),
        }
    }

    pub fn set_level(&self, level: bool) {
        self.level.set(level);
    }
}

impl DigitalInput for SimulatedInput {
    fn is_high(&mut self) -> bool {
        self.level.get()
    }
}

#[cfg(feature = "hardware")]
pub use gpio::{GpioBank, GpioInput};

#[cfg(feature = "hardware")]
mod gpio {
    use rppal::gpio::{Gpio, InputPin, OutputPin};

    use stepclock_traits::{DigitalInput, PhaseOutputs};

    use crate::error::{HwError, Result};

    /// Phase output bank over real GPIO lines. Each claimed line answers to
    /// bit `1 << bcm_line` of the masks the driver emits.
    pub struct GpioBank {
        pins: Vec<(u8, OutputPin)>,
    }

    impl GpioBank {
        /// Claim the given BCM lines as outputs, initially low.
        pub fn new(lines: &[u8]) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let mut pins = Vec::with_capacity(lines.len());
            for &line in lines {
                if line >= 32 {
                    return Err(HwError::BadPhasePin(line));
                }
                let pin = gpio
                    .get(line)
                    .map_err(|e| HwError::Gpio(format!("claim line {line}: {e}")))?
                    .into_output_low();
                pins.push((line, pin));
            }
            Ok(Self { pins })
        }
    }

    impl PhaseOutputs for GpioBank {
        fn energize(&mut self, mask: u32) {
            for (line, pin) in &mut self.pins {
                if mask & (1u32 << *line) != 0 {
                    pin.set_high();
                }
            }
        }

        fn clear(&mut self, mask: u32) {
            for (line, pin) in &mut self.pins {
                if mask & (1u32 << *line) != 0 {
                    pin.set_low();
                }
            }
        }
    }

    /// Digital input over a real GPIO line with the internal pull-up
    /// enabled, so an open switch reads high and a closed-to-ground switch
    /// reads low.
    pub struct GpioInput {
        pin: InputPin,
    }

    impl GpioInput {
        pub fn new(line: u8) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let pin = gpio
                .get(line)
                .map_err(|e| HwError::Gpio(format!("claim line {line}: {e}")))?
                .into_input_pullup();
            Ok(Self { pin })
        }
    }

    impl DigitalInput for GpioInput {
        fn is_high(&mut self) -> bool {
            self.pin.is_high()
        }
    }
}
