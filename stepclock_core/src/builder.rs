//! Fluent construction of a validated `MotionController`.

use std::sync::Arc;

use stepclock_traits::{Clock, DigitalInput, MonotonicClock, PhaseOutputs};

use crate::config::{CalibrateCfg, MotorConfig, StepGeometry};
use crate::controller::MotionController;
use crate::driver::PhaseDriver;
use crate::error::Result;
use crate::phase::PhaseSequence;

/// Builder for `MotionController`. The three hardware capabilities are
/// mandatory and taken up front; configuration and clock are optional with
/// defaults. All config validation happens in `build()`.
pub struct MotionControllerBuilder<O, H, B>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    outputs: O,
    home_sensor: H,
    button: B,
    config: Option<MotorConfig>,
    calibrate: Option<CalibrateCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl<O, H, B> MotionControllerBuilder<O, H, B>
where
    O: PhaseOutputs,
    H: DigitalInput,
    B: DigitalInput,
{
    pub fn new(outputs: O, home_sensor: H, button: B) -> Self {
        Self {
            outputs,
            home_sensor,
            button,
            config: None,
            calibrate: None,
            clock: None,
        }
    }

    pub fn with_config(mut self, config: MotorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_calibrate(mut self, calibrate: CalibrateCfg) -> Self {
        self.calibrate = Some(calibrate);
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock` when not set.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and assemble the controller.
    pub fn build(self) -> Result<MotionController<O, H, B>> {
        let config = self.config.unwrap_or_default();
        let calibrate = self.calibrate.unwrap_or_default();

        let geometry = StepGeometry::from_config(&config)?;
        let sequence = PhaseSequence::from_config(&config)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        let driver = PhaseDriver::new(
            self.outputs,
            sequence,
            geometry.rapid_delay_us,
            Arc::clone(&clock),
        );

        Ok(MotionController::from_parts(
            driver,
            self.home_sensor,
            self.button,
            geometry,
            config.home_normally_open,
            calibrate,
            clock,
        ))
    }
}
