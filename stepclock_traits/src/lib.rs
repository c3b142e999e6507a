pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Bank of phase output lines addressed by bit masks.
///
/// Bit `i` of a mask corresponds to physical output line `i` (GPIO index on
/// real hardware). Implementations perform a bulk set/clear of every line
/// named in the mask; lines outside the mask are left untouched.
pub trait PhaseOutputs {
    /// Drive every line in `mask` high.
    fn energize(&mut self, mask: u32);
    /// Drive every line in `mask` low.
    fn clear(&mut self, mask: u32);
}

/// Single binary input line (home sensor, pushbutton, abort switch).
///
/// Returns the raw electrical level; polarity handling (normally-open vs
/// normally-closed wiring) is the caller's concern.
pub trait DigitalInput {
    fn is_high(&mut self) -> bool;
}

impl<T: PhaseOutputs + ?Sized> PhaseOutputs for Box<T> {
    fn energize(&mut self, mask: u32) {
        (**self).energize(mask)
    }
    fn clear(&mut self, mask: u32) {
        (**self).clear(mask)
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_high(&mut self) -> bool {
        (**self).is_high()
    }
}
