use std::error::Error;

// Use rppal in production
#[cfg(not(test))]
use rppal::gpio::{Gpio, InputPin, Level};

#[cfg(test)]
// This is only used in testing, not compiled in release.
use crate::mocks::mock_gpio::{Gpio, InputPin, Level};

use tracing::debug;

use crate::config::GPIO_MARK_BUTTON;

/// The physical "mark reference" push button.
///
/// Wired between the pin and ground with the internal pull-up enabled, so
/// a pressed button reads Low.
pub struct MarkButton {
    pin: InputPin,
    held: bool,
}

impl MarkButton {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_pin(GPIO_MARK_BUTTON)
    }

    pub fn with_pin(pin: u8) -> Result<Self, Box<dyn Error>> {
        let gpio = Gpio::new()?;
        let pin = gpio.get(pin)?.into_input_pullup();

        let held = pin.read() == Level::Low;
        Ok(Self { pin, held })
    }

    pub fn is_pressed(&self) -> bool {
        self.pin.read() == Level::Low
    }

    /// True once per press, on the released-to-pressed edge.
    ///
    /// Holding the button down does not repeat, and a button already held
    /// when this was created has to be released first.
    pub fn poll_press(&mut self) -> bool {
        let pressed = self.is_pressed();
        let edge = pressed && !self.held;
        self.held = pressed;

        if edge {
            debug!("mark button pressed");
        }
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::mock_gpio;

    const PIN: u8 = GPIO_MARK_BUTTON;

    #[test]
    fn test_starts_released() -> Result<(), Box<dyn Error>> {
        mock_gpio::reset();

        let mut button = MarkButton::new()?;
        assert!(!button.is_pressed());
        assert!(!button.poll_press());

        Ok(())
    }

    #[test]
    fn test_one_event_per_press() -> Result<(), Box<dyn Error>> {
        mock_gpio::reset();
        let mut button = MarkButton::new()?;

        mock_gpio::press(PIN);
        assert!(button.poll_press());
        // still held
        assert!(!button.poll_press());
        assert!(!button.poll_press());

        mock_gpio::release(PIN);
        assert!(!button.poll_press());

        mock_gpio::press(PIN);
        assert!(button.poll_press());

        Ok(())
    }

    #[test]
    fn test_held_at_startup_needs_release() -> Result<(), Box<dyn Error>> {
        mock_gpio::reset();
        mock_gpio::press(PIN);

        let mut button = MarkButton::new()?;
        assert!(button.is_pressed());
        assert!(!button.poll_press());

        mock_gpio::release(PIN);
        assert!(!button.poll_press());

        mock_gpio::press(PIN);
        assert!(button.poll_press());

        Ok(())
    }
}
