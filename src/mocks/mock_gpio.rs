// Stand-in for rppal::gpio, only compiled during tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Low,
    High,
}

thread_local! {
    static MOCK_PINS: RefCell<HashMap<u8, Level>> = RefCell::new(HashMap::new());
}

pub struct Gpio;

impl Gpio {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Ok(Gpio)
    }

    pub fn get(&self, pin: u8) -> Result<Pin, Box<dyn Error>> {
        Ok(Pin { pin })
    }
}

pub struct Pin {
    pin: u8,
}

impl Pin {
    /// Pull-up: an untouched pin reads High.
    pub fn into_input_pullup(self) -> InputPin {
        MOCK_PINS.with(|pins| {
            pins.borrow_mut().entry(self.pin).or_insert(Level::High);
        });
        InputPin { pin: self.pin }
    }
}

pub struct InputPin {
    pin: u8,
}

impl InputPin {
    pub fn read(&self) -> Level {
        MOCK_PINS.with(|pins| pins.borrow().get(&self.pin).copied().unwrap_or(Level::High))
    }
}

pub fn set_level(pin: u8, level: Level) {
    MOCK_PINS.with(|pins| {
        pins.borrow_mut().insert(pin, level);
    });
}

/// Simulate a finger on the button.
pub fn press(pin: u8) {
    set_level(pin, Level::Low);
}

pub fn release(pin: u8) {
    set_level(pin, Level::High);
}

pub fn reset() {
    MOCK_PINS.with(|pins| pins.borrow_mut().clear());
}
