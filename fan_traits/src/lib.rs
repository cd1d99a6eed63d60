pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type crossing the capability boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The three signals sampled each cycle.
///
/// Analog readings are raw converter counts; callers clamp them to their
/// configured range.
pub trait InputSource {
    fn read_light(&mut self) -> Result<u16, BoxError>;
    fn read_dial(&mut self) -> Result<u16, BoxError>;
    fn read_button(&mut self) -> Result<bool, BoxError>;
}

/// Positional actuator (the fan servo).
pub trait ActuatorSink {
    fn move_to(&mut self, position: u8) -> Result<(), BoxError>;
}

/// Byte-addressed non-volatile storage with limited write endurance.
pub trait PersistentStore {
    fn read(&mut self, address: u16) -> Result<u8, BoxError>;
    fn write(&mut self, address: u16, byte: u8) -> Result<(), BoxError>;

    /// Write `byte` only if the cell holds a different value.
    ///
    /// Returns whether a physical write happened.
    fn update(&mut self, address: u16, byte: u8) -> Result<bool, BoxError> {
        if self.read(address)? == byte {
            return Ok(false);
        }
        self.write(address, byte)?;
        Ok(true)
    }
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn read_light(&mut self) -> Result<u16, BoxError> {
        (**self).read_light()
    }
    fn read_dial(&mut self) -> Result<u16, BoxError> {
        (**self).read_dial()
    }
    fn read_button(&mut self) -> Result<bool, BoxError> {
        (**self).read_button()
    }
}

impl<T: ActuatorSink + ?Sized> ActuatorSink for Box<T> {
    fn move_to(&mut self, position: u8) -> Result<(), BoxError> {
        (**self).move_to(position)
    }
}

impl<T: PersistentStore + ?Sized> PersistentStore for Box<T> {
    fn read(&mut self, address: u16) -> Result<u8, BoxError> {
        (**self).read(address)
    }
    fn write(&mut self, address: u16, byte: u8) -> Result<(), BoxError> {
        (**self).write(address, byte)
    }
    fn update(&mut self, address: u16, byte: u8) -> Result<bool, BoxError> {
        (**self).update(address, byte)
    }
}
