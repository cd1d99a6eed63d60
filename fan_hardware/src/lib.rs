mod atomic;
pub mod error;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod pi;

use fan_traits::{ActuatorSink, BoxError, InputSource, PersistentStore};
use std::path::{Path, PathBuf};

use crate::error::HwError;

/// Erased EEPROM cells read back as all ones.
pub const ERASED: u8 = 0xFF;

/// Simulated light sensor, dial and button.
///
/// Analog levels are fixed; the button is held for `hold_cycles` button reads
/// starting at read number `press_at`.
#[derive(Debug, Clone)]
pub struct SimulatedInputs {
    light: u16,
    dial: u16,
    press_at: Option<u64>,
    hold_cycles: u64,
    reads: u64,
}

impl Default for SimulatedInputs {
    fn default() -> Self {
        Self::new(512, 0)
    }
}

impl SimulatedInputs {
    pub fn new(light: u16, dial: u16) -> Self {
        Self {
            light,
            dial,
            press_at: None,
            hold_cycles: 3,
            reads: 0,
        }
    }

    /// Schedule one button press starting at the given cycle.
    pub fn with_press_at(mut self, cycle: u64) -> Self {
        self.press_at = Some(cycle);
        self
    }

    pub fn with_hold_cycles(mut self, cycles: u64) -> Self {
        self.hold_cycles = cycles.max(1);
        self
    }

    pub fn set_light(&mut self, light: u16) {
        self.light = light;
    }

    pub fn set_dial(&mut self, dial: u16) {
        self.dial = dial;
    }
}

impl InputSource for SimulatedInputs {
    fn read_light(&mut self) -> Result<u16, BoxError> {
        Ok(self.light)
    }

    fn read_dial(&mut self) -> Result<u16, BoxError> {
        Ok(self.dial)
    }

    fn read_button(&mut self) -> Result<bool, BoxError> {
        let n = self.reads;
        self.reads = self.reads.saturating_add(1);
        let pressed = self
            .press_at
            .is_some_and(|at| n >= at && n < at.saturating_add(self.hold_cycles));
        if pressed {
            tracing::trace!(cycle = n, "simulated button held");
        }
        Ok(pressed)
    }
}

/// Simulated servo that only records what it was told.
#[derive(Debug, Default)]
pub struct SimulatedServo {
    position: Option<u8>,
    moves: u64,
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<u8> {
        self.position
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl ActuatorSink for SimulatedServo {
    fn move_to(&mut self, position: u8) -> Result<(), BoxError> {
        if position > 180 {
            return Err(Box::new(HwError::ServoAngle(position)));
        }
        self.position = Some(position);
        self.moves = self.moves.saturating_add(1);
        tracing::debug!(position, moves = self.moves, "servo moved (simulated)");
        Ok(())
    }
}

/// Byte store backed by an image file, standing in for EEPROM on hosts.
///
/// Every physical write replaces the whole image atomically. The cached image
/// only changes after the file holds the new byte.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    image: Vec<u8>,
    writes: u64,
}

impl FileStore {
    /// Open (or create) an image of `size` bytes. Missing or short files are
    /// padded with erased cells; longer files are truncated with a warning.
    pub fn open(path: impl AsRef<Path>, size: u16) -> error::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut image = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(HwError::Io(e)),
        };
        let fresh = image.len() != usize::from(size);
        if image.len() > usize::from(size) {
            tracing::warn!(
                path = %path.display(),
                found = image.len(),
                size,
                "store image larger than configured size; truncating"
            );
        }
        image.resize(usize::from(size), ERASED);
        if fresh {
            atomic::write_image(&path, &image)?;
            tracing::info!(path = %path.display(), size, "initialized store image");
        }
        Ok(Self {
            path,
            image,
            writes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Physical writes issued since open.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn index(&self, address: u16) -> error::Result<usize> {
        let idx = usize::from(address);
        if idx >= self.image.len() {
            return Err(HwError::StoreAddress {
                address,
                size: u16::try_from(self.image.len()).unwrap_or(u16::MAX),
            });
        }
        Ok(idx)
    }
}

impl PersistentStore for FileStore {
    fn read(&mut self, address: u16) -> Result<u8, BoxError> {
        let idx = self.index(address)?;
        Ok(self.image.get(idx).copied().unwrap_or(ERASED))
    }

    fn write(&mut self, address: u16, byte: u8) -> Result<(), BoxError> {
        let idx = self.index(address)?;
        atomic::commit_cell(&self.path, &mut self.image, idx, byte).map_err(HwError::Io)?;
        self.writes = self.writes.saturating_add(1);
        tracing::trace!(address, byte, "store byte written");
        Ok(())
    }
}
