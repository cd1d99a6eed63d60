//! Test and helper mocks for fan_core.
//!
//! Each mock is a cheap shared handle: clone it, hand one copy to the
//! controller and keep the other to script or inspect from the test.

use std::sync::{Arc, Mutex, MutexGuard};

use fan_traits::{ActuatorSink, BoxError, InputSource, PersistentStore};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct StoreState {
    bytes: Vec<u8>,
    writes: u64,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory byte store, initially erased (`0xFF`).
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new(size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                bytes: vec![0xFF; size],
                writes: 0,
                fail_reads: false,
                fail_writes: false,
            })),
        }
    }

    /// A store with `value` already saved big-endian at `address`.
    pub fn with_threshold(size: usize, address: u16, value: u16) -> Self {
        let store = Self::new(size);
        {
            let mut s = lock(&store.state);
            let at = usize::from(address);
            let [hi, lo] = value.to_be_bytes();
            if let Some(cells) = s.bytes.get_mut(at..at + 2) {
                cells.copy_from_slice(&[hi, lo]);
            }
        }
        store
    }

    pub fn bytes(&self) -> Vec<u8> {
        lock(&self.state).bytes.clone()
    }

    /// Physical writes so far.
    pub fn writes(&self) -> u64 {
        lock(&self.state).writes
    }

    pub fn set_fail_reads(&self, fail: bool) {
        lock(&self.state).fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        lock(&self.state).fail_writes = fail;
    }
}

impl PersistentStore for MemoryStore {
    fn read(&mut self, address: u16) -> Result<u8, BoxError> {
        let s = lock(&self.state);
        if s.fail_reads {
            return Err(Box::new(std::io::Error::other("store read failed")));
        }
        s.bytes
            .get(usize::from(address))
            .copied()
            .ok_or_else(|| format!("address {address} out of range").into())
    }

    fn write(&mut self, address: u16, byte: u8) -> Result<(), BoxError> {
        let mut s = lock(&self.state);
        if s.fail_writes {
            return Err(Box::new(std::io::Error::other("store write failed")));
        }
        let cell = s
            .bytes
            .get_mut(usize::from(address))
            .ok_or_else(|| -> BoxError { format!("address {address} out of range").into() })?;
        *cell = byte;
        s.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    frames: Vec<(u16, u16, bool)>,
    cursor: Option<usize>,
    fail_next: bool,
    cycles: u64,
}

impl ScriptState {
    fn current(&self) -> Result<(u16, u16, bool), BoxError> {
        self.cursor
            .and_then(|i| self.frames.get(i).copied())
            .ok_or_else(|| "script exhausted or not started".into())
    }
}

/// Inputs replayed from a script of `(light, dial, button)` frames.
///
/// `read_light` starts a new frame; the dial and button reads return the same
/// frame. The last frame repeats once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInputs {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedInputs {
    pub fn new(frames: impl IntoIterator<Item = (u16, u16, bool)>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                frames: frames.into_iter().collect(),
                ..ScriptState::default()
            })),
        }
    }

    /// One frame repeated forever.
    pub fn constant(light: u16, dial: u16, button: bool) -> Self {
        Self::new([(light, dial, button)])
    }

    pub fn push(&self, light: u16, dial: u16, button: bool) {
        lock(&self.state).frames.push((light, dial, button));
    }

    /// Make the next light read fail without consuming a frame.
    pub fn fail_next(&self) {
        lock(&self.state).fail_next = true;
    }

    /// Frames started so far.
    pub fn cycles(&self) -> u64 {
        lock(&self.state).cycles
    }
}

impl InputSource for ScriptedInputs {
    fn read_light(&mut self) -> Result<u16, BoxError> {
        let mut s = lock(&self.state);
        if s.fail_next {
            s.fail_next = false;
            return Err(Box::new(std::io::Error::other("light sensor unavailable")));
        }
        let last = s.frames.len().checked_sub(1).ok_or("empty script")?;
        s.cursor = Some(s.cursor.map_or(0, |i| (i + 1).min(last)));
        s.cycles += 1;
        Ok(s.current()?.0)
    }

    fn read_dial(&mut self) -> Result<u16, BoxError> {
        Ok(lock(&self.state).current()?.1)
    }

    fn read_button(&mut self) -> Result<bool, BoxError> {
        Ok(lock(&self.state).current()?.2)
    }
}

#[derive(Debug, Default)]
struct ActuatorState {
    moves: Vec<u8>,
    fail_next: bool,
}

/// Actuator that records every accepted position.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    state: Arc<Mutex<ActuatorState>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> Vec<u8> {
        lock(&self.state).moves.clone()
    }

    pub fn last(&self) -> Option<u8> {
        lock(&self.state).moves.last().copied()
    }

    /// Reject the next move.
    pub fn fail_next(&self) {
        lock(&self.state).fail_next = true;
    }
}

impl ActuatorSink for RecordingActuator {
    fn move_to(&mut self, position: u8) -> Result<(), BoxError> {
        let mut s = lock(&self.state);
        if s.fail_next {
            s.fail_next = false;
            return Err(Box::new(std::io::Error::other("servo not responding")));
        }
        s.moves.push(position);
        Ok(())
    }
}
