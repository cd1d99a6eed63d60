//! Two-byte big-endian threshold codec over a byte store.
use eyre::WrapErr;
use fan_traits::PersistentStore;

use crate::error::{FanError, Result};
use crate::hw_error::{Origin, map_hw_error};

fn low_address(address: u16) -> Result<u16> {
    address.checked_add(1).ok_or_else(|| {
        eyre::Report::new(FanError::Store(format!(
            "threshold address {address} leaves no room for the low byte"
        )))
    })
}

/// Read the stored threshold (high byte at `address`, low byte at `address + 1`).
pub fn load_threshold<P: PersistentStore + ?Sized>(store: &mut P, address: u16) -> Result<u16> {
    let low_addr = low_address(address)?;
    let hi = store
        .read(address)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Store)))
        .wrap_err("reading threshold high byte")?;
    let lo = store
        .read(low_addr)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Store)))
        .wrap_err("reading threshold low byte")?;
    Ok(u16::from_be_bytes([hi, lo]))
}

/// Persist `value`, touching only bytes that changed.
///
/// Returns the number of physical byte writes (0..=2).
pub fn save_threshold<P: PersistentStore + ?Sized>(
    store: &mut P,
    address: u16,
    value: u16,
) -> Result<u8> {
    let low_addr = low_address(address)?;
    let [hi, lo] = value.to_be_bytes();
    let mut written = 0u8;
    for (addr, byte) in [(address, hi), (low_addr, lo)] {
        if store
            .update(addr, byte)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e, Origin::Store)))
            .wrap_err_with(|| format!("writing threshold byte at {addr}"))?
        {
            written += 1;
        }
    }
    Ok(written)
}
