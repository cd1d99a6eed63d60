use std::{
    fs,
    io::{self, Write},
    path::Path,
};

/// Replace `path` with `bytes` via a synced sibling file and a rename.
///
/// A failed attempt removes the staged sibling; `path` keeps its old contents.
pub fn write_image(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let staged = path.with_extension("staged");
    let result = stage(&staged, bytes).and_then(|()| fs::rename(&staged, path));
    if result.is_err() && staged.is_file() {
        let _ = fs::remove_file(&staged);
    }
    result
}

fn stage(staged: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = fs::File::create(staged)?;
    f.write_all(bytes)?;
    f.sync_all()
}

/// Persist `image` with one cell changed, then apply the change in memory.
///
/// The in-memory image is only touched once the file holds the new byte, so
/// a failed write leaves memory and disk in agreement.
pub fn commit_cell(path: &Path, image: &mut [u8], cell: usize, byte: u8) -> io::Result<()> {
    let mut next = image.to_vec();
    let Some(slot) = next.get_mut(cell) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cell {cell} outside image of {} bytes", image.len()),
        ));
    };
    *slot = byte;
    write_image(path, &next)?;
    image.copy_from_slice(&next);
    Ok(())
}
