use fan_hardware::{ERASED, FileStore};
use fan_hardware::error::HwError;
use fan_traits::PersistentStore;
use tempfile::tempdir;

#[test]
fn fresh_image_reads_erased() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("eeprom.bin"), 64).expect("open");
    assert_eq!(store.read(0).unwrap(), ERASED);
    assert_eq!(store.read(63).unwrap(), ERASED);
    assert_eq!(std::fs::read(store.path()).unwrap().len(), 64);
}

#[test]
fn bytes_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eeprom.bin");
    {
        let mut store = FileStore::open(&path, 16).unwrap();
        store.write(0, 0x03).unwrap();
        store.write(1, 0x84).unwrap();
        assert_eq!(store.writes(), 2);
    }
    let mut store = FileStore::open(&path, 16).unwrap();
    assert_eq!(store.read(0).unwrap(), 0x03);
    assert_eq!(store.read(1).unwrap(), 0x84);
}

#[test]
fn update_skips_unchanged_bytes() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("eeprom.bin"), 16).unwrap();
    assert!(store.update(4, 7).unwrap());
    assert!(!store.update(4, 7).unwrap());
    assert_eq!(store.writes(), 1);
}

#[test]
fn out_of_range_address_is_an_error() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path().join("eeprom.bin"), 8).unwrap();
    let err = store.read(8).expect_err("address past end");
    match err.downcast_ref::<HwError>() {
        Some(HwError::StoreAddress { address: 8, size: 8 }) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn failed_write_is_retried_by_next_update() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eeprom.bin");
    let mut store = FileStore::open(&path, 16).unwrap();

    // A directory on the staging path makes the physical write fail.
    let blocker = path.with_extension("staged");
    std::fs::create_dir(&blocker).unwrap();
    assert!(store.update(0, 0x03).is_err());
    assert_eq!(store.read(0).unwrap(), ERASED);
    assert_eq!(store.writes(), 0);

    std::fs::remove_dir(&blocker).unwrap();
    assert!(store.update(0, 0x03).unwrap(), "update must write again");
    assert_eq!(store.writes(), 1);
    assert_eq!(std::fs::read(&path).unwrap()[0], 0x03);

    let mut reopened = FileStore::open(&path, 16).unwrap();
    assert_eq!(reopened.read(0).unwrap(), 0x03);
}

#[test]
fn oversized_image_is_truncated_to_configured_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eeprom.bin");
    let mut bytes = vec![ERASED; 32];
    bytes[0] = 0x01;
    bytes[20] = 0x55;
    std::fs::write(&path, &bytes).unwrap();

    let mut store = FileStore::open(&path, 16).unwrap();
    assert_eq!(store.read(0).unwrap(), 0x01);
    assert!(store.read(20).is_err());
    assert_eq!(std::fs::read(&path).unwrap().len(), 16);
}
