//! Snapshot durability across reopen

use crate::common::*;

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.snap");

    {
        let custody = Custody::builder()
            .variant(Variant::PerAccount)
            .path(&path)
            .open()
            .unwrap();
        custody.create("creator").unwrap();
        custody.opt_in("alice").unwrap();
        custody.item_in_cart("alice").unwrap();
        custody.item_dropped("alice").unwrap();
    }

    let custody = Custody::builder()
        .variant(Variant::PerAccount)
        .path(&path)
        .open()
        .unwrap();
    assert!(custody.is_created().unwrap());
    assert!(custody.is_registered("alice").unwrap());
    assert_eq!(custody.record_for("alice").unwrap(), record(3, false));
    custody.item_delivered("alice").unwrap();
}

#[test]
fn rejected_invocation_leaves_snapshot_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.snap");

    let custody = Custody::open(&path).unwrap();
    custody.create("creator").unwrap();
    custody.item_dropped("a").unwrap();
    let before = std::fs::read(&path).unwrap();

    assert!(custody.item_dropped("a").is_err());
    assert!(custody.update_application("creator").is_err());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn failed_snapshot_write_rejects_the_whole_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.snap");

    let custody = Custody::open(&path).unwrap();
    custody.create("creator").unwrap();
    let before = std::fs::read(&path).unwrap();

    std::fs::create_dir(path.with_extension("tmp")).unwrap();
    let err = custody.item_dropped("courier").unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert!(!err.is_rejection());
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(1, false));
    assert_eq!(std::fs::read(&path).unwrap(), before);

    // Resubmitting once the disk recovers applies the transition exactly once
    std::fs::remove_dir(path.with_extension("tmp")).unwrap();
    assert_eq!(custody.item_dropped("courier").unwrap(), record(2, false));
    drop(custody);

    let custody = Custody::open(&path).unwrap();
    assert_eq!(custody.record(&Scope::Global).unwrap(), record(2, false));
}

#[test]
fn reopen_with_other_variant_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.snap");

    let custody = Custody::open(&path).unwrap();
    custody.create("creator").unwrap();
    drop(custody);

    let err = Custody::builder()
        .variant(Variant::PerAccount)
        .path(&path)
        .open()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn corrupt_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.snap");
    {
        let custody = Custody::open(&path).unwrap();
        custody.create("creator").unwrap();
    }

    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    assert!(Custody::open(&path).is_err());
}

#[test]
fn config_file_selects_durability() {
    let dir = tempfile::tempdir().unwrap();
    let snap = dir.path().join("state.snap");
    let config_path = dir.path().join("custody.toml");
    std::fs::write(
        &config_path,
        format!(
            "variant = \"global\"\ndurability = \"snapshot\"\npath = {:?}\n",
            snap.display().to_string()
        ),
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert_eq!(config.durability, DurabilityMode::Snapshot);

    let custody = Custody::builder().config(config).open().unwrap();
    custody.create("creator").unwrap();
    assert!(snap.exists());
}
