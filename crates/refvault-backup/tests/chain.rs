//! End-to-end behaviour of the backup chain on a real directory.

use std::fs;

use refvault_backup::{BackupConfig, BackupError, BackupStore};
use refvault_store::{Reference, ReferenceStore};

fn config(dir: &tempfile::TempDir) -> BackupConfig {
    BackupConfig::new("refs.json").with_base_dir(dir.path()).with_depth(3)
}

#[tokio::test]
async fn create_then_four_writes_shift_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let backup = BackupStore::new(config(&dir));
    let paths = backup.paths().unwrap();

    let mut store = backup.create().await.unwrap();
    let created = fs::read_to_string(&paths.primary).unwrap();
    assert_eq!(fs::read_to_string(&paths.latest).unwrap(), created);
    for generation in &paths.generations {
        assert!(!generation.exists(), "{} should not exist yet", generation.display());
    }

    let mut snapshots = Vec::new();
    for i in 1..=4 {
        store.add_ref(Reference::new(format!("r{i}"), "note")).unwrap();
        backup.write(&store).await.unwrap();
        snapshots.push(fs::read_to_string(&paths.latest).unwrap());
        assert_eq!(fs::read_to_string(&paths.primary).unwrap(), snapshots[i - 1]);
    }

    let read_gen = |i: usize| fs::read_to_string(&paths.generations[i]).unwrap();
    assert_eq!(read_gen(0), snapshots[2]);
    assert_eq!(read_gen(1), snapshots[1]);
    assert_eq!(read_gen(2), snapshots[0]);
    assert!((0..3).all(|i| read_gen(i) != created));
}

#[tokio::test]
async fn write_before_create_leaves_directory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let backup = BackupStore::new(config(&dir));

    let err = backup.write(&ReferenceStore::new()).await.unwrap_err();

    assert!(matches!(err, BackupError::MissingBackupChain { .. }));
    assert!(!backup.paths().unwrap().primary.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn session_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let backup = BackupStore::new(config(&dir));
    backup.create().await.unwrap();

    let mut store = backup.read().await.unwrap();
    store
        .add_ref(Reference::new("a", "note").with_field("body", "first"))
        .unwrap();
    store.add_ref(Reference::new("b", "task")).unwrap();
    store.push_warning("checked by hand", Some(vec!["b".into()]));
    backup.write(&store).await.unwrap();

    let reloaded = backup.read().await.unwrap();
    assert_eq!(reloaded.references().collect::<Vec<_>>(), store.references().collect::<Vec<_>>());
    assert_eq!(reloaded.messages(), store.messages());

    let slots = backup.generations().await.unwrap();
    assert_eq!(slots.iter().filter(|slot| slot.exists).count(), 1);
}

#[tokio::test]
async fn create_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let backup = BackupStore::new(config(&dir));
    backup.create().await.unwrap();

    let err = backup.create().await.unwrap_err();
    assert!(matches!(err, BackupError::AlreadyExists { .. }));
}

#[tokio::test]
async fn read_ignores_corrupt_latest_backup() {
    let dir = tempfile::tempdir().unwrap();
    let backup = BackupStore::new(config(&dir));
    let mut store = backup.create().await.unwrap();
    store.add_ref(Reference::new("a", "note")).unwrap();
    backup.write(&store).await.unwrap();

    fs::write(&backup.paths().unwrap().latest, [0xff, 0xfe, 0x00]).unwrap();

    let reloaded = backup.read().await.unwrap();
    assert!(reloaded.get_ref("a").is_some());
    assert!(reloaded.messages().is_empty());
}
