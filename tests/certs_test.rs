//! Unit tests for the certificate provider
//!
//! Tests for generation, on-disk layout, and reuse idempotence.

use nodeboot::certs;
use nodeboot::config::{CERT_FILE, KEY_FILE};

#[test]
fn test_generate_writes_both_files() {
    let dir = tempfile::tempdir().unwrap();

    let material = certs::ensure(dir.path()).unwrap();

    assert!(dir.path().join(KEY_FILE).exists());
    assert!(dir.path().join(CERT_FILE).exists());
    assert!(material
        .cert_pem
        .starts_with("-----BEGIN CERTIFICATE-----"));
    assert!(material.key_pem.contains("PRIVATE KEY"));

    let on_disk = std::fs::read_to_string(dir.path().join(CERT_FILE)).unwrap();
    assert_eq!(on_disk, material.cert_pem);
}

#[test]
fn test_reuse_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    let first = certs::ensure(dir.path()).unwrap();
    let second = certs::ensure(dir.path()).unwrap();

    // Second call must reuse, not regenerate
    assert_eq!(first.cert_pem, second.cert_pem);
    assert_eq!(first.key_pem, second.key_pem);
}

#[test]
fn test_preexisting_files_are_returned_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(KEY_FILE), "sentinel-key").unwrap();
    std::fs::write(dir.path().join(CERT_FILE), "sentinel-cert").unwrap();

    let material = certs::ensure(dir.path()).unwrap();

    assert_eq!(material.key_pem, "sentinel-key");
    assert_eq!(material.cert_pem, "sentinel-cert");
}

#[test]
fn test_single_missing_file_triggers_regeneration_of_both() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(KEY_FILE), "orphan-key").unwrap();

    let material = certs::ensure(dir.path()).unwrap();

    // Both files generated together; the orphan key is replaced
    assert_ne!(material.key_pem, "orphan-key");
    assert!(dir.path().join(CERT_FILE).exists());
}
