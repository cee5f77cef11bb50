//! Integration tests for the vault ledger and the XOR placeholder driver.

use std::fs;

use plugvault::crypto::{encode_key_metadata, Key, Symmetric};
use plugvault::driver::{CipherDriver, XorDriver, NONCE_PREFIX_LEN};
use plugvault::errors::VaultError;
use plugvault::vault::VaultLedger;
use tempfile::TempDir;

/// Helper: a fresh ledger rooted in its own temp dir.
fn ledger() -> (TempDir, VaultLedger) {
    let dir = TempDir::new().expect("create temp dir");
    let ledger = VaultLedger::new(&dir.path().join("vault")).expect("create ledger");
    (dir, ledger)
}

// ---------------------------------------------------------------------------
// Symmetric encrypt / decrypt
// ---------------------------------------------------------------------------

#[test]
fn secret_payload_round_trips_with_128_bit_key() {
    let (_dir, ledger) = ledger();
    let key = Key::<Symmetric>::generate(128).unwrap();
    assert_eq!(key.len(), 16);

    let sealed = ledger
        .encrypt_symmetric(&XorDriver, b"secret payload", &key)
        .unwrap();
    assert_eq!(sealed.ciphertext.len(), NONCE_PREFIX_LEN + 14);
    assert_ne!(&sealed.ciphertext[NONCE_PREFIX_LEN..], b"secret payload");

    let nonce = sealed.nonce.as_deref().expect("xor driver prefixes a nonce");
    assert_eq!(nonce, &sealed.ciphertext[..NONCE_PREFIX_LEN]);

    let plain = ledger
        .decrypt_symmetric(&XorDriver, &sealed.ciphertext, &key)
        .unwrap();
    assert_eq!(plain.as_slice(), b"secret payload");
}

#[test]
fn each_encryption_uses_a_fresh_nonce() {
    let (_dir, ledger) = ledger();
    let key = Key::<Symmetric>::generate(256).unwrap();

    let a = ledger.encrypt_symmetric(&XorDriver, b"same", &key).unwrap();
    let b = ledger.encrypt_symmetric(&XorDriver, b"same", &key).unwrap();
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn wrong_key_does_not_recover_plaintext() {
    let (_dir, ledger) = ledger();
    let key = Key::<Symmetric>::import_from_passphrase(b"right", 256).unwrap();
    let other = Key::<Symmetric>::import_from_passphrase(b"wrong", 256).unwrap();

    let sealed = ledger
        .encrypt_symmetric(&XorDriver, b"attack at dawn", &key)
        .unwrap();
    let plain = ledger
        .decrypt_symmetric(&XorDriver, &sealed.ciphertext, &other)
        .unwrap();
    assert_ne!(plain.as_slice(), b"attack at dawn");
}

#[test]
fn truncated_ciphertext_is_rejected() {
    let (_dir, ledger) = ledger();
    let key = Key::<Symmetric>::generate(128).unwrap();
    assert!(matches!(
        ledger.decrypt_symmetric(&XorDriver, &[0u8; 5], &key),
        Err(VaultError::InvalidArgument(_))
    ));
}

#[test]
fn metadata_and_byte_keys_are_interchangeable() {
    let key = Key::<Symmetric>::generate(128).unwrap();
    let metadata = encode_key_metadata(key.raw());

    let by_metadata = XorDriver
        .encrypt_with_metadata(b"interop", &metadata)
        .unwrap();
    assert_eq!(XorDriver.decrypt(&by_metadata, key.raw()).unwrap(), b"interop");

    let by_bytes = XorDriver.encrypt(b"interop", key.raw()).unwrap();
    assert_eq!(
        XorDriver.decrypt_with_metadata(&by_bytes, &metadata).unwrap(),
        b"interop"
    );
}

// ---------------------------------------------------------------------------
// Files and entries
// ---------------------------------------------------------------------------

#[test]
fn encrypt_file_then_decrypt_entry() {
    let (dir, mut ledger) = ledger();
    let input = dir.path().join("report.txt");
    fs::write(&input, b"quarterly numbers").unwrap();
    let key = Key::<Symmetric>::generate(256).unwrap();

    let entry = ledger.encrypt_file(&XorDriver, &input, &key).unwrap().clone();
    assert_eq!(entry.algorithm, "xor-placeholder");
    assert!(entry.stored_path.starts_with(ledger.storage_directory()));
    assert_eq!(
        entry.stored_path.file_name().unwrap().to_string_lossy(),
        "report.txt.vault"
    );
    assert_eq!(entry.nonce.len(), NONCE_PREFIX_LEN);

    // The original is left alone.
    assert_eq!(fs::read(&input).unwrap(), b"quarterly numbers");

    let plain = ledger.decrypt_entry(&XorDriver, 0, &key).unwrap();
    assert_eq!(plain.as_slice(), b"quarterly numbers");
}

#[test]
fn every_entry_keeps_its_own_artifact() {
    let (dir, mut ledger) = ledger();
    let key = Key::<Symmetric>::generate(128).unwrap();

    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    fs::write(a.join("notes.txt"), b"contents of A").unwrap();
    fs::write(b.join("notes.txt"), b"contents of B").unwrap();

    ledger.encrypt_file(&XorDriver, &a.join("notes.txt"), &key).unwrap();
    ledger.encrypt_file(&XorDriver, &b.join("notes.txt"), &key).unwrap();

    // Re-encrypting the same path appends a third entry with its own artifact.
    fs::write(a.join("notes.txt"), b"A, edited").unwrap();
    ledger.encrypt_file(&XorDriver, &a.join("notes.txt"), &key).unwrap();

    let entries = ledger.entries();
    assert_eq!(entries.len(), 3);
    assert_ne!(entries[0].stored_path, entries[1].stored_path);
    assert_ne!(entries[0].stored_path, entries[2].stored_path);
    assert_ne!(entries[1].stored_path, entries[2].stored_path);

    let expected: [&[u8]; 3] = [b"contents of A", b"contents of B", b"A, edited"];
    for (index, want) in expected.iter().enumerate() {
        let plain = ledger.decrypt_entry(&XorDriver, index, &key).unwrap();
        assert_eq!(plain.as_slice(), *want, "entry {index}");
    }
}

#[test]
fn existing_files_in_storage_are_not_overwritten() {
    let (dir, mut ledger) = ledger();
    let key = Key::<Symmetric>::generate(128).unwrap();

    let squatter = ledger.storage_directory().join("report.txt.vault");
    fs::write(&squatter, b"someone else's artifact").unwrap();

    let input = dir.path().join("report.txt");
    fs::write(&input, b"fresh").unwrap();
    let entry = ledger.encrypt_file(&XorDriver, &input, &key).unwrap().clone();

    assert_ne!(entry.stored_path, squatter);
    assert_eq!(fs::read(&squatter).unwrap(), b"someone else's artifact");
}

#[test]
fn encrypt_missing_file_records_nothing() {
    let (dir, mut ledger) = ledger();
    let key = Key::<Symmetric>::generate(128).unwrap();

    let result = ledger.encrypt_file(&XorDriver, &dir.path().join("missing"), &key);
    assert!(matches!(result, Err(VaultError::Io { .. })));
    assert!(ledger.entries().is_empty());
}

#[test]
fn entry_lookup_is_bounds_checked() {
    let (_dir, ledger) = ledger();
    assert!(matches!(ledger.entry(0), Err(VaultError::EntryNotFound(1))));
}
