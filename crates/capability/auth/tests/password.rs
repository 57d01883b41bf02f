use parking_auth::{hash_password, verify_password};

#[test]
fn argon2_hash_verifies() {
    let hash = hash_password("admin123").expect("hash");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "admin123").expect("check"));
}

#[test]
fn wrong_password_rejected() {
    let hash = hash_password("admin123").expect("hash");
    assert!(!verify_password(&hash, "bad").expect("check"));
}

#[test]
fn unparseable_hash_is_error() {
    assert!(verify_password("plaintext", "plaintext").is_err());
}
