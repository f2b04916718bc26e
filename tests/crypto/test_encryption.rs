//! Message cipher round trips over derived keys

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::rngs::OsRng;

use etherchat_core::{
    ascii_to_bytes32, decrypt_message, derive_shared_secret, encrypt_message, ALGORITHM_ID,
};

fn raw_public_key(secret: &SecretKey) -> [u8; 64] {
    let point = secret.public_key().to_encoded_point(false);
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&point.as_bytes()[1..]);
    raw
}

#[test]
fn test_round_trip_between_two_parties() {
    let alice = SecretKey::random(&mut OsRng);
    let bob = SecretKey::random(&mut OsRng);
    let plaintext = b"meet me at block 19,000,000";

    // Alice encrypts under her derivation of the shared key.
    let alice_key = derive_shared_secret(alice.to_bytes().as_slice(), &raw_public_key(&bob)).unwrap();
    let envelope = encrypt_message(plaintext, &alice_key).unwrap();

    // Bob derives his side and recovers the plaintext exactly.
    let bob_key = derive_shared_secret(bob.to_bytes().as_slice(), &raw_public_key(&alice)).unwrap();
    let decrypted = decrypt_message(&envelope, &bob_key).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_round_trip_arbitrary_bytes() {
    let key = [42u8; 32];
    let payloads: [&[u8]; 3] = [b"", b"a", &[0u8, 255, 1, 254, 2]];

    for payload in payloads {
        let envelope = encrypt_message(payload, &key).unwrap();
        assert_eq!(decrypt_message(&envelope, &key).unwrap(), payload);
    }
}

#[test]
fn test_eavesdropper_key_fails() {
    let alice = SecretKey::random(&mut OsRng);
    let bob = SecretKey::random(&mut OsRng);
    let eve = SecretKey::random(&mut OsRng);

    let alice_key = derive_shared_secret(alice.to_bytes().as_slice(), &raw_public_key(&bob)).unwrap();
    let envelope = encrypt_message(b"secret", &alice_key).unwrap();

    let eve_key = derive_shared_secret(eve.to_bytes().as_slice(), &raw_public_key(&alice)).unwrap();
    assert!(decrypt_message(&envelope, &eve_key).is_err());
}

#[test]
fn test_algorithm_id_fits_its_on_chain_slot() {
    assert!(ascii_to_bytes32(ALGORITHM_ID).is_ok());
}
