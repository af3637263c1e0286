use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks a completion-webhook signature: hex-encoded HMAC-SHA256 of the raw
/// request body under the shared webhook secret.
pub fn verify_signature(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = encode_hex(mac.finalize().into_bytes().as_slice());

    let provided = signature_hex.trim().to_ascii_lowercase();
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (left, right)| acc | (left ^ right))
        == 0
}

pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    encode_hex(mac.finalize().into_bytes().as_slice())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{sign_payload, verify_signature};

    const SECRET: &str = "webhook-test-secret";

    #[test]
    fn signature_round_trips() {
        let payload = br#"{"envelopeId":"env-1","status":"signed"}"#;
        let signature = sign_payload(SECRET, payload);
        assert!(verify_signature(SECRET, payload, &signature));
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let payload = b"payload";
        let signature = sign_payload(SECRET, payload).to_ascii_uppercase();
        assert!(verify_signature(SECRET, payload, &signature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signature = sign_payload(SECRET, b"original");
        assert!(!verify_signature(SECRET, b"tampered", &signature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signature = sign_payload("other-secret", b"payload");
        assert!(!verify_signature(SECRET, b"payload", &signature));
    }

    #[test]
    fn malformed_signatures_are_rejected() {
        assert!(!verify_signature(SECRET, b"payload", ""));
        assert!(!verify_signature(SECRET, b"payload", "not-hex"));
    }
}
