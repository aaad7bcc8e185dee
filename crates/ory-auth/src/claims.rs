//! Identity token payload decoding
//!
//! The id_token is split into its three JWT segments and the payload is
//! base64url-decoded as JSON. The signature is NOT verified: claims are for
//! display only and must never drive an authorization decision.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::outcome::BestEffort;

/// Claim set shown when the id_token could not be decoded
pub const UNDECODABLE_PLACEHOLDER: &str = "could not decode id_token";

/// Decode the payload segment of a JWT-shaped identity token.
pub fn decode_id_token(id_token: &str) -> Result<Value> {
    let segments: Vec<&str> = id_token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(Error::IdentityToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let bytes = URL_SAFE
        .decode(repad(payload))
        .map_err(|e| Error::IdentityToken(format!("payload is not base64url: {e}")))?;
    let claims: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::IdentityToken(format!("payload is not JSON: {e}")))?;

    if !claims.is_object() {
        return Err(Error::IdentityToken("payload is not a JSON object".into()));
    }
    Ok(claims)
}

/// Decode the id_token if one was issued. Never fails the flow.
pub fn identity_claims(id_token: Option<&str>) -> BestEffort<Value> {
    match id_token {
        Some(token) => BestEffort::from_result(decode_id_token(token)),
        None => BestEffort::Absent,
    }
}

/// Claim set to render: the decoded claims, `{}` when no id_token was
/// issued, or a placeholder note when decoding failed.
pub fn claims_for_display(claims: &BestEffort<Value>) -> Value {
    match claims {
        BestEffort::Value(value) => value.clone(),
        BestEffort::Absent => Value::Object(serde_json::Map::new()),
        BestEffort::Degraded { .. } => serde_json::json!({ "note": UNDECODABLE_PLACEHOLDER }),
    }
}

/// Pad a base64 segment with `=` up to a multiple of 4 characters.
fn repad(segment: &str) -> String {
    let missing = (4 - segment.len() % 4) % 4;
    let mut padded = String::with_capacity(segment.len() + missing);
    padded.push_str(segment);
    padded.extend(std::iter::repeat_n('=', missing));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn jwt_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_claims_byte_for_byte() {
        let raw = r#"{"sub":"user-1","iss":"https://example.ory.sh"}"#;
        let claims = decode_id_token(&jwt_with_payload(raw)).unwrap();
        assert_eq!(serde_json::to_string(&claims).unwrap(), raw);
    }

    #[test]
    fn nested_claims_round_trip() {
        let original = serde_json::json!({
            "sub": "user-1",
            "ext": { "traits": { "email": "a@example.com", "tags": ["x", "y"] } },
            "amr": ["pwd"],
            "iat": 1_700_000_000,
        });
        let token = jwt_with_payload(&serde_json::to_string(&original).unwrap());
        assert_eq!(decode_id_token(&token).unwrap(), original);
    }

    #[test]
    fn payload_lengths_needing_each_padding_decode() {
        // Payload lengths 23..26 bytes need 1, 0, 2 and 1 padding characters
        for filler in ["", "a", "ab", "abc"] {
            let raw = format!(r#"{{"sub":"user-1","x":"{filler}"}}"#);
            let claims = decode_id_token(&jwt_with_payload(&raw)).unwrap();
            assert_eq!(claims["x"], filler);
        }
    }

    #[test]
    fn url_safe_alphabet_is_accepted() {
        // "??>" encodes to "Pz8-" in base64url
        let raw = r#"{"q":"??>"}"#;
        let token = jwt_with_payload(raw);
        assert!(token.contains("Pz8-"), "token: {token}");
        assert_eq!(decode_id_token(&token).unwrap()["q"], "??>");
    }

    #[test]
    fn wrong_segment_count_is_rejected() {
        assert!(matches!(decode_id_token("abc"), Err(Error::IdentityToken(_))));
        assert!(matches!(decode_id_token("a.b"), Err(Error::IdentityToken(_))));
        assert!(matches!(decode_id_token("a.b.c.d"), Err(Error::IdentityToken(_))));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(decode_id_token("h.!!!notbase64!!!.s").is_err());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(decode_id_token(&jwt_with_payload("[1,2,3]")).is_err());
        assert!(decode_id_token(&jwt_with_payload("not json")).is_err());
    }

    #[test]
    fn missing_id_token_is_absent() {
        let outcome = identity_claims(None);
        assert_eq!(outcome, BestEffort::Absent);
        assert_eq!(claims_for_display(&outcome), serde_json::json!({}));
    }

    #[test]
    fn undecodable_id_token_degrades_to_placeholder() {
        let outcome = identity_claims(Some("garbage"));
        assert!(outcome.is_degraded());
        assert_eq!(
            claims_for_display(&outcome),
            serde_json::json!({ "note": "could not decode id_token" })
        );
    }

    #[test]
    fn repad_fills_to_multiple_of_four() {
        assert_eq!(repad("abcd"), "abcd");
        assert_eq!(repad("abc"), "abc=");
        assert_eq!(repad("ab"), "ab==");
        assert_eq!(repad("abcde"), "abcde===");
    }
}
