use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use super::*;

fn segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn make_token(claims: &Value) -> String {
    format!(
        "{}.{}.{}",
        segment(br#"{"alg":"HS256","typ":"JWT"}"#),
        segment(claims.to_string().as_bytes()),
        segment(b"signature-bytes")
    )
}

// =============================================================================
// is_valid_token
// =============================================================================

#[test]
fn valid_three_segment_token_passes() {
    let token = make_token(&serde_json::json!({"sub": "u1"}));
    assert!(is_valid_token(&token));
}

#[test]
fn wrong_segment_count_fails() {
    assert!(!is_valid_token(""));
    assert!(!is_valid_token("abc"));
    assert!(!is_valid_token("abc.def"));
    assert!(!is_valid_token("abc.def.ghi.jkl"));
}

#[test]
fn non_base64_segment_fails() {
    let good = segment(b"{}");
    assert!(!is_valid_token(&format!("{good}.{good}.!!!")));
    assert!(!is_valid_token(&format!("?{good}.{good}.{good}")));
}

#[test]
fn structural_check_does_not_require_json() {
    let token = format!("{}.{}.{}", segment(b"x"), segment(b"not json"), segment(b"y"));
    assert!(is_valid_token(&token));
}

// =============================================================================
// decode_payload
// =============================================================================

#[test]
fn decode_reads_standard_claims() {
    let token = make_token(&serde_json::json!({
        "sub": "u-42",
        "email": "ann@example.com",
        "name": "Ann",
        "roles": ["USER"],
        "iat": 1_700_000_000,
        "exp": 1_702_592_000,
        "tenant": "acme"
    }));
    let payload = decode_payload(&token).unwrap();
    assert_eq!(payload.sub.as_deref(), Some("u-42"));
    assert_eq!(payload.email.as_deref(), Some("ann@example.com"));
    assert_eq!(payload.name.as_deref(), Some("Ann"));
    assert_eq!(payload.roles, vec![Role::User]);
    assert_eq!(payload.iat, Some(1_700_000_000));
    assert_eq!(payload.exp, Some(1_702_592_000));
    assert_eq!(payload.extra.get("tenant"), Some(&Value::from("acme")));
}

#[test]
fn decode_accepts_padded_standard_alphabet() {
    let claims = serde_json::json!({"sub": "u1", "roles": ["ADMIN"]});
    let token = format!("{}.{}.{}", segment(b"h"), STANDARD.encode(claims.to_string()), segment(b"s"));
    assert_eq!(decode_payload(&token).unwrap().roles, vec![Role::Admin]);
}

#[test]
fn decode_rejects_segment_count() {
    let err = decode_payload("only.two").unwrap_err();
    assert!(matches!(err, MalformedToken::SegmentCount(2)));
}

#[test]
fn decode_rejects_bad_base64() {
    let err = decode_payload("aGVhZA.*not-base64*.c2ln").unwrap_err();
    assert!(matches!(err, MalformedToken::Base64(_)));
}

#[test]
fn decode_rejects_non_json_payload() {
    let token = format!("{}.{}.{}", segment(b"h"), segment(b"not json"), segment(b"s"));
    assert!(matches!(decode_payload(&token).unwrap_err(), MalformedToken::Json(_)));
}

#[test]
fn decode_rejects_non_object_json() {
    let token = format!("{}.{}.{}", segment(b"h"), segment(b"[1,2,3]"), segment(b"s"));
    assert!(matches!(decode_payload(&token).unwrap_err(), MalformedToken::Json(_)));
}

#[test]
fn decode_drops_unknown_roles_and_tolerates_non_array() {
    let mixed = make_token(&serde_json::json!({"roles": ["ADMIN", "AUDITOR", 7, "USER"]}));
    assert_eq!(decode_payload(&mixed).unwrap().roles, vec![Role::Admin, Role::User]);

    let scalar = make_token(&serde_json::json!({"roles": "ADMIN"}));
    assert!(decode_payload(&scalar).unwrap().roles.is_empty());

    let null = make_token(&serde_json::json!({"roles": null}));
    assert!(decode_payload(&null).unwrap().roles.is_empty());
}

// =============================================================================
// roles_of / has_required_roles
// =============================================================================

#[test]
fn roles_of_returns_admin_claim() {
    let token = make_token(&serde_json::json!({"roles": ["ADMIN"]}));
    assert_eq!(roles_of(&token), vec![Role::Admin]);
}

#[test]
fn roles_of_malformed_is_empty() {
    for token in ["", "a.b", "a.b.c.d", "aGVhZA.%%%.c2ln"] {
        assert!(roles_of(token).is_empty(), "expected no roles for {token:?}");
    }
}

#[test]
fn roles_survive_loosely_typed_claims() {
    let shapes = [
        serde_json::json!({"sub": 42, "roles": ["ADMIN"]}),
        serde_json::json!({"sub": "u1", "exp": 1_700_000_000.75, "roles": ["ADMIN"]}),
        serde_json::json!({"email": 7, "name": null, "roles": ["ADMIN"]}),
        serde_json::json!({"iat": "yesterday", "exp": {"at": 1}, "name": ["x"], "roles": ["ADMIN"]}),
    ];
    for claims in shapes {
        assert_eq!(roles_of(&make_token(&claims)), vec![Role::Admin], "claims {claims}");
    }
}

#[test]
fn loosely_typed_claims_are_normalized() {
    let token = make_token(&serde_json::json!({
        "sub": 42,
        "email": true,
        "name": {"first": "Ann"},
        "exp": 1_700_000_000.9,
        "iat": "soon"
    }));
    let payload = decode_payload(&token).unwrap();
    assert_eq!(payload.sub.as_deref(), Some("42"));
    assert_eq!(payload.email.as_deref(), Some("true"));
    assert_eq!(payload.name, None);
    assert_eq!(payload.exp, Some(1_700_000_000));
    assert_eq!(payload.iat, None);
    assert_eq!(payload.to_user_session().id, "42");
}

#[test]
fn has_required_roles_matrix() {
    let admin = make_token(&serde_json::json!({"roles": ["ADMIN"]}));
    let plain = make_token(&serde_json::json!({"sub": "u1"}));

    assert!(has_required_roles(None, &[]));
    assert!(!has_required_roles(None, &[Role::User]));
    assert!(has_required_roles(Some(&admin), &[Role::Admin]));
    assert!(has_required_roles(Some(&admin), &[Role::User, Role::Admin]));
    assert!(!has_required_roles(Some(&plain), &[Role::User]));
    assert!(!has_required_roles(Some("garbage"), &[Role::Admin]));
}

// =============================================================================
// to_user_session
// =============================================================================

#[test]
fn user_projection_defaults_roles_to_user() {
    let payload = TokenPayload { sub: Some("u1".into()), email: Some("a@b.c".into()), ..TokenPayload::default() };
    let user = payload.to_user_session();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email, "a@b.c");
    assert_eq!(user.name, "");
    assert_eq!(user.roles, vec![Role::User]);
}

#[test]
fn user_projection_keeps_claimed_roles() {
    let payload = TokenPayload { roles: vec![Role::Admin], ..TokenPayload::default() };
    assert_eq!(payload.to_user_session().roles, vec![Role::Admin]);
}
