use proptest::prelude::*;

use attest_types::{FaceImage, NetworkIdentity, ProofToken, SessionRecord};
use attest_validation::{is_valid_mac, validate, RuleId, RuleSet, ValidationContext};

fn octets() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 6)
}

fn check_in_with_mac(mac: &str) -> SessionRecord {
    let mut record = SessionRecord::check_in("CS101");
    record.set_face_image(FaceImage::from_png(b"png"));
    record.set_biometric_proof(ProofToken::verified());
    record.set_network_identity(NetworkIdentity::new("CollegeWiFi", mac));
    record
}

proptest! {
    /// Any six octets rendered as colon-hex pass, in either case.
    #[test]
    fn colon_hex_macs_pass(bytes in octets(), lower in any::<bool>()) {
        let mac = bytes
            .iter()
            .map(|b| if lower { format!("{b:02x}") } else { format!("{b:02X}") })
            .collect::<Vec<_>>()
            .join(":");
        prop_assert!(is_valid_mac(&mac));
    }

    /// Other separators or a missing octet fail.
    #[test]
    fn malformed_macs_fail(bytes in octets(), sep in "[-. ]?", drop_last in any::<bool>()) {
        let parts: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
        let parts = if drop_last { &parts[..5] } else { &parts[..] };
        let mac = parts.join(&sep);
        prop_assert!(!is_valid_mac(&mac));
    }

    /// Arbitrary strings that are not colon-hex are reported by the MAC rule
    /// and never get past validation.
    #[test]
    fn invalid_mac_blocks_submission(mac in "[^:]{1,20}") {
        let record = check_in_with_mac(&mac);
        let err = validate(&record, &RuleSet::default(), &ValidationContext::at(10, 0)).unwrap_err();
        prop_assert!(matches!(err.rule, RuleId::MacPresent | RuleId::MacFormat));
    }
}
