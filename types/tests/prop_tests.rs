use proptest::prelude::*;

use attest_types::{
    CaptureOutcome, Coordinates, FaceImage, LocationFix, NetworkIdentity, ProofToken,
    SessionRecord,
};

fn location_fix() -> impl Strategy<Value = LocationFix> {
    prop_oneof![
        Just(LocationFix::Unavailable),
        (-90.0f64..90.0, -180.0f64..180.0)
            .prop_map(|(lat, lng)| LocationFix::Resolved(Coordinates::new(lat, lng))),
    ]
}

fn independent_outcomes() -> impl Strategy<Value = Vec<CaptureOutcome>> {
    (
        location_fix(),
        "[A-Za-z0-9 ]{0,16}",
        "([0-9A-F]{2}:){5}[0-9A-F]{2}",
        prop::collection::vec(any::<u8>(), 1..64),
        "[A-Za-z0-9+/]{4,24}",
    )
        .prop_map(|(fix, ssid, mac, face, token)| {
            vec![
                CaptureOutcome::Location(fix),
                CaptureOutcome::Network(NetworkIdentity::new(ssid, mac)),
                CaptureOutcome::Face(FaceImage::from_png(&face)),
                CaptureOutcome::Biometric(ProofToken::new(token)),
            ]
        })
}

proptest! {
    /// Independent captures commute: any interleaving yields the field-wise union.
    #[test]
    fn capture_order_does_not_matter(
        (outcomes, shuffled) in independent_outcomes()
            .prop_flat_map(|o| (Just(o.clone()), Just(o).prop_shuffle()))
    ) {
        let mut in_order = SessionRecord::check_in("CS101");
        for outcome in outcomes.clone() {
            in_order.apply(outcome);
        }

        let mut interleaved = SessionRecord::check_in("CS101");
        for outcome in shuffled {
            interleaved.apply(outcome);
        }

        prop_assert_eq!(&in_order, &interleaved);

        for outcome in outcomes {
            match outcome {
                CaptureOutcome::Location(fix) => prop_assert_eq!(interleaved.location(), fix),
                CaptureOutcome::Network(id) => prop_assert_eq!(interleaved.network_identity(), &id),
                CaptureOutcome::Face(img) => prop_assert_eq!(interleaved.face_image(), Some(&img)),
                CaptureOutcome::Biometric(p) => prop_assert_eq!(interleaved.biometric_proof(), Some(&p)),
            }
        }
    }

    /// A retake keeps only the latest still.
    #[test]
    fn second_capture_wins(
        first in prop::collection::vec(any::<u8>(), 1..64),
        second in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut record = SessionRecord::check_in("CS101");
        record.apply(CaptureOutcome::Face(FaceImage::from_png(&first)));
        record.apply(CaptureOutcome::Face(FaceImage::from_png(&second)));
        prop_assert_eq!(record.face_image().unwrap().to_png().unwrap(), second);
    }
}
