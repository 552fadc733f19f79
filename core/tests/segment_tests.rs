use proptest::prelude::*;
use srcmap::codec::segment::{decode, decode_segment, encode};
use srcmap::errors::MappingError;
use srcmap::{DeltaState, OriginalLocation, Segment, TableBounds};

fn roomy() -> TableBounds {
    TableBounds::new(100, 100)
}

#[test]
fn encodes_deltas_against_previous_values() {
    let mut state = DeltaState {
        generated_column: 10,
        source: 1,
        original_line: 5,
        original_column: 8,
        name: 3,
    };
    let token = encode(&Segment::mapped(12, 1, 4, 8).with_name(4), &mut state);
    assert_eq!(token, "EADAC");
    assert_eq!(state.original_line, 4);
    assert_eq!(state.name, 4);
}

#[test]
fn unmapped_segment_leaves_source_state_alone() {
    let mut state = DeltaState {
        source: 2,
        original_line: 7,
        ..DeltaState::default()
    };
    let token = encode(&Segment::unmapped(3), &mut state);
    assert_eq!(token, "G");
    assert_eq!(state.generated_column, 3);
    assert_eq!(state.source, 2);
    assert_eq!(state.original_line, 7);
}

#[test]
fn two_and_three_fields_are_rejected() {
    for token in ["AA", "AAA", "AAAAAA"] {
        let mut state = DeltaState::default();
        let err = decode(token, &mut state, roomy()).expect_err("decode should fail");
        match err {
            MappingError::InvalidSegmentArity { found, .. } => assert_eq!(found, token.len()),
            other => panic!("unexpected error for {token}: {other:?}"),
        }
    }
}

#[test]
fn empty_segment_is_rejected() {
    let mut state = DeltaState::default();
    assert!(matches!(
        decode("", &mut state, roomy()),
        Err(MappingError::InvalidSegmentArity { found: 0, .. })
    ));
}

#[test]
fn source_index_must_exist() {
    let mut state = DeltaState::default();
    let err = decode("ACAA", &mut state, TableBounds::new(1, 0)).expect_err("decode should fail");
    assert!(matches!(
        err,
        MappingError::SourceIndexOutOfRange { index: 1, len: 1, .. }
    ));
}

#[test]
fn negative_source_index_is_out_of_range() {
    let mut state = DeltaState::default();
    assert!(matches!(
        decode("ADAA", &mut state, roomy()),
        Err(MappingError::SourceIndexOutOfRange { index: -1, .. })
    ));
}

#[test]
fn name_index_must_exist() {
    let mut state = DeltaState::default();
    let err = decode("AAAAA", &mut state, TableBounds::new(1, 0)).expect_err("decode should fail");
    assert!(matches!(
        err,
        MappingError::NameIndexOutOfRange { index: 0, len: 0, .. }
    ));
}

#[test]
fn negative_line_and_column_are_rejected() {
    let mut state = DeltaState::default();
    assert!(matches!(
        decode("AADA", &mut state, roomy()),
        Err(MappingError::NegativeLine { value: -1, .. })
    ));

    let mut state = DeltaState::default();
    assert!(matches!(
        decode("AAAD", &mut state, roomy()),
        Err(MappingError::NegativeColumn { value: -1, .. })
    ));
}

#[test]
fn error_spans_point_into_the_full_text() {
    let mut state = DeltaState::default();
    let err = decode_segment("AA", 17, &mut state, roomy()).expect_err("decode should fail");
    let span = err.span().expect("arity errors carry a span");
    assert_eq!(span.offset(), 17);
    assert_eq!(span.len(), 2);
}

fn any_segment() -> impl Strategy<Value = Segment> {
    let original = (0u32..50, 0u32..5_000, 0u32..500, prop::option::of(0u32..50)).prop_map(
        |(source, line, column, name)| OriginalLocation {
            source,
            line,
            column,
            name,
        },
    );
    (0u32..5_000, prop::option::of(original)).prop_map(|(generated_column, original)| Segment {
        generated_column,
        original,
    })
}

fn any_state() -> impl Strategy<Value = DeltaState> {
    (0u32..5_000, 0u32..50, 0u32..5_000, 0u32..500, 0u32..50).prop_map(
        |(generated_column, source, original_line, original_column, name)| DeltaState {
            generated_column,
            source,
            original_line,
            original_column,
            name,
        },
    )
}

proptest! {
    #[test]
    fn segments_round_trip(segment in any_segment(), previous in any_state()) {
        let mut encode_state = previous;
        let token = encode(&segment, &mut encode_state);

        let mut decode_state = previous;
        let decoded = decode(&token, &mut decode_state, roomy()).unwrap();

        prop_assert_eq!(decoded, segment);
        prop_assert_eq!(decode_state, encode_state);
        prop_assert_eq!(srcmap::codec::vlq::decode_all(&token).unwrap().len(), segment.field_count());
    }
}
