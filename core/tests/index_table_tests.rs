use srcmap::IndexTable;
use srcmap::errors::MappingError;

#[test]
fn indices_are_dense_and_first_seen() {
    let mut table = IndexTable::new();
    assert_eq!(table.to_index("a.js"), 0);
    assert_eq!(table.to_index("b.js"), 1);
    assert_eq!(table.to_index("c.js"), 2);
    assert_eq!(table.count(), 3);
    assert_eq!(table.values(), ["a.js", "b.js", "c.js"]);
}

#[test]
fn repeated_insert_is_idempotent() {
    let mut table = IndexTable::new();
    let first = table.to_index("shared");
    let second = table.to_index("shared");
    assert_eq!(first, second);
    assert_eq!(table.count(), 1);
}

#[test]
fn from_index_round_trips() {
    let mut table = IndexTable::new();
    let index = table.to_index("render");
    assert_eq!(table.from_index(index).expect("index should exist"), "render");
    assert_eq!(table.get_index("render"), Some(index));
    assert_eq!(table.get_index("missing"), None);
}

#[test]
fn from_index_out_of_range_fails() {
    let empty = IndexTable::new();
    assert!(matches!(
        empty.from_index(0),
        Err(MappingError::IndexOutOfRange { index: 0, len: 0 })
    ));

    let mut table = IndexTable::new();
    table.to_index("only");
    assert!(matches!(
        table.from_index(1),
        Err(MappingError::IndexOutOfRange { index: 1, len: 1 })
    ));
}

#[test]
fn loaded_duplicates_keep_their_slots() {
    let mut table = IndexTable::from_values(vec![
        "a.js".to_string(),
        "b.js".to_string(),
        "a.js".to_string(),
    ]);
    assert_eq!(table.count(), 3);
    assert_eq!(table.from_index(2).expect("index should exist"), "a.js");
    assert_eq!(table.to_index("a.js"), 0);
    assert_eq!(table.to_index("c.js"), 3);
}
