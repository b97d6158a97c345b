use frontier_core::{parse_seed_list, DocumentRef, SeedError};

#[test]
fn parses_trailing_category_and_id() {
    let doc = DocumentRef::parse("/doc/sport/DdOJeMGKKOzb7HRXMg5zGV409").unwrap();
    assert_eq!(doc.category(), "sport");
    assert_eq!(doc.id(), "DdOJeMGKKOzb7HRXMg5zGV409");
    assert_eq!(doc.path(), "/doc/sport/DdOJeMGKKOzb7HRXMg5zGV409");
    assert_eq!(doc.to_string(), "sport/DdOJeMGKKOzb7HRXMg5zGV409");
}

#[test]
fn accepts_full_urls_and_surrounding_whitespace() {
    let doc = DocumentRef::parse("  http://api.example.com/doc/art/XYZ \n").unwrap();
    assert_eq!(doc, DocumentRef::new("art", "XYZ"));
}

#[test]
fn rejects_fewer_than_two_segments() {
    for raw in ["", "AAA", "/AAA", "/doc/sport/", "sport/"] {
        assert_eq!(
            DocumentRef::parse(raw),
            Err(SeedError::Malformed(raw.trim().to_string())),
            "{raw:?}"
        );
    }
}

#[test]
fn seed_list_is_whitespace_delimited() {
    let seeds = parse_seed_list("/doc/sport/AAA\n/doc/art/BBB\r\n\n").unwrap();
    assert_eq!(
        seeds,
        vec![DocumentRef::new("sport", "AAA"), DocumentRef::new("art", "BBB")]
    );
}

#[test]
fn one_bad_seed_fails_the_list() {
    assert!(parse_seed_list("/doc/sport/AAA\nBROKEN").is_err());
}
