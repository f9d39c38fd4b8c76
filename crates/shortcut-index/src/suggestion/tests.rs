use super::*;

fn class(offset: usize, style: ClassificationStyle) -> Classification {
    Classification::new(offset, style)
}

#[test]
fn strip_match_markers_merges_runs_that_differed_only_by_match() {
    let classes = vec![
        class(0, ClassificationStyle::URL | ClassificationStyle::MATCH),
        class(3, ClassificationStyle::URL),
        class(7, ClassificationStyle::empty()),
        class(9, ClassificationStyle::MATCH),
    ];
    let stripped = strip_match_markers(&classes);
    assert_eq!(
        stripped,
        vec![
            class(0, ClassificationStyle::URL),
            class(7, ClassificationStyle::empty()),
        ]
    );
}

#[test]
fn strip_match_markers_keeps_dim_runs() {
    let classes = vec![
        class(0, ClassificationStyle::MATCH),
        class(2, ClassificationStyle::DIM),
    ];
    assert_eq!(
        classifications_to_string(&strip_match_markers(&classes)),
        "0,0,2,4"
    );
}

#[test]
fn classification_strings_parse_back() {
    let parsed = classifications_from_string("0,1,4,0").expect("parse");
    assert_eq!(
        parsed,
        vec![
            class(0, ClassificationStyle::URL),
            class(4, ClassificationStyle::empty()),
        ]
    );
    assert!(classifications_from_string("").expect("empty").is_empty());
}

#[test]
fn malformed_classification_strings_are_rejected() {
    assert!(classifications_from_string("0,1,4").is_err());
    assert!(classifications_from_string("x,1").is_err());
}

#[test]
fn shortcut_description_prefers_override() {
    let url = Url::parse("https://example.com/").expect("url");
    let mut suggestion = Suggestion::new(MatchType::HistoryTitle, url).with_description("Example");
    assert_eq!(suggestion.shortcut_description(), "Example");

    suggestion.description_for_shortcuts = "Example Domain".to_string();
    suggestion.description_class_for_shortcuts =
        vec![class(0, ClassificationStyle::DIM)];
    assert_eq!(suggestion.shortcut_description(), "Example Domain");
    assert_eq!(
        suggestion.shortcut_description_class(),
        &[class(0, ClassificationStyle::DIM)]
    );
}
