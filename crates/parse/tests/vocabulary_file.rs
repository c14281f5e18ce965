use std::io::Write;

use liftvox_parse::{
    CommandParser, ControlCommand, SetInputParser, Vocabulary, VocabularyError,
};

fn write_vocabulary(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_custom_vocabulary_drives_both_parsers() {
    let file = write_vocabulary(
        r#"{
            "commands": { "start": ["lift off"], "finish": ["call it"] },
            "set_input": {
                "rep_keywords": [{ "reps": 3, "words": ["three"] }],
                "weight_keywords": [{ "weight": 60, "words": ["sixty"] }]
            }
        }"#,
    );

    let vocabulary = Vocabulary::from_json_file(file.path()).unwrap();
    let commands = CommandParser::new(&vocabulary.commands);
    let sets = SetInputParser::new(&vocabulary.set_input);

    assert_eq!(commands.classify("Lift off please"), ControlCommand::Start);
    assert_eq!(commands.classify("let's call it"), ControlCommand::Finish);
    // defaults for sections that were not overridden
    assert_eq!(commands.classify("next"), ControlCommand::AdvanceToNextIncomplete);
    // replaced start table drops the default words
    assert_eq!(commands.classify("begin"), ControlCommand::Unknown);

    let parsed = sets.parse("sixty kilos three reps");
    assert_eq!(parsed.weight, 60.0);
    assert_eq!(parsed.reps, 3);
    // default rep keywords were replaced
    assert_eq!(sets.parse("ten").reps, 0);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    match Vocabulary::from_json_file(&path) {
        Err(VocabularyError::ReadFile { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected ReadFile error, got {other:?}"),
    }
}

#[test]
fn test_invalid_keyword_rejected_from_file() {
    let file = write_vocabulary(r#"{"set_input": {"rep_keywords": [{"reps": 0, "words": ["none"]}]}}"#);
    assert!(matches!(
        Vocabulary::from_json_file(file.path()),
        Err(VocabularyError::InvalidRepKeyword { .. })
    ));
}
