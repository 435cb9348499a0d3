use super::*;

fn basic_record() -> LabRecord {
    LabRecord {
        course_title: "Intro to Systems".to_string(),
        student_name: "Jane Doe".to_string(),
        register_number: "RA001".to_string(),
        experiments: vec![Experiment {
            title: "Exp1".to_string(),
            date: "2024-01-01".to_string(),
            reference_url: "https://github.com/x/y".to_string(),
        }],
    }
}

#[test]
fn basic_record_validates() {
    basic_record().validate().unwrap();
}

#[test]
fn empty_experiment_list_is_valid() {
    let mut rec = basic_record();
    rec.experiments.clear();
    rec.validate().unwrap();
}

#[test]
fn blank_required_fields_are_rejected() {
    let mut rec = basic_record();
    rec.course_title = "   ".to_string();
    assert!(matches!(rec.validate(), Err(LabrecError::Validation(_))));

    let mut rec = basic_record();
    rec.student_name = String::new();
    assert!(matches!(rec.validate(), Err(LabrecError::Validation(_))));

    let mut rec = basic_record();
    rec.register_number = String::new();
    assert!(matches!(rec.validate(), Err(LabrecError::Validation(_))));
}

#[test]
fn empty_reference_url_names_the_row() {
    let mut rec = basic_record();
    rec.experiments.push(Experiment {
        title: "Exp2".to_string(),
        date: String::new(),
        reference_url: " ".to_string(),
    });
    let err = rec.validate().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("experiment 2"), "{msg}");
    assert!(msg.contains("Exp2"), "{msg}");
}

#[test]
fn register_number_cannot_escape_the_output_dir() {
    for bad in ["../RA001", "RA/001", "RA\\001", ".", "..", "RA\0"] {
        let mut rec = basic_record();
        rec.register_number = bad.to_string();
        assert!(rec.validate().is_err(), "accepted {bad:?}");
    }
}

#[test]
fn malformed_urls_are_accepted_verbatim() {
    let mut rec = basic_record();
    rec.experiments[0].reference_url = "not a url at all".to_string();
    rec.validate().unwrap();
}

#[test]
fn output_file_name_uses_register_number() {
    assert_eq!(basic_record().output_file_name(), "RA001_Lab_Record.docx");
}

#[test]
fn json_accepts_github_alias_and_missing_date() {
    let rec: LabRecord = serde_json::from_str(
        r#"{
            "course_title": "Intro to Systems",
            "student_name": "Jane Doe",
            "register_number": "RA001",
            "experiments": [{ "title": "Exp1", "github": "https://github.com/x/y" }]
        }"#,
    )
    .unwrap();
    assert_eq!(rec.experiments[0].reference_url, "https://github.com/x/y");
    assert_eq!(rec.experiments[0].date, "");
}

#[test]
fn json_missing_reference_url_fails_to_parse() {
    let res = serde_json::from_str::<LabRecord>(
        r#"{
            "course_title": "c",
            "student_name": "s",
            "register_number": "r",
            "experiments": [{ "title": "Exp1" }]
        }"#,
    );
    assert!(res.is_err());
}

#[test]
fn register_number_cannot_break_a_quoted_file_name() {
    for bad in ["RA\"; filename=\"evil.exe", "RA\r\n001", "RA\t001", "RA\u{7f}"] {
        let mut rec = basic_record();
        rec.register_number = bad.to_string();
        assert!(
            matches!(rec.validate(), Err(LabrecError::Validation(_))),
            "accepted {bad:?}"
        );
    }
}
