use rkvs::{parse_line, PREPOPULATE_SCRIPT};

fn parsed(command: &str, args: &[&str]) -> Option<(String, Vec<String>)> {
    Some((
        command.to_owned(),
        args.iter().map(|s| s.to_string()).collect(),
    ))
}

#[test]
fn splits_command_key_and_value() {
    assert_eq!(parse_line("PUT key1 value1"), parsed("PUT", &["key1", "value1"]));
    assert_eq!(parse_line("GET key1"), parsed("GET", &["key1"]));
    assert_eq!(parse_line("DELETE key1\n"), parsed("DELETE", &["key1"]));
}

#[test]
fn value_keeps_inner_spaces() {
    assert_eq!(
        parse_line("PUT greeting hello  big world"),
        parsed("PUT", &["greeting", "hello  big world"])
    );
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(parse_line("   GET    key1   "), parsed("GET", &["key1"]));
    assert_eq!(parse_line("PUT\tkey\tvalue"), parsed("PUT", &["key", "value"]));
}

#[test]
fn bare_command_has_no_arguments() {
    assert_eq!(parse_line("GET"), parsed("GET", &[]));
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("   \t "), None);
}

#[test]
fn prepopulate_script_covers_each_command() {
    assert_eq!(PREPOPULATE_SCRIPT.len(), 15);
    for line in PREPOPULATE_SCRIPT {
        let (command, args) = parse_line(line).unwrap();
        match command.as_str() {
            "PUT" => assert_eq!(args.len(), 2),
            "GET" | "DELETE" => assert_eq!(args.len(), 1),
            other => panic!("unexpected command {}", other),
        }
    }
}
