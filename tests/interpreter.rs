use rkvs::interpreter::{
    execute, Command, Rejection, INVALID_COMMAND_MESSAGE, NOT_FOUND_MESSAGE, OK_MESSAGE,
};
use rkvs::{KvsEngine, MemStore};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// Should get previously stored value.
#[test]
fn get_stored_value() {
    let mut store = MemStore::new();

    assert_eq!(execute(&mut store, "PUT", &args(&["key1", "value1"])), OK_MESSAGE);
    assert_eq!(execute(&mut store, "PUT", &args(&["key2", "value2"])), OK_MESSAGE);

    assert_eq!(execute(&mut store, "GET", &args(&["key1"])), "value1");
    assert_eq!(execute(&mut store, "GET", &args(&["key2"])), "value2");
}

// Should overwrite existent value.
#[test]
fn overwrite_value() {
    let mut store = MemStore::new();

    execute(&mut store, "PUT", &args(&["key1", "value1"]));
    assert_eq!(execute(&mut store, "GET", &args(&["key1"])), "value1");
    execute(&mut store, "PUT", &args(&["key1", "value2"]));
    assert_eq!(execute(&mut store, "GET", &args(&["key1"])), "value2");
    assert_eq!(store.len(), 1);
}

// Should get "No record found." when getting a non-existent key.
#[test]
fn get_non_existent_value() {
    let mut store = MemStore::new();

    execute(&mut store, "PUT", &args(&["key1", "value1"]));
    assert_eq!(execute(&mut store, "GET", &args(&["key2"])), NOT_FOUND_MESSAGE);
}

#[test]
fn delete_is_idempotent() {
    let mut store = MemStore::new();
    execute(&mut store, "PUT", &args(&["key1", "value1"]));

    assert_eq!(execute(&mut store, "DELETE", &args(&["key1"])), OK_MESSAGE);
    assert_eq!(execute(&mut store, "DELETE", &args(&["key1"])), OK_MESSAGE);
    assert_eq!(execute(&mut store, "GET", &args(&["key1"])), NOT_FOUND_MESSAGE);
    assert!(store.is_empty());
}

#[test]
fn delete_non_existent_key_succeeds() {
    let mut store = MemStore::new();
    assert_eq!(execute(&mut store, "DELETE", &args(&["never-set"])), OK_MESSAGE);
}

#[test]
fn unknown_command_leaves_store_untouched() {
    let mut store = MemStore::new();
    execute(&mut store, "PUT", &args(&["a", "1"]));

    assert_eq!(execute(&mut store, "FOO", &args(&["a", "b"])), INVALID_COMMAND_MESSAGE);
    assert_eq!(execute(&mut store, "", &[]), INVALID_COMMAND_MESSAGE);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a"), Some("1".to_owned()));
}

#[test]
fn command_names_are_case_sensitive() {
    let mut store = MemStore::new();
    assert_eq!(execute(&mut store, "put", &args(&["a", "1"])), INVALID_COMMAND_MESSAGE);
    assert!(store.is_empty());
}

#[test]
fn missing_arguments_return_usage() {
    let mut store = MemStore::new();

    assert_eq!(
        execute(&mut store, "PUT", &args(&["only-key"])),
        "Sample Usage: PUT <key> <value>"
    );
    assert_eq!(execute(&mut store, "PUT", &[]), "Sample Usage: PUT <key> <value>");
    assert_eq!(execute(&mut store, "GET", &[]), "Sample Usage: GET <key>");
    assert_eq!(execute(&mut store, "DELETE", &[]), "Sample Usage: DELETE <key>");
    assert!(store.is_empty());
}

#[test]
fn extra_arguments_are_ignored() {
    let mut store = MemStore::new();
    assert_eq!(
        execute(&mut store, "PUT", &args(&["k", "v", "ignored"])),
        OK_MESSAGE
    );
    assert_eq!(execute(&mut store, "GET", &args(&["k", "ignored"])), "v");
}

#[test]
fn parse_builds_commands() {
    assert_eq!(
        Command::parse("PUT", &args(&["k", "v"])),
        Ok(Command::Put {
            key: "k".to_owned(),
            value: "v".to_owned()
        })
    );
    assert_eq!(
        Command::parse("DELETE", &args(&["k"])),
        Ok(Command::Delete { key: "k".to_owned() })
    );
    assert_eq!(Command::parse("LIST", &[]), Err(Rejection::Invalid));
    assert_eq!(
        Command::parse("GET", &[]).unwrap_err().to_string(),
        "Sample Usage: GET <key>"
    );
}

#[test]
fn values_may_contain_spaces() {
    let mut store = MemStore::new();
    execute(&mut store, "PUT", &args(&["greeting", "hello world"]));
    assert_eq!(execute(&mut store, "GET", &args(&["greeting"])), "hello world");
}
