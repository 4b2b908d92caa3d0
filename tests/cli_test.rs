//! CLI integration tests for the jsonapi-router binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jsonapi-router"))
}

// Helper to create a temp document file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const SCHEMA: &str = r#"{
    "resources": {
        "articles": {
            "fields": [
                { "kind": "attribute", "name": "title" },
                { "kind": "attribute", "name": "createdAt", "format": "date" },
                { "kind": "relationship", "name": "author", "linkedType": "people" },
                { "kind": "relationship", "name": "relatedTags", "linkedType": "tags" }
            ]
        },
        "people": {
            "fields": [{ "kind": "attribute", "name": "lastName" }]
        }
    }
}"#;

mod url_command {
    use super::*;

    #[test]
    fn basic_query() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);
        let query = write_temp_file(
            &dir,
            "query.json",
            r#"{
                "resourceType": "articles",
                "includes": ["author"],
                "sort": [{ "field": "createdAt", "ascending": false }, { "field": "title" }],
                "pagination": { "type": "page", "number": 2, "size": 20 }
            }"#,
        );

        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com/v1",
                "--schema",
                schema.to_str().unwrap(),
                "--query",
                query.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::diff(
                "https://api.example.com/v1/articles?include=author&sort=-createdAt,title&page[number]=2&page[size]=20\n",
            ));
    }

    #[test]
    fn dasherized_keys() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);
        let query = write_temp_file(
            &dir,
            "query.json",
            r#"{
                "resourceType": "articles",
                "filters": [{ "keyPath": "author.lastName", "operator": "equal", "value": "Doe" }]
            }"#,
        );

        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--query",
                query.to_str().unwrap(),
                "--key-format",
                "dasherized",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("filter[author.last-name]=Doe"));
    }

    #[test]
    fn unknown_sort_field_exits_2() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);
        let query = write_temp_file(
            &dir,
            "query.json",
            r#"{ "resourceType": "articles", "sort": [{ "field": "rating" }] }"#,
        );

        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--query",
                query.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("rating"));
    }

    #[test]
    fn missing_query_file_exits_3() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);

        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--query",
                "/nonexistent/query.json",
            ])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_schema_exits_2() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", "{ not json }");
        let query = write_temp_file(&dir, "query.json", r#"{ "resourceType": "articles" }"#);

        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--query",
                query.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn unknown_key_format_rejected() {
        cmd()
            .args([
                "url",
                "--base-url",
                "https://api.example.com",
                "--schema",
                "schema.json",
                "--query",
                "query.json",
                "--key-format",
                "camel",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown key format"));
    }
}

mod relationship_command {
    use super::*;

    #[test]
    fn from_type_and_id() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);

        cmd()
            .args([
                "relationship",
                "--base-url",
                "https://api.example.com/v1",
                "--schema",
                schema.to_str().unwrap(),
                "--type",
                "articles",
                "--id",
                "1",
                "--relationship",
                "relatedTags",
                "--key-format",
                "underscored",
            ])
            .assert()
            .success()
            .stdout(predicate::str::diff(
                "https://api.example.com/v1/articles/1/relationships/related_tags\n",
            ));
    }

    #[test]
    fn self_url_wins() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);

        cmd()
            .args([
                "relationship",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--type",
                "articles",
                "--id",
                "1",
                "--relationship",
                "author",
                "--self-url",
                "https://links.example.com/a1/author",
            ])
            .assert()
            .success()
            .stdout(predicate::str::diff("https://links.example.com/a1/author\n"));
    }

    #[test]
    fn missing_id_exits_2() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);

        cmd()
            .args([
                "relationship",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--type",
                "articles",
                "--relationship",
                "author",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("has no id"));
    }

    #[test]
    fn attribute_is_not_a_relationship() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", SCHEMA);

        cmd()
            .args([
                "relationship",
                "--base-url",
                "https://api.example.com",
                "--schema",
                schema.to_str().unwrap(),
                "--type",
                "articles",
                "--id",
                "1",
                "--relationship",
                "title",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("is an attribute"));
    }
}
