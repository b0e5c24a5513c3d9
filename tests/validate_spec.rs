use std::fs;
use std::path::Path;
use std::sync::Arc;

use codethesaurus::store::{FsStore, SharedStore};
use codethesaurus::validate::{validate_entry_files, validate_meta_info, Severity};
use speculate2::speculate;
use tempfile::TempDir;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/thesauruses");

/// Copy the fixture corpus so a test can break it.
fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn shared(root: &Path) -> SharedStore {
    Arc::new(FsStore::new(root))
}

speculate! {
    before {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = dir.path().join("thesauruses");
        copy_dir(Path::new(FIXTURES), &root);
    }

    describe "concept files" {
        it "accepts the fixture corpus" {
            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert!(report.is_clean(), "{:?}", report.findings);
        }

        it "reports code with a not-implemented marker once" {
            write(&root, "langs/python/3/data_types.json", r#"{
                "meta": {"language": "python", "language_version": "3", "language_name": "Python"},
                "concepts": {"boolean": {"code": "True", "not-implemented": true}}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            let message = &report.findings[0].message;
            assert!(message.contains("boolean"));
            assert!(message.contains("data_types.json"));
        }

        it "checks the meta section" {
            write(&root, "langs/java/17/data_types.json", r#"{
                "meta": {"language": "language_id", "language_version": "version.number", "language_name": ""},
                "categories": {},
                "concepts": {}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert_eq!(report.error_count(), 4);
        }

        it "flags a language that differs from its directory" {
            write(&root, "langs/java/17/data_types.json", r#"{
                "meta": {"language": "kotlin", "language_version": "17", "language_name": "Java"},
                "concepts": {"boolean": {"code": "true"}}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.contains("should be `java`"));
        }

        it "keeps going after an unparsable file" {
            write(&root, "langs/java/17/data_types.json", "{ nope");
            write(&root, "langs/python/3/data_types.json", r#"{
                "meta": {"language": "python", "language_version": "3", "language_name": "Python"},
                "concepts": {"boolean": {"comments": "plural", "code": "True"}}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert_eq!(report.error_count(), 2);
        }

        it "reports a file that is not UTF-8 and keeps going" {
            fs::write(root.join("langs/java/17/data_types.json"), b"{\"meta\": \xff\xfe}").unwrap();
            write(&root, "langs/python/3/data_types.json", r#"{
                "meta": {"language": "python", "language_version": "3", "language_name": "Python"},
                "concepts": {"boolean": {"code": "True", "not-implemented": true}}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).expect("validation should not abort");
            let messages: Vec<&str> = report.errors().map(|f| f.message.as_str()).collect();

            assert_eq!(report.error_count(), 2);
            assert!(messages.iter().any(|m| m.starts_with("Failed to parse") && m.contains("java")));
            assert!(messages.iter().any(|m| m.contains("not both")));
        }

        it "only warns about unknown keys" {
            write(&root, "langs/python/3/data_types.json", r#"{
                "meta": {"language": "python", "language_version": "3", "language_name": "Python"},
                "concepts": {"boolean": {"code": "True", "example": "x = True"}}
            }"#);

            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert!(!report.has_errors());
            assert_eq!(report.warning_count(), 1);
            let warning = report.warnings().next().unwrap();
            assert_eq!(warning.severity, Severity::Warning);
            assert!(warning.message.contains("`example`"));
        }

        it "ignores non-json files" {
            write(&root, "langs/python/3/NOTES.md", "scratch");
            let report = validate_entry_files(&FsStore::new(&root)).unwrap();
            assert!(report.is_clean());
        }
    }

    describe "manifest" {
        it "accepts the fixture corpus" {
            let report = validate_meta_info(&shared(&root)).unwrap();
            assert!(report.is_clean(), "{:?}", report.findings);
        }

        it "reports a listed entry with no directory" {
            fs::remove_dir_all(root.join("langs/java")).unwrap();

            let report = validate_meta_info(&shared(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.starts_with("Java is listed as a language"));
        }

        it "reports an unlisted entry directory" {
            write(&root, "langs/ruby/3.2/data_types.json", "{}");

            let report = validate_meta_info(&shared(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.contains("ruby is not listed as a language"));
        }

        it "reports category mismatches both ways" {
            fs::create_dir_all(root.join("frameworks")).unwrap();
            fs::remove_dir_all(root.join("databases")).unwrap();

            let report = validate_meta_info(&shared(&root)).unwrap();
            let messages: Vec<&str> = report.errors().map(|f| f.message.as_str()).collect();

            assert!(messages.iter().any(|m| m.contains("`frameworks` is not listed as a category")));
            assert!(messages.iter().any(|m| m.starts_with("Category `databases` is listed")));
        }

        it "reports files where versions belong" {
            write(&root, "langs/python/README.md", "notes");

            let report = validate_meta_info(&shared(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.contains("a directory for a version was expected"));
        }

        it "reports concept files with no structure" {
            write(&root, "langs/python/3/loops.json", "{}");

            let report = validate_meta_info(&shared(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.contains("is not a valid concept filename"));
        }

        it "reports undeclared structure files" {
            write(&root, "_meta/loops.json", r#"{"categories": {}}"#);

            let report = validate_meta_info(&shared(&root)).unwrap();

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.contains("is not listed as a structure"));
        }

        it "reports a structure file that is not UTF-8" {
            fs::write(root.join("_meta/data_types.json"), b"{\"categories\": \xff}").unwrap();

            let report = validate_meta_info(&shared(&root)).expect("validation should not abort");

            assert_eq!(report.error_count(), 1);
            assert!(report.findings[0].message.starts_with("Failed to parse"));
            assert!(report.findings[0].message.contains("data_types.json"));
        }

        it "stops on a broken manifest" {
            write(&root, "meta_info.json", "[");

            let report = validate_meta_info(&shared(&root)).unwrap();
            assert_eq!(report.error_count(), 1);
        }
    }
}
