use std::fs;
use std::path::Path;

use junit_attachments_core::{
    AttachmentCollector, AttachmentQuery, AttachmentView, CaseResult, CollectOptions,
    DisplayOptions, IndexRecord, LocalStore, LocalWorkspace, RecordingSink, ScanWarning,
    SuiteResult, TestRun,
};
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn case(class_name: &str, name: &str, stdout: &str) -> CaseResult {
    CaseResult {
        name: name.to_string(),
        class_name: class_name.to_string(),
        stdout: Some(stdout.to_string()),
        stderr: None,
    }
}

fn signup_run() -> TestRun {
    let suite_out = "booting\n[[ATTACHMENT|shots/suite-1.png]]\n[[ATTACHMENT|shots/suite-2.png]]";
    TestRun {
        suites: vec![SuiteResult {
            name: "Signup".into(),
            file: Some("reports/TEST-Signup.xml".into()),
            stdout: Some(suite_out.into()),
            stderr: None,
            cases: vec![
                case("Signup", "testEmail", "[[ATTACHMENT|shots/email.png]]"),
                case("Signup", "testPassword", "[[ATTACHMENT|shots/password.png|image/png]]"),
                case("Signup", "testTerms", "clicked [[ATTACHMENT|shots/terms.png]] ok"),
            ],
        }],
    }
}

fn signup_workspace(ws: &Path) {
    write(&ws.join("reports/TEST-Signup.xml"), "<testsuite/>");
    for name in ["suite-1", "suite-2", "email", "password", "terms"] {
        write(&ws.join(format!("shots/{}.png", name)), name);
    }
}

#[test]
fn test_end_to_end_class_query_order() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    signup_workspace(ws_dir.path());

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let mut sink = RecordingSink::new();

    let index = collector.collect(&signup_run(), &mut sink).unwrap();
    assert!(sink.is_empty(), "unexpected warnings: {:?}", sink.warnings());

    assert_eq!(
        index.attachments(&AttachmentQuery::class("Signup"), true),
        vec![
            "suite-1.png",
            "suite-2.png",
            "email.png",
            "password.png",
            "terms.png"
        ]
    );
    assert_eq!(
        index.attachments(&AttachmentQuery::case("Signup", "testTerms"), true),
        vec!["terms.png"]
    );

    let root = run_dir.path().join("junit-attachments");
    assert_eq!(fs::read_to_string(root.join("Signup/suite-1.png")).unwrap(), "suite-1");
    assert_eq!(
        fs::read_to_string(root.join("Signup/testEmail/email.png")).unwrap(),
        "email"
    );

    let record = IndexRecord::current(index);
    let view = AttachmentView::new(&record, &store, DisplayOptions::default());
    assert!(view
        .resolve_file("Signup", "testPassword", "password.png")
        .exists());
}

#[test]
fn test_collect_twice_does_not_duplicate() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    signup_workspace(ws_dir.path());

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());

    let first = collector.collect(&signup_run(), &mut RecordingSink::new()).unwrap();
    let second = collector.collect(&signup_run(), &mut RecordingSink::new()).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.file_count(), 5);
    for (_, _, names) in second.iter() {
        let mut unique = names.to_vec();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }
}

#[test]
fn test_convention_directory_and_output_file() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    let ws = ws_dir.path();
    let class_name = "test.foo.bar.DefaultIntegrationTest";
    write(&ws.join(format!("TEST-{}.xml", class_name)), "<testsuite/>");
    write(&ws.join(format!("{}/file", class_name)), "payload");
    write(&ws.join(format!("{}-output.txt", class_name)), "stdout and stderr");

    let run = TestRun {
        suites: vec![SuiteResult {
            name: class_name.into(),
            file: Some(format!("TEST-{}.xml", class_name)),
            cases: vec![case(class_name, "testSomething", "")],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws);
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let index = collector.collect(&run, &mut RecordingSink::new()).unwrap();

    let mut names = index.attachments(&AttachmentQuery::class(class_name), true);
    names.sort();
    assert_eq!(
        names,
        vec!["file", "test.foo.bar.DefaultIntegrationTest-output.txt"]
    );
    assert!(run_dir
        .path()
        .join("junit-attachments")
        .join(class_name)
        .join("file")
        .exists());
}

#[test]
fn test_empty_convention_directory_creates_nothing() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    fs::create_dir_all(ws_dir.path().join("com.x.Foo")).unwrap();

    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            file: Some("TEST-com.x.Foo.xml".into()),
            cases: vec![case("com.x.Foo", "t", "")],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let index = collector.collect(&run, &mut RecordingSink::new()).unwrap();

    assert!(!index.has_attachments());
    assert!(!run_dir.path().join("junit-attachments").exists());
}

#[test]
fn test_case_output_equal_to_suite_is_not_attributed() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    write(&ws_dir.path().join("s.png"), "s");

    let shared = "[[ATTACHMENT|s.png]]";
    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            stdout: Some(shared.into()),
            cases: vec![case("com.x.Foo", "t1", shared), case("com.x.Foo", "t2", shared)],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let index = collector.collect(&run, &mut RecordingSink::new()).unwrap();

    assert!(index.case_attachments("com.x.Foo", "t1").is_empty());
    assert!(index.case_attachments("com.x.Foo", "t2").is_empty());
    assert_eq!(index.case_attachments("com.x.Foo", ""), ["s.png"]);
}

#[test]
fn test_missing_and_directory_references_are_skipped() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    write(&ws_dir.path().join("ok.txt"), "ok");
    fs::create_dir_all(ws_dir.path().join("logs")).unwrap();

    let out = "[[ATTACHMENT|missing.txt]]\n[[ATTACHMENT|logs]]\n[[ATTACHMENT|ok.txt]]\n[[ATTACHMENT|]]";
    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            cases: vec![case("com.x.Foo", "t", out)],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let mut sink = RecordingSink::new();
    let index = collector.collect(&run, &mut sink).unwrap();

    assert_eq!(index.case_attachments("com.x.Foo", "t"), ["ok.txt"]);
    let warnings = sink.into_warnings();
    assert_eq!(warnings.len(), 3);
    assert!(matches!(warnings[0], ScanWarning::ReferenceNotFound { .. }));
    assert!(matches!(warnings[1], ScanWarning::ReferenceIsDirectory { .. }));
    assert!(matches!(warnings[2], ScanWarning::MalformedMarker { .. }));
}

#[test]
fn test_preserve_directory_structure() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    write(&ws_dir.path().join("out/shots/login.png"), "1");
    write(&ws_dir.path().join("out/logs/app.log"), "2");

    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            cases: vec![case(
                "com.x.Foo",
                "t",
                "[[ATTACHMENT|out/shots/login.png]]\n[[ATTACHMENT|out/logs/app.log]]",
            )],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let options = CollectOptions {
        preserve_directory_structure: true,
    };
    let collector = AttachmentCollector::new(&workspace, &store, options);
    let index = collector.collect(&run, &mut RecordingSink::new()).unwrap();

    assert_eq!(
        index.case_attachments("com.x.Foo", "t"),
        ["shots/login.png", "logs/app.log"]
    );
    assert!(run_dir
        .path()
        .join("junit-attachments/com.x.Foo/t/shots/login.png")
        .exists());
}

#[test]
fn test_same_base_name_is_captured_once_when_flattened() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    write(&ws_dir.path().join("a/shot.png"), "first");
    write(&ws_dir.path().join("b/shot.png"), "second");

    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            cases: vec![case(
                "com.x.Foo",
                "t",
                "[[ATTACHMENT|a/shot.png]] [[ATTACHMENT|b/shot.png]]",
            )],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let index = collector.collect(&run, &mut RecordingSink::new()).unwrap();

    assert_eq!(index.case_attachments("com.x.Foo", "t"), ["shot.png"]);
    let stored = run_dir.path().join("junit-attachments/com.x.Foo/t/shot.png");
    assert_eq!(fs::read_to_string(stored).unwrap(), "first");
}

#[test]
fn test_storage_failure_is_fatal() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    write(&ws_dir.path().join("a.txt"), "a");
    // A regular file where the attachment root should be
    let blocked = run_dir.path().join("junit-attachments");
    fs::write(&blocked, "not a directory").unwrap();

    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            cases: vec![case("com.x.Foo", "t", "[[ATTACHMENT|a.txt]]")],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws_dir.path());
    let store = LocalStore::new(&blocked);
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let err = collector
        .collect(&run, &mut RecordingSink::new())
        .unwrap_err();
    assert!(err.is_storage());
}

fn foo_suite_with_case_marker(marker: &str) -> TestRun {
    TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            file: Some("reports/TEST-com.x.Foo.xml".into()),
            cases: vec![case("com.x.Foo", "testA", marker)],
            ..Default::default()
        }],
    }
}

#[test]
fn test_case_file_does_not_reuse_convention_file_at_same_path() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    let ws = ws_dir.path();
    write(&ws.join("reports/TEST-com.x.Foo.xml"), "<testsuite/>");
    write(&ws.join("reports/com.x.Foo/testA/shot.png"), "CONVENTION");
    write(&ws.join("out/shot.png"), "CASE");

    let workspace = LocalWorkspace::new(ws);
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let run = foo_suite_with_case_marker("[[ATTACHMENT|out/shot.png]]");

    for _ in 0..2 {
        let mut sink = RecordingSink::new();
        let index = collector.collect(&run, &mut sink).unwrap();

        assert_eq!(index.case_attachments("com.x.Foo", ""), ["testA/shot.png"]);
        assert!(index.case_attachments("com.x.Foo", "testA").is_empty());
        let warnings = sink.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ScanWarning::DestinationConflict { case_name, name, .. }
                if case_name == "testA" && name == "shot.png"
        ));
    }

    let stored = run_dir.path().join("junit-attachments/com.x.Foo/testA/shot.png");
    assert_eq!(fs::read_to_string(stored).unwrap(), "CONVENTION");
}

#[test]
fn test_class_file_named_like_case_does_not_abort() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    let ws = ws_dir.path();
    write(&ws.join("reports/TEST-com.x.Foo.xml"), "<testsuite/>");
    write(&ws.join("reports/com.x.Foo/testA"), "class-level file");
    write(&ws.join("reports/com.x.Foo/notes.txt"), "notes");
    write(&ws.join("out/shot.png"), "CASE");

    let workspace = LocalWorkspace::new(ws);
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let mut sink = RecordingSink::new();
    let index = collector
        .collect(&foo_suite_with_case_marker("[[ATTACHMENT|out/shot.png]]"), &mut sink)
        .unwrap();

    assert_eq!(
        index.case_attachments("com.x.Foo", ""),
        ["notes.txt", "testA"]
    );
    assert!(index.case_attachments("com.x.Foo", "testA").is_empty());
    assert_eq!(sink.len(), 1);
    assert!(matches!(
        sink.warnings()[0],
        ScanWarning::DestinationConflict { .. }
    ));
    let stored = run_dir.path().join("junit-attachments/com.x.Foo/testA");
    assert_eq!(fs::read_to_string(stored).unwrap(), "class-level file");
}

#[test]
fn test_suite_file_named_like_case_directory_is_skipped() {
    let ws_dir = tempdir().unwrap();
    let run_dir = tempdir().unwrap();
    let ws = ws_dir.path();
    write(&ws.join("out/shot.png"), "CASE");
    write(&ws.join("logs/testA"), "suite log");

    let run = TestRun {
        suites: vec![SuiteResult {
            name: "com.x.Foo".into(),
            stdout: Some("[[ATTACHMENT|logs/testA]]".into()),
            cases: vec![case("com.x.Foo", "testA", "[[ATTACHMENT|out/shot.png]]")],
            ..Default::default()
        }],
    };

    let workspace = LocalWorkspace::new(ws);
    let store = LocalStore::for_run(run_dir.path());
    let collector = AttachmentCollector::new(&workspace, &store, CollectOptions::default());
    let mut sink = RecordingSink::new();
    let index = collector.collect(&run, &mut sink).unwrap();

    assert_eq!(index.case_attachments("com.x.Foo", "testA"), ["shot.png"]);
    assert!(index.case_attachments("com.x.Foo", "").is_empty());
    assert_eq!(sink.len(), 1);
    assert!(run_dir
        .path()
        .join("junit-attachments/com.x.Foo/testA/shot.png")
        .is_file());
}
