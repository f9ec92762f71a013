// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, ProcessSpecBuilder};
use crate::common::init_tracing;

use std::error::Error;
use std::fs;

use tempfile::tempdir;

use sheepdog::config::{
    ConfigFile, SpecShape, default_config_path, load_and_validate, load_from_path, validate_spec,
};
use sheepdog::engine::Supervisor;
use sheepdog::errors::SheepdogError;
use sheepdog::types::{GroupKind, LogLevel};

type TestResult = Result<(), Box<dyn Error>>;

fn config_error(err: SheepdogError) -> String {
    match err {
        SheepdogError::ConfigError(msg) => msg,
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn json_config_with_camel_case_keys_loads() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join(".sheepdog.json");
    fs::write(
        &path,
        r#"{
            "processes": [
                { "name": "db", "command": ["postgres"], "readyRegexp": "ready to accept", "autorun": true },
                {
                    "name": "web",
                    "groupType": "sequential",
                    "cwd": "web",
                    "children": [
                        { "name": "api", "command": ["cargo", "run"] },
                        { "name": "ui", "command": ["npm", "run", "dev"], "cwd": "ui" }
                    ]
                }
            ]
        }"#,
    )?;

    let cfg = load_and_validate(&path)?;
    let processes = cfg.processes();
    assert_eq!(processes.len(), 2);

    assert_eq!(processes[0].name, "db");
    assert!(processes[0].autorun);
    assert_eq!(processes[0].ready_pattern.as_deref(), Some("ready to accept"));

    assert_eq!(processes[1].group_type.as_deref(), Some("sequential"));
    assert_eq!(processes[1].children.len(), 2);
    assert!(!processes[1].children[0].autorun);
    Ok(())
}

#[test]
fn toml_config_loads_by_extension() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("sheepdog.toml");
    fs::write(
        &path,
        r#"
[[processes]]
name = "stack"
group_type = "parallel"

[[processes.children]]
name = "redis"
command = ["redis-server"]
ready_pattern = "Ready to accept connections"

[[processes.children]]
name = "worker"
command = ["python", "worker.py"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    let stack = &cfg.processes()[0];
    assert_eq!(stack.group_type.as_deref(), Some("parallel"));
    assert_eq!(stack.children[0].name, "redis");
    assert_eq!(stack.children[1].command, vec!["python", "worker.py"]);
    Ok(())
}

#[test]
fn malformed_json_is_a_parse_error() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"processes\": [ ")?;

    let err = load_from_path(&path).err().ok_or("expected a parse error")?;
    assert!(matches!(err, SheepdogError::JsonError(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_from_path("/definitely/not/here/.sheepdog.json").err();
    assert!(matches!(err, Some(SheepdogError::IoError(_))));
}

#[test]
fn empty_config_is_rejected() {
    let raw = ConfigFileBuilder::new().build_raw();
    let err = ConfigFile::try_from(raw).err().map(config_error);
    assert_eq!(
        err.as_deref(),
        Some("config must define at least one process")
    );
}

#[test]
fn spec_with_command_and_children_is_rejected() {
    let spec = ProcessSpecBuilder::group("both", "parallel")
        .command(&["echo", "hi"])
        .child(ProcessSpecBuilder::leaf("c", &["true"]).build())
        .build();

    let raw = ConfigFileBuilder::new().with_process(spec).build_raw();
    let msg = ConfigFile::try_from(raw).err().map(config_error);
    assert_eq!(
        msg.as_deref(),
        Some("process 'both' is configured as both a command and a group")
    );
}

#[test]
fn spec_with_neither_is_rejected() {
    let spec = ProcessSpecBuilder::empty("nothing").build();
    let msg = validate_spec(&spec).err().map(config_error);
    assert_eq!(
        msg.as_deref(),
        Some("process 'nothing' is configured as neither a command nor a group")
    );
}

#[test]
fn group_without_type_is_rejected() {
    let spec = ProcessSpecBuilder::empty("untyped")
        .child(ProcessSpecBuilder::leaf("c", &["true"]).build())
        .build();
    let msg = validate_spec(&spec).err().map(config_error);
    assert_eq!(msg.as_deref(), Some("group 'untyped' has children but no group_type"));
}

#[test]
fn unknown_group_type_is_rejected_anywhere_in_the_tree() {
    let nested = ProcessSpecBuilder::group("inner", "roundrobin")
        .child(ProcessSpecBuilder::leaf("c", &["true"]).build())
        .build();
    let outer = ProcessSpecBuilder::group("outer", "parallel").child(nested).build();

    let raw = ConfigFileBuilder::new().with_process(outer).build_raw();
    let msg = ConfigFile::try_from(raw).err().map(config_error);
    let msg = msg.unwrap_or_default();
    assert!(msg.starts_with("group 'inner'"), "unexpected message: {msg}");
    assert!(msg.contains("roundrobin"), "unexpected message: {msg}");
}

#[test]
fn group_type_on_a_leaf_is_ignored() -> TestResult {
    let spec = ProcessSpecBuilder::leaf("solo", &["true"])
        .group_type("parallel")
        .build();
    assert_eq!(validate_spec(&spec)?, SpecShape::Leaf);
    Ok(())
}

#[test]
fn group_shape_reports_its_kind() -> TestResult {
    let spec = ProcessSpecBuilder::group("g", "sequential")
        .child(ProcessSpecBuilder::leaf("c", &["true"]).build())
        .build();
    assert_eq!(validate_spec(&spec)?, SpecShape::Group(GroupKind::Sequential));
    Ok(())
}

#[test]
fn bad_ready_pattern_is_reported_on_the_node_not_fatal() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(
            ProcessSpecBuilder::leaf("web", &["true"])
                .ready_pattern("[unterminated")
                .build(),
        )
        .build();

    let supervisor = Supervisor::from_config(&cfg)?;
    let web = supervisor.node_by_name("web").ok_or("web node missing")?;
    assert_eq!(web.log().len(), 1);
    assert_eq!(web.log()[0].level, LogLevel::Error);
    assert!(web.log()[0].message.contains("[unterminated"));
    Ok(())
}

#[test]
fn children_inherit_the_group_cwd() -> TestResult {
    init_tracing();

    let group = ProcessSpecBuilder::group("web", "parallel")
        .cwd("services")
        .child(ProcessSpecBuilder::leaf("api", &["true"]).build())
        .child(ProcessSpecBuilder::leaf("ui", &["true"]).cwd("frontend").build())
        .child(
            ProcessSpecBuilder::group("nested", "sequential")
                .child(ProcessSpecBuilder::leaf("deep", &["true"]).build())
                .build(),
        )
        .build();
    let cfg = ConfigFileBuilder::new().with_process(group).build();
    let supervisor = Supervisor::from_config(&cfg)?;

    let cwd_of = |name: &str| {
        supervisor
            .node_by_name(name)
            .and_then(|n| n.as_leaf())
            .and_then(|l| l.cwd())
            .map(str::to_string)
    };

    assert_eq!(cwd_of("api").as_deref(), Some("services"));
    assert_eq!(cwd_of("ui").as_deref(), Some("frontend"));
    assert_eq!(cwd_of("deep").as_deref(), Some("services"));
    Ok(())
}

#[test]
fn autorun_defaults_to_false() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("min.json");
    fs::write(&path, r#"{ "processes": [ { "name": "a", "command": ["true"] } ] }"#)?;

    let cfg = load_and_validate(&path)?;
    assert!(!cfg.processes()[0].autorun);
    assert!(cfg.processes()[0].cwd.is_none());
    Ok(())
}

#[test]
fn default_path_is_the_dotfile_in_the_working_directory() {
    assert_eq!(default_config_path(), std::path::PathBuf::from(".sheepdog.json"));
}
