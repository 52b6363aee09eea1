//! End-to-end pipeline tests.
//!
//! Each test runs the full path a build script takes:
//! configuration file -> metadata file -> resolution -> emission -> files on disk.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::Path;

use ironwire_common::error::IronwireError;
use ironwire_sdk::builder::ContainerCompiler;
use ironwire_sdk::loader;

const METADATA: &str = r"
app::Service:
  source: src/service.rs
  constructor:
    - name: repo
      type: app::RepositoryInterface
    - name: logger
      type: app::LoggerInterface
app::Worker:
  source: src/worker.rs
  constructor:
    - name: logger
      type: app::LoggerInterface
app::RepositoryInterface:
  kind: trait
app::LoggerInterface:
  kind: trait
app::InMemoryRepository:
  source: src/repository.rs
app::FileLogger:
  source: src/logger.rs
app::NullLogger:
  source: src/logger.rs
";

const CONFIG: &str = r"
container:
  name: app::AppContainer
entry_points:
  - class: app::Service
hints:
  app::RepositoryInterface:
    class: app::InMemoryRepository
  app::LoggerInterface:
    context:
      default: app::FileLogger
      consumers:
        app::Worker: app::NullLogger
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn compiler(dir: &Path, config: &str) -> ContainerCompiler {
    let config = loader::load_config(&write(dir, "ironwire.yaml", config)).expect("config");
    let metadata = loader::load_metadata(&write(dir, "ironwire.metadata.yaml", METADATA)).expect("metadata");
    ContainerCompiler::new(config).metadata(metadata)
}

// ── Inline container ────────────────────────────────────────────

#[test]
fn compiles_and_writes_the_container() {
    let dir = tempfile::tempdir().expect("tempdir");
    let compiled = compiler(dir.path(), CONFIG).compile().expect("compile");

    let out = dir.path().join("generated");
    let written = loader::write_artifacts(&compiled, &out).expect("write");
    assert_eq!(written, vec![out.join("container.rs")]);

    let source = std::fs::read_to_string(&written[0]).expect("read back");
    assert!(source.starts_with("// @generated by ironwire"));
    assert!(source.contains("pub struct AppContainer {"));
    assert!(source.contains("pub fn app__Service(self: &Arc<Self>) -> Arc<app::Service> {"));
    assert!(source.contains("self.app__InMemoryRepository()"));
    assert!(source.contains("self.app__FileLogger()"));
}

#[test]
fn compiling_twice_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let compiler = compiler(dir.path(), CONFIG);
    let first = compiler.compile().expect("first");
    let second = compiler.compile().expect("second");
    assert_eq!(first, second);
}

// ── File-based placement ────────────────────────────────────────

#[test]
fn file_based_definitions_land_in_their_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = format!("{CONFIG}file_based:\n  enabled: true\n  directory: defs\n");
    let compiled = compiler(dir.path(), &config).compile().expect("compile");

    let out = dir.path().join("generated");
    let written = loader::write_artifacts(&compiled, &out).expect("write");
    assert!(written.contains(&out.join("defs/app__InMemoryRepository.rs")));
    assert!(out.join("defs/app__Service.rs").is_file());

    let main = std::fs::read_to_string(out.join("container.rs")).expect("main");
    assert!(main.contains("include!(\"defs/app__Service.rs\")"));
    let service = std::fs::read_to_string(out.join("defs/app__Service.rs")).expect("service");
    assert!(service.contains("include!(\"app__InMemoryRepository.rs\")"));
}

// ── Context-dependent bindings ──────────────────────────────────

#[test]
fn context_dependent_binding_without_default_fails_for_unlisted_consumer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CONFIG.replace("      default: app::FileLogger\n", "");
    let err = compiler(dir.path(), &config).compile().unwrap_err();
    match err {
        IronwireError::ContextDependentLookup { id, consumer } => {
            assert_eq!(id, "app::LoggerInterface");
            assert_eq!(consumer.as_deref(), Some("app::Service"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn each_consumer_gets_its_branch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CONFIG.replace(
        "  - class: app::Service\n",
        "  - class: app::Service\n  - class: app::Worker\n",
    );
    let compiled = compiler(dir.path(), &config).compile().expect("compile");
    let source = &compiled.main.source;
    assert!(source.contains("app::Worker::new(self.app__NullLogger"));
    assert!(source.contains("self.app__FileLogger()"));
}

// ── Planning ────────────────────────────────────────────────────

#[test]
fn plan_matches_the_emitted_factories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan = compiler(dir.path(), CONFIG).plan().expect("plan");
    assert_eq!(plan.entry_points().count(), 1);
    assert!(plan.entries.iter().any(|e| e.factory == "app__InMemoryRepository" && e.cached));
}
