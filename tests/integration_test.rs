use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use filecollect::{
    CollectError, FileCollector, MissingPath, TagFilter, TagOptions, YamlParser,
};
use serde_yaml::Value;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const SMOKE_YAML: &str = "- meta:\n    tags: ['smoke']\n";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a temporary directory tree for testing.
///
/// Structure:
/// ```text
/// tmp/
///   firstfile.yaml      plain text
///   mydir/
///     secondfile.yml    tagged smoke
///     thirdfile.txt
/// ```
fn setup_test_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("firstfile.yaml"), "temp file 1 for testing").unwrap();

    let sub = root.join("mydir");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("secondfile.yml"), SMOKE_YAML).unwrap();
    fs::write(sub.join("thirdfile.txt"), "temp file 3 for testing").unwrap();

    dir
}

/// A wider tree for ordering and completeness checks.
fn setup_wide_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for (rel, body) in [
        ("b.yaml", SMOKE_YAML),
        ("a.yml", "[]"),
        ("notes.md", "# notes"),
        ("UPPER.YAML", SMOKE_YAML),
        ("alpha/one.yaml", SMOKE_YAML),
        ("alpha/deep/two.yml", "- meta:\n    tags: [nightly]\n"),
        ("alpha/deep/skip.json", "{}"),
        ("beta/three.yaml", "- step: run\n"),
        (".hidden/four.yaml", SMOKE_YAML),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    dir
}

fn yaml_collector(
    paths: &[&Path],
    options: TagOptions,
) -> FileCollector<Value, TagOptions> {
    FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths(paths.iter().copied())
        .parser(YamlParser)
        .filter(TagFilter)
        .options(options)
        .build()
        .unwrap()
}

fn names(collector: &FileCollector<Value, TagOptions>) -> Vec<String> {
    collector.results().iter().map(|f| f.base_name()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn collects_matching_files_in_walk_order() {
    init_tracing();
    let dir = setup_test_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .build()
        .unwrap();

    collector.iterate().unwrap();
    let results = collector.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].base_name(), "firstfile.yaml");
    assert_eq!(results[1].base_name(), "secondfile.yml");
    assert_eq!(results[1].dir_name(), dir.path().join("mydir"));
}

#[test]
fn unfiltered_options_keep_every_match() {
    let dir = setup_test_dir();
    let mut collector = yaml_collector(&[dir.path()], TagOptions::unfiltered());

    collector.iterate().unwrap();
    assert_eq!(names(&collector), ["firstfile.yaml", "secondfile.yml"]);
}

#[test]
fn tag_filter_keeps_tagged_files() {
    let dir = setup_test_dir();
    let mut collector = yaml_collector(&[dir.path()], TagOptions::tags(["smoke"]));

    collector.iterate().unwrap();
    assert_eq!(names(&collector), ["secondfile.yml"]);

    let parsed = collector.results()[0].parsed().unwrap().unwrap();
    assert_eq!(parsed, &serde_yaml::from_str::<Value>(SMOKE_YAML).unwrap());
}

#[test]
fn unknown_tag_keeps_nothing() {
    let dir = setup_test_dir();
    let mut collector =
        yaml_collector(&[dir.path()], TagOptions::tags(["temp file 3 for testing"]));

    assert!(collector.iterate().unwrap().is_empty());
}

#[test]
fn mixed_directory_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let d = dir.path().join("d");
    fs::create_dir(&d).unwrap();
    fs::write(d.join("x.yaml"), "- meta:\n    tags: [\"smoke\"]\n").unwrap();
    fs::write(d.join("y.txt"), "- meta:\n    tags: [\"smoke\"]\n").unwrap();
    fs::write(d.join("z.yml"), "[]").unwrap();

    let mut collector = yaml_collector(&[d.as_path()], TagOptions::tags(["smoke"]));
    let results = collector.iterate().unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path(), d.join("x.yaml"));
}

#[test]
fn single_file_root_bypasses_matching_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.yaml");
    fs::write(&file, "- meta:\n    tags: [other]\n").unwrap();

    let mut collector = FileCollector::builder()
        .extensions(["*.nothing"])
        .paths([&file])
        .parser(YamlParser)
        .filter(|_: Option<&Value>, _: &TagOptions| false)
        .options(TagOptions::tags(["smoke"]))
        .build()
        .unwrap();

    let results = collector.iterate().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path(), file);
    assert_eq!(results[0].raw_content().unwrap(), "- meta:\n    tags: [other]\n");
}

#[test]
fn roots_are_processed_in_order() {
    let dir = setup_test_dir();
    let extra = tempfile::tempdir().unwrap();
    let file = extra.path().join("explicit.txt");
    fs::write(&file, "x").unwrap();

    let mut collector = yaml_collector(&[file.as_path(), dir.path()], TagOptions::unfiltered());
    collector.iterate().unwrap();
    assert_eq!(
        names(&collector),
        ["explicit.txt", "firstfile.yaml", "secondfile.yml"]
    );
}

#[test]
fn missing_root_is_skipped_by_default() {
    let dir = setup_test_dir();
    let missing = dir.path().join("nope");

    let mut collector = yaml_collector(&[missing.as_path(), dir.path()], TagOptions::unfiltered());
    assert_eq!(collector.iterate().unwrap().len(), 2);
}

#[test]
fn missing_root_can_be_an_error() {
    let dir = setup_test_dir();
    let missing = dir.path().join("nope");

    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml"])
        .paths([missing.clone()])
        .missing_paths(MissingPath::Error)
        .build()
        .unwrap();

    let err = collector.iterate().unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(missing.as_path()));
}

#[test]
fn parse_error_surfaces_before_filtering() {
    let dir = setup_test_dir();
    fs::write(dir.path().join("broken.yaml"), "key: [unclosed").unwrap();

    // The filter would reject everything, but parsing runs first.
    let mut collector = yaml_collector(&[dir.path()], TagOptions::tags(["never"]));
    let err = collector.iterate().unwrap_err();

    assert!(matches!(err, CollectError::Parse { .. }));
    assert!(err.path().unwrap().ends_with("broken.yaml"));
    assert!(collector.results().is_empty());
}

#[test]
fn closure_predicate_sees_options() {
    let dir = setup_wide_dir();
    let mut collector = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .parser(YamlParser)
        .filter(|parsed: Option<&Value>, min: &usize| {
            parsed
                .and_then(Value::as_sequence)
                .is_some_and(|records| records.len() >= *min)
        })
        .options(1_usize)
        .build()
        .unwrap();

    let found: BTreeSet<String> = collector
        .iterate()
        .unwrap()
        .iter()
        .map(|f| f.base_name())
        .collect();

    // a.yml is an empty list and is rejected; everything else has a record.
    assert!(!found.contains("a.yml"));
    assert!(found.contains("three.yaml"));
    assert_eq!(found.len(), 5);
}

#[test]
fn every_matching_file_appears_exactly_once() {
    let dir = setup_wide_dir();
    #[cfg(unix)]
    std::os::unix::fs::symlink(dir.path().join("b.yaml"), dir.path().join("beta/alias.yaml"))
        .unwrap();

    let mut collector = yaml_collector(&[dir.path()], TagOptions::unfiltered());
    collector.iterate().unwrap();

    let collected: Vec<PathBuf> = collector
        .results()
        .iter()
        .map(|f| f.path().to_path_buf())
        .collect();
    let unique: BTreeSet<PathBuf> = collected.iter().cloned().collect();
    assert_eq!(unique.len(), collected.len(), "no file collected twice");

    // Independent walk as the oracle.
    let expected: BTreeSet<PathBuf> = walkdir::WalkDir::new(dir.path())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.ends_with(".yaml") || name.ends_with(".yml")
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    assert_eq!(unique, expected);
}

#[test]
fn sequential_order_is_files_then_subdirectories() {
    let dir = setup_wide_dir();
    let mut collector = yaml_collector(&[dir.path()], TagOptions::unfiltered());
    collector.iterate().unwrap();

    let rel: Vec<PathBuf> = collector
        .results()
        .iter()
        .map(|f| f.path().strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();

    // Lowercase patterns do not match UPPER.YAML.
    let expected: Vec<PathBuf> = [
        "a.yml",
        "b.yaml",
        ".hidden/four.yaml",
        "alpha/one.yaml",
        "alpha/deep/two.yml",
        "beta/three.yaml",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(rel, expected);
}

#[test]
fn parallel_walk_finds_the_same_files_sorted_by_path() {
    let dir = setup_wide_dir();

    let mut sequential = yaml_collector(&[dir.path()], TagOptions::tags(["smoke"]));
    sequential.iterate().unwrap();

    let mut parallel = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .parser(YamlParser)
        .filter(TagFilter)
        .options(TagOptions::tags(["smoke"]))
        .threads(4)
        .build()
        .unwrap();
    parallel.iterate().unwrap();

    let par: Vec<&Path> = parallel.results().iter().map(|f| f.path()).collect();
    let mut sorted = par.clone();
    sorted.sort();
    assert_eq!(par, sorted);

    let seq: BTreeSet<&Path> = sequential.results().iter().map(|f| f.path()).collect();
    assert_eq!(par.into_iter().collect::<BTreeSet<_>>(), seq);
    assert_eq!(parallel.stats().accepted, 3);
}

#[test]
fn parallel_walk_propagates_parse_errors() {
    let dir = setup_wide_dir();
    fs::write(dir.path().join("alpha/broken.yml"), "key: [unclosed").unwrap();

    let mut collector = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .parser(YamlParser)
        .filter(TagFilter)
        .options(TagOptions::unfiltered())
        .threads(3)
        .build()
        .unwrap();

    let err = collector.iterate().unwrap_err();
    assert!(matches!(err, CollectError::Parse { .. }));
}

#[test]
fn max_depth_limits_the_walk() {
    let dir = setup_wide_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .max_depth(1)
        .build()
        .unwrap();

    let found: BTreeSet<String> = collector
        .iterate()
        .unwrap()
        .iter()
        .map(|f| f.base_name())
        .collect();
    assert_eq!(found, BTreeSet::from(["a.yml".to_string(), "b.yaml".to_string()]));
}

#[test]
fn content_stays_lazy_without_a_parser() {
    let dir = setup_test_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml", "*.yml"])
        .paths([dir.path()])
        .build()
        .unwrap();

    let results = collector.iterate().unwrap();
    assert!(results.iter().all(|f| !f.is_loaded()));
    assert_eq!(results[0].raw_content().unwrap(), "temp file 1 for testing");
    assert!(results[0].is_loaded());
}

#[test]
fn stats_count_the_walk() {
    let dir = setup_test_dir();
    let mut collector = yaml_collector(&[dir.path()], TagOptions::tags(["smoke"]));
    collector.iterate().unwrap();

    let stats = collector.stats();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.dirs, 1);
    assert_eq!(stats.matched, 2);
    assert_eq!(stats.accepted, 1);
}

#[test]
fn invalid_pattern_fails_at_build() {
    let result: filecollect::Result<FileCollector> = FileCollector::builder()
        .extensions(["*.[yaml"])
        .paths(["."])
        .build();
    assert!(matches!(result, Err(CollectError::InvalidPattern { .. })));
}

#[cfg(unix)]
#[test]
fn symlinked_files_are_collected_without_following_links() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("plain.yaml"), SMOKE_YAML).unwrap();
    let store = root.join("store");
    fs::create_dir(&store).unwrap();
    fs::write(store.join("target.txt"), SMOKE_YAML).unwrap();
    fs::write(store.join("nested.yaml"), SMOKE_YAML).unwrap();
    symlink(store.join("target.txt"), root.join("linked.yaml")).unwrap();
    symlink(&store, root.join("linked_dir")).unwrap();

    let mut collector = yaml_collector(&[root], TagOptions::tags(["smoke"]));
    collector.iterate().unwrap();

    let found = names(&collector);
    assert_eq!(found, ["linked.yaml", "plain.yaml", "nested.yaml"]);

    let linked = &collector.results()[0];
    assert_eq!(linked.path(), root.join("linked.yaml"));
    assert_eq!(linked.raw_content().unwrap(), SMOKE_YAML);
}

#[cfg(unix)]
fn setup_loop_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("top.yaml"), SMOKE_YAML).unwrap();
    fs::write(sub.join("inner.yaml"), SMOKE_YAML).unwrap();
    std::os::unix::fs::symlink(dir.path(), sub.join("back")).unwrap();
    dir
}

#[cfg(unix)]
#[test]
fn symlink_loop_fails_the_walk() {
    let dir = setup_loop_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml"])
        .paths([dir.path()])
        .follow_links(true)
        .build()
        .unwrap();

    let err = collector.iterate().unwrap_err();
    assert!(matches!(err, CollectError::SymlinkLoop(_)), "got {err:?}");
    assert!(collector.results().is_empty());
}

#[cfg(unix)]
#[test]
fn symlink_loop_fails_the_parallel_walk() {
    let dir = setup_loop_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml"])
        .paths([dir.path()])
        .follow_links(true)
        .threads(4)
        .build()
        .unwrap();

    let err = collector.iterate().unwrap_err();
    assert!(matches!(err, CollectError::SymlinkLoop(_)), "got {err:?}");
    assert!(collector.results().is_empty());
}

#[cfg(unix)]
#[test]
fn symlink_loop_is_ignored_without_following_links() {
    let dir = setup_loop_dir();
    let mut collector: FileCollector = FileCollector::builder()
        .extensions(["*.yaml"])
        .paths([dir.path()])
        .build()
        .unwrap();

    assert_eq!(collector.iterate().unwrap().len(), 2);
}
