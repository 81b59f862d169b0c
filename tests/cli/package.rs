//! `ycfn package` tests.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_package_writes_zip() {
    let t = Test::with_files(SOURCE_TREE);
    let output = t.package(
        &["--source-root", "src", "--include", "func.js", "--include", "foo"],
        "out.zip",
    );

    assert_success(&output);
    assert_stdout_contains(&output, "wrote");
    let bytes = read_zip(&t.dir.path().join("out.zip"));
    assert_eq!(
        zip_names(&bytes),
        vec!["func.js", "foo/1.txt", "foo/2.txt", "foo/bar/3.txt", "foo/bar/util.js"]
    );
}

#[test]
fn test_package_reads_action_inputs() {
    let t = Test::with_files(SOURCE_TREE);
    let output = t
        .cmd()
        .env("INPUT_SOURCE-ROOT", "./src/")
        .env("INPUT_INCLUDE", "func.js\nfoo/1.txt\n")
        .args(["package", "--output"])
        .arg(t.dir.path().join("action.zip"))
        .arg("--workspace")
        .arg(t.dir.path())
        .output()
        .unwrap();

    assert_success(&output);
    let bytes = read_zip(&t.dir.path().join("action.zip"));
    assert_eq!(zip_names(&bytes), vec!["func.js", "foo/1.txt"]);
}

#[test]
fn test_package_with_exclusions() {
    let t = Test::with_files(SOURCE_TREE);
    let output = t.package(&["--include", "./src", "--exclude", "*.txt"], "out.zip");

    assert_success(&output);
    let bytes = read_zip(&t.dir.path().join("out.zip"));
    assert_eq!(
        sorted_zip_names(&bytes),
        vec!["src/foo/bar/util.js", "src/func.js", "src/package.json"]
    );
}

#[test]
fn test_package_lists_entries() {
    let t = Test::with_files(SOURCE_TREE);
    t.cmd()
        .arg("package")
        .arg("--workspace")
        .arg(t.dir.path())
        .args(["--source-root", "src", "--include", "*.js", "--list", "-o"])
        .arg(t.dir.path().join("out.zip"))
        .assert()
        .success()
        .stdout(predicate::str::contains("func.js"))
        .stdout(predicate::str::contains("foo/bar/util.js").not())
        .stdout(predicate::str::contains("sha256"));
}

#[test]
fn test_package_from_config_file() {
    let t = Test::with_files(SOURCE_TREE);
    t.write(
        "ycfn.toml",
        "source-root = \"src\"\ninclude = [\"package.json\", \"foo/bar\"]\n",
    );
    let output = t.package(&["--config", "ycfn.toml"], "out.zip");

    assert_success(&output);
    let bytes = read_zip(&t.dir.path().join("out.zip"));
    assert_eq!(
        zip_names(&bytes),
        vec!["package.json", "foo/bar/3.txt", "foo/bar/util.js"]
    );
}

#[test]
fn test_package_rejects_bad_pattern() {
    let t = Test::with_files(SOURCE_TREE);
    t.cmd()
        .arg("package")
        .arg("--workspace")
        .arg(t.dir.path())
        .args(["--include", "src", "--exclude", "[oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid glob pattern '[oops'"));
}
