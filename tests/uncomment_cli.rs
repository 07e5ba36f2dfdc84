use std::error::Error;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

const PY_SRC: &str = "x = 1  # set x\n# comment\ny = \"val#1\"\n";
const PY_CLEAN: &str = "x = 1\n\ny = \"val#1\"\n";

#[test]
fn rewrites_file_in_place_and_keeps_backup() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("app.py");
    f.write_str(PY_SRC)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("app.py")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 file(s) successfully"));

    f.assert(PY_CLEAN);
    temp.child("app.py.bak").assert(PY_SRC);

    Ok(())
}

#[test]
fn no_backup_flag_skips_bak_file() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("app.py");
    f.write_str(PY_SRC)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("app.py")
        .arg("--no-backup")
        .assert()
        .success();

    f.assert(PY_CLEAN);
    temp.child("app.py.bak").assert(predicate::path::missing());

    Ok(())
}

#[test]
fn output_file_leaves_input_untouched() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let src = "const s = \"// keep\"; // drop\n/* block\n comment */\nrun(s);\n";
    temp.child("script.js").write_str(src)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("script.js")
        .arg("-o")
        .arg("clean.js")
        .assert()
        .success();

    temp.child("script.js").assert(src);
    temp.child("clean.js").assert("const s = \"// keep\";\n\nrun(s);\n");
    temp.child("script.js.bak").assert(predicate::path::missing());

    Ok(())
}

#[test]
fn unsupported_extension_fails_and_leaves_file_alone() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("notes.txt");
    f.write_str("# not touched\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("notes.txt")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported file type"));

    f.assert("# not touched\n");
    temp.child("notes.txt.bak").assert(predicate::path::missing());

    Ok(())
}

#[test]
fn missing_input_is_an_error() -> TestResult {
    let temp = assert_fs::TempDir::new()?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("nope.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid file or directory"));

    Ok(())
}

#[test]
fn preserve_whitespace_keeps_blank_lines() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("run.sh");
    f.write_str("# header\n\n\n\necho hi # greet\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("run.sh")
        .arg("--no-backup")
        .arg("--preserve-whitespace")
        .assert()
        .success();

    f.assert("\n\n\n\necho hi\n");

    Ok(())
}

#[test]
fn directory_is_mirrored_into_output_dir() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let src = temp.child("src");
    src.create_dir_all()?;
    src.child("a.js").write_str("a(); // one\n")?;
    src.child("nested").create_dir_all()?;
    src.child("nested/b.sql")
        .write_str("SELECT '--x' -- why\nFROM t; /* done */\n")?;
    src.child("README.md").write_str("# title\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("src")
        .arg("-r")
        .arg("-o")
        .arg("out")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 file(s) successfully"));

    temp.child("out/a.js").assert("a();\n");
    temp.child("out/nested/b.sql").assert("SELECT '--x'\nFROM t; \n");
    temp.child("out/README.md").assert(predicate::path::missing());
    src.child("a.js").assert("a(); // one\n");

    Ok(())
}

#[test]
fn directory_without_recursive_stays_at_top_level() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("top.rb").write_str("puts 1 # one\n")?;
    temp.child("deep").create_dir_all()?;
    temp.child("deep/inner.rb").write_str("puts 2 # two\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg(".")
        .arg("--no-backup")
        .assert()
        .success();

    temp.child("top.rb").assert("puts 1\n");
    temp.child("deep/inner.rb").assert("puts 2 # two\n");

    Ok(())
}

#[test]
fn respects_gitignore_and_exclude_globs() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child(".gitignore").write_str("ignored.py\n")?;
    temp.child("ignored.py").write_str("a = 1 # keep\n")?;
    temp.child("vendor").create_dir_all()?;
    temp.child("vendor/lib.py").write_str("b = 2 # keep\n")?;
    temp.child("main.py").write_str("c = 3 # drop\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg(".")
        .arg("-r")
        .arg("--no-backup")
        .arg("--exclude")
        .arg("vendor/**")
        .assert()
        .success();

    temp.child("main.py").assert("c = 3\n");
    temp.child("ignored.py").assert("a = 1 # keep\n");
    temp.child("vendor/lib.py").assert("b = 2 # keep\n");

    Ok(())
}

#[test]
fn dotfiles_and_dot_directories_are_processed() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child(".eslintrc.js").write_str("a(); // x\n")?;
    temp.child(".config").create_dir_all()?;
    temp.child(".config/s.sh").write_str("echo 1 # x\n")?;
    temp.child(".git").create_dir_all()?;
    temp.child(".git/hook.sh").write_str("echo 2 # keep\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg(".")
        .arg("-r")
        .arg("--no-backup")
        .arg("--no-gitignore")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 file(s) successfully"));

    temp.child(".eslintrc.js").assert("a();\n");
    temp.child(".config/s.sh").assert("echo 1\n");
    temp.child(".git/hook.sh").assert("echo 2 # keep\n");

    Ok(())
}

#[test]
fn max_bytes_skips_large_files() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let content = "x = 1 # c\n".repeat(10);
    temp.child("big.py").write_str(&content)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg(".")
        .arg("--max-bytes")
        .arg("50")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping big.py"));

    temp.child("big.py").assert(predicate::str::contains("# c"));

    Ok(())
}

#[test]
fn json_report_lists_processed_files() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("app.py").write_str(PY_SRC)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg(".")
        .arg("--json")
        .arg("--no-backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"app.py\""))
        .stdout(predicate::str::contains("\"language\": \"python\""))
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("Processed").not());

    Ok(())
}

#[test]
fn failed_backup_is_only_a_warning() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    let f = temp.child("app.py");
    f.write_str(PY_SRC)?;
    // A directory in the way makes the backup copy fail.
    temp.child("app.py.bak").create_dir_all()?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("app.py")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not create backup"));

    f.assert(PY_CLEAN);

    Ok(())
}

#[test]
fn rules_file_adds_languages() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("rules.json").write_str(
        r#"[{"id": "ini", "extensions": ["ini"], "single_line": [";"],
             "string_delimiters": ["\""]}]"#,
    )?;
    let f = temp.child("app.ini");
    f.write_str("; header\nname = \"a;b\" ; trailing\n")?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("app.ini")
        .arg("--rules")
        .arg("rules.json")
        .arg("--no-backup")
        .assert()
        .success();

    f.assert("name = \"a;b\"\n");

    Ok(())
}

#[test]
fn invalid_rules_file_is_reported() -> TestResult {
    let temp = assert_fs::TempDir::new()?;
    temp.child("rules.json").write_str("{not json")?;
    temp.child("app.py").write_str(PY_SRC)?;

    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.current_dir(&temp)
        .arg("app.py")
        .arg("--rules")
        .arg("rules.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load rules"));

    temp.child("app.py").assert(PY_SRC);

    Ok(())
}

#[test]
fn list_languages_needs_no_input() -> TestResult {
    let mut cmd = cargo_bin_cmd!("uncomment");
    cmd.arg("--list-languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("py, pyw"))
        .stdout(predicate::str::contains("html_xml"));

    Ok(())
}
