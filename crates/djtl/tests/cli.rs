use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

fn djtl_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_djtl"))
}

fn djtl(dir: &Path, args: &[&str]) -> Output {
    Command::new(djtl_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn describe(output: &Output) -> String {
    format!(
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    )
}

#[test]
fn render_with_context_file_and_vars() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("page.html"),
        "{% for x in items reversed %}{{ x }}{% empty %}none{% endfor %}|{% if flag %}on{% else %}off{% endif %}",
    )
    .unwrap();
    std::fs::write(dir.path().join("ctx.json"), r#"{"items": [1, 2, 3]}"#).unwrap();

    let output = djtl(
        dir.path(),
        &["render", "page.html", "--context", "ctx.json", "--var", "flag=true"],
    );

    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "321|on");
}

#[test]
fn render_uses_project_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("djtl.toml"), "string_if_invalid = \"??\"\n").unwrap();
    std::fs::write(dir.path().join("page.html"), "[{{ missing }}]").unwrap();

    let output = djtl(dir.path(), &["render", "page.html"]);

    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "[??]");
}

#[test]
fn render_syntax_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("page.html"), "{% if a and b or c %}{% endif %}").unwrap();

    let output = djtl(dir.path(), &["render", "page.html"]);

    assert!(!output.status.success(), "{}", describe(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("can't mix 'and' and 'or'"));
}

#[test]
fn check_clean_templates_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(
        templates.join("good.html"),
        "{% for x in xs %}{% if x %}{{ x }}{% endif %}{% endfor %}",
    )
    .unwrap();

    let output = djtl(dir.path(), &["check", "templates"]);

    assert!(output.status.success(), "{}", describe(&output));
    assert!(output.stdout.is_empty());
}

#[test]
fn check_broken_template_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("good.html"), "{% if a %}{% endif %}").unwrap();
    std::fs::write(templates.join("bad.html"), "{% for x in xs %}").unwrap();

    let output = djtl(dir.path(), &["check", "templates"]);

    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bad.html"), "{stdout}");
    assert!(!stdout.contains("good.html"), "{stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Found errors in 1 of 2 files."));
}

#[test]
fn check_quiet_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.html"), "{% bogus %}").unwrap();

    let output = djtl(dir.path(), &["check", "-q", "bad.html"]);

    assert_eq!(output.status.code(), Some(1), "{}", describe(&output));
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}
