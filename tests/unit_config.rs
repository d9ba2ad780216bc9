use std::fs;

use sitracker::config::{Backend, Config, CONFIG_FILE};

#[test]
fn config_defaults_when_missing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = Config::resolve(None, dir.path())?;

    assert_eq!(config.issues.id_prefix, "AD");
    assert_eq!(config.store.backend, Backend::File);
    assert_eq!(config.store.document_id, "issues");
    assert_eq!(config.store.sheet_name, "Issues");
    assert_eq!(config.store.dir, dir.path().join(".sitracker"));
    Ok(())
}

#[test]
fn config_overrides_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let toml = r#"
[issues]
id_prefix = "BUG"

[store]
document_id = "backlog"
sheet_name = "Open Work"
dir = "/var/lib/sitracker"
"#;
    fs::write(dir.path().join(CONFIG_FILE), toml)?;

    let config = Config::resolve(None, dir.path())?;

    assert_eq!(config.issues.id_prefix, "BUG");
    assert_eq!(config.store.document_id, "backlog");
    assert_eq!(config.store.sheet_name, "Open Work");
    assert_eq!(config.store.dir, std::path::PathBuf::from("/var/lib/sitracker"));
    assert_eq!(config.store.timeout_secs, 30);
    Ok(())
}

#[test]
fn explicit_path_wins_over_working_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(CONFIG_FILE), "[issues]\nid_prefix = \"CWD\"\n")?;
    let other = dir.path().join("other.toml");
    fs::write(&other, "[issues]\nid_prefix = \"EXPLICIT\"\n")?;

    let config = Config::resolve(Some(&other), dir.path())?;
    assert_eq!(config.issues.id_prefix, "EXPLICIT");
    Ok(())
}

#[test]
fn unknown_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(CONFIG_FILE),
        "[issues]\nid_prefix = \"AD\"\nlegacy = true\n",
    )?;
    let config = Config::resolve(None, dir.path())?;
    assert_eq!(config.issues.id_prefix, "AD");
    Ok(())
}
