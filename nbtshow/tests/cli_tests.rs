//! Integration tests for the nbtshow binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use nbtview_core::{write_to_file, Compound, Compression, List, NamedTag, Tag};
use nbtview_region::{ChunkCompression, RegionWriter};
use predicates::prelude::*;
use tempfile::TempDir;

/// Isolated environment with its own config directory
struct TestContext {
    root: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn config_path(&self) -> PathBuf {
        self.path("config/cli.toml")
    }

    /// Build a command for the compiled binary, isolated from the user's settings
    fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("nbtshow").expect("Failed to locate nbtshow binary");
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("NBTVIEW_FORMAT")
            .env_remove("NBTVIEW_PRETTY")
            .env_remove("NBTVIEW_INDENT")
            .env_remove("NBTVIEW_MAX_DEPTH")
            .env_remove("NBTVIEW_VERBOSE")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    fn write_level(&self, name: &str, compression: Compression) -> PathBuf {
        let path = self.path(name);
        write_to_file(&path, &level_doc(), compression).expect("Failed to write NBT fixture");
        path
    }

    fn write_region(&self, name: &str) -> PathBuf {
        let mut writer = RegionWriter::new();
        writer.insert(0, &chunk_doc(0, 0), 1_600_000_000).unwrap();
        writer.insert(33, &chunk_doc(1, 1), 1_600_000_060).unwrap();
        let path = self.path(name);
        std::fs::write(&path, writer.to_bytes().unwrap()).unwrap();
        path
    }

    fn write_damaged_region(&self, name: &str) -> PathBuf {
        let mut writer = RegionWriter::new();
        writer.insert(0, &chunk_doc(0, 0), 0).unwrap();
        writer
            .insert_raw(2, ChunkCompression::Zlib, &[0x78, 0x9c, 0xff, 0xff, 0xff], 0)
            .unwrap();
        let path = self.path(name);
        std::fs::write(&path, writer.to_bytes().unwrap()).unwrap();
        path
    }
}

fn level_doc() -> NamedTag {
    let mut player = Compound::new();
    player.insert("xPos", -7i32);
    player.insert("Seed", 8_000_000_000i64);
    player.insert(
        "Pos",
        List::from_tags(vec![Tag::Double(0.5), Tag::Double(64.0)]).unwrap(),
    );
    let mut root = Compound::new();
    root.insert("name", "Bananrama");
    root.insert("Player", player);
    NamedTag::new("hello world", root)
}

fn chunk_doc(x: i32, z: i32) -> NamedTag {
    let mut level = Compound::new();
    level.insert("xPos", x);
    level.insert("zPos", z);
    let mut root = Compound::new();
    root.insert("Level", level);
    NamedTag::new("", root)
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn test_show_uncompressed_and_gzip() {
    let ctx = TestContext::new();
    for (name, scheme) in [
        ("plain.nbt", Compression::None),
        ("level.dat", Compression::Gzip),
        ("zlib.nbt", Compression::Zlib),
    ] {
        let file = ctx.write_level(name, scheme);
        ctx.cli()
            .args(["show", arg(&file)])
            .assert()
            .success()
            .stdout(predicate::str::contains("root_name: hello world"))
            .stdout(predicate::str::contains(
                "root_tag: {Player:{Pos:[0.5d,64d],Seed:8000000000L,xPos:-7},name:\"Bananrama\"}",
            ));
    }
}

#[test]
fn test_show_json_and_yaml() {
    let ctx = TestContext::new();
    let file = ctx.write_level("level.dat", Compression::Gzip);

    let output = ctx
        .cli()
        .args(["show", arg(&file), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "hello world");
    assert_eq!(value["tag"]["Player"]["xPos"], -7);

    ctx.cli()
        .args(["--format", "yaml", "show", arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: hello world"));
}

#[test]
fn test_show_pretty() {
    let ctx = TestContext::new();
    let file = ctx.write_level("level.dat", Compression::None);
    ctx.cli()
        .args(["show", arg(&file), "--pretty", "--indent", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("root_tag: {\n    Player: {\n        Pos: ["));
}

#[test]
fn test_get_path() {
    let ctx = TestContext::new();
    let file = ctx.write_level("level.dat", Compression::Gzip);
    ctx.cli()
        .args(["get", arg(&file), "Player/Pos/1"])
        .assert()
        .success()
        .stdout("64d\n");

    ctx.cli()
        .args(["get", arg(&file), "Player/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: No tag at path 'Player/missing'"));
}

#[test]
fn test_find_int_and_long() {
    let ctx = TestContext::new();
    let file = ctx.write_level("level.dat", Compression::Gzip);
    let raw = nbtview_core::to_bytes(&level_doc()).unwrap();
    let (offset, _) = nbtview_core::fast_find_int(&raw, "xPos").unwrap();

    ctx.cli()
        .args(["find", arg(&file), "xPos"])
        .assert()
        .success()
        .stdout(format!("Found 'xPos' = -7 at {}\n", offset));

    ctx.cli()
        .args(["find", arg(&file), "Seed", "--type", "long"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 'Seed' = 8000000000 at"));

    ctx.cli()
        .args(["find", arg(&file), "Seed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Int tag named 'Seed' found"));
}

#[test]
fn test_region_info() {
    let ctx = TestContext::new();
    let file = ctx.write_region("r.0.0.mca");
    ctx.cli()
        .args(["region", "info", arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 chunks present"))
        .stdout(predicate::str::contains("2020-09-13 12:27:40 UTC"));

    let output = ctx
        .cli()
        .args(["region", "info", arg(&file), "-f", "json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[1]["index"], 33);
    assert_eq!(value[1]["x"], 1);
    assert_eq!(value[1]["z"], 1);
}

#[test]
fn test_region_chunk_by_index_and_coordinates() {
    let ctx = TestContext::new();
    let file = ctx.write_region("r.0.0.mca");
    let expected = "root_tag: {Level:{xPos:1,zPos:1}}";

    ctx.cli()
        .args(["region", "chunk", arg(&file), "33"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));

    // World coordinates of a chunk in region (-1, -1) map to the same slot
    ctx.cli()
        .args(["region", "chunk", arg(&file), "--x", "-31", "--z", "-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));

    ctx.cli()
        .args(["region", "chunk", arg(&file), "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chunk 5 is not present"));

    ctx.cli()
        .args(["region", "chunk", arg(&file), "1024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chunk index out of range: 1024"));
}

#[test]
fn test_region_check() {
    let ctx = TestContext::new();
    let good = ctx.write_region("r.0.0.mca");
    ctx.cli()
        .args(["region", "check", arg(&good)])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 ok, 0 failed"));

    let bad = ctx.write_damaged_region("r.1.0.mca");
    ctx.cli()
        .args(["region", "check", arg(&bad)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 ok, 1 failed"))
        .stderr(predicate::str::contains("1 of 2 chunks failed to decode"));
}

#[test]
fn test_missing_file_reports_error() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["show", "does-not-exist.nbt"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: Failed to read"));
}

#[test]
fn test_config_set_show_reset() {
    let ctx = TestContext::new();

    ctx.cli()
        .args(["config", "set", "output_format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set output_format = yaml"));
    let saved = std::fs::read_to_string(ctx.config_path()).unwrap();
    assert!(saved.contains("output_format = \"yaml\""));

    // The saved format now applies to every command
    let file = ctx.write_level("level.dat", Compression::None);
    ctx.cli()
        .args(["get", arg(&file), "name"])
        .assert()
        .success()
        .stdout("Bananrama\n");

    ctx.cli()
        .args(["config", "set", "indent", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid indent value"));

    ctx.cli()
        .args(["config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration reset to defaults"));

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output Format"))
        .stdout(predicate::str::contains("snbt"));
}

#[test]
fn test_env_overrides_config_file() {
    let ctx = TestContext::new();
    let file = ctx.write_level("level.dat", Compression::None);
    std::fs::create_dir_all(ctx.path("config")).unwrap();
    std::fs::write(ctx.config_path(), "output_format = \"yaml\"\n").unwrap();

    ctx.cli()
        .env("NBTVIEW_FORMAT", "json")
        .args(["get", arg(&file), "name"])
        .assert()
        .success()
        .stdout("\"Bananrama\"\n");

    // --no-config skips the file entirely
    ctx.cli()
        .args(["--no-config", "get", arg(&file), "name"])
        .assert()
        .success()
        .stdout("\"Bananrama\"\n");
}

#[test]
fn test_invalid_config_file_is_reported() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.path("config")).unwrap();
    std::fs::write(ctx.config_path(), "output_format = \"table\"\n").unwrap();

    ctx.cli()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("nbtshow config reset"));

    // Rewriting the file works even though it cannot be loaded
    ctx.cli()
        .args(["config", "set", "output_format", "json"])
        .assert()
        .success();
    ctx.cli().args(["config", "show"]).assert().success();

    std::fs::write(ctx.config_path(), "indent = 99\n").unwrap();
    ctx.cli().args(["config", "show"]).assert().failure();
    ctx.cli()
        .args(["config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration reset to defaults"));
    ctx.cli()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snbt"));
}

#[test]
fn test_deeply_nested_file() {
    let ctx = TestContext::new();
    let levels = 1024;
    let mut data = vec![0x0a, 0x00, 0x00];
    for _ in 1..levels {
        data.extend_from_slice(&[0x0a, 0x00, 0x00]);
    }
    data.extend(std::iter::repeat(0x00).take(levels));
    let file = ctx.path("deep.nbt");
    std::fs::write(&file, &data).unwrap();

    ctx.cli()
        .args(["show", arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nesting depth limit of 512 exceeded"));

    ctx.cli()
        .args(["--max-depth", "1024", "show", arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("root_tag: {\"\":{\"\":{"));

    ctx.cli()
        .args(["--max-depth", "4096", "show", arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth must be less than or equal to 1024"));
}

#[test]
fn test_completion_script() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nbtshow"));
}
