//! CLI integration tests for xgomod.
//!
//! Every test runs offline against a module cache and GOROOT inside a
//! temporary directory, with HOME pointed there too so no user config is
//! picked up.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temporary environment: `work/` for the module, `cache/` for the
/// module cache and `goroot/` for the standard library.
struct Env {
    tmp: TempDir,
}

impl Env {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        for dir in ["work", "cache", "goroot/src/fmt", "home"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        Env { tmp }
    }

    fn work(&self) -> std::path::PathBuf {
        self.tmp.path().join("work")
    }

    fn cache(&self) -> std::path::PathBuf {
        self.tmp.path().join("cache")
    }

    /// Get the xgomod binary command, isolated in this environment.
    fn xgomod(&self) -> Command {
        let mut cmd = Command::cargo_bin("xgomod").unwrap();
        cmd.current_dir(self.work())
            .env("HOME", self.tmp.path().join("home"))
            .env("XDG_CONFIG_HOME", self.tmp.path().join("home/.config"))
            .env("GOMODCACHE", self.cache())
            .env("GOROOT", self.tmp.path().join("goroot"))
            .env_remove("GOPATH")
            .arg("--offline");
        cmd
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.work().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.work().join(rel)).unwrap()
    }

    /// Put `module@version` into the module cache.
    fn cache_module(&self, module: &str, version: &str, gox_mod: Option<&str>) {
        let dir = self.cache().join(format!("{}@{}", module, version));
        write_module(&dir, module, gox_mod);
    }
}

fn write_module(dir: &Path, module: &str, gox_mod: Option<&str>) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("go.mod"), format!("module {}\n\ngo 1.21\n", module)).unwrap();
    if let Some(gox) = gox_mod {
        fs::write(dir.join("gox.mod"), gox).unwrap();
    }
}

const YAP_GOX: &str = "xgo 1.5\n\nproject _yap.gox App github.com/goplus/yap\n\nclass _yap.gox Handler\n";

// ============================================================================
// xgomod init
// ============================================================================

#[test]
fn test_init_creates_go_mod() {
    let env = Env::new();

    env.xgomod()
        .args(["init", "example.com/game"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let gomod = env.read("go.mod");
    assert!(gomod.contains("module example.com/game"));
    assert!(gomod.contains("go 1.18"));
    // No projects, so no classfile manifest.
    assert!(!env.work().join("gox.mod").exists());
}

#[test]
fn test_init_with_go_version_and_path() {
    let env = Env::new();

    env.xgomod()
        .args(["init", "--go", "1.21", "example.com/game", "sub"])
        .assert()
        .success();

    assert!(env.read("sub/go.mod").contains("go 1.21"));
}

#[test]
fn test_init_fails_if_go_mod_exists() {
    let env = Env::new();
    env.write("go.mod", "module example.com/old\n");

    env.xgomod()
        .args(["init", "example.com/game"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(env.read("go.mod"), "module example.com/old\n");
}

#[test]
fn test_init_rejects_malformed_path() {
    let env = Env::new();

    env.xgomod()
        .args(["init", "example.com//game"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed module path"));
}

// ============================================================================
// xgomod fmt
// ============================================================================

#[test]
fn test_fmt_check_accepts_valid_manifests() {
    let env = Env::new();
    let gox = "xgo 1.5\n\n// game\nproject .gmx Game github.com/goplus/spx math\nclass -embed .spx Sprite\n";
    env.write("go.mod", "module example.com/game\n\ngo 1.21\n");
    env.write("gox.mod", gox);

    env.xgomod().args(["fmt", "--check"]).assert().success();
    assert_eq!(env.read("gox.mod"), gox);
}

#[test]
fn test_fmt_reports_directive_errors() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");
    env.write("gox.mod", "xgo 1.5\nclass .spx Sprite\n");

    env.xgomod()
        .args(["fmt", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "work class must declare after a project definition",
        ));
}

#[test]
fn test_fmt_strict_rejects_unknown_directive() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");
    env.write("gox.mod", "xgo 1.5\nfrobnicate x\n");

    env.xgomod().args(["fmt", "--check"]).assert().success();
    env.xgomod()
        .args(["fmt", "--check", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown directive: frobnicate"));
}

#[test]
fn test_fmt_without_module() {
    let env = Env::new();

    env.xgomod()
        .arg("fmt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("go.mod file not found"))
        .stderr(predicate::str::contains("xgomod init"));
}

// ============================================================================
// xgomod kind / classes / scan
// ============================================================================

#[test]
fn test_kind_outside_module_uses_builtins() {
    let env = Env::new();

    env.xgomod()
        .args(["kind", "main.spx", "Hero.spx", "index.gmx", "foo_test.gox", "x.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main.spx\tproject"))
        .stdout(predicate::str::contains("Hero.spx\twork"))
        .stdout(predicate::str::contains("index.gmx\tproject"))
        .stdout(predicate::str::contains("foo_test.gox\twork"))
        .stdout(predicate::str::contains("x.go\t-"));
}

#[test]
fn test_classes_imports_classfile_module() {
    let env = Env::new();
    env.cache_module("github.com/goplus/yap", "v0.7.2", Some(YAP_GOX));
    env.write(
        "go.mod",
        "module example.com/web\n\ngo 1.21\n\nrequire github.com/goplus/yap v0.7.2 //xgo:class\n",
    );

    env.xgomod()
        .arg("classes")
        .assert()
        .success()
        .stdout(predicate::str::contains("_yap.gox"))
        .stdout(predicate::str::contains("github.com/goplus/yap"))
        .stdout(predicate::str::contains(".spx"));

    env.xgomod()
        .args(["kind", "main_yap.gox", "get_yap.gox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main_yap.gox\tproject"))
        .stdout(predicate::str::contains("get_yap.gox\twork"));
}

#[test]
fn test_classes_json() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");
    env.write("gox.mod", "xgo 1.5\nproject .gmx Game example.com/engine\n");

    let output = env.xgomod().args(["classes", "--json"]).output().unwrap();
    assert!(output.status.success());
    let bindings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let gmx = bindings
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["ext"] == ".gmx")
        .unwrap();
    // The module's own project overrides the built-in legacy binding.
    assert_eq!(gmx["pkg"], "example.com/engine");
}

#[test]
fn test_classes_fails_for_unrequired_import() {
    let env = Env::new();
    env.write("go.mod", "module example.com/web\n");
    env.write("gox.mod", "xgo 1.5\nimport github.com/goplus/yap\n");

    env.xgomod()
        .arg("classes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a dependency"));
}

#[test]
fn test_classes_fails_for_non_classfile_module() {
    let env = Env::new();
    env.cache_module("github.com/qiniu/x", "v1.13.0", None);
    env.write(
        "go.mod",
        "module example.com/web\n\nrequire github.com/qiniu/x v1.13.0 //xgo:class\n",
    );

    env.xgomod()
        .arg("classes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a classfile module"));
}

#[test]
fn test_scan_module() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");
    env.write("main.spx", "");
    env.write("Hero.spx", "");
    env.write("util.go", "");
    env.write("tools/build.gsh", "");

    env.xgomod()
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("main.spx\tproject"))
        .stdout(predicate::str::contains("Hero.spx\twork"))
        .stdout(predicate::str::contains("build.gsh\tproject"))
        .stdout(predicate::str::contains("util.go").not());

    env.xgomod()
        .args(["scan", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("util.go\t-"));
}

// ============================================================================
// xgomod lookup / deps
// ============================================================================

#[test]
fn test_lookup_packages() {
    let env = Env::new();
    env.cache_module("github.com/goplus/spx", "v1.0.0", None);
    env.write(
        "go.mod",
        "module example.com/game\n\nrequire github.com/goplus/spx v1.0.0\n",
    );

    env.xgomod()
        .args(["lookup", "fmt", "example.com/game/sprites", "github.com/goplus/spx/fs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fmt\tstandard"))
        .stdout(predicate::str::contains("goroot/src/fmt"))
        .stdout(predicate::str::contains("work/sprites"))
        .stdout(predicate::str::contains("github.com/goplus/spx@v1.0.0/fs"));
}

#[test]
fn test_lookup_missing_package() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");

    env.xgomod()
        .args(["lookup", "github.com/goplus/yap/ytest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no required module provides package `github.com/goplus/yap/ytest`",
        ));
}

#[test]
fn test_lookup_rejects_relative_path() {
    let env = Env::new();
    env.write("go.mod", "module example.com/game\n");

    env.xgomod()
        .args(["lookup", "./sprites"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid package path"));
}

#[test]
fn test_deps_applies_replace() {
    let env = Env::new();
    env.write(
        "go.mod",
        "module example.com/game\n\nrequire (\n\tgithub.com/a/b v1.0.0\n\tgithub.com/c/d v1.2.0 //xgo:class\n)\n\nreplace github.com/a/b v1.0.0 => ../local\n",
    );

    env.xgomod()
        .arg("deps")
        .assert()
        .success()
        .stdout(predicate::str::contains("github.com/a/b => "))
        .stdout(predicate::str::contains("local"))
        .stdout(predicate::str::contains("v1.0.0").not())
        .stdout(predicate::str::contains("github.com/c/d v1.2.0 (classfile)"));
}

// ============================================================================
// xgomod add
// ============================================================================

#[test]
fn test_add_classfile_module() {
    let env = Env::new();
    env.cache_module("github.com/goplus/yap", "v0.7.2", Some(YAP_GOX));
    env.write("go.mod", "module example.com/web\n\ngo 1.21\n");

    env.xgomod()
        .args(["add", "github.com/goplus/yap@v0.7.2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("classfile module"));

    let gomod = env.read("go.mod");
    assert!(gomod.contains("github.com/goplus/yap v0.7.2"));
    assert!(gomod.contains("//xgo:class"));

    env.xgomod()
        .args(["kind", "main_yap.gox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project"));
}

#[test]
fn test_add_plain_module() {
    let env = Env::new();
    env.cache_module("github.com/qiniu/x", "v1.13.0", None);
    env.write("go.mod", "module example.com/web\n");

    env.xgomod()
        .args(["add", "github.com/qiniu/x@v1.13.0"])
        .assert()
        .success();

    let gomod = env.read("go.mod");
    assert!(gomod.contains("github.com/qiniu/x v1.13.0"));
    assert!(!gomod.contains("//xgo:class"));

    env.xgomod()
        .args(["add", "--class", "github.com/qiniu/x@v1.13.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a classfile module"));
}

#[test]
fn test_add_without_version_needs_network() {
    let env = Env::new();
    env.write("go.mod", "module example.com/web\n");

    env.xgomod()
        .args(["add", "github.com/goplus/yap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("offline mode"));
    assert_eq!(env.read("go.mod"), "module example.com/web\n");
}
