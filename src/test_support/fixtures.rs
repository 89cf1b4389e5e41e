//! Test fixtures for common test scenarios.

use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ops::cbuild_build::BuildOptions;

/// Fixture for a module project laid out with the default configuration:
/// `code/<module>/<module>.cpp` plus `main.cpp` at the root.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    /// Module names.
    pub modules: Vec<String>,
}

impl ProjectFixture {
    /// Create a fixture with no modules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module.
    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.modules.push(name.into());
        self
    }

    /// Write the project under `root`.
    pub fn write(&self, root: &Path) {
        for module in &self.modules {
            let dir = root.join("code").join(module);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("{module}.cpp")), module_source(module)).unwrap();
        }
        fs::write(root.join("main.cpp"), main_source(&self.modules)).unwrap();
    }

    /// Default build options for a project at `root`, compiling with `g++`.
    pub fn options(root: &Path) -> BuildOptions {
        BuildOptions {
            project_root: root.to_path_buf(),
            source_dir: PathBuf::from("code"),
            build_dir: PathBuf::from("build"),
            main_source: PathBuf::from("main.cpp"),
            compiler: "g++".to_string(),
            source_ext: "cpp".to_string(),
            object_ext: "o".to_string(),
            output: Path::new("build").join(format!("main{}", EXE_SUFFIX)),
            flags: Vec::new(),
            timeout: None,
            emit_compile_commands: false,
            emit_plan: false,
            verbose: true,
        }
    }

    /// Write an executable stand-in compiler to `dir` that creates whatever
    /// file follows `-o`.
    #[cfg(unix)]
    pub fn stub_compiler(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("stub-cc");
        fs::write(
            &path,
            "#!/bin/sh\n\
             while [ $# -gt 0 ]; do\n\
             \x20 if [ \"$1\" = -o ]; then : > \"$2\"; fi\n\
             \x20 shift\n\
             done\n",
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// Source for a module exposing one function named after it.
pub fn module_source(name: &str) -> String {
    format!("int {name}_answer() {{ return 42; }}\n")
}

/// `main.cpp` calling every module.
pub fn main_source(modules: &[String]) -> String {
    let mut source = String::new();
    for module in modules {
        source.push_str(&format!("int {module}_answer();\n"));
    }
    source.push_str("\nint main() {\n    int total = 0;\n");
    for module in modules {
        source.push_str(&format!("    total += {module}_answer();\n"));
    }
    source.push_str("    return total > 0 ? 0 : 1;\n}\n");
    source
}
