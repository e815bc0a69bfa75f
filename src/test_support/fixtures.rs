//! On-disk CMake project trees for tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::loader::BUILD_FILE;

/// A tree of `CMakeLists.txt` files keyed by subdirectory.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    files: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    /// A project whose root build file is `contents`.
    pub fn new(contents: impl Into<String>) -> Self {
        ProjectFixture {
            files: vec![(PathBuf::new(), contents.into())],
        }
    }

    /// The usual test project: a library, an executable and tests.
    pub fn app_with_library() -> Self {
        ProjectFixture::new(
            "cmake_minimum_required(VERSION 3.16)\n\
             project(demo C)\n\
             enable_testing()\n\
             add_subdirectory(core)\n\
             add_executable(app main.c)\n\
             set_target_properties(app PROPERTIES OUTPUT_NAME demo)\n",
        )
        .with_subdir("core", "add_library(core STATIC core.c)\n")
    }

    /// Add a build file in `dir`.
    pub fn with_subdir(mut self, dir: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push((dir.into(), contents.into()));
        self
    }

    /// Write the tree under `root`.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        for (dir, contents) in &self.files {
            let dir = root.join(dir);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(BUILD_FILE), contents)?;
        }
        Ok(())
    }
}
