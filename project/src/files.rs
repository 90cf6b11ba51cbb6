use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::error::ProjectError;
use crate::error::Result;

/// Suffix class a file set is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Source,
    Configuration,
}

impl fmt::Display for FileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Configuration => f.write_str("configuration"),
        }
    }
}

/// Point-in-time, sorted list of absolute paths of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    class: FileClass,
    files: Vec<PathBuf>,
}

impl FileSet {
    pub fn class(&self) -> FileClass {
        self.class
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Which files under a project root belong to a class.
#[derive(Debug, Clone)]
pub struct FileSetQuery {
    class: FileClass,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    excluded_files: Vec<String>,
}

impl FileSetQuery {
    /// `extensions` may be given with or without the leading dot.
    pub fn new(class: FileClass, extensions: &[String], excluded_dirs: &[String]) -> Self {
        Self {
            class,
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            excluded_dirs: excluded_dirs.to_vec(),
            excluded_files: Vec::new(),
        }
    }

    /// Leave out files with these exact names, wherever they appear.
    pub fn excluding_files(mut self, names: &[String]) -> Self {
        self.excluded_files = names.to_vec();
        self
    }

    pub fn class(&self) -> FileClass {
        self.class
    }

    /// Walk `root` and collect matching files.
    ///
    /// Excluded directories (dependency caches, VCS metadata) are pruned.
    /// Dotfiles are kept and `.gitignore` rules are not consulted.
    pub fn collect(&self, root: &Path) -> Result<FileSet> {
        let excluded = self.excluded_dirs.clone();
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded.iter().any(|dir| dir == name)))
            });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = result.map_err(|source| ProjectError::FileScan {
                root: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if self.matches(entry.path()) && !self.is_excluded_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();

        tracing::debug!(
            "collected {} {} file(s) under {}",
            files.len(),
            self.class,
            root.display()
        );
        Ok(FileSet {
            class: self.class,
            files,
        })
    }

    fn is_excluded_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| self.excluded_files.iter().any(|excluded| excluded == name))
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}
