//! Front-ends turning files on disk into generic documents.
//!
//! - [`HclParser`]: Terraform/OpenTofu modules (`.tf`), one document per
//!   directory
//! - [`CloudFormationParser`]: CloudFormation and SAM templates
//!   (`.yaml`, `.yml`, `.json`, `.template`), one document per file
//!
//! [`DocumentParser`] walks the scan roots, groups files, and turns parse
//! failures into diagnostics so one bad file never stops a scan.
//!
//! # Example
//!
//! ```rust,ignore
//! use rampart::parser::DocumentParser;
//! use rampart::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let parser = DocumentParser::new(&Config::default());
//!     let parsed = parser.parse_path("./infra".as_ref()).await?;
//!     println!("Parsed {} documents", parsed.documents.len());
//!     Ok(())
//! }
//! ```

mod cloudformation;
mod hcl;
mod lines;
mod locator;

pub use cloudformation::{CloudFormationParser, PARAMETER};
pub use hcl::{HclParser, ModuleParse};
pub use lines::LineIndex;
pub use locator::Locator;

use crate::config::{Config, ScanOptions};
use crate::document::Document;
use crate::error::{RampartError, Result};
use crate::types::{Diagnostic, DiagnosticKind, SourceFormat};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions of Terraform/OpenTofu files.
pub const TERRAFORM_EXTENSIONS: &[&str] = &["tf"];

/// File extensions that may hold a CloudFormation template.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "template"];

/// Directories never worth descending into.
pub const SKIP_DIRS: &[&str] = &[".terraform", ".terragrunt-cache", ".git", "node_modules", ".aws-sam"];

/// Parsing of a single file's contents.
///
/// Implemented by both front-ends so tests and embedding tools can build
/// documents from strings.
pub trait Parser: Send + Sync {
    /// The format this parser produces.
    fn format(&self) -> SourceFormat;

    /// Parse one file's contents into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid for this format.
    fn parse_content(&self, content: &str, file_path: &Path) -> Result<Document>;
}

/// A file read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Documents parsed from one or more roots, plus what went wrong.
#[derive(Debug, Default)]
pub struct ParsedDocuments {
    pub documents: Vec<Document>,
    pub diagnostics: Vec<Diagnostic>,
    /// Files that contributed to a document
    pub files: Vec<PathBuf>,
}

impl ParsedDocuments {
    pub fn merge(&mut self, other: Self) {
        self.documents.extend(other.documents);
        self.diagnostics.extend(other.diagnostics);
        self.files.extend(other.files);
    }

    fn parse_failure(&mut self, error: &RampartError) {
        let mut diagnostic = Diagnostic::new(DiagnosticKind::Parse, error.to_string());
        if let Some(file) = error.file() {
            diagnostic = diagnostic.with_file(file);
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Discovers and parses every supported file below a path.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    options: ScanOptions,
    hcl: HclParser,
    cloudformation: CloudFormationParser,
}

impl DocumentParser {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            options: config.scan.clone(),
            hcl: HclParser::new(),
            cloudformation: CloudFormationParser::new(),
        }
    }

    /// Parse a file or every supported file below a directory.
    ///
    /// # Errors
    ///
    /// Returns an error only if `path` does not exist. Unreadable or
    /// malformed files become diagnostics.
    pub async fn parse_path(&self, path: &Path) -> Result<ParsedDocuments> {
        if !path.exists() {
            return Err(crate::err!(DirectoryNotFound {
                path: path.to_path_buf(),
            }));
        }

        let mut parsed = ParsedDocuments::default();
        let mut sources = Vec::new();
        for file in self.discover(path) {
            match tokio::fs::read_to_string(&file).await {
                Ok(content) => sources.push(SourceFile::new(file, content)),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "Failed to read file");
                    parsed.parse_failure(&RampartError::io(&file, e, file!(), line!()));
                }
            }
        }

        parsed.merge(self.parse_sources(sources));

        tracing::info!(
            root = %path.display(),
            documents = parsed.documents.len(),
            files = parsed.files.len(),
            errors = parsed.diagnostics.len(),
            "Parsing complete"
        );
        Ok(parsed)
    }

    /// Parse files that were already read.
    ///
    /// Terraform files are grouped by directory into one module each;
    /// every other file is tried as a template.
    #[must_use]
    pub fn parse_sources(&self, sources: Vec<SourceFile>) -> ParsedDocuments {
        let mut parsed = ParsedDocuments::default();
        let mut modules: BTreeMap<PathBuf, Vec<SourceFile>> = BTreeMap::new();

        for source in sources {
            if has_extension(&source.path, TERRAFORM_EXTENSIONS) {
                let dir = source.path.parent().map(Path::to_path_buf).unwrap_or_default();
                modules.entry(dir).or_default().push(source);
                continue;
            }

            if !CloudFormationParser::looks_like_template(&source.content) {
                continue;
            }
            match self.cloudformation.parse_template(&source.content, &source.path) {
                Ok(Some(document)) => {
                    parsed.files.push(source.path);
                    parsed.documents.push(document);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(file = %source.path.display(), error = %e, "Failed to parse template");
                    parsed.parse_failure(&e);
                }
            }
        }

        for (dir, files) in modules {
            let module = self.hcl.parse_module(&dir, &files);
            for error in &module.errors {
                parsed.parse_failure(error);
            }
            if let Some(document) = module.document {
                parsed.files.extend(
                    files
                        .into_iter()
                        .map(|file| file.path)
                        .filter(|path| !module.errors.iter().any(|e| e.file() == Some(path.as_path()))),
                );
                parsed.documents.push(document);
            }
        }

        parsed
    }

    /// Supported files below `root`, in a stable order.
    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        if root.is_file() {
            return vec![root.to_path_buf()];
        }

        WalkDir::new(root)
            .follow_links(self.options.follow_links)
            .max_depth(self.options.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.should_skip(root, entry.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| has_extension(path, TERRAFORM_EXTENSIONS) || has_extension(path, TEMPLATE_EXTENSIONS))
            .collect()
    }

    /// Check if a path should be skipped.
    fn should_skip(&self, root: &Path, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if file_name.starts_with('.') && path.is_dir() {
            tracing::debug!(path = %path.display(), reason = "hidden directory", "Skipping path");
            return true;
        }

        if SKIP_DIRS.contains(&file_name) {
            tracing::debug!(path = %path.display(), reason = "known skip directory", "Skipping path");
            return true;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let excluded = self.options.exclude_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern).is_ok_and(|p| p.matches(file_name) || p.matches_path(relative) || p.matches_path(path))
        });
        if excluded {
            tracing::debug!(path = %path.display(), reason = "matches exclude pattern", "Skipping path");
        }
        excluded
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DocumentParser {
        DocumentParser::new(&Config::default())
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("main.tf"), TERRAFORM_EXTENSIONS));
        assert!(has_extension(Path::new("template.YAML"), TEMPLATE_EXTENSIONS));
        assert!(!has_extension(Path::new("main.tf.json"), TERRAFORM_EXTENSIONS));
        assert!(!has_extension(Path::new("readme.md"), TEMPLATE_EXTENSIONS));
    }

    #[test]
    fn test_should_skip() {
        let parser = parser();
        let root = Path::new("/repo");
        assert!(parser.should_skip(root, Path::new("/repo/.terraform")));
        assert!(parser.should_skip(root, Path::new("/repo/node_modules")));
        assert!(!parser.should_skip(root, Path::new("/repo/modules")));
        assert!(!parser.should_skip(root, Path::new("/repo/main.tf")));
    }

    #[test]
    fn test_parse_sources_groups_modules() {
        let parsed = parser().parse_sources(vec![
            SourceFile::new("a/main.tf", "resource \"aws_s3_bucket\" \"a\" {}\n"),
            SourceFile::new("a/extra.tf", "resource \"aws_s3_bucket\" \"b\" {}\n"),
            SourceFile::new("b/main.tf", "resource \"aws_s3_bucket\" \"c\" {}\n"),
            SourceFile::new("b/broken.tf", "resource {"),
            SourceFile::new("config.yaml", "scan:\n  max_depth: 1\n"),
            SourceFile::new("bad.yaml", "Resources: [\n"),
            SourceFile::new("notes.yaml", "title: Resources for the team\nitems: [\n"),
            SourceFile::new("pods.yaml", "kind: Pod\n---\nResources: [\n"),
        ]);

        assert_eq!(parsed.documents.len(), 2);
        assert_eq!(parsed.documents[0].get_blocks().len(), 2);
        assert_eq!(parsed.files.len(), 3);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed.diagnostics.iter().all(|d| d.kind == DiagnosticKind::Parse));
    }

    #[tokio::test]
    async fn test_parse_path_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("net/.terraform")).unwrap();
        std::fs::write(dir.path().join("net/main.tf"), "resource \"openstack_networking_secgroup_v2\" \"sg\" {}\n").unwrap();
        std::fs::write(dir.path().join("net/.terraform/ignored.tf"), "resource {").unwrap();
        std::fs::write(
            dir.path().join("template.yaml"),
            "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n",
        )
        .unwrap();

        let parsed = parser().parse_path(dir.path()).await.unwrap();
        assert_eq!(parsed.documents.len(), 2);
        assert!(parsed.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_is_an_error() {
        let result = parser().parse_path(Path::new("/definitely/not/here")).await;
        assert!(matches!(result, Err(RampartError::DirectoryNotFound { .. })));
    }
}
