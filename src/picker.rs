//! Document search for the uploader.
//!
//! The `@` token in the composer triggers a fuzzy search over the working
//! tree for upload candidates. Traversal uses the `ignore` crate so
//! gitignored build output never shows up as an upload suggestion, and
//! scoring uses `nucleo-matcher` with a boost for document-like files:
//! the things one actually sends to a study backend.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Maximum number of matches to return.
const MAX_DOCUMENT_MATCHES: usize = 8;

/// Upper bound on walked entries, to keep searches snappy in huge trees.
const MAX_SCANNED_ENTRIES: usize = 20_000;

/// Score boost applied to document-like files so they outrank source files
/// with similar fuzzy scores.
const DOCUMENT_SCORE_BOOST: u32 = 40;

/// File extensions treated as documents for ranking purposes.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "md", "txt", "pdf", "doc", "docx", "ppt", "pptx", "html", "htm", "epub", "csv", "rst", "tex",
];

/// A single upload candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMatch {
    /// Path relative to the search root.
    pub path: PathBuf,
    /// Fuzzy match score (higher is better).
    pub score: u32,
    /// Whether this candidate is a directory (selectable for drill-down,
    /// not uploadable itself).
    pub is_dir: bool,
}

/// Result of one document search.
#[derive(Debug, Clone, Default)]
pub struct DocumentSearch {
    /// Candidates sorted best-first, at most [`MAX_DOCUMENT_MATCHES`].
    pub matches: Vec<DocumentMatch>,
    /// Number of entries visited before matching.
    pub scanned: usize,
    /// True if any entries could not be read during traversal.
    pub had_errors: bool,
}

/// Returns true if `path` has a document-like extension.
fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            DOCUMENT_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Searches `root` for upload candidates matching `query`.
///
/// An empty query lists the tree with directories first, then documents,
/// then everything else, each group alphabetical. A non-empty query is
/// fuzzy-matched against the relative path, with document files boosted.
#[must_use]
pub fn search_documents(query: &str, root: &Path) -> DocumentSearch {
    let mut result = DocumentSearch::default();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(true)
        .add_custom_ignore_filename(".gitignore")
        .build();

    let mut entries: Vec<(PathBuf, bool)> = Vec::new();

    for entry_result in walker {
        if result.scanned >= MAX_SCANNED_ENTRIES {
            break;
        }
        match entry_result {
            Ok(entry) => {
                let Some(file_type) = entry.file_type() else {
                    continue;
                };
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                if relative.as_os_str().is_empty() {
                    continue;
                }
                result.scanned += 1;
                entries.push((relative.to_path_buf(), file_type.is_dir()));
            }
            Err(_) => {
                result.had_errors = true;
            }
        }
    }

    if query.is_empty() {
        entries.sort_by(|a, b| {
            let group = |(path, is_dir): &(PathBuf, bool)| {
                if *is_dir {
                    0
                } else if is_document(path) {
                    1
                } else {
                    2
                }
            };
            group(a).cmp(&group(b)).then_with(|| a.0.cmp(&b.0))
        });
        result.matches = entries
            .into_iter()
            .take(MAX_DOCUMENT_MATCHES)
            .map(|(path, is_dir)| DocumentMatch {
                path,
                score: 0,
                is_dir,
            })
            .collect();
        return result;
    }

    let mut fuzzy_matcher = Matcher::new(Config::DEFAULT);
    let atom = Atom::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
        false,
    );

    let mut matches: Vec<DocumentMatch> = Vec::new();
    for (path, is_dir) in entries {
        let path_str = path.to_string_lossy();
        // Directories match with a trailing slash so "notes/" style queries
        // land on them.
        let haystack_str = if is_dir {
            format!("{path_str}/")
        } else {
            path_str.into_owned()
        };
        let mut haystack_buf = Vec::new();
        let haystack = Utf32Str::new(&haystack_str, &mut haystack_buf);

        if let Some(score) = atom.score(haystack, &mut fuzzy_matcher) {
            let score = if !is_dir && is_document(&path) {
                u32::from(score).saturating_add(DOCUMENT_SCORE_BOOST)
            } else {
                u32::from(score)
            };
            matches.push(DocumentMatch {
                path,
                score,
                is_dir,
            });
        }
    }

    matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    matches.truncate(MAX_DOCUMENT_MATCHES);
    result.matches = matches;
    result
}
