use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::ExtractError;
use crate::markup::Chapter;

use super::Book;

/// Where a book's chapters come from.
///
/// `open` is the only blocking call the pipeline makes on a source. A failure
/// there is fatal for that book alone.
pub trait BookSource: Send + Sync {
    fn name(&self) -> String;

    fn open(&self) -> Result<Book, ExtractError>;
}

impl BookSource for Book {
    fn name(&self) -> String {
        self.title.clone()
    }

    fn open(&self) -> Result<Book, ExtractError> {
        Ok(self.clone())
    }
}

const CHAPTER_EXTENSIONS: &[&str] = &["xhtml", "html", "htm"];

/// An unpacked book: one markup file per chapter, read in file-name order.
#[derive(Debug, Clone)]
pub struct ChapterDirectory {
    path: PathBuf,
    title: Option<String>,
    author: Option<String>,
}

impl ChapterDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
            author: None,
        }
    }

    /// Defaults to the directory name.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    fn unavailable(&self, reason: impl ToString) -> ExtractError {
        ExtractError::BookUnavailable {
            book: self.name(),
            reason: reason.to_string(),
        }
    }
}

fn is_chapter_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CHAPTER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl BookSource for ChapterDirectory {
    fn name(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }

    fn open(&self) -> Result<Book, ExtractError> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.path)
            .map_err(|e| self.unavailable(e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_chapter_file(path))
            .collect();
        if files.is_empty() {
            return Err(self.unavailable("no chapter files found"));
        }
        files.sort();

        let chapters = files
            .iter()
            .map(|path| {
                let content = fs::read(path).map_err(|e| self.unavailable(e))?;
                let id = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(Chapter::new(id, content))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;
        debug!("Opened {} with {} chapters", self.name(), chapters.len());

        Ok(Book {
            title: self.name(),
            author: self.author.clone(),
            chapters,
        })
    }
}
