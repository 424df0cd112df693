//! Sources of the selected text and targets of the linked replacement

use std::{ops::Range, path::PathBuf};

use color_eyre::eyre::{Context, eyre};
use tokio::fs;

use crate::errors::Result;

/// The editor holding the user's selection
#[trait_variant::make(Send)]
pub trait Editor {
    /// Returns the currently selected text
    async fn selected_text(&mut self) -> Result<String>;

    /// Replaces the currently selected text with the given one
    async fn replace_selected_text(&mut self, text: String) -> Result<()>;
}

/// An editor over an in-memory selection, keeping the replacement until it's consumed
#[derive(Debug, Default)]
pub struct BufferEditor {
    selection: String,
    replacement: Option<String>,
}

impl BufferEditor {
    pub fn new(selection: impl Into<String>) -> Self {
        Self {
            selection: selection.into(),
            replacement: None,
        }
    }

    /// The replaced text, if the selection was replaced
    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    /// Consumes the editor, returning the replacement or the original selection if it wasn't replaced
    pub fn into_text(self) -> String {
        self.replacement.unwrap_or(self.selection)
    }
}

impl Editor for BufferEditor {
    async fn selected_text(&mut self) -> Result<String> {
        Ok(self.selection.clone())
    }

    async fn replace_selected_text(&mut self, text: String) -> Result<()> {
        self.replacement = Some(text);
        Ok(())
    }
}

/// An editor whose selection is a byte range within a file
#[derive(Debug)]
pub struct DocumentRangeEditor {
    path: PathBuf,
    range: Range<usize>,
    selection: Option<String>,
}

impl DocumentRangeEditor {
    pub fn new(path: impl Into<PathBuf>, range: Range<usize>) -> Self {
        Self {
            path: path.into(),
            range,
            selection: None,
        }
    }

    async fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)
            .await
            .wrap_err_with(|| format!("Couldn't read document {}", self.path.display()))?)
    }

    fn slice<'c>(&self, content: &'c str) -> Result<&'c str> {
        Ok(content.get(self.range.clone()).ok_or_else(|| {
            eyre!(
                "Range {}..{} is not valid for {} ({} bytes)",
                self.range.start,
                self.range.end,
                self.path.display(),
                content.len()
            )
        })?)
    }
}

impl Editor for DocumentRangeEditor {
    async fn selected_text(&mut self) -> Result<String> {
        let content = self.read().await?;
        let selection = self.slice(&content)?.to_string();
        self.selection = Some(selection.clone());
        Ok(selection)
    }

    async fn replace_selected_text(&mut self, text: String) -> Result<()> {
        let content = self.read().await?;
        let current = self.slice(&content)?;
        if self.selection.as_deref().is_some_and(|s| s != current) {
            return Err(eyre!("Document {} was modified while defining the term", self.path.display()).into());
        }
        let updated = format!("{}{text}{}", &content[..self.range.start], &content[self.range.end..]);
        fs::write(&self.path, updated)
            .await
            .wrap_err_with(|| format!("Couldn't write document {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_buffer_editor() -> Result<()> {
        let mut editor = BufferEditor::new("A GPU");
        assert_eq!(editor.selected_text().await?, "A GPU");
        assert_eq!(editor.replacement(), None);
        editor.replace_selected_text(String::from("A [[gpu|GPU]]")).await?;
        assert_eq!(editor.into_text(), "A [[gpu|GPU]]");
        Ok(())
    }

    #[tokio::test]
    async fn test_document_range_editor() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "# Title\nA GPU is fast.\nEnd\n").unwrap();

        let mut editor = DocumentRangeEditor::new(&path, 8..22);
        assert_eq!(editor.selected_text().await?, "A GPU is fast.");
        editor
            .replace_selected_text(String::from("A [[gpu|GPU]] is fast."))
            .await?;

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Title\nA [[gpu|GPU]] is fast.\nEnd\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_document_range_editor_invalid_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "short").unwrap();

        let mut editor = DocumentRangeEditor::new(&path, 2..50);
        assert!(editor.selected_text().await.is_err());
    }
}
