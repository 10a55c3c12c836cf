//! Book lookup tool: searches a small fixed catalog by title.
//!
//! Matching is tried in order: exact title, case-insensitive title, then
//! case-insensitive containment in either direction. The first catalog
//! entry that matches wins. A miss is not an error; the tool answers with
//! the list of available titles so the model can recover.

use async_trait::async_trait;
use serde::Serialize;
use taoloop_core::error::ToolError;
use taoloop_core::tool::{Tool, ToolOutput};
use tracing::debug;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookInfo {
    pub title: &'static str,
    pub author: &'static str,
    pub year: u16,
    pub genre: &'static str,
    pub pages: u32,
    pub summary: &'static str,
}

impl BookInfo {
    /// Multi-line description used as the tool's observation.
    pub fn describe(&self) -> String {
        format!(
            "{}\nAuthor: {}\nYear: {}\nGenre: {}\nPages: {}\nSummary: {}",
            self.title, self.author, self.year, self.genre, self.pages, self.summary
        )
    }
}

const BOOKS: &[BookInfo] = &[
    BookInfo {
        title: "Dom Casmurro",
        author: "Machado de Assis",
        year: 1899,
        genre: "Novel/Realism",
        pages: 256,
        summary: "Bentinho's story and his obsession with Capitu's supposed betrayal.",
    },
    BookInfo {
        title: "O Cortiço",
        author: "Aluísio Azevedo",
        year: 1890,
        genre: "Naturalism",
        pages: 304,
        summary: "A naturalist portrait of life in a crowded tenement in 19th-century Rio de Janeiro.",
    },
    BookInfo {
        title: "1984",
        author: "George Orwell",
        year: 1949,
        genre: "Science Fiction/Dystopia",
        pages: 328,
        summary: "A totalitarian society under the constant surveillance of Big Brother.",
    },
    BookInfo {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        year: 1813,
        genre: "Romance/Drama",
        pages: 432,
        summary: "A critique of English society through the story of Elizabeth Bennet and Mr. Darcy.",
    },
    BookInfo {
        title: "O Pequeno Príncipe",
        author: "Antoine de Saint-Exupéry",
        year: 1943,
        genre: "Fable/Children's",
        pages: 96,
        summary: "A poetic fable about a prince who travels between planets and learns about life and love.",
    },
];

/// An ordered, read-only book catalog.
#[derive(Debug, Clone)]
pub struct BookCatalog {
    books: &'static [BookInfo],
}

impl BookCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self { books: BOOKS }
    }

    /// Catalog titles in declaration order.
    pub fn titles(&self) -> Vec<&'static str> {
        self.books.iter().map(|b| b.title).collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Find a book by title: exact, then case-insensitive, then containment.
    pub fn lookup(&self, title: &str) -> Option<&'static BookInfo> {
        let books = self.books;
        if let Some(book) = books.iter().find(|b| b.title == title) {
            return Some(book);
        }

        let wanted = title.to_lowercase();
        if let Some(book) = books.iter().find(|b| b.title.to_lowercase() == wanted) {
            return Some(book);
        }

        let found = books.iter().find(|b| {
            let key = b.title.to_lowercase();
            key.contains(&wanted) || wanted.contains(&key)
        });
        if let Some(book) = found {
            debug!(query = %title, matched = %book.title, "Approximate title match");
        }
        found
    }

    /// Text returned to the model when a title is not in the catalog.
    pub fn not_found_message(&self, title: &str) -> String {
        format!(
            "Book \"{}\" not found in the catalog. Available books: {}",
            title,
            self.titles().join(", ")
        )
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub struct BookLookupTool {
    catalog: BookCatalog,
}

impl BookLookupTool {
    pub fn new(catalog: BookCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &BookCatalog {
        &self.catalog
    }
}

impl Default for BookLookupTool {
    fn default() -> Self {
        Self::new(BookCatalog::builtin())
    }
}

#[async_trait]
impl Tool for BookLookupTool {
    fn name(&self) -> &str {
        "book_lookup"
    }

    fn description(&self) -> &str {
        "Look up detailed information about a book by its title."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The book title to search for"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let title = arguments["title"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'title' argument".into()))?;

        debug!(title = %title, "Looking up book");

        match self.catalog.lookup(title) {
            Some(book) => Ok(ToolOutput {
                output: book.describe(),
                data: serde_json::to_value(book).ok(),
            }),
            None => Ok(ToolOutput::text(self.catalog.not_found_message(title))),
        }
    }
}
