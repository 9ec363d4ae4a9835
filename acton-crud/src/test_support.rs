//! Shared fixtures for unit tests

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::filter::{FieldSchema, FieldType, FilterError, FilterValue, Query, QueryBuilder};
use crate::handlers::{ResourceAdapter, ResourceOptions, ResourceOrchestrator, Violations};
use crate::memory::{Identified, InMemoryRepository};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Book {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) pages: i64,
}

impl Book {
    pub(crate) fn new(id: i64, title: &str, pages: i64) -> Self {
        Self {
            id,
            title: title.to_string(),
            pages,
        }
    }
}

impl Identified for Book {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        match name {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "pages" => Some(self.pages.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct BookDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) pages: Option<i64>,
}

pub(crate) struct BookAdapter {
    pub(crate) schema: FieldSchema,
    pub(crate) deletion_allowed: bool,
    pub(crate) in_use: Vec<i64>,
    pub(crate) can_delete_called: AtomicBool,
}

impl BookAdapter {
    pub(crate) fn new() -> Self {
        Self {
            schema: FieldSchema::new()
                .with_field("id", FieldType::Integer)
                .with_field("title", FieldType::Text)
                .with_field("pages", FieldType::Integer),
            deletion_allowed: true,
            in_use: Vec::new(),
            can_delete_called: AtomicBool::new(false),
        }
    }
}

impl ResourceAdapter for BookAdapter {
    type Entity = Book;
    type Dto = BookDto;

    fn resource_name(&self) -> &str {
        "Book"
    }

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn entity_id(&self, entity: &Book) -> i64 {
        entity.id
    }

    fn dto_id(&self, dto: &BookDto) -> Option<i64> {
        dto.id
    }

    fn to_dto(&self, entity: &Book) -> BookDto {
        BookDto {
            id: Some(entity.id),
            title: Some(entity.title.clone()),
            pages: Some(entity.pages),
        }
    }

    fn to_entity(&self, dto: BookDto, id: Option<i64>) -> Book {
        Book {
            id: id.unwrap_or_default(),
            title: dto.title.unwrap_or_default(),
            pages: dto.pages.unwrap_or_default(),
        }
    }

    fn merge_partial(&self, mut existing: Book, dto: BookDto) -> Book {
        if let Some(title) = dto.title {
            existing.title = title;
        }
        if let Some(pages) = dto.pages {
            existing.pages = pages;
        }
        existing
    }

    fn validate_create(&self, dto: &BookDto) -> Result<(), Violations> {
        let mut violations = Violations::new();
        violations.require("title", dto.title.as_ref());
        violations.require("pages", dto.pages.as_ref());
        violations.into_result()
    }

    fn validate_update(&self, dto: &BookDto) -> Result<(), Violations> {
        self.validate_create(dto)
    }

    fn validate_partial(&self, dto: &BookDto) -> Result<(), Violations> {
        match dto.pages {
            Some(pages) if pages <= 0 => Violations::new()
                .with("pages", "RANGE", "pages must be positive")
                .into_result(),
            _ => Ok(()),
        }
    }

    fn xml_item(&self, dto: &BookDto) -> String {
        format!("<book id=\"{}\"/>", dto.id.unwrap_or_default())
    }

    fn xml_collection(&self, dtos: &[BookDto]) -> String {
        format!("<books count=\"{}\"/>", dtos.len())
    }

    // `q` searches titles
    fn build_query(
        &self,
        builder: &QueryBuilder<'_>,
        pairs: Vec<(String, String)>,
    ) -> Result<Query, FilterError> {
        builder.build(pairs.into_iter().map(|(key, value)| match key.as_str() {
            "q" => ("title[like]".to_string(), format!("%{value}%")),
            _ => (key, value),
        }))
    }

    fn deletion_allowed(&self) -> bool {
        self.deletion_allowed
    }

    fn can_delete(&self, id: i64) -> bool {
        self.can_delete_called.store(true, Ordering::SeqCst);
        !self.in_use.contains(&id)
    }
}

pub(crate) type BookOrchestrator = ResourceOrchestrator<BookAdapter, InMemoryRepository<Book>>;

/// Orchestrator over two books (ids 1 and 2) mounted at `/books`
pub(crate) fn seeded_with(adapter: BookAdapter) -> BookOrchestrator {
    let repository = InMemoryRepository::with_entities(vec![
        Book::new(1, "Dune", 412),
        Book::new(2, "Emma", 320),
    ]);
    ResourceOrchestrator::new(adapter, repository)
        .with_options(ResourceOptions::default().with_base_path("/books"))
}

pub(crate) fn seeded() -> BookOrchestrator {
    seeded_with(BookAdapter::new())
}
