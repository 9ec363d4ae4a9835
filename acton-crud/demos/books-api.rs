//! Books API Example - One Resource, Six Endpoints
//!
//! This example demonstrates:
//! - A `ResourceAdapter` describing a resource's DTO, schema and validation
//! - The in-memory repository with real commit/rollback semantics
//! - Query-string filtering, sorting and pagination
//! - JSON or XML responses negotiated from the Accept header
//!
//! Run with: cargo run --example books-api
//!
//! The service runs on port 8080 by default (configurable via ACTON_SERVICE__PORT env var)
//!
//! Test with:
//!   curl http://localhost:8080/books
//!   curl 'http://localhost:8080/books?year[gte]=1960&sort=year&order=desc'
//!   curl 'http://localhost:8080/books?title[like]=D%25&in_print=true'
//!   curl 'http://localhost:8080/books?by=Le%20Guin&page=1&per_page=5'
//!   curl -H 'Accept: application/xml' http://localhost:8080/books/1
//!   curl -i -X POST -d '{"title":"Ubik","author":"Philip K. Dick","year":1969}' http://localhost:8080/books
//!   curl -i -X PATCH -d '{"in_print":false}' http://localhost:8080/books/2
//!   curl -i -X DELETE http://localhost:8080/books/1   # 409: featured books stay

use acton_crud::prelude::*;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
struct Book {
    id: i64,
    title: String,
    author: String,
    year: i64,
    published: Option<NaiveDate>,
    in_print: bool,
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
            "author" => Some(self.author.as_str().into()),
            "year" => Some(self.year.into()),
            "published" => self.published.map(Into::into),
            "in_print" => Some(self.in_print.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BookDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_print: Option<bool>,
}

struct BookAdapter {
    schema: FieldSchema,
    featured: Vec<i64>,
}

impl BookAdapter {
    fn new() -> Self {
        Self {
            schema: FieldSchema::new()
                .with_field("id", FieldType::Integer)
                .with_field("title", FieldType::Text)
                .with_field("author", FieldType::Text)
                .with_field("year", FieldType::Integer)
                .with_field("published", FieldType::Date)
                .with_field("in_print", FieldType::Boolean),
            featured: vec![1],
        }
    }

    fn check_year(violations: &mut Violations, year: Option<i64>) {
        if let Some(year) = year {
            if !(1450..=2100).contains(&year) {
                violations.add("year", "RANGE", "year must be between 1450 and 2100");
            }
        }
    }

    fn check_not_blank(violations: &mut Violations, field: &str, value: Option<&String>) {
        if value.is_some_and(|v| v.trim().is_empty()) {
            violations.add(field, "BLANK", format!("{field} must not be blank"));
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

    fn entity_id(&self, book: &Book) -> i64 {
        book.id
    }

    fn dto_id(&self, dto: &BookDto) -> Option<i64> {
        dto.id
    }

    fn to_dto(&self, book: &Book) -> BookDto {
        BookDto {
            id: Some(book.id),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            year: Some(book.year),
            published: book.published,
            in_print: Some(book.in_print),
        }
    }

    fn to_entity(&self, dto: BookDto, id: Option<i64>) -> Book {
        Book {
            id: id.unwrap_or_default(),
            title: dto.title.unwrap_or_default(),
            author: dto.author.unwrap_or_default(),
            year: dto.year.unwrap_or_default(),
            published: dto.published,
            in_print: dto.in_print.unwrap_or(true),
        }
    }

    fn merge_partial(&self, mut book: Book, dto: BookDto) -> Book {
        if let Some(title) = dto.title {
            book.title = title;
        }
        if let Some(author) = dto.author {
            book.author = author;
        }
        if let Some(year) = dto.year {
            book.year = year;
        }
        if dto.published.is_some() {
            book.published = dto.published;
        }
        if let Some(in_print) = dto.in_print {
            book.in_print = in_print;
        }
        book
    }

    fn validate_create(&self, dto: &BookDto) -> std::result::Result<(), Violations> {
        let mut violations = Violations::new();
        violations.require("title", dto.title.as_ref());
        violations.require("author", dto.author.as_ref());
        violations.require("year", dto.year.as_ref());
        self.validate_present(&mut violations, dto);
        violations.into_result()
    }

    fn validate_update(&self, dto: &BookDto) -> std::result::Result<(), Violations> {
        self.validate_create(dto)
    }

    fn validate_partial(&self, dto: &BookDto) -> std::result::Result<(), Violations> {
        let mut violations = Violations::new();
        self.validate_present(&mut violations, dto);
        violations.into_result()
    }

    fn xml_item(&self, dto: &BookDto) -> String {
        let mut xml = format!("<book id=\"{}\">", dto.id.unwrap_or_default());
        if let Some(title) = &dto.title {
            xml.push_str(&format!("<title>{}</title>", escape(title)));
        }
        if let Some(author) = &dto.author {
            xml.push_str(&format!("<author>{}</author>", escape(author)));
        }
        if let Some(year) = dto.year {
            xml.push_str(&format!("<year>{year}</year>"));
        }
        if let Some(published) = dto.published {
            xml.push_str(&format!("<published>{published}</published>"));
        }
        if let Some(in_print) = dto.in_print {
            xml.push_str(&format!("<in_print>{in_print}</in_print>"));
        }
        xml.push_str("</book>");
        xml
    }

    fn xml_collection(&self, dtos: &[BookDto]) -> String {
        let items: String = dtos.iter().map(|dto| self.xml_item(dto)).collect();
        format!("<books>{items}</books>")
    }

    // `by=Le Guin` is shorthand for an author substring match
    fn build_query(
        &self,
        builder: &QueryBuilder<'_>,
        pairs: Vec<(String, String)>,
    ) -> std::result::Result<Query, FilterError> {
        builder.build(pairs.into_iter().map(|(key, value)| match key.as_str() {
            "by" => ("author[like]".to_string(), format!("%{value}%")),
            _ => (key, value),
        }))
    }

    fn can_delete(&self, id: i64) -> bool {
        !self.featured.contains(&id)
    }
}

impl BookAdapter {
    fn validate_present(&self, violations: &mut Violations, dto: &BookDto) {
        Self::check_not_blank(violations, "title", dto.title.as_ref());
        Self::check_not_blank(violations, "author", dto.author.as_ref());
        Self::check_year(violations, dto.year);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn seed() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
            published: NaiveDate::from_ymd_opt(1965, 8, 1),
            in_print: true,
        },
        Book {
            id: 2,
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            year: 1969,
            published: NaiveDate::from_ymd_opt(1969, 3, 1),
            in_print: true,
        },
        Book {
            id: 3,
            title: "Do Androids Dream of Electric Sheep?".to_string(),
            author: "Philip K. Dick".to_string(),
            year: 1968,
            published: None,
            in_print: true,
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_for_service("books-api")?;

    // Initialize tracing
    init_tracing(&config)?;

    let books = ResourceOrchestrator::new(BookAdapter::new(), InMemoryRepository::with_entities(seed()))
        .with_options(ResourceOptions::from(&config.resources));

    let app = Router::new()
        .route("/", get(|| async { "books-api" }))
        .merge(resource_routes("/books", books));

    // Run server
    Server::new(config).serve(app).await?;

    Ok(())
}
