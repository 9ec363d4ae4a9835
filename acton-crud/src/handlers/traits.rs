//! Resource adapter trait
//!
//! A [`ResourceAdapter`] describes one resource type to the
//! [`ResourceOrchestrator`](super::ResourceOrchestrator): how its entities map to
//! and from the wire DTO, which fields can be filtered, how each kind of write
//! is validated, how it renders as XML and whether it may be deleted. An
//! adapter may also take over query-string interpretation for its listing.
//!
//! The orchestrator owns the request sequencing; adapters only answer
//! questions about their resource.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::filter::{FieldSchema, FieldType};
//! use acton_crud::handlers::{ResourceAdapter, Violations};
//!
//! struct BookAdapter { schema: FieldSchema }
//!
//! impl ResourceAdapter for BookAdapter {
//!     type Entity = Book;
//!     type Dto = BookDto;
//!
//!     fn resource_name(&self) -> &str { "Book" }
//!     fn schema(&self) -> &FieldSchema { &self.schema }
//!     fn entity_id(&self, book: &Book) -> i64 { book.id }
//!     fn dto_id(&self, dto: &BookDto) -> Option<i64> { dto.id }
//!
//!     fn to_dto(&self, book: &Book) -> BookDto { BookDto::from(book) }
//!     fn to_entity(&self, dto: BookDto, id: Option<i64>) -> Book { Book::from_dto(dto, id) }
//!     fn merge_partial(&self, existing: Book, dto: BookDto) -> Book { existing.merge(dto) }
//!
//!     fn validate_create(&self, dto: &BookDto) -> Result<(), Violations> {
//!         let mut violations = Violations::new();
//!         violations.require("title", dto.title.as_ref());
//!         violations.into_result()
//!     }
//!     // ...
//! }
//! ```

use serde::{de::DeserializeOwned, Serialize};

use super::validation::Violations;
use crate::filter::{FieldSchema, FilterError, Query, QueryBuilder};
use crate::negotiation::XmlRenderer;

/// Capability set the orchestrator needs from one resource type
pub trait ResourceAdapter: Send + Sync {
    /// Persisted entity
    type Entity: Send;

    /// Wire representation, bound from request bodies and rendered in responses
    type Dto: Serialize + DeserializeOwned + Send;

    /// Name used in error messages and logs (e.g. `"Book"`)
    fn resource_name(&self) -> &str;

    /// Filterable fields and their types
    fn schema(&self) -> &FieldSchema;

    /// Identifier of a persisted entity
    fn entity_id(&self, entity: &Self::Entity) -> i64;

    /// Identifier carried in a DTO body, if any
    fn dto_id(&self, dto: &Self::Dto) -> Option<i64>;

    /// Map an entity to its wire representation
    fn to_dto(&self, entity: &Self::Entity) -> Self::Dto;

    /// Map a DTO to an entity
    ///
    /// `id` is `None` on create and the path identifier on full update.
    fn to_entity(&self, dto: Self::Dto, id: Option<i64>) -> Self::Entity;

    /// Apply the fields present in a partial DTO to an existing entity
    fn merge_partial(&self, existing: Self::Entity, dto: Self::Dto) -> Self::Entity;

    /// Rules for `POST`
    fn validate_create(&self, dto: &Self::Dto) -> Result<(), Violations>;

    /// Rules for `PUT`
    fn validate_update(&self, dto: &Self::Dto) -> Result<(), Violations>;

    /// Rules for `PATCH`; usually only checks the fields that are present
    fn validate_partial(&self, dto: &Self::Dto) -> Result<(), Violations>;

    /// Render one DTO as XML
    fn xml_item(&self, dto: &Self::Dto) -> String;

    /// Render a list of DTOs as XML
    fn xml_collection(&self, dtos: &[Self::Dto]) -> String;

    /// Interpret the list query string
    ///
    /// `builder` already carries this resource's schema and page limits. The
    /// default hands it every pair unchanged; override to support extra keys
    /// or shorthands by rewriting pairs before the builder sees them.
    fn build_query(
        &self,
        builder: &QueryBuilder<'_>,
        pairs: Vec<(String, String)>,
    ) -> Result<Query, FilterError> {
        builder.build(pairs)
    }

    /// Whether `DELETE` is enabled for this resource at all
    fn deletion_allowed(&self) -> bool {
        true
    }

    /// Whether this particular entity may be deleted (e.g. not referenced elsewhere)
    fn can_delete(&self, _id: i64) -> bool {
        true
    }
}

/// Lets the negotiator render through an adapter's XML hooks
pub(crate) struct AdapterXml<'a, A: ?Sized>(pub &'a A);

impl<A> XmlRenderer<A::Dto> for AdapterXml<'_, A>
where
    A: ResourceAdapter + ?Sized,
{
    fn render_item(&self, dto: &A::Dto) -> String {
        self.0.xml_item(dto)
    }

    fn render_collection(&self, dtos: &[A::Dto]) -> String {
        self.0.xml_collection(dtos)
    }
}
