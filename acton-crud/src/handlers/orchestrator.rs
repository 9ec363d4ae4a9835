//! Resource orchestrator
//!
//! [`ResourceOrchestrator`] runs every CRUD operation for one resource through
//! the same sequence of stages, stopping at the first one that fails:
//!
//! | Stage        | get-all | get | create | update / patch | delete |
//! |--------------|:-------:|:---:|:------:|:--------------:|:------:|
//! | identifier   |         |  x  |        |       x        |   x    |
//! | policy       |         |     |        |                |   x    |
//! | existence    |         |  x  |        |       x        |   x    |
//! | bind+validate|         |     |   x    |       x        |        |
//! | identity     |         |     |        |       x        |        |
//! | transact     |         |     |   x    |       x        |   x    |
//! | respond      |    x    |  x  |   x    |       x        |   x    |
//!
//! List requests additionally interpret the query string through the
//! [`filter`](crate::filter) module. No transaction is opened unless every
//! earlier stage passed, and an opened transaction is always released.
//!
//! All methods are synchronous: repositories are free to block, so async
//! callers should run them on a blocking thread (the
//! [`router`](crate::router) does).

use super::error::{ApiError, ApiOperation};
use super::response::ResourceResponse;
use super::traits::{AdapterXml, ResourceAdapter};
use crate::config::ResourcesConfig;
use crate::filter::{QueryBuilder, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::negotiation::{self, Payload, RenderedBody};
use crate::repository::{Repository, RepositoryError, RepositoryErrorKind, RepositoryOperation};
use crate::transaction::TransactionScope;

/// Message of the failure raised when a delete removes nothing
pub const DELETE_FAILED_MESSAGE: &str = "Cannot delete selected entity";

/// Message returned when an entity is protected from deletion
pub const ENTITY_IN_USE_MESSAGE: &str = "Entity already in use";

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Collection path (e.g. `/books`); enables the `Location` header on create
    pub base_path: Option<String>,
    /// Page size when the client sends `page` without `per_page`
    pub default_per_page: u32,
    /// Largest page size a client may request
    pub max_per_page: u32,
    /// Echo internal failure details to clients
    pub expose_internal_errors: bool,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            base_path: None,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            expose_internal_errors: false,
        }
    }
}

impl ResourceOptions {
    /// Set the collection path
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }
}

impl From<&ResourcesConfig> for ResourceOptions {
    fn from(config: &ResourcesConfig) -> Self {
        Self {
            base_path: None,
            default_per_page: config.default_per_page,
            max_per_page: config.max_per_page,
            expose_internal_errors: config.expose_internal_errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateMode {
    Full,
    Partial,
}

impl UpdateMode {
    fn operation(self) -> ApiOperation {
        match self {
            Self::Full => ApiOperation::Update,
            Self::Partial => ApiOperation::UpdatePartial,
        }
    }
}

/// Generic CRUD orchestration for one resource
#[derive(Debug)]
pub struct ResourceOrchestrator<A, R> {
    adapter: A,
    repository: R,
    options: ResourceOptions,
}

impl<A, R> ResourceOrchestrator<A, R>
where
    A: ResourceAdapter,
    R: Repository<A::Entity>,
{
    /// Create an orchestrator with default options
    pub fn new(adapter: A, repository: R) -> Self {
        Self {
            adapter,
            repository,
            options: ResourceOptions::default(),
        }
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: ResourceOptions) -> Self {
        self.options = options;
        self
    }

    /// The resource adapter
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Current options
    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// List entities matching the query string
    ///
    /// `pairs` are the decoded query-string pairs; `accept` is the raw
    /// `Accept` header.
    pub fn get_all<I, K, V>(
        &self,
        pairs: I,
        accept: Option<&str>,
    ) -> Result<ResourceResponse, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let operation = ApiOperation::List;

        let builder = QueryBuilder::new(self.adapter.schema())
            .with_page_limits(self.options.default_per_page, self.options.max_per_page);
        let pairs = pairs
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_owned(), value.as_ref().to_owned()))
            .collect();

        let query = self
            .adapter
            .build_query(&builder, pairs)
            .map_err(|err| {
                tracing::debug!(
                    resource = self.adapter.resource_name(),
                    parse_failure = err.is_parse_failure(),
                    error = %err,
                    "rejecting list query"
                );
                ApiError::from(err)
            })?;

        let entities = self
            .repository
            .find_all(&query)
            .map_err(|err| self.internal(operation, None, err))?;

        let dtos: Vec<A::Dto> = entities.iter().map(|e| self.adapter.to_dto(e)).collect();
        tracing::debug!(
            resource = self.adapter.resource_name(),
            count = dtos.len(),
            "listed entities"
        );

        let body = self.render(operation, accept, Payload::Collection(&dtos))?;
        Ok(ResourceResponse::ok(body))
    }

    /// Fetch one entity
    pub fn get_single(&self, id: i64, accept: Option<&str>) -> Result<ResourceResponse, ApiError> {
        let operation = ApiOperation::Get;
        self.check_identifier(operation, id)?;

        let entity = self
            .repository
            .find_by_id(id)
            .map_err(|err| self.internal(operation, Some(id), err))?
            .ok_or_else(|| self.not_found(operation, id))?;

        let dto = self.adapter.to_dto(&entity);
        let body = self.render(operation, accept, Payload::Item(&dto))?;
        Ok(ResourceResponse::ok(body))
    }

    /// Create an entity from a JSON body
    pub fn create(&self, body: &[u8], accept: Option<&str>) -> Result<ResourceResponse, ApiError> {
        let operation = ApiOperation::Create;

        let dto = self.bind(operation, body)?;
        self.adapter
            .validate_create(&dto)
            .map_err(|violations| self.rejected(operation, None, violations))?;

        let saved = self.transact(operation, None, |repository, adapter, tx| {
            repository.insert(tx, adapter.to_entity(dto, None))
        })?;

        let id = self.adapter.entity_id(&saved);
        tracing::info!(
            resource = self.adapter.resource_name(),
            id,
            "created entity"
        );

        let dto = self.adapter.to_dto(&saved);
        let body = self.render(operation, accept, Payload::Item(&dto))?;

        let response = ResourceResponse::created(body);
        Ok(match &self.options.base_path {
            Some(base) => response.with_location(format!("{}/{}", base.trim_end_matches('/'), id)),
            None => response,
        })
    }

    /// Replace an entity from a JSON body
    pub fn update(&self, id: i64, body: &[u8]) -> Result<ResourceResponse, ApiError> {
        self.update_internal(UpdateMode::Full, id, body)
    }

    /// Change some properties of an entity from a JSON body
    pub fn update_partial(&self, id: i64, body: &[u8]) -> Result<ResourceResponse, ApiError> {
        self.update_internal(UpdateMode::Partial, id, body)
    }

    /// Delete an entity
    pub fn delete(&self, id: i64) -> Result<ResourceResponse, ApiError> {
        let operation = ApiOperation::Delete;
        self.check_identifier(operation, id)?;

        if !self.adapter.deletion_allowed() {
            tracing::debug!(
                resource = self.adapter.resource_name(),
                id,
                "deletion disabled"
            );
            return Err(ApiError::method_not_allowed(
                operation,
                format!("Deleting {} is not allowed", self.adapter.resource_name()),
            ));
        }

        if !self.adapter.can_delete(id) {
            tracing::debug!(
                resource = self.adapter.resource_name(),
                id,
                "entity protected from deletion"
            );
            return Err(ApiError::conflict(operation, ENTITY_IN_USE_MESSAGE)
                .with_entity(self.adapter.resource_name(), id.to_string()));
        }

        self.ensure_exists(operation, id)?;

        self.transact(operation, Some(id), |repository, _, tx| {
            if repository.delete_by_id(tx, id)? {
                Ok(())
            } else {
                Err(RepositoryError::new(
                    RepositoryOperation::Delete,
                    RepositoryErrorKind::Other,
                    DELETE_FAILED_MESSAGE,
                ))
            }
        })?;

        tracing::info!(
            resource = self.adapter.resource_name(),
            id,
            "deleted entity"
        );
        Ok(ResourceResponse::no_content())
    }

    fn update_internal(
        &self,
        mode: UpdateMode,
        id: i64,
        body: &[u8],
    ) -> Result<ResourceResponse, ApiError> {
        let operation = mode.operation();
        self.check_identifier(operation, id)?;

        // Only a partial update needs the current state
        let existing = match mode {
            UpdateMode::Full => {
                self.ensure_exists(operation, id)?;
                None
            }
            UpdateMode::Partial => Some(
                self.repository
                    .find_by_id(id)
                    .map_err(|err| self.internal(operation, Some(id), err))?
                    .ok_or_else(|| self.not_found(operation, id))?,
            ),
        };

        let dto = self.bind(operation, body)?;
        let validated = match mode {
            UpdateMode::Full => self.adapter.validate_update(&dto),
            UpdateMode::Partial => self.adapter.validate_partial(&dto),
        };
        validated.map_err(|violations| self.rejected(operation, Some(id), violations))?;

        if let Some(body_id) = self.adapter.dto_id(&dto) {
            if body_id != id {
                tracing::debug!(
                    resource = self.adapter.resource_name(),
                    id,
                    body_id,
                    "identifier mismatch"
                );
                return Err(ApiError::invalid_body(
                    operation,
                    format!("Body id {body_id} does not match path id {id}"),
                ));
            }
        }

        self.transact(operation, Some(id), |repository, adapter, tx| {
            match (mode, existing) {
                (UpdateMode::Partial, Some(existing)) => {
                    repository.update_partial(tx, adapter.merge_partial(existing, dto))
                }
                _ => repository.update(tx, adapter.to_entity(dto, Some(id))),
            }
        })?;

        tracing::info!(
            resource = self.adapter.resource_name(),
            id,
            operation = %operation,
            "updated entity"
        );
        Ok(ResourceResponse::no_content())
    }

    /// Open a transaction and run `work` in a scope over it
    fn transact<T, F>(
        &self,
        operation: ApiOperation,
        id: Option<i64>,
        work: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce(&R, &A, &mut R::Transaction) -> Result<T, RepositoryError>,
    {
        let transaction = self
            .repository
            .begin_transaction()
            .map_err(|err| self.internal(operation, id, err))?;

        TransactionScope::run(transaction, |tx| work(&self.repository, &self.adapter, tx))
            .map_err(|err: RepositoryError| self.internal(operation, id, err))
    }

    fn check_identifier(&self, operation: ApiOperation, id: i64) -> Result<(), ApiError> {
        if id <= 0 {
            tracing::debug!(
                resource = self.adapter.resource_name(),
                id,
                "rejecting non-positive identifier"
            );
            return Err(ApiError::invalid_identifier(operation, id));
        }
        Ok(())
    }

    fn ensure_exists(&self, operation: ApiOperation, id: i64) -> Result<(), ApiError> {
        let exists = self
            .repository
            .exists(id)
            .map_err(|err| self.internal(operation, Some(id), err))?;
        if exists {
            Ok(())
        } else {
            Err(self.not_found(operation, id))
        }
    }

    fn bind(&self, operation: ApiOperation, body: &[u8]) -> Result<A::Dto, ApiError> {
        serde_json::from_slice(body).map_err(|err| {
            tracing::debug!(
                resource = self.adapter.resource_name(),
                operation = %operation,
                error = %err,
                "request body did not bind"
            );
            ApiError::invalid_body(operation, format!("Invalid request body: {err}"))
        })
    }

    fn render(
        &self,
        operation: ApiOperation,
        accept: Option<&str>,
        payload: Payload<'_, A::Dto>,
    ) -> Result<RenderedBody, ApiError> {
        let representation = negotiation::negotiate_header(accept);
        negotiation::render(representation, payload, &AdapterXml(&self.adapter))
            .map_err(|err| self.internal(operation, None, err))
    }

    fn rejected(
        &self,
        operation: ApiOperation,
        id: Option<i64>,
        violations: super::Violations,
    ) -> ApiError {
        tracing::debug!(
            resource = self.adapter.resource_name(),
            operation = %operation,
            id,
            violations = violations.count(),
            "validation failed"
        );
        ApiError::validation_failed(operation, violations)
    }

    fn not_found(&self, operation: ApiOperation, id: i64) -> ApiError {
        ApiError::not_found(operation, self.adapter.resource_name(), id)
    }

    fn internal(
        &self,
        operation: ApiOperation,
        id: Option<i64>,
        detail: impl std::fmt::Display,
    ) -> ApiError {
        let mut error = ApiError::internal(operation, detail);
        if let Some(id) = id {
            error = error.with_entity(self.adapter.resource_name(), id.to_string());
        }
        if self.options.expose_internal_errors {
            error = error.expose_detail();
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::handlers::ApiErrorKind;
    use crate::negotiation::{APPLICATION_JSON, APPLICATION_XML};
    use crate::memory::InMemoryRepository;
    use crate::test_support::{seeded, seeded_with, Book, BookAdapter};
    use std::sync::atomic::Ordering;

    fn kind(result: Result<ResourceResponse, ApiError>) -> ApiErrorKind {
        result.unwrap_err().kind
    }

    fn body_json(response: &ResourceResponse) -> serde_json::Value {
        serde_json::from_slice(&response.body.as_ref().unwrap().bytes).unwrap()
    }

    #[test]
    fn test_get_all_returns_json_collection() {
        let orchestrator = seeded();
        let pairs: [(&str, &str); 0] = [];
        let response = orchestrator.get_all(pairs, None).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some(APPLICATION_JSON));
        assert_eq!(body_json(&response).as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_get_all_without_paging_keys_returns_every_entity() {
        let books = (1..=25).map(|id| Book::new(id, "Vol", 100 + id)).collect();
        let orchestrator =
            ResourceOrchestrator::new(BookAdapter::new(), InMemoryRepository::with_entities(books));

        let pairs: [(&str, &str); 0] = [];
        let everything = orchestrator.get_all(pairs, None).unwrap();
        assert_eq!(body_json(&everything).as_array().unwrap().len(), 25);

        let second_page = orchestrator.get_all([("page", "2")], None).unwrap();
        let second_page = body_json(&second_page);
        assert_eq!(second_page.as_array().unwrap().len(), 5);
        assert_eq!(second_page[0]["id"], 21);
    }

    #[test]
    fn test_get_all_filters() {
        let orchestrator = seeded();
        let response = orchestrator.get_all([("pages[gt]", "400")], None).unwrap();
        let body = body_json(&response);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Dune");
    }

    #[test]
    fn test_get_all_through_adapter_query_hook() {
        let orchestrator = seeded();
        let response = orchestrator.get_all([("q", "mm")], None).unwrap();
        let body = body_json(&response);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Emma");

        // pairs the hook leaves alone still go through the schema check
        assert_eq!(
            kind(orchestrator.get_all([("q", "x"), ("colour", "red")], None)),
            ApiErrorKind::MalformedQuery
        );
    }

    #[test]
    fn test_get_all_rejects_unknown_field_and_type_mismatch() {
        let orchestrator = seeded();
        assert_eq!(
            kind(orchestrator.get_all([("colour", "red")], None)),
            ApiErrorKind::MalformedQuery
        );
        assert_eq!(
            kind(orchestrator.get_all([("pages[like]", "4%")], None)),
            ApiErrorKind::MalformedQuery
        );
        assert_eq!(
            kind(orchestrator.get_all([("title[between]", "a")], None)),
            ApiErrorKind::MalformedQuery
        );
    }

    #[test]
    fn test_get_all_xml() {
        let orchestrator = seeded();
        let pairs: [(&str, &str); 0] = [];
        let response = orchestrator.get_all(pairs, Some("application/xml")).unwrap();
        assert_eq!(response.content_type(), Some(APPLICATION_XML));
        assert_eq!(response.body.unwrap().bytes, b"<books count=\"2\"/>".to_vec());
    }

    #[test]
    fn test_get_single() {
        let orchestrator = seeded();
        let response = orchestrator.get_single(2, Some("*/*")).unwrap();
        assert_eq!(body_json(&response)["title"], "Emma");

        assert_eq!(kind(orchestrator.get_single(0, None)), ApiErrorKind::InvalidIdentifier);
        assert_eq!(kind(orchestrator.get_single(-4, None)), ApiErrorKind::InvalidIdentifier);
        assert_eq!(kind(orchestrator.get_single(99, None)), ApiErrorKind::NotFound);
    }

    #[test]
    fn test_create_round_trip() {
        let orchestrator = seeded();
        let response = orchestrator
            .create(br#"{"title":"Ubik","pages":202}"#, None)
            .unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        let created = body_json(&response);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(response.location, Some(format!("/books/{id}")));

        let fetched = orchestrator.get_single(id, None).unwrap();
        assert_eq!(body_json(&fetched), created);
        assert_eq!(orchestrator.repository().stats().ended, 1);
    }

    #[test]
    fn test_create_validation_failure_opens_no_transaction() {
        let orchestrator = seeded();
        let err = orchestrator.create(br#"{"title":"Ubik"}"#, None).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(err.violations.unwrap().field("pages")[0].code, "REQUIRED");
        assert_eq!(orchestrator.repository().stats().begun, 0);
    }

    #[test]
    fn test_create_unbindable_body() {
        let orchestrator = seeded();
        assert_eq!(
            kind(orchestrator.create(b"not json", None)),
            ApiErrorKind::ValidationFailed
        );
        assert_eq!(kind(orchestrator.create(b"", None)), ApiErrorKind::ValidationFailed);
    }

    #[test]
    fn test_update_replaces_entity() {
        let orchestrator = seeded();
        let response = orchestrator
            .update(1, br#"{"id":1,"title":"Dune Messiah","pages":256}"#)
            .unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(response.body.is_none());

        let fetched = body_json(&orchestrator.get_single(1, None).unwrap());
        assert_eq!(fetched["title"], "Dune Messiah");
        assert_eq!(fetched["pages"], 256);
    }

    #[test]
    fn test_update_identity_mismatch_opens_no_transaction() {
        let orchestrator = seeded();
        let err = orchestrator
            .update(1, br#"{"id":2,"title":"X","pages":1}"#)
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(orchestrator.repository().stats().begun, 0);
    }

    #[test]
    fn test_partial_update_identity_mismatch_opens_no_transaction() {
        let orchestrator = seeded();
        let err = orchestrator
            .update_partial(1, br#"{"id":2,"title":"X"}"#)
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(orchestrator.repository().stats().begun, 0);
        let fetched = body_json(&orchestrator.get_single(1, None).unwrap());
        assert_eq!(fetched["title"], "Dune");
    }

    #[test]
    fn test_update_stage_order() {
        let orchestrator = seeded();
        // identifier before existence before validation
        assert_eq!(kind(orchestrator.update(0, b"{}")), ApiErrorKind::InvalidIdentifier);
        assert_eq!(kind(orchestrator.update(42, b"{}")), ApiErrorKind::NotFound);
        assert_eq!(kind(orchestrator.update(1, b"{}")), ApiErrorKind::ValidationFailed);
    }

    #[test]
    fn test_partial_update_merges() {
        let orchestrator = seeded();
        orchestrator.update_partial(2, br#"{"pages":321}"#).unwrap();

        let fetched = body_json(&orchestrator.get_single(2, None).unwrap());
        assert_eq!(fetched["title"], "Emma");
        assert_eq!(fetched["pages"], 321);
    }

    #[test]
    fn test_partial_update_uses_relaxed_validation() {
        let orchestrator = seeded();
        assert_eq!(
            kind(orchestrator.update_partial(2, br#"{"pages":0}"#)),
            ApiErrorKind::ValidationFailed
        );
        assert!(orchestrator.update_partial(2, b"{}").is_ok());
    }

    #[test]
    fn test_delete() {
        let orchestrator = seeded();
        let response = orchestrator.delete(1).unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(kind(orchestrator.get_single(1, None)), ApiErrorKind::NotFound);
        assert_eq!(kind(orchestrator.delete(1)), ApiErrorKind::NotFound);
    }

    #[test]
    fn test_delete_disabled_skips_everything() {
        let mut adapter = BookAdapter::new();
        adapter.deletion_allowed = false;
        let orchestrator = seeded_with(adapter);

        // even for a missing id the policy answers first
        assert_eq!(kind(orchestrator.delete(404)), ApiErrorKind::MethodNotAllowed);
        assert!(!orchestrator.adapter().can_delete_called.load(Ordering::SeqCst));
        assert_eq!(orchestrator.repository().stats().begun, 0);
    }

    #[test]
    fn test_delete_entity_in_use() {
        let mut adapter = BookAdapter::new();
        adapter.in_use = vec![2];
        let orchestrator = seeded_with(adapter);

        let err = orchestrator.delete(2).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(err.message, ENTITY_IN_USE_MESSAGE);
        assert_eq!(orchestrator.repository().stats().begun, 0);
    }

    #[test]
    fn test_failed_mutation_rolls_back_and_releases_once() {
        let orchestrator = seeded();
        orchestrator.repository().fail_next_mutation("disk full");

        let err = orchestrator
            .create(br#"{"title":"Ubik","pages":202}"#, None)
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InternalError);
        assert!(err.reference.is_some());
        assert_eq!(err.message, crate::handlers::INTERNAL_ERROR_MESSAGE);

        let stats = orchestrator.repository().stats();
        assert_eq!(stats.begun, 1);
        assert_eq!(stats.rolled_back, 1);
        assert_eq!(stats.committed, 0);
        assert_eq!(stats.ended, 1);
        assert_eq!(orchestrator.repository().len(), 2);
    }

    #[test]
    fn test_failed_commit_leaves_no_change() {
        let orchestrator = seeded();
        orchestrator.repository().fail_next_commit("replica lag");

        let err = orchestrator.update_partial(1, br#"{"title":"Changed"}"#).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InternalError);

        let fetched = body_json(&orchestrator.get_single(1, None).unwrap());
        assert_eq!(fetched["title"], "Dune");
        assert_eq!(orchestrator.repository().stats().ended, 1);
    }

    #[test]
    fn test_delete_returning_false_is_internal_error() {
        let orchestrator = seeded().with_options(ResourceOptions {
            expose_internal_errors: true,
            ..ResourceOptions::default()
        });
        orchestrator.repository().refuse_next_delete();

        let err = orchestrator.delete(1).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InternalError);
        assert!(err.message.contains(DELETE_FAILED_MESSAGE));
        assert_eq!(orchestrator.repository().stats().rolled_back, 1);
        assert!(orchestrator.get_single(1, None).is_ok());
    }

    #[test]
    fn test_options_from_config() {
        let config = ResourcesConfig {
            default_per_page: 5,
            max_per_page: 10,
            expose_internal_errors: true,
        };
        let options = ResourceOptions::from(&config);
        assert_eq!(options.max_per_page, 10);
        assert!(options.expose_internal_errors);
        assert!(options.base_path.is_none());
    }
}
