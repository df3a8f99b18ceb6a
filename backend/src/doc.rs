//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the batch review endpoints, the schema wrappers for
//! domain types, and the header-based operator authentication scheme. The
//! document is exported with `cargo run --bin openapi-dump`.

use crate::inbound::http::commit_batches::{
    AUTHENTICATED_USER_HEADER, CommitBatchSummaryBody, DryRunResponseBody, ExecutedResponseBody,
    ListBatchesResponseBody, RollbackBatchRequestBody, RollbackBatchResponseBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, RollbackResultSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the operator header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AuthenticatedUser",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                AUTHENTICATED_USER_HEADER,
                "Operator identity set by the authenticating proxy.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Church records backend API",
        description = "Review and roll back OCR auto-commit batches.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AuthenticatedUser" = [])),
    paths(
        crate::inbound::http::commit_batches::list_commit_batches,
        crate::inbound::http::commit_batches::rollback_commit_batch,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RollbackResultSchema,
        RollbackBatchRequestBody,
        RollbackBatchResponseBody,
        DryRunResponseBody,
        ExecutedResponseBody,
        CommitBatchSummaryBody,
        ListBatchesResponseBody,
    )),
    tags(
        (name = "review", description = "Auto-commit batch review and rollback")
    )
)]
pub struct ApiDoc;
