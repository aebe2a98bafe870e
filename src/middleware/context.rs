use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::middleware::auth::authenticate;
use crate::middleware::scope::{ManagedScope, resolve_scope};
use crate::modules::auth::model::Principal;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Everything downstream code needs to know about the caller: who they are,
/// which tenant slice they are operating in, and the id correlating this
/// request across log lines.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub principal: Principal,
    pub scope: ManagedScope,
    pub correlation_id: String,
}

tokio::task_local! {
    static CURRENT_CONTEXT: RequestContext;
}

/// Read the context of the currently-executing request, when called from a
/// task inside the request pipeline. Code outside a request (startup,
/// background jobs) gets `None`.
pub fn current_context() -> Option<RequestContext> {
    CURRENT_CONTEXT.try_with(|ctx| ctx.clone()).ok()
}

fn request_correlation_id(request: &Request<Body>) -> String {
    for name in ["x-request-id", "x-correlation-id"] {
        if let Some(value) = request.headers().get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    uuid::Uuid::new_v4().to_string()
}

/// Authenticates the request, resolves its tenant scope, and runs the rest
/// of the pipeline inside that context. The context rides in three places:
/// request extensions (for extractors), a task-local (for code without a
/// request handle), and response extensions (for the audit recorder, which
/// sits outside this layer).
pub async fn context_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = authenticate(request.headers(), &state)?;
    let scope = resolve_scope(request.headers(), &principal, state.directory.as_ref()).await?;

    let context = RequestContext {
        principal,
        scope,
        correlation_id: request_correlation_id(&request),
    };

    request.extensions_mut().insert(context.clone());

    let mut response = CURRENT_CONTEXT
        .scope(context.clone(), next.run(request))
        .await;

    response.extensions_mut().insert(context);
    Ok(response)
}
