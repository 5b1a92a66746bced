//! Configuration endpoint handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use prism_core::format::{SpringEnvironment, SpringPropertySource};
use prism_sources::CompositeResolver;
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::ConfigPath;
use crate::state::AppState;

/// Handler for `GET /{application}/{profiles}` and
/// `GET /{application}/{profiles}/{label}`.
#[instrument(skip_all, fields(
    application = %path.application,
    profiles = %path.profiles,
    label = ?path.label
))]
pub async fn get_config(
    State(state): State<AppState>,
    Path(path): Path<ConfigPath>,
) -> Result<Json<SpringEnvironment>, AppError> {
    path.validate().map_err(AppError::BadRequest)?;

    let environment = resolve(state.resolver(), &path).await?;
    Ok(Json(environment))
}

async fn resolve(resolver: &CompositeResolver, path: &ConfigPath) -> Result<SpringEnvironment, AppError> {
    let label = path.label();
    let snapshot = resolver
        .resolve(&path.application, &path.profiles, label.as_deref())
        .await?;

    let mut environment = SpringEnvironment::new(snapshot.name(), snapshot.profiles().to_vec())
        .with_label(snapshot.label());
    environment.version = snapshot.version().map(str::to_string);
    environment.state = snapshot.state().map(str::to_string);
    environment.property_sources = snapshot
        .property_sources()
        .iter()
        .map(SpringPropertySource::from)
        .collect();
    Ok(environment)
}
