//! Collaborator operations backing the companion app: guardian directory and panic ledger.

use shared::{
    domain::{ContactValidationError, GuardianContact, PanicLogEntry},
    error::{ApiError, ErrorCode},
    protocol::{GuardianContactDto, SaveGuardianRequest},
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn get_guardian_contact(ctx: &ApiContext) -> Result<GuardianContactDto, ApiError> {
    let contact = ctx
        .storage
        .load_guardian_contact()
        .await
        .map_err(internal)?;
    Ok(GuardianContactDto::from(contact))
}

pub async fn save_guardian_contact(
    ctx: &ApiContext,
    request: SaveGuardianRequest,
) -> Result<GuardianContact, ApiError> {
    let contact =
        GuardianContact::new(&request.name, &request.phone_number).map_err(validation)?;
    ctx.storage
        .save_guardian_contact(&contact)
        .await
        .map_err(internal)?;
    info!("guardian: contact saved");
    Ok(contact)
}

pub async fn log_panic_activation(ctx: &ApiContext) -> Result<PanicLogEntry, ApiError> {
    let entry = ctx.storage.append_panic_log().await.map_err(internal)?;
    info!(timestamp = %entry.timestamp, "panic: activation logged");
    Ok(entry)
}

pub async fn get_panic_log(ctx: &ApiContext) -> Result<Vec<PanicLogEntry>, ApiError> {
    ctx.storage.list_panic_log().await.map_err(internal)
}

fn validation(err: ContactValidationError) -> ApiError {
    ApiError::new(ErrorCode::Validation, err.to_string())
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
