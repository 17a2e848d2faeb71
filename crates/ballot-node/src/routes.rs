use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ballot_core::{Block, ChainStats, IntegrityViolation, VotePayload, VoteReceipt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

/// Missing fields deserialize as empty so the ledger reports them as an
/// invalid payload instead of axum rejecting the body.
#[derive(Debug, Deserialize)]
pub struct VoteIn {
    #[serde(default)]
    voter_id: String,
    #[serde(default, alias = "candidate_name")]
    candidate: String,
}

#[derive(Serialize)]
pub struct Cast {
    message: &'static str,
    block: Block,
    receipt: Option<VoteReceipt>,
}

#[derive(Serialize)]
pub struct Verification {
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    block: Option<Block>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
pub struct Validation {
    valid: bool,
    violation: Option<IntegrityViolation>,
    stats: ChainStats,
    chain: Vec<Block>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn cast_vote(
    State(state): State<AppState>,
    Json(vote): Json<VoteIn>,
) -> Result<(StatusCode, Json<Cast>), ApiError> {
    let vote = VotePayload::new(vote.voter_id, vote.candidate);
    let block = state.write(move |chain| chain.append(vote)).await??;
    info!(index = block.index, hash = %block.hash, "vote recorded");

    let receipt = VoteReceipt::from_block(&block);
    Ok((
        StatusCode::CREATED,
        Json(Cast {
            message: "Vote cast successfully",
            block,
            receipt,
        }),
    ))
}

pub async fn verify_vote(
    State(state): State<AppState>,
    Path(voter_id): Path<String>,
) -> Result<Response, ApiError> {
    let lookup = voter_id.clone();
    let (block, chain_valid) = state
        .read(move |chain| (chain.find(&lookup).cloned(), chain.is_valid()))
        .await?;

    let response = match block {
        Some(block) => Json(Verification {
            verified: true,
            block: Some(block),
            chain_valid: Some(chain_valid),
            message: None,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(Verification {
                verified: false,
                block: None,
                chain_valid: None,
                message: Some(format!("No vote found for voter {voter_id}")),
            }),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn export_chain(State(state): State<AppState>) -> Result<Json<Vec<Block>>, ApiError> {
    Ok(Json(state.read(|chain| chain.export()).await?))
}

pub async fn latest_block(State(state): State<AppState>) -> Result<Json<Block>, ApiError> {
    Ok(Json(state.read(|chain| chain.latest().clone()).await?))
}

pub async fn chain_stats(State(state): State<AppState>) -> Result<Json<ChainStats>, ApiError> {
    Ok(Json(state.read(|chain| chain.stats()).await?))
}

pub async fn validate_chain(State(state): State<AppState>) -> Result<Json<Validation>, ApiError> {
    let validation = state
        .read(|chain| {
            let violation = chain.verify().err();
            Validation {
                valid: violation.is_none(),
                violation,
                stats: chain.stats(),
                chain: chain.export(),
            }
        })
        .await?;
    if let Some(violation) = &validation.violation {
        warn!("chain validation failed: {violation}");
    }
    Ok(Json(validation))
}
