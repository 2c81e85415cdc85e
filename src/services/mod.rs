/// OpenAPI documentation generation.
pub mod documentation;
/// Shared busy check for pairing entry points.
pub mod eligibility;
/// Health check service.
pub mod health_service;
/// Score ledger connection supervisor.
pub mod ledger_supervisor;
/// Public matchmaking queue logic and status polling.
pub mod matchmaking_service;
/// Outcome reconciliation and scoring.
pub mod result_service;
/// Private room management.
pub mod room_service;
/// Video channel naming for the external call collaborator.
pub mod video;
