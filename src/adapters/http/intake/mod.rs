//! HTTP adapter for intake endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatRequest, ChatResponse, ConfigListResponse, ErrorResponse, HealthResponse,
    NavigateRequest, NavigateResponse, SessionResponse, SummaryRequest, SwitchConfigRequest,
    SwitchConfigResponse,
};
pub use handlers::IntakeHandlers;
pub use routes::intake_routes;
