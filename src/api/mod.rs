//! Backend API Layer
//!
//! Generic request helper plus the wire types for the fixed JSON/HTTP
//! endpoints of the glycemia backend.

mod client;
mod dto;

pub use client::{ApiClient, ApiResponse, Payload, RequestBody};
pub use dto::{
    AnalysisResponse, ChatMessage, ChatPost, Credentials, EmergencyRequest, LoginResponse,
    MeasurementRecord, RecordRequest, TelegramUpdate, UserProfile,
};
