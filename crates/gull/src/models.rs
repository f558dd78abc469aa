//! These models represent the objects passed around by the agent
//!
//! A reply is built from a thread of messages reconstructed by the intake layer,
//! sent to an OpenAI-compatible chat completions backend, and extended with
//! tool requests and tool responses while the model works. We always convert
//! wire formats into these internal structs immediately, so the orchestrator
//! never deals with provider-specific json.
pub mod message;
pub mod role;
pub mod tool;
