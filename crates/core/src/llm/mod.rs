//! Chat-completion plumbing for the study solver.
//!
//! [`ChatModel`] is the seam the solver talks to; [`ChatClient`] implements
//! it against an OpenAI-compatible API. [`prompts`] holds the system prompts
//! and the builders for every user prompt.

pub mod client;
pub mod prompts;

pub use client::{
    API_KEY_ENV, BASE_URL_ENV, ChatClient, ChatConfig, ChatConfigBuilder, ChatMessage, ChatModel, ResponseFormat, Role,
    complete_json, generate_json,
};
