mod client;

pub use client::{ChatClient, PromptMessage, PromptRole};
