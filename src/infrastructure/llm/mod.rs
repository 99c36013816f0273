//! Chat-completions client used to explain decoded transactions

mod client;
mod prompts;

pub use client::{parse_reply, ChatClient, Explanation, Transfer, DEFAULT_LLM_MODEL, DEFAULT_LLM_URL};
pub use prompts::{system_prompt, Tense};
