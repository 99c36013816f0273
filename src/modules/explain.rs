//! Prose explanation of a rendered trace

use anyhow::Result;

use super::readable::HumanReadableTrace;
use crate::infrastructure::llm::{ChatClient, Explanation, Tense};

/// Explain a rendered trace; the images of every labelled contract are attached
pub async fn explain(
    client: &ChatClient,
    trace: &HumanReadableTrace,
    tense: Tense,
) -> Result<Explanation> {
    let images = trace.images();
    client.explain(std::slice::from_ref(trace), tense, images).await
}
