//! The showrunner and the generation pipeline.
//!
//! A chat turn follows a **call → act → observe** cycle:
//!
//! 1. **Replay** the project's stored conversation behind the persona
//! 2. **Send to LLM** with the project tools
//! 3. **If tool calls**: execute them, append the results, loop back to 2
//! 4. **If text**: persist it and return it to the client
//!
//! The [`services`] cover everything that is a single model call: concept
//! extraction, scene breakdown, scripts, storyboards and reference images.

pub mod loop_runner;
pub mod prompts;
pub mod services;
pub mod showrunner;

#[cfg(test)]
pub(crate) mod testing;

pub use loop_runner::{AgentLoop, AgentOutcome};
pub use prompts::AssetKind;
pub use services::{
    AiLogger, AssetArtist, ConceptExtractor, Director, ModelSettings, Screenwriter, Scriptwriter,
};
pub use showrunner::{ChatReply, Showrunner};
