//! nabi-agent: conversational core for the Nabi assistant
//!
//! This crate drives one conversation: streaming agent turns, interception
//! of side-effecting tool calls into explicit confirmation forms, transcript
//! management, and thread-identity rotation.

pub mod accumulator;
pub mod config;
pub mod detector;
pub mod error;
pub mod fragment;
pub mod gate;
pub mod history;
pub mod orchestrator;
pub mod runtime;
pub mod session;
pub mod thread;
pub mod tools;

pub use accumulator::{DisplaySink, NullSink, StreamingAccumulator};
pub use config::SessionConfig;
pub use detector::ToolInvocationDetector;
pub use error::{Error, Result};
pub use fragment::{FragmentStream, StreamedFragment};
pub use gate::{FormGateState, FormKind};
pub use history::{ConversationHistory, ConversationTurn, Role};
pub use orchestrator::{AgentTurnOrchestrator, TurnOutcome};
pub use runtime::{AgentRuntime, RuntimeConfig};
pub use session::{DEFAULT_GREETING, Session};
pub use thread::ThreadIdentity;
pub use tools::ToolKind;
