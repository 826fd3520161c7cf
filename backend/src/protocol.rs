//! Text protocol spoken over the WebSocket, and the JSON bodies of the
//! HTTP solve endpoint.
//!
//! Live sketches are built from `Rc` handles, so every function here is
//! synchronous: the sketch is rebuilt from the stored document, edited,
//! and serialized back before control returns to the async handler.

use gcs_core::sketch::{
    Drag, EntityId, PinAndSolve, Sketch, SketchDocument, SolveResult, SolverConfig, VariableRef,
};
use gcs_core::SketchError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed {command} payload: {source}")]
    MalformedPayload {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Sketch(#[from] SketchError),
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "UNKNOWN_COMMAND",
            Self::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            Self::Sketch(_) => "SKETCH_ERROR",
        }
    }
}

/// Format a protocol error as a JSON message for the frontend
pub fn format_error(error: &ProtocolError) -> String {
    format!(
        "ERROR_UPDATE:{}",
        json!({
            "code": error.code(),
            "message": error.to_string(),
            "severity": "error"
        })
    )
}

/// Set a variable from an input field and solve around it.
#[derive(Debug, Clone, Deserialize)]
pub struct PinRequest {
    pub variable: VariableRef,
    pub value: f64,
    #[serde(default)]
    pub hold: bool,
}

#[derive(Debug)]
pub enum Command {
    Load(SketchDocument),
    Solve { damped: bool },
    Pin(PinRequest),
    Drag(Drag),
    Get,
}

fn payload<'a, T: Deserialize<'a>>(command: &'static str, json: &'a str) -> Result<T, ProtocolError> {
    serde_json::from_str(json).map_err(|source| ProtocolError::MalformedPayload { command, source })
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim();
        if let Some(json) = text.strip_prefix("LOAD:") {
            return Ok(Self::Load(payload("LOAD", json)?));
        }
        if let Some(json) = text.strip_prefix("PIN:") {
            return Ok(Self::Pin(payload("PIN", json)?));
        }
        if let Some(json) = text.strip_prefix("DRAG:") {
            return Ok(Self::Drag(payload("DRAG", json)?));
        }
        match text {
            "SOLVE" => Ok(Self::Solve { damped: false }),
            "SOLVE_DAMPED" => Ok(Self::Solve { damped: true }),
            "GET" => Ok(Self::Get),
            other => Err(ProtocolError::UnknownCommand(other.chars().take(32).collect())),
        }
    }
}

/// Reply to every successful command.
#[derive(Debug, Clone, Serialize)]
pub struct SketchUpdate {
    pub document: SketchDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SolveResult>,
}

impl SketchUpdate {
    pub fn to_message(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("SKETCH_UPDATE:{}", json),
            Err(e) => format_error(&ProtocolError::Sketch(e.into())),
        }
    }
}

/// Apply one command to the session document. The document is replaced
/// only when the command succeeds.
pub fn execute(document: &mut SketchDocument, command: Command) -> Result<SketchUpdate, ProtocolError> {
    let (next, result) = match command {
        Command::Load(incoming) => {
            // Round-trip through a live sketch to reject dangling references
            let sketch = Sketch::from_document(&incoming)?;
            info!(figures = sketch.entities.len(), relations = sketch.relations().len(), "Loaded sketch");
            (sketch.to_document()?, None)
        }
        Command::Solve { damped } => {
            let sketch = Sketch::from_document(document)?;
            let result = sketch.solve(damped);
            info!("{}", result.status_message());
            (sketch.to_document()?, Some(result))
        }
        Command::Pin(request) => {
            let sketch = Sketch::from_document(document)?;
            let variable = sketch.resolve_variable(&request.variable)?;
            let command = PinAndSolve {
                variable,
                value: request.value,
                hold: request.hold,
            };
            let result = command.apply(&sketch);
            (sketch.to_document()?, Some(result))
        }
        Command::Drag(drag) => {
            let sketch = Sketch::from_document(document)?;
            let result = drag.apply(&sketch)?;
            (sketch.to_document()?, Some(result))
        }
        Command::Get => (document.clone(), None),
    };

    *document = next.clone();
    Ok(SketchUpdate {
        document: next,
        result,
    })
}

// =============================================================================
// HTTP
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    pub document: SketchDocument,
    #[serde(default)]
    pub constant_figures: Vec<EntityId>,
    #[serde(default)]
    pub damped: bool,
    /// Overrides the document's own solver settings
    #[serde(default)]
    pub config: Option<SolverConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveResponse {
    pub document: SketchDocument,
    pub result: SolveResult,
}

pub fn solve_request(request: SolveRequest) -> Result<SolveResponse, ProtocolError> {
    let mut sketch = Sketch::from_document(&request.document)?;
    if let Some(config) = request.config {
        config.validate()?;
        sketch.config = config;
    }
    debug!(constant = request.constant_figures.len(), damped = request.damped, "Solve request");
    let result = sketch.solve_with_constant_figures(&request.constant_figures, request.damped);
    Ok(SolveResponse {
        document: sketch.to_document()?,
        result,
    })
}
