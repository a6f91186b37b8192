//! AI room generation: the prompt, the structured-output schema handed to the
//! model, and validation of what comes back.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::authoring::{ChapterDraft, HintDraft, RoomDraft};
use crate::error::CoreError;
use crate::theme::RoomTheme;

/// Errors from interpreting a model response.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Model response is not valid room JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Model response failed validation: {0}")]
    Invalid(String),
}

/// A room as produced by the model. Mirrors [`room_response_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedRoom {
    pub title: String,
    pub description: String,
    pub theme: RoomTheme,
    pub chapters: Vec<GeneratedChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedChapter {
    pub title: String,
    pub content: String,
    pub answer: String,
    pub hints: Vec<GeneratedHint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedHint {
    pub content: String,
}

/// Validate and trim a user's generation prompt.
pub fn validate_prompt(prompt: &str) -> Result<&str, CoreError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Prompt is required".to_string()));
    }
    Ok(trimmed)
}

/// The full instruction sent to the model for a user's room description.
pub fn build_room_prompt(description: &str) -> String {
    format!(
        r#"Create an engaging escape room based on the following description: "{description}"

Generate a complete escape room with:
- A compelling title and description
- 3-5 chapters/puzzles that fit the theme
- Each chapter should have:
  - A descriptive title
  - Rich content that sets the scene and presents the puzzle
  - A clear answer (keep it simple, one word or short phrase)
  - 2-4 helpful hints that progressively guide players

Make the puzzles creative, varied (riddles, logic, wordplay, codes, etc.), and thematically consistent.
The difficulty should progress from easier to harder chapters.
"#
    )
}

/// Structured-output schema for the model, in the OpenAPI subset the
/// generative language API accepts.
pub fn room_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "The title of the escape room."
            },
            "description": {
                "type": "STRING",
                "description": "A brief description of the escape room scenario."
            },
            "theme": {
                "type": "STRING",
                "format": "enum",
                "enum": RoomTheme::names(),
                "description": "The visual theme for the escape room."
            },
            "chapters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": {
                            "type": "STRING",
                            "description": "The title of the chapter."
                        },
                        "content": {
                            "type": "STRING",
                            "description": "The main content of the chapter, including puzzles, riddles, or story elements."
                        },
                        "answer": {
                            "type": "STRING",
                            "description": "The correct answer to the chapter's puzzle (lowercase, no extra spaces)."
                        },
                        "hints": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "content": {
                                        "type": "STRING",
                                        "description": "The hint text to help solve the puzzle."
                                    }
                                },
                                "required": ["content"]
                            },
                            "description": "Array of hints to help solve the chapter."
                        }
                    },
                    "required": ["title", "content", "answer", "hints"]
                },
                "description": "Array of chapters/puzzles in the escape room."
            }
        },
        "required": ["title", "description", "theme", "chapters"]
    })
}

/// Parse and validate the model's JSON text.
pub fn parse_generated_room(text: &str) -> Result<GeneratedRoom, GenerationError> {
    let room: GeneratedRoom = serde_json::from_str(text.trim())?;
    if room.chapters.is_empty() {
        return Err(GenerationError::Invalid(
            "room must contain at least one chapter".to_string(),
        ));
    }
    Ok(room)
}

impl From<GeneratedRoom> for RoomDraft {
    fn from(room: GeneratedRoom) -> Self {
        RoomDraft {
            title: room.title,
            description: Some(room.description),
            theme: Some(room.theme.as_str().to_string()),
            chapters: room
                .chapters
                .into_iter()
                .map(|c| ChapterDraft {
                    id: None,
                    title: c.title,
                    content: c.content,
                    answer: c.answer,
                    hints: c
                        .hints
                        .into_iter()
                        .map(|h| HintDraft {
                            id: None,
                            content: h.content,
                        })
                        .collect(),
                    generate_audio: false,
                })
                .collect(),
        }
    }
}
