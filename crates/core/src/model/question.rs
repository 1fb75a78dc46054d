use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::difficulty::Difficulty;
use crate::model::ids::QuestionId;
use crate::sampler::Candidate;

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Which of the four options is correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            AnswerKey::A => 0,
            AnswerKey::B => 1,
            AnswerKey::C => 2,
            AnswerKey::D => 3,
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKey {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerKey::A),
            "B" => Ok(AnswerKey::B),
            "C" => Ok(AnswerKey::C),
            "D" => Ok(AnswerKey::D),
            _ => Err(QuestionError::InvalidAnswerKey(s.to_string())),
        }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question subject cannot be empty")]
    EmptySubject,

    #[error("question text cannot be empty")]
    EmptyPrompt,

    #[error("option {0} cannot be empty")]
    EmptyOption(AnswerKey),

    #[error("invalid answer key: {0}")]
    InvalidAnswerKey(String),
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated multiple-choice question, as entered or imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub subject: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: [String; 4],
    pub correct_answer: AnswerKey,
    pub reasoning: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft and assign it an id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the subject, prompt, or any option is blank.
    pub fn validate(self, id: QuestionId, now: DateTime<Utc>) -> Result<Question, QuestionError> {
        let subject = self.subject.trim().to_string();
        if subject.is_empty() {
            return Err(QuestionError::EmptySubject);
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        const KEYS: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];
        for (key, option) in KEYS.iter().zip(self.options.iter()) {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption(*key));
            }
        }

        Ok(Question {
            id,
            subject,
            difficulty: self.difficulty,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            reasoning: self
                .reasoning
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            created_at: now,
        })
    }
}

/// A multiple-choice question in the shared bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    subject: String,
    difficulty: Difficulty,
    prompt: String,
    options: [String; 4],
    correct_answer: AnswerKey,
    reasoning: Option<String>,
    created_at: DateTime<Utc>,
}

impl Question {
    /// Rehydrate a question from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if persisted fields fail validation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: QuestionId,
        subject: String,
        difficulty: Difficulty,
        prompt: String,
        options: [String; 4],
        correct_answer: AnswerKey,
        reasoning: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            subject,
            difficulty,
            prompt,
            options,
            correct_answer,
            reasoning,
        }
        .validate(id, created_at)
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> AnswerKey {
        self.correct_answer
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer.index()]
    }

    #[must_use]
    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Candidate for Question {
    type Id = QuestionId;

    fn candidate_id(&self) -> QuestionId {
        self.id
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}
