//! Subjects a user studies, linked to sessions.

use crate::domain::foundation::{SubjectId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A named study subject owned by a user.
///
/// Subjects are read alongside sessions; this crate never creates or edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    user_id: UserId,
    name: String,
    description: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Subject {
    pub fn reconstitute(
        id: SubjectId,
        user_id: UserId,
        name: String,
        description: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            description,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }
}
