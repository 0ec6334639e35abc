use core::fmt;

/// Which registry a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Area,
    Stimulus,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Area => f.write_str("area"),
            EntityKind::Stimulus => f.write_str("stimulus"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrainError {
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("{kind} '{name}' is not registered")]
    NotFound { kind: EntityKind, name: String },

    #[error("{kind} id {index} does not belong to this brain")]
    UnknownId { kind: EntityKind, index: usize },

    #[error("invalid {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

impl BrainError {
    pub(crate) fn duplicate(kind: EntityKind, name: &str) -> Self {
        BrainError::DuplicateName {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, name: &str) -> Self {
        BrainError::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

pub type Result<T> = core::result::Result<T, BrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = BrainError::not_found(EntityKind::Area, "missing");
        assert_eq!(err.to_string(), "area 'missing' is not registered");

        let err = BrainError::duplicate(EntityKind::Stimulus, "cat");
        assert_eq!(err.to_string(), "stimulus 'cat' already exists");
    }
}
