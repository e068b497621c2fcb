/// Shared types used across the codebase

use std::fmt;

/// Collection operations performed by the record store.
/// Carried on store errors and in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Create,
    Update,
    Delete,
    Ping,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Select => "select",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Ping => "ping",
        };
        f.write_str(name)
    }
}
