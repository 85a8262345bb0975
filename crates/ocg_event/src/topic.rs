//! Typed event topics
//!
//! Topic names follow `<phase>:call` for the wildcard topics and
//! `<phase>:<method>` for per-method topics; the generic error topic is
//! plain `error`.

use ocg_core::Method;
use std::fmt;

/// Dispatch phase a topic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
    Error,
}

/// A notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// `before:call`
    BeforeCall,
    /// `before:<method>`
    Before(Method),
    /// `after:call`
    AfterCall,
    /// `after:<method>`
    After(Method),
    /// `error`
    Error,
    /// `error:<method>`
    ErrorOf(Method),
}

impl Topic {
    pub fn phase(&self) -> Phase {
        match self {
            Topic::BeforeCall | Topic::Before(_) => Phase::Before,
            Topic::AfterCall | Topic::After(_) => Phase::After,
            Topic::Error | Topic::ErrorOf(_) => Phase::Error,
        }
    }

    /// Method a scoped topic is bound to; `None` for wildcard topics
    pub fn method(&self) -> Option<Method> {
        match self {
            Topic::Before(m) | Topic::After(m) | Topic::ErrorOf(m) => Some(*m),
            _ => None,
        }
    }

    /// The topic's string identifier
    pub fn name(&self) -> String {
        match self {
            Topic::BeforeCall => "before:call".to_string(),
            Topic::Before(m) => format!("before:{}", m.name()),
            Topic::AfterCall => "after:call".to_string(),
            Topic::After(m) => format!("after:{}", m.name()),
            Topic::Error => "error".to_string(),
            Topic::ErrorOf(m) => format!("error:{}", m.name()),
        }
    }

    /// Parse a topic identifier
    pub fn parse(name: &str) -> Option<Topic> {
        match name {
            "before:call" => return Some(Topic::BeforeCall),
            "after:call" => return Some(Topic::AfterCall),
            "error" => return Some(Topic::Error),
            _ => {}
        }

        let (phase, method) = name.split_once(':')?;
        let method = Method::from_name(method)?;
        match phase {
            "before" => Some(Topic::Before(method)),
            "after" => Some(Topic::After(method)),
            "error" => Some(Topic::ErrorOf(method)),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
