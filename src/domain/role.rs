use serde::{Deserialize, Serialize};

/// Role a worker is bound to
///
/// The set is closed: every registry slot corresponds to exactly one
/// variant, and at most one worker occupies a slot at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Planner,
    Architect,
    BackendBuilder,
    FrontendBuilder,
    Verifier,
    SecuritySpecialist,
    OperationsEngineer,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 7] = [
        Role::Planner,
        Role::Architect,
        Role::BackendBuilder,
        Role::FrontendBuilder,
        Role::Verifier,
        Role::SecuritySpecialist,
        Role::OperationsEngineer,
    ];

    /// Stable key used in shared-context keys (`task:<id>:<role>`)
    pub fn as_key(&self) -> &'static str {
        match self {
            Role::Planner => "planner",
            Role::Architect => "architect",
            Role::BackendBuilder => "backend_builder",
            Role::FrontendBuilder => "frontend_builder",
            Role::Verifier => "verifier",
            Role::SecuritySpecialist => "security_specialist",
            Role::OperationsEngineer => "operations_engineer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Planner => write!(f, "Planner"),
            Role::Architect => write!(f, "Architect"),
            Role::BackendBuilder => write!(f, "BackendBuilder"),
            Role::FrontendBuilder => write!(f, "FrontendBuilder"),
            Role::Verifier => write!(f, "Verifier"),
            Role::SecuritySpecialist => write!(f, "SecuritySpecialist"),
            Role::OperationsEngineer => write!(f, "OperationsEngineer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_key() == s || role.to_string() == s)
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}
