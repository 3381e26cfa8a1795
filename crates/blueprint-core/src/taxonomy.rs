//! Fixed prose seeds for each component type.
//!
//! Used whenever the graph carries nothing richer: the deterministic renderer
//! falls back to these lists and the prompt builder hands them to the model as
//! a starting point.

use crate::ComponentType;

/// Everything the generators know about a component type without looking at
/// the graph.
#[derive(Debug)]
pub struct TypeProfile {
    pub label: &'static str,
    pub description: &'static str,
    /// Default responsibilities, phrased as imperatives.
    pub responsibilities: &'static [&'static str],
    /// Default anti-responsibilities as `(rule, reason)`, rendered "NEVER rule — reason".
    pub never: &'static [(&'static str, &'static str)],
    /// At most two security bullets added to the project constraints when this type is present.
    pub security: &'static [&'static str],
    /// Boundary statement used when the type is present.
    pub is_statement: &'static str,
    /// Boundary statement used when the type is absent.
    pub is_not_statement: &'static str,
    /// Titles of the type-specific sections in a component spec.
    pub spec_fields: &'static [&'static str],
}

static FRONTEND: TypeProfile = TypeProfile {
    label: "Frontend",
    description: "User-facing client application rendered in the browser or on a device",
    responsibilities: &[
        "Render the user interface and handle user interaction",
        "Manage client-side routing and navigation state",
        "Call backend APIs and present loading, empty and error states",
        "Validate form input before submission for fast feedback",
    ],
    never: &[
        ("access a database directly", "all data goes through a backend API"),
        ("embed secrets or private API keys", "everything shipped to the client is public"),
        ("hold the only copy of business rules", "the backend must enforce them independently"),
        ("trust data from URL parameters without validation", "it is attacker-controlled input"),
    ],
    security: &[
        "NEVER store secrets, private keys or service credentials in frontend code or bundles",
        "ALWAYS escape or sanitize user-generated content before rendering it",
    ],
    is_statement: "IS a user-facing application with its own client interface",
    is_not_statement: "IS NOT a user-facing application: no frontend component is defined, so do not scaffold UI code",
    spec_fields: &["Routing", "State Management"],
};

static BACKEND: TypeProfile = TypeProfile {
    label: "Backend",
    description: "Server-side service exposing business logic through an API",
    responsibilities: &[
        "Expose the API consumed by clients and other services",
        "Enforce business rules and input validation at the API boundary",
        "Coordinate reads and writes against storage components",
        "Translate internal failures into consistent error responses",
    ],
    never: &[
        ("render UI markup for end users", "presentation belongs to the frontend"),
        ("store credentials in plain text", "auth components own credential handling"),
        ("call third-party services without timeouts", "a slow dependency must not stall every request"),
        ("leak stack traces in responses", "they expose internals to callers"),
    ],
    security: &[
        "ALWAYS validate and sanitize every request payload at the API boundary",
        "NEVER return internal error details or stack traces to API callers",
    ],
    is_statement: "IS a service-backed system with server-side business logic",
    is_not_statement: "IS NOT a server-backed system: no backend component is defined, so do not invent an API layer",
    spec_fields: &["Endpoint Patterns"],
};

static STORAGE: TypeProfile = TypeProfile {
    label: "Storage",
    description: "Persistent data store such as a database, cache or object store",
    responsibilities: &[
        "Persist application data durably",
        "Enforce schema constraints and referential integrity",
        "Serve queries for the components that own its data",
        "Support backups and point-in-time recovery",
    ],
    never: &[
        ("contain business logic in triggers or procedures", "it hides behaviour from the service layer"),
        ("be reachable from the public internet", "only trusted services may connect"),
        ("be shared by unrelated services through ad-hoc queries", "ownership of the schema must stay clear"),
    ],
    security: &[
        "ALWAYS use parameterized queries; NEVER build queries by string concatenation",
        "ALWAYS encrypt sensitive data at rest and restrict database credentials to least privilege",
    ],
    is_statement: "IS a stateful system that persists data",
    is_not_statement: "IS NOT a stateful system: no storage component is defined, so do not add a database",
    spec_fields: &["Schema", "Backup & Recovery"],
};

static AUTH: TypeProfile = TypeProfile {
    label: "Auth",
    description: "Identity and access management: sign-in, sessions and tokens",
    responsibilities: &[
        "Authenticate users and issue sessions or tokens",
        "Validate and refresh tokens on behalf of other components",
        "Store and verify credentials securely",
        "Expose the identity and roles of the current principal",
    ],
    never: &[
        ("roll its own cryptography", "vetted libraries exist for every primitive it needs"),
        ("log passwords, tokens or session identifiers", "logs are widely readable"),
        ("make authorization decisions for business data", "resource owners decide what a principal may do"),
        ("store passwords with reversible encryption", "only slow one-way hashes are acceptable"),
    ],
    security: &[
        "ALWAYS hash passwords with a slow adaptive algorithm such as argon2 or bcrypt",
        "NEVER log passwords, tokens or session identifiers",
    ],
    is_statement: "IS an authenticated system with managed user identity",
    is_not_statement: "IS NOT an authenticated system: no auth component is defined, so do not add sign-in flows",
    spec_fields: &["Auth Strategy"],
};

static EXTERNAL: TypeProfile = TypeProfile {
    label: "External Service",
    description: "Third-party service or API outside the team's control",
    responsibilities: &[
        "Wrap the third-party API behind a narrow internal interface",
        "Map provider errors into internal error types",
        "Respect provider rate limits and quotas",
        "Keep provider credentials in environment configuration",
    ],
    never: &[
        ("leak provider-specific types into the rest of the codebase", "swapping providers must stay local"),
        ("hard-code API keys", "keys must come from configuration and be rotatable"),
        ("retry without a bound", "unbounded retries amplify provider outages"),
    ],
    security: &[
        "NEVER hard-code third-party credentials; ALWAYS load them from environment configuration",
        "ALWAYS set explicit timeouts on outbound network calls",
    ],
    is_statement: "IS an integrated system that depends on third-party services",
    is_not_statement: "IS NOT dependent on third-party services: no external component is defined, so do not add SDKs",
    spec_fields: &["Rate Limits", "Error Handling"],
};

static BACKGROUND: TypeProfile = TypeProfile {
    label: "Background Worker",
    description: "Asynchronous job processor, scheduler or queue consumer",
    responsibilities: &[
        "Process queued or scheduled jobs outside the request path",
        "Retry failed jobs with bounded backoff",
        "Record job outcomes for monitoring",
        "Keep each job idempotent so re-delivery is safe",
    ],
    never: &[
        ("block on user-facing request latency", "work is moved here to keep requests fast"),
        ("process a job twice with different outcomes", "queues deliver at least once"),
        ("swallow failures silently", "failed jobs must be visible and retryable"),
    ],
    security: &[
        "ALWAYS make jobs idempotent so retries and re-delivery are safe",
        "ALWAYS set explicit timeouts on outbound network calls",
    ],
    is_statement: "IS a system with asynchronous background processing",
    is_not_statement: "IS NOT running background jobs: no worker component is defined, so do not add queues or schedulers",
    spec_fields: &["Job Definitions", "Retry Policy"],
};

impl ComponentType {
    pub fn profile(self) -> &'static TypeProfile {
        match self {
            ComponentType::Frontend => &FRONTEND,
            ComponentType::Backend => &BACKEND,
            ComponentType::Storage => &STORAGE,
            ComponentType::Auth => &AUTH,
            ComponentType::External => &EXTERNAL,
            ComponentType::Background => &BACKGROUND,
        }
    }
}

/// Format an anti-responsibility seed as it appears in documents.
pub fn never_statement(rule: &str, reason: &str) -> String {
    format!("NEVER {rule} — {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_lists_stay_within_three_to_five() {
        for t in ComponentType::ALL {
            let p = t.profile();
            assert!((3..=5).contains(&p.responsibilities.len()), "{t} responsibilities");
            assert!((3..=5).contains(&p.never.len()), "{t} anti-responsibilities");
            assert!(p.security.len() <= 2, "{t} security bullets");
            assert!(!p.spec_fields.is_empty(), "{t} spec fields");
        }
    }

    #[test]
    fn never_statement_has_reason() {
        assert_eq!(
            never_statement("hard-code API keys", "keys rotate"),
            "NEVER hard-code API keys — keys rotate"
        );
    }
}
