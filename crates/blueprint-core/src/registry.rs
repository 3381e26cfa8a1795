//! Curated package registry.
//!
//! Static table from tech-stack display labels to package coordinates that have
//! been checked by hand. It is the only place versions come from: a label with
//! no entry resolves to nothing and the caller must mark it for confirmation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Npm,
    Pypi,
    Crates,
    Go,
    Maven,
    Docker,
}

impl RegistryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistryKind::Npm => "npm",
            RegistryKind::Pypi => "pypi",
            RegistryKind::Crates => "crates.io",
            RegistryKind::Go => "go modules",
            RegistryKind::Maven => "maven",
            RegistryKind::Docker => "docker hub",
        }
    }
}

/// A verified package fact. Never computed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageCoordinate {
    pub name: &'static str,
    pub version_constraint: &'static str,
    pub purpose: &'static str,
    pub docs_url: &'static str,
    pub registry_kind: RegistryKind,
    /// Installed alongside the primary package at runtime (ASGI server, peer dependency, ...).
    pub is_runtime_companion: bool,
}

impl PackageCoordinate {
    /// `name@constraint` as written in documents.
    pub fn pinned(&self) -> String {
        format!("{}@{}", self.name, self.version_constraint)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Go,
    Rust,
    Java,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Java => "Java",
        }
    }

    /// Suffix used for language-qualified registry keys. TypeScript and
    /// JavaScript share the Node.js package ecosystem.
    pub fn qualifier(self) -> &'static str {
        match self {
            Language::TypeScript | Language::JavaScript => "node",
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Java => "java",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        language_by_name(s).ok_or_else(|| format!("unknown language: {s}"))
    }
}

const fn pkg(
    name: &'static str,
    version_constraint: &'static str,
    purpose: &'static str,
    docs_url: &'static str,
    registry_kind: RegistryKind,
) -> PackageCoordinate {
    PackageCoordinate {
        name,
        version_constraint,
        purpose,
        docs_url,
        registry_kind,
        is_runtime_companion: false,
    }
}

const fn companion(
    name: &'static str,
    version_constraint: &'static str,
    purpose: &'static str,
    docs_url: &'static str,
    registry_kind: RegistryKind,
) -> PackageCoordinate {
    PackageCoordinate {
        name,
        version_constraint,
        purpose,
        docs_url,
        registry_kind,
        is_runtime_companion: true,
    }
}

use RegistryKind::{Crates, Docker, Go, Maven, Npm, Pypi};

/// Registry rows. Keys are display labels, or `<label>::<qualifier>` for the
/// language-qualified variants of ambiguous labels.
static ENTRIES: &[(&str, &[PackageCoordinate])] = &[
    // --- Node.js ---
    ("Express", &[pkg("express", "^4.21.2", "HTTP server framework", "https://expressjs.com", Npm)]),
    ("Fastify", &[pkg("fastify", "^5.2.0", "HTTP server framework", "https://fastify.dev/docs/latest/", Npm)]),
    (
        "NestJS",
        &[
            pkg("@nestjs/core", "^11.0.0", "Application framework core", "https://docs.nestjs.com", Npm),
            companion("@nestjs/common", "^11.0.0", "Decorators and shared utilities", "https://docs.nestjs.com", Npm),
            companion("reflect-metadata", "^0.2.2", "Decorator metadata polyfill", "https://github.com/rbuckton/reflect-metadata", Npm),
            companion("rxjs", "^7.8.1", "Reactive streams used by Nest internals", "https://rxjs.dev", Npm),
        ],
    ),
    (
        "React",
        &[
            pkg("react", "^19.0.0", "UI component library", "https://react.dev", Npm),
            companion("react-dom", "^19.0.0", "DOM renderer for React", "https://react.dev/reference/react-dom", Npm),
        ],
    ),
    (
        "Next.js",
        &[
            pkg("next", "^15.1.0", "React framework with routing and SSR", "https://nextjs.org/docs", Npm),
            companion("react", "^19.0.0", "UI component library", "https://react.dev", Npm),
            companion("react-dom", "^19.0.0", "DOM renderer for React", "https://react.dev/reference/react-dom", Npm),
        ],
    ),
    ("Vue", &[pkg("vue", "^3.5.13", "UI framework", "https://vuejs.org/guide/", Npm)]),
    ("Angular", &[pkg("@angular/core", "^19.0.0", "Application framework", "https://angular.dev", Npm)]),
    ("Svelte", &[pkg("svelte", "^5.16.0", "UI compiler framework", "https://svelte.dev/docs", Npm)]),
    ("Tailwind CSS", &[pkg("tailwindcss", "^3.4.17", "Utility-first CSS framework", "https://tailwindcss.com/docs", Npm)]),
    (
        "Prisma",
        &[
            pkg("prisma", "^6.1.0", "Schema migrations and client generator (CLI)", "https://www.prisma.io/docs", Npm),
            companion("@prisma/client", "^6.1.0", "Generated type-safe query client", "https://www.prisma.io/docs/orm/prisma-client", Npm),
        ],
    ),
    ("BullMQ", &[pkg("bullmq", "^5.34.0", "Redis-backed job queue", "https://docs.bullmq.io", Npm)]),
    ("PostgreSQL::node", &[pkg("pg", "^8.13.1", "PostgreSQL client", "https://node-postgres.com", Npm)]),
    ("MySQL::node", &[pkg("mysql2", "^3.12.0", "MySQL client", "https://sidorares.github.io/node-mysql2/docs", Npm)]),
    ("MongoDB::node", &[pkg("mongodb", "^6.12.0", "MongoDB driver", "https://www.mongodb.com/docs/drivers/node/current/", Npm)]),
    ("Redis::node", &[pkg("ioredis", "^5.4.2", "Redis client", "https://github.com/redis/ioredis", Npm)]),
    ("SQLite::node", &[pkg("better-sqlite3", "^11.7.0", "Embedded SQLite bindings", "https://github.com/WiseLibs/better-sqlite3", Npm)]),
    ("OpenAI::node", &[pkg("openai", "^4.77.0", "OpenAI API client", "https://platform.openai.com/docs/libraries", Npm)]),
    ("Anthropic::node", &[pkg("@anthropic-ai/sdk", "^0.33.1", "Anthropic API client", "https://docs.anthropic.com/en/api/client-sdks", Npm)]),
    // --- Python ---
    ("Django", &[pkg("django", ">=5.1,<5.2", "Web framework", "https://docs.djangoproject.com/en/5.1/", Pypi)]),
    ("Flask", &[pkg("flask", ">=3.1,<4", "Web microframework", "https://flask.palletsprojects.com", Pypi)]),
    (
        "FastAPI",
        &[
            pkg("fastapi", ">=0.115,<0.116", "Async web framework", "https://fastapi.tiangolo.com", Pypi),
            companion("uvicorn", ">=0.34,<0.35", "ASGI server that runs the app", "https://www.uvicorn.org", Pypi),
        ],
    ),
    ("Celery", &[pkg("celery", ">=5.4,<6", "Distributed task queue", "https://docs.celeryq.dev", Pypi)]),
    ("SQLAlchemy", &[pkg("sqlalchemy", ">=2.0,<2.1", "SQL toolkit and ORM", "https://docs.sqlalchemy.org/en/20/", Pypi)]),
    ("PostgreSQL::python", &[pkg("psycopg[binary]", ">=3.2,<4", "PostgreSQL driver", "https://www.psycopg.org/psycopg3/docs/", Pypi)]),
    ("MySQL::python", &[pkg("pymysql", ">=1.1,<2", "MySQL driver", "https://pymysql.readthedocs.io", Pypi)]),
    ("MongoDB::python", &[pkg("pymongo", ">=4.10,<5", "MongoDB driver", "https://pymongo.readthedocs.io", Pypi)]),
    ("Redis::python", &[pkg("redis", ">=5.2,<6", "Redis client", "https://redis-py.readthedocs.io", Pypi)]),
    ("OpenAI::python", &[pkg("openai", ">=1.58,<2", "OpenAI API client", "https://platform.openai.com/docs/libraries", Pypi)]),
    ("Anthropic::python", &[pkg("anthropic", ">=0.42,<1", "Anthropic API client", "https://docs.anthropic.com/en/api/client-sdks", Pypi)]),
    // --- Rust ---
    (
        "Axum",
        &[
            pkg("axum", "0.8", "HTTP server framework", "https://docs.rs/axum", Crates),
            companion("tokio", "1", "Async runtime (features = [\"full\"])", "https://docs.rs/tokio", Crates),
        ],
    ),
    ("Actix Web", &[pkg("actix-web", "4", "HTTP server framework", "https://actix.rs/docs", Crates)]),
    ("PostgreSQL::rust", &[pkg("sqlx", "0.8", "Async SQL toolkit (features = [\"postgres\"])", "https://docs.rs/sqlx", Crates)]),
    ("MySQL::rust", &[pkg("sqlx", "0.8", "Async SQL toolkit (features = [\"mysql\"])", "https://docs.rs/sqlx", Crates)]),
    ("SQLite::rust", &[pkg("rusqlite", "0.32", "Embedded SQLite bindings", "https://docs.rs/rusqlite", Crates)]),
    ("Redis::rust", &[pkg("redis", "0.27", "Redis client", "https://docs.rs/redis", Crates)]),
    ("MongoDB::rust", &[pkg("mongodb", "3", "MongoDB driver", "https://docs.rs/mongodb", Crates)]),
    // --- Go ---
    ("Gin", &[pkg("github.com/gin-gonic/gin", "v1.10.0", "HTTP web framework", "https://gin-gonic.com/docs/", Go)]),
    ("Echo", &[pkg("github.com/labstack/echo/v4", "v4.13.3", "HTTP web framework", "https://echo.labstack.com/docs", Go)]),
    ("PostgreSQL::go", &[pkg("github.com/jackc/pgx/v5", "v5.7.2", "PostgreSQL driver", "https://pkg.go.dev/github.com/jackc/pgx/v5", Go)]),
    ("Redis::go", &[pkg("github.com/redis/go-redis/v9", "v9.7.0", "Redis client", "https://redis.uptrace.dev", Go)]),
    ("MongoDB::go", &[pkg("go.mongodb.org/mongo-driver", "v1.17.1", "MongoDB driver", "https://www.mongodb.com/docs/drivers/go/current/", Go)]),
    // --- Java ---
    (
        "Spring Boot",
        &[pkg("org.springframework.boot:spring-boot-starter-web", "3.4.1", "Web application starter", "https://docs.spring.io/spring-boot/", Maven)],
    ),
    ("PostgreSQL::java", &[pkg("org.postgresql:postgresql", "42.7.4", "PostgreSQL JDBC driver", "https://jdbc.postgresql.org/documentation/", Maven)]),
    // --- Server images, used when no runtime language is known ---
    ("PostgreSQL", &[pkg("postgres", "17", "PostgreSQL server image", "https://hub.docker.com/_/postgres", Docker)]),
    ("MySQL", &[pkg("mysql", "8.4", "MySQL server image", "https://hub.docker.com/_/mysql", Docker)]),
    ("MongoDB", &[pkg("mongo", "8.0", "MongoDB server image", "https://hub.docker.com/_/mongo", Docker)]),
    ("Redis", &[pkg("redis", "7.4", "Redis server image", "https://hub.docker.com/_/redis", Docker)]),
    ("RabbitMQ", &[pkg("rabbitmq", "4.0-management", "Message broker image with management UI", "https://hub.docker.com/_/rabbitmq", Docker)]),
];

/// Labels whose package depends on the implementation language.
const LANGUAGE_AMBIGUOUS: &[&str] = &[
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "sqlite",
    "openai",
    "anthropic",
];

const LANGUAGE_NAMES: &[(&str, Language)] = &[
    ("typescript", Language::TypeScript),
    ("javascript", Language::JavaScript),
    ("python", Language::Python),
    ("go", Language::Go),
    ("golang", Language::Go),
    ("rust", Language::Rust),
    ("java", Language::Java),
];

/// Frameworks that only exist for a single language.
const SINGLE_LANGUAGE_FRAMEWORKS: &[(&str, Language)] = &[
    ("express", Language::JavaScript),
    ("fastify", Language::JavaScript),
    ("node.js", Language::JavaScript),
    ("bullmq", Language::JavaScript),
    ("nestjs", Language::TypeScript),
    ("angular", Language::TypeScript),
    ("next.js", Language::TypeScript),
    ("nextjs", Language::TypeScript),
    ("prisma", Language::TypeScript),
    ("django", Language::Python),
    ("flask", Language::Python),
    ("fastapi", Language::Python),
    ("celery", Language::Python),
    ("sqlalchemy", Language::Python),
    ("gin", Language::Go),
    ("echo", Language::Go),
    ("fiber", Language::Go),
    ("axum", Language::Rust),
    ("actix web", Language::Rust),
    ("rocket", Language::Rust),
    ("spring boot", Language::Java),
];

static INDEX: Lazy<HashMap<String, &'static [PackageCoordinate]>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|(key, pkgs)| (key.to_lowercase(), *pkgs))
        .collect()
});

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn language_by_name(label: &str) -> Option<Language> {
    let key = normalize(label);
    LANGUAGE_NAMES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, lang)| *lang)
}

/// Resolve a tech-stack label to verified package coordinates.
///
/// Language-ambiguous labels (databases, AI provider clients) are probed with
/// the language qualifier first. Anything not in the table resolves to an
/// empty slice.
pub fn resolve_packages(label: &str, language: Option<Language>) -> &'static [PackageCoordinate] {
    let key = normalize(label);
    if let Some(lang) = language {
        if LANGUAGE_AMBIGUOUS.contains(&key.as_str()) {
            let qualified = format!("{key}::{}", lang.qualifier());
            if let Some(&pkgs) = INDEX.get(&qualified) {
                return pkgs;
            }
        }
    }
    INDEX.get(&key).copied().unwrap_or(&[])
}

/// Guess the implementation language from a node's tech labels.
///
/// An explicit language label wins over anything implied by a framework.
/// `None` means no runtime should be assumed.
pub fn detect_language<S: AsRef<str>>(labels: &[S]) -> Option<Language> {
    labels
        .iter()
        .find_map(|l| language_by_name(l.as_ref()))
        .or_else(|| {
            labels.iter().find_map(|l| {
                let key = normalize(l.as_ref());
                SINGLE_LANGUAGE_FRAMEWORKS
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, lang)| *lang)
            })
        })
}

/// Number of registry rows (for diagnostics).
pub fn entry_count() -> usize {
    ENTRIES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn express_resolves_to_npm_package() {
        let pkgs = resolve_packages("Express", None);
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "express");
        assert_eq!(pkgs[0].registry_kind, RegistryKind::Npm);
        assert!(!pkgs[0].is_runtime_companion);
    }

    #[test]
    fn unknown_label_resolves_to_nothing() {
        assert!(resolve_packages("Quantum Mesh DB", None).is_empty());
        assert!(resolve_packages("Quantum Mesh DB", Some(Language::Rust)).is_empty());
        assert!(resolve_packages("", None).is_empty());
    }

    #[test]
    fn ambiguous_label_prefers_language_qualified_entry() {
        assert_eq!(resolve_packages("PostgreSQL", Some(Language::Python))[0].name, "psycopg[binary]");
        assert_eq!(resolve_packages("PostgreSQL", Some(Language::TypeScript))[0].name, "pg");
        assert_eq!(resolve_packages("PostgreSQL", None)[0].name, "postgres");
    }

    #[test]
    fn ambiguous_label_without_qualified_entry_falls_back_to_plain_key() {
        // No Java Redis client is curated; the server image is still a verified fact.
        let pkgs = resolve_packages("Redis", Some(Language::Java));
        assert_eq!(pkgs[0].registry_kind, RegistryKind::Docker);
    }

    #[test]
    fn ai_clients_need_a_language() {
        assert!(resolve_packages("OpenAI", None).is_empty());
        assert_eq!(resolve_packages("OpenAI", Some(Language::Python))[0].name, "openai");
    }

    #[test]
    fn qualified_keys_are_not_probed_for_unambiguous_labels() {
        // "Express" is not ambiguous, so the language does not matter.
        assert_eq!(resolve_packages("Express", Some(Language::Python))[0].name, "express");
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(resolve_packages("  fastapi ", None)[0].name, "fastapi");
    }

    #[test]
    fn companions_are_flagged() {
        let pkgs = resolve_packages("FastAPI", None);
        assert_eq!(pkgs.len(), 2);
        assert!(pkgs[1].is_runtime_companion);
        assert_eq!(pkgs[1].name, "uvicorn");
    }

    #[test]
    fn explicit_language_beats_framework() {
        assert_eq!(detect_language(&["Express", "TypeScript"]), Some(Language::TypeScript));
    }

    #[test]
    fn framework_implies_language() {
        assert_eq!(detect_language(&["PostgreSQL", "Django"]), Some(Language::Python));
        assert_eq!(detect_language(&["Axum"]), Some(Language::Rust));
        assert_eq!(detect_language(&["Next.js", "PostgreSQL"]), Some(Language::TypeScript));
    }

    #[test]
    fn next_js_node_gets_the_node_client() {
        let language = detect_language(&["Next.js", "PostgreSQL"]);
        assert_eq!(resolve_packages("PostgreSQL", language)[0].name, "pg");
    }

    #[test]
    fn unknown_stack_detects_nothing() {
        assert_eq!(detect_language(&["PostgreSQL", "React"]), None);
        assert_eq!(detect_language::<&str>(&[]), None);
    }

    #[test]
    fn every_entry_is_fully_populated() {
        for (key, pkgs) in ENTRIES {
            assert!(!pkgs.is_empty(), "{key}");
            for p in *pkgs {
                assert!(!p.name.is_empty(), "{key}");
                assert!(!p.version_constraint.is_empty(), "{key}");
                assert!(p.docs_url.starts_with("https://"), "{key}");
            }
        }
    }

    #[test]
    fn registry_keys_are_unique() {
        assert_eq!(INDEX.len(), entry_count());
    }

    #[test]
    fn language_parses_from_label() {
        assert_eq!("golang".parse::<Language>(), Ok(Language::Go));
        assert!("cobol".parse::<Language>().is_err());
    }
}
