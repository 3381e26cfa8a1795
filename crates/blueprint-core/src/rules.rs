/// Working rules for coding agents. Shared by the protocol file and every
/// model prompt.
pub const AGENT_RULES: &str = "\
1. Read before you write. Open `project-rules.md` and the spec of the component you are about to touch \
before changing any code. The rules file wins over anything you remember from other projects.\n\
2. Follow the build order. Finish every component of a phase before starting the next phase. Within a \
phase, work through components in the order they are listed.\n\
3. One component at a time. Implement a single component spec end to end (code, tests, wiring) and \
mark it done in the component registry before moving on.\n\
4. Stay inside the boundary. A component only does what its spec lists under Responsibilities. \
Everything under Anti-Responsibilities is forbidden even if it looks convenient.\n\
5. Integrations follow the table. Two components talk only if the Integration Rules table has a row \
for them, and only through the listed pattern. Do not add direct shortcuts (e.g. frontend to database).\n\
6. Never invent dependency versions. Install exactly the package names and version constraints listed \
in a spec's Tech Stack block. If a technology is marked NEEDS CONFIRMATION, stop and ask the user which \
package and version to use.\n\
7. Resolve NEEDS INPUT markers with the user. A `[NEEDS INPUT: ...]` marker means the architecture \
sketch did not say; ask instead of guessing, then update the spec with the answer.\n\
8. Boundaries flow down, questions flow up. If implementing a component shows that its spec, the build \
order or an integration is wrong, do not silently change the architecture. Describe the conflict and \
wait for approval.\n\
9. Keep secrets out of code. Credentials, API keys and connection strings come from environment \
configuration, never from source files or committed config.\n\
10. Leave the project runnable. After each component, the project builds, its tests pass, and the \
registry status reflects reality.";
