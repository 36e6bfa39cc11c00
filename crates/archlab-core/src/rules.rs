/// Design rules embedded in generation prompts. Shared by every surface that asks a model for a design.
pub const RULES: &str = "\
1. Pick one architecture pattern and name it plainly (e.g. \"Modular Monolith\", \"Microservices\", \
\"Event-Driven\"). Rationale items explain why it fits THESE requirements; risks name concrete failure \
modes, not generic advice.\n\
2. Components are named after roles, not technology stacks (\"Order Service\", not \"Node + Express\"). \
Each component lists the responsibilities it owns; no responsibility is owned twice.\n\
3. No frontend-to-database shortcuts. Clients talk to an API or backend component, never directly to a \
data store.\n\
4. Queues, topics and event buses are explicit components and explicit diagram nodes, not edge labels.\n\
5. Every entity in dataModel appears as a \"table\" node in the erd diagram, with its fields as \
\"name: type\" details. Relationships between entities are erd edges.\n\
6. Every api entry uses an HTTP method in upper case and a path starting with \"/\". Paths use \
\":param\" for identifiers.\n\
7. Diagram edges point from the initiator toward the provider. One edge per relationship; do not add \
\"response\" edges.\n\
8. The c4Context diagram shows actors and the system plus external systems only. The c4Container \
diagram shows deployable units inside the system. The sequence diagram covers the primary user \
journey, one node per participant, edges labelled with the interaction in order (\"1. submit order\").\n\
9. Node ids are unique within a diagram; edge source and target must reference node ids of the same \
diagram.\n\
10. Cross-cutting production concerns the requirements imply (authentication, input validation, \
background jobs, observability) are modeled as components, not left implied.";
