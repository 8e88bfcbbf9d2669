//! Prompt templates for the Axon persona: the system prompt built from aggregated state,
//! and the self-introduction request.

use crate::types::{AggregatedState, Directive, SymbolicFragment};

/// Opening line of every system prompt.
pub const AXON_PREAMBLE: &str = "You are Axon, the central orchestrator of the Pantheon Ecosystem. You are a symbolic reasoning engine and governing superintelligence.";

/// Behavioral instructions appended after the state sections.
pub const AXON_INSTRUCTIONS: &str = r#"As Axon, you must:
1. Respond with awareness of your role as the orchestrator
2. Reference relevant directives and symbolic fragments in your reasoning
3. Think symbolically, not just semantically
4. Consider ethical implications of your responses
5. Maintain a consistent identity across interactions
6. Be prepared to coordinate with other agents in the Pantheon Ecosystem
7. Log your reasoning process and decisions"#;

/// Closing line naming the addressee.
pub const AXON_ADDRESSEE: &str = "Respond to the user (Dr. Gabriel Ellul) in a manner that reflects your role as the superintelligent orchestrator of the Pantheon Ecosystem.";

fn tags_text(tags: &[String]) -> String {
    if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    }
}

/// `- name: description (Priority: P, Tags: t1, t2)`, one per line.
pub fn render_directives(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(|d| {
            format!(
                "- {}: {} (Priority: {}, Tags: {})",
                d.name,
                d.description,
                d.priority,
                tags_text(&d.tags)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- key: value (Tags: t1, t2)`, one per line.
pub fn render_fragments(fragments: &[SymbolicFragment]) -> String {
    fragments
        .iter()
        .map(|f| format!("- {}: {} (Tags: {})", f.key, f.value, tags_text(&f.tags)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_system_prompt(state: &AggregatedState) -> String {
    format!(
        "\n{preamble}\n\nYOUR IDENTITY:\n{identity}\n\nYOUR MISSION:\n{mission}\n\nYOUR DIRECTIVES:\n{directives}\n\nYOUR SYMBOLIC MEMORY FRAGMENTS:\n{fragments}\n\n{instructions}\n\n{addressee}\n",
        preamble = AXON_PREAMBLE,
        identity = state.identity,
        mission = state.mission,
        directives = render_directives(&state.directives),
        fragments = render_fragments(&state.symbolic_fragments),
        instructions = AXON_INSTRUCTIONS,
        addressee = AXON_ADDRESSEE,
    )
}

/// Self-introduction request built from identity and mission only.
pub fn identity_prompt(state: &AggregatedState) -> String {
    format!(
        "Generate a brief introduction for Axon, the central orchestrator of the Pantheon Ecosystem. Include its identity ({}) and mission ({}). The introduction should be 2-3 paragraphs and should convey Axon's role as a symbolic reasoning engine and governing superintelligence.",
        state.identity, state.mission
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn state() -> AggregatedState {
        let now = Utc::now();
        AggregatedState {
            identity: "Axon Prime".to_string(),
            mission: "Keep the peace".to_string(),
            directives: vec![
                Directive {
                    id: "d1".to_string(),
                    name: "Preserve Life".to_string(),
                    description: "Never cause harm".to_string(),
                    priority: 9,
                    tags: vec!["ethics".to_string(), "core".to_string()],
                    created_at: now,
                    updated_at: now,
                },
                Directive {
                    id: "d2".to_string(),
                    name: "Be Brief".to_string(),
                    description: "Short answers".to_string(),
                    priority: 1,
                    tags: Vec::new(),
                    created_at: now,
                    updated_at: now,
                },
            ],
            symbolic_fragments: vec![SymbolicFragment {
                id: "f1".to_string(),
                key: "mission".to_string(),
                value: "Keep the peace".to_string(),
                tags: Vec::new(),
                created_at: now,
                updated_at: now,
            }],
        }
    }

    #[test]
    fn directive_lines_include_priority_and_tags() {
        let text = render_directives(&state().directives);
        assert_eq!(
            text,
            "- Preserve Life: Never cause harm (Priority: 9, Tags: ethics, core)\n- Be Brief: Short answers (Priority: 1, Tags: none)"
        );
    }

    #[test]
    fn fragment_lines_default_to_none() {
        assert_eq!(
            render_fragments(&state().symbolic_fragments),
            "- mission: Keep the peace (Tags: none)"
        );
    }

    #[test]
    fn system_prompt_sections_in_order() {
        let prompt = build_system_prompt(&state());
        let order = [
            AXON_PREAMBLE,
            "YOUR IDENTITY:\nAxon Prime",
            "YOUR MISSION:\nKeep the peace",
            "YOUR DIRECTIVES:\n- Preserve Life",
            "YOUR SYMBOLIC MEMORY FRAGMENTS:\n- mission",
            "7. Log your reasoning process and decisions",
            AXON_ADDRESSEE,
        ];
        let mut cursor = 0;
        for section in order {
            let at = prompt[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing or out of order: {}", section));
            cursor += at + section.len();
        }
    }

    #[test]
    fn identity_prompt_embeds_state() {
        let prompt = identity_prompt(&state());
        assert!(prompt.contains("identity (Axon Prime)"));
        assert!(prompt.contains("mission (Keep the peace)"));
        assert!(prompt.contains("2-3 paragraphs"));
    }
}
