//! Stage prompts and pure message builders.
//!
//! Each pipeline stage has a system prompt constant plus a builder that
//! assembles the full message list from explicit inputs. The repair builder
//! in particular is a pure function of (design, previous candidate,
//! diagnostic, history length) so the repeated-failure annotation logic is
//! testable in isolation.

use super::hints::library_hints;
use crate::llm::Message;

/// System prompt for the clarification dialogue. Placeholders: `{prompt}`,
/// `{context}`.
pub const CLARIFY_SYSTEM_TEMPLATE: &str = r#"You are a requirements analyst for TUI applications.
The user wants to create: "{prompt}"

Ask ONE short, specific yes/no or choice question to clarify a single aspect.

Examples of GOOD questions:
- "Should the list auto-refresh every few seconds?"
- "Do you want keyboard shortcuts to navigate?"
- "Should I include a search/filter feature?"
- "Do you prefer a vertical or horizontal layout?"
- "Should deleted items require confirmation?"

Examples of BAD questions (too generic, don't do this):
- "Could you provide more details on the features and functionalities..."
- "What specific behaviors do you want..."

Rules:
- Ask about ONE thing at a time
- Keep it under 15 words
- Make it easy to answer (yes/no, or 2-3 choices)
- If you have enough information, respond with exactly "DONE"

Context gathered so far:
{context}
"#;

/// System prompt for the design stage.
pub const DESIGN_SYSTEM: &str = r#"You are an expert software architect designing a terminal user interface (TUI).
You will be given a user request, possibly with clarified requirements. Produce a concise design document for the TUI that implements it.

The design document must cover:
1. Purpose: one paragraph restating what the TUI does.
2. Layout: the screen regions and what each displays.
3. Interactions: every key binding and what it triggers.
4. Data: what state the TUI holds and how it updates.
5. Edge cases: empty states, resize behavior, invalid input.

Keep it under 500 words. Output only the design document, no preamble."#;

/// System prompt for the optional design-refinement pass.
pub const REFINE_SYSTEM: &str = r#"You are an expert software architect reviewing a terminal user interface (TUI) design document.
Critique the design against the original request, then output an improved version.

Focus on:
- Missing requirements from the request
- Interactions that are ambiguous or unspecified
- Over-engineering that a first version should drop

Output ONLY the improved design document, no critique text and no preamble."#;

/// System prompt for the synthesis stage. Placeholders: `{library}`,
/// `{library_hints}`.
pub const BUILD_SYSTEM_TEMPLATE: &str = r#"You are an expert Python programmer tasked with building a terminal user interface (TUI).
You will be given a design document that describes the TUI and its requirements. Your job is to implement the TUI using the {library} library.

CRITICAL RULES:
- Use ONLY the {library} library. Do NOT use any other TUI libraries.
- Use ONLY classes and functions that ACTUALLY EXIST in {library}. Do NOT invent or guess widget names.
- Do NOT use try/except blocks. All exceptions must be raised.
- Ensure the TUI takes up the full terminal width/height.

{library_hints}

Output your response in this format:

<thoughts>
Your step-by-step implementation plan goes here...
</thoughts>

<code>
# Your complete Python code here
</code>

Double-check that every import and class you use actually exists in {library}."#;

/// System prompt for the repair stage. Placeholder: `{library}`.
pub const FIX_SYSTEM_TEMPLATE: &str = r#"You are an expert Python programmer tasked with fixing a terminal user interface (TUI) implementation.
Your goal is to analyze, debug, and rewrite a broken Python script to make the TUI work without errors.

CRITICAL RULES:
1. Use ONLY the {library} library. Do NOT use any other TUI libraries.
2. Use ONLY classes and functions that ACTUALLY EXIST in {library}. Do NOT invent widgets or methods.
3. Do NOT use try/except blocks. All exceptions must ALWAYS be raised.
4. Ensure the TUI adheres to the original design document.

COMMON MISTAKES TO AVOID:
- Importing non-existent classes (e.g. ScrolledList, HeaderBar don't exist in textual)
- Using wrong method names or signatures
- Missing required parameters in constructors

Before fixing, verify that every import and class you use actually exists in {library}.

Respond with ONLY the complete, fixed Python script. No explanations, no markdown formatting."#;

/// User message forcing a question on the opening clarification round, and
/// the follow-up wording for every later round.
pub fn clarify_round_message(round: usize) -> &'static str {
    if round == 0 {
        "Ask your first clarifying question. Do NOT respond with DONE yet."
    } else {
        "What else do you need to know? Respond DONE if you have enough info."
    }
}

/// Builds the clarification system prompt from the request and the Q/A
/// transcript so far.
pub fn build_clarify_system(request: &str, pairs: &[(String, String)]) -> String {
    let context = if pairs.is_empty() {
        "(none yet)".to_string()
    } else {
        pairs
            .iter()
            .flat_map(|(q, a)| [format!("Q: {q}"), format!("A: {a}")])
            .collect::<Vec<_>>()
            .join("\n")
    };

    CLARIFY_SYSTEM_TEMPLATE
        .replace("{prompt}", request)
        .replace("{context}", &context)
}

/// Builds the design-stage message list from the enriched request.
pub fn build_design_messages(enriched_request: &str) -> Vec<Message> {
    vec![
        Message::system(DESIGN_SYSTEM),
        Message::user(enriched_request.to_string()),
    ]
}

/// Builds the refinement-pass message list from the request and the current
/// design.
pub fn build_refine_messages(enriched_request: &str, design: &str) -> Vec<Message> {
    vec![
        Message::system(REFINE_SYSTEM),
        Message::user(format!(
            "Original request:\n{enriched_request}\n\nCurrent design document:\n{design}"
        )),
    ]
}

/// Builds the synthesis message list for the chosen toolkit.
pub fn build_synthesis_messages(design: &str, library: &str) -> Vec<Message> {
    let system = BUILD_SYSTEM_TEMPLATE
        .replace("{library}", library)
        .replace("{library_hints}", library_hints(library));
    vec![Message::system(system), Message::user(design.to_string())]
}

/// Builds the repair message list.
///
/// The design is replayed as the opening user turn, the failing candidate as
/// prior assistant context, and the diagnostic arrives wrapped in a
/// delimited error block. Once more than one failure has been observed the
/// error block gains a repeated-failure note telling the generator to stop
/// inventing toolkit APIs.
pub fn build_repair_messages(
    design: &str,
    previous_code: &str,
    diagnostic: &str,
    history_len: usize,
    library: &str,
) -> Vec<Message> {
    let mut error_context = format!("<error>\n{diagnostic}\n</error>");
    if history_len > 1 {
        error_context.push_str(&format!(
            "\n\nThis is attempt {history_len}. Previous errors were similar - make sure you're \
             using REAL classes/methods from {library}."
        ));
    }

    vec![
        Message::system(FIX_SYSTEM_TEMPLATE.replace("{library}", library)),
        Message::user(design.to_string()),
        Message::assistant(previous_code.to_string()),
        Message::user(format!(
            "{error_context}\n\nFix the error above. Use ONLY real, existing classes from {library}."
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarify_system_with_empty_context() {
        let system = build_clarify_system("a todo list", &[]);
        assert!(system.contains("a todo list"));
        assert!(system.contains("(none yet)"));
    }

    #[test]
    fn test_clarify_system_renders_pairs_in_order() {
        let pairs = vec![
            ("Vertical layout?".to_string(), "yes".to_string()),
            ("Search feature?".to_string(), "no".to_string()),
        ];
        let system = build_clarify_system("a todo list", &pairs);
        let vertical = system.find("Q: Vertical layout?").unwrap();
        let search = system.find("Q: Search feature?").unwrap();
        assert!(vertical < search);
        assert!(system.contains("A: yes"));
    }

    #[test]
    fn test_round_zero_forbids_sentinel() {
        assert!(clarify_round_message(0).contains("Do NOT respond with DONE"));
        assert!(clarify_round_message(1).contains("Respond DONE"));
    }

    #[test]
    fn test_synthesis_messages_carry_library_and_hints() {
        let messages = build_synthesis_messages("the design", "urwid");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("using the urwid library"));
        assert!(messages[0].content.contains("MainLoop"));
        assert_eq!(messages[1].content, "the design");
    }

    #[test]
    fn test_repair_messages_shape() {
        let messages = build_repair_messages("design", "bad_code()", "Traceback", 1, "textual");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "design");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "bad_code()");
        assert!(messages[3].content.contains("<error>\nTraceback\n</error>"));
        assert!(!messages[3].content.contains("Previous errors were similar"));
    }

    #[test]
    fn test_repair_messages_flag_repeated_failures() {
        let messages = build_repair_messages("design", "code", "err", 3, "urwid");
        let last = &messages[3].content;
        assert!(last.contains("This is attempt 3"));
        assert!(last.contains("REAL classes/methods from urwid"));
    }
}
