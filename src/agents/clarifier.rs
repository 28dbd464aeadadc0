//! Clarification dialogue agent.
//!
//! Enriches an under-specified request through a bounded question/answer
//! dialogue before synthesis begins. The loop is a state machine over
//! rounds: the opening round must produce a question (the generator is told
//! it may not terminate yet), later rounds may end the dialogue with an
//! exact sentinel, and the round cap ends it unconditionally.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::interact::Questioner;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::pipeline::RunConfig;
use crate::prompts::{build_clarify_system, clarify_round_message};

/// Exact-match token by which the generator ends the dialogue voluntarily.
pub const SENTINEL: &str = "DONE";

/// An ordered question/answer pair from the dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaPair {
    /// The question the generator asked.
    pub question: String,
    /// The non-empty answer the user gave.
    pub answer: String,
}

/// The recorded dialogue for one request.
///
/// Pairs are append-only and chronological. The enriched request is a
/// derived view recomputed on demand, never mutated in place.
#[derive(Debug, Clone)]
pub struct Dialogue {
    /// The original request, immutable once accepted.
    pub request: String,
    /// Recorded pairs in dialogue order.
    pub pairs: Vec<QaPair>,
}

impl Dialogue {
    /// Creates an empty dialogue for a request.
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            pairs: Vec::new(),
        }
    }

    /// Renders the enriched request: the original plus a structured
    /// "Clarified Requirements" section listing each pair in recorded order.
    /// With zero pairs this is the original request verbatim.
    pub fn enriched(&self) -> String {
        if self.pairs.is_empty() {
            return self.request.clone();
        }

        let mut lines = vec![self.request.clone(), String::new()];
        lines.push("## Clarified Requirements".to_string());
        for pair in &self.pairs {
            lines.push(format!("- Q: {}", pair.question));
            lines.push(format!("  A: {}", pair.answer));
        }
        lines.join("\n")
    }
}

/// Agent running the clarification dialogue.
pub struct ClarifierAgent {
    llm: Arc<dyn LlmProvider>,
}

impl std::fmt::Debug for ClarifierAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarifierAgent").finish_non_exhaustive()
    }
}

impl ClarifierAgent {
    /// Creates a new clarifier agent.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Runs the dialogue and returns the recorded pairs.
    ///
    /// Rounds where the answer is empty are silently dropped; the sentinel
    /// round records nothing. Generator transport failures abort the run.
    pub async fn clarify(
        &self,
        request: &str,
        config: &RunConfig,
        questioner: &dyn Questioner,
    ) -> Result<Dialogue, PipelineError> {
        let mut dialogue = Dialogue::new(request);

        for round in 0..config.max_questions {
            let pairs: Vec<(String, String)> = dialogue
                .pairs
                .iter()
                .map(|p| (p.question.clone(), p.answer.clone()))
                .collect();
            let system = build_clarify_system(request, &pairs);

            let generation = GenerationRequest::new(
                config.reasoning_model.clone(),
                vec![
                    Message::system(system),
                    Message::user(clarify_round_message(round)),
                ],
            );

            let response = self
                .llm
                .generate(generation)
                .await
                .map_err(PipelineError::Clarification)?;
            let question = response.first_content().unwrap_or_default().trim().to_string();

            if question.eq_ignore_ascii_case(SENTINEL) {
                if round == 0 {
                    debug!("Generator declared requirements clear on the opening round");
                } else {
                    debug!(round, "No more questions needed");
                }
                break;
            }

            let answer = questioner.ask(&question).await?;
            if answer.trim().is_empty() {
                debug!(round, "Empty answer, dropping round");
                continue;
            }

            dialogue.pairs.push(QaPair {
                question,
                answer: answer.trim().to_string(),
            });
        }

        info!(pairs = dialogue.pairs.len(), "Clarification complete");
        Ok(dialogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::Mutex;

    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, TokenStream, Usage};

    /// Provider replaying canned responses in order.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        calls: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            let mut responses: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("lock poisoned").len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            let content = self
                .responses
                .lock()
                .expect("lock poisoned")
                .pop()
                .unwrap_or_else(|| SENTINEL.to_string());
            self.calls.lock().expect("lock poisoned").push(request);
            Ok(GenerationResponse {
                id: "test-id".to_string(),
                model: "test-model".to_string(),
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage::default(),
            })
        }

        async fn generate_stream(
            &self,
            request: GenerationRequest,
        ) -> Result<TokenStream, LlmError> {
            let response = self.generate(request).await?;
            let text = response.first_content().unwrap_or_default().to_string();
            Ok(futures::stream::iter(vec![Ok(text)]).boxed())
        }
    }

    /// Questioner replaying a fixed list of answers.
    struct ScriptedQuestioner {
        answers: Mutex<Vec<String>>,
    }

    impl ScriptedQuestioner {
        fn new(answers: &[&str]) -> Self {
            let mut answers: Vec<String> = answers.iter().map(|s| s.to_string()).collect();
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
            }
        }
    }

    #[async_trait]
    impl Questioner for ScriptedQuestioner {
        async fn ask(&self, _question: &str) -> std::io::Result<String> {
            Ok(self
                .answers
                .lock()
                .expect("lock poisoned")
                .pop()
                .unwrap_or_default())
        }
    }

    fn config(max_questions: usize) -> RunConfig {
        RunConfig::new().with_max_questions(max_questions)
    }

    #[tokio::test]
    async fn test_records_answered_rounds_in_order() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "Vertical layout?",
            "Auto-refresh?",
            "done",
        ]));
        let questioner = ScriptedQuestioner::new(&["yes", "every 5s"]);
        let agent = ClarifierAgent::new(provider);

        let dialogue = agent
            .clarify("a process monitor", &config(10), &questioner)
            .await
            .expect("dialogue should complete");

        assert_eq!(dialogue.pairs.len(), 2);
        assert_eq!(dialogue.pairs[0].question, "Vertical layout?");
        assert_eq!(dialogue.pairs[0].answer, "yes");
        assert_eq!(dialogue.pairs[1].question, "Auto-refresh?");
        assert_eq!(dialogue.pairs[1].answer, "every 5s");
    }

    #[tokio::test]
    async fn test_sentinel_is_case_insensitive_and_drops_its_round() {
        let provider = Arc::new(ScriptedProvider::new(&["A question?", "DoNe"]));
        let questioner = ScriptedQuestioner::new(&[""]);
        let agent = ClarifierAgent::new(provider.clone());

        let dialogue = agent
            .clarify("a text editor", &config(3), &questioner)
            .await
            .expect("dialogue should complete");

        // Round 0's answer was empty so nothing was recorded; the sentinel
        // round records nothing either.
        assert!(dialogue.pairs.is_empty());
        assert_eq!(dialogue.enriched(), "a text editor");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_answers_never_become_pairs() {
        let provider = Arc::new(ScriptedProvider::new(&["Q1?", "Q2?", "done"]));
        let questioner = ScriptedQuestioner::new(&["", "  "]);
        let agent = ClarifierAgent::new(provider);

        let dialogue = agent
            .clarify("a file browser", &config(10), &questioner)
            .await
            .expect("dialogue should complete");

        assert!(dialogue.pairs.is_empty());
    }

    #[tokio::test]
    async fn test_round_cap_ends_dialogue_without_sentinel() {
        // Provider never says the sentinel; cap must cut the loop.
        let provider = Arc::new(ScriptedProvider::new(&["Q1?", "Q2?", "Q3?", "Q4?", "Q5?"]));
        let questioner = ScriptedQuestioner::new(&["a", "b", "c", "d", "e"]);
        let agent = ClarifierAgent::new(provider.clone());

        let dialogue = agent
            .clarify("a dashboard", &config(3), &questioner)
            .await
            .expect("dialogue should complete");

        assert_eq!(dialogue.pairs.len(), 3);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_round_zero_message_forbids_sentinel() {
        let provider = Arc::new(ScriptedProvider::new(&["done"]));
        let questioner = ScriptedQuestioner::new(&[]);
        let agent = ClarifierAgent::new(provider.clone());

        let _ = agent
            .clarify("a clock", &config(2), &questioner)
            .await
            .expect("dialogue should complete");

        let calls = provider.calls.lock().unwrap();
        let first_user_msg = &calls[0].messages.last().unwrap().content;
        assert!(first_user_msg.contains("Do NOT respond with DONE"));
    }

    #[tokio::test]
    async fn test_enriched_request_lists_pairs_in_order() {
        let mut dialogue = Dialogue::new("a todo list");
        dialogue.pairs.push(QaPair {
            question: "Keyboard shortcuts?".to_string(),
            answer: "vim style".to_string(),
        });
        dialogue.pairs.push(QaPair {
            question: "Persistence?".to_string(),
            answer: "json file".to_string(),
        });

        let enriched = dialogue.enriched();
        assert!(enriched.starts_with("a todo list"));
        assert!(enriched.contains("## Clarified Requirements"));
        let first = enriched.find("- Q: Keyboard shortcuts?").unwrap();
        let second = enriched.find("- Q: Persistence?").unwrap();
        assert!(first < second);
        assert!(enriched.contains("  A: vim style"));
    }

    #[tokio::test]
    async fn test_zero_pairs_round_trips_request_exactly() {
        let dialogue = Dialogue::new("exactly this request");
        assert_eq!(dialogue.enriched(), "exactly this request");
    }
}
