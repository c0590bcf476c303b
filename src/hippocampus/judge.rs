//! Response judgment: decide whether the principal's latest response should
//! reach the user, whether the task should continue, or both.

use serde::{Deserialize, Serialize};

use crate::hippocampus::json::parse_lenient;
use crate::llm::LlmClient;

const JUDGE_PERSONA: &str = "You are the hippocampus — a judgment gate for a personal assistant's \
agent loop. Given the user's original request and the agent's latest response, decide whether the \
response is ready to send to the user and whether the agent should keep working.";

/// Output of [`judge_response`]. `default_result()` is the neutral default
/// used when the analyzer is disabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseJudgment {
    pub send_to_user: bool,
    pub continue_task: bool,
    pub reason: String,
}

impl ResponseJudgment {
    pub fn default_result() -> Self {
        Self {
            send_to_user: true,
            continue_task: false,
            reason: "default".to_string(),
        }
    }
}

/// Decide `{send_to_user, continue_task, reason}` for `agent_response`.
///
/// Two rules are binding regardless of what the model says, and short-
/// circuit before any model call: an empty response at `iteration <= 2`
/// forces `send_to_user=false, continue_task=true`; an empty response past
/// that forces both false. Otherwise the model's own judgment is returned
/// as-is — enforcing "if `send_to_user` is false, `continue_task` must also
/// be false except during active tool execution" is the caller's job (see
/// [`enforce_send_continue_rule`]), since the model is only advised of that
/// rule through the prompt, not hard-enforced here.
pub async fn judge_response(
    llm: &dyn LlmClient,
    original_request: &str,
    agent_response: &str,
    iteration: u32,
    is_continuation: bool,
) -> ResponseJudgment {
    if agent_response.trim().is_empty() {
        return if iteration <= 2 {
            ResponseJudgment {
                send_to_user: false,
                continue_task: true,
                reason: "empty response early in the task, giving it more turns".to_string(),
            }
        } else {
            ResponseJudgment {
                send_to_user: false,
                continue_task: false,
                reason: "empty response past the iteration limit, giving up".to_string(),
            }
        };
    }

    let prompt = format!(
        "{JUDGE_PERSONA}\n\n<original_request>\n{original_request}\n</original_request>\n\n<agent_response>\n{agent_response}\n</agent_response>\n\n<iteration>{iteration}</iteration>\n<is_continuation>{is_continuation}</is_continuation>\n\nRespond with JSON only, no prose: {{\"send_to_user\": bool, \"continue_task\": bool, \"reason\": string}}"
    );

    match llm.chat(&prompt, None).await {
        Ok(response) => parse_lenient::<ResponseJudgment>(&response).unwrap_or_else(|| {
            tracing::warn!("hippocampus: judgment response was not valid JSON");
            ResponseJudgment::default_result()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "hippocampus: response judgment LLM call failed");
            ResponseJudgment::default_result()
        }
    }
}

/// Caller-side enforcement of the rule the model is only advised of, not
/// forced to: a `false` `send_to_user` implies `continue_task` must also be
/// `false`, unless a tool is actively executing this turn.
pub fn enforce_send_continue_rule(judgment: ResponseJudgment, tool_actively_executing: bool) -> ResponseJudgment {
    if !judgment.send_to_user && judgment.continue_task && !tool_actively_executing {
        ResponseJudgment {
            continue_task: false,
            ..judgment
        }
    } else {
        judgment
    }
}
