//! Prompt templates for the oracle.
//!
//! All user-facing text is Korean, matching the service's audience.

/// System message for every completion.
pub const SYSTEM_PROMPT: &str = "당신은 카카오 서비스 제공자입니다. user의 질문에 천천히 친절하게 대답해 주세요.";

/// The sentinel the classifier prompt asks for when no topic matches.
pub const NO_MATCH_SENTINEL: &str = "없음";

/// Generic apology used when the oracle is unavailable after retries.
pub const APOLOGY: &str =
    "죄송합니다. 일시적인 오류로 답변을 드리지 못했어요. 잠시 후 다시 시도해 주세요.";

/// Build the intent classification prompt: enumerate the topic labels,
/// embed the context blob and the utterance, and ask for exactly one label
/// (or the no-match sentinel).
pub fn intent_prompt(labels: &[String], context: &str, utterance: &str) -> String {
    format!(
        "다음 대화 내용과 user의 질문을 읽고, 질문이 어떤 주제에 해당하는지 판단해 주세요.\n\
         주제 목록: {labels}\n\
         질문이 목록의 주제 중 하나에 해당하면 그 주제 이름만 정확히 출력하세요.\n\
         어느 주제에도 해당하지 않으면 \"{sentinel}\"이라고만 출력하세요.\n\
         \n\
         대화 내용:\n{context}\n\
         \n\
         질문: {utterance}",
        labels = labels.join(", "),
        sentinel = NO_MATCH_SENTINEL,
        context = context,
        utterance = utterance,
    )
}

/// Build the grounded answer prompt from the retrieved passages, the
/// question, and the context.
pub fn guide_prompt(passages: &[String], question: &str, context: &str) -> String {
    let related_doc = if passages.is_empty() {
        "(참고 자료 없음)".to_string()
    } else {
        passages
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "아래 참고 자료를 바탕으로 user의 질문에 친절하게 대답해 주세요.\n\
         참고 자료에 없는 내용은 지어내지 말고, 아는 범위에서만 안내해 주세요.\n\
         \n\
         참고 자료:\n{related_doc}\n\
         \n\
         대화 내용:\n{context}\n\
         \n\
         질문: {question}",
    )
}

/// Build the fallback prompt for unmatched intents — no retrieved passages.
pub fn fallback_prompt(question: &str) -> String {
    format!(
        "user의 질문이 안내 가능한 주제를 벗어났습니다.\n\
         도와드릴 수 없다는 점을 정중하게 설명하고, 카카오 서비스에 대한 질문을 부탁드린다고 안내해 주세요.\n\
         \n\
         질문: {question}",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_prompt_enumerates_labels() {
        let labels = vec!["kakao_social".to_string(), "kakao_sink".to_string()];
        let prompt = intent_prompt(&labels, "", "카카오싱크가 뭐예요?");
        assert!(prompt.contains("kakao_social, kakao_sink"));
        assert!(prompt.contains("카카오싱크가 뭐예요?"));
        assert!(prompt.contains(NO_MATCH_SENTINEL));
    }

    #[test]
    fn guide_prompt_embeds_passages_and_context() {
        let passages = vec!["카카오싱크 : 간편가입 기능".to_string()];
        let prompt = guide_prompt(&passages, "카카오싱크가 뭐예요?", "user: 안녕하세요");
        assert!(prompt.contains("- 카카오싱크 : 간편가입 기능"));
        assert!(prompt.contains("user: 안녕하세요"));
    }

    #[test]
    fn guide_prompt_handles_empty_retrieval() {
        let prompt = guide_prompt(&[], "질문", "");
        assert!(prompt.contains("참고 자료 없음"));
    }

    #[test]
    fn fallback_prompt_has_no_passages() {
        let prompt = fallback_prompt("오늘 날씨 어때?");
        assert!(prompt.contains("오늘 날씨 어때?"));
        assert!(!prompt.contains("참고 자료:"));
    }
}
