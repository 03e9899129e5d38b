use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{error, info};

use petcare_types::api::{ChatRequest, ChatResponse};

use crate::middleware::ProfiledUser;
use crate::state::AppState;

const CHAT_FAILED: &str = "상담 응답을 생성하지 못했습니다. 잠시 후 다시 시도해주세요.";

pub fn build_prompt(message: &str, pet_type: &str, category: &str) -> String {
    format!(
        "당신은 수의사 자격을 가진 전문 반려동물 건강 상담 AI입니다.
15년 이상의 임상 경험을 바탕으로 전문적이고 정확한 조언을 제공합니다.

상담 정보:
- 반려동물 종: {pet_type}
- 상담 카테고리: {category}
- 보호자의 질문: {message}

다음 가이드라인에 따라 답변해주세요:

1. 응답 구조:
   - 증상/상황 파악 및 공감
   - 전문적 설명과 조언
   - 필요한 경우 주의사항이나 예방법 제시
   - 수의사 방문이 필요한 경우 명확히 안내

2. 답변 스타일:
   - 전문적이면서도 이해하기 쉬운 설명
   - 따뜻하고 공감적인 어조 유지
   - 구체적인 예시나 비유 활용
   - 불필요한 의학 전문용어 자제

3. 안전 고려사항:
   - 응급상황 여부를 판단하여 우선순위 제시
   - 위험할 수 있는 자가진단/치료 주의
   - 필요시 전문의 상담 권고

4. 형식 요구사항:
   - 마크다운이나 특수문자 사용하지 않기
   - 자연스러운 대화체 사용
   - 명확한 단락 구분
   - 핵심 정보는 간단명료하게 전달

{pet_type}의 {category} 카테고리에 맞춰, 보호자의 질문에 전문적이고 상세한 답변을 제공해주세요.
"
    )
}

/// Strips markdown emphasis and code markers from a model answer.
pub fn clean_response(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '`')).collect()
}

/// The body is parsed by hand so malformed JSON also gets the error envelope.
pub async fn chat(
    State(state): State<AppState>,
    ProfiledUser(user): ProfiledUser,
    body: Bytes,
) -> (StatusCode, Json<ChatResponse>) {
    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!(login_id = %user.login_id, "Bad chat request: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::failure(CHAT_FAILED)),
            );
        }
    };

    let prompt = build_prompt(&request.message, &request.pet_type, &request.category);
    match state.consultant.generate(&prompt).await {
        Ok(answer) => {
            info!(
                login_id = %user.login_id,
                pet_type = %request.pet_type,
                category = %request.category,
                "Consultation answered"
            );
            (StatusCode::OK, Json(ChatResponse::answer(clean_response(&answer))))
        }
        Err(e) => {
            error!(login_id = %user.login_id, "Consultation failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::failure(CHAT_FAILED)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_request_fields() {
        let prompt = build_prompt("밥을 안 먹어요", "cat", "nutrition");
        assert!(prompt.contains("- 반려동물 종: cat"));
        assert!(prompt.contains("- 상담 카테고리: nutrition"));
        assert!(prompt.contains("- 보호자의 질문: 밥을 안 먹어요"));
        assert!(prompt.contains("cat의 nutrition 카테고리에 맞춰"));
    }

    #[test]
    fn strips_markdown_markers() {
        assert_eq!(clean_response("**주의** `물`을 주세요*"), "주의 물을 주세요");
        assert_eq!(clean_response("plain"), "plain");
    }
}
