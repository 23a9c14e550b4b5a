//! Chat presentation helpers — confidence bands, mode copy, example questions.
//!
//! Everything here is derived display content. The frontend renders it as-is;
//! none of it feeds back into the store or the transport.

use serde::{Deserialize, Serialize};

use crate::models::enums::QuestionMode;

/// Welcome screen greeting for the advisor.
pub const WELCOME_TITLE: &str = "안녕하세요, 설계사님! 무엇을 도와드릴까요?";
pub const WELCOME_SUBTITLE: &str =
    "보험 약관 문의부터 맞춤형 설계 추천까지, 업무에 필요한 모든 정보를 빠르고 정확하게 제공해드립니다.";

/// Coarse confidence band for the answer badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

/// Band boundaries: ≥ 0.8 high, ≥ 0.6 medium, below that low.
pub fn confidence_band(confidence: f32) -> ConfidenceBand {
    if confidence >= 0.8 {
        ConfidenceBand::High
    } else if confidence >= 0.6 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Korean label shown next to the confidence bar.
pub fn confidence_label(confidence: f32) -> &'static str {
    match confidence_band(confidence) {
        ConfidenceBand::High => "높음",
        ConfidenceBand::Medium => "보통",
        ConfidenceBand::Low => "낮음",
    }
}

/// Example question shown on the welcome screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleQuestion {
    pub question: String,
    pub description: String,
}

/// Mode card title.
pub fn mode_title(mode: QuestionMode) -> &'static str {
    match mode {
        QuestionMode::QnA => "질의응답 모드",
        QuestionMode::Recommendation => "설계추천 모드",
    }
}

/// Mode card description.
pub fn mode_description(mode: QuestionMode) -> &'static str {
    match mode {
        QuestionMode::QnA => "보험 상품의 보장 내용, 면책사항, 청구 방법 등에 대해 질문하세요.",
        QuestionMode::Recommendation => "고객 정보를 바탕으로 최적의 보험 상품을 추천해드립니다.",
    }
}

/// Example questions for the selected mode, in display order.
pub fn example_questions(mode: QuestionMode) -> Vec<ExampleQuestion> {
    let pairs: &[(&str, &str)] = match mode {
        QuestionMode::QnA => &[
            ("유방암은 보장 대상입니까?", "암보험 보장 범위 문의"),
            ("실손보험 중복가입 가능한가요?", "중복가입 조건 문의"),
        ],
        QuestionMode::Recommendation => &[
            ("30대 여성 직장인에게 암보험 추천", "맞춤형 설계 요청"),
            ("월 10만원 이하 실비보험 추천", "예산 기반 설계"),
        ],
    };

    pairs
        .iter()
        .map(|(q, d)| ExampleQuestion {
            question: (*q).to_string(),
            description: (*d).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(confidence_band(1.0), ConfidenceBand::High);
        assert_eq!(confidence_band(0.8), ConfidenceBand::High);
        assert_eq!(confidence_band(0.79), ConfidenceBand::Medium);
        assert_eq!(confidence_band(0.6), ConfidenceBand::Medium);
        assert_eq!(confidence_band(0.59), ConfidenceBand::Low);
        assert_eq!(confidence_band(0.0), ConfidenceBand::Low);
    }

    #[test]
    fn labels_follow_bands() {
        assert_eq!(confidence_label(0.9), "높음");
        assert_eq!(confidence_label(0.7), "보통");
        assert_eq!(confidence_label(0.3), "낮음");
    }

    #[test]
    fn band_serializes_snake_case() {
        let json = serde_json::to_string(&ConfidenceBand::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn example_questions_differ_per_mode() {
        let qna = example_questions(QuestionMode::QnA);
        let rec = example_questions(QuestionMode::Recommendation);
        assert_eq!(qna.len(), 2);
        assert_eq!(rec.len(), 2);
        assert_ne!(qna[0].question, rec[0].question);
        assert!(qna.iter().all(|e| !e.description.is_empty()));
    }

    #[test]
    fn mode_copy_is_distinct() {
        assert_ne!(
            mode_title(QuestionMode::QnA),
            mode_title(QuestionMode::Recommendation)
        );
        assert_ne!(
            mode_description(QuestionMode::QnA),
            mode_description(QuestionMode::Recommendation)
        );
    }
}
