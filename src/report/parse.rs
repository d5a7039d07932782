//! 模型回复解析 - JSON 优先，文本逐行解析兜底
//!
//! 模型按提示词约定返回 JSON，但不能假设它总是守约：
//! 先截取首个 `{` 到最后一个 `}` 之间的片段做 JSON 解析，
//! 失败时退回逐行的分节文本解析。两条路径都不会失败，
//! 最差情况下返回按分类结果填充的空骨架。

use regex::Regex;

use crate::classifier::{extract_keywords, Classification};

use super::{completeness_label, AiAnalysis};

/// 解析模型回复
pub fn parse_response(response: &str, classification: &Classification) -> AiAnalysis {
    match parse_json_response(response) {
        Some(mut analysis) => {
            fill_defaults(&mut analysis, classification);
            analysis
        }
        None => {
            tracing::debug!("回复不是有效 JSON，走文本解析");
            parse_text_response(response, classification)
        }
    }
}

/// 截取 `{`..`}` 片段并尝试 JSON 解析
fn parse_json_response(response: &str) -> Option<AiAnalysis> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&response[start..=end]).ok()
}

/// 缺失字段按分类结果补默认值
fn fill_defaults(analysis: &mut AiAnalysis, classification: &Classification) {
    if analysis.assessment.completeness.is_empty() {
        analysis.assessment.completeness = completeness_label(classification).to_string();
        analysis.assessment.needs_clarification = classification.needs_clarification;
    }
    if analysis.case_analysis.is_empty() {
        analysis.case_analysis = "正在分析您的问题...".to_string();
    }
    if analysis.keywords.is_empty() {
        analysis.keywords = vec!["法律咨询".to_string()];
    }
}

/// 文本解析兜底方案
///
/// 按行扫描，根据关键字切换当前小节，列表项剥掉编号/项目符号。
fn parse_text_response(response: &str, classification: &Classification) -> AiAnalysis {
    let mut analysis = AiAnalysis::skeleton(classification);

    // 列表项前缀: "1." "2、" "•" "-" "·"
    let item_re = Regex::new(r"^(\d+[.、]|[•\-·])\s*").expect("固定正则必然有效");

    #[derive(PartialEq, Clone, Copy)]
    enum Section {
        None,
        CaseAnalysis,
        DisputePoints,
        Suggestions,
        Keywords,
        RiskWarnings,
    }

    let mut current = Section::None;

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains("案由") || line.contains("分析") {
            current = Section::CaseAnalysis;
        } else if line.contains("争议") || line.contains("焦点") {
            current = Section::DisputePoints;
        } else if line.contains("建议") {
            current = Section::Suggestions;
        } else if line.contains("关键词") {
            current = Section::Keywords;
        } else if line.contains("风险") || line.contains("注意") {
            current = Section::RiskWarnings;
        } else if current == Section::CaseAnalysis {
            analysis.case_analysis.push_str(line);
            analysis.case_analysis.push(' ');
        } else if item_re.is_match(line) {
            let content = item_re.replace(line, "").trim().to_string();
            if content.is_empty() {
                continue;
            }
            match current {
                Section::DisputePoints => analysis.dispute_points.push(content),
                Section::Suggestions => analysis.suggestions.push(content),
                Section::RiskWarnings => analysis.risk_warnings.push(content),
                _ => {}
            }
        }
    }

    if analysis.keywords.is_empty() {
        analysis.keywords = extract_keywords(response);
    }

    analysis
}

// ============================================================================
// Tests
// ============================================================================
