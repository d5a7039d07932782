//! Report 模块 - 咨询报告流水线（组合根）
//!
//! 分类 -> 提示词 -> 模型调用 -> 回复解析 -> 关键词检索 -> 报告组装。
//! 模型是可选协作方：未配置或调用失败时走确定性的本地后备分析，
//! 报告流水线自身永不因模型失败而失败。
//!
//! 报告的 JSON 字段名与既有前端约定保持一致（中文键名）。

mod parse;
mod prompt;

pub use parse::parse_response;
pub use prompt::build_prompt;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chat::ChatProvider;
use crate::classifier::{classify, extract_keywords, Classification, Completeness, QuestionType};
use crate::knowledge::{KnowledgeBase, SearchResult};

/// 报告检索条数
pub const REPORT_SEARCH_LIMIT: usize = 5;

// ============================================================================
// Types
// ============================================================================

/// 问题评估
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(rename = "信息完整度", default)]
    pub completeness: String,
    #[serde(rename = "需要澄清", default)]
    pub needs_clarification: bool,
    #[serde(rename = "澄清问题", default)]
    pub clarification_questions: Vec<String>,
}

/// AI 分析结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(rename = "问题评估", default)]
    pub assessment: Assessment,
    #[serde(rename = "案由分析", default)]
    pub case_analysis: String,
    #[serde(rename = "核心争议点", default)]
    pub dispute_points: Vec<String>,
    #[serde(rename = "关键词", default)]
    pub keywords: Vec<String>,
    #[serde(rename = "行动建议", default)]
    pub suggestions: Vec<String>,
    #[serde(rename = "风险提示", default)]
    pub risk_warnings: Vec<String>,
    #[serde(rename = "特别说明", default)]
    pub special_note: String,
}

impl AiAnalysis {
    /// 按分类结果初始化的空骨架
    pub(crate) fn skeleton(classification: &Classification) -> Self {
        Self {
            assessment: Assessment {
                completeness: completeness_label(classification).to_string(),
                needs_clarification: classification.needs_clarification,
                clarification_questions: Vec::new(),
            },
            ..Self::default()
        }
    }
}

/// 完整咨询报告
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub question: String,
    pub timestamp: String,
    pub ai_analysis: AiAnalysis,
    pub relevant_laws: Vec<SearchResult>,
    pub summary: String,
}

/// 完整度的字符串标签（与分类结果的序列化形式一致）
pub(crate) fn completeness_label(classification: &Classification) -> &'static str {
    match classification.completeness {
        Completeness::Complete => "complete",
        Completeness::Vague => "vague",
        Completeness::TooShort => "too_short",
        Completeness::LackFacts => "lack_facts",
    }
}

// ============================================================================
// Fallback Analysis
// ============================================================================

/// 模型不可用时的本地后备分析
///
/// 按分类结果给出确定性的固定文案：需要澄清 / 刑事 / 一般三种。
pub fn fallback_analysis(question: &str, classification: &Classification) -> AiAnalysis {
    let mut analysis = AiAnalysis::skeleton(classification);
    analysis.keywords = extract_keywords(question);

    if classification.needs_clarification {
        analysis.case_analysis =
            "您的问题信息不够完整，为了给您提供准确的法律建议，我需要了解更多细节。".to_string();
        analysis.suggestions = vec![
            "请详细描述具体情况，包括时间、地点、人物、经过".to_string(),
            "说明涉及的金额、财产或其他利益".to_string(),
            "列出您目前掌握的证据材料".to_string(),
        ];
        analysis.assessment.clarification_questions = vec![
            "具体发生了什么事情？请描述详细经过".to_string(),
            "事情发生的时间是什么时候？".to_string(),
            "涉及的金额或财产价值是多少？".to_string(),
        ];
        analysis.dispute_points = vec!["需要补充更多信息才能准确判断".to_string()];
        analysis.risk_warnings = vec!["请提供完整信息以获得准确的法律建议".to_string()];
    } else if classification.question_type == QuestionType::Criminal {
        analysis.case_analysis = "您提到的情况可能涉及刑事犯罪。这是一个严肃的法律问题，需要谨慎处理。\n\n\
             作为公民，您有权利也有义务向相关部门举报违法犯罪行为。但请注意：\n\
             1. 不要采取违法手段收集证据\n\
             2. 不要私自调查或对抗\n\
             3. 保护好自己的人身安全\n\
             4. 通过合法途径反映问题"
            .to_string();
        analysis.suggestions = vec![
            "保存您已经掌握的合法证据材料".to_string(),
            "向公安机关、检察院或相关监管部门举报".to_string(),
            "咨询专业刑事律师，了解具体的法律程序".to_string(),
            "注意保护自己的人身安全，不要打草惊蛇".to_string(),
            "不要采取违法手段获取证据".to_string(),
        ];
        analysis.dispute_points = vec!["请参考相关法律规定".to_string()];
    } else {
        analysis.case_analysis = "根据您的描述，这是一个典型的法律问题。建议您参考相关法律规定，\
             并根据具体情况采取适当的维权措施。"
            .to_string();
        analysis.suggestions = vec![
            "收集和保存所有相关证据材料（合同、聊天记录、转账记录等）".to_string(),
            "先尝试与对方协商解决".to_string(),
            "协商不成可向劳动监察部门投诉或申请劳动仲裁".to_string(),
            "必要时可咨询专业律师或寻求法律援助".to_string(),
            "注意诉讼时效，及时采取法律行动".to_string(),
        ];
        analysis.dispute_points = vec!["请参考相关法律规定".to_string()];
    }

    analysis
}

/// 行动建议为空时的兜底建议
fn default_suggestions() -> Vec<String> {
    vec![
        "收集和保存所有相关证据材料，包括合同、聊天记录、邮件等".to_string(),
        "咨询专业律师，了解详细的法律规定和维权途径".to_string(),
        "尝试与对方协商解决，保留协商记录".to_string(),
        "如协商不成，可考虑申请劳动仲裁或提起诉讼".to_string(),
        "注意诉讼时效，及时采取法律行动".to_string(),
    ]
}

// ============================================================================
// ReportGenerator
// ============================================================================

/// 报告生成器
///
/// 持有知识库与可选的模型协作方，是对外的组合根。
pub struct ReportGenerator {
    base: Arc<KnowledgeBase>,
    chat: Option<Box<dyn ChatProvider>>,
}

impl ReportGenerator {
    pub fn new(base: Arc<KnowledgeBase>, chat: Option<Box<dyn ChatProvider>>) -> Self {
        Self { base, chat }
    }

    /// 生成完整咨询报告
    pub async fn generate(&self, question: &str) -> Result<Report> {
        let classification = classify(question).context("问题分类失败")?;
        tracing::info!(
            "问题分类: type={:?} completeness={:?} needs_clarification={}",
            classification.question_type,
            classification.completeness,
            classification.needs_clarification
        );

        // 1. 模型分析（失败降级为本地后备）
        let mut analysis = match &self.chat {
            Some(chat) => {
                let prompt = build_prompt(question, &classification);
                match chat.generate(&prompt).await {
                    Ok(reply) => parse_response(&reply, &classification),
                    Err(e) => {
                        tracing::warn!("模型调用失败，使用本地后备分析: {:#}", e);
                        fallback_analysis(question, &classification)
                    }
                }
            }
            None => fallback_analysis(question, &classification),
        };

        if analysis.suggestions.is_empty() {
            analysis.suggestions = default_suggestions();
        }

        // 2. 检索相关法律：优先用模型给出的关键词，缺失时本地派生
        let keywords = if analysis.keywords.is_empty() {
            extract_keywords(question)
        } else {
            analysis.keywords.clone()
        };
        let relevant_laws = self.base.search(&keywords, REPORT_SEARCH_LIMIT);
        tracing::info!("检索到 {} 条相关法律", relevant_laws.len());

        // 3. 组装
        let summary = generate_summary(&analysis, &relevant_laws);

        Ok(Report {
            question: question.to_string(),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ai_analysis: analysis,
            relevant_laws,
            summary,
        })
    }
}

// ============================================================================
// Summary & Export
// ============================================================================

/// 生成报告摘要
fn generate_summary(analysis: &AiAnalysis, relevant_laws: &[SearchResult]) -> String {
    let mut parts = Vec::new();

    if !analysis.case_analysis.is_empty() {
        let head: String = analysis.case_analysis.chars().take(100).collect();
        parts.push(format!("案由：{}...", head));
    }

    if !analysis.dispute_points.is_empty() {
        let points: Vec<&str> = analysis
            .dispute_points
            .iter()
            .take(3)
            .map(|s| s.as_str())
            .collect();
        parts.push(format!("主要争议点包括：{}", points.join("、")));
    }

    if !analysis.suggestions.is_empty() {
        parts.push(format!("建议采取{}项行动措施", analysis.suggestions.len()));
    }

    if !relevant_laws.is_empty() {
        parts.push(format!("涉及{}项相关法律规定", relevant_laws.len()));
    }

    if parts.is_empty() {
        return "法律咨询报告已生成，请查看详细内容。".to_string();
    }

    format!("{}。", parts.join("。"))
}

/// 导出为纯文本格式
pub fn export_to_text(report: &Report) -> String {
    let divider = "=".repeat(60);
    let mut lines = Vec::new();

    lines.push(divider.clone());
    lines.push("法律咨询报告".to_string());
    lines.push(divider.clone());
    lines.push(format!("\n问题：{}", report.question));
    lines.push(format!("时间：{}", report.timestamp));

    lines.push(format!("\n{}", divider));
    lines.push("一、案由分析".to_string());
    lines.push(divider.clone());
    lines.push(report.ai_analysis.case_analysis.clone());

    lines.push(format!("\n{}", divider));
    lines.push("二、核心争议点".to_string());
    lines.push(divider.clone());
    for (i, point) in report.ai_analysis.dispute_points.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, point));
    }

    lines.push(format!("\n{}", divider));
    lines.push("三、行动建议".to_string());
    lines.push(divider.clone());
    for (i, suggestion) in report.ai_analysis.suggestions.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, suggestion));
    }

    if !report.relevant_laws.is_empty() {
        lines.push(format!("\n{}", divider));
        lines.push("四、相关法律依据".to_string());
        lines.push(divider.clone());
        for law in &report.relevant_laws {
            lines.push(format!("\n【{}】{}", law.category, law.title));
            for doc in &law.laws {
                lines.push(format!("\n  {}", doc.name));
                for article in &doc.articles {
                    lines.push(format!("    {}", article.number));
                    lines.push(format!("    {}", article.content));
                }
            }
        }
    }

    lines.push(format!("\n{}", divider));
    lines.push("报告结束".to_string());
    lines.push(divider);

    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use tempfile::TempDir;

    const LABOR: &str = r#"{"category":"劳动纠纷","title":"拖欠工资",
        "laws":[{"name":"劳动法","articles":[{"number":"第五十条","content":"不得拖欠工资"}]}],
        "procedures":["投诉","仲裁"]}"#;

    fn test_base() -> (TempDir, Arc<KnowledgeBase>) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("labor.json"), LABOR).unwrap();
        let base = Arc::new(KnowledgeBase::open(dir.path()).unwrap());
        (dir, base)
    }

    /// 返回固定回复的模型
    struct CannedChat(String);

    #[async_trait]
    impl ChatProvider for CannedChat {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "canned"
        }
    }

    /// 恒失败的模型
    struct FailingChat;

    #[async_trait]
    impl ChatProvider for FailingChat {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            bail!("连接超时")
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_generate_without_chat_uses_fallback() {
        let (_dir, base) = test_base();
        let generator = ReportGenerator::new(base, None);

        let report = generator
            .generate("老板拖欠我三个月工资，金额共计15000元")
            .await
            .unwrap();

        assert!(!report.ai_analysis.case_analysis.is_empty());
        assert!(!report.ai_analysis.suggestions.is_empty());
        // 派生关键词 "工资" 命中 labor 类别
        assert_eq!(report.relevant_laws.len(), 1);
        assert_eq!(report.relevant_laws[0].category, "labor");
        assert!(report.summary.contains("相关法律规定"));
    }

    #[tokio::test]
    async fn test_generate_with_model_reply() {
        let (_dir, base) = test_base();
        let reply = r#"{
            "问题评估": {"信息完整度": "完整", "需要澄清": false, "澄清问题": []},
            "案由分析": "劳动报酬纠纷",
            "核心争议点": ["欠薪金额"],
            "关键词": ["工资"],
            "行动建议": ["申请劳动仲裁"],
            "风险提示": [],
            "特别说明": ""
        }"#;
        let generator = ReportGenerator::new(base, Some(Box::new(CannedChat(reply.to_string()))));

        let report = generator
            .generate("老板拖欠我三个月工资，金额共计15000元")
            .await
            .unwrap();

        assert_eq!(report.ai_analysis.case_analysis, "劳动报酬纠纷");
        assert_eq!(report.ai_analysis.suggestions, vec!["申请劳动仲裁"]);
        assert_eq!(report.relevant_laws.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_model_failure_degrades() {
        let (_dir, base) = test_base();
        let generator = ReportGenerator::new(base, Some(Box::new(FailingChat)));

        let report = generator
            .generate("老板拖欠我三个月工资，金额共计15000元")
            .await
            .unwrap();

        // 模型失败不影响报告产出
        assert!(!report.ai_analysis.case_analysis.is_empty());
        assert!(!report.ai_analysis.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_generate_empty_question_fails() {
        let (_dir, base) = test_base();
        let generator = ReportGenerator::new(base, None);

        assert!(generator.generate("").await.is_err());
    }

    #[test]
    fn test_fallback_clarification_variant() {
        let c = classify("怎么办").unwrap();
        let analysis = fallback_analysis("怎么办", &c);

        assert_eq!(analysis.assessment.clarification_questions.len(), 3);
        assert_eq!(analysis.assessment.completeness, "too_short");
        assert!(analysis.assessment.needs_clarification);
    }

    #[test]
    fn test_fallback_criminal_variant() {
        let q = "公司老板让会计做假账逃税，金额有几十万元，我要怎么举报";
        let c = classify(q).unwrap();
        let analysis = fallback_analysis(q, &c);

        assert!(analysis.case_analysis.contains("刑事犯罪"));
        assert_eq!(analysis.suggestions.len(), 5);
        assert!(analysis.assessment.clarification_questions.is_empty());
    }

    #[test]
    fn test_summary_composition() {
        let mut analysis = AiAnalysis::default();
        analysis.case_analysis = "劳动报酬纠纷".to_string();
        analysis.dispute_points = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        analysis.suggestions = vec!["x".into(), "y".into()];

        let summary = generate_summary(&analysis, &[]);
        assert!(summary.contains("案由：劳动报酬纠纷..."));
        // 争议点最多取 3 个
        assert!(summary.contains("a、b、c"));
        assert!(!summary.contains("d"));
        assert!(summary.contains("建议采取2项行动措施"));
    }

    #[test]
    fn test_export_to_text_structure() {
        let report = Report {
            question: "测试问题".to_string(),
            timestamp: "2024-01-01 00:00:00".to_string(),
            ai_analysis: AiAnalysis {
                case_analysis: "案由内容".to_string(),
                dispute_points: vec!["争议一".to_string()],
                suggestions: vec!["建议一".to_string()],
                ..AiAnalysis::default()
            },
            relevant_laws: vec![],
            summary: "摘要".to_string(),
        };

        let text = export_to_text(&report);
        assert!(text.contains("法律咨询报告"));
        assert!(text.contains("问题：测试问题"));
        assert!(text.contains("一、案由分析"));
        assert!(text.contains("1. 建议一"));
        // 没有相关法律时不输出第四节
        assert!(!text.contains("四、相关法律依据"));
    }

    #[test]
    fn test_report_serializes_with_chinese_keys() {
        let c = classify("老板拖欠我三个月工资，金额共计15000元").unwrap();
        let analysis = fallback_analysis("老板拖欠工资", &c);
        let value = serde_json::to_value(&analysis).unwrap();

        assert!(value.get("案由分析").is_some());
        assert!(value.get("行动建议").is_some());
        assert!(value.get("问题评估").unwrap().get("需要澄清").is_some());
    }
}
