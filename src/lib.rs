//! lawkb - 法律咨询知识引擎
//!
//! 规则分类器识别问题类型与信息完整度，关键词倒排索引
//! 检索本地 JSON 法律知识库，组合生成结构化咨询报告。
//! 外部大模型是可选协作方，未配置或失败时走本地后备分析。

pub mod chat;
pub mod classifier;
pub mod cli;
pub mod knowledge;
pub mod report;

// Re-exports
pub use chat::{has_api_key, ChatProvider, HttpChat};
pub use classifier::{
    classify, extract_keywords, Classification, ClassifyError, Completeness, QuestionType,
    RiskLevel,
};
pub use knowledge::{
    get_data_dir, search, Article, Corpus, KeywordIndex, KnowledgeBase, KnowledgeCategory,
    LawDocument, SearchResult, Statistics, DEFAULT_LIMIT,
};
pub use report::{
    build_prompt, export_to_text, fallback_analysis, parse_response, AiAnalysis, Assessment,
    Report, ReportGenerator, REPORT_SEARCH_LIMIT,
};
