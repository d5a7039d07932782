//! 相关法律检索 - 倒排索引候选 + 加权打分排序
//!
//! 候选集为各关键词倒排结果的并集；并集为空时回退全量扫描，
//! 保证封闭词表漏词时检索不会静默返回空。打分按关键词独立累加，
//! 同一关键词命中多条条文/流程会重复计分，不设上限。

use serde::Serialize;

use super::corpus::{Corpus, KnowledgeCategory, LawDocument};
use super::index::KeywordIndex;

// ============================================================================
// Scoring Weights
// ============================================================================

/// 标题命中
const SCORE_TITLE: u32 = 10;
/// 类别展示名命中
const SCORE_CATEGORY: u32 = 8;
/// 法律名称命中
const SCORE_LAW_NAME: u32 = 5;
/// 条文内容命中
const SCORE_ARTICLE: u32 = 2;
/// 处理流程命中
const SCORE_PROCEDURE: u32 = 3;

/// 默认返回条数
pub const DEFAULT_LIMIT: usize = 10;

// ============================================================================
// Types
// ============================================================================

/// 检索结果 - 序列化时不含分数
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// 类别 ID
    pub category: String,
    /// 标题
    pub title: String,
    /// 相关法律
    pub laws: Vec<LawDocument>,
    /// 处理流程
    pub procedures: Vec<String>,
    /// 相关度分数（内部使用，不对外序列化）
    #[serde(skip)]
    pub score: u32,
}

impl SearchResult {
    fn from_category(cat: &KnowledgeCategory, score: u32) -> Self {
        Self {
            category: cat.id.clone(),
            title: cat.title.clone(),
            laws: cat.laws.clone(),
            procedures: cat.procedures.clone(),
            score,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// 检索相关法律类别
///
/// 关键词统一转小写；空关键词列表直接返回空结果。
/// 结果按分数降序，平局保持语料顺序（稳定排序），截断到 `limit`。
pub fn search(
    corpus: &Corpus,
    index: &KeywordIndex,
    keywords: &[String],
    limit: usize,
) -> Vec<SearchResult> {
    if keywords.is_empty() {
        tracing::debug!("关键词为空，返回空结果");
        return Vec::new();
    }

    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    // 索引并集确定候选
    let mut candidates = std::collections::BTreeSet::new();
    for keyword in &lowered {
        if let Some(postings) = index.lookup(keyword) {
            candidates.extend(postings.iter().copied());
        }
    }

    // 索引未命中则回退全量扫描
    if candidates.is_empty() {
        tracing::debug!("索引未命中，回退全量扫描");
        candidates.extend(0..corpus.len());
    }

    let mut results: Vec<SearchResult> = Vec::new();
    for idx in candidates {
        let Some(cat) = corpus.get_by_index(idx) else {
            continue;
        };

        let score = relevance_score(cat, &lowered);
        if score > 0 {
            results.push(SearchResult::from_category(cat, score));
        }
    }

    // 稳定排序：平局保持候选遍历顺序（即语料顺序）
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);

    tracing::debug!("检索完成，返回 {} 条结果", results.len());

    results
}

/// 计算单个类别的相关度分数
///
/// 每个关键词独立打分后累加：
/// 标题 +10，类别展示名 +8，法律名 +5，条文内容 +2，流程 +3。
fn relevance_score(cat: &KnowledgeCategory, keywords_lower: &[String]) -> u32 {
    let mut score = 0;

    let title = cat.title.to_lowercase();
    let category = cat.category.to_lowercase();

    for keyword in keywords_lower {
        if title.contains(keyword.as_str()) {
            score += SCORE_TITLE;
        }
        if category.contains(keyword.as_str()) {
            score += SCORE_CATEGORY;
        }
    }

    for law in &cat.laws {
        let name = law.name.to_lowercase();
        for keyword in keywords_lower {
            if name.contains(keyword.as_str()) {
                score += SCORE_LAW_NAME;
            }
        }

        for article in &law.articles {
            let content = article.content.to_lowercase();
            for keyword in keywords_lower {
                if content.contains(keyword.as_str()) {
                    score += SCORE_ARTICLE;
                }
            }
        }
    }

    for procedure in &cat.procedures {
        let text = procedure.to_lowercase();
        for keyword in keywords_lower {
            if text.contains(keyword.as_str()) {
                score += SCORE_PROCEDURE;
            }
        }
    }

    score
}

// ============================================================================
// Tests
// ============================================================================
