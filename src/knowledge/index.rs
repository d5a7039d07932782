//! 关键词倒排索引 - 固定法律词表到类别的映射
//!
//! 只索引封闭词表中的词条，不做任意分词；匹配是小写子串包含，
//! 会出现词条落在更长词中间的过匹配，这是有意保留的简化。
//! 索引从语料快照整体构建，语料重载时整体重建，不做增量更新。

use std::collections::{BTreeSet, HashMap, HashSet};

use super::corpus::Corpus;

// ============================================================================
// Vocabulary
// ============================================================================

/// 固定法律词表 - 可索引的全部词条
pub const LEGAL_TERMS: &[&str] = &[
    "工资", "劳动", "合同", "赔偿", "违约", "解除", "终止",
    "社保", "公积金", "加班", "休假", "辞退", "裁员",
    "欺诈", "侵权", "债务", "借款", "担保", "抵押",
    "房产", "租赁", "物业", "拆迁", "征收",
    "离婚", "抚养", "赡养", "继承", "遗产",
    "交通", "事故", "保险", "医疗", "工伤",
    "刑事", "犯罪", "举报", "证据", "诉讼",
];

/// 从文本中提取词表词条（小写子串包含）
pub fn extract_terms(text: &str) -> HashSet<String> {
    let mut terms = HashSet::new();
    if text.is_empty() {
        return terms;
    }

    let lower = text.to_lowercase();
    for term in LEGAL_TERMS {
        if lower.contains(term) {
            terms.insert((*term).to_string());
        }
    }

    terms
}

// ============================================================================
// KeywordIndex
// ============================================================================

/// 倒排索引：词条 -> 含有该词条的类别位置集合
///
/// 位置是类别在语料中的加载顺序下标，`BTreeSet` 保证候选集
/// 遍历顺序与语料顺序一致。
pub struct KeywordIndex {
    map: HashMap<String, BTreeSet<usize>>,
}

impl KeywordIndex {
    /// 从语料快照构建索引
    ///
    /// 每个类别的词条 = 类别 ID（小写，恒有） ∪ 标题中的词表词条
    /// ∪ 每部法律名称中的词条 ∪ 每条条文内容中的词条。
    /// 处理流程文本不参与索引，只参与打分。
    pub fn build(corpus: &Corpus) -> Self {
        let mut map: HashMap<String, BTreeSet<usize>> = HashMap::new();

        for (idx, cat) in corpus.iter().enumerate() {
            let mut terms = extract_terms(&cat.title);
            terms.insert(cat.id.to_lowercase());

            for law in &cat.laws {
                terms.extend(extract_terms(&law.name));
                for article in &law.articles {
                    terms.extend(extract_terms(&article.content));
                }
            }

            for term in terms {
                map.entry(term).or_default().insert(idx);
            }
        }

        tracing::debug!("关键词索引构建完成，共 {} 个词条", map.len());

        Self { map }
    }

    /// 查找词条对应的类别位置集合
    pub fn lookup(&self, term: &str) -> Option<&BTreeSet<usize>> {
        self.map.get(term)
    }

    /// 索引中的词条数
    pub fn term_count(&self) -> usize {
        self.map.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_corpus() -> (TempDir, Corpus) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("labor.json"),
            r#"{"category":"劳动纠纷","title":"拖欠工资",
                "laws":[{"name":"劳动法","articles":[{"number":"第五十条","content":"不得拖欠工资"}]}],
                "procedures":["向劳动监察投诉"]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("rent.json"),
            r#"{"category":"房屋租赁","title":"租赁合同纠纷",
                "laws":[{"name":"民法典","articles":[{"number":"第七百零三条","content":"租赁合同是出租人将租赁物交付承租人使用"}]}],
                "procedures":[]}"#,
        )
        .unwrap();
        let corpus = Corpus::load_dir(dir.path()).unwrap();
        (dir, corpus)
    }

    #[test]
    fn test_extract_terms_containment() {
        let terms = extract_terms("老板拖欠工资还不缴社保");
        assert!(terms.contains("工资"));
        assert!(terms.contains("社保"));
        assert!(!terms.contains("合同"));
    }

    #[test]
    fn test_extract_terms_empty() {
        assert!(extract_terms("").is_empty());
        assert!(extract_terms("今天天气不错").is_empty());
    }

    #[test]
    fn test_index_title_and_article_terms() {
        let (_dir, corpus) = test_corpus();
        let index = KeywordIndex::build(&corpus);

        // "工资" 出现在 labor 的标题和条文中 (位置 0)
        let postings = index.lookup("工资").unwrap();
        assert!(postings.contains(&0));
        assert!(!postings.contains(&1));

        // "合同" 出现在 rent 的标题和条文中 (位置 1)
        let postings = index.lookup("合同").unwrap();
        assert!(postings.contains(&1));
    }

    #[test]
    fn test_index_always_contains_category_id() {
        let (_dir, corpus) = test_corpus();
        let index = KeywordIndex::build(&corpus);

        assert!(index.lookup("labor").unwrap().contains(&0));
        assert!(index.lookup("rent").unwrap().contains(&1));
    }

    #[test]
    fn test_index_term_maps_to_multiple_categories() {
        let (_dir, corpus) = test_corpus();
        let index = KeywordIndex::build(&corpus);

        // "租赁" 在 rent 标题/条文中；labor 没有
        let postings = index.lookup("租赁").unwrap();
        assert_eq!(postings.len(), 1);

        // "劳动" 在 labor 的标题外、法律名"劳动法"和流程里——流程不索引，
        // 但法律名会命中
        let postings = index.lookup("劳动").unwrap();
        assert!(postings.contains(&0));
    }

    #[test]
    fn test_procedures_not_indexed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("only_proc.json"),
            r#"{"category":"测试","title":"无关标题","laws":[],
                "procedures":["申请劳动仲裁"]}"#,
        )
        .unwrap();
        let corpus = Corpus::load_dir(dir.path()).unwrap();
        let index = KeywordIndex::build(&corpus);

        // "仲裁" 不在词表里本来就不会进索引；"劳动" 在词表里，
        // 但只出现在流程文本中，因此不应被索引
        assert!(index.lookup("劳动").is_none());
    }
}
