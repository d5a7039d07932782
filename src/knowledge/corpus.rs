//! 知识库语料 - 法律类别的数据模型与目录加载
//!
//! 每个类别对应语料目录下的一个 JSON 文件，文件名（去扩展名）即类别 ID。
//! 目录不存在时自动创建并写入内置默认语料。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

// ============================================================================
// Types
// ============================================================================

/// 法律条文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// 条文编号（如 "第五十条"）
    pub number: String,
    /// 条文内容
    pub content: String,
}

/// 一部法律及其条文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawDocument {
    /// 法律名称
    pub name: String,
    /// 条文列表（保持文件中的顺序）
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// 知识类别 - 一个主题下的法律与处理流程
///
/// `id` 来自文件名，在整个语料中唯一；`category` 是文件内的展示名，
/// 两者可能不同（如 `criminal_law.json` 的展示名为 "刑事法律"）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeCategory {
    /// 类别 ID（文件名去掉 .json）
    #[serde(skip)]
    pub id: String,
    /// 展示名（JSON 中的 category 字段）
    #[serde(default)]
    pub category: String,
    /// 标题
    #[serde(default)]
    pub title: String,
    /// 相关法律
    #[serde(default)]
    pub laws: Vec<LawDocument>,
    /// 处理流程（有序步骤）
    #[serde(default)]
    pub procedures: Vec<String>,
}

/// 语料统计
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub categories: usize,
    pub laws: usize,
    pub articles: usize,
}

// ============================================================================
// Corpus
// ============================================================================

/// 语料快照 - 加载后不可变
///
/// 类别按文件名排序保存，检索时的平局顺序由此确定。
pub struct Corpus {
    categories: Vec<Arc<KnowledgeCategory>>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// 从目录加载全部类别
    ///
    /// 目录不存在时创建目录并写入默认语料；单个文件解析失败时
    /// 记录警告并跳过，不影响其余文件。
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            tracing::warn!("语料目录不存在，写入默认语料: {}", dir.display());
            std::fs::create_dir_all(dir).context("创建语料目录失败")?;
            seed_default_corpus(dir)?;
        }

        let mut files: Vec<_> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();

        // 文件名排序，保证加载顺序（及检索平局顺序）确定
        files.sort();

        let mut categories = Vec::with_capacity(files.len());
        let mut by_id = HashMap::with_capacity(files.len());

        for path in files {
            let id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            match load_category_file(&path, &id) {
                Ok(cat) => {
                    tracing::debug!("加载类别: {}", id);
                    by_id.insert(id, categories.len());
                    categories.push(Arc::new(cat));
                }
                Err(e) => {
                    tracing::warn!("跳过无法加载的语料文件 {}: {:#}", path.display(), e);
                }
            }
        }

        tracing::info!("语料加载完成，共 {} 个类别", categories.len());

        Ok(Self { categories, by_id })
    }

    /// 按加载顺序遍历类别
    pub fn iter(&self) -> impl Iterator<Item = &Arc<KnowledgeCategory>> {
        self.categories.iter()
    }

    /// 按 ID 查找
    pub fn get(&self, id: &str) -> Option<&Arc<KnowledgeCategory>> {
        self.by_id.get(id).map(|&idx| &self.categories[idx])
    }

    /// 按位置查找（倒排索引存的是位置）
    pub fn get_by_index(&self, idx: usize) -> Option<&Arc<KnowledgeCategory>> {
        self.categories.get(idx)
    }

    /// 全部类别 ID
    pub fn category_ids(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 语料统计：类别数、法律数、条文数
    pub fn statistics(&self) -> Statistics {
        let mut laws = 0;
        let mut articles = 0;

        for cat in &self.categories {
            laws += cat.laws.len();
            for law in &cat.laws {
                articles += law.articles.len();
            }
        }

        Statistics {
            categories: self.categories.len(),
            laws,
            articles,
        }
    }
}

/// 读取并解析单个类别文件
fn load_category_file(path: &Path, id: &str) -> Result<KnowledgeCategory> {
    let raw = std::fs::read_to_string(path).context("读取文件失败")?;
    let mut cat: KnowledgeCategory = serde_json::from_str(&raw).context("JSON 解析失败")?;
    cat.id = id.to_string();
    Ok(cat)
}

// ============================================================================
// Default Corpus
// ============================================================================

/// 内置默认语料：刑事法律、举报维权、证据规则
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    (
        "criminal_law",
        r#"{
  "category": "刑事法律",
  "title": "刑事犯罪相关法律规定",
  "laws": [
    {
      "name": "中华人民共和国刑法",
      "articles": [
        {
          "number": "第二百零一条（逃税罪）",
          "content": "纳税人采取欺骗、隐瞒手段进行虚假纳税申报或者不申报，逃避缴纳税款数额较大并且占应纳税额百分之十以上的，处三年以下有期徒刑或者拘役，并处罚金；数额巨大并且占应纳税额百分之三十以上的，处三年以上七年以下有期徒刑，并处罚金。"
        },
        {
          "number": "第二百零五条（虚开发票罪）",
          "content": "虚开增值税专用发票或者虚开用于骗取出口退税、抵扣税款的其他发票的，处三年以下有期徒刑或者拘役，并处二万元以上二十万元以下罚金。"
        },
        {
          "number": "第二百六十六条（诈骗罪）",
          "content": "诈骗公私财物，数额较大的，处三年以下有期徒刑、拘役或者管制，并处或者单处罚金；数额巨大或者有其他严重情节的，处三年以上十年以下有期徒刑，并处罚金。"
        }
      ]
    }
  ],
  "procedures": [
    "发现犯罪线索后，应及时向公安机关、检察院或相关部门举报",
    "举报可以采用书面或口头形式，实名或匿名均可",
    "保存好相关证据材料，但不得采用违法手段获取",
    "配合司法机关调查，如实提供情况",
    "举报人的合法权益受法律保护"
  ]
}"#,
    ),
    (
        "reporting_guide",
        r#"{
  "category": "举报维权",
  "title": "公民举报权利与义务",
  "laws": [
    {
      "name": "中华人民共和国宪法",
      "articles": [
        {
          "number": "第四十一条",
          "content": "中华人民共和国公民对于任何国家机关和国家工作人员，有提出批评和建议的权利；对于任何国家机关和国家工作人员的违法失职行为，有向有关国家机关提出申诉、控告或者检举的权利。"
        }
      ]
    },
    {
      "name": "刑事诉讼法",
      "articles": [
        {
          "number": "第一百一十条",
          "content": "任何单位和个人发现有犯罪事实或者犯罪嫌疑人，有权利也有义务向公安机关、人民检察院或者人民法院报案或者举报。"
        }
      ]
    }
  ],
  "procedures": [
    "确认举报事项：明确要举报的违法犯罪行为",
    "收集证据：在合法范围内收集相关证据材料",
    "选择举报途径：公安机关、检察院、纪委、税务局等",
    "提交举报材料：可实名或匿名，建议实名以便反馈",
    "配合调查：如实提供情况，不得作伪证",
    "保护自身安全：注意保密，避免打草惊蛇"
  ]
}"#,
    ),
    (
        "evidence_collection",
        r#"{
  "category": "证据规则",
  "title": "合法证据收集指南",
  "laws": [
    {
      "name": "中华人民共和国民事诉讼法",
      "articles": [
        {
          "number": "第六十三条",
          "content": "证据包括：（一）当事人的陈述；（二）书证；（三）物证；（四）视听资料；（五）电子数据；（六）证人证言；（七）鉴定意见；（八）勘验笔录。证据必须查证属实，才能作为认定事实的根据。"
        },
        {
          "number": "第七十条",
          "content": "以侵害他人合法权益或者违反法律禁止性规定的方法取得的证据，不能作为认定案件事实的依据。"
        }
      ]
    }
  ],
  "procedures": [
    "合法收集：不得侵犯他人隐私权、不得非法侵入他人住宅",
    "书证收集：合同、收据、聊天记录、邮件等",
    "录音录像：在不侵犯隐私的前提下，可以录制与案件相关的音视频",
    "证人证言：寻找知情人作证，记录证人信息",
    "电子数据：保存原始数据，避免篡改",
    "及时固定：证据可能灭失的，应及时申请保全",
    "禁止行为：不得伪造、变造证据；不得威胁、引诱证人作伪证"
  ]
}"#,
    ),
];

/// 写入默认语料文件
fn seed_default_corpus(dir: &Path) -> Result<()> {
    for (id, json) in DEFAULT_CATEGORIES {
        let path = dir.join(format!("{}.json", id));
        std::fs::write(&path, json)
            .with_context(|| format!("写入默认语料失败: {}", path.display()))?;
        tracing::info!("创建默认语料: {}.json", id);
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
