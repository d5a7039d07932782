//! Knowledge 模块 - 法律知识库与关键词检索
//!
//! - Corpus: 目录加载的不可变语料快照（类别/法律/条文/流程）
//! - KeywordIndex: 封闭词表的倒排索引，语料重载时整体重建
//! - Search: 倒排候选 + 加权打分的相关法律检索
//! - KnowledgeBase: 快照持有者，copy-and-swap 重载 + 有界类别缓存

mod base;
mod cache;
mod corpus;
mod index;
mod search;

// Re-exports
pub use base::{get_data_dir, KnowledgeBase};
pub use cache::{BoundedCache, DEFAULT_CAPACITY};
pub use corpus::{Article, Corpus, KnowledgeCategory, LawDocument, Statistics};
pub use index::{extract_terms, KeywordIndex, LEGAL_TERMS};
pub use search::{search, SearchResult, DEFAULT_LIMIT};
