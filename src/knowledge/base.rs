//! KnowledgeBase - 语料与索引的持有者
//!
//! 语料和索引作为一个整体快照（`Arc<Snapshot>`）发布，读操作在读锁下
//! 克隆 `Arc` 后即可在锁外使用。重载先在锁外完整构建新快照，
//! 再持写锁原子替换，读方不会看到半成品索引。

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result};

use super::cache::BoundedCache;
use super::corpus::{Corpus, KnowledgeCategory, Statistics};
use super::index::KeywordIndex;
use super::search::{self, SearchResult};

// ============================================================================
// Data Directory
// ============================================================================

/// 数据目录路径 (~/.lawkb/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lawkb")
}

// ============================================================================
// Snapshot
// ============================================================================

/// 语料 + 索引的不可变快照，两者总是一起构建、一起替换
struct Snapshot {
    corpus: Corpus,
    index: KeywordIndex,
}

impl Snapshot {
    fn load(dir: &Path) -> Result<Self> {
        let corpus = Corpus::load_dir(dir).context("加载语料失败")?;
        let index = KeywordIndex::build(&corpus);
        Ok(Self { corpus, index })
    }
}

// ============================================================================
// KnowledgeBase
// ============================================================================

/// 知识库 - 分类器与检索的共享上下文对象
///
/// 每个实例独占一个语料目录；任意多个读方可并发检索，
/// `reload` 是唯一的写路径。
pub struct KnowledgeBase {
    corpus_dir: PathBuf,
    snapshot: RwLock<Arc<Snapshot>>,
    cache: Mutex<BoundedCache<String, Arc<KnowledgeCategory>>>,
}

impl KnowledgeBase {
    /// 打开指定语料目录（目录缺失时自动创建并写入默认语料）
    pub fn open(corpus_dir: &Path) -> Result<Self> {
        let snapshot = Snapshot::load(corpus_dir)?;

        Ok(Self {
            corpus_dir: corpus_dir.to_path_buf(),
            snapshot: RwLock::new(Arc::new(snapshot)),
            cache: Mutex::new(BoundedCache::with_default_capacity()),
        })
    }

    /// 默认位置打开 (~/.lawkb/knowledge/)
    pub fn open_default() -> Result<Self> {
        let dir = get_data_dir().join("knowledge");
        Self::open(&dir)
    }

    /// 语料目录
    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// 检索相关法律类别
    pub fn search(&self, keywords: &[String], limit: usize) -> Vec<SearchResult> {
        let snapshot = self.current();
        search::search(&snapshot.corpus, &snapshot.index, keywords, limit)
    }

    /// 按 ID 查询类别（经有界缓存）
    pub fn category(&self, id: &str) -> Option<Arc<KnowledgeCategory>> {
        let key = id.to_string();

        if let Ok(cache) = self.cache.lock() {
            if let Some(cat) = cache.get(&key) {
                return Some(cat);
            }
        }

        let snapshot = self.current();
        let cat = snapshot.corpus.get(id).cloned()?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, cat.clone());
        }

        Some(cat)
    }

    /// 全部类别 ID
    pub fn category_ids(&self) -> Vec<String> {
        self.current().corpus.category_ids()
    }

    /// 语料统计
    pub fn statistics(&self) -> Statistics {
        self.current().corpus.statistics()
    }

    /// 重新扫描语料目录并原子替换快照
    ///
    /// 新快照在锁外完整构建；构建失败时保留旧快照不变。
    pub fn reload(&self) -> Result<()> {
        let fresh = Snapshot::load(&self.corpus_dir)?;

        {
            let mut guard = self
                .snapshot
                .write()
                .map_err(|e| anyhow::anyhow!("快照写锁失败: {}", e))?;
            *guard = Arc::new(fresh);
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }

        tracing::info!("语料重载完成，共 {} 个类别", self.current().corpus.len());

        Ok(())
    }

    /// 当前快照（读锁下克隆 Arc）
    fn current(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
