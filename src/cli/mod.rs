//! CLI 模块
//!
//! lawkb 命令行定义与各子命令实现

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::chat::{has_api_key, ChatProvider, HttpChat};
use crate::classifier::classify;
use crate::knowledge::{get_data_dir, KnowledgeBase, DEFAULT_LIMIT};
use crate::report::{export_to_text, ReportGenerator};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "lawkb")]
#[command(version, about = "法律咨询知识引擎", long_about = None)]
pub struct Cli {
    /// 知识库目录（默认 ~/.lawkb/knowledge）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 提问并生成完整咨询报告
    Ask {
        /// 法律问题（自然语言描述）
        question: String,

        /// 以 JSON 格式输出报告
        #[arg(long)]
        json: bool,
    },

    /// 只做问题分类，不生成报告
    Classify {
        /// 法律问题
        question: String,
    },

    /// 按关键词检索相关法律
    Search {
        /// 检索关键词（可多个）
        #[arg(required = true)]
        keywords: Vec<String>,

        /// 结果条数上限
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// 查看系统状态
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// 执行 CLI 命令
pub async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Ask { question, json } => cmd_ask(data_dir, &question, json).await,
        Commands::Classify { question } => cmd_classify(&question),
        Commands::Search { keywords, limit } => cmd_search(data_dir, &keywords, limit),
        Commands::Status => cmd_status(data_dir),
    }
}

/// 打开知识库（--data-dir 优先，否则默认目录）
fn open_base(data_dir: Option<PathBuf>) -> Result<Arc<KnowledgeBase>> {
    let base = match data_dir {
        Some(dir) => KnowledgeBase::open(&dir)?,
        None => KnowledgeBase::open_default()?,
    };
    Ok(Arc::new(base))
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 提问命令 (ask)
///
/// 分类问题、调用模型（未配置时走本地后备分析）、检索相关法律并输出报告。
async fn cmd_ask(data_dir: Option<PathBuf>, question: &str, json: bool) -> Result<()> {
    let base = open_base(data_dir)?;

    let chat: Option<Box<dyn ChatProvider>> = if has_api_key() {
        let provider = HttpChat::from_env().context("创建 HTTP 聊天客户端失败")?;
        Some(Box::new(provider))
    } else {
        println!("[!] 未设置 LAWKB_API_KEY，使用本地分析（不调用模型）");
        println!();
        None
    };

    let generator = ReportGenerator::new(base, chat);
    let report = generator.generate(question).await.context("报告生成失败")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", export_to_text(&report));
    }

    Ok(())
}

/// 分类命令 (classify)
fn cmd_classify(question: &str) -> Result<()> {
    let classification = classify(question).context("问题分类失败")?;

    println!("[OK] 分类结果:");
    println!("{}", serde_json::to_string_pretty(&classification)?);

    Ok(())
}

/// 检索命令 (search)
fn cmd_search(data_dir: Option<PathBuf>, keywords: &[String], limit: usize) -> Result<()> {
    let base = open_base(data_dir)?;

    println!("[*] 检索关键词: {}", keywords.join("、"));

    let results = base.search(keywords, limit);

    if results.is_empty() {
        println!("\n[!] 没有检索到相关法律。");
        return Ok(());
    }

    println!("\n[OK] 检索结果 ({} 条):\n", results.len());

    for (i, result) in results.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, result.category, result.title);

        for law in &result.laws {
            println!("   {}", law.name);
            for article in &law.articles {
                println!(
                    "     {} {}",
                    article.number,
                    truncate_text(&article.content, 60)
                );
            }
        }

        if !result.procedures.is_empty() {
            println!("   流程: {}", result.procedures.join(" -> "));
        }

        println!();
    }

    Ok(())
}

/// 状态命令 (status)
fn cmd_status(data_dir: Option<PathBuf>) -> Result<()> {
    println!("lawkb v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let corpus_dir = data_dir.unwrap_or_else(|| get_data_dir().join("knowledge"));
    println!("[*] 知识库目录: {}", corpus_dir.display());

    if has_api_key() {
        println!("[OK] API 密钥: 已设置");
    } else {
        println!("[!] API 密钥: 未设置");
        println!("    设置: export LAWKB_API_KEY=your-key");
    }

    match KnowledgeBase::open(&corpus_dir) {
        Ok(base) => {
            let stats = base.statistics();
            println!("[OK] 知识类别: {} 个", stats.categories);
            println!("     法律: {} 部, 条文: {} 条", stats.laws, stats.articles);
        }
        Err(e) => {
            println!("[!] 知识库打开失败: {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 截断文本（UTF-8 安全）
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_truncate_unicode() {
        let chinese = "劳动合同纠纷处理";
        let truncated = truncate_text(chinese, 4);
        assert_eq!(truncated, "劳动合同...");
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from(["lawkb", "search", "工资", "加班", "--limit", "3"]).unwrap();
        match cli.command {
            Commands::Search { keywords, limit } => {
                assert_eq!(keywords, vec!["工资", "加班"]);
                assert_eq!(limit, 3);
            }
            _ => panic!("应解析为 search 命令"),
        }
    }

    #[test]
    fn test_cli_parses_global_data_dir() {
        let cli = Cli::try_parse_from(["lawkb", "--data-dir", "/tmp/kb", "status"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/kb")));
    }

    #[test]
    fn test_cli_limit_defaults_to_library_default() {
        let cli = Cli::try_parse_from(["lawkb", "search", "工资"]).unwrap();
        match cli.command {
            Commands::Search { limit, .. } => assert_eq!(limit, DEFAULT_LIMIT),
            _ => panic!("应解析为 search 命令"),
        }
    }

    #[test]
    fn test_cli_limit_zero_passes_through() {
        // limit 0 原样生效，不重映射为默认值
        let cli = Cli::try_parse_from(["lawkb", "search", "工资", "--limit", "0"]).unwrap();
        match cli.command {
            Commands::Search { limit, .. } => assert_eq!(limit, 0),
            _ => panic!("应解析为 search 命令"),
        }
    }

    #[test]
    fn test_cmd_search_honors_zero_limit() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("labor.json"),
            r#"{"category":"劳动纠纷","title":"拖欠工资","laws":[],"procedures":[]}"#,
        )
        .unwrap();

        // 有命中类别但 limit 为 0 时结果为空
        let base = open_base(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(base.search(&["工资".to_string()], 1).len(), 1);
        assert!(base.search(&["工资".to_string()], 0).is_empty());

        cmd_search(Some(dir.path().to_path_buf()), &["工资".to_string()], 0).unwrap();
    }
}
