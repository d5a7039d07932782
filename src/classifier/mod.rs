//! 问题分类器 - 多信号规则分类与关键词提取
//!
//! 对用户问题做纯函数式的预分析：问题类型（一般/刑事）、风险等级、
//! 信息完整度、是否需要澄清。全部匹配为小写子串包含，词表封闭固定，
//! 不做分词。完整度判定用显式的有序规则表表达，命中第一条即生效，
//! 便于逐条审计与测试。

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Keyword Tables
// ============================================================================

/// 刑事犯罪关键词
const CRIMINAL_KEYWORDS: &[&str] = &[
    "偷税", "逃税", "假账", "造假", "贪污", "受贿", "诈骗",
    "盗窃", "抢劫", "杀人", "伤害", "强奸", "绑架", "贩毒",
    "洗钱", "走私", "非法集资", "传销",
];

/// 强模糊表述（不确定、道听途说）
const STRONG_VAGUE_KEYWORDS: &[&str] = &[
    "心情不好", "感觉被骗", "不太清楚", "不太确定",
    "听别人说", "据说", "有人告诉我",
];

/// 敏感操作询问（私下取证类）
const SENSITIVE_KEYWORDS: &[&str] = &[
    "如何取证", "怎么偷拍", "怎么录音", "如何窃取",
    "私下调查", "跟踪", "监控",
];

/// 明确咨询意图
const CONSULTATION_KEYWORDS: &[&str] = &[
    "怎么办", "如何", "怎样", "应该", "可以", "能不能",
    "赔偿", "维权", "仲裁", "起诉", "找哪个部门", "合法吗", "权利",
];

/// 具体事实指标，按维度分组；fact_score 统计命中的维度数
const FACT_INDICATORS: &[(&str, &[&str])] = &[
    ("时间", &["年", "月", "日", "天", "小时", "周", "季度"]),
    ("金额", &["元", "万", "块", "工资", "薪", "钱", "费用", "赔偿"]),
    ("数量", &["个", "次", "人", "份", "件"]),
    ("地点", &["公司", "单位", "工厂", "店", "家", "办公室"]),
    ("关系", &["老板", "领导", "同事", "员工", "经理", "主管"]),
    ("行为", &["签", "发", "给", "扣", "拖欠", "不给", "要求", "通知"]),
];

/// 报告用法律关键词（分类器派生关键词的来源词表）
const LEGAL_KEYWORDS: &[&str] = &[
    "劳动合同", "工资", "加班", "社保", "辞退", "赔偿", "裁员", "经济补偿",
    "合同", "违约", "欺诈", "侵权", "债务", "借款",
    "房产", "租赁", "物业", "拆迁", "继承", "离婚",
    "抚养", "赡养", "交通事故", "医疗", "保险",
    "怀孕", "三期", "女职工", "产假", "哺乳期",
    "逃税", "偷税", "举报", "证据", "刑事", "犯罪",
];

/// 问题短于该字符数视为过短
const MIN_QUESTION_CHARS: usize = 15;

/// 命中的事实维度达到该数即视为信息充分
const SUFFICIENT_FACT_SCORE: usize = 2;

/// 派生关键词上限
const MAX_DERIVED_KEYWORDS: usize = 5;

// ============================================================================
// Types
// ============================================================================

/// 问题类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    General,
    Criminal,
}

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    High,
}

/// 信息完整度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Vague,
    TooShort,
    LackFacts,
}

/// 分类结果 - 纯值对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub question_type: QuestionType,
    pub risk_level: RiskLevel,
    pub completeness: Completeness,
    pub needs_clarification: bool,
    pub fact_score: usize,
    pub has_numbers: bool,
}

impl Classification {
    /// 事实信息是否充分（fact_score >= 2）
    pub fn has_sufficient_facts(&self) -> bool {
        self.fact_score >= SUFFICIENT_FACT_SCORE
    }
}

/// 分类错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// 空问题是调用方契约违例，显式报错而不猜一个结论
    #[error("问题不能为空")]
    EmptyQuestion,
}

// ============================================================================
// Signals
// ============================================================================

/// 从问题文本扫描出的全部信号，规则表在其上做判定
#[derive(Debug, Clone, Copy)]
struct Signals {
    has_strong_vague: bool,
    is_too_short: bool,
    fact_score: usize,
    has_numbers: bool,
    has_clear_intent: bool,
}

impl Signals {
    fn scan(question_lower: &str) -> Self {
        let fact_score = FACT_INDICATORS
            .iter()
            .filter(|(_, indicators)| contains_any(question_lower, indicators))
            .count();

        Self {
            has_strong_vague: contains_any(question_lower, STRONG_VAGUE_KEYWORDS),
            is_too_short: question_lower.chars().count() < MIN_QUESTION_CHARS,
            fact_score,
            has_numbers: question_lower.chars().any(|c| c.is_ascii_digit()),
            has_clear_intent: contains_any(question_lower, CONSULTATION_KEYWORDS),
        }
    }

    fn has_sufficient_facts(&self) -> bool {
        self.fact_score >= SUFFICIENT_FACT_SCORE
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ============================================================================
// Completeness Rules
// ============================================================================

/// 完整度判定结论
#[derive(Debug, Clone, Copy)]
struct Verdict {
    needs_clarification: bool,
    completeness: Completeness,
}

/// 完整度规则表，按优先级排列，命中第一条即生效
///
/// 最后一条是兜底规则，恒命中。
const COMPLETENESS_RULES: &[(&str, fn(&Signals) -> bool, Verdict)] = &[
    (
        "strong_vague",
        |s| s.has_strong_vague,
        Verdict {
            needs_clarification: true,
            completeness: Completeness::Vague,
        },
    ),
    (
        "too_short",
        |s| s.is_too_short && !s.has_sufficient_facts(),
        Verdict {
            needs_clarification: true,
            completeness: Completeness::TooShort,
        },
    ),
    (
        "lack_facts",
        |s| !s.has_sufficient_facts() && !s.has_numbers,
        Verdict {
            needs_clarification: true,
            completeness: Completeness::LackFacts,
        },
    ),
    (
        "complete",
        |_| true,
        Verdict {
            needs_clarification: false,
            completeness: Completeness::Complete,
        },
    ),
];

/// 按规则表顺序判定完整度
fn decide_completeness(signals: &Signals) -> Verdict {
    for (name, matches, verdict) in COMPLETENESS_RULES {
        if matches(signals) {
            tracing::debug!("完整度规则命中: {}", name);
            return *verdict;
        }
    }
    // 兜底规则恒命中，到不了这里
    Verdict {
        needs_clarification: false,
        completeness: Completeness::Complete,
    }
}

// ============================================================================
// Classify
// ============================================================================

/// 对问题做规则分类
///
/// 纯函数：相同输入必然得到相同结果。空白问题返回错误。
///
/// 注意最后的咨询意图覆盖：意图明确且事实充分时无条件改判为
/// complete，即使此前按强模糊/过短判了需要澄清也会被覆盖，
/// 覆盖时不复核模糊条件。这是源系统的既有行为，按原样保留。
pub fn classify(question: &str) -> Result<Classification, ClassifyError> {
    if question.trim().is_empty() {
        return Err(ClassifyError::EmptyQuestion);
    }

    let lower = question.to_lowercase();

    // 1. 刑事犯罪检查
    let (question_type, mut risk_level) = if contains_any(&lower, CRIMINAL_KEYWORDS) {
        tracing::debug!("检测到刑事犯罪相关内容");
        (QuestionType::Criminal, RiskLevel::High)
    } else {
        (QuestionType::General, RiskLevel::Low)
    };

    // 2. 信号扫描
    let signals = Signals::scan(&lower);

    // 3. 完整度判定（有序规则表）
    let mut verdict = decide_completeness(&signals);

    // 4. 敏感操作升级风险，不会降级已有的 high
    if contains_any(&lower, SENSITIVE_KEYWORDS) {
        tracing::debug!("检测到敏感操作询问");
        risk_level = RiskLevel::High;
    }

    // 5. 明确咨询意图 + 事实充分 -> 无条件覆盖为 complete
    if signals.has_clear_intent && signals.has_sufficient_facts() {
        tracing::debug!("检测到明确咨询意图且信息充分");
        verdict = Verdict {
            needs_clarification: false,
            completeness: Completeness::Complete,
        };
    }

    Ok(Classification {
        question_type,
        risk_level,
        completeness: verdict.completeness,
        needs_clarification: verdict.needs_clarification,
        fact_score: signals.fact_score,
        has_numbers: signals.has_numbers,
    })
}

/// 从问题文本提取派生关键词
///
/// 按报告词表顺序取前 5 个命中词；一个都没命中时退回 "法律咨询"。
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();

    let found: Vec<String> = LEGAL_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .take(MAX_DERIVED_KEYWORDS)
        .map(|k| (*k).to_string())
        .collect();

    if found.is_empty() {
        vec!["法律咨询".to_string()]
    } else {
        found
    }
}

// ============================================================================
// Tests
// ============================================================================
