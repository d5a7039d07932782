//! Chat 模块 - 外部大模型协作方的调用接口
//!
//! 核心只依赖一个不透明的 `generate(prompt) -> text | failure` 契约，
//! 具体协议（签名、会话等）不在本 crate 范围内。默认实现是
//! OpenAI 风格的 chat completions HTTP 调用，带限流重试。
//!
//! ## 使用方法
//! ```rust,ignore
//! let chat = HttpChat::from_env()?;
//! let reply = chat.generate("老板拖欠工资怎么办？").await?;
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// ChatProvider Trait
// ============================================================================

/// 大模型调用接口
///
/// 报告流水线只认这个接口；失败时由调用方走本地后备分析。
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 发送提示词，返回模型的完整回复文本
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// 提供方名称
    fn name(&self) -> &str;
}

// ============================================================================
// HttpChat
// ============================================================================

/// 默认 API 地址（OpenAI 兼容接口）
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// 默认模型
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// 采样温度
const TEMPERATURE: f32 = 0.5;
/// 回复长度上限
const MAX_TOKENS: u32 = 2048;
/// 429/5xx 时最大重试次数
const MAX_RETRIES: u32 = 3;
/// 重试初始退避 (ms)，每次翻倍
const INITIAL_BACKOFF_MS: u64 = 2000;
/// 单次请求超时
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// API 密钥是否已配置
pub fn has_api_key() -> bool {
    std::env::var("LAWKB_API_KEY")
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// OpenAI 兼容的 HTTP 聊天实现
#[derive(Debug)]
pub struct HttpChat {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

impl HttpChat {
    /// 从环境变量创建
    ///
    /// - `LAWKB_API_KEY`: 必需
    /// - `LAWKB_API_URL`: 可选，默认 OpenAI chat completions
    /// - `LAWKB_MODEL`: 可选
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LAWKB_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .context("未设置 LAWKB_API_KEY")?;

        let api_url =
            std::env::var("LAWKB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("LAWKB_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            api_key,
            api_url,
            model,
            client,
        })
    }

    async fn call_once(&self, prompt: &str) -> Result<reqwest::Response> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("请求发送失败")
    }
}

#[async_trait]
impl ChatProvider for HttpChat {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        for attempt in 0..=MAX_RETRIES {
            let response = self.call_once(prompt).await?;
            let status = response.status();

            // 限流或服务端错误时退避重试
            if (status.as_u16() == 429 || status.is_server_error()) && attempt < MAX_RETRIES {
                tracing::warn!(
                    "API 返回 {}，{}ms 后重试 ({}/{})",
                    status,
                    backoff_ms,
                    attempt + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                bail!("API 调用失败: {} - {}", status, body);
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .context("解析 API 响应失败")?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .context("API 响应中没有回复内容")?;

            tracing::debug!("收到模型回复，长度 {}", content.chars().count());
            return Ok(content);
        }

        bail!("API 调用重试 {} 次后仍然失败", MAX_RETRIES)
    }

    fn name(&self) -> &str {
        "http-chat"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "这是回复"}}
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "这是回复");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "test-model",
            messages: vec![ChatMessage {
                role: "user",
                content: "问题",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "问题");
    }

    #[test]
    fn test_has_api_key_reads_env() {
        // 不设置环境变量时为 false（测试进程默认不带该变量）
        if std::env::var("LAWKB_API_KEY").is_err() {
            assert!(!has_api_key());
        }
    }
}
