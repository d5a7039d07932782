//! 提示词构建 - 按分类结果选择不同的指令模板

use crate::classifier::{Classification, QuestionType};

/// 根据分类结果构建模型提示词
///
/// 需要澄清的问题指示模型列出缺失信息而不强行给建议；
/// 信息充分的刑事问题追加举报途径与取证合法性的专门指令。
pub fn build_prompt(question: &str, classification: &Classification) -> String {
    let mut prompt = format!(
        "你是一个专业智能法律咨询助手，接收用户用自然语言描述的法律问题\
         （例如：\u{201c}老板拖欠工资三个月怎么办？\u{201d}），对问题进行意图识别和关键信息提取。\
         然后，生成一份清晰、结构化、易于理解的初步咨询报告，重点在于给用户清晰的行动建议：\n\n\
         问题：{}\n\n",
        question
    );

    if classification.needs_clarification {
        prompt.push_str(
            "【重要提示】这个问题信息不够完整或表述过于模糊。\n\n\
             请你：\n\
             1. 指出问题中缺少哪些关键信息\n\
             2. 列出需要用户澄清的具体问题\n\
             3. 不要强行给出法律建议\n\n",
        );
    } else {
        prompt.push_str(
            "【重要提示】用户已提供了较为完整的信息，请给出明确的法律分析和行动建议，\
             如何行动是重点，需要详细。\n\n",
        );

        if classification.question_type == QuestionType::Criminal {
            prompt.push_str(
                "【刑事案件提示】这个问题涉及刑事犯罪。\n\n\
                 请你：\n\
                 1. 明确指出可能涉及的罪名\n\
                 2. 强调公民的举报权利和义务\n\
                 3. 说明应向哪些机关举报（公安、检察院、纪委等）\n\
                 4. 提醒保护证据的合法方式\n\
                 5. 警告不要采取违法手段取证\n\
                 6. 建议寻求专业律师帮助\n\n",
            );
        }
    }

    prompt.push_str(
        "请按以下JSON格式返回分析结果：\n\n\
         {\n\
         \x20   \"问题评估\": {\n\
         \x20       \"信息完整度\": \"完整/不完整/模糊\",\n\
         \x20       \"需要澄清\": true/false,\n\
         \x20       \"澄清问题\": [\"问题1\", \"问题2\"]\n\
         \x20   },\n\
         \x20   \"案由分析\": \"详细的案由分析...\",\n\
         \x20   \"核心争议点\": [\"争议点1\", \"争议点2\"],\n\
         \x20   \"关键词\": [\"关键词1\", \"关键词2\", \"关键词3\"],\n\
         \x20   \"行动建议\": [\"建议1\", \"建议2\", \"建议3\"],\n\
         \x20   \"风险提示\": [\"风险1\", \"风险2\"],\n\
         \x20   \"特别说明\": \"特殊情况说明\"\n\
         }\n\n\
         注意：\n\
         1. 关键词要准确（如：劳动合同、经济补偿、裁员、工资、怀孕、三期保护等）\n\
         2. 行动建议要具体、可操作、合法\n\
         3. 如果涉及计算（如赔偿金额），请给出计算公式和结果\n\
         4. 如果问题信息充分，请给出明确的法律分析\n",
    );

    prompt
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    #[test]
    fn test_prompt_contains_question() {
        let q = "老板拖欠我三个月工资，金额共计15000元";
        let c = classify(q).unwrap();
        let prompt = build_prompt(q, &c);

        assert!(prompt.contains(q));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_clarification_prompt_forbids_advice() {
        let q = "怎么办";
        let c = classify(q).unwrap();
        assert!(c.needs_clarification);

        let prompt = build_prompt(q, &c);
        assert!(prompt.contains("不要强行给出法律建议"));
        assert!(!prompt.contains("刑事案件提示"));
    }

    #[test]
    fn test_criminal_prompt_only_when_complete() {
        let q = "公司老板让会计做假账逃税，金额有几十万元，我要怎么举报";
        let c = classify(q).unwrap();
        assert!(!c.needs_clarification);

        let prompt = build_prompt(q, &c);
        assert!(prompt.contains("刑事案件提示"));
        assert!(prompt.contains("举报权利和义务"));
    }
}
