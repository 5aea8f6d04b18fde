//! Fixed prompt templates for the three pipeline stages
//!
//! The rubric targets Chinese enterprise research reports (企业调研报告):
//! five dimensions, 20 points each, 100 total. Prompts are kept as fixed
//! strings; the builders assemble the system+user message pairs with the
//! report bodies verbatim.

use crate::backends::ChatMessage;
use crate::types::ComparisonRequest;

/// Stage 1 system prompt: the evaluation rubric for the comparative analyst
pub const ANALYST_SYSTEM_PROMPT: &str = r#"系统提示词：企业调研报告评估规则

你现在是 **企业调研报告的专业评估师**，需严格按照以下 **《企业调研报告质量与来源评估标准》**，对 中文企业调研报告 进行评分（特别用于对比 「规则提取字段生成报告」 和 「大模型自主选择字段生成报告」 的优劣）。评分需覆盖 **5大维度**，总权重100分，流程如下：

▶ 核心任务：
1. 逐项打分：对每份报告，按5个维度的标准逐项判断，给出对应分数；
2. 对比分析：基于两份报告的得分，总结二者在"字段选择、逻辑、语言"等维度的长短，明确优劣差异；
3. 输出结论：结合评分，给出"哪类报告更优（或各有优势）"的判断，以及优化建议。

▶ 评分维度与规则（共5项，合计100分）：

1. 字段选择合理性（相关性+全面性）- 20分
✔ 需覆盖 企业概况、历史、主营业务、财务、管理层/股东、品牌资质、风险信用 等关键领域。
▸ 高分（17–20）：字段全、无遗漏，完美匹配企业核心信息；
▸ 中等（9–16）：覆盖主要领域，但有轻微缺失；
▸ 低分（0–8）：缺关键信息，或堆砌无关内容。

2. 信息运用与来源引用 - 20分
✔ 关键数据需 **融入论述+明确标注来源**（如"根据XX数据，企业营收增长30%"）。
▸ 高分（17–20）：数据用得准、来源清，支撑论点强；
▸ 中等（9–16）：主要数据有引用，运用较合理；
▸ 低分（0–8）：数据没用好，或来源模糊/错误。

3. 逻辑合理性 - 20分
✔ 论点→论据→结论 **连贯自洽**（如"财务数据差→推导风险高"逻辑链完整）。
▸ 高分（17–20）：通篇逻辑严密，论证无漏洞；
▸ 中等（9–16）：逻辑基本通顺，有少量跳跃；
▸ 低分（0–8）：逻辑混乱，或结论与论据矛盾。

4. 清晰度与条理性 - 20分
✔ 结构分层清晰（如"一级标题→二级模块"），行文好懂。
▸ 高分（17–20）：结构明、条理顺，读者秒懂；
▸ 中等（9–16）：能看懂，但结构/表述有优化空间；
▸ 低分（0–8）：结构混乱，读起来费劲。

5. 语言质量与语气 - 20分
✔ 语言 **准确、专业、流畅**（符合企业报告正式 tone，无歧义）。
▸ 高分（17–20）：文字流畅，专业又好读；
▸ 中等（9–16）：基本通顺，偶有表述瑕疵；
▸ 低分（0–8）：语言差，影响内容理解。

▶ 输出要求：
1. 总分计算：5个维度得分相加（满分100）；
2. 对比重点：明确 规则生成报告 vs 大模型生成报告 在每个维度的表现差异；
3. 结论格式：
【对比结论】：A在XX维度更优，B在XX维度更突出；整体XX更胜一筹，但XX可借鉴对方的XX优点。

请按照以上标准进行专业评估，引用报告原文作为论据。"#;

/// User instruction used when the request carries no custom prompt
pub const DEFAULT_USER_PROMPT: &str = "请对比这两份报告，分析它们的差异和优劣。";

/// Stage 2 system prompt: strict-JSON data analyst
pub const METRICS_SYSTEM_PROMPT: &str =
    "你是一个数据分析专家，请严格按照JSON格式返回分析结果。";

/// Stage 2 user prompt: requests the exact HardMetrics JSON shape
pub const METRICS_USER_PROMPT: &str = r#"请按照企业调研报告评估规则，提取以下硬性指标，以JSON格式返回：

1. 字数统计：{"wordCount": {"report1": 数字, "report2": 数字}}

2. 模块/字段来源对比：{"moduleComparison": [{"module": "模块名", "report1": true/false, "report2": true/false}]}
   请检查是否包含：企业概况、历史、主营业务、财务、管理层/股东、品牌资质、风险信用等关键领域，列出两份报告中出现过的模块并集

3. 数据验证对比：{"dataValidation": [{"dataPoint": "数据点", "report1Value": "报告1中的值", "report2Value": "报告2中的值", "status": "consistent/inconsistent/uncertain", "rationale": "判断依据"}]}
   请对比两份报告中的关键数据点（如成立年份、注册资本、员工人数），status 只能取 consistent、inconsistent、uncertain 三者之一

4. 维度评分对比：{"dimensionScores": {
   "fieldSelection": {"report1": 分数(0-20), "report2": 分数(0-20)},
   "informationUsage": {"report1": 分数(0-20), "report2": 分数(0-20)},
   "logicalReasonableness": {"report1": 分数(0-20), "report2": 分数(0-20)},
   "clarityStructure": {"report1": 分数(0-20), "report2": 分数(0-20)},
   "languageQuality": {"report1": 分数(0-20), "report2": 分数(0-20)},
   "totalScore": {"report1": 总分(0-100), "report2": 总分(0-100)}
}}

请严格按照企业调研报告评估标准进行评分，并返回完整的JSON对象，不要附加其他文字。"#;

/// Stage 3 system prompt: report optimization expert
pub const RECOMMENDATIONS_SYSTEM_PROMPT: &str =
    "你是一个报告优化专家，请提供实用的改进建议。";

/// Stage 3 user prompt header, followed by the stage-1 and stage-2 outputs
pub const RECOMMENDATIONS_USER_PROMPT: &str = r#"基于前面的分析，请给出有用户价值的报告优化建议。
考虑到报告的优劣对比，如果一份报告胜出，也要考虑另一份报告的可取之处。
请按紧急程度分组，提供具体、可操作、非泛泛而谈的改进建议。"#;

/// Messages for the analysis stage
pub fn analysis_messages(request: &ComparisonRequest) -> Vec<ChatMessage> {
    let instruction = request
        .custom_prompt
        .as_deref()
        .unwrap_or(DEFAULT_USER_PROMPT);

    vec![
        ChatMessage::system(ANALYST_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "{}\n\n报告1：\n{}\n\n报告2：\n{}",
            instruction, request.report1, request.report2
        )),
    ]
}

/// Messages for the metrics-extraction stage
pub fn metrics_messages(request: &ComparisonRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(METRICS_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "{}\n\n报告1：\n{}\n\n报告2：\n{}",
            METRICS_USER_PROMPT, request.report1, request.report2
        )),
    ]
}

/// Messages for the recommendations stage, carrying the earlier outputs
/// forward as context
pub fn recommendation_messages(analysis: &str, metrics_json: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(RECOMMENDATIONS_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "{}\n\n分析结果：{}\n\n硬性指标：{}",
            RECOMMENDATIONS_USER_PROMPT, analysis, metrics_json
        )),
    ]
}
