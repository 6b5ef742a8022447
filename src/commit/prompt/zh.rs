//! Chinese prompts.

use super::{ManagedOptions, MAX_DIFF_CHARS, PromptTemplates, SUBJECT_MAX_CHARS, types_list};
use crate::commit::diff::DiffSourceMode;

pub(super) struct Chinese;

const EXAMPLES: &str = "feat(auth): 新增了 Google OAuth 登录
fix(api): 修复了用户接口的校验错误
refactor(store): 优化了购物车状态管理
docs(readme): 更新了安装说明";

fn rules() -> String {
    format!(
        r#"- 格式：<type>(<scope>): <subject>
- Type：{types}
- Subject 必须描述已经完成的工作（使用"新增了"、"修复了"、"更新了"、"删除了"、"重构了"），最多 {SUBJECT_MAX_CHARS} 个字符，结尾不加句号
- 错误："添加功能"、"修复 bug"、"更新样式"
- 正确："新增了功能"、"修复了 bug"、"更新了样式""#,
        types = types_list(),
    )
}

fn output_rule(multi_line: bool) -> &'static str {
    if multi_line {
        "只返回 commit message：subject 一行，空一行，然后是 2-4 条以 \"- \" 开头的简短要点（描述已完成的工作）。不要任何解释。"
    } else {
        "只返回 commit message（一行），不要任何解释。"
    }
}

impl PromptTemplates for Chinese {
    fn generation(&self, diff: &str, stats: &str, multi_line: bool) -> String {
        format!(
            r#"分析以下 git 变更，并按照 conventional commits 格式生成 commit message。

变更统计：
{stats}

Diff（前 {MAX_DIFF_CHARS} 个字符）：
{diff}

严格规则：
{rules}

示例：
{EXAMPLES}

{output}"#,
            rules = rules(),
            output = output_rule(multi_line),
        )
    }

    fn edit(&self, current_message: &str, feedback: &str, diff: &str, stats: &str) -> String {
        format!(
            r#"你为下面的 git 变更写了这条 commit message：

{current_message}

用户希望这样修改：
{feedback}

请根据反馈修改现有的消息，不要从头重写：反馈没有要求修改的部分保持不变。

变更统计：
{stats}

Diff（前 {MAX_DIFF_CHARS} 个字符）：
{diff}

规则（除非反馈明确要求不同）：
{rules}

只返回修改后的 commit message，不要任何解释。"#,
            rules = rules(),
        )
    }

    fn managed(&self, options: &ManagedOptions<'_>) -> String {
        let scope = match options.diff_source {
            DiffSourceMode::Staged => "已暂存的变更（`git diff --cached`）",
            DiffSourceMode::All => "所有未提交的变更（`git diff HEAD`）",
            DiffSourceMode::Auto => {
                "已暂存的变更（`git diff --cached`）；如果没有暂存内容，则描述所有未提交的变更（`git diff HEAD`）"
            }
        };

        let attribution = if options.keep_co_authored_by {
            "可以在消息末尾保留 Co-Authored-By 尾注。"
        } else {
            "不要添加 Co-Authored-By 尾注或任何其他署名。"
        };

        let mut prompt = format!(
            r#"为这个仓库写一条 git commit message。

请自行使用 git 查看变更，描述{scope}。
不要暂存文件，不要创建提交，也不要修改任何内容。

严格规则：
{rules}
- {attribution}

示例：
{EXAMPLES}"#,
            rules = rules(),
        );

        let instruction = options.custom_instruction.trim();
        if !instruction.is_empty() {
            prompt.push_str(&format!("\n\n用户的附加说明：\n{instruction}"));
        }

        prompt.push_str("\n\n");
        prompt.push_str(output_rule(options.multi_line));
        prompt
    }
}
