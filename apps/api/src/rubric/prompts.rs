// LLM prompt template for rubric generation.

use crate::rubric::request::RubricRequest;

/// Rubric generation prompt template.
/// Replace: {learning_outcomes}, {criteria}, {performance_levels}, {level_columns}
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"Generate a detailed rubric based on the following:

Learning Outcomes:
{learning_outcomes}

Criteria:
{criteria}

Performance Levels:
{performance_levels}

For each criterion, provide a brief description and detailed explanations for each performance level that reflects implicitly associated to Learning Outcomes in plain text.
Format the output as a Markdown table with the following columns:
| Criteria | {level_columns} |

Each row should represent a criterion, with descriptions for each performance level.
Ensure the table is properly formatted with | characters and a header row separator.
Ensure the output table format is consistent as possible every time."#;

/// Separator between list items inside a prompt section.
const LIST_SEPARATOR: &str = ", ";

/// Renders the generation prompt for a validated request.
pub fn build_rubric_prompt(request: &RubricRequest) -> String {
    render(
        request.learning_outcomes(),
        request.criteria(),
        request.performance_levels(),
    )
}

/// Fills the template in one left-to-right pass. Substituted text is never
/// scanned again, so user input containing `{criteria}` stays literal.
fn render(outcomes: &[String], criteria: &[String], levels: &[String]) -> String {
    let mut out = String::with_capacity(RUBRIC_PROMPT_TEMPLATE.len());
    let mut rest = RUBRIC_PROMPT_TEMPLATE;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };
        let value = match &tail[1..close] {
            "learning_outcomes" => outcomes.join(LIST_SEPARATOR),
            "criteria" => criteria.join(LIST_SEPARATOR),
            "performance_levels" => levels.join(LIST_SEPARATOR),
            "level_columns" => levels.join(" | "),
            _ => {
                out.push('{');
                rest = &tail[1..];
                continue;
            }
        };
        out.push_str(&value);
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    out
}
