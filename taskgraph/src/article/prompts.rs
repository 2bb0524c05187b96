//! Prompt templates for the article roles. `{task}`-style holes are filled with `fill`.

pub const ANALYZE: &str = "You are the editor-in-chief of a small writing team. \
Analyze the task below: who the audience is, what the article must cover and what \
would make it excellent. Answer in a few short paragraphs.";

pub const PLAN: &str = "You are the editor-in-chief planning an article.\n\
Task: {task}\n\nAnalysis:\n{analysis}\n\n\
List the research topics the article needs, one per line, at most five lines, no preamble.";

pub const RESEARCH_SUMMARY: &str = "You are a research analyst. Summarize the search \
results below into research notes for an article about: {task}\n\
Keep facts, figures and sources. Note gaps where results failed.\n\nSearch results:\n{results}";

pub const REVIEW_RESEARCH: &str = "You are the editor-in-chief. Judge whether the research \
notes below are enough to write an article about: {task}\n\nResearch notes:\n{summary}\n\n\
Give brief feedback, then end with exactly one line: VERDICT: APPROVE or VERDICT: REVISE.";

pub const WRITE: &str = "You are a professional writer. Write a complete, well-structured \
article in Markdown about: {task}\n\nUse these research notes:\n{summary}";

pub const REVISE: &str = "\n\nThis is a revision. Address the editor's feedback:\n{feedback}\n\n\
Previous draft:\n{draft}";

pub const REVIEW_DRAFT: &str = "You are the editor-in-chief reviewing a draft about: {task}\n\n\
Draft:\n{draft}\n\nGive concrete feedback on structure, accuracy and clarity, then end with \
exactly one line: VERDICT: APPROVE or VERDICT: REVISE.";

pub const FINAL_REVIEW: &str = "You are the final reviewer before publication of an article \
about: {task}\n\nArticle:\n{draft}\n\nList any remaining problems, then end with exactly one \
line: VERDICT: APPROVE or VERDICT: REVISE.";

/// Replaces each `{key}` in `template` with its value in a single pass; inserted values
/// are never scanned again. Holes with no matching key are left as they are.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
