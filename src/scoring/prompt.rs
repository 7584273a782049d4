/// Prompt sent to the backend, split into chat roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPrompt {
    pub system: String,
    pub user: String,
}

const SYSTEM_PREAMBLE: &str = "You are an expert researcher screening titles and abstracts \
for a systematic literature review. Score the RELEVANCE of each article to the stated theme \
on a 1-10 integer scale. Respond with ONLY the integer, no text and no explanation.";

const RUBRIC: &str = "\
Scoring rubric (respond with ONLY a single integer 1-10):
10 = Extremely strong match: the article is squarely about the theme.
8-9 = Strong match: clearly on-target, though some details may be limited or mixed.
6-7 = Moderate match: related to the theme, but the central focus differs in part.
4-5 = Weak match: touches on parts of the theme only, or the link is unclear.
2-3 = Barely related: tangential mention of the theme.
1 = Unrelated to the theme.";

/// Builds the fixed-structure prompt for one record.
pub fn build_prompt(theme: &str, title: &str, abstract_text: &str) -> ScoringPrompt {
    let user = format!(
        "Theme:\n{theme}\n\n{RUBRIC}\n\nTitle: {title}\n\nAbstract:\n{abstract_text}\n\n\
         Respond with ONLY a single integer from 1 to 10, nothing else."
    );

    ScoringPrompt {
        system: SYSTEM_PREAMBLE.to_string(),
        user,
    }
}
