//! Prompt templates: one per [`Action`].
//!
//! Each builder is a pure function of its input. The output-format contract
//! lives entirely in the instruction text; nothing here enforces it, the
//! popup parses leniently on the way back.

use crate::types::Action;

/// Maximum number of excerpts requested by [`key_info_prompt`].
pub const MAX_EXCERPTS: usize = 12;

/// Maximum number of cards requested by [`analyze_prompt`].
pub const MAX_FLASHCARDS: usize = 5;

/// Opening tag the key-info prompt asks the model to wrap excerpts in.
pub const HIGHLIGHT_OPEN: &str = "<HIGHLIGHT>";

/// Closing tag matching [`HIGHLIGHT_OPEN`].
pub const HIGHLIGHT_CLOSE: &str = "</HIGHLIGHT>";

/// Build the prompt for `action`. `input` is page text, or the query for
/// [`Action::Search`].
pub fn build_prompt(action: Action, input: &str) -> String {
    match action {
        Action::Summary => summary_prompt(input),
        Action::Search => search_prompt(input),
        Action::KeyInfo => key_info_prompt(input),
        Action::Analyze => analyze_prompt(input),
    }
}

/// Two labeled paragraphs followed by an asterisk bullet list.
pub fn summary_prompt(page_text: &str) -> String {
    format!(
        "Analyze the following website content. Provide a response formatted exactly as follows:\n\
         1. A single paragraph starting with the bolded word \"**Summary:**\".\n\
         2. A blank line.\n\
         3. A single paragraph starting with the bolded word \"**Key Information:**\".\n\
         4. A bulleted list using asterisks (*) for each key point.\n\
         Do not use any markdown headings (like '#').\n\
         \n\
         Content:\n\
         {page_text}"
    )
}

/// Concise answer to a user query.
pub fn search_prompt(query: &str) -> String {
    format!(
        "You are a concise and helpful AI assistant. Answer the following user query. \
         Format your response using simple markdown (bolding and bullet points). \
         Query: \"{query}\""
    )
}

/// Up to [`MAX_EXCERPTS`] verbatim excerpts wrapped in highlight tags.
pub fn key_info_prompt(page_text: &str) -> String {
    format!(
        "You are an assistant that extracts the most important exact excerpts from a website's text. \
         Read the Content below and return up to {MAX_EXCERPTS} of the most relevant short excerpts \
         (phrases or short sentences). IMPORTANT: Return only the excerpts wrapped EXACTLY in \
         {HIGHLIGHT_OPEN}...{HIGHLIGHT_CLOSE} tags, one after another with no extra commentary, \
         numbering, or explanation. Each excerpt should be verbatim from the content provided. \
         If none found, return an empty response.\n\
         \n\
         Content:\n\
         {page_text}"
    )
}

/// A JSON array of at most [`MAX_FLASHCARDS`] question/answer objects.
pub fn analyze_prompt(page_text: &str) -> String {
    format!(
        "You are an assistant that reads website content and generates useful study flashcards.\n\
         IMPORTANT: Return ONLY valid JSON and NOTHING ELSE: no explanation, no markdown, no commentary, \
         no code fences. The output must be a single JSON array (starts with '[' and ends with ']').\n\
         Produce an array with up to {MAX_FLASHCARDS} flashcards. Each flashcard must be an object with \
         exactly two string keys: \"question\" and \"answer\".\n\
         Example of the exact format required:\n\
         [{{\"question\": \"What is X?\", \"answer\": \"X is ...\"}}, \
         {{\"question\": \"Why does Y happen?\", \"answer\": \"Because...\"}}]\n\
         \n\
         Answers should be concise (1-3 sentences) and accurate based on the Content. \
         If you cannot extract any flashcards, return an empty array: []\n\
         \n\
         Content:\n\
         {page_text}"
    )
}
