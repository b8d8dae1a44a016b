pub const DETECT_PROMPT_TEMPLATE: &str = "Detect the language of the following text. \
     If the text is written in one of these languages: {preferred_languages}, \
     return that language name exactly as written in this list. \
     Otherwise return the English name of the language. \
     If the language cannot be determined, return {unknown}. \
     Do not output any other text.\n\n\
     Text:\n{text}";

pub const TRANSLATE_PROMPT_TEMPLATE: &str = "Translate the following {source_language} text to {target_language}. \
     Only output the translated text. \
     Do not output any other text, explanations or notes.\n\n\
     Text:\n{text}";

// {placeholders} are replaced in a single pass per key; the user text is
// substituted last so it can never introduce a placeholder of its own.
#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_detect_prompt(text: &str, preferred_languages: &[String]) -> String {
    DETECT_PROMPT_TEMPLATE
        .replace("{preferred_languages}", &preferred_languages.join(", "))
        .replace("{unknown}", super::language::UNKNOWN_LANGUAGE)
        .replace("{text}", text)
}

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_translate_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    TRANSLATE_PROMPT_TEMPLATE
        .replace("{source_language}", source_language)
        .replace("{target_language}", target_language)
        .replace("{text}", text)
}
