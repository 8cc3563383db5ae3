use crate::request::GenerationRequest;

pub const TLDR_INSTRUCTION: &str = "Include a TL;DR summary at the top.\n";

/// Build the instruction text sent to the model.
///
/// The word-count control is treated as half the real target, so the value
/// is doubled before it is written into the prompt. The topic is inserted
/// verbatim with no escaping.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let word_count = request.target_word_count.saturating_mul(2);
    let tldr_text = if request.include_tldr {
        TLDR_INSTRUCTION
    } else {
        ""
    };
    let emoji_text = emoji_instruction(request.emoji_intensity.as_str());

    format!(
        "
You are a professional Medium blog writer.
Write a blog post for the topic: \"{topic}\" in {language}.
The blog must:
- Not be less than {word_count} words
- Have some more attractive topic name not just the topic
- Be structured with headings and subheadings
- Have an engaging title with emojis
- Use attractive section headings
- Be written in a {tone} tone
- Contain about {word_count} words
- Use bullet points and numbered lists where appropriate
- Be ready to upload without further editing
- Use markdown for formatting
{tldr_text}
{emoji_text}

Write it now:
",
        topic = request.topic,
        language = request.language.as_str(),
        tone = request.tone.as_str(),
    )
}

// The level is glued to "ly" as-is ("heavyly" included); the model sees
// exactly this wording.
fn emoji_instruction(level: &str) -> String {
    format!("Use emojis {level}ly in headings and text.\n")
}
