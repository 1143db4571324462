use super::policy::{detect_taste_level, requested_song_count};
use super::PlanRequest;

pub const SYSTEM_PROMPT: &str = "You are a music curator who builds playlists from a listener's description. \
Only suggest songs that really exist and are likely to be available on major streaming services. \
Answer with a single JSON object and nothing else.";

/// Builds the user message sent to the planner.
pub fn build_user_prompt(request: &PlanRequest) -> String {
    let song_count = requested_song_count(request.minutes);
    let taste = detect_taste_level(&request.prompt);

    let mut prompt = format!(
        "Create a playlist for this request: \"{}\".\n\
         Target length: about {} minutes. Suggest {} songs.\n\
         {}\n",
        request.prompt.trim(),
        request.minutes.round() as u64,
        song_count,
        taste.instruction(),
    );
    if !request.explicit {
        prompt.push_str("Avoid songs with explicit lyrics.\n");
    }
    prompt.push_str(
        "Order the songs as a listening journey and give each one:\n\
         - \"artist\": the main artist name\n\
         - \"title\": the song title, without remaster or live annotations\n\
         - \"energy\": a number from 0 (calm) to 1 (intense)\n\
         - \"position\": a number from 0 (opening) to 1 (closing)\n\
         - \"rationale\": one short sentence\n\
         Reply with JSON shaped as {\"title\": string, \"description\": string, \"songs\": [...]}.",
    );
    prompt
}

/// Extracts the JSON object from a model reply that may wrap it in prose or
/// Markdown code fences.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}
