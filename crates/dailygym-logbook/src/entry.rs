//! The day-file text format
//!
//! Byte-exact contract: a `# Daily English Gym - <long date>` header line,
//! then one block per session. A session marker is a line starting with
//! `## Session <N>`. Blocks are immutable once written; readers parse them
//! back via the fixed section markers below.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use dailygym_core::SessionRecord;

/// Session marker lines: `## Session <N> (<HH:MM>)`
static SESSION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^## Session \d+").expect("Invalid session marker regex"));

/// Session title headings: `### <title>`
static TOPIC_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^### (.+)$").expect("Invalid topic heading regex"));

/// Day-file header: `# Daily English Gym - Monday, January 5, 2026`
pub fn date_header(date: NaiveDate) -> String {
    format!(
        "# Daily English Gym - {}\n",
        date.format("%A, %B %-d, %Y")
    )
}

/// Render one session block. `hh_mm` is the wall-clock save time.
///
/// The leading blank line keeps blocks visually separated from the header
/// or the previous block; the trailing `---` delimits the block.
pub fn format_session(record: &SessionRecord, session_number: usize, hh_mm: &str) -> String {
    let mut block = format!("\n## Session {session_number} ({hh_mm})\n\n");
    block.push_str(&format!("### {}\n\n", record.news_title));

    if let Some(url) = &record.news_url {
        block.push_str(&format!("Source: {url}\n\n"));
    }

    let sections = [
        ("News Content (Original)", record.news_content.as_str()),
        ("Level 1 (Easy)", record.level1_text.as_str()),
        ("Level 2 (Speaking)", record.level2_text.as_str()),
        ("Speaking Question", record.speaking_question.as_str()),
        ("Your Response", record.spoken.as_str()),
        ("Corrected", record.corrected.as_str()),
        ("Upgraded", record.upgraded.as_str()),
        ("Comment", record.comment.as_str()),
    ];
    for (heading, text) in sections {
        block.push_str(&format!("#### {heading}\n\n{text}\n\n"));
    }

    block.push_str("---\n");
    block
}

/// Count session markers in a day-file
pub fn count_sessions(content: &str) -> usize {
    SESSION_MARKER.find_iter(content).count()
}

/// Collect session titles across day-files, deduplicated in first-seen order
pub fn extract_topics<'a, I: IntoIterator<Item = &'a str>>(contents: I) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for content in contents {
        for cap in TOPIC_HEADING.captures_iter(content) {
            let title = cap[1].trim();
            if !title.is_empty() && !topics.iter().any(|t| t == title) {
                topics.push(title.to_string());
            }
        }
    }
    topics
}

/// Extract the learner's spoken responses from a day-file, one string per
/// session, lines within a response joined with spaces.
pub fn extract_spoken_texts(content: &str) -> Vec<String> {
    let mut texts = Vec::new();
    for section in content.split("####") {
        if !section.trim_start().starts_with("Your Response") {
            continue;
        }
        // Skip the "Your Response" remainder line and the blank line after it
        let mut collected: Vec<&str> = Vec::new();
        for line in section.lines().skip(2) {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.starts_with("---") {
                break;
            }
            if !trimmed.is_empty() {
                collected.push(trimmed);
            }
        }
        if !collected.is_empty() {
            texts.push(collected.join(" "));
        }
    }
    texts
}
