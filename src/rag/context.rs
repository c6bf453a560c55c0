//! Context assembly from retrieved documents

use crate::embeddings::truncate_for_embedding;
use crate::models::SearchHit;
use crate::models::SourceCitation;

/// Separator placed between entries
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Marker appended to a cut entry
pub const TRUNCATION_MARKER: &str = "...";

/// Smallest remaining budget worth filling with a truncated entry
pub const MIN_TRUNCATED_ENTRY: usize = 100;

/// Packs search hits into a character-bounded prompt context
///
/// Hits are placed in rank order and lengths are measured in characters. A
/// whole entry is placed while the context stays within `max_context_length`
/// plus the truncation marker's width, so separators never push out an entry
/// that would otherwise fit. An entry that does not fit is cut to the
/// remaining budget and marked. The result never exceeds `max_context_length`
/// plus the truncation marker.
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Format one hit as `[Label] Title\nContent`
    #[must_use]
    pub fn format_entry(hit: &SearchHit) -> String {
        format!(
            "[{}] {}\n{}",
            hit.document.source_type.label(),
            hit.document.title,
            hit.document.content
        )
    }

    /// Assemble context from search results
    #[must_use]
    pub fn assemble(&self, hits: &[SearchHit]) -> String {
        self.assemble_with_sources(hits).0
    }

    /// Assemble context plus one citation per entry placed
    #[must_use]
    pub fn assemble_with_sources(&self, hits: &[SearchHit]) -> (String, Vec<SourceCitation>) {
        let mut context = String::new();
        let mut sources = Vec::new();
        let mut total_length = 0;

        for hit in hits {
            let entry = Self::format_entry(hit);
            let entry_length = entry.chars().count();
            let separator_length = if context.is_empty() {
                0
            } else {
                ENTRY_SEPARATOR.len()
            };

            let limit = self.max_context_length + TRUNCATION_MARKER.len();
            if total_length + separator_length + entry_length > limit {
                let remaining = self
                    .max_context_length
                    .saturating_sub(total_length + separator_length);
                if remaining >= MIN_TRUNCATED_ENTRY {
                    if separator_length > 0 {
                        context.push_str(ENTRY_SEPARATOR);
                    }
                    context.push_str(truncate_for_embedding(&entry, remaining));
                    context.push_str(TRUNCATION_MARKER);
                    sources.push(hit.citation());
                }
                break;
            }

            if separator_length > 0 {
                context.push_str(ENTRY_SEPARATOR);
            }
            context.push_str(&entry);
            sources.push(hit.citation());
            total_length += separator_length + entry_length;
        }

        (context, sources)
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(3000) // Default max context length
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Document;
    use crate::models::DocumentMetadata;
    use crate::models::SourceType;

    fn hit(source_type: SourceType, title: &str, content: &str, score: f64) -> SearchHit {
        SearchHit {
            document: Document {
                id: 1,
                source_type,
                symbol: None,
                title: title.to_string(),
                content: content.to_string(),
                metadata: DocumentMetadata::default(),
                created_at: Utc::now(),
                expires_at: None,
            },
            score,
        }
    }

    #[test]
    fn test_entries_are_labelled_and_separated() {
        let hits = vec![
            hit(SourceType::News, "Apple beats", "Revenue up", 0.9),
            hit(SourceType::Education, "What is beta?", "Beta measures", 0.8),
        ];
        let context = ContextAssembler::new(3000).assemble(&hits);
        assert_eq!(
            context,
            "[News] Apple beats\nRevenue up\n\n[Education] What is beta?\nBeta measures"
        );
    }

    #[test]
    fn test_small_remainder_is_dropped() {
        // First entry leaves 48 characters, below the truncation minimum
        let first = hit(SourceType::News, "A", &"x".repeat(200 - 9), 0.9);
        let second = hit(SourceType::News, "B", &"y".repeat(500), 0.8);
        let (context, sources) = ContextAssembler::new(250).assemble_with_sources(&[first, second]);

        assert_eq!(context.chars().count(), 200);
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_overflowing_entry_is_truncated_with_marker() {
        let first = hit(SourceType::Research, "A", &"x".repeat(100), 0.9);
        let second = hit(SourceType::News, "B", &"y".repeat(500), 0.8);
        let (context, sources) = ContextAssembler::new(300).assemble_with_sources(&[first, second]);

        assert!(context.ends_with(TRUNCATION_MARKER));
        assert_eq!(context.chars().count(), 300 + TRUNCATION_MARKER.len());
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].title, "B");
    }

    #[test]
    fn test_first_entry_alone_can_be_truncated() {
        let only = hit(SourceType::Education, "Long", &"z".repeat(1000), 0.7);
        let (context, sources) = ContextAssembler::new(150).assemble_with_sources(&[only]);

        assert_eq!(context.chars().count(), 150 + TRUNCATION_MARKER.len());
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_multibyte_content_is_measured_in_chars() {
        let first = hit(SourceType::News, "Ü", &"é".repeat(150), 0.9);
        let (context, _) = ContextAssembler::new(120).assemble_with_sources(&[first]);
        assert_eq!(context.chars().count(), 120 + TRUNCATION_MARKER.len());
    }

    #[test]
    fn test_entry_ending_within_marker_width_is_kept_whole() {
        // 100 + 2 + 101 = 203 fits the 200 budget plus the marker width
        let first = hit(SourceType::News, "A", &"x".repeat(100 - 9), 0.9);
        let second = hit(SourceType::News, "B", &"y".repeat(101 - 9), 0.8);
        let (context, sources) =
            ContextAssembler::new(200).assemble_with_sources(&[first.clone(), second.clone()]);

        assert_eq!(
            context,
            format!(
                "{}\n\n{}",
                ContextAssembler::format_entry(&first),
                ContextAssembler::format_entry(&second)
            )
        );
        assert!(!context.ends_with(TRUNCATION_MARKER));
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_default_budget() {
        let entry = hit(SourceType::News, "A", &"x".repeat(5000), 0.9);
        let context = ContextAssembler::default().assemble(&[entry]);
        assert_eq!(context.chars().count(), 3000 + TRUNCATION_MARKER.len());
    }
}
