//! Output formatter: the pipeline that turns the edit buffer's in-band
//! representation into the single clean payload written to stdout.
//!
//! `expand_markers` (badges back to their original content) → `prepend_instruction`
//! (slash-command dispatch hint) → `strip_ansi` (purity guarantee).

use core_badge::expand_markers;
use core_commands::CommandRegistry;
use core_text::display::strip_ansi;

/// Run the full output pipeline on a submitted buffer.
pub fn format_output(raw: &str, registry: &CommandRegistry) -> String {
    let expanded = expand_markers(raw);
    let with_instruction = prepend_instruction(&expanded, registry);
    strip_ansi(&with_instruction)
}

/// If `text`, trimmed, begins with a registered command name immediately
/// followed by end-of-text, space, tab, or newline, prepend
/// `Follow the prompt '.github/agents/<agent_file>'\n\n`. When two commands
/// share a prefix the longer name wins: candidates are tried longest-name
/// first, and the first structural match (not the first alphabetical one)
/// is used. The match test runs against the trimmed copy; the text that
/// follows the prepended instruction is the original, untrimmed `text`.
pub fn prepend_instruction(text: &str, registry: &CommandRegistry) -> String {
    let trimmed = text.trim_start();
    let mut candidates: Vec<_> = registry.iter().collect();
    candidates.sort_by_key(|c| std::cmp::Reverse(c.name.len()));

    for cmd in candidates {
        if let Some(rest) = trimmed.strip_prefix(cmd.name.as_str())
            && rest
                .chars()
                .next()
                .is_none_or(|c| c == ' ' || c == '\t' || c == '\n')
        {
            return format!(
                "Follow the prompt '.github/agents/{}'\n\n{text}",
                cmd.agent_file
            );
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_badge::create_file_marker;
    use core_commands::CommandDescriptor;

    fn registry() -> CommandRegistry {
        let mut r = CommandRegistry::new();
        r.register(CommandDescriptor::new("/review", "Review", "review.agent.md"));
        r.register(CommandDescriptor::new("/reviewer", "Reviewer", "reviewer.agent.md"));
        r
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let r = registry();
        assert_eq!(format_output("hello world", &r), "hello world");
    }

    #[test]
    fn expands_file_markers_before_checking_commands() {
        let r = registry();
        let marker = create_file_marker("/tmp/notes.txt").unwrap();
        let input = format!("please read {marker}");
        assert_eq!(format_output(&input, &r), "please read /tmp/notes.txt");
    }

    #[test]
    fn prepends_instruction_for_registered_command() {
        let r = registry();
        let out = format_output("/review this diff", &r);
        assert_eq!(out, "Follow the prompt '.github/agents/review.agent.md'\n\n/review this diff");
    }

    #[test]
    fn longest_matching_command_wins_on_shared_prefix() {
        let r = registry();
        let out = format_output("/reviewer please", &r);
        assert!(out.starts_with("Follow the prompt '.github/agents/reviewer.agent.md'\n\n"));
    }

    #[test]
    fn command_name_as_whole_line_matches_end_of_text() {
        let r = registry();
        let out = format_output("/review", &r);
        assert_eq!(out, "Follow the prompt '.github/agents/review.agent.md'\n\n/review");
    }

    #[test]
    fn command_like_substring_without_boundary_does_not_match() {
        let r = registry();
        // "/reviewed" is not "/review" followed by a boundary char.
        let out = format_output("/reviewed already", &r);
        assert_eq!(out, "/reviewed already");
    }

    #[test]
    fn leading_whitespace_is_only_stripped_for_the_match_test() {
        let r = registry();
        let out = format_output("   /review now", &r);
        assert_eq!(out, "Follow the prompt '.github/agents/review.agent.md'\n\n   /review now");
    }

    #[test]
    fn strips_ansi_sgr_and_csi_bytes() {
        let r = registry();
        let input = "\u{1b}[31mred\u{1b}[0m text";
        assert_eq!(format_output(input, &r), "red text");
    }
}
