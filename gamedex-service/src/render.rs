//! Text rendering for panel and tool output.
//!
//! Both the HTTP panel and the MCP tools return the same human-readable
//! reports, so all response reshaping lives here as pure functions.

use crate::clip::LabelScore;
use crate::igdb::{Character, Game};

/// Maximum description length in character reports
pub const DESCRIPTION_LIMIT: usize = 200;

/// Character with its lookup references resolved to names
#[derive(Debug, Clone)]
pub struct ResolvedCharacter {
    pub name: String,
    pub gender: Option<String>,
    pub species: Option<String>,
    pub description: Option<String>,
}

/// Truncate to a character count, appending "..." when anything was cut
pub fn truncate_description(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push_str("...");
    truncated
}

/// Format an unfiltered character listing
pub fn format_character_list(characters: &[Character]) -> String {
    if characters.is_empty() {
        return "No characters found.".to_string();
    }

    characters
        .iter()
        .map(|c| {
            format!(
                "{}: {}\n{}",
                c.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                c.name,
                c.description.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format game search results
pub fn format_game_list(games: &[Game]) -> String {
    if games.is_empty() {
        return "No games found.".to_string();
    }

    games
        .iter()
        .map(|g| {
            let mut block = format!("{}: {}", g.id, g.name);
            if let Some(summary) = &g.summary {
                block.push('\n');
                block.push_str(&truncate_description(summary, DESCRIPTION_LIMIT));
            }
            if let Some(url) = &g.url {
                block.push('\n');
                block.push_str(url);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format the full characters-for-a-game report
pub fn format_game_report(game: &Game, characters: &[ResolvedCharacter]) -> String {
    let mut output = vec![format!(
        "Game: {} (ID: {})\nURL: {}\n",
        game.name,
        game.id,
        game.url.as_deref().unwrap_or_default()
    )];

    for character in characters {
        let description = character
            .description
            .as_deref()
            .map(|d| truncate_description(d, DESCRIPTION_LIMIT))
            .unwrap_or_default();

        output.push(format!(
            "{}\n  Gender: {} | Species: {}\n  {}\n",
            character.name,
            character.gender.as_deref().unwrap_or("N/A"),
            character.species.as_deref().unwrap_or("N/A"),
            description
        ));
    }

    output.join("\n")
}

/// Format ranked identification results
pub fn format_identification(game: &Game, scores: &[LabelScore]) -> String {
    if scores.is_empty() {
        return format!("No candidates ranked for '{}'.", game.name);
    }

    let mut output = vec![format!(
        "Game: {} (ID: {})\nBest match: {} ({:.1}%)\n",
        game.name,
        game.id,
        scores[0].label,
        scores[0].score * 100.0
    )];

    for (rank, score) in scores.iter().enumerate() {
        output.push(format!(
            "{}. {} ({:.1}%)",
            rank + 1,
            score.label,
            score.score * 100.0
        ));
    }

    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game {
            id: 1877,
            name: "Cyberpunk 2077".to_string(),
            summary: Some("An open-world RPG.".to_string()),
            url: Some("https://www.igdb.com/games/cyberpunk-2077".to_string()),
        }
    }

    #[test]
    fn test_truncation_is_char_boundary_safe() {
        let text = "héllo wörld".repeat(40);
        let truncated = truncate_description(&text, DESCRIPTION_LIMIT);
        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_short_description_is_untouched() {
        assert_eq!(truncate_description("short", 200), "short");
    }

    #[test]
    fn test_empty_character_list() {
        assert_eq!(format_character_list(&[]), "No characters found.");
    }

    #[test]
    fn test_character_list_blocks() {
        let characters = vec![
            Character {
                id: Some(10),
                name: "Johnny".to_string(),
                description: Some("A rocker.".to_string()),
                gender: None,
                species: None,
                url: None,
            },
            Character {
                id: None,
                name: "V".to_string(),
                description: None,
                gender: None,
                species: None,
                url: None,
            },
        ];
        let text = format_character_list(&characters);
        assert_eq!(text, "10: Johnny\nA rocker.\n\n-: V\n");
    }

    #[test]
    fn test_game_report_uses_na_for_missing_lookups() {
        let characters = vec![ResolvedCharacter {
            name: "Judy".to_string(),
            gender: Some("Female".to_string()),
            species: None,
            description: Some("A braindance technician.".to_string()),
        }];
        let report = format_game_report(&game(), &characters);
        assert!(report.starts_with("Game: Cyberpunk 2077 (ID: 1877)"));
        assert!(report.contains("Gender: Female | Species: N/A"));
        assert!(report.contains("A braindance technician."));
    }

    #[test]
    fn test_identification_ranking() {
        let scores = vec![
            LabelScore {
                label: "Judy Alvarez".to_string(),
                score: 0.81,
            },
            LabelScore {
                label: "Panam Palmer".to_string(),
                score: 0.12,
            },
        ];
        let text = format_identification(&game(), &scores);
        assert!(text.contains("Best match: Judy Alvarez (81.0%)"));
        assert!(text.contains("1. Judy Alvarez (81.0%)"));
        assert!(text.contains("2. Panam Palmer (12.0%)"));
    }

    #[test]
    fn test_game_list_formatting() {
        let text = format_game_list(&[game()]);
        assert!(text.starts_with("1877: Cyberpunk 2077"));
        assert!(text.contains("An open-world RPG."));
        assert_eq!(format_game_list(&[]), "No games found.");
    }
}
