//! Pipe-delimited encoding of the player log and winners log.
//!
//! Both logs are line oriented and must stay byte-compatible with files written
//! by earlier deployments, so every read and write of the textual format goes
//! through this module.

use chrono::NaiveDateTime;
use tracing::debug;

use super::{
    models::{PlayerResult, RankedEntry, WinnerRecord},
    ScoreError,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Line terminating every block in the winners log
pub const GROUP_DELIMITER: &str = "-----";

const WINNER_LABEL: &str = "Winner: ";
const PLAYER_LABEL: &str = "Player: ";

/// `name|phone|age|score|reaction|timestamp\n`
pub fn encode_player_line(result: &PlayerResult) -> String {
    format!(
        "{}|{}|{}|{}|{:.1}|{}\n",
        result.name,
        result.phone,
        result.age,
        result.score,
        result.avg_reaction_ms,
        result.timestamp.format(TIMESTAMP_FORMAT)
    )
}

pub fn decode_player_line(line: &str) -> Result<PlayerResult, ScoreError> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('|').collect();
    let [name, phone, age, score, reaction, timestamp] = fields.as_slice() else {
        return Err(ScoreError::Parse(format!(
            "expected 6 fields in player line, found {}",
            fields.len()
        )));
    };

    Ok(PlayerResult {
        name: name.to_string(),
        phone: phone.to_string(),
        age: parse_field("age", age)?,
        score: parse_field("score", score)?,
        avg_reaction_ms: parse_field("reaction", reaction)?,
        timestamp: NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| ScoreError::Parse(format!("invalid timestamp '{}': {}", timestamp, e)))?,
    })
}

/// Decodes every non-blank line of the player log, in file order
pub fn decode_player_log(contents: &str) -> Result<Vec<PlayerResult>, ScoreError> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(decode_player_line)
        .collect()
}

pub fn count_player_lines(contents: &str) -> usize {
    contents.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Winner line, one `Player:` line per remaining member, then the delimiter
pub fn encode_winner_block(record: &WinnerRecord) -> String {
    let winner = &record.winner;
    let mut block = format!(
        "{}{}|Phone: {}|Age: {}|Score: {}|Reaction: {:.1}ms\n",
        WINNER_LABEL, winner.name, winner.phone, winner.age, winner.score, winner.reaction_ms
    );

    for player in &record.players {
        block.push_str(&format!(
            "{}{}|Phone: {}|Age: {}|Score: {}pts|Reaction: {:.1}ms\n",
            PLAYER_LABEL, player.name, player.phone, player.age, player.score, player.reaction_ms
        ));
    }

    block.push_str(GROUP_DELIMITER);
    block.push('\n');
    block
}

/// Text to write ahead of a new block so it starts on its own line
pub fn block_separator(existing: &str) -> &'static str {
    if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    }
}

/// Number of delimiter-terminated blocks, i.e. groups already written
pub fn count_group_delimiters(contents: &str) -> usize {
    contents
        .lines()
        .filter(|line| line.trim() == GROUP_DELIMITER)
        .count()
}

/// Parses the winners log in storage order (oldest first).
///
/// A `Winner:` line always opens a new block, so an undelimited partial block
/// is closed there. Blocks with fewer than two lines or with unparsable lines
/// are skipped.
pub fn decode_winner_log(contents: &str) -> Vec<WinnerRecord> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in contents.lines() {
        if line.trim() == GROUP_DELIMITER {
            blocks.push(std::mem::take(&mut current));
        } else if line.starts_with(WINNER_LABEL) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.push(line);
        } else if !line.trim().is_empty() {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .into_iter()
        .enumerate()
        .filter_map(|(index, lines)| match decode_winner_block(&lines) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(block = index, error = %e, "Skipping winners log block");
                None
            }
        })
        .collect()
}

fn decode_winner_block(lines: &[&str]) -> Result<WinnerRecord, ScoreError> {
    let [first, rest @ ..] = lines else {
        return Err(ScoreError::Parse("empty block".to_string()));
    };
    if rest.is_empty() {
        return Err(ScoreError::Parse("block has fewer than 2 lines".to_string()));
    }

    let winner = decode_entry(first, WINNER_LABEL)?;
    let players = rest
        .iter()
        .filter(|line| line.starts_with(PLAYER_LABEL))
        .map(|line| decode_entry(line, PLAYER_LABEL))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WinnerRecord { winner, players })
}

fn decode_entry(line: &str, label: &str) -> Result<RankedEntry, ScoreError> {
    let fields: Vec<&str> = line.split('|').collect();
    let [name, phone, age, score, reaction] = fields.as_slice() else {
        return Err(ScoreError::Parse(format!(
            "expected 5 fields in '{}' line, found {}",
            label.trim_end_matches(": "),
            fields.len()
        )));
    };

    let score = strip_label(score, "Score: ")?;
    let reaction = strip_label(reaction, "Reaction: ")?;

    Ok(RankedEntry {
        name: strip_label(name, label)?.to_string(),
        phone: strip_label(phone, "Phone: ")?.to_string(),
        age: parse_field("age", strip_label(age, "Age: ")?)?,
        score: parse_field("score", score.strip_suffix("pts").unwrap_or(score))?,
        reaction_ms: parse_field("reaction", reaction.strip_suffix("ms").unwrap_or(reaction))?,
    })
}

fn strip_label<'a>(field: &'a str, label: &str) -> Result<&'a str, ScoreError> {
    field
        .strip_prefix(label)
        .ok_or_else(|| ScoreError::Parse(format!("missing '{}' in '{}'", label.trim(), field)))
}

fn parse_field<T: std::str::FromStr>(what: &str, raw: &str) -> Result<T, ScoreError> {
    raw.trim()
        .parse()
        .map_err(|_| ScoreError::Parse(format!("invalid {} '{}'", what, raw)))
}
