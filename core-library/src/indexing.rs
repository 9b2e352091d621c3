//! Artist index grouping.
//!
//! Artists are listed under index groups keyed by the first letters of their
//! name, ignoring leading articles ("The Beatles" is filed under "B"). Names
//! that match no group land in [`OTHER_GROUP`].

use crate::models::{Artist, ArtistIndex, ArtistInfo};
use std::collections::BTreeMap;

/// Default group layout: one group per letter, X to Z folded together
pub const DEFAULT_INDEX_GROUPS: &str =
    "A B C D E F G H I J K L M N O P Q R S T U V W X-Z(XYZ) [Unknown]([)";

/// Articles skipped when filing an artist
pub const DEFAULT_IGNORED_ARTICLES: &str = "The El La Los Las Le Les Os As O A";

/// Group for names no declared group matches
pub const OTHER_GROUP: &str = "#";

/// Ordered prefix → group table
///
/// Parsed from a space separated list where each entry is either a plain
/// prefix that names its own group (`A`), or `Name(chars)` filing every
/// listed character under `Name` (`X-Z(XYZ)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGroups {
    prefixes: Vec<(String, String)>,
}

impl IndexGroups {
    /// Parse a group layout
    ///
    /// # Examples
    ///
    /// ```
    /// use core_library::indexing::IndexGroups;
    ///
    /// let groups = IndexGroups::parse("A B X-Z(XYZ)");
    /// assert_eq!(groups.group_for("yello"), "X-Z");
    /// assert_eq!(groups.group_for("abba"), "A");
    /// assert_eq!(groups.group_for("10cc"), "#");
    /// ```
    pub fn parse(layout: &str) -> Self {
        let mut prefixes: Vec<(String, String)> = Vec::new();
        for entry in layout.split_whitespace() {
            match split_folded(entry) {
                Some((group, chars)) => {
                    for c in chars.chars() {
                        prefixes.push((c.to_lowercase().collect(), group.to_string()));
                    }
                }
                None => prefixes.push((entry.to_lowercase(), entry.to_string())),
            }
        }
        Self { prefixes }
    }

    /// Group of an already lowercased index name
    pub fn group_for(&self, index_name: &str) -> &str {
        self.prefixes
            .iter()
            .find(|(prefix, _)| index_name.starts_with(prefix.as_str()))
            .map(|(_, group)| group.as_str())
            .unwrap_or(OTHER_GROUP)
    }
}

impl Default for IndexGroups {
    fn default() -> Self {
        Self::parse(DEFAULT_INDEX_GROUPS)
    }
}

/// `Name(chars)` → `(Name, chars)`
fn split_folded(entry: &str) -> Option<(&str, &str)> {
    let body = entry.strip_suffix(')')?;
    let (group, chars) = body.split_once('(')?;
    if group.is_empty() || chars.is_empty() {
        return None;
    }
    Some((group, chars))
}

/// Builds the artist index from the artist list of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistIndexer {
    groups: IndexGroups,
    ignored_articles: Vec<String>,
}

impl Default for ArtistIndexer {
    fn default() -> Self {
        Self::new(IndexGroups::default(), DEFAULT_IGNORED_ARTICLES)
    }
}

impl ArtistIndexer {
    /// `ignored_articles` is a space separated list, matched case-sensitively
    pub fn new(groups: IndexGroups, ignored_articles: &str) -> Self {
        Self {
            groups,
            ignored_articles: ignored_articles
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Lowercased name without its leading article
    ///
    /// Only the first matching article is removed.
    pub fn index_name(&self, name: &str) -> String {
        let stripped = self
            .ignored_articles
            .iter()
            .find_map(|article| name.strip_prefix(article.as_str())?.strip_prefix(' '))
            .unwrap_or(name);
        stripped.trim().to_lowercase()
    }

    /// Group `artists` into index entries
    ///
    /// Entries come back ordered by group name and their members by index
    /// name. Artists whose name is blank are left out.
    pub fn build(&self, artists: &[Artist]) -> Vec<ArtistIndex> {
        let mut groups: BTreeMap<&str, BTreeMap<(String, &str), ArtistInfo>> = BTreeMap::new();

        for artist in artists {
            let index_name = self.index_name(&artist.name);
            if index_name.is_empty() {
                continue;
            }
            let group = self.groups.group_for(&index_name);
            groups.entry(group).or_default().insert(
                (index_name, artist.id.as_str()),
                ArtistInfo {
                    artist_id: artist.id.clone(),
                    artist: artist.name.clone(),
                    album_count: artist.album_count,
                },
            );
        }

        groups
            .into_iter()
            .map(|(group, members)| ArtistIndex {
                id: group.to_string(),
                artists: members.into_values().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: &str, name: &str) -> Artist {
        Artist::new(id, name)
    }

    fn members(index: &ArtistIndex) -> Vec<&str> {
        index.artists.iter().map(|a| a.artist.as_str()).collect()
    }

    #[test]
    fn test_parse_default_groups() {
        let groups = IndexGroups::default();
        assert_eq!(groups.group_for("beatles"), "B");
        assert_eq!(groups.group_for("zappa"), "X-Z");
        assert_eq!(groups.group_for("[unknown artist]"), "[Unknown]");
        assert_eq!(groups.group_for("2pac"), OTHER_GROUP);
        assert_eq!(groups.group_for(""), OTHER_GROUP);
    }

    #[test]
    fn test_parse_multi_letter_prefix() {
        let groups = IndexGroups::parse("Th Q(QU)");
        assert_eq!(groups.group_for("thin lizzy"), "Th");
        assert_eq!(groups.group_for("tool"), OTHER_GROUP);
        assert_eq!(groups.group_for("ufo"), "Q");
    }

    #[test]
    fn test_malformed_folded_entry_is_a_plain_prefix() {
        let groups = IndexGroups::parse("()");
        assert_eq!(groups.group_for("()"), "()");
    }

    #[test]
    fn test_index_name_strips_first_article_only() {
        let indexer = ArtistIndexer::default();
        assert_eq!(indexer.index_name("The Beatles"), "beatles");
        assert_eq!(indexer.index_name("Los Lobos"), "lobos");
        assert_eq!(indexer.index_name("The The"), "the");
        // Articles are case-sensitive and need a following space
        assert_eq!(indexer.index_name("the beatles"), "the beatles");
        assert_eq!(indexer.index_name("Theatre"), "theatre");
        assert_eq!(indexer.index_name("A"), "a");
    }

    #[test]
    fn test_build_groups_and_orders_members() {
        let indexer = ArtistIndexer::default();
        let index = indexer.build(&[
            artist("1", "The Beatles"),
            artist("2", "Björk"),
            artist("3", "ABBA"),
            artist("4", "Yes"),
            artist("5", "10cc"),
            artist("6", "   "),
        ]);

        let ids: Vec<&str> = index.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["#", "A", "B", "X-Z"]);
        assert_eq!(members(&index[2]), vec!["The Beatles", "Björk"]);
        assert_eq!(index[0].artists[0].artist_id, "5");
    }

    #[test]
    fn test_build_keeps_artists_sharing_a_name() {
        let mut first = artist("1", "Nirvana");
        first.album_count = 3;
        let second = artist("2", "Nirvana");

        let index = ArtistIndexer::default().build(&[second, first]);
        assert_eq!(index.len(), 1);
        let ids: Vec<&str> = index[0].artists.iter().map(|a| a.artist_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(index[0].artists[0].album_count, 3);
    }

    #[test]
    fn test_build_empty() {
        assert!(ArtistIndexer::default().build(&[]).is_empty());
    }
}
