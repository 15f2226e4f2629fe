use std::fmt::Display;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::*;

pub(super) const UNKNOWN_NAME: &str = "unknown";
const PLAYER_COUNT_POLL: &str = "suggested_numplayers";

/// Vote tally for one player-count candidate of the player-count poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct SizeVotes {
    pub label: String,
    pub best: u64,
    pub recommended: u64,
    pub not_recommended: u64,
}

impl SizeVotes {
    pub(super) fn total(&self) -> u64 {
        self.best + self.recommended + self.not_recommended
    }

    /// Favorable votes must be a strict majority of all votes; an exact half does not count.
    pub(super) fn is_recommended(&self) -> bool {
        let favorable = self.best + self.recommended;
        favorable * 2 > self.total()
    }

    /// `N+` candidates collect every count above the listed range.
    fn is_overflow(&self) -> bool {
        self.label.trim_end().ends_with('+')
    }
}

pub(super) fn recommended_sizes(votes: &[SizeVotes]) -> Vec<String> {
    votes
        .iter()
        .filter(|tally| !tally.is_overflow() && tally.is_recommended())
        .map(|tally| tally.label.clone())
        .collect()
}

#[derive(Debug, Default)]
struct ItemDraft {
    id: u64,
    name: Option<String>,
    year_published: Option<i32>,
    thumbnail_url: Option<String>,
    average: Option<String>,
    average_weight: Option<String>,
    users_rated: Option<String>,
    votes: Vec<SizeVotes>,
}

impl ItemDraft {
    fn finish(self) -> Result<CollectedRecord, PipelineError> {
        let average_score = required_stat(self.id, "average", self.average)?;
        let complexity_weight = required_stat(self.id, "averageweight", self.average_weight)?;
        let rating_count = required_stat(self.id, "usersrated", self.users_rated)?;

        Ok(CollectedRecord {
            id: self.id,
            name: self.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            year_published: self.year_published,
            average_score,
            complexity_weight,
            rating_count,
            recommended_sizes: recommended_sizes(&self.votes),
            thumbnail_url: self.thumbnail_url,
        })
    }
}

fn required_stat(id: u64, field: &'static str, raw: Option<String>) -> Result<f64, PipelineError> {
    let parsed = raw
        .as_deref()
        .map(str::trim)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite());

    parsed.ok_or(PipelineError::MalformedRecord {
        id,
        field,
        value: raw,
    })
}

#[derive(Debug, Default)]
struct ItemParser {
    batch: usize,
    saw_root: bool,
    closed_root: bool,
    item: Option<ItemDraft>,
    in_thumbnail: bool,
    in_ratings: bool,
    in_size_poll: bool,
    size_votes: Option<SizeVotes>,
    records: Vec<CollectedRecord>,
}

impl ItemParser {
    fn open(&mut self, element: &BytesStart<'_>) -> Result<(), PipelineError> {
        let tag = element.local_name();
        let tag = tag.as_ref();

        if !self.saw_root {
            if tag != b"items" {
                return Err(PipelineError::TransportFailure {
                    batch: self.batch,
                    reason: format!(
                        "unexpected document root <{}>",
                        String::from_utf8_lossy(tag)
                    ),
                });
            }
            self.saw_root = true;
            return Ok(());
        }

        if tag == b"item" {
            let raw_id = attribute(element, "id", self.batch)?;
            let id = raw_id
                .as_deref()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .ok_or(PipelineError::MalformedRecord {
                    id: 0,
                    field: "id",
                    value: raw_id.clone(),
                })?;
            self.item = Some(ItemDraft {
                id,
                ..ItemDraft::default()
            });
            return Ok(());
        }

        let batch = self.batch;
        let Some(item) = self.item.as_mut() else {
            return Ok(());
        };

        match tag {
            b"name" => {
                let is_primary = attribute(element, "type", batch)?.as_deref() == Some("primary");
                if is_primary && item.name.is_none() {
                    item.name = attribute(element, "value", batch)?;
                }
            }
            b"yearpublished" => {
                item.year_published = attribute(element, "value", batch)?
                    .and_then(|value| value.trim().parse::<i32>().ok());
            }
            b"thumbnail" => self.in_thumbnail = true,
            b"ratings" => self.in_ratings = true,
            b"average" if self.in_ratings => item.average = attribute(element, "value", batch)?,
            b"averageweight" if self.in_ratings => {
                item.average_weight = attribute(element, "value", batch)?;
            }
            b"usersrated" if self.in_ratings => {
                item.users_rated = attribute(element, "value", batch)?;
            }
            b"poll" => {
                self.in_size_poll =
                    attribute(element, "name", batch)?.as_deref() == Some(PLAYER_COUNT_POLL);
            }
            b"results" if self.in_size_poll => {
                self.size_votes = Some(SizeVotes {
                    label: attribute(element, "numplayers", batch)?.unwrap_or_default(),
                    ..SizeVotes::default()
                });
            }
            b"result" => {
                if let Some(tally) = self.size_votes.as_mut() {
                    let category = attribute(element, "value", batch)?;
                    let votes = attribute(element, "numvotes", batch)?
                        .and_then(|value| value.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    match category.as_deref() {
                        Some("Best") => tally.best += votes,
                        Some("Recommended") => tally.recommended += votes,
                        Some("Not Recommended") => tally.not_recommended += votes,
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, value: &str) {
        if !self.in_thumbnail {
            return;
        }
        if let Some(item) = self.item.as_mut() {
            let value = value.trim();
            if !value.is_empty() {
                item.thumbnail_url = Some(value.to_string());
            }
        }
    }

    fn close(&mut self, tag: &[u8]) -> Result<(), PipelineError> {
        match tag {
            b"item" => {
                if let Some(item) = self.item.take() {
                    self.records.push(item.finish()?);
                }
                self.in_thumbnail = false;
                self.in_ratings = false;
                self.in_size_poll = false;
                self.size_votes = None;
            }
            b"items" => self.closed_root = true,
            b"thumbnail" => self.in_thumbnail = false,
            b"ratings" => self.in_ratings = false,
            b"poll" => self.in_size_poll = false,
            b"results" => {
                if let (Some(tally), Some(item)) = (self.size_votes.take(), self.item.as_mut()) {
                    item.votes.push(tally);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Parses one batch response into records.
///
/// XML that cannot be read, including a document that ends before `</items>`,
/// is a transport failure for the whole batch, while an item missing one of its
/// rating statistics is a [`PipelineError::MalformedRecord`].
pub(super) fn parse_items(xml: &str, batch: usize) -> Result<Vec<CollectedRecord>, PipelineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = ItemParser {
        batch,
        ..ItemParser::default()
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => parser.open(&element)?,
            Ok(Event::Empty(element)) => {
                parser.open(&element)?;
                parser.close(element.local_name().as_ref())?;
            }
            Ok(Event::Text(text)) => {
                let value = text.unescape().map_err(|err| xml_failure(batch, err))?;
                parser.text(&value);
            }
            Ok(Event::End(element)) => parser.close(element.local_name().as_ref())?,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(xml_failure(batch, err)),
        }
    }

    if !parser.saw_root {
        return Err(PipelineError::TransportFailure {
            batch,
            reason: "response body contained no XML document".to_string(),
        });
    }

    if !parser.closed_root || parser.item.is_some() {
        return Err(PipelineError::TransportFailure {
            batch,
            reason: "truncated XML document".to_string(),
        });
    }

    Ok(parser.records)
}

fn attribute(
    element: &BytesStart<'_>,
    key: &str,
    batch: usize,
) -> Result<Option<String>, PipelineError> {
    let Some(attr) = element
        .try_get_attribute(key)
        .map_err(|err| xml_failure(batch, err))?
    else {
        return Ok(None);
    };

    let value = attr
        .unescape_value()
        .map_err(|err| xml_failure(batch, err))?;
    Ok(Some(value.into_owned()))
}

fn xml_failure(batch: usize, err: impl Display) -> PipelineError {
    PipelineError::TransportFailure {
        batch,
        reason: format!("malformed XML: {err}"),
    }
}
