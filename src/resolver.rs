//! Alias resolution - rewrites alias occurrences into canonical tags

use std::cmp::Reverse;
use std::mem;
use std::num::NonZeroUsize;
use std::thread;

use regex::Captures;
use tracing::{debug, trace};

use crate::alias::{Alias, CODE_GROUP, MARKUP_GROUP};
use crate::error::ParseError;
use crate::options::{parse_markup, OptionMap};

/// A priority-ordered set of aliases and the rewriting pass over documents
///
/// Build it once, register everything with [`Dealiaser::add_all`], then share
/// it by reference: [`Dealiaser::parse`] never mutates the registry.
#[derive(Debug, Clone, Default)]
pub struct Dealiaser {
    aliases: Vec<Alias>,
}

/// One matched span in a document
struct Occurrence<'a, 't> {
    alias: &'a Alias,
    captures: Captures<'t>,
}

impl Occurrence<'_, '_> {
    fn start(&self) -> usize {
        match_start(&self.captures)
    }

    fn end(&self) -> usize {
        self.captures.get(0).map_or(0, |m| m.end())
    }
}

fn match_start(captures: &Captures<'_>) -> usize {
    captures.get(0).map_or(0, |m| m.start())
}

/// Next match of one alias at or after the scan position
enum Candidate<'t> {
    Unsearched,
    Found(Captures<'t>),
    Exhausted,
}

/// Per-alias lookahead over one document
///
/// A cached match stays valid while it starts at or after the scan position,
/// so each alias walks the document about once per pass instead of once per
/// occurrence.
struct Lookahead<'a, 't> {
    aliases: &'a [Alias],
    text: &'t str,
    candidates: Vec<Candidate<'t>>,
}

impl<'a, 't> Lookahead<'a, 't> {
    fn new(aliases: &'a [Alias], text: &'t str) -> Self {
        Self {
            aliases,
            text,
            candidates: aliases.iter().map(|_| Candidate::Unsearched).collect(),
        }
    }

    /// Leftmost occurrence at or after `search`, ties going to registry order
    fn next_at(&mut self, search: usize) -> Option<Occurrence<'a, 't>> {
        let aliases = self.aliases;
        let mut best: Option<(usize, usize)> = None;

        for (index, alias) in aliases.iter().enumerate() {
            let candidate = &mut self.candidates[index];
            let stale = match candidate {
                Candidate::Unsearched => true,
                Candidate::Found(captures) => match_start(captures) < search,
                Candidate::Exhausted => false,
            };
            if stale {
                *candidate = match alias.pattern().captures_at(self.text, search) {
                    Some(captures) => Candidate::Found(captures),
                    None => Candidate::Exhausted,
                };
            }
            if let Candidate::Found(captures) = candidate {
                let start = match_start(captures);
                if best.map_or(true, |(best_start, _)| start < best_start) {
                    best = Some((start, index));
                }
            }
        }

        let (_, index) = best?;
        // The winner is consumed; the next step always searches past its start
        match mem::replace(&mut self.candidates[index], Candidate::Unsearched) {
            Candidate::Found(captures) => Some(Occurrence {
                alias: &aliases[index],
                captures,
            }),
            _ => None,
        }
    }
}

impl Dealiaser {
    /// Create an empty dealiaser
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered aliases, highest priority first
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Register a batch of aliases
    ///
    /// The registry is re-sorted by descending priority. The sort is stable,
    /// so among equal priorities earlier registrations stay first and win
    /// when two aliases match at the same position.
    pub fn add_all(&mut self, aliases: impl IntoIterator<Item = Alias>) {
        self.aliases.extend(aliases);
        self.aliases.sort_by_key(|alias| Reverse(alias.priority()));
        debug!(
            aliases = self.aliases.len(),
            priorities = ?self.aliases.iter().map(Alias::priority).collect::<Vec<_>>(),
            "registered aliases"
        );
    }

    /// Rewrite every alias occurrence in `text` into a canonical tag
    ///
    /// This is a single left-to-right pass. At each step the leftmost match of
    /// any alias wins, and among matches starting at the same byte the alias
    /// first in the registry wins. Rewritten text is never scanned again, so
    /// an alias nested inside another alias's match is left untouched.
    ///
    /// Fails on the first occurrence whose markup is not a valid option map;
    /// no partial output is returned.
    pub fn parse(&self, text: &str) -> Result<String, ParseError> {
        let mut output = String::with_capacity(text.len());
        let mut copied = 0;
        let mut search = 0;
        let mut count = 0usize;
        let mut lookahead = Lookahead::new(&self.aliases, text);

        while search <= text.len() {
            let Some(occurrence) = lookahead.next_at(search) else {
                break;
            };
            let (start, end) = (occurrence.start(), occurrence.end());
            trace!(
                start,
                end,
                alias = occurrence.alias.name().unwrap_or("<anon>"),
                "alias occurrence"
            );

            output.push_str(&text[copied..start]);
            output.push_str(&self.rewrite(&occurrence)?);
            copied = end;
            count += 1;

            // An empty match must still make progress
            search = if end > start {
                end
            } else {
                end + text[end..].chars().next().map_or(1, char::len_utf8)
            };
        }
        output.push_str(&text[copied..]);

        debug!(occurrences = count, "dealiased document");
        Ok(output)
    }

    /// Rewrite several documents concurrently against the same registry
    ///
    /// Documents are split into one contiguous batch per available core.
    /// Results come back in input order.
    pub fn parse_all<S>(&self, documents: &[S]) -> Vec<Result<String, ParseError>>
    where
        S: AsRef<str> + Sync,
    {
        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let batch = documents.len().div_ceil(workers).max(1);
        debug!(documents = documents.len(), workers, batch, "parsing batch");

        thread::scope(|scope| {
            let handles: Vec<_> = documents
                .chunks(batch)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|doc| self.parse(doc.as_ref()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    /// Human readable registry listing, one alias per line in match order
    pub fn listing(&self) -> String {
        self.aliases
            .iter()
            .map(|alias| {
                format!(
                    "{:<10} {:>6}  {}\n",
                    alias.name().unwrap_or("<anon>"),
                    alias.priority(),
                    alias.pattern().as_str()
                )
            })
            .collect()
    }

    fn rewrite(&self, occurrence: &Occurrence<'_, '_>) -> Result<String, ParseError> {
        let captures = &occurrence.captures;
        let code = captures.name(CODE_GROUP).map_or("", |m| m.as_str());

        let markup = if occurrence.alias.has_markup() {
            captures.name(MARKUP_GROUP)
        } else {
            None
        };
        let overrides = match markup {
            Some(markup) => parse_markup(markup.as_str())
                .map_err(|err| err.relocate(occurrence.start(), markup.start()))?,
            None => OptionMap::new(),
        };

        let options = occurrence.alias.resolve(overrides);
        Ok(occurrence.alias.render(code, &options))
    }
}
