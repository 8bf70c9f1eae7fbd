//! Rule engine - decides per anchor whether to add `rel`/`target` and adds them
//!
//! Evaluation for each anchor:
//! 1. No keywords configured: the anchor is eligible.
//! 2. Otherwise `matched` is true when any keyword is a literal substring of
//!    the href (an absent href matches as the empty string).
//! 3. Normal mode rewrites matched anchors, white-list mode rewrites the rest.
//!
//! Rewriting never overwrites: `rel` and `target` are each added only when
//! configured and not already present on the element.

use serde::Serialize;

use crate::html::{Document, ElementHandle};
use crate::rules::options::{ConfigError, Keyword, RewriteOptions};

/// Why an anchor was or was not rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// No keyword filter configured
    Unconditional,
    /// Href contains a keyword
    KeywordMatch,
    /// Href contains none of the keywords
    NoKeywordMatch,
    /// White-list mode and href contains a keyword
    WhiteListed,
    /// White-list mode and href contains none of the keywords
    NotWhiteListed,
}

impl Reason {
    pub fn is_eligible(self) -> bool {
        matches!(
            self,
            Reason::Unconditional | Reason::KeywordMatch | Reason::NotWhiteListed
        )
    }
}

/// Outcome of evaluating one anchor without touching it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub reason: Reason,
    pub eligible: bool,
    /// Attributes that rewriting would add, in write order
    pub attributes: Vec<(String, String)>,
}

/// Counters for one applied document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub anchors: usize,
    pub eligible: usize,
    pub rewritten: usize,
    pub attributes_added: usize,
}

/// Result of rewriting a source text
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub output: String,
    pub report: ApplyReport,
}

impl Rewritten {
    pub fn changed(&self) -> bool {
        self.report.attributes_added > 0
    }
}

/// Validated, immutable rewrite configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    keywords: Vec<String>,
    rel: Option<String>,
    target: Option<String>,
    white_list: bool,
}

impl RuleSet {
    /// Validate options once, before any document is processed.
    pub fn from_options(options: Option<&RewriteOptions>) -> Result<Self, ConfigError> {
        let options = options.ok_or(ConfigError::ConfigurationMissing)?;
        let keywords = Keyword::from_value(options.keyword.as_ref())?.into_sequence();

        Ok(Self {
            keywords,
            rel: options.rel.clone(),
            target: options.target.clone(),
            white_list: options.white_list,
        })
    }

    pub fn is_unconditional(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether no attribute would ever be written
    pub fn is_noop(&self) -> bool {
        self.rel.is_none() && self.target.is_none()
    }

    /// Whether any keyword is a substring of `href`
    pub fn matches(&self, href: &str) -> bool {
        self.keywords.iter().any(|k| href.contains(k.as_str()))
    }

    /// Classify an element against the keyword policy
    pub fn reason<E: ElementHandle + ?Sized>(&self, element: &E) -> Reason {
        if self.is_unconditional() {
            return Reason::Unconditional;
        }

        let href = element.get_attribute("href").unwrap_or_default();
        match (self.matches(href), self.white_list) {
            (true, false) => Reason::KeywordMatch,
            (false, false) => Reason::NoKeywordMatch,
            (true, true) => Reason::WhiteListed,
            (false, true) => Reason::NotWhiteListed,
        }
    }

    /// Attributes that are configured and absent on the element
    fn missing_attributes<'a, E: ElementHandle + ?Sized>(
        &'a self,
        element: &E,
    ) -> Vec<(&'static str, &'a str)> {
        [("rel", self.rel.as_deref()), ("target", self.target.as_deref())]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .filter(|(name, _)| !element.has_attribute(name))
            .collect()
    }

    /// Evaluate an element without mutating it
    pub fn evaluate<E: ElementHandle + ?Sized>(&self, element: &E) -> Decision {
        let reason = self.reason(element);
        let eligible = reason.is_eligible();
        let attributes = if eligible {
            self.missing_attributes(element)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        } else {
            Vec::new()
        };

        Decision {
            reason,
            eligible,
            attributes,
        }
    }

    /// Rewrite an element already classified as `reason`; returns the number
    /// of attributes added.
    pub fn rewrite_element<E: ElementHandle + ?Sized>(
        &self,
        reason: Reason,
        element: &mut E,
    ) -> usize {
        if !reason.is_eligible() {
            return 0;
        }

        let missing = self.missing_attributes(element);
        missing
            .into_iter()
            .filter(|(name, value)| element.set_attribute(name, value))
            .count()
    }

    /// Apply the rules to every anchor of the document, in document order.
    pub fn apply(&self, document: &mut Document) -> ApplyReport {
        let mut report = ApplyReport::default();

        for anchor in document.anchors_mut() {
            report.anchors += 1;
            let reason = self.reason(&*anchor);
            if reason.is_eligible() {
                report.eligible += 1;
            }

            let added = self.rewrite_element(reason, anchor);
            if added > 0 {
                report.rewritten += 1;
                report.attributes_added += added;
            }
        }

        report
    }

    /// Parse, rewrite and serialize a source text
    pub fn rewrite(&self, raw: &str) -> Rewritten {
        let mut document = Document::parse(raw);
        let report = self.apply(&mut document);

        Rewritten {
            output: document.serialize(),
            report,
        }
    }
}

/// Validate `options` and rewrite `raw` with them.
pub fn transform(raw: &str, options: Option<&RewriteOptions>) -> Result<String, ConfigError> {
    let rules = RuleSet::from_options(options)?;
    Ok(rules.rewrite(raw).output)
}
