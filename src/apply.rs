use tracing::{debug, info};

use crate::mapping::TranslationMapping;
use crate::markup::{build_plain_translation_node, build_translation_node};
use crate::matcher::{self, Cutoff, MatchResult};
use crate::text::flatten_element_text;
use crate::xml::{Document, Element, NamespaceContext, Node};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApplyOptions {
    /// Mirror the source's inline elements inside the new target.
    pub preserve_tags: bool,
    pub fuzzy: bool,
    pub fuzzy_cutoff: Cutoff,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Units whose target was inserted or replaced.
    pub inserted: usize,
    /// Subset of `inserted` resolved through a fuzzy match.
    pub fuzzy_matched: usize,
    /// Normalized source text of every unmatched unit, in document order.
    pub unmatched: Vec<String>,
}

/// Fills in `<target>` for every trans-unit whose source text resolves in `mapping`.
///
/// Units without a `<source>` are skipped and not counted. Unmatched units are left
/// as they are and reported in [`RunStats::unmatched`].
pub fn apply(
    document: &mut Document,
    mapping: &TranslationMapping,
    options: &ApplyOptions,
) -> RunStats {
    let ctx = NamespaceContext::detect(document);
    debug!(namespace = ctx.namespace(), "resolved xliff namespace");
    let mut run = UnitPass {
        ctx: &ctx,
        mapping,
        options,
        stats: RunStats::default(),
    };
    if ctx.is(&document.root, "trans-unit") {
        run.unit(&mut document.root);
    } else {
        run.walk(&mut document.root);
    }
    let stats = run.stats;
    info!(
        inserted = stats.inserted,
        fuzzy = stats.fuzzy_matched,
        unmatched = stats.unmatched.len(),
        "applied mapping"
    );
    stats
}

struct UnitPass<'a> {
    ctx: &'a NamespaceContext,
    mapping: &'a TranslationMapping,
    options: &'a ApplyOptions,
    stats: RunStats,
}

impl UnitPass<'_> {
    fn walk(&mut self, element: &mut Element) {
        for node in &mut element.children {
            let Node::Element(child) = node else {
                continue;
            };
            if self.ctx.is(child, "trans-unit") {
                self.unit(child);
            } else {
                self.walk(child);
            }
        }
    }

    fn unit(&mut self, unit: &mut Element) {
        let id = unit.attribute("id").unwrap_or("").to_string();
        let ctx = self.ctx;
        let Some(source_index) = unit.position_of_child(|el| ctx.is(el, "source")) else {
            debug!(unit = %id, "trans-unit without source, skipped");
            return;
        };
        let Some(source) = unit.children[source_index].as_element() else {
            return;
        };

        let query = flatten_element_text(source);
        let result = matcher::resolve(
            &query,
            self.mapping,
            self.options.fuzzy,
            self.options.fuzzy_cutoff,
        );
        let text = match result {
            MatchResult::Exact(target) => target.trim().to_string(),
            MatchResult::Fuzzy { target, key, score } => {
                debug!(unit = %id, key, score, "fuzzy match");
                self.stats.fuzzy_matched += 1;
                target.trim().to_string()
            }
            MatchResult::Miss(query) => {
                debug!(unit = %id, query, "no match");
                self.stats.unmatched.push(query.to_string());
                return;
            }
        };

        let target = if self.options.preserve_tags {
            build_translation_node(source, &text)
        } else {
            build_plain_translation_node(source, &text)
        };

        if let Some(existing) = unit.position_of_child(|el| ctx.is(el, "target")) {
            unit.remove_child(existing);
        }
        let anchor = unit.position_of_child(|el| ctx.is(el, "source"));
        unit.insert_after(anchor, Node::Element(target));
        self.stats.inserted += 1;
    }
}
