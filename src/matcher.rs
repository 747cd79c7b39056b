//! Template registry and best-match selection.

use crate::params::Params;
use crate::segment::Segment;
use crate::template::Template;

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, trace};

const ROOT: usize = 0;

/// A registry of templates with attached values, organized as a prefix
/// trie over structural segment equality. Built once, then matched
/// against concurrently without further mutation.
pub struct Matcher<V> {
    nodes: Vec<PathNode<V>>,
}

struct PathNode<V> {
    depth: usize,
    segment: Option<Segment>,
    children: HashMap<Segment, usize>,
    entry: Option<(Template, V)>,
    queries: Vec<(Template, V)>,
}

impl<V> PathNode<V> {
    fn new(depth: usize, segment: Option<Segment>) -> Self {
        Self {
            depth,
            segment,
            children: HashMap::new(),
            entry: None,
            queries: Vec::new(),
        }
    }

    fn is_glob(&self) -> bool {
        self.segment.as_ref().map_or(false, Segment::is_glob)
    }

    // Tie-break rank at equal depth, most specific first.
    fn rank(&self) -> u8 {
        self.segment.as_ref().map_or(0, Segment::specificity)
    }
}

/// The winning registration for one input URI.
pub struct Match<'a, V> {
    template: &'a Template,
    value: &'a V,
    params: Params,
}

impl<'a, V> Match<'a, V> {
    pub fn template(&self) -> &'a Template {
        self.template
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    /// Parameter bindings recovered from the winning walk, path levels
    /// in input order followed by query bindings.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

// One frontier step: which trie node consumed which input segment,
// chained so the winner's bindings can be replayed.
struct Step<'i> {
    prev: Option<usize>,
    node: usize,
    input: Option<&'i Segment>,
}

type Frontier = SmallVec<[usize; 8]>;

impl<V> Default for Matcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Matcher<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![PathNode::new(0, None)],
        }
    }

    /// Registers a template. Templates without query segments share one
    /// slot per trie position, last registration winning; templates with
    /// query segments accumulate as alternatives on that position.
    pub fn add(&mut self, template: Template, value: V) {
        debug!(template = %template, "registering template");
        let mut node = ROOT;
        node = self.descend_part(node, template.scheme().segment());
        node = self.descend_part(node, template.username().segment());
        node = self.descend_part(node, template.password().segment());
        node = self.descend_part(node, template.host().segment());
        node = self.descend_part(node, template.port().segment());
        for segment in template.path() {
            node = self.descend(node, segment.clone());
        }
        node = self.descend_part(node, template.fragment().segment());
        // An extra-only template (`?{**}`) constrains no query key, so it
        // shares the query-less entry slot and matches any query.
        if template.queries().is_empty() {
            self.nodes[node].entry = Some((template, value));
        } else {
            self.nodes[node].queries.push((template, value));
        }
    }

    fn descend_part(&mut self, node: usize, segment: Option<&Segment>) -> usize {
        match segment {
            Some(segment) => self.descend(node, segment.clone()),
            None => node,
        }
    }

    fn descend(&mut self, parent: usize, segment: Segment) -> usize {
        if let Some(&child) = self.nodes[parent].children.get(&segment) {
            return child;
        }
        let child = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(PathNode::new(depth, Some(segment.clone())));
        self.nodes[parent].children.insert(segment, child);
        child
    }

    /// Finds the best registration for `input`, usually a concrete URI
    /// parsed with [`parse_literal`](crate::parse_literal). `None` is a
    /// normal miss, not an error.
    pub fn match_template<'a, 'i>(&'a self, input: &'i Template) -> Option<Match<'a, V>> {
        let mut steps: Vec<Step<'i>> = vec![Step {
            prev: None,
            node: ROOT,
            input: None,
        }];
        let mut frontier: Frontier = SmallVec::new();
        frontier.push(0);

        let levels = [
            input.scheme().segment(),
            input.username().segment(),
            input.password().segment(),
            input.host().segment(),
            input.port().segment(),
        ];
        for segment in levels.iter().copied().flatten() {
            self.advance(segment, &mut steps, &mut frontier);
            if frontier.is_empty() {
                return None;
            }
        }
        for segment in input.path() {
            self.advance(segment, &mut steps, &mut frontier);
            if frontier.is_empty() {
                return None;
            }
        }
        if let Some(segment) = input.fragment().segment() {
            self.advance(segment, &mut steps, &mut frontier);
            if frontier.is_empty() {
                return None;
            }
        }

        let winner = self.pick_best(input, &steps, &frontier);
        if winner.is_none() {
            trace!(input = %input, "no matching template");
        }
        winner
    }

    // One frontier transition: a glob node keeps absorbing in place and
    // every matching child is entered.
    fn advance<'i>(&self, input: &'i Segment, steps: &mut Vec<Step<'i>>, frontier: &mut Frontier) {
        let mut next: Frontier = SmallVec::new();
        for &si in frontier.iter() {
            let node = steps[si].node;
            if self.nodes[node].is_glob() {
                steps.push(Step {
                    prev: Some(si),
                    node,
                    input: Some(input),
                });
                next.push(steps.len() - 1);
            }
            for (key, &child) in &self.nodes[node].children {
                if key.matches(input) {
                    steps.push(Step {
                        prev: Some(si),
                        node: child,
                        input: Some(input),
                    });
                    next.push(steps.len() - 1);
                }
            }
        }
        *frontier = next;
    }

    fn pick_best<'a, 'i>(
        &'a self,
        input: &'i Template,
        steps: &[Step<'i>],
        frontier: &Frontier,
    ) -> Option<Match<'a, V>> {
        let mut best: Option<(usize, &'a (Template, V), bool)> = None;
        let mut best_depth = 0;
        let mut best_rank = 0;
        for &si in frontier.iter() {
            let node = &self.nodes[steps[si].node];
            let better = match best {
                None => true,
                Some(_) => {
                    node.depth > best_depth
                        || (node.depth == best_depth && node.rank() < best_rank)
                }
            };
            if !better {
                continue;
            }
            // A query-carrying alternative outranks the query-less entry
            // stored at the same position.
            let candidate = match pick_best_query(&node.queries, input) {
                Some(entry) => Some((entry, true)),
                None => node.entry.as_ref().map(|entry| (entry, false)),
            };
            if let Some((entry, with_query)) = candidate {
                best = Some((si, entry, with_query));
                best_depth = node.depth;
                best_rank = node.rank();
            }
        }

        let (si, (template, value), with_query) = best?;
        trace!(input = %input, winner = %template, "matched template");
        let params = self.bind_params(input, steps, si, template, with_query);
        Some(Match {
            template,
            value,
            params,
        })
    }

    fn bind_params<'i>(
        &self,
        input: &'i Template,
        steps: &[Step<'i>],
        winner: usize,
        template: &Template,
        with_query: bool,
    ) -> Params {
        // Replay the step chain root-first so glob levels accumulate
        // their values in input order.
        let mut chain: SmallVec<[usize; 8]> = SmallVec::new();
        let mut si = Some(winner);
        while let Some(i) = si {
            if self.nodes[steps[i].node].depth == 0 {
                break;
            }
            chain.push(i);
            si = steps[i].prev;
        }
        let mut params = Params::new();
        for &i in chain.iter().rev() {
            let step = &steps[i];
            let node_segment = self.nodes[step.node].segment.as_ref();
            if let (Some(segment), Some(input_segment)) = (node_segment, step.input) {
                if !segment.is_anonymous() {
                    params.add_value(segment.param_name(), input_segment.text());
                }
            }
        }
        if with_query {
            for tq in template.queries() {
                if tq.param_name().is_empty() {
                    continue;
                }
                if let Some(iq) = input.query(tq.query_name()) {
                    if tq.matches(iq) {
                        for value in iq.values() {
                            params.add_value(tq.param_name(), value.text());
                        }
                    }
                }
            }
        }
        // the catch-all binds unclaimed input keys under their own names
        if template.extra().is_some() {
            for iq in input.queries() {
                if template.query(iq.query_name()).is_some() {
                    continue;
                }
                for value in iq.values() {
                    if value.has_explicit_pattern() {
                        params.add_value(iq.query_name(), value.text());
                    }
                }
            }
        }
        params
    }
}

// Highest positive count of satisfied query constraints wins; one
// mismatched or missing key disqualifies the whole alternative.
fn pick_best_query<'a, V>(
    alternatives: &'a [(Template, V)],
    input: &Template,
) -> Option<&'a (Template, V)> {
    let mut best = None;
    let mut best_score = 0;
    for entry in alternatives {
        let score = query_score(&entry.0, input);
        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }
    best
}

fn query_score(template: &Template, input: &Template) -> usize {
    let mut count = 0;
    for tq in template.queries() {
        match input.query(tq.query_name()) {
            Some(iq) if tq.matches(iq) => count += 1,
            _ => return 0,
        }
    }
    count
}
