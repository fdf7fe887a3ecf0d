//! Verification of recorded invocations against expected call sequences.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::debug::MethodInfo;
use crate::error::{FakeError, FakeResult};
use crate::matcher::ArgMatcher;
use crate::proxy::ProxyId;
use crate::recorder::{ActualInvocation, Recorder};
use crate::Method;

/// How many times an expectation must occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Times {
    /// Not at all.
    Never,
    /// Exactly this many times.
    Exactly(usize),
    /// At least this many times.
    AtLeast(usize),
}

impl Times {
    /// Whether `count` occurrences satisfy this requirement.
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::Never => count == 0,
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }

    fn required(self) -> usize {
        match self {
            Self::Never => 0,
            Self::Exactly(n) | Self::AtLeast(n) => n,
        }
    }
}

impl std::fmt::Display for Times {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Exactly(1) => write!(f, "exactly once"),
            Self::Exactly(n) => write!(f, "exactly {n} times"),
            Self::AtLeast(n) => write!(f, "at least {n} times"),
        }
    }
}

///
/// One expected call: a method of one proxy, with an argument matcher.
///
/// Created by [Proxy::invocation](crate::Proxy::invocation).
///
#[derive(Clone)]
pub struct InvocationPattern {
    proxy: ProxyId,
    method: MethodInfo,
    matcher_debug: String,
    #[allow(clippy::type_complexity)]
    matches: Arc<dyn Fn(&ActualInvocation) -> bool + Send + Sync>,
}

impl InvocationPattern {
    pub(crate) fn new<M: Method>(proxy: ProxyId, matcher: ArgMatcher<M>) -> Self {
        Self {
            proxy,
            method: MethodInfo::of::<M>(),
            matcher_debug: matcher.describe(),
            matches: Arc::new(move |invocation: &ActualInvocation| {
                invocation
                    .args::<M>()
                    .map(|args| matcher.matches(args))
                    .unwrap_or(false)
            }),
        }
    }

    /// The proxy the pattern is bound to.
    pub fn proxy(&self) -> ProxyId {
        self.proxy
    }

    /// The expected method.
    pub fn method(&self) -> MethodInfo {
        self.method
    }

    /// Whether an actual invocation fulfills this pattern.
    pub fn matches(&self, invocation: &ActualInvocation) -> bool {
        invocation.proxy() == self.proxy
            && invocation.method() == self.method
            && (self.matches)(invocation)
    }
}

impl std::fmt::Display for InvocationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}{}", self.proxy, self.method, self.matcher_debug)
    }
}

impl std::fmt::Debug for InvocationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InvocationPattern({self})")
    }
}

///
/// An ordered list of expected calls, possibly spanning several proxies of one session.
///
#[derive(Clone, Debug, Default)]
pub struct Expectation {
    patterns: Vec<InvocationPattern>,
}

impl Expectation {
    /// An empty expectation. It is trivially fulfilled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expected call, builder style.
    pub fn then(mut self, pattern: InvocationPattern) -> Self {
        self.push(pattern);
        self
    }

    /// Append an expected call.
    pub fn push(&mut self, pattern: InvocationPattern) -> &mut Self {
        self.patterns.push(pattern);
        self
    }

    /// The expected calls.
    pub fn patterns(&self) -> &[InvocationPattern] {
        &self.patterns
    }

    /// Number of expected calls.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether there are no expected calls.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The proxies the expectation involves.
    pub fn proxies(&self) -> BTreeSet<ProxyId> {
        self.patterns.iter().map(InvocationPattern::proxy).collect()
    }
}

impl FromIterator<InvocationPattern> for Expectation {
    fn from_iter<T: IntoIterator<Item = InvocationPattern>>(iter: T) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

/// Whether an expectation was checked as an ordered subsequence or in any order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationOrder {
    /// Ordered subsequence.
    InOrder,
    /// Any order.
    AnyOrder,
}

impl std::fmt::Display for VerificationOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InOrder => write!(f, "in order"),
            Self::AnyOrder => write!(f, "in any order"),
        }
    }
}

///
/// Why a sequence verification failed.
///
#[derive(Clone, Debug)]
pub struct SequenceMismatch {
    pub(crate) order: VerificationOrder,
    pub(crate) times: Times,
    pub(crate) found: usize,
    pub(crate) unmatched: Option<(usize, String)>,
    pub(crate) expected: Vec<String>,
    pub(crate) actual: Vec<String>,
}

impl SequenceMismatch {
    /// How the expectation was checked.
    pub fn order(&self) -> VerificationOrder {
        self.order
    }

    /// The required number of occurrences.
    pub fn times(&self) -> Times {
        self.times
    }

    /// The number of occurrences found.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Position of the expected element that had no remaining matching call, if any.
    ///
    /// `None` means too many occurrences were found.
    pub fn unmatched_position(&self) -> Option<usize> {
        self.unmatched.as_ref().map(|(position, _)| *position)
    }

    /// The rendered expected calls.
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// The rendered actual calls of the involved proxies.
    pub fn actual(&self) -> &[String] {
        &self.actual
    }
}

impl std::fmt::Display for SequenceMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sequence verification failed: expected {} {}, found {}.",
            self.order, self.times, self.found
        )?;
        if let Some((position, pattern)) = &self.unmatched {
            write!(
                f,
                " No remaining invocation matches expected element {position}: {pattern}."
            )?;
        }

        let expected = self.expected.join("\n");
        let actual = self.actual.join("\n");
        write_comparison(f, &expected, &actual)
    }
}

#[cfg(feature = "pretty-print")]
fn write_comparison(f: &mut std::fmt::Formatter<'_>, expected: &str, actual: &str) -> std::fmt::Result {
    let comparison = pretty_assertions::StrComparison::new(expected, actual);
    write!(f, "\n{comparison}")
}

#[cfg(not(feature = "pretty-print"))]
fn write_comparison(f: &mut std::fmt::Formatter<'_>, expected: &str, actual: &str) -> std::fmt::Result {
    write!(f, "\nexpected:\n{expected}")?;
    write!(f, "\n  actual:\n{actual}")
}

/// Outcome of counting occurrences.
struct Tally {
    count: usize,
    consumed: Vec<usize>,
    stuck_at: Option<usize>,
}

/// Count ordered, non-overlapping subsequence occurrences, greedily.
fn count_in_order(patterns: &[InvocationPattern], log: &[Arc<ActualInvocation>]) -> Tally {
    let mut count = 0;
    let mut consumed = vec![];
    let mut pending = vec![];

    for invocation in log {
        if patterns[pending.len()].matches(invocation) {
            pending.push(invocation.seq());
            if pending.len() == patterns.len() {
                count += 1;
                consumed.append(&mut pending);
            }
        }
    }

    Tally {
        count,
        consumed,
        stuck_at: Some(pending.len()),
    }
}

/// Count how many disjoint copies of the expectation can be assigned to distinct calls,
/// using augmenting paths over the bipartite graph of expected elements and calls.
fn count_in_any_order(patterns: &[InvocationPattern], log: &[Arc<ActualInvocation>]) -> Tally {
    let edges: Vec<Vec<usize>> = patterns
        .iter()
        .map(|pattern| {
            log.iter()
                .enumerate()
                .filter(|(_, invocation)| pattern.matches(invocation))
                .map(|(index, _)| index)
                .collect()
        })
        .collect();

    // Assignment of each call to an expected node, where node = copy * len + position.
    let mut assigned: Vec<Option<usize>> = vec![None; log.len()];
    let mut count = 0;

    let stuck_at = loop {
        let snapshot = assigned.clone();
        let stuck_at = (0..patterns.len()).find(|position| {
            let node = count * patterns.len() + position;
            let mut visited = vec![false; log.len()];
            !augment(node, patterns.len(), &edges, &mut assigned, &mut visited)
        });

        if stuck_at.is_some() {
            assigned = snapshot;
            break stuck_at;
        }
        count += 1;
    };

    Tally {
        count,
        consumed: assigned
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_some())
            .map(|(index, _)| log[index].seq())
            .collect(),
        stuck_at,
    }
}

fn augment(
    node: usize,
    len: usize,
    edges: &[Vec<usize>],
    assigned: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &call in &edges[node % len] {
        if visited[call] {
            continue;
        }
        visited[call] = true;

        let free = match assigned[call] {
            None => true,
            Some(other) => augment(other, len, edges, assigned, visited),
        };
        if free {
            assigned[call] = Some(node);
            return true;
        }
    }

    false
}

fn verify_with(
    recorder: &Recorder,
    expectation: &Expectation,
    times: Times,
    order: VerificationOrder,
) -> FakeResult<()> {
    if expectation.is_empty() {
        return Ok(());
    }

    let log = recorder.invocations_of(&expectation.proxies());
    let tally = match order {
        VerificationOrder::InOrder => count_in_order(expectation.patterns(), &log),
        VerificationOrder::AnyOrder => count_in_any_order(expectation.patterns(), &log),
    };

    tracing::debug!(%order, %times, found = tally.count, invocations = log.len(), "verified expectation");

    if times.admits(tally.count) {
        recorder.mark_verified(tally.consumed);
        return Ok(());
    }

    let unmatched = if tally.count < times.required() {
        tally.stuck_at.map(|position| {
            (position, expectation.patterns()[position].to_string())
        })
    } else {
        None
    };

    Err(FakeError::SequenceVerificationFailure(Box::new(
        SequenceMismatch {
            order,
            times,
            found: tally.count,
            unmatched,
            expected: expectation.patterns().iter().map(ToString::to_string).collect(),
            actual: log
                .iter()
                .map(|invocation| format!("{} {}", invocation.proxy(), invocation))
                .collect(),
        },
    )))
}

pub(crate) fn verify_in_order(
    recorder: &Recorder,
    expectation: &Expectation,
    times: Times,
) -> FakeResult<()> {
    verify_with(recorder, expectation, times, VerificationOrder::InOrder)
}

pub(crate) fn verify_in_any_order(
    recorder: &Recorder,
    expectation: &Expectation,
    times: Times,
) -> FakeResult<()> {
    verify_with(recorder, expectation, times, VerificationOrder::AnyOrder)
}

pub(crate) fn verify_no_other_invocations(
    recorder: &Recorder,
    proxies: &BTreeSet<ProxyId>,
) -> FakeResult<()> {
    let unverified: Vec<Arc<ActualInvocation>> = recorder
        .invocations_of(proxies)
        .into_iter()
        .filter(|invocation| !recorder.is_verified(invocation.seq()))
        .collect();

    match unverified.first() {
        None => Ok(()),
        Some(first) => Err(FakeError::UnexpectedInvocation {
            invocation: first.call(),
            seq: first.seq(),
            remaining: unverified.len(),
        }),
    }
}
