use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tb_buffer::DateTime;
use tb_pipeline::{Emitter, Pipeline};

/// Decides whether a branch whose key was not present in the latest split
/// should be torn down. The default, [`WhenKeyNotPresent`], matches the
/// common case of "the splitter stops emitting a key when its source of
/// data goes away".
pub trait TerminationPolicy<K, V> {
    fn should_terminate(&self, key: &K, present_this_tick: bool, last_seen: DateTime, current_time: DateTime) -> bool;
}

/// Terminates a branch as soon as a tick passes without its key present.
pub struct WhenKeyNotPresent;

impl<K, V> TerminationPolicy<K, V> for WhenKeyNotPresent {
    fn should_terminate(&self, _key: &K, present_this_tick: bool, _last_seen: DateTime, _current_time: DateTime) -> bool {
        !present_this_tick
    }
}

struct Branch<V> {
    pipeline: Arc<Pipeline>,
    emitter: Arc<Emitter<V>>,
    last_seen: DateTime,
    branch_index: usize,
}

/// Dynamically splits one input stream into a variable, key-indexed set of
/// branch subpipelines. Each distinct key gets its own subpipeline and
/// emitter the first time the splitter produces it; `transform` wires up
/// whatever the caller wants to run against that branch's stream. Branches
/// are torn down according to `Term` once their key stops appearing.
///
/// Every time the branch set changes, the current `(key, branch_index)`
/// pairs are posted to `active_branches()` so a downstream `Join` knows
/// which branches to interpolate against without polling.
pub struct ParallelSparseDo<K, V, TIn, Splitter, Transform, Term = WhenKeyNotPresent> {
    parent: Arc<Pipeline>,
    splitter: Splitter,
    transform: Transform,
    term: Term,
    branches: HashMap<K, Branch<V>>,
    next_branch_index: usize,
    active_branches: Arc<Emitter<Vec<(K, usize)>>>,
    _marker: std::marker::PhantomData<TIn>,
}

impl<K, V, TIn, Splitter, Transform, Term> ParallelSparseDo<K, V, TIn, Splitter, Transform, Term>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    Splitter: Fn(&TIn) -> HashMap<K, V>,
    Transform: Fn(&K, &Arc<Emitter<V>>, &Arc<Pipeline>),
    Term: TerminationPolicy<K, V>,
{
    pub fn new(parent: Arc<Pipeline>, splitter: Splitter, transform: Transform, term: Term) -> Self {
        let active_branches = parent.create_emitter::<Vec<(K, usize)>>();
        ParallelSparseDo {
            parent,
            splitter,
            transform,
            term,
            branches: HashMap::new(),
            next_branch_index: 0,
            active_branches,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn active_keys(&self) -> Vec<K> {
        self.branches.keys().cloned().collect()
    }

    /// The streamed notification of the current branch set: a downstream
    /// `Join` subscribes to this instead of polling `active_keys`, and sees
    /// one post each time a branch opens or closes.
    #[must_use]
    pub fn active_branches(&self) -> &Arc<Emitter<Vec<(K, usize)>>> {
        &self.active_branches
    }

    fn post_active_branches(&self, at: DateTime) {
        let pairs: Vec<(K, usize)> = self
            .branches
            .iter()
            .map(|(key, branch)| (key.clone(), branch.branch_index))
            .collect();
        let _ = self.active_branches.post(pairs, at, at);
    }

    /// Processes one input message: creates branches for newly-seen keys,
    /// posts the split value into each present branch, then closes any
    /// branch `Term` decides should terminate.
    pub async fn push(&mut self, input: &TIn, originating_time: DateTime, creation_time: DateTime) {
        let split = (self.splitter)(input);
        let mut branch_set_changed = false;
        for (key, value) in &split {
            let branch = self.branches.entry(key.clone()).or_insert_with(|| {
                let name = format!("{}/branch", self.parent.name());
                let sub = self.parent.create_subpipeline(name);
                let emitter = sub.create_emitter::<V>();
                (self.transform)(key, &emitter, &sub);
                let branch_index = self.next_branch_index;
                self.next_branch_index += 1;
                branch_set_changed = true;
                Branch {
                    pipeline: sub,
                    emitter,
                    last_seen: originating_time,
                    branch_index,
                }
            });
            branch.last_seen = originating_time;
            let _ = branch.emitter.post(value.clone(), originating_time, creation_time);
        }

        let mut terminated = Vec::new();
        for (key, branch) in &self.branches {
            let present = split.contains_key(key);
            if self.term.should_terminate(key, present, branch.last_seen, originating_time) {
                terminated.push(key.clone());
            }
        }
        for key in terminated {
            if let Some(branch) = self.branches.remove(&key) {
                branch.pipeline.stop(originating_time, true).await;
                branch_set_changed = true;
            }
        }

        if branch_set_changed {
            self.post_active_branches(originating_time);
        }
    }

    pub async fn close_all(&mut self, at: DateTime) {
        for (_, branch) in self.branches.drain() {
            branch.pipeline.stop(at, true).await;
        }
        self.post_active_branches(at);
    }
}

/// A fixed-arity parallel split: exactly `N` branches, created up front,
/// each fed from index `i` of every splitter output.
pub struct FixedParallelDo<V, const N: usize> {
    branches: [(Arc<Pipeline>, Arc<Emitter<V>>); N],
}

impl<V: Clone + Send + Sync + 'static, const N: usize> FixedParallelDo<V, N> {
    pub fn new(parent: &Arc<Pipeline>, transform: impl Fn(usize, &Arc<Emitter<V>>, &Arc<Pipeline>)) -> Self {
        let branches = std::array::from_fn(|i| {
            let sub = parent.create_subpipeline(format!("{}/branch{i}", parent.name()));
            let emitter = sub.create_emitter::<V>();
            transform(i, &emitter, &sub);
            (sub, emitter)
        });
        FixedParallelDo { branches }
    }

    pub fn push(&self, values: [V; N], originating_time: DateTime, creation_time: DateTime) {
        for (value, (_, emitter)) in values.into_iter().zip(self.branches.iter()) {
            let _ = emitter.post(value, originating_time, creation_time);
        }
    }

    pub async fn close_all(&self, at: DateTime) {
        for (pipeline, _) in &self.branches {
            pipeline.stop(at, true).await;
        }
    }
}
