//! Query plan evaluation
//!
//! A [`QueryPlan`] is realized as one pipeline of set-algebra commands:
//!
//! 1. every multi-term synonym group is unioned into a result set
//!    (single-term groups use the term's posting set directly)
//! 2. the per-group operands are intersected into one result set
//! 3. if anything is excluded, the excluded terms' posting sets are
//!    subtracted from it
//!
//! Every result set, intermediate or final, carries the same TTL and is
//! left to expire on its own; nothing is deleted explicitly, including on
//! failure. A plan with no groups matches nothing and never touches the
//! store.

use std::time::Duration;

use sift_core::{Pipeline, ResultSetId, SetOp, SetStore};
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult, Stage};
use crate::query::QueryPlan;
use crate::setops::queue_set_op;

/// Outcome of evaluating a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The plan had nothing to include; no store call was made
    NoMatches,
    /// Identifier of the final, TTL-bound result set
    ResultSet(ResultSetId),
}

impl QueryOutcome {
    /// The final result set, if one was produced
    pub fn result_set(&self) -> Option<&ResultSetId> {
        match self {
            QueryOutcome::ResultSet(id) => Some(id),
            QueryOutcome::NoMatches => None,
        }
    }

    /// True for `NoMatches`
    pub fn is_no_matches(&self) -> bool {
        matches!(self, QueryOutcome::NoMatches)
    }
}

/// Operand of the intersection step
#[derive(Debug)]
enum Operand<'a> {
    Term(&'a str),
    ResultSet(ResultSetId),
}

impl Operand<'_> {
    fn name(&self) -> &str {
        match self {
            Operand::Term(term) => term,
            Operand::ResultSet(id) => id.as_str(),
        }
    }
}

/// Pipeline under construction, remembering which stage queued each command
struct StagedPipeline {
    pipeline: Pipeline,
    stages: Vec<Stage>,
    ttl: Duration,
}

impl StagedPipeline {
    fn new(ttl: Duration) -> Self {
        StagedPipeline {
            pipeline: Pipeline::new(),
            stages: Vec::new(),
            ttl,
        }
    }

    fn queue<N: AsRef<str>>(&mut self, stage: Stage, op: SetOp, names: &[N]) -> ResultSetId {
        let id = queue_set_op(&mut self.pipeline, op, names, self.ttl);
        self.stages.resize(self.pipeline.len(), stage);
        id
    }

    /// Submit the batch, attributing a rejected command to its stage
    fn submit<S>(self, store: &S) -> SearchResult<usize>
    where
        S: SetStore + ?Sized,
    {
        let StagedPipeline {
            pipeline, stages, ..
        } = self;
        let commands = pipeline.len();
        store.execute(pipeline).map_err(|source| {
            let stage = source
                .command_index()
                .and_then(|index| stages.get(index).copied())
                .unwrap_or(Stage::Pipeline);
            warn!(target: "sift::eval", stage = %stage, error = %source, "Evaluation failed");
            SearchError::EvaluationFailure { stage, source }
        })?;
        Ok(commands)
    }
}

/// Evaluate a plan against the index
///
/// The returned result set lives for `ttl`; extend it with
/// [`extend_ttl`](crate::setops::extend_ttl) if it is needed longer.
///
/// # Errors
///
/// Returns `SearchError::EvaluationFailure` naming the stage whose command
/// the store rejected (or `Stage::Pipeline` if the batch failed as a whole).
/// Intermediate result sets already created are abandoned to their TTL.
pub fn evaluate<S>(store: &S, plan: &QueryPlan, ttl: Duration) -> SearchResult<QueryOutcome>
where
    S: SetStore + ?Sized,
{
    if plan.is_empty() {
        debug!(
            target: "sift::eval",
            excluded = plan.excluded().len(),
            "Plan has no include groups, skipping store"
        );
        return Ok(QueryOutcome::NoMatches);
    }

    let mut staged = StagedPipeline::new(ttl);

    let mut operands = Vec::with_capacity(plan.groups().len());
    for (index, group) in plan.groups().iter().enumerate() {
        let terms = group.sorted_terms();
        match terms.as_slice() {
            [term] => operands.push(Operand::Term(*term)),
            _ => {
                let id = staged.queue(Stage::GroupUnion { group: index }, SetOp::Union, &terms);
                operands.push(Operand::ResultSet(id));
            }
        }
    }

    // A lone union result is already a fresh result set; anything else
    // (including a lone posting set) is materialized by the intersection.
    let combined = match operands.as_slice() {
        [Operand::ResultSet(id)] => id.clone(),
        _ => {
            let names: Vec<&str> = operands.iter().map(Operand::name).collect();
            staged.queue(Stage::Intersect, SetOp::Intersect, &names)
        }
    };

    let result = if plan.excluded().is_empty() {
        combined
    } else {
        let mut excluded: Vec<&str> = plan.excluded().iter().map(String::as_str).collect();
        excluded.sort_unstable();
        let mut names = Vec::with_capacity(excluded.len() + 1);
        names.push(combined.as_str());
        names.extend(excluded);
        staged.queue(Stage::Exclude, SetOp::Difference, &names)
    };

    let commands = staged.submit(store)?;

    debug!(
        target: "sift::eval",
        groups = plan.groups().len(),
        excluded = plan.excluded().len(),
        commands,
        result = %result,
        "Plan evaluated"
    );
    Ok(QueryOutcome::ResultSet(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::index_document;
    use crate::query::{parse, SynonymGroup};
    use crate::setops::DEFAULT_RESULT_TTL;
    use sift_core::{Command, Error, Reply, SetKey};
    use sift_storage::MemoryStore;
    use std::collections::HashSet;
    use std::thread;

    /// Rejects the first set operation of a given kind, like a store
    /// refusing one command of a batch
    struct RejectingStore {
        inner: MemoryStore,
        reject: SetOp,
    }

    impl SetStore for RejectingStore {
        fn execute(&self, pipeline: Pipeline) -> sift_core::Result<Vec<Reply>> {
            let position = pipeline.commands().iter().position(
                |c| matches!(c, Command::StoreSetOp { op, .. } if *op == self.reject),
            );
            match position {
                Some(index) => Err(Error::CommandFailed {
                    index,
                    reason: "rejected".to_string(),
                }),
                None => self.inner.execute(pipeline),
            }
        }

        fn members(&self, key: &SetKey) -> sift_core::Result<HashSet<String>> {
            self.inner.members(key)
        }

        fn exists(&self, key: &SetKey) -> sift_core::Result<bool> {
            self.inner.exists(key)
        }

        fn ttl(&self, key: &SetKey) -> sift_core::Result<Option<Duration>> {
            self.inner.ttl(key)
        }
    }

    fn corpus() -> MemoryStore {
        let store = MemoryStore::new();
        index_document(&store, "doc1", "alpha beta gamma").unwrap();
        index_document(&store, "doc2", "alpha delta").unwrap();
        index_document(&store, "doc3", "beta delta proxy").unwrap();
        store
    }

    fn results(store: &MemoryStore, outcome: &QueryOutcome) -> HashSet<String> {
        let id = outcome.result_set().expect("expected a result set");
        store.members(&id.key()).unwrap()
    }

    fn docs(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn search(store: &MemoryStore, query: &str) -> QueryOutcome {
        evaluate(store, &parse(query), DEFAULT_RESULT_TTL).unwrap()
    }

    #[test]
    fn test_intersection_of_groups() {
        let store = corpus();
        assert_eq!(results(&store, &search(&store, "alpha beta")), docs(&["doc1"]));
    }

    #[test]
    fn test_missing_term_gives_empty_result() {
        let store = corpus();
        let outcome = search(&store, "alpha nonexistent");
        assert!(results(&store, &outcome).is_empty());
    }

    #[test]
    fn test_synonym_group_unions() {
        let store = corpus();
        let outcome = search(&store, "gamma +delta");
        assert_eq!(results(&store, &outcome), docs(&["doc1", "doc2", "doc3"]));
    }

    #[test]
    fn test_synonyms_then_intersection_then_exclusion() {
        let store = corpus();
        let outcome = search(&store, "gamma +delta beta -proxy");
        assert_eq!(results(&store, &outcome), docs(&["doc1"]));
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let store = corpus();
        let outcome = search(&store, "alpha -alpha");
        assert!(results(&store, &outcome).is_empty());
    }

    #[test]
    fn test_single_term_query_returns_fresh_result_set() {
        let store = corpus();
        let outcome = search(&store, "alpha");
        let id = outcome.result_set().unwrap();
        assert_ne!(id.key(), SetKey::for_name("alpha"));
        assert!(store.ttl(&id.key()).unwrap().is_some());
        assert_eq!(results(&store, &outcome), docs(&["doc1", "doc2"]));
        // The posting set itself stays persistent
        assert_eq!(store.ttl(&SetKey::for_name("alpha")).unwrap(), None);
    }

    #[test]
    fn test_empty_plan_never_contacts_store() {
        let store = corpus();
        let before = store.commands_executed();
        assert!(search(&store, "-proxy -alpha").is_no_matches());
        assert!(search(&store, "").is_no_matches());
        assert!(search(&store, "the and of").is_no_matches());
        assert_eq!(store.commands_executed(), before);

        // Not even a closed store is an error
        store.close();
        assert!(search(&store, "-proxy").is_no_matches());
    }

    #[test]
    fn test_every_result_set_expires() {
        let store = corpus();
        let ttl = Duration::from_millis(200);
        let outcome = evaluate(&store, &parse("alpha +gamma delta +beta -proxy"), ttl).unwrap();
        let id = outcome.result_set().unwrap().clone();
        assert!(store.exists(&id.key()).unwrap());

        thread::sleep(Duration::from_millis(50));
        assert!(store.exists(&id.key()).unwrap(), "expired before its ttl");

        thread::sleep(Duration::from_millis(250));
        assert!(!store.exists(&id.key()).unwrap());
        // Intermediates are gone too: only posting sets remain
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_failure_names_group_union_stage() {
        let store = RejectingStore {
            inner: corpus(),
            reject: SetOp::Union,
        };
        let err = evaluate(&store, &parse("alpha beta +gamma"), DEFAULT_RESULT_TTL).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::GroupUnion { group: 1 }));
    }

    #[test]
    fn test_failure_names_intersect_stage() {
        let store = RejectingStore {
            inner: corpus(),
            reject: SetOp::Intersect,
        };
        let err = evaluate(&store, &parse("alpha beta"), DEFAULT_RESULT_TTL).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Intersect));
    }

    #[test]
    fn test_failure_names_exclude_stage() {
        let store = RejectingStore {
            inner: corpus(),
            reject: SetOp::Difference,
        };
        let err = evaluate(&store, &parse("alpha -beta"), DEFAULT_RESULT_TTL).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Exclude));
        // Nothing from the rejected batch was applied
        assert_eq!(store.inner.len(), 5);
    }

    #[test]
    fn test_unavailable_store_is_pipeline_stage() {
        let store = corpus();
        store.close();
        let err = evaluate(&store, &parse("alpha"), DEFAULT_RESULT_TTL).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Pipeline));
    }

    #[test]
    fn test_plan_built_by_hand() {
        let store = corpus();
        let plan = QueryPlan::new(
            vec![
                ["alpha", "beta"].into_iter().collect::<SynonymGroup>(),
                ["delta"].into_iter().collect::<SynonymGroup>(),
            ],
            HashSet::new(),
        );
        let outcome = evaluate(&store, &plan, DEFAULT_RESULT_TTL).unwrap();
        assert_eq!(results(&store, &outcome), docs(&["doc2", "doc3"]));
    }
}
