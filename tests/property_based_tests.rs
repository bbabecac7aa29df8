mod common;

use common::{test_config, MockScheduler};
use proptest::prelude::*;
use sim_batch::models::{CollectedIdentifiers, JobIdentifier};
use sim_batch::orchestration::{DependencyGraphBuilder, Orchestrator};
use std::sync::Arc;

fn job_id_strategy() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,8}"
}

proptest! {
    /// Property: the dependency lists identifiers in collection order
    #[test]
    fn dependency_preserves_collection_order(ids in prop::collection::vec(job_id_strategy(), 0..40)) {
        let collected: CollectedIdentifiers = ids.iter().map(|id| JobIdentifier::new(id.as_str())).collect();
        let expression = DependencyGraphBuilder::build(&collected);

        prop_assert_eq!(expression.to_string(), format!("afterok:{}", ids.join(":")));
        prop_assert_eq!(expression.is_degenerate(), ids.is_empty());
        prop_assert_eq!(expression.identifiers().len(), ids.len());
    }

    /// Property: only accepted batches appear in the merge dependency, in index order
    #[test]
    fn merge_depends_on_exactly_the_accepted_batches(accepted in prop::collection::vec(any::<bool>(), 0..12)) {
        let root = tempfile::tempdir().unwrap();
        let mut scheduler = MockScheduler::new();
        let mut expected = Vec::new();
        for (index, ok) in accepted.iter().enumerate() {
            let id = 1000 + index as u64;
            scheduler = if *ok {
                expected.push(id.to_string());
                scheduler.accept(id)
            } else {
                scheduler.reject("sbatch: error: QOSMaxSubmitJobPerUserLimit")
            };
        }
        let scheduler = Arc::new(scheduler.accept(1));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let summary = runtime.block_on(async {
            let config = test_config(root.path(), "prop", accepted.len());
            let mut orchestrator = Orchestrator::new(config, scheduler.clone()).unwrap();
            orchestrator.run().await.unwrap()
        });

        prop_assert_eq!(summary.dependency.to_string(), format!("afterok:{}", expected.join(":")));
        prop_assert_eq!(summary.submitted(), expected.len());
        prop_assert_eq!(scheduler.calls().len(), accepted.len() + 1);
    }
}
