//! Scoring with a trained FunkSVD model.

use super::funksvd::FunkSvdModel;
use super::update::{ErrorAccumulator, FunkSvdUpdateRule};
use crate::baseline::BiasModel;
use crate::primitives::{dot, MatrixRead};
use crate::sparse::{MutableSparseVector, SparseRead, SparseVector};
use crate::stopping::CancellationToken;
use crate::traits::ItemScorer;
use std::sync::Arc;
use tracing::{trace, warn};

/// Item scorer over a [`FunkSvdModel`].
///
/// A score is the bias prediction plus each feature's contribution in turn,
/// clamped into the model's domain after every feature. With an update rule
/// attached, [`FunkSvdScorer::score_with_history`] can fold a user's fresh
/// ratings into their factor vector before scoring. Fold-in runs the rule's
/// stopping condition per feature; a [`CancellationToken`] or a per-feature
/// iteration limit bounds it for conditions that may never converge.
///
/// # Examples
///
/// ```
/// use mfkit::baseline::BiasTerms;
/// use mfkit::data::RatingSnapshot;
/// use mfkit::mf::{FunkSvdConfig, FunkSvdScorer};
/// use mfkit::sparse::SparseRead;
/// use mfkit::stopping::StopPolicy;
/// use mfkit::traits::ItemScorer;
/// use std::sync::Arc;
///
/// let snapshot = RatingSnapshot::from_ratings([(1_i64, 1_i64, 5.0), (2, 1, 3.0)]);
/// let trainer = FunkSvdConfig::default()
///     .with_feature_count(2)
///     .with_stopping(StopPolicy::Iterations { count: 5 })
///     .trainer()
///     .expect("valid config");
/// let baseline = Arc::new(BiasTerms::new(4.0));
/// let model = trainer.train(&snapshot, baseline.as_ref()).expect("trained");
///
/// let scorer = FunkSvdScorer::new(Arc::new(model), baseline);
/// assert_eq!(scorer.score(1, &[1, 99]).len(), 1);
/// assert!(scorer.score(42, &[1]).is_empty());
/// ```
#[derive(Clone)]
pub struct FunkSvdScorer {
    model: Arc<FunkSvdModel>,
    baseline: Arc<dyn BiasModel>,
    rule: Option<FunkSvdUpdateRule>,
    cancellation: Option<CancellationToken>,
    fold_in_limit: Option<usize>,
}

impl std::fmt::Debug for FunkSvdScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunkSvdScorer")
            .field("model", &self.model)
            .field("rule", &self.rule)
            .field("cancellation", &self.cancellation)
            .field("fold_in_limit", &self.fold_in_limit)
            .finish_non_exhaustive()
    }
}

impl FunkSvdScorer {
    /// Scorer without history fold-in.
    #[must_use]
    pub fn new(model: Arc<FunkSvdModel>, baseline: Arc<dyn BiasModel>) -> Self {
        Self {
            model,
            baseline,
            rule: None,
            cancellation: None,
            fold_in_limit: None,
        }
    }

    /// Enables fold-in of rating history using `rule`.
    #[must_use]
    pub fn with_update_rule(mut self, rule: FunkSvdUpdateRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Stops folding in history once `token` trips; scoring then uses the
    /// features folded in so far.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Caps fold-in at `limit` iterations per feature, whatever the
    /// stopping condition says.
    #[must_use]
    pub fn with_fold_in_limit(mut self, limit: usize) -> Self {
        self.fold_in_limit = Some(limit);
        self
    }

    /// The model being scored.
    #[must_use]
    pub fn model(&self) -> &FunkSvdModel {
        &self.model
    }

    /// Returns true if rating history can be folded in.
    #[must_use]
    pub fn can_use_history(&self) -> bool {
        self.rule.is_some()
    }

    /// Scores `items` for `user` after folding in `history` (item id to
    /// rating).
    ///
    /// Known users start from their trained vector, unknown users from the
    /// per-feature user averages. Each feature of the user vector is then
    /// retrained against the history with item factors held fixed. History
    /// entries for items the model has not seen, and NaN or infinite
    /// ratings, are ignored. An unknown
    /// user with empty history gets an empty result.
    #[must_use]
    pub fn score_with_history(
        &self,
        user: i64,
        history: &SparseVector,
        items: &[i64],
    ) -> SparseVector {
        let mf = self.model.mf();
        let mut uprefs = match mf.user_slice(user) {
            Some(row) => row.to_vec(),
            None if history.is_empty() => return SparseVector::empty(),
            None => self.model.user_averages(),
        };
        if let Some(rule) = &self.rule {
            self.fold_in(rule, user, history, &mut uprefs);
        }
        self.predict(user, &uprefs, items)
    }

    fn fold_in(
        &self,
        rule: &FunkSvdUpdateRule,
        user: i64,
        history: &SparseVector,
        uprefs: &mut [f64],
    ) {
        let mf = self.model.mf();
        let rated: Vec<(&[f64], f64, f64)> = history
            .iter()
            .filter(|&(_, rating)| rating.is_finite())
            .filter_map(|(item, rating)| {
                let ivec = mf.item_slice(item)?;
                let estimate = rule.clamp(self.baseline.prediction(user, item));
                Some((ivec, rating, estimate))
            })
            .collect();
        if rated.is_empty() {
            return;
        }
        let mut estimates: Vec<f64> = rated.iter().map(|&(_, _, e)| e).collect();
        let k = uprefs.len();

        for f in 0..k {
            let mut controller = rule.new_loop();
            let mut rmse = f64::MAX;
            loop {
                if self.fold_in_cancelled() {
                    warn!(
                        user,
                        feature = f,
                        iterations = controller.iteration_count(),
                        "fold-in cancelled"
                    );
                    return;
                }
                if self
                    .fold_in_limit
                    .is_some_and(|limit| controller.iteration_count() >= limit)
                    || !controller.keep_training(rmse)
                {
                    break;
                }
                let mut errors = ErrorAccumulator::new();
                for (j, &(ivec, rating, _)) in rated.iter().enumerate() {
                    let trail = dot(&uprefs[f + 1..], &ivec[f + 1..]);
                    let ouf = uprefs[f];
                    let err = rule.compute_error(rating, estimates[j], trail, ouf, ivec[f]);
                    uprefs[f] += rule.user_update(err, ouf, ivec[f]);
                    errors.add(err);
                }
                rmse = errors.rmse();
            }
            trace!(
                user,
                feature = f,
                iterations = controller.iteration_count(),
                rmse,
                "folded in user feature"
            );
            for (j, &(ivec, _, _)) in rated.iter().enumerate() {
                estimates[j] = rule.clamp(estimates[j] + uprefs[f] * ivec[f]);
            }
        }
    }

    fn fold_in_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn predict(&self, user: i64, uprefs: &[f64], items: &[i64]) -> SparseVector {
        let mf = self.model.mf();
        let k = mf.feature_count().min(uprefs.len());
        let mut out = MutableSparseVector::new();
        for &item in items {
            let Some(ivec) = mf.item_slice(item) else {
                continue;
            };
            let mut score = self.baseline.prediction(user, item);
            for f in 0..k {
                score = self.model.clamp(score + uprefs[f] * ivec[f]);
            }
            out.set(item, score);
        }
        out.freeze()
    }
}

impl ItemScorer for FunkSvdScorer {
    /// Scores `items` for a user the model knows; an unknown user gets an
    /// empty result.
    fn score(&self, user: i64, items: &[i64]) -> SparseVector {
        match self.model.mf().user_slice(user) {
            Some(row) => self.predict(user, row, items),
            None => SparseVector::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BiasTerms;
    use crate::data::PreferenceDomain;
    use crate::index::KeyIndex;
    use crate::mf::{FeatureInfo, MfModel};
    use crate::primitives::ImmutableMatrix;
    use crate::stopping::IterationCountStoppingCondition;

    // users 1, 2; items 10, 20, 30; two features
    fn model(domain: Option<PreferenceDomain>) -> Arc<FunkSvdModel> {
        let users = ImmutableMatrix::from_vec(2, 2, vec![1.0, 0.5, -1.0, 0.0]).expect("2x2");
        let items = ImmutableMatrix::from_vec(3, 2, vec![1.0, 2.0, 0.5, 0.0, 2.0, 2.0])
            .expect("3x2");
        let mf = MfModel::new(
            users,
            items,
            KeyIndex::from_ids([1, 2]),
            KeyIndex::from_ids([10, 20, 30]),
        )
        .expect("consistent");
        let features = (0..2)
            .map(|f| {
                let mut b = FeatureInfo::builder(f);
                b.averages(0.25, 1.0);
                b.build()
            })
            .collect();
        Arc::new(FunkSvdModel::new(mf, features, domain).expect("two summaries"))
    }

    fn scorer(domain: Option<PreferenceDomain>) -> FunkSvdScorer {
        FunkSvdScorer::new(model(domain), Arc::new(BiasTerms::new(3.0)))
    }

    #[test]
    fn test_score_is_bias_plus_dot() {
        let s = scorer(None);
        let out = s.score(1, &[10, 20]);
        assert!((out.get(10) - 5.0).abs() < 1e-12);
        assert!((out.get(20) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_items_omitted() {
        let out = scorer(None).score(1, &[10, 999]);
        assert_eq!(out.keys(), &[10]);
    }

    #[test]
    fn test_cold_start_user_gets_empty_map() {
        let s = scorer(None);
        assert!(s.score(404, &[10, 20, 30]).is_empty());
        assert!(s.score_one(404, 10).is_none());
        assert!(s.recommend(404, &[10, 20], 5).is_empty());
    }

    #[test]
    fn test_clamps_after_each_feature() {
        let domain = PreferenceDomain::new(1.0, 5.0).expect("valid");
        let s = scorer(Some(domain));
        // 3 + 2 = 5, then 5 + 1 = 6 clamps to 5
        assert_eq!(s.score(1, &[30]).get(30), 5.0);
        // 3 - 2 = 1, then + 0 stays at 1
        assert_eq!(s.score(2, &[30]).get(30), 1.0);
    }

    #[test]
    fn test_recommend_orders_by_score() {
        let s = scorer(None);
        let top = s.recommend(1, &[10, 20, 30, 999], 2);
        assert_eq!(top.iter().map(|p| p.0).collect::<Vec<_>>(), vec![30, 10]);
    }

    #[test]
    fn test_history_without_rule_uses_model_vector() {
        let s = scorer(None);
        let history = SparseVector::from_pairs([(10, 1.0)]);
        assert_eq!(s.score_with_history(1, &history, &[10]), s.score(1, &[10]));
    }

    #[test]
    fn test_unknown_user_without_history_is_empty() {
        let s = scorer(None);
        assert!(s
            .score_with_history(404, &SparseVector::empty(), &[10])
            .is_empty());
    }

    #[test]
    fn test_unknown_user_starts_from_averages() {
        let s = scorer(None);
        let history = SparseVector::from_pairs([(999, 4.0)]);
        let out = s.score_with_history(404, &history, &[10]);
        // averages (0.25, 0.25) against item 10 (1, 2)
        assert!((out.get(10) - 3.75).abs() < 1e-12);
    }

    #[test]
    fn test_fold_in_moves_toward_history() {
        let stop = IterationCountStoppingCondition::new(200).expect("positive");
        let rule = FunkSvdUpdateRule::new(0.05, 0.0, stop).expect("valid");
        let s = scorer(None).with_update_rule(rule);
        assert!(s.can_use_history());

        let before = s.score(2, &[10]).get(10);
        let history = SparseVector::from_pairs([(10, 5.0)]);
        let after = s.score_with_history(2, &history, &[10]).get(10);
        assert!((after - 5.0).abs() < (before - 5.0).abs());
        assert!((after - 5.0).abs() < 0.1);
    }

    fn unbounded_rule() -> FunkSvdUpdateRule {
        let stop = IterationCountStoppingCondition::new(usize::MAX).expect("positive");
        FunkSvdUpdateRule::new(0.05, 0.0, stop).expect("valid")
    }

    #[test]
    fn test_cancelled_fold_in_keeps_model_vector() {
        let token = CancellationToken::new();
        token.cancel();
        let s = scorer(None)
            .with_update_rule(unbounded_rule())
            .with_cancellation(token);
        let history = SparseVector::from_pairs([(10, 5.0)]);
        assert_eq!(s.score_with_history(2, &history, &[10]), s.score(2, &[10]));
    }

    #[test]
    fn test_fold_in_limit_bounds_iterations() {
        let limited = scorer(None)
            .with_update_rule(unbounded_rule())
            .with_fold_in_limit(200);
        let stop = IterationCountStoppingCondition::new(200).expect("positive");
        let counted =
            scorer(None).with_update_rule(FunkSvdUpdateRule::new(0.05, 0.0, stop).expect("valid"));
        let history = SparseVector::from_pairs([(10, 5.0)]);
        assert_eq!(
            limited.score_with_history(2, &history, &[10]),
            counted.score_with_history(2, &history, &[10])
        );
    }

    #[test]
    fn test_non_finite_history_is_ignored() {
        let stop = IterationCountStoppingCondition::new(50).expect("positive");
        let rule = FunkSvdUpdateRule::new(0.05, 0.0, stop).expect("valid");
        let s = scorer(None).with_update_rule(rule);
        let history = SparseVector::from_pairs([(10, f64::NAN), (20, f64::INFINITY)]);
        let out = s.score_with_history(1, &history, &[10, 20]);
        assert_eq!(out, s.score(1, &[10, 20]));
        assert!(out.values().iter().all(|v| v.is_finite()));
    }
}
