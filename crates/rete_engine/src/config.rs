//! Network configuration.

/// How a join decides whether a new fact correlates with a token.
///
/// A token fact `t` correlates with a new fact `f` when they share an
/// entity id, when `t`'s bound value names `f`'s id, or when `f`'s bound
/// value names `t`'s id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Every fact already in the token must correlate with the new fact.
    #[default]
    Every,
    /// At least one fact in the token must correlate with the new fact.
    ///
    /// Needed for rules that walk a chain (`x -> y -> z`), where the last
    /// fact correlates with its neighbour but not with the first fact.
    Any,
}

/// Configuration for a [`Rete`](crate::Rete) network.
#[derive(Clone, Debug)]
pub struct ReteConfig {
    /// Join correlation rule.
    pub join_policy: JoinPolicy,
    /// Maximum fire cycles [`Rete::run`](crate::Rete::run) performs before
    /// giving up (kill switch).
    pub max_fire_cycles: usize,
    /// Whether productions added after facts already exist are matched
    /// against those facts.
    pub prime_new_productions: bool,
}

impl Default for ReteConfig {
    fn default() -> Self {
        Self {
            join_policy: JoinPolicy::Every,
            max_fire_cycles: 1000,
            prime_new_productions: true,
        }
    }
}

impl ReteConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for chained rules: joins accept a fact correlating with any
    /// token fact.
    #[must_use]
    pub fn chained() -> Self {
        Self::default().with_join_policy(JoinPolicy::Any)
    }

    /// Builder method to set the join policy.
    #[must_use]
    pub fn with_join_policy(mut self, policy: JoinPolicy) -> Self {
        self.join_policy = policy;
        self
    }

    /// Builder method to set the fire-cycle limit.
    #[must_use]
    pub fn with_max_fire_cycles(mut self, limit: usize) -> Self {
        self.max_fire_cycles = limit;
        self
    }

    /// Builder method to stop matching new productions against existing
    /// facts. Such productions only see facts added afterwards.
    #[must_use]
    pub fn without_priming(mut self) -> Self {
        self.prime_new_productions = false;
        self
    }
}
