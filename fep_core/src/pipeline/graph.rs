//! Stage dependency graph.

use std::collections::{BTreeMap, BTreeSet};

use super::{ParamGroup, Stage};
use crate::errors::{JointError, JointResult};

/// Declared dependencies between build stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageGraph {
    deps: BTreeMap<Stage, Vec<Stage>>,
}

impl Default for StageGraph {
    fn default() -> Self {
        StageGraph::standard()
    }
}

impl StageGraph {
    /// Graph from explicit `(stage, depends_on)` entries.
    pub fn new(entries: impl IntoIterator<Item = (Stage, Vec<Stage>)>) -> Self {
        StageGraph {
            deps: entries.into_iter().collect(),
        }
    }

    /// Dependencies of the joint model build.
    pub fn standard() -> Self {
        use Stage::*;
        StageGraph::new([
            (Materials, vec![]),
            (Parts, vec![]),
            (Partitions, vec![Parts]),
            (Holes, vec![Partitions]),
            (Sections, vec![Materials]),
            (SectionAssignment, vec![Sections, Holes]),
            (Assembly, vec![Holes]),
            (Interactions, vec![Assembly]),
            (ReferencePoints, vec![Assembly]),
            (RigidBodies, vec![ReferencePoints]),
            (Mesh, vec![Holes]),
            (Step, vec![]),
            (Amplitudes, vec![]),
            (Loads, vec![Step, Amplitudes, RigidBodies]),
            (Job, vec![SectionAssignment, Interactions, Mesh, Loads]),
        ])
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.deps.keys().copied()
    }

    pub fn dependencies(&self, stage: Stage) -> &[Stage] {
        self.deps.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Stages in dependency order; ties resolve in declaration order of
    /// [`Stage`], so the result is deterministic.
    ///
    /// # Errors
    ///
    /// `Pipeline` on a dependency cycle or a dependency that is not in the graph.
    pub fn topological_order(&self) -> JointResult<Vec<Stage>> {
        let mut remaining: BTreeMap<Stage, usize> = BTreeMap::new();
        for (&stage, deps) in &self.deps {
            for dep in deps {
                if !self.deps.contains_key(dep) {
                    return Err(JointError::Pipeline {
                        reason: format!("Stage '{}' depends on unknown stage '{}'", stage, dep),
                    });
                }
            }
            remaining.insert(stage, deps.len());
        }

        let mut ready: BTreeSet<Stage> = remaining
            .iter()
            .filter(|(_, &n)| n == 0)
            .map(|(&s, _)| s)
            .collect();
        let mut order = Vec::with_capacity(self.deps.len());

        while let Some(stage) = ready.pop_first() {
            order.push(stage);
            for (&other, deps) in &self.deps {
                if deps.contains(&stage) {
                    if let Some(n) = remaining.get_mut(&other) {
                        *n -= 1;
                        if *n == 0 {
                            ready.insert(other);
                        }
                    }
                }
            }
        }

        if order.len() != self.deps.len() {
            let stuck: Vec<String> = self
                .deps
                .keys()
                .filter(|s| !order.contains(s))
                .map(|s| s.to_string())
                .collect();
            return Err(JointError::Pipeline {
                reason: format!("Dependency cycle among stages: {}", stuck.join(", ")),
            });
        }
        Ok(order)
    }

    /// The given stages plus every stage that depends on them, transitively,
    /// in execution order.
    pub fn downstream_of(&self, stages: &[Stage]) -> JointResult<Vec<Stage>> {
        let mut affected: BTreeSet<Stage> = stages.iter().copied().collect();
        let order = self.topological_order()?;
        for stage in &order {
            if self.dependencies(*stage).iter().any(|d| affected.contains(d)) {
                affected.insert(*stage);
            }
        }
        Ok(order.into_iter().filter(|s| affected.contains(s)).collect())
    }

    /// Stages to re-run after a change to one parameter group.
    pub fn stages_for_change(&self, group: ParamGroup) -> JointResult<Vec<Stage>> {
        self.downstream_of(group.direct_stages())
    }
}
