//! Immutable node arena and tree traversal.

use guardian_telemetry::NUM_FEATURES;

use crate::error::{DetectError, DetectResult};
use crate::model::{ModelData, NO_CHILD, dequantize};

/// Traversal depth at which a path is abandoned and reported as truncated.
pub const MAX_TRAVERSAL_DEPTH: usize = 1024;

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f32 = 0.577_215_7;

/// Average path length of an unsuccessful search in a binary search tree of
/// `n` points.
///
/// `2·(ln(n−1) + γ) − 2·(n−1)/n` for `n > 1`, else `0`.
#[must_use]
pub fn average_path_length(n: f32) -> f32 {
    if n <= 1.0 {
        return 0.0;
    }
    2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
}

/// One node of the flattened forest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Internal split: go left when `z[feature] <= threshold`.
    Split {
        /// Feature index in model order.
        feature: usize,
        /// Dequantized threshold in standardized units.
        threshold: f32,
        /// Global id of the left child.
        left: usize,
        /// Global id of the right child.
        right: usize,
    },
    /// Terminal node.
    Leaf {
        /// Training samples that reached the leaf, at least 1.
        samples: u32,
    },
}

/// Result of walking one tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLength {
    /// Edges traversed plus the leaf-size correction.
    pub length: f32,
    /// Edges traversed.
    pub depth: usize,
    /// True when the walk hit [`MAX_TRAVERSAL_DEPTH`] before a leaf.
    pub truncated: bool,
}

/// Validated isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    normalization: f32,
}

impl IsolationForest {
    /// Build the arena from validated model data.
    ///
    /// Runs [`ModelData::validate`] first, then checks every root and child
    /// id, the leaf/split shape of each node, split feature indices, and that
    /// no tree reaches a node twice.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn from_model(data: &ModelData) -> DetectResult<Self> {
        data.validate()?;
        let num_nodes = data.num_nodes;

        let mut nodes = Vec::with_capacity(num_nodes);
        let columns = data
            .features_idx
            .iter()
            .zip(&data.thresholds_q15)
            .zip(data.children_left.iter().zip(&data.children_right))
            .zip(&data.node_samples);
        for (id, (((&feature, &threshold_q), (&left, &right)), &samples)) in
            columns.enumerate()
        {
            nodes.push(build_node(
                id,
                feature,
                dequantize(threshold_q, data.scale_thresholds),
                left,
                right,
                samples,
                num_nodes,
            )?);
        }

        let mut roots = Vec::with_capacity(data.num_trees);
        for (tree, &offset) in data.tree_offsets.iter().enumerate() {
            let root = usize::try_from(offset)
                .ok()
                .filter(|&root| root < num_nodes)
                .ok_or(DetectError::TreeOffsetOutOfBounds {
                    tree,
                    offset: i64::from(offset),
                    num_nodes,
                })?;
            roots.push(root);
        }

        let forest = Self {
            nodes,
            roots,
            normalization: data.c_max_samples,
        };
        forest.check_acyclic()?;
        Ok(forest)
    }

    /// Number of trees.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.roots.len()
    }

    /// Number of nodes across all trees.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Node arena indexed by global id.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Root id of each tree.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Normalization constant `c(max_samples)`.
    #[must_use]
    pub fn normalization(&self) -> f32 {
        self.normalization
    }

    /// Walk one tree for a standardized input.
    ///
    /// Returns `None` if `tree` is out of range.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "depth is bounded by MAX_TRAVERSAL_DEPTH"
    )]
    pub fn path_length(&self, tree: usize, z: &[f32; NUM_FEATURES]) -> Option<PathLength> {
        let mut id = *self.roots.get(tree)?;
        let mut depth = 0usize;
        loop {
            match *self.nodes.get(id)? {
                Node::Leaf { samples } => {
                    return Some(PathLength {
                        length: depth as f32 + average_path_length(samples as f32),
                        depth,
                        truncated: false,
                    });
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if depth >= MAX_TRAVERSAL_DEPTH {
                        return Some(PathLength {
                            length: depth as f32,
                            depth,
                            truncated: true,
                        });
                    }
                    let value = z.get(feature).copied().unwrap_or_default();
                    id = if value <= threshold { left } else { right };
                    depth += 1;
                }
            }
        }
    }

    /// Mean path length over all trees and the number of truncated walks.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "tree counts are far below f32 integer precision"
    )]
    pub fn mean_path_length(&self, z: &[f32; NUM_FEATURES]) -> (f32, usize) {
        let mut sum = 0.0f32;
        let mut truncated = 0usize;
        for tree in 0..self.roots.len() {
            if let Some(path) = self.path_length(tree, z) {
                sum += path.length;
                truncated += usize::from(path.truncated);
            }
        }
        (sum / self.roots.len().max(1) as f32, truncated)
    }

    fn check_acyclic(&self) -> DetectResult<()> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = Vec::new();
        for (tree, &root) in self.roots.iter().enumerate() {
            seen.fill(false);
            stack.clear();
            stack.push(root);
            while let Some(id) = stack.pop() {
                let Some(visited) = seen.get_mut(id) else {
                    continue;
                };
                if *visited {
                    return Err(DetectError::Cycle { tree, node: id });
                }
                *visited = true;
                if let Some(Node::Split { left, right, .. }) = self.nodes.get(id) {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        Ok(())
    }
}

fn build_node(
    id: usize,
    feature: i16,
    threshold: f32,
    left: i32,
    right: i32,
    samples: i32,
    num_nodes: usize,
) -> DetectResult<Node> {
    match (left == NO_CHILD, right == NO_CHILD) {
        (true, true) => Ok(Node::Leaf {
            samples: u32::try_from(samples.max(1)).unwrap_or(1),
        }),
        (true, false) | (false, true) => Err(DetectError::MalformedNode {
            node: id,
            reason: "exactly one child is -1",
        }),
        (false, false) => {
            let feature = usize::try_from(feature)
                .ok()
                .filter(|&f| f < NUM_FEATURES)
                .ok_or(DetectError::FeatureOutOfRange {
                    node: id,
                    feature: i64::from(feature),
                })?;
            if !threshold.is_finite() {
                return Err(DetectError::MalformedNode {
                    node: id,
                    reason: "threshold is not finite",
                });
            }
            Ok(Node::Split {
                feature,
                threshold,
                left: child_id(id, left, num_nodes)?,
                right: child_id(id, right, num_nodes)?,
            })
        }
    }
}

fn child_id(node: usize, child: i32, num_nodes: usize) -> DetectResult<usize> {
    usize::try_from(child)
        .ok()
        .filter(|&c| c < num_nodes)
        .ok_or(DetectError::ChildOutOfBounds {
            node,
            child: i64::from(child),
            num_nodes,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// One split on feature 0 at 0.0 with leaves of 1 and 4 samples.
    fn stump() -> ModelData {
        ModelData {
            num_trees: 1,
            num_features: 5,
            num_nodes: 3,
            features_idx: vec![0, -2, -2],
            thresholds_q15: vec![0, 0, 0],
            children_left: vec![1, NO_CHILD, NO_CHILD],
            children_right: vec![2, NO_CHILD, NO_CHILD],
            node_samples: vec![5, 1, 4],
            tree_offsets: vec![0],
            scaler_mean_q15: vec![0; 5],
            scaler_scale_q15: vec![32767; 5],
            scale_mean: 1.0,
            scale_scale: 1.0,
            scale_thresholds: 1.0,
            model_threshold_q15: None,
            scale_decision_th: None,
            max_samples: 5,
            c_max_samples: average_path_length(5.0),
        }
    }

    #[test]
    fn test_average_path_length_small_n() {
        assert_relative_eq!(average_path_length(0.0), 0.0);
        assert_relative_eq!(average_path_length(1.0), 0.0);
        // c(2) = 2γ − 1
        assert_relative_eq!(average_path_length(2.0), 2.0 * EULER_GAMMA - 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_average_path_length_256() {
        assert_relative_eq!(average_path_length(256.0), 10.244_69, epsilon = 1e-3);
    }

    #[test]
    fn test_stump_traversal() -> DetectResult<()> {
        let forest = IsolationForest::from_model(&stump())?;
        assert_eq!(forest.num_trees(), 1);
        assert_eq!(forest.num_nodes(), 3);

        let left = forest.path_length(0, &[0.0, 9.0, 9.0, 9.0, 9.0]);
        assert_eq!(
            left,
            Some(PathLength {
                length: 1.0,
                depth: 1,
                truncated: false
            })
        );

        let right = forest
            .path_length(0, &[0.1, 0.0, 0.0, 0.0, 0.0])
            .map(|p| p.length)
            .unwrap_or_default();
        assert_relative_eq!(right, 1.0 + average_path_length(4.0), epsilon = 1e-6);
        assert!(forest.path_length(1, &[0.0; 5]).is_none());
        Ok(())
    }

    #[test]
    fn test_non_positive_leaf_samples_treated_as_one() -> DetectResult<()> {
        let mut model = stump();
        model.node_samples = vec![5, 0, -3];
        let forest = IsolationForest::from_model(&model)?;
        assert_eq!(forest.nodes().get(2), Some(&Node::Leaf { samples: 1 }));
        let (mean, truncated) = forest.mean_path_length(&[1.0; 5]);
        assert_relative_eq!(mean, 1.0);
        assert_eq!(truncated, 0);
        Ok(())
    }

    #[test]
    fn test_single_sided_leaf_rejected() {
        let mut model = stump();
        model.children_right = vec![2, 0, NO_CHILD];
        assert!(matches!(
            IsolationForest::from_model(&model),
            Err(DetectError::MalformedNode { node: 1, .. })
        ));
    }

    #[test]
    fn test_child_out_of_bounds_rejected() {
        let mut model = stump();
        model.children_right = vec![7, NO_CHILD, NO_CHILD];
        assert!(matches!(
            IsolationForest::from_model(&model),
            Err(DetectError::ChildOutOfBounds { node: 0, child: 7, .. })
        ));
    }

    #[test]
    fn test_split_feature_range_checked() {
        let mut model = stump();
        model.features_idx = vec![5, -2, -2];
        assert!(matches!(
            IsolationForest::from_model(&model),
            Err(DetectError::FeatureOutOfRange { node: 0, feature: 5 })
        ));
    }

    #[test]
    fn test_root_offset_checked() {
        let mut model = stump();
        model.tree_offsets = vec![3];
        assert!(matches!(
            IsolationForest::from_model(&model),
            Err(DetectError::TreeOffsetOutOfBounds { tree: 0, offset: 3, .. })
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut model = stump();
        // Node 2 becomes a split pointing back at the root.
        model.features_idx = vec![0, -2, 1];
        model.children_left = vec![1, NO_CHILD, 0];
        model.children_right = vec![2, NO_CHILD, 1];
        assert!(matches!(
            IsolationForest::from_model(&model),
            Err(DetectError::Cycle { tree: 0, .. })
        ));
    }

    #[test]
    fn test_deep_chain_is_truncated() -> DetectResult<()> {
        // A right-leaning chain deeper than the traversal cap.
        let splits = MAX_TRAVERSAL_DEPTH + 10;
        let num_nodes = 2 * splits + 1;
        let mut model = stump();
        model.num_nodes = num_nodes;
        model.features_idx = vec![-2; num_nodes];
        model.thresholds_q15 = vec![0; num_nodes];
        model.children_left = vec![NO_CHILD; num_nodes];
        model.children_right = vec![NO_CHILD; num_nodes];
        model.node_samples = vec![1; num_nodes];
        for k in 0..splits {
            let split = 2 * k;
            if let Some(f) = model.features_idx.get_mut(split) {
                *f = 0;
            }
            if let Some(l) = model.children_left.get_mut(split) {
                *l = i32::try_from(split + 1).unwrap_or(NO_CHILD);
            }
            if let Some(r) = model.children_right.get_mut(split) {
                *r = i32::try_from(split + 2).unwrap_or(NO_CHILD);
            }
        }

        let forest = IsolationForest::from_model(&model)?;
        let path = forest.path_length(0, &[1.0; 5]);
        assert_eq!(
            path.map(|p| (p.depth, p.truncated)),
            Some((MAX_TRAVERSAL_DEPTH, true))
        );
        let (_, truncated) = forest.mean_path_length(&[1.0; 5]);
        assert_eq!(truncated, 1);
        Ok(())
    }
}
