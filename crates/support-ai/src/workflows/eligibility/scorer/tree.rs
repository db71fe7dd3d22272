use crate::workflows::eligibility::features::FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Binary regression tree; rows with `value <= threshold` descend left. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub(crate) fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }
}
