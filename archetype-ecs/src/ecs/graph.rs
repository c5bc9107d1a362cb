// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Dependency ordering
//!
//! Kahn's algorithm over dense node indices, shared by the system scheduler
//! and the plugin registry. Ready nodes leave a FIFO queue seeded with the
//! roots in index order; a node freed later joins the back of the queue even
//! if its index is lower. The same graph always yields the same order.

use std::collections::VecDeque;

/// Order nodes `0..node_count` so that every edge `(from, to)` has `from`
/// before `to`
///
/// On a cycle, returns the nodes that could not be ordered, ascending.
pub(crate) fn topological_order(
    node_count: usize,
    edges: &[(usize, usize)],
) -> Result<Vec<usize>, Vec<usize>> {
    let mut in_degree = vec![0usize; node_count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| in_degree[n] == 0).collect();
    let mut sorted = Vec::with_capacity(node_count);

    while let Some(node) = queue.pop_front() {
        sorted.push(node);
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if sorted.len() == node_count {
        Ok(sorted)
    } else {
        Err((0..node_count).filter(|&n| in_degree[n] > 0).collect())
    }
}
