// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{Graph, RouteError};

/// Result of a successful [find_route] call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Route {
    /// Names of all visited locations, starting with the start location
    /// and ending with the end location.
    pub path: Vec<String>,

    /// Sum of costs of all traversed edges, in kilometers.
    pub distance: f32,
}

fn reconstruct_path<'a>(came_from: &HashMap<&'a str, &'a str>, mut last: &'a str) -> Vec<String> {
    let mut path = vec![last.to_string()];

    while let Some(&nd) = came_from.get(last) {
        path.push(nd.to_string());
        last = nd;
    }

    path.reverse();
    return path;
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest route between two locations in the provided graph.
///
/// Instead of a priority queue, every step scans all nodes for the unvisited one
/// with the smallest tentative distance. This is O(V²) and only suitable for small,
/// hand-authored graphs. When several nodes are equally close, the one whose name
/// sorts first wins, so the result is fully determined by the graph contents.
///
/// Edges leading to names which are not nodes of the graph are ignored.
///
/// Returns [RouteError::UnknownNode] if either location is not a node of the graph,
/// and [RouteError::Unreachable] if no path connects them.
pub fn find_route(g: &Graph, from: &str, to: &str) -> Result<Route, RouteError> {
    for name in [from, to] {
        if !g.contains(name) {
            return Err(RouteError::UnknownNode(name.to_string()));
        }
    }

    let mut distances: BTreeMap<&str, f32> = g.iter().map(|name| (name, f32::INFINITY)).collect();
    let mut came_from: HashMap<&str, &str> = HashMap::default();
    let mut visited: HashSet<&str> = HashSet::default();
    distances.insert(from, 0.0);

    loop {
        let Some((at, cost)) = distances
            .iter()
            .filter(|&(name, _)| !visited.contains(*name))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(&name, &cost)| (name, cost))
        else {
            break;
        };

        // Every remaining node is unreachable from the start
        if cost.is_infinite() {
            break;
        }

        visited.insert(at);
        if at == to {
            break;
        }

        for edge in g.get_edges(at) {
            // Check if the referred node exists
            let Some((&neighbor, &neighbor_cost)) = distances.get_key_value(edge.to.as_str())
            else {
                continue;
            };

            if visited.contains(neighbor) {
                continue;
            }

            let alt = cost + edge.cost;
            if alt < neighbor_cost {
                distances.insert(neighbor, alt);
                came_from.insert(neighbor, at);
            }
        }
    }

    log::debug!(
        "route search {:?} -> {:?} visited {} of {} nodes",
        from,
        to,
        visited.len(),
        g.len(),
    );

    let distance = distances.get(to).copied().unwrap_or(f32::INFINITY);
    if distance.is_infinite() {
        return Err(RouteError::Unreachable {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(Route {
        path: reconstruct_path(&came_from, to),
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Network};

    fn path(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_edge() {
        let g: Graph = [("A", "B", 2.5)].into_iter().collect();
        let route = find_route(&g, "A", "B").unwrap();
        assert_eq!(route.path, path(&["A", "B"]));
        assert_eq!(route.distance, 2.5);
    }

    #[test]
    fn bangalore_chain() {
        let g = Network::bangalore().graph;
        let route = find_route(&g, "Hebbal", "Electronic City").unwrap();
        assert_eq!(
            route.path,
            path(&[
                "Hebbal",
                "Malleshwaram",
                "Majestic",
                "KR Market",
                "Jayanagar",
                "Banashankari",
                "Silk Board",
                "Electronic City",
            ])
        );
        assert_eq!(route.distance, 41.0);
    }

    #[test]
    fn same_start_and_end() {
        let g = Network::bangalore().graph;
        for name in g.iter() {
            let route = find_route(&g, name, name).unwrap();
            assert_eq!(route.path, path(&[name]));
            assert_eq!(route.distance, 0.0);
        }
    }

    #[test]
    fn symmetric() {
        let g = Network::bangalore().graph;
        for a in g.iter() {
            for b in g.iter() {
                let there = find_route(&g, a, b).unwrap();
                let mut back = find_route(&g, b, a).unwrap();
                back.path.reverse();
                assert_eq!(there.path, back.path);
                assert_eq!(there.distance, back.distance);
            }
        }
    }

    #[test]
    fn triangle_inequality() {
        let g: Graph = [
            ("A", "B", 2.0),
            ("B", "C", 2.0),
            ("A", "C", 5.0),
            ("C", "D", 1.0),
            ("A", "D", 3.5),
        ]
        .into_iter()
        .collect();

        let dist = |a: &str, b: &str| find_route(&g, a, b).unwrap().distance;
        let names: Vec<_> = g.iter().collect();
        for &a in &names {
            for &b in &names {
                for &c in &names {
                    assert!(dist(a, c) <= dist(a, b) + dist(b, c));
                }
            }
        }
    }

    #[test]
    fn prefers_cheaper_detour() {
        let g: Graph = [("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 5.0)]
            .into_iter()
            .collect();
        let route = find_route(&g, "A", "C").unwrap();
        assert_eq!(route.path, path(&["A", "B", "C"]));
        assert_eq!(route.distance, 2.0);
    }

    #[test]
    fn ties_are_broken_by_name() {
        //   B
        //  / \
        // A   D
        //  \ /
        //   C
        let g: Graph = [
            ("A", "C", 1.0),
            ("C", "D", 1.0),
            ("A", "B", 1.0),
            ("B", "D", 1.0),
        ]
        .into_iter()
        .collect();

        let route = find_route(&g, "A", "D").unwrap();
        assert_eq!(route.path, path(&["A", "B", "D"]));
        assert_eq!(route.distance, 2.0);
    }

    #[test]
    fn unknown_node() {
        let g = Network::bangalore().graph;
        assert_eq!(
            find_route(&g, "Hebbal", "Whitefield"),
            Err(RouteError::UnknownNode("Whitefield".to_string())),
        );
        assert_eq!(
            find_route(&g, "Whitefield", "Hebbal"),
            Err(RouteError::UnknownNode("Whitefield".to_string())),
        );
    }

    #[test]
    fn unreachable() {
        let mut g: Graph = [("A", "B", 1.0), ("C", "D", 1.0)].into_iter().collect();
        g.set_edge("B", Edge::new("C", 1.0)); // one-way, B -> C only

        assert_eq!(find_route(&g, "A", "D").unwrap().distance, 3.0);
        assert_eq!(
            find_route(&g, "D", "A"),
            Err(RouteError::Unreachable {
                from: "D".to_string(),
                to: "A".to_string(),
            }),
        );
    }

    #[test]
    fn edges_to_missing_nodes_are_ignored() {
        let mut g: Graph = [("A", "B", 4.0)].into_iter().collect();
        g.set_edge("A", Edge::new("Ghost", 1.0));

        let route = find_route(&g, "A", "B").unwrap();
        assert_eq!(route.path, path(&["A", "B"]));
        assert!(!g.contains("Ghost"));
    }

    #[test]
    fn deterministic() {
        let g = Network::bangalore().graph;
        let first = find_route(&g, "Jayanagar", "Hebbal").unwrap();
        for _ in 0..10 {
            assert_eq!(find_route(&g, "Jayanagar", "Hebbal").unwrap(), first);
        }
    }
}
