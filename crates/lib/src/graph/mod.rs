//! Module dependency graph.
//!
//! For one target, the modules that support it and their active dependency
//! edges form a DAG. This module validates that DAG and resolves, for any
//! module in it, the defines and include paths it sees and the order in
//! which its dependencies are linked.
//!
//! # Propagation
//!
//! A module sees the exports (exported defines and include paths) of each of
//! its direct dependencies, public or private. Past that first hop, only
//! public edges are followed. Headers-only edges propagate exports but are
//! never linked.
//!
//! # Link order
//!
//! Every module reachable over link edges appears in the link order, each one
//! after all modules that depend on it.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::manifest::SolutionSettings;
use crate::module::{Linkage, ModuleDef, ModuleKind, Visibility};
use crate::platform::TargetKey;
use crate::util::ordered::OrderedSet;

/// Everything a module's configuration inherits from the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
  pub defines: Vec<String>,
  pub include_paths: Vec<String>,
  pub library_paths: Vec<String>,
  pub library_files: Vec<String>,
  /// Runtime files of this module and everything it links.
  pub copy_files: Vec<String>,
  /// Solution-wide options followed by the module's own. Never inherited.
  pub options: Vec<String>,
  pub target_path: Option<String>,
  /// Linked modules, dependents before their dependencies.
  pub link_order: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
  to: NodeIndex,
  visibility: Visibility,
  linkage: Linkage,
}

/// Defines and include paths a module passes on to its dependents.
#[derive(Debug, Clone, Default)]
struct Exports {
  defines: Vec<String>,
  include_paths: Vec<String>,
}

/// The validated dependency DAG for a single target.
pub struct ModuleGraph<'m> {
  key: TargetKey,
  graph: DiGraph<&'m ModuleDef, ()>,
  nodes: HashMap<&'m str, NodeIndex>,
  /// Outgoing edges per node in declaration order.
  edges: Vec<Vec<Edge>>,
}

impl<'m> ModuleGraph<'m> {
  /// Build and validate the graph of every module that supports `key`.
  ///
  /// # Errors
  ///
  /// - `UnknownModule` if an active edge names an undefined module
  /// - `MissingTarget` if a dependency does not support `key`
  /// - `Cycle` if the active edges are not acyclic
  pub fn for_target(modules: &'m BTreeMap<String, ModuleDef>, key: TargetKey) -> Result<Self, ConfigError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for module in modules.values().filter(|m| m.targets.contains(&key)) {
      let idx = graph.add_node(module);
      nodes.insert(module.name.as_str(), idx);
    }

    let mut edges = vec![Vec::new(); graph.node_count()];
    for idx in graph.node_indices() {
      let module = graph[idx];
      for dep in module.dependencies_for(&key) {
        let Some(&to) = nodes.get(dep.module.as_str()) else {
          return Err(if modules.contains_key(&dep.module) {
            ConfigError::MissingTarget {
              module: module.name.clone(),
              dependency: dep.module.clone(),
              target: key,
            }
          } else {
            ConfigError::UnknownModule {
              module: module.name.clone(),
              dependency: dep.module.clone(),
            }
          });
        };
        edges[idx.index()].push(Edge {
          to,
          visibility: dep.visibility,
          linkage: dep.linkage,
        });
      }
    }

    for (from, out) in edges.iter().enumerate() {
      for edge in out {
        graph.add_edge(NodeIndex::new(from), edge.to, ());
      }
    }

    let module_graph = Self {
      key,
      graph,
      nodes,
      edges,
    };
    module_graph.verify_acyclic()?;

    debug!(
      target = %key,
      modules = module_graph.graph.node_count(),
      edges = module_graph.graph.edge_count(),
      "built module graph"
    );
    Ok(module_graph)
  }

  /// Fail with the members of the offending strongly connected component.
  fn verify_acyclic(&self) -> Result<(), ConfigError> {
    let Err(cycle) = toposort(&self.graph, None) else {
      return Ok(());
    };

    let is_cyclic = |scc: &Vec<NodeIndex>| {
      scc.len() > 1 || self.edges[scc[0].index()].iter().any(|e| e.to == scc[0])
    };
    let sccs: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph).into_iter().filter(|scc| is_cyclic(scc)).collect();
    let members = sccs
      .iter()
      .find(|scc| scc.contains(&cycle.node_id()))
      .or_else(|| sccs.first())
      .cloned()
      .unwrap_or_else(|| vec![cycle.node_id()]);

    let mut modules: Vec<String> = members.into_iter().map(|idx| self.graph[idx].name.clone()).collect();
    modules.sort();

    Err(ConfigError::Cycle {
      target: self.key,
      modules,
    })
  }

  /// Module names in a dependency-first order (every module after the
  /// modules it depends on).
  pub fn build_order(&self) -> Vec<&'m str> {
    // Acyclic by construction.
    let mut order: Vec<&'m str> = toposort(&self.graph, None)
      .unwrap_or_default()
      .into_iter()
      .map(|idx| self.graph[idx].name.as_str())
      .collect();
    order.reverse();
    order
  }

  /// Direct dependencies of a module for this target.
  pub fn dependencies(&self, name: &str) -> Vec<&'m str> {
    let Some(&idx) = self.nodes.get(name) else {
      return Vec::new();
    };
    self.edges[idx.index()]
      .iter()
      .map(|e| self.graph[e.to].name.as_str())
      .collect()
  }
}

/// Resolves modules against a [`ModuleGraph`], memoizing exports so shared
/// dependencies are only walked once.
pub struct Resolver<'g, 'm> {
  graph: &'g ModuleGraph<'m>,
  settings: &'g SolutionSettings,
  exports: HashMap<NodeIndex, Exports>,
}

impl<'g, 'm> Resolver<'g, 'm> {
  pub fn new(graph: &'g ModuleGraph<'m>, settings: &'g SolutionSettings) -> Self {
    Self {
      graph,
      settings,
      exports: HashMap::new(),
    }
  }

  /// Resolve everything `name` inherits for the graph's target.
  ///
  /// Returns `None` if the module does not support the target.
  pub fn resolve(&mut self, name: &str) -> Option<Resolved> {
    let graph = self.graph;
    let &idx = graph.nodes.get(name)?;
    let module = graph.graph[idx];
    let key = graph.key;

    let mut defines = OrderedSet::new();
    let mut includes = OrderedSet::new();
    let mut options = OrderedSet::new();
    let mut target_path = None;

    for define in engine_defines(module, &key, self.settings) {
      defines.insert(&define);
    }
    if module.kind.uses_engine_settings() {
      includes.extend(&self.settings.include_dirs);
      options.extend(&self.settings.options);
    }
    if module.kind.builds_from_source() {
      includes.insert(&module.root);
    }

    for settings in module.active_settings(&key) {
      defines.extend(&settings.defines);
      defines.extend(&settings.exported_defines);
      for path in settings.include_paths.iter().chain(&settings.private_include_paths) {
        includes.insert(&module.root_relative(path));
      }
      options.extend(&settings.options);
      if let Some(path) = &settings.target_path {
        target_path = Some(module.root_relative(path));
      }
    }

    for edge in &graph.edges[idx.index()] {
      let exports = self.exports_of(edge.to);
      defines.extend(&exports.defines);
      includes.extend(&exports.include_paths);
    }

    let linked = self.link_order(idx);

    let mut library_paths = OrderedSet::new();
    let mut library_files = OrderedSet::new();
    let mut copy_files = OrderedSet::new();
    for &node in std::iter::once(&idx).chain(&linked) {
      let linked_module = graph.graph[node];
      for settings in linked_module.active_settings(&key) {
        for path in &settings.library_paths {
          library_paths.insert(&linked_module.root_relative(path));
        }
        library_files.extend(&settings.library_files);
        for file in &settings.copy_files {
          copy_files.insert(&linked_module.root_relative(file));
        }
      }
    }

    let defines = defines.into_vec();
    trace!(module = %name, target = %key, defines = defines.len(), "resolved module");

    Some(Resolved {
      defines,
      include_paths: includes.into_vec(),
      library_paths: library_paths.into_vec(),
      library_files: library_files.into_vec(),
      copy_files: copy_files.into_vec(),
      options: options.into_vec(),
      target_path,
      link_order: linked.into_iter().map(|n| graph.graph[n].name.clone()).collect(),
    })
  }

  /// Own exports plus, transitively, the exports behind public edges.
  fn exports_of(&mut self, idx: NodeIndex) -> Exports {
    if let Some(cached) = self.exports.get(&idx) {
      return cached.clone();
    }

    let graph = self.graph;
    let module = graph.graph[idx];
    let mut defines = OrderedSet::new();
    let mut includes = OrderedSet::new();

    if module.kind.builds_from_source() && module.kind != ModuleKind::Executable {
      includes.insert(&module.root);
    }
    for settings in module.active_settings(&graph.key) {
      defines.extend(&settings.exported_defines);
      for path in &settings.include_paths {
        includes.insert(&module.root_relative(path));
      }
    }

    for edge in graph.edges[idx.index()].iter().filter(|e| e.visibility == Visibility::Public) {
      let inner = self.exports_of(edge.to);
      defines.extend(&inner.defines);
      includes.extend(&inner.include_paths);
    }

    let exports = Exports {
      defines: defines.into_vec(),
      include_paths: includes.into_vec(),
    };
    self.exports.insert(idx, exports.clone());
    exports
  }

  /// Reverse post-order DFS over link edges, excluding the root.
  fn link_order(&self, root: NodeIndex) -> Vec<NodeIndex> {
    let mut visited = vec![false; self.graph.graph.node_count()];
    let mut post = Vec::new();
    self.visit_links(root, &mut visited, &mut post);
    post.pop();
    post.reverse();
    post
  }

  fn visit_links(&self, idx: NodeIndex, visited: &mut [bool], post: &mut Vec<NodeIndex>) {
    visited[idx.index()] = true;
    for edge in &self.graph.edges[idx.index()] {
      if edge.linkage == Linkage::Link && !visited[edge.to.index()] {
        self.visit_links(edge.to, visited, post);
      }
    }
    post.push(idx);
  }
}

/// Engine-wide defines for a module, selected by its kind.
pub fn engine_defines(module: &ModuleDef, key: &TargetKey, settings: &SolutionSettings) -> Vec<String> {
  if !module.kind.uses_engine_settings() {
    return Vec::new();
  }

  let prefix = settings.define_prefix.as_str();
  let mut defines = vec![format!("{}_ENGINE", prefix), key.optimization.define(prefix)];
  defines.extend(key.platform.defines(prefix));
  if module.kind == ModuleKind::Library {
    defines.push(format!("{}_LIB", prefix));
  }
  defines
}
