//! Structural audits for feature-edge graphs.
//!
//! Meant to run in tests and debug builds after a build, split, or clone
//! pass: the graph's invariants are maintained by caller discipline
//! (registration and chain repair are manual), so the audit is the cheap way
//! to catch a site that forgot its half of the contract.

use std::collections::HashSet;
use std::fmt;

use tracing::{info, instrument};

use crate::view_map::{EdgeId, FeatureShape, Id};

/// Which audit passes to run. Everything is on by default.
#[derive(Debug, Clone, Copy)]
pub struct AuditConfig {
    /// Chain-link reciprocity and chain-start reachability.
    pub check_chains: bool,
    /// Vertex incidence lists reference live, touching edges.
    pub check_incidence: bool,
    /// Vertices with incident edges carry at least one normal.
    pub check_normals: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            check_chains: true,
            check_incidence: true,
            check_normals: true,
        }
    }
}

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// An edge endpoint does not resolve in the shape's vertex arena.
    MissingEndpoint { edge: Id },
    /// `next`/`previous` links between two edges are not reciprocal.
    BrokenChainLink { edge: Id },
    /// A chain-start entry references an edge that is not registered.
    StaleChainStart { shape: Id },
    /// An edge reachable from a chain start is missing from the edge list.
    UnregisteredChainEdge { edge: Id },
    /// A vertex incidence entry references a dead edge or one that does not
    /// touch the vertex.
    StaleIncidence { vertex: Id },
    /// A vertex with incident edges carries no normal.
    EmptyNormalSet { vertex: Id },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEndpoint { edge } => {
                write!(f, "edge {edge:?} has an endpoint outside the shape")
            }
            Self::BrokenChainLink { edge } => {
                write!(f, "edge {edge:?} has a non-reciprocal chain link")
            }
            Self::StaleChainStart { shape } => {
                write!(f, "shape {shape:?} lists an unregistered chain start")
            }
            Self::UnregisteredChainEdge { edge } => {
                write!(f, "chain reaches edge {edge:?} missing from the edge list")
            }
            Self::StaleIncidence { vertex } => {
                write!(f, "vertex {vertex:?} lists an edge that does not touch it")
            }
            Self::EmptyNormalSet { vertex } => {
                write!(f, "vertex {vertex:?} has incident edges but no normal")
            }
        }
    }
}

/// Result of auditing one shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeAudit {
    pub errors: Vec<AuditError>,
    pub warnings: Vec<AuditError>,
}

impl ShapeAudit {
    pub fn all_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ShapeAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ShapeAudit: valid={}, errors={}, warnings={}",
            self.all_valid(),
            self.errors.len(),
            self.warnings.len()
        )?;
        for e in &self.errors {
            writeln!(f, "  ERROR {e}")?;
        }
        for w in &self.warnings {
            writeln!(f, "  WARN {w}")?;
        }
        Ok(())
    }
}

/// Audit one shape against the graph invariants.
#[instrument(skip(shape, config), fields(shape = ?shape.id()))]
pub fn audit_shape(shape: &FeatureShape, config: &AuditConfig) -> ShapeAudit {
    let mut audit = ShapeAudit::default();

    check_endpoints(shape, &mut audit);
    if config.check_chains {
        check_chain_links(shape, &mut audit);
        check_chain_reachability(shape, &mut audit);
    }
    if config.check_incidence {
        check_incidence(shape, &mut audit);
    }
    if config.check_normals {
        check_normals(shape, &mut audit);
    }

    info!(
        valid = audit.all_valid(),
        errors = audit.errors.len(),
        warnings = audit.warnings.len(),
        "shape audit complete"
    );
    audit
}

fn check_endpoints(shape: &FeatureShape, audit: &mut ShapeAudit) {
    for (_, edge) in shape.edges() {
        if shape.vertex(edge.vertex_a()).is_none() || shape.vertex(edge.vertex_b()).is_none() {
            audit.errors.push(AuditError::MissingEndpoint { edge: edge.id() });
        }
    }
}

fn check_chain_links(shape: &FeatureShape, audit: &mut ShapeAudit) {
    for (key, edge) in shape.edges() {
        if let Some(next) = edge.next_edge() {
            match shape.edge(next) {
                Some(n) if n.previous_edge() == Some(key) => {}
                _ => audit.errors.push(AuditError::BrokenChainLink { edge: edge.id() }),
            }
        }
        if let Some(previous) = edge.previous_edge() {
            match shape.edge(previous) {
                Some(p) if p.next_edge() == Some(key) => {}
                _ => audit.errors.push(AuditError::BrokenChainLink { edge: edge.id() }),
            }
        }
    }
}

fn check_chain_reachability(shape: &FeatureShape, audit: &mut ShapeAudit) {
    let registered: HashSet<EdgeId> = shape.edges().map(|(k, _)| k).collect();
    let mut visited: HashSet<EdgeId> = HashSet::new();

    for &start in shape.chain_starts() {
        if shape.edge(start).is_none() {
            audit.errors.push(AuditError::StaleChainStart { shape: shape.id() });
            continue;
        }
        // Walk both directions; a cycle in a malformed graph must not hang
        // the audit.
        for direction in [true, false] {
            let mut current = Some(start);
            while let Some(key) = current {
                if !visited.insert(key) && key != start {
                    break;
                }
                let Some(edge) = shape.edge(key) else {
                    audit
                        .errors
                        .push(AuditError::UnregisteredChainEdge { edge: Id::default() });
                    break;
                };
                if !registered.contains(&key) {
                    audit
                        .errors
                        .push(AuditError::UnregisteredChainEdge { edge: edge.id() });
                    break;
                }
                current = if direction { edge.next_edge() } else { edge.previous_edge() };
            }
        }
    }
}

fn check_incidence(shape: &FeatureShape, audit: &mut ShapeAudit) {
    for (key, vertex) in shape.vertices() {
        for &incident in vertex.fedges() {
            let touches = shape
                .edge(incident)
                .is_some_and(|e| e.vertex_a() == key || e.vertex_b() == key);
            if !touches {
                audit.errors.push(AuditError::StaleIncidence { vertex: vertex.id() });
            }
        }
    }
}

fn check_normals(shape: &FeatureShape, audit: &mut ShapeAudit) {
    for (_, vertex) in shape.vertices() {
        if !vertex.fedges().is_empty() && vertex.normals_size() == 0 {
            audit.warnings.push(AuditError::EmptyNormalSet { vertex: vertex.id() });
        }
    }
}
