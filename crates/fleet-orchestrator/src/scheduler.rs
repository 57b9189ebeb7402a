//! Dependency graph scheduling.
//!
//! Descriptors are ordered with Kahn's algorithm. Whenever several
//! descriptors are ready at once the one declared first is emitted, so a
//! given manifest always produces the same start order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use fleet_config::ServiceDescriptor;
use thiserror::Error;

/// A descriptor that could not be scheduled, with the dependencies that
/// never resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckService {
    pub name: String,
    pub unmet: Vec<String>,
}

impl fmt::Display for StuckService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} : [{}]", self.name, self.unmet.join(", "))
    }
}

/// Errors raised while ordering descriptors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// A cycle or an undeclared dependency name blocks part of the fleet.
    #[error("unable to satisfy service dependencies: {}", describe(.stuck))]
    DependencyUnsatisfiable { stuck: Vec<StuckService> },
}

impl SchedulerError {
    /// Names of the descriptors that could not be scheduled.
    #[must_use]
    pub fn stuck_names(&self) -> Vec<&str> {
        match self {
            Self::DependencyUnsatisfiable { stuck } => {
                stuck.iter().map(|service| service.name.as_str()).collect()
            }
        }
    }
}

fn describe(stuck: &[StuckService]) -> String {
    stuck
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Orders `descriptors` so each appears after everything it depends on.
pub fn start_order(
    descriptors: &[ServiceDescriptor],
) -> Result<Vec<&ServiceDescriptor>, SchedulerError> {
    let order = resolve(descriptors)?;
    Ok(order
        .into_iter()
        .filter_map(|index| descriptors.get(index))
        .collect())
}

fn resolve(descriptors: &[ServiceDescriptor]) -> Result<Vec<usize>, SchedulerError> {
    let (ready_entries, mut blocked): (Vec<_>, Vec<_>) = descriptors
        .iter()
        .enumerate()
        .partition(|(_, descriptor)| descriptor.depends_on().is_empty());
    // Keyed by declaration index so the first declared ready service wins.
    let mut ready: BTreeMap<usize, &ServiceDescriptor> = ready_entries.into_iter().collect();
    let mut done: HashSet<&str> = HashSet::with_capacity(descriptors.len());
    let mut order = Vec::with_capacity(descriptors.len());

    while let Some((index, descriptor)) = ready.pop_first() {
        order.push(index);
        done.insert(descriptor.name());
        let (unblocked, still_blocked): (Vec<_>, Vec<_>) =
            blocked.into_iter().partition(|(_, candidate)| {
                candidate
                    .depends_on()
                    .iter()
                    .all(|dependency| done.contains(dependency.as_str()))
            });
        ready.extend(unblocked);
        blocked = still_blocked;
    }

    if blocked.is_empty() {
        return Ok(order);
    }
    let stuck = blocked
        .into_iter()
        .map(|(_, descriptor)| {
            let mut unmet: Vec<String> = Vec::new();
            for dependency in descriptor.depends_on() {
                if !done.contains(dependency.as_str()) && !unmet.contains(dependency) {
                    unmet.push(dependency.clone());
                }
            }
            StuckService {
                name: descriptor.name().to_owned(),
                unmet,
            }
        })
        .collect();
    Err(SchedulerError::DependencyUnsatisfiable { stuck })
}

/// Descriptors together with their resolved start order.
///
/// Building a plan is the only way to obtain a [`crate::FleetController`], so
/// an unsatisfiable dependency table is rejected before any process starts.
#[derive(Debug, Clone)]
pub struct FleetPlan {
    descriptors: Vec<ServiceDescriptor>,
    order: Vec<usize>,
}

impl FleetPlan {
    /// Resolves the start order for `descriptors`.
    pub fn new(descriptors: Vec<ServiceDescriptor>) -> Result<Self, SchedulerError> {
        let order = resolve(&descriptors)?;
        Ok(Self { descriptors, order })
    }

    /// Descriptors in start order.
    pub fn ordered(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.order
            .iter()
            .filter_map(|&index| self.descriptors.get(index))
    }

    /// Service names in start order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.ordered().map(ServiceDescriptor::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use fleet_config::ReadinessStrategy;
    use rstest::rstest;

    use super::*;

    fn service(name: &str, depends_on: &[&str]) -> ServiceDescriptor {
        ServiceDescriptor::new(name, ["true"], ReadinessStrategy::PortProbe { port: 1 })
            .with_dependencies(depends_on.iter().copied())
    }

    fn names<'a>(ordered: &[&'a ServiceDescriptor]) -> Vec<&'a str> {
        ordered.iter().map(|&descriptor| descriptor.name()).collect()
    }

    fn position(order: &[&str], name: &str) -> usize {
        order
            .iter()
            .position(|candidate| *candidate == name)
            .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
    }

    #[test]
    fn dependency_is_started_first() {
        let descriptors = vec![service("B", &["A"]), service("A", &[])];
        let order = start_order(&descriptors).expect("acyclic graph");
        assert_eq!(names(&order), ["A", "B"]);
    }

    #[test]
    fn simultaneously_ready_services_keep_declaration_order() {
        let descriptors = vec![
            service("remoteva-a", &[]),
            service("remoteva-b", &[]),
            service("sa-1", &[]),
            service("va-1", &["remoteva-a", "remoteva-b"]),
            service("ca", &["sa-1"]),
        ];
        let order = start_order(&descriptors).expect("acyclic graph");
        assert_eq!(
            names(&order),
            ["remoteva-a", "remoteva-b", "sa-1", "va-1", "ca"]
        );
    }

    #[test]
    fn every_service_follows_its_transitive_dependencies() {
        let descriptors = vec![
            service("wfe", &["ra", "nonce"]),
            service("ra", &["sa", "ca", "va"]),
            service("ca", &["sa"]),
            service("va", &["remoteva"]),
            service("nonce", &[]),
            service("sa", &[]),
            service("remoteva", &[]),
            service("bad-key-revoker", &["ra", "mail"]),
            service("mail", &[]),
        ];
        let order = start_order(&descriptors).expect("acyclic graph");
        let order = names(&order);
        assert_eq!(order.len(), descriptors.len());
        for descriptor in &descriptors {
            for dependency in descriptor.depends_on() {
                assert!(
                    position(&order, dependency) < position(&order, descriptor.name()),
                    "{dependency} must precede {} in {order:?}",
                    descriptor.name()
                );
            }
        }
    }

    #[test]
    fn cycle_reports_both_members() {
        let descriptors = vec![service("A", &["B"]), service("B", &["A"])];
        let error = start_order(&descriptors).expect_err("cycle must fail");
        assert_eq!(
            error,
            SchedulerError::DependencyUnsatisfiable {
                stuck: vec![
                    StuckService {
                        name: "A".to_owned(),
                        unmet: vec!["B".to_owned()],
                    },
                    StuckService {
                        name: "B".to_owned(),
                        unmet: vec!["A".to_owned()],
                    },
                ],
            }
        );
    }

    #[test]
    fn undeclared_dependency_blocks_its_dependents_only() {
        let descriptors = vec![
            service("sa", &[]),
            service("ra", &["sa", "sa-typo"]),
            service("wfe", &["ra"]),
            service("ocsp", &["sa"]),
        ];
        let error = start_order(&descriptors).expect_err("missing dependency must fail");
        assert_eq!(error.stuck_names(), ["ra", "wfe"]);
        let SchedulerError::DependencyUnsatisfiable { stuck } = &error;
        assert_eq!(stuck[0].unmet, ["sa-typo"]);
        assert_eq!(stuck[1].unmet, ["ra"]);
        assert!(error.to_string().contains("ra : [sa-typo]"));
    }

    #[rstest]
    #[case::self_loop(vec![service("A", &["A"])], vec!["A"])]
    #[case::three_cycle(
        vec![service("A", &["C"]), service("B", &["A"]), service("C", &["B"]), service("D", &[])],
        vec!["A", "B", "C"]
    )]
    #[case::downstream_of_cycle(
        vec![service("A", &["B"]), service("B", &["A"]), service("C", &["A"])],
        vec!["A", "B", "C"]
    )]
    fn stuck_set_is_exactly_the_unresolvable_services(
        #[case] descriptors: Vec<ServiceDescriptor>,
        #[case] expected: Vec<&str>,
    ) {
        let error = start_order(&descriptors).expect_err("graph must be unsatisfiable");
        assert_eq!(error.stuck_names(), expected);
    }

    #[test]
    fn empty_fleet_has_empty_order() {
        let plan = FleetPlan::new(Vec::new()).expect("empty plan");
        assert!(plan.is_empty());
        assert!(plan.names().is_empty());
    }

    #[test]
    fn plan_exposes_resolved_order() {
        let plan = FleetPlan::new(vec![service("B", &["A"]), service("A", &[])])
            .expect("acyclic graph");
        assert_eq!(plan.names(), ["A", "B"]);
        assert_eq!(plan.len(), 2);
    }
}
