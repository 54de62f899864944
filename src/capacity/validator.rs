//! Capacity validation.
//!
//! Pure functions over a system and a candidate upgrade set. Nothing here
//! mutates state: callers apply an edit only once the validator accepts it,
//! so no stored upgrade set is ever left overdrawn.

use crate::region::System;

use super::types::{CapacityError, CapacityReport, Resource, Upgrade};

/// Capacity totals split into consumption and additions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Totals {
    power_used: i64,
    power_added: i64,
    workforce_used: i64,
    workforce_added: i64,
}

fn totals<'a>(upgrades: impl IntoIterator<Item = &'a Upgrade>) -> Totals {
    let mut totals = Totals::default();
    for upgrade in upgrades {
        if upgrade.power < 0 {
            totals.power_added += upgrade.power.abs();
        } else {
            totals.power_used += upgrade.power;
        }
        if upgrade.workforce < 0 {
            totals.workforce_added += upgrade.workforce.abs();
        } else {
            totals.workforce_used += upgrade.workforce;
        }
    }
    totals
}

/// Evaluate the capacity usage of `system` with `upgrades` installed
pub fn evaluate<'a>(
    system: &System,
    upgrades: impl IntoIterator<Item = &'a Upgrade>,
) -> CapacityReport {
    let t = totals(upgrades);
    let power_capacity = system.power + t.power_added;
    let workforce_capacity = system.workforce + t.workforce_added;

    CapacityReport {
        power_used: t.power_used,
        power_capacity,
        power_remaining: power_capacity - t.power_used,
        workforce_used: t.workforce_used,
        workforce_capacity,
        workforce_remaining: workforce_capacity - t.workforce_used,
        valid: t.power_used <= power_capacity && t.workforce_used <= workforce_capacity,
    }
}

/// Capacity added by the upgrade set, as `(power, workforce)`
pub fn capacity_added<'a>(upgrades: impl IntoIterator<Item = &'a Upgrade>) -> (i64, i64) {
    let t = totals(upgrades);
    (t.power_added, t.workforce_added)
}

/// Check whether `candidate` can join the `installed` set of `system`.
///
/// Returns the report of the resulting set on success.
pub fn check_addition(
    system: &System,
    installed: &[&Upgrade],
    candidate: &Upgrade,
) -> Result<CapacityReport, CapacityError> {
    if installed.iter().any(|u| u.name == candidate.name) {
        return Err(CapacityError::DuplicateUpgrade {
            system: system.name.clone(),
            upgrade: candidate.name.clone(),
        });
    }

    let before = evaluate(system, installed.iter().copied());
    let after = evaluate(system, installed.iter().copied().chain(std::iter::once(candidate)));

    if let Some((resource, deficit)) = after.deficit() {
        let needed = match resource {
            Resource::Power => candidate.power.max(0),
            Resource::Workforce => candidate.workforce.max(0),
        };
        return Err(CapacityError::Insufficient {
            system: system.name.clone(),
            upgrade: candidate.name.clone(),
            resource,
            needed,
            available: before.remaining(resource),
            deficit,
        });
    }

    Ok(after)
}

/// Check whether `upgrade` can leave the `installed` set of `system`.
///
/// Removing a capacity provider that the rest of the set depends on is
/// rejected.
pub fn check_removal(
    system: &System,
    installed: &[&Upgrade],
    upgrade: &str,
) -> Result<CapacityReport, CapacityError> {
    if !installed.iter().any(|u| u.name == upgrade) {
        return Err(CapacityError::NotInstalled {
            system: system.name.clone(),
            upgrade: upgrade.to_string(),
        });
    }

    let after = evaluate(system, installed.iter().copied().filter(|u| u.name != upgrade));
    match after.deficit() {
        Some((resource, deficit)) => Err(CapacityError::RemovalOverdraws {
            system: system.name.clone(),
            upgrade: upgrade.to_string(),
            resource,
            deficit,
        }),
        None => Ok(after),
    }
}
